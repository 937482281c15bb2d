// tests/upload_tests.rs

use content_guard::rules::{FileCategory, FileUploadRule, Rule, UploadedFile, Violation};

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_HEADER: &[u8] = b"\xff\xd8\xff\xe0";

fn file(name: &str, bytes: &[u8]) -> UploadedFile {
    UploadedFile {
        file_name: name.to_string(),
        content_type: None,
        bytes: bytes.to_vec(),
    }
}

fn with_padding(header: &[u8], rest: &[u8]) -> Vec<u8> {
    let mut bytes = header.to_vec();
    bytes.extend_from_slice(&[0u8; 32]);
    bytes.extend_from_slice(rest);
    bytes
}

fn violation(rule: &FileUploadRule, upload: &UploadedFile) -> Option<Violation> {
    rule.validate(upload).violation().cloned()
}

#[test]
fn category_follows_the_declared_list() {
    assert_eq!(FileCategory::from_declared(&["jpg", "pdf"]), FileCategory::Image);
    assert_eq!(FileCategory::from_declared(&["pdf", "mp4"]), FileCategory::Document);
    assert_eq!(FileCategory::from_declared(&["mp4", "mp3"]), FileCategory::Video);
    assert_eq!(FileCategory::from_declared(&[".MP3"]), FileCategory::Audio);
    assert_eq!(FileCategory::from_declared(&["zip"]), FileCategory::Document);
    assert_eq!(FileCategory::from_declared::<&str>(&[]), FileCategory::Document);
}

#[test]
fn mime_types_are_expanded_to_extensions() {
    assert_eq!(FileCategory::from_declared(&["image/png"]), FileCategory::Image);
    assert_eq!(FileCategory::from_declared(&["application/pdf"]), FileCategory::Document);
}

#[test]
fn genuine_files_pass() {
    let images = FileUploadRule::for_declared(&["png", "jpg", "svg"]);
    assert!(images.validate(&file("logo.png", &with_padding(PNG_HEADER, b""))).is_valid());
    assert!(images.validate(&file("Photo.JPG", &with_padding(JPEG_HEADER, b""))).is_valid());
    assert!(images
        .validate(&file(
            "icon.svg",
            br#"<svg xmlns="http://www.w3.org/2000/svg"><circle r="4"/></svg>"#,
        ))
        .is_valid());

    assert!(images
        .validate(&file("LOGO.SVG", br#"<?xml version="1.0"?><SVG viewBox="0 0 1 1"></SVG>"#))
        .is_valid());

    let documents = FileUploadRule::for_declared(&["pdf", "csv"]);
    assert!(documents.validate(&file("report.pdf", b"%PDF-1.7\n%...")).is_valid());
    assert!(documents.validate(&file("data.csv", b"a,b\n1,2\n")).is_valid());
}

#[test]
fn content_must_match_the_extension() {
    let rule = FileUploadRule::for_declared(&["png"]);
    assert_eq!(
        violation(&rule, &file("logo.png", &with_padding(b"GIF89a", b""))),
        Some(Violation::ContentMismatch("png".to_string()))
    );
}

#[test]
fn embedded_code_is_rejected() {
    let rule = FileUploadRule::for_declared(&["jpg"]);
    let polyglot = with_padding(JPEG_HEADER, b"<?php system($_GET['c']); ?>");
    assert_eq!(
        violation(&rule, &file("avatar.jpg", &polyglot)),
        Some(Violation::EmbeddedCode)
    );
}

#[test]
fn scripted_svg_is_rejected() {
    let rule = FileUploadRule::for_declared(&["svg"]);
    assert_eq!(
        violation(&rule, &file("icon.svg", b"<svg><script>alert(1)</script></svg>")),
        Some(Violation::EmbeddedCode)
    );
    assert_eq!(
        violation(&rule, &file("icon.svg", br#"<svg onload="alert(1)"></svg>"#)),
        Some(Violation::EmbeddedCode)
    );
}

#[test]
fn double_extensions_are_rejected() {
    let rule = FileUploadRule::for_declared(&["jpg"]);
    assert_eq!(
        violation(&rule, &file("shell.php.jpg", &with_padding(JPEG_HEADER, b""))),
        Some(Violation::DoubleExtension("php".to_string()))
    );
}

#[test]
fn extensions_outside_the_declared_list_are_rejected() {
    let documents = FileUploadRule::for_declared(&["pdf"]);
    assert_eq!(
        violation(&documents, &file("notes.exe", b"MZ")),
        Some(Violation::DisallowedExtension("exe".to_string()))
    );

    let png_only = FileUploadRule::for_declared(&["png"]);
    assert_eq!(
        violation(&png_only, &file("photo.jpg", &with_padding(JPEG_HEADER, b""))),
        Some(Violation::DisallowedExtension("jpg".to_string()))
    );

    assert_eq!(
        violation(&png_only, &file("README", b"text")),
        Some(Violation::DisallowedExtension(String::new()))
    );
}

#[test]
fn bad_names_and_sizes_are_rejected() {
    let rule = FileUploadRule::for_declared(&["png"]);
    let png = with_padding(PNG_HEADER, b"");

    assert_eq!(
        violation(&rule, &file("../etc/passwd.png", &png)),
        Some(Violation::InvalidFileName)
    );
    assert_eq!(violation(&rule, &file("a\0.png", &png)), Some(Violation::InvalidFileName));
    assert_eq!(violation(&rule, &file("empty.png", b"")), Some(Violation::EmptyFile));

    let tiny = FileUploadRule::new(FileCategory::Image).with_max_bytes(8);
    assert_eq!(
        violation(&tiny, &file("logo.png", &png)),
        Some(Violation::FileTooLarge {
            size: png.len(),
            limit: 8,
        })
    );
}
