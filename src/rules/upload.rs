// src/rules/upload.rs

use std::{collections::BTreeSet, fmt};

use once_cell::sync::Lazy;
use regex::bytes::Regex as BytesRegex;
use serde::Serialize;

use super::{Rule, ScriptDetector, Verdict, Violation};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];
const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "csv",
];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "webm", "mkv"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "aac", "flac"];

/// Never acceptable anywhere in a file name, e.g. `shell.php.jpg`.
const EXECUTABLE_EXTENSIONS: &[&str] = &[
    "php", "php3", "php4", "php5", "phtml", "phar", "exe", "com", "bat", "cmd", "sh", "cgi",
    "pl", "py", "rb", "js", "jsp", "asp", "aspx", "htm", "html", "shtml", "svgz",
];

const MIB: usize = 1024 * 1024;

static EMBEDDED_CODE: Lazy<BytesRegex> = Lazy::new(|| {
    BytesRegex::new(r"(?i)<\?php|<script\b|javascript\s*:|\beval\s*\(|\bbase64_decode\s*\(")
        .expect("embedded code pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Image,
    Document,
    Video,
    Audio,
}

impl FileCategory {
    /// Picks the category from a declared allow-list of extensions or MIME types.
    ///
    /// Image wins over document, document over video, video over audio.
    /// Anything unrecognised falls back to document.
    pub fn from_declared<S: AsRef<str>>(declared: &[S]) -> Self {
        let extensions = declared_extensions(declared);
        let intersects = |set: &[&str]| set.iter().any(|ext| extensions.contains(*ext));

        if intersects(IMAGE_EXTENSIONS) {
            FileCategory::Image
        } else if intersects(DOCUMENT_EXTENSIONS) {
            FileCategory::Document
        } else if intersects(VIDEO_EXTENSIONS) {
            FileCategory::Video
        } else if intersects(AUDIO_EXTENSIONS) {
            FileCategory::Audio
        } else {
            FileCategory::Document
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileCategory::Image => IMAGE_EXTENSIONS,
            FileCategory::Document => DOCUMENT_EXTENSIONS,
            FileCategory::Video => VIDEO_EXTENSIONS,
            FileCategory::Audio => AUDIO_EXTENSIONS,
        }
    }

    pub fn max_bytes(self) -> usize {
        match self {
            FileCategory::Image => 5 * MIB,
            FileCategory::Document => 10 * MIB,
            FileCategory::Video => 100 * MIB,
            FileCategory::Audio => 20 * MIB,
        }
    }

    /// Media containers are too large to scan and do not execute markup.
    fn scans_for_code(self) -> bool {
        matches!(self, FileCategory::Image | FileCategory::Document)
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileCategory::Image => "image",
            FileCategory::Document => "document",
            FileCategory::Video => "video",
            FileCategory::Audio => "audio",
        };
        f.write_str(name)
    }
}

/// Normalises `.PDF`, `png` and `image/png` alike into lowercase extensions.
fn declared_extensions<S: AsRef<str>>(declared: &[S]) -> BTreeSet<String> {
    let mut extensions = BTreeSet::new();
    for entry in declared {
        let entry = entry.as_ref().trim().trim_start_matches('.').to_ascii_lowercase();
        if entry.is_empty() {
            continue;
        }
        if entry.contains('/') {
            if let Some(known) = mime_guess::get_mime_extensions_str(&entry) {
                extensions.extend(known.iter().map(|ext| ext.to_string()));
            }
        } else {
            extensions.insert(entry);
        }
    }
    extensions
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    /// Client-declared type. Informational only; content is sniffed instead.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Upload checks for one declared category.
#[derive(Debug, Clone)]
pub struct FileUploadRule {
    category: FileCategory,
    declared: BTreeSet<String>,
    max_bytes: usize,
}

impl FileUploadRule {
    pub fn new(category: FileCategory) -> Self {
        Self {
            category,
            declared: BTreeSet::new(),
            max_bytes: category.max_bytes(),
        }
    }

    /// Derives the category from `declared` and additionally restricts
    /// extensions to the declared ones.
    pub fn for_declared<S: AsRef<str>>(declared: &[S]) -> Self {
        Self {
            declared: declared_extensions(declared),
            ..Self::new(FileCategory::from_declared(declared))
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn category(&self) -> FileCategory {
        self.category
    }

    pub fn check(&self, file: &UploadedFile) -> Result<(), Violation> {
        let name = &file.file_name;
        if name.trim().is_empty()
            || name.contains(['\0', '/', '\\'])
            || name.contains("..")
        {
            return Err(Violation::InvalidFileName);
        }

        if file.bytes.is_empty() {
            return Err(Violation::EmptyFile);
        }
        if file.bytes.len() > self.max_bytes {
            return Err(Violation::FileTooLarge {
                size: file.bytes.len(),
                limit: self.max_bytes,
            });
        }

        let mut segments: Vec<String> = name.split('.').map(str::to_ascii_lowercase).collect();
        let extension = match segments.pop() {
            Some(ext) if !segments.is_empty() && !ext.is_empty() => ext,
            _ => return Err(Violation::DisallowedExtension(String::new())),
        };
        if !self.category.extensions().contains(&extension.as_str())
            || (!self.declared.is_empty() && !self.declared.contains(&extension))
        {
            return Err(Violation::DisallowedExtension(extension));
        }

        // segments[0] is the base name itself.
        if let Some(inner) = segments
            .iter()
            .skip(1)
            .find(|segment| EXECUTABLE_EXTENSIONS.contains(&segment.as_str()))
        {
            return Err(Violation::DoubleExtension(inner.clone()));
        }

        if !content_matches(&extension, &file.bytes) {
            return Err(Violation::ContentMismatch(extension));
        }

        if self.category.scans_for_code() {
            if EMBEDDED_CODE.is_match(&file.bytes) {
                return Err(Violation::EmbeddedCode);
            }
            if extension == "svg"
                && !ScriptDetector
                    .detect(&String::from_utf8_lossy(&file.bytes))
                    .is_valid()
            {
                return Err(Violation::EmbeddedCode);
            }
        }

        Ok(())
    }
}

impl Rule<UploadedFile> for FileUploadRule {
    fn validate(&self, file: &UploadedFile) -> Verdict {
        let verdict: Verdict = self.check(file).into();
        if let Some(violation) = verdict.violation() {
            tracing::debug!(
                file = %file.file_name,
                category = %self.category,
                "upload rejected: {}",
                violation
            );
        }
        verdict
    }
}

/// `(offset, bytes)` pairs that must all match.
type Signature = &'static [(usize, &'static [u8])];

const PNG: Signature = &[(0, b"\x89PNG\r\n\x1a\n")];
const JPEG: Signature = &[(0, b"\xff\xd8\xff")];
const GIF87: Signature = &[(0, b"GIF87a")];
const GIF89: Signature = &[(0, b"GIF89a")];
const WEBP: Signature = &[(0, b"RIFF"), (8, b"WEBP")];
const PDF: Signature = &[(0, b"%PDF-")];
const ZIP: Signature = &[(0, b"PK\x03\x04")];
const OLE: Signature = &[(0, b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1")];
const FTYP: Signature = &[(4, b"ftyp")];
const AVI: Signature = &[(0, b"RIFF"), (8, b"AVI ")];
const EBML: Signature = &[(0, b"\x1a\x45\xdf\xa3")];
const ID3: Signature = &[(0, b"ID3")];
const MPEG_FRAME_1: Signature = &[(0, b"\xff\xfb")];
const MPEG_FRAME_2: Signature = &[(0, b"\xff\xf3")];
const MPEG_FRAME_3: Signature = &[(0, b"\xff\xf2")];
const WAV: Signature = &[(0, b"RIFF"), (8, b"WAVE")];
const OGG: Signature = &[(0, b"OggS")];
const FLAC: Signature = &[(0, b"fLaC")];
const ADTS_1: Signature = &[(0, b"\xff\xf1")];
const ADTS_2: Signature = &[(0, b"\xff\xf9")];

fn signatures(extension: &str) -> Option<&'static [Signature]> {
    let signatures: &'static [Signature] = match extension {
        "png" => &[PNG],
        "jpg" | "jpeg" => &[JPEG],
        "gif" => &[GIF87, GIF89],
        "webp" => &[WEBP],
        "pdf" => &[PDF],
        "docx" | "xlsx" | "pptx" => &[ZIP],
        "doc" | "xls" | "ppt" => &[OLE],
        "mp4" | "mov" | "m4a" => &[FTYP],
        "avi" => &[AVI],
        "webm" | "mkv" => &[EBML],
        "mp3" => &[ID3, MPEG_FRAME_1, MPEG_FRAME_2, MPEG_FRAME_3],
        "wav" => &[WAV],
        "ogg" => &[OGG],
        "flac" => &[FLAC],
        "aac" => &[ADTS_1, ADTS_2],
        _ => return None,
    };
    Some(signatures)
}

fn content_matches(extension: &str, bytes: &[u8]) -> bool {
    match signatures(extension) {
        Some(signatures) => signatures.iter().any(|signature| {
            signature.iter().all(|(offset, magic)| {
                bytes
                    .get(*offset..offset + magic.len())
                    .is_some_and(|window| window == *magic)
            })
        }),
        // Text formats have no magic number; they must at least be text.
        None => match std::str::from_utf8(bytes) {
            Ok(text) if extension == "svg" => text.to_ascii_lowercase().contains("<svg"),
            Ok(_) => true,
            Err(_) => false,
        },
    }
}
