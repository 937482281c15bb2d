// src/rules/verdict.rs

use std::fmt;

use serde::Serialize;

/// A single concrete reason a value was rejected.
///
/// Rules never return `Err` for bad input. Rejection is an expected outcome,
/// so it travels inside a [`Verdict`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    ScriptTag,
    JavascriptProtocol,
    EventHandler,
    Base64DataUri,
    VbscriptProtocol,
    MalformedHtml,
    DisallowedTag(String),
    DisallowedAttribute { tag: String, attribute: String },
    UnsafeUrl(String),
    AngleBrackets,
    InvalidFileName,
    EmptyFile,
    FileTooLarge { size: usize, limit: usize },
    DisallowedExtension(String),
    DoubleExtension(String),
    ContentMismatch(String),
    EmbeddedCode,
    /// The check itself failed (parser crash, broken configuration).
    /// Treated as a rejection.
    Unverifiable,
}

/// Failure categories surfaced to callers.
/// Each one maps to a translatable message template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    ScriptContentDetected,
    Base64DataUriRejected,
    MalformedHtml,
    DisallowedTag,
    DisallowedAttribute,
    UnsafeUrl,
    UnsafeText,
    UnsafeFile,
    Unverifiable,
}

impl ViolationCategory {
    pub const ALL: [ViolationCategory; 9] = [
        ViolationCategory::ScriptContentDetected,
        ViolationCategory::Base64DataUriRejected,
        ViolationCategory::MalformedHtml,
        ViolationCategory::DisallowedTag,
        ViolationCategory::DisallowedAttribute,
        ViolationCategory::UnsafeUrl,
        ViolationCategory::UnsafeText,
        ViolationCategory::UnsafeFile,
        ViolationCategory::Unverifiable,
    ];

    /// Stable machine-readable code, used as the `validator` error code.
    pub fn code(self) -> &'static str {
        match self {
            ViolationCategory::ScriptContentDetected => "script_content_detected",
            ViolationCategory::Base64DataUriRejected => "base64_data_uri_rejected",
            ViolationCategory::MalformedHtml => "malformed_html",
            ViolationCategory::DisallowedTag => "disallowed_tag",
            ViolationCategory::DisallowedAttribute => "disallowed_attribute",
            ViolationCategory::UnsafeUrl => "unsafe_url",
            ViolationCategory::UnsafeText => "unsafe_text",
            ViolationCategory::UnsafeFile => "unsafe_file",
            ViolationCategory::Unverifiable => "unverifiable",
        }
    }
}

impl Violation {
    pub fn category(&self) -> ViolationCategory {
        match self {
            Violation::ScriptTag
            | Violation::JavascriptProtocol
            | Violation::EventHandler
            | Violation::VbscriptProtocol => ViolationCategory::ScriptContentDetected,
            Violation::Base64DataUri => ViolationCategory::Base64DataUriRejected,
            Violation::MalformedHtml => ViolationCategory::MalformedHtml,
            Violation::DisallowedTag(_) => ViolationCategory::DisallowedTag,
            Violation::DisallowedAttribute { .. } => ViolationCategory::DisallowedAttribute,
            Violation::UnsafeUrl(_) => ViolationCategory::UnsafeUrl,
            Violation::AngleBrackets => ViolationCategory::UnsafeText,
            Violation::InvalidFileName
            | Violation::EmptyFile
            | Violation::FileTooLarge { .. }
            | Violation::DisallowedExtension(_)
            | Violation::DoubleExtension(_)
            | Violation::ContentMismatch(_)
            | Violation::EmbeddedCode => ViolationCategory::UnsafeFile,
            Violation::Unverifiable => ViolationCategory::Unverifiable,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::ScriptTag => write!(f, "script tags not allowed"),
            Violation::JavascriptProtocol => write!(f, "javascript: URLs not allowed"),
            Violation::EventHandler => write!(f, "inline event handlers not allowed"),
            Violation::Base64DataUri => write!(f, "base64 data URIs not allowed"),
            Violation::VbscriptProtocol => write!(f, "vbscript: URLs not allowed"),
            Violation::MalformedHtml => write!(f, "invalid HTML structure"),
            Violation::DisallowedTag(tag) => write!(f, "tag not allowed: <{}>", tag),
            Violation::DisallowedAttribute { tag, attribute } => {
                write!(f, "attribute not allowed: {} on <{}>", attribute, tag)
            }
            // The offending URL is kept for logs, not echoed to users.
            Violation::UnsafeUrl(_) => write!(f, "unsafe URLs"),
            Violation::AngleBrackets => write!(f, "HTML not allowed"),
            Violation::InvalidFileName => write!(f, "invalid file name"),
            Violation::EmptyFile => write!(f, "file is empty"),
            Violation::FileTooLarge { size, limit } => {
                write!(f, "file is {} bytes, limit is {} bytes", size, limit)
            }
            Violation::DisallowedExtension(ext) => write!(f, "file type .{} not allowed", ext),
            Violation::DoubleExtension(ext) => write!(f, "suspicious double extension .{}", ext),
            Violation::ContentMismatch(ext) => {
                write!(f, "file content does not match .{}", ext)
            }
            Violation::EmbeddedCode => write!(f, "file contains embedded code"),
            Violation::Unverifiable => write!(f, "input could not be verified"),
        }
    }
}

/// Outcome of one rule invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Verdict {
    violation: Option<Violation>,
}

impl Verdict {
    pub fn pass() -> Self {
        Self { violation: None }
    }

    pub fn fail(violation: Violation) -> Self {
        Self {
            violation: Some(violation),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.violation.is_none()
    }

    pub fn violation(&self) -> Option<&Violation> {
        self.violation.as_ref()
    }

    pub fn category(&self) -> Option<ViolationCategory> {
        self.violation.as_ref().map(Violation::category)
    }

    /// Human-readable reason, present only on failure.
    pub fn reason(&self) -> Option<String> {
        self.violation.as_ref().map(ToString::to_string)
    }

    /// Runs `next` only if this verdict passed. The first failure wins.
    pub fn and_then<F>(self, next: F) -> Verdict
    where
        F: FnOnce() -> Verdict,
    {
        if self.is_valid() { next() } else { self }
    }
}

impl From<Result<(), Violation>> for Verdict {
    fn from(result: Result<(), Violation>) -> Self {
        match result {
            Ok(()) => Verdict::pass(),
            Err(violation) => Verdict::fail(violation),
        }
    }
}
