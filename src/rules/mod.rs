// src/rules/mod.rs

pub mod allowlist;
pub mod messages;
pub mod policy;
pub mod rich_text;
pub mod safe_text;
pub mod script;
pub mod structure;
pub mod upload;
pub mod url;
pub mod verdict;

pub use allowlist::AllowlistEnforcer;
pub use messages::MessageCatalog;
pub use policy::{HtmlPolicy, PolicyError};
pub use rich_text::RichTextRule;
pub use safe_text::SafeTextRule;
pub use script::ScriptDetector;
pub use structure::{Fragment, StructureValidator, is_well_formed};
pub use upload::{FileCategory, FileUploadRule, UploadedFile};
pub use self::url::{UrlChecker, is_safe_url};
pub use verdict::{Verdict, Violation, ViolationCategory};

/// A single validation capability: inspect a value, report a verdict.
///
/// Implementations are stateless apart from their immutable configuration,
/// so one instance can serve any number of concurrent requests.
pub trait Rule<T: ?Sized> {
    fn validate(&self, value: &T) -> Verdict;
}
