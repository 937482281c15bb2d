// src/rules/policy.rs

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt, fs,
    path::Path,
};

use serde::{Deserialize, Serialize};

/// Tags permitted in rich text by default.
const DEFAULT_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "code", "div", "em", "figcaption", "figure", "h1", "h2",
    "h3", "h4", "h5", "h6", "hr", "i", "img", "li", "ol", "p", "pre", "s", "span", "strike",
    "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "u", "ul",
];

/// Per-tag attribute allow-list. Tags missing here allow no attributes at all.
const DEFAULT_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "title", "target", "rel"]),
    ("img", &["src", "alt", "title", "width", "height"]),
    ("td", &["colspan", "rowspan"]),
    ("th", &["colspan", "rowspan", "scope"]),
    ("ol", &["start"]),
    ("p", &["class"]),
    ("div", &["class"]),
    ("span", &["class"]),
    ("pre", &["class"]),
    ("code", &["class"]),
    ("table", &["class"]),
];

const DEFAULT_VERSION: &str = "2024-01";

#[derive(Debug)]
pub enum PolicyError {
    Io(String),
    Parse(String),
    /// The tables are internally inconsistent.
    Invalid(String),
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::Io(msg) => write!(f, "cannot read policy: {}", msg),
            PolicyError::Parse(msg) => write!(f, "cannot parse policy: {}", msg),
            PolicyError::Invalid(msg) => write!(f, "invalid policy: {}", msg),
        }
    }
}

impl std::error::Error for PolicyError {}

#[derive(Debug, Deserialize)]
struct PolicyTables {
    version: String,
    allowed_tags: BTreeSet<String>,
    #[serde(default)]
    allowed_attributes: BTreeMap<String, BTreeSet<String>>,
}

/// Immutable allow-list configuration for rich-text HTML.
///
/// Built once at startup and shared behind an `Arc`; nothing mutates it per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HtmlPolicy {
    version: String,
    allowed_tags: BTreeSet<String>,
    allowed_attributes: BTreeMap<String, BTreeSet<String>>,
}

impl HtmlPolicy {
    /// Builds a policy from explicit tables, rejecting inconsistent ones.
    pub fn new(
        version: impl Into<String>,
        allowed_tags: BTreeSet<String>,
        allowed_attributes: BTreeMap<String, BTreeSet<String>>,
    ) -> Result<Self, PolicyError> {
        let policy = Self {
            version: version.into(),
            allowed_tags,
            allowed_attributes,
        };
        policy.check()?;
        Ok(policy)
    }

    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let tables: PolicyTables =
            serde_json::from_str(json).map_err(|e| PolicyError::Parse(e.to_string()))?;
        Self::new(tables.version, tables.allowed_tags, tables.allowed_attributes)
    }

    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let json = fs::read_to_string(path)
            .map_err(|e| PolicyError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn allowed_tags(&self) -> &BTreeSet<String> {
        &self.allowed_tags
    }

    pub fn allowed_attributes(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.allowed_attributes
    }

    /// `tag` must already be lowercase.
    pub fn is_tag_allowed(&self, tag: &str) -> bool {
        self.allowed_tags.contains(tag)
    }

    /// A tag without an entry allows zero attributes.
    pub fn is_attribute_allowed(&self, tag: &str, attribute: &str) -> bool {
        self.allowed_attributes
            .get(tag)
            .is_some_and(|attributes| attributes.contains(attribute))
    }

    fn check(&self) -> Result<(), PolicyError> {
        if self.allowed_tags.is_empty() {
            return Err(PolicyError::Invalid("allowed_tags is empty".to_string()));
        }

        for tag in &self.allowed_tags {
            if !is_lower_name(tag) {
                return Err(PolicyError::Invalid(format!("bad tag name '{}'", tag)));
            }
            if matches!(tag.as_str(), "script" | "style" | "iframe" | "object" | "embed") {
                return Err(PolicyError::Invalid(format!("tag '{}' cannot be allowed", tag)));
            }
        }

        for (tag, attributes) in &self.allowed_attributes {
            if !self.allowed_tags.contains(tag) {
                return Err(PolicyError::Invalid(format!(
                    "attributes listed for tag '{}' which is not allowed",
                    tag
                )));
            }
            for attribute in attributes {
                if !is_lower_name(attribute) {
                    return Err(PolicyError::Invalid(format!(
                        "bad attribute name '{}' on '{}'",
                        attribute, tag
                    )));
                }
                // Event handlers would defeat the whole rule.
                if attribute.starts_with("on") {
                    return Err(PolicyError::Invalid(format!(
                        "event handler attribute '{}' cannot be allowed",
                        attribute
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for HtmlPolicy {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            allowed_tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
            allowed_attributes: DEFAULT_ATTRIBUTES
                .iter()
                .map(|(tag, attributes)| {
                    (
                        tag.to_string(),
                        attributes.iter().map(|a| a.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

fn is_lower_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
