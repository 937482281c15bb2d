// src/rules/structure.rs

use std::panic::{self, AssertUnwindSafe};

use html5ever::{
    ParseOpts, parse_document, tendril::TendrilSink, tokenizer::TokenizerOpts,
    tree_builder::TreeBuilderOpts,
};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::{Rule, Verdict, Violation};

const SHELL_OPEN: &str = "<!doctype html><html><body>";
const SHELL_CLOSE: &str = "</body></html>";
/// Comment placed right after the fragment. Input that stops inside a tag swallows it.
const END_MARKER: &str = "content-guard:end";

/// Deeper trees are rejected as malformed.
pub const MAX_NESTING_DEPTH: usize = 256;

/// One element of a parsed fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase local name.
    pub name: String,
    /// `(name, decoded value)` pairs in source order.
    pub attributes: Vec<(String, String)>,
}

impl Element {
    /// Whether this is part of the `html`/`head`/`body` shell the fragment is parsed in.
    pub fn is_shell(&self) -> bool {
        matches!(self.name.as_str(), "html" | "head" | "body")
    }
}

/// An HTML fragment that parsed cleanly inside the document shell.
#[derive(Debug)]
pub struct Fragment {
    elements: Vec<Element>,
}

impl Fragment {
    /// Parses `fragment` inside a minimal document shell.
    ///
    /// Parser diagnostics are inspected and then dropped, never logged.
    /// Fails with [`Violation::MalformedHtml`] when the input ends inside an
    /// unterminated construct, nests deeper than [`MAX_NESTING_DEPTH`],
    /// yields an element whose name is not a tag name, or yields no body.
    /// Fails with [`Violation::Unverifiable`] if the parser itself breaks.
    pub fn parse(fragment: &str) -> Result<Self, Violation> {
        let document = format!(
            "{}{}<!--{}-->{}",
            SHELL_OPEN, fragment, END_MARKER, SHELL_CLOSE
        );

        let dom = panic::catch_unwind(AssertUnwindSafe(|| {
            parse_document(RcDom::default(), parse_opts()).one(document.as_str())
        }))
        .map_err(|_| {
            tracing::error!("HTML parser panicked; rejecting input");
            Violation::Unverifiable
        })?;

        // Unterminated tags, attribute values and comments run into end of input.
        if dom.errors.iter().any(|e| e.contains("EOF")) {
            return Err(Violation::MalformedHtml);
        }

        let (elements, last) = walk(&dom.document)?;

        // `<p` or `<a href=x` at the end reads on into the marker and the shell close.
        if !is_end_marker(&last) {
            return Err(Violation::MalformedHtml);
        }
        if elements
            .iter()
            .any(|e| !e.is_shell() && !is_tag_name(&e.name))
        {
            return Err(Violation::MalformedHtml);
        }
        if !elements.iter().any(|e| e.name == "body") {
            return Err(Violation::MalformedHtml);
        }

        Ok(Self { elements })
    }

    /// All elements in document order, shell included.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }
}

/// Whether `fragment` survives [`Fragment::parse`].
pub fn is_well_formed(fragment: &str) -> bool {
    Fragment::parse(fragment).is_ok()
}

fn parse_opts() -> ParseOpts {
    ParseOpts {
        tokenizer: TokenizerOpts {
            exact_errors: false,
            ..Default::default()
        },
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            drop_doctype: true,
            ..Default::default()
        },
    }
}

/// `[a-z][a-z0-9-]*`, which is what the tokenizer yields for a complete tag.
fn is_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn is_end_marker(node: &Handle) -> bool {
    matches!(node.data, NodeData::Comment { ref contents } if &**contents == END_MARKER)
}

/// Iterative pre-order walk so hostile nesting cannot exhaust the stack.
/// Returns every element plus the last node visited.
fn walk(document: &Handle) -> Result<(Vec<Element>, Handle), Violation> {
    let mut elements = Vec::new();
    let mut last = document.clone();
    let mut stack: Vec<(Handle, usize)> = vec![(document.clone(), 0)];

    while let Some((node, depth)) = stack.pop() {
        if depth > MAX_NESTING_DEPTH {
            return Err(Violation::MalformedHtml);
        }

        if let NodeData::Element {
            ref name,
            ref attrs,
            ..
        } = node.data
        {
            let attributes = attrs
                .borrow()
                .iter()
                .map(|attr| {
                    let local = attr.name.local.to_ascii_lowercase().to_string();
                    let name = match attr.name.prefix {
                        Some(ref prefix) => format!("{}:{}", prefix, local),
                        None => local,
                    };
                    (name, attr.value.to_string())
                })
                .collect();
            elements.push(Element {
                name: name.local.to_ascii_lowercase().to_string(),
                attributes,
            });
        }

        for child in node.children.borrow().iter().rev() {
            stack.push((child.clone(), depth + 1));
        }
        last = node;
    }

    Ok((elements, last))
}

/// Structural check as a rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureValidator;

impl Rule<str> for StructureValidator {
    fn validate(&self, value: &str) -> Verdict {
        Fragment::parse(value).map(|_| ()).into()
    }
}
