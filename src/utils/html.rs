use std::collections::{HashMap, HashSet};

use ammonia::Builder;

use crate::rules::HtmlPolicy;

/// Clean HTML content using the ammonia library, configured from the active
/// [`HtmlPolicy`] so cleaning and validation agree on what is allowed.
///
/// Unlike the rich-text rule, this repairs instead of rejecting: disallowed tags
/// are dropped (with `<script>`/`<style>` content), disallowed attributes stripped,
/// and URLs outside http/https/mailto removed.
///
/// Note: rendering raw code should use entity escaping on the frontend, not this.
pub fn clean_html(policy: &HtmlPolicy, input: &str) -> String {
    let tags: HashSet<&str> = policy.allowed_tags().iter().map(String::as_str).collect();
    let tag_attributes: HashMap<&str, HashSet<&str>> = policy
        .allowed_attributes()
        .iter()
        .map(|(tag, attributes)| {
            (
                tag.as_str(),
                attributes.iter().map(String::as_str).collect(),
            )
        })
        .collect();

    let mut builder = Builder::default();
    builder
        .tags(tags)
        .tag_attributes(tag_attributes)
        .generic_attributes(HashSet::new())
        .url_schemes(HashSet::from(["http", "https", "mailto"]))
        // `rel` may be in the allow-list; ammonia refuses to manage it too.
        .link_rel(None);

    builder.clean(input).to_string()
}
