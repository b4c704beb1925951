//! GitHub-flavored markdown anchor/slug generation for `@see` links and
//! member indexes.

use std::sync::LazyLock;

use regex::Regex;

// {@link target} / {@link target|label}
static RE_INLINE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{@link(?:code|plain)?\s+([^}|\s]+)(?:\s*[|\s]\s*([^}]+))?\}$").unwrap());

/// Generate a link for a reference to another identifier.
pub fn render_toc_link(text: &str) -> String {
    let text = text.trim();

    if let Some(caps) = RE_INLINE_LINK.captures(text) {
        let target = &caps[1];
        let label = caps.get(2).map_or(target, |m| m.as_str().trim());
        if is_url(target) || is_relative(target) {
            return format!("[{}]({})", label, target);
        }
        return format!("[{}](#{})", label, github_slug(target));
    }

    if is_relative(text) {
        return format!("[{}]({})", text, text);
    }

    // Already a markdown link
    if contains_markdown_link(text) {
        return text.to_string();
    }

    if is_url(text) {
        return format!("[{}]({})", text, text);
    }

    format!("[{}](#{})", text, github_slug(text))
}

/// Generate a TOC list item.
pub fn render_toc_item(title: &str) -> String {
    format!("* {}", render_toc_link(title))
}

fn is_relative(text: &str) -> bool {
    text.starts_with('/') || text.starts_with("./") || text.starts_with("../")
}

fn is_url(text: &str) -> bool {
    ["http://", "https://", "ftp://"]
        .iter()
        .any(|scheme| text.starts_with(scheme))
}

/// GitHub heading anchor slug generation.
///
/// - lowercase
/// - keep alphanumerics, spaces, hyphens and underscores
/// - replace spaces with hyphens
fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

/// Check if text contains a markdown link `[...](...)`.
fn contains_markdown_link(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'[' {
            if let Some(close) = text[i + 1..].find(']') {
                let after = i + 1 + close + 1;
                if after < bytes.len() && bytes[after] == b'(' {
                    return true;
                }
            }
        }
        i += 1;
    }
    false
}
