//! Anti-forgery token discovery.
//!
//! Pages of the web application embed the token either as
//! `<meta name="csrf-token" content="...">` or as a hidden form input named
//! `csrf_token`. Attribute order and quoting vary between templates.

use std::sync::LazyLock;

use regex::Regex;

static META_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta\b[^>]*\bname\s*=\s*["']csrf[-_]token["'][^>]*>"#)
        .expect("failed to compile meta tag pattern")
});

static HIDDEN_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<input\b[^>]*\bname\s*=\s*["']csrf_token["'][^>]*>"#)
        .expect("failed to compile hidden input pattern")
});

static CONTENT_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\scontent\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("failed to compile content attribute pattern")
});

static VALUE_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\svalue\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("failed to compile value attribute pattern")
});

fn attribute_value<'a>(tag: &'a str, attribute: &Regex) -> Option<&'a str> {
    let captures = attribute.captures(tag)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|value| value.as_str())
}

/// Extracts the anti-forgery token from a rendered page, preferring the meta
/// tag over a hidden input. Empty tokens count as absent.
pub fn extract_token(html: &str) -> Option<String> {
    let from_meta = META_TAG
        .find(html)
        .and_then(|tag| attribute_value(tag.as_str(), &CONTENT_ATTRIBUTE));
    let from_input = || {
        HIDDEN_INPUT
            .find(html)
            .and_then(|tag| attribute_value(tag.as_str(), &VALUE_ATTRIBUTE))
    };

    from_meta
        .or_else(from_input)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
