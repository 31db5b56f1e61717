//! HTML text helpers for descriptions and excerpts.

use std::sync::LazyLock;

use regex::Regex;

static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p(?:\s[^>]*)?>.+?</p>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static EXCERPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--\s?excerpt\s?-->(.*)<!--\s?endexcerpt\s?-->").unwrap()
});
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Text of the first `<p>` element with tags stripped, if any.
pub fn first_paragraph(html: &str) -> Option<String> {
    PARAGRAPH_RE
        .find(html)
        .map(|m| strip_tags(m.as_str()).trim().to_owned())
}

/// Remove all HTML tags.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

/// Content between `<!--excerpt-->` and `<!--endexcerpt-->` markers.
pub fn marked_excerpt(html: &str) -> Option<String> {
    EXCERPT_RE.captures(html).map(|caps| caps[1].to_owned())
}

/// Remove HTML comments.
pub fn strip_comments(html: &str) -> String {
    COMMENT_RE.replace_all(html, "").into_owned()
}
