//! Front matter splitting.
//!
//! A document may begin with a `---` line followed by YAML and a closing
//! `---` line. Everything after the closing marker is the body.

use std::sync::LazyLock;

use regex::Regex;

/// Marker: a line that is exactly `---` plus optional trailing whitespace.
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^---[ \t\r]*$").unwrap());

/// UTF-8 byte order mark.
const BOM: char = '\u{feff}';

/// Split document text into `(front_matter, body)`.
///
/// Both parts are trimmed. When there is no front matter block the first
/// element is empty and the body is the whole (trimmed) document.
pub fn split(data: &str) -> (&str, &str) {
    let data = data.trim_start_matches(BOM).trim();

    if let Some((first, rest)) = data.split_once('\n')
        && MARKER_RE.is_match(first)
        && let Some(closing) = MARKER_RE.find(rest)
    {
        let meta = rest[..closing.start()].trim();
        let body = rest[closing.end()..].trim();
        return (meta, body);
    }

    ("", data)
}
