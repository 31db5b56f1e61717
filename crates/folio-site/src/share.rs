//! Social network share links.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// RFC 3986 unreserved characters stay as-is: A-Z a-z 0-9 - . _ ~
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Networks understood by [`share_link`].
pub const SHARE_NETWORKS: [&str; 6] = ["twitter", "facebook", "linkedin", "reddit", "hackernews", "email"];

/// Share URL for a page on `network`, or `None` for an unknown network.
#[must_use]
pub fn share_link(network: &str, url: &str, title: &str) -> Option<String> {
    let url = utf8_percent_encode(url, QUERY_ENCODE_SET);
    let title = utf8_percent_encode(title, QUERY_ENCODE_SET);

    let link = match network.to_ascii_lowercase().as_str() {
        "twitter" => format!("https://twitter.com/intent/tweet?url={url}&text={title}"),
        "facebook" => format!("https://www.facebook.com/sharer/sharer.php?u={url}"),
        "linkedin" => format!("https://www.linkedin.com/sharing/share-offsite/?url={url}"),
        "reddit" => format!("https://www.reddit.com/submit?url={url}&title={title}"),
        "hackernews" => format!("https://news.ycombinator.com/submitlink?u={url}&t={title}"),
        "email" => format!("mailto:?subject={title}&body={url}"),
        _ => return None,
    };
    Some(link)
}
