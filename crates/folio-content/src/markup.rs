//! Markup transforms applied to content bodies before templating.
//!
//! Each transform is a pure `render(raw) -> html` function behind the
//! [`Markup`] trait. The file extension picks the transform; files that are
//! neither Markdown nor Textile are template sources and pass through
//! unchanged.

use std::fmt::Write;
use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use serde::Serialize;

/// A text-to-HTML transform.
pub trait Markup: Send + Sync {
    /// Render raw markup to HTML.
    fn render(&self, raw: &str) -> String;
}

/// Which transform produced an entity's body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Rendered from Markdown.
    Markdown,
    /// Rendered from Textile.
    Textile,
    /// Template source, interpreted directly by the templating engine.
    Template,
}

impl ContentType {
    /// Select the content type for a file extension.
    #[must_use]
    pub fn for_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Self::Markdown,
            "tx" | "textile" => Self::Textile,
            _ => Self::Template,
        }
    }
}

/// Markdown transform backed by `pulldown-cmark`.
///
/// Code block text is wrapped in `{% raw %}` so template directives inside
/// code samples are printed, not evaluated.
#[derive(Clone, Debug)]
pub struct Markdown {
    options: Options,
    raw_code_blocks: bool,
}

impl Default for Markdown {
    fn default() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_TASKLISTS,
            raw_code_blocks: true,
        }
    }
}

impl Markdown {
    /// Markdown for output that is never parsed as a template again
    /// (e.g. a template filter), so code blocks are not `raw`-wrapped.
    #[must_use]
    pub fn without_raw_blocks() -> Self {
        Self {
            raw_code_blocks: false,
            ..Self::default()
        }
    }
}

impl Markup for Markdown {
    fn render(&self, raw: &str) -> String {
        let mut in_code_block = false;
        let protect = self.raw_code_blocks;
        let events = Parser::new_ext(raw, self.options).map(|event| match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                Event::Start(Tag::CodeBlock(kind))
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                Event::End(TagEnd::CodeBlock)
            }
            Event::Text(text) if in_code_block && protect => {
                Event::Html(format!("{{% raw %}}{}{{% endraw %}}", escape_html(&text)).into())
            }
            other => other,
        });

        let mut html = String::with_capacity(raw.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, events);
        html
    }
}

static STRONG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^\s*](?:[^*]*[^\s*])?)\*").unwrap());
static EMPHASIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b_([^\s_](?:[^_]*[^\s_])?)_\b").unwrap());
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@([^@\n]+)@").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)":([^\s<"]*[^\s<".,;:!?)])"#).unwrap());
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^h([1-6])\.\s+(.*)$").unwrap());

/// Textile transform covering the block-level essentials.
///
/// Supports `h1.`-`h6.`, `p.`, `bq.`, `*` and `#` lists, `*strong*`,
/// `_emphasis_`, `@code@` and `"text":url` links. Blocks are separated by
/// blank lines; single newlines inside a paragraph become `<br />`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Textile;

impl Textile {
    fn inline(text: &str) -> String {
        let text = CODE_RE.replace_all(text, "<code>$1</code>");
        let text = LINK_RE.replace_all(&text, r#"<a href="$2">$1</a>"#);
        let text = STRONG_RE.replace_all(&text, "<strong>$1</strong>");
        EMPHASIS_RE
            .replace_all(&text, "<em>$1</em>")
            .into_owned()
    }

    fn list(html: &mut String, block: &str, marker: char) {
        let tag = if marker == '*' { "ul" } else { "ol" };
        let _ = writeln!(html, "<{tag}>");
        for line in block.lines() {
            let item = line.trim_start_matches(marker).trim();
            let _ = writeln!(html, "\t<li>{}</li>", Self::inline(item));
        }
        let _ = writeln!(html, "</{tag}>");
    }
}

impl Markup for Textile {
    fn render(&self, raw: &str) -> String {
        let mut html = String::with_capacity(raw.len() * 3 / 2);
        let normalized = raw.replace("\r\n", "\n");

        for block in normalized.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
            if let Some(caps) = HEADING_RE.captures(block) {
                let level = &caps[1];
                let _ = writeln!(html, "<h{level}>{}</h{level}>", Self::inline(caps[2].trim()));
            } else if let Some(quote) = block.strip_prefix("bq. ") {
                let _ = writeln!(
                    html,
                    "<blockquote>\n\t<p>{}</p>\n</blockquote>",
                    Self::inline(quote.trim())
                );
            } else if block.lines().all(|l| l.starts_with("* ")) {
                Self::list(&mut html, block, '*');
            } else if block.lines().all(|l| l.starts_with("# ")) {
                Self::list(&mut html, block, '#');
            } else if block.starts_with('<') {
                // Raw HTML blocks pass through.
                let _ = writeln!(html, "{block}");
            } else {
                let text = block.strip_prefix("p. ").unwrap_or(block);
                let lines: Vec<String> = text.lines().map(Self::inline).collect();
                let _ = writeln!(html, "<p>{}</p>", lines.join("<br />\n"));
            }
        }

        html
    }
}

/// Escape HTML special characters.
pub(crate) fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}
