//! Template environment: loader chain, globals, functions and filters.
//!
//! Template names resolve first against content ids (virtual templates),
//! then against files in `<source>/_templates` and `<source>/_includes`.
//! File lookups try the name as given and, for names without an extension,
//! the name with each of [`TEMPLATE_EXTENSIONS`] appended.

use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use minijinja::{AutoEscape, Environment, Error, ErrorKind, Output, State, Value};
use regex::Regex;

use folio_assets::AssetManifest;
use folio_content::{Markdown, Markup, SiteUrl, parse_date};

use crate::context::SiteGlobals;
use crate::{TemplateResolver, share_link};

/// Extensions tried for extension-less template names.
pub const TEMPLATE_EXTENSIONS: [&str; 4] = ["twig", "html", "jinja", "xml"];

/// Template directories under the source root, in lookup order.
const TEMPLATE_DIRS: [&str; 2] = ["_templates", "_includes"];

/// Names rendered without HTML escaping.
const UNESCAPED_EXTENSIONS: [&str; 4] = ["txt", "json", "css", "js"];

/// Default format of the `date` filter.
const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Inputs for building a template environment.
pub struct EnvironmentOptions {
    /// Site root URL rule.
    pub site_url: SiteUrl,
    /// Asset revision lookup.
    pub manifest: Arc<AssetManifest>,
    /// Source root (template directories live under it).
    pub source_dir: PathBuf,
    /// Output root (for `file_exists`).
    pub output_dir: PathBuf,
    /// The `site` global.
    pub globals: SiteGlobals,
}

/// Build the template environment for one build run.
#[must_use]
pub fn create_environment(resolver: TemplateResolver, options: EnvironmentOptions) -> Environment<'static> {
    let mut env = Environment::new();

    let loaders: Vec<_> = TEMPLATE_DIRS
        .iter()
        .map(|dir| options.source_dir.join(dir))
        .filter(|dir| dir.is_dir())
        .inspect(|dir| tracing::debug!(dir = %dir.display(), "Template directory"))
        .map(minijinja::path_loader)
        .collect();

    env.set_loader(move |name| {
        if resolver.exists(name) {
            return resolver
                .get_source(name)
                .map(Some)
                .map_err(|e| Error::new(ErrorKind::TemplateNotFound, e.to_string()));
        }
        for loader in &loaders {
            for candidate in candidates(name) {
                if let Some(source) = loader(&candidate)? {
                    return Ok(Some(source));
                }
            }
        }
        Ok(None)
    });

    env.set_auto_escape_callback(auto_escape);
    env.set_formatter(html_formatter);
    env.add_global("site", Value::from_serialize(&options.globals));

    let site_url = options.site_url.clone();
    env.add_function("url", move |path: &str| site_url.resolve(path));

    let site_url = options.site_url.clone();
    let manifest = options.manifest;
    env.add_function("asset", move |path: &str| asset_url(path, &manifest, &site_url));

    let site_url = options.site_url.clone();
    env.add_function("is_current", move |url: &str, pattern: &str| {
        is_current(site_url.strip_root(url), pattern)
    });

    env.add_function("clean_string", |s: &str| clean_string(s));

    let output_dir = options.output_dir.clone();
    env.add_function("file_exists", move |path: &str| {
        output_dir.join(path.trim_start_matches('/')).exists()
    });

    let site_url = options.site_url.clone();
    let output_dir = options.output_dir;
    env.add_function("image", move |page: Value, name: &str, default: Option<&str>| {
        page_image(&page, name, default, &output_dir, &site_url)
    });

    env.add_function("share_link", |network: &str, page: Value| {
        let url = attr_str(&page, "url").unwrap_or_default();
        let title = attr_str(&page, "title").unwrap_or_default();
        share_link(network, &url, &title).ok_or_else(|| {
            Error::new(ErrorKind::InvalidOperation, format!("unknown share network: {network}"))
        })
    });

    env.add_function("edit_button", edit_button);

    let markdown = Markdown::without_raw_blocks();
    env.add_filter("markdown", move |s: &str| Value::from_safe_string(markdown.render(s)));
    env.add_filter("truncate", |s: &str, width: usize| Value::from_safe_string(truncate(s, width)));
    env.add_filter("wrap", |s: &str, prefix: &str, suffix: &str| {
        Value::from_safe_string(wrap(s, prefix, suffix))
    });
    env.add_filter("date", date_filter);

    env
}

fn candidates(name: &str) -> Vec<String> {
    let file = name.rsplit('/').next().unwrap_or(name);
    if file.contains('.') {
        return vec![name.to_owned()];
    }
    std::iter::once(name.to_owned())
        .chain(TEMPLATE_EXTENSIONS.iter().map(|ext| format!("{name}.{ext}")))
        .collect()
}

fn auto_escape(name: &str) -> AutoEscape {
    let ext = Path::new(name).extension().and_then(|e| e.to_str()).unwrap_or_default();
    if UNESCAPED_EXTENSIONS.contains(&ext) {
        AutoEscape::None
    } else {
        AutoEscape::Html
    }
}

/// Escape like an HTML template engine: `&`, `<`, `>` and quotes only, so
/// URLs print unchanged.
fn html_formatter(out: &mut Output<'_>, state: &State<'_, '_>, value: &Value) -> Result<(), Error> {
    if matches!(state.auto_escape(), AutoEscape::Html)
        && !value.is_safe()
        && !value.is_undefined()
        && !value.is_none()
    {
        out.write_str(&escape_html(&value.to_string()))
            .map_err(|_| Error::new(ErrorKind::WriteFailure, "failed to write output"))
    } else {
        minijinja::escape_formatter(out, state, value)
    }
}

fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// URL of a static asset: absolute paths as-is, others through the manifest
/// under `/assets/`.
pub(crate) fn asset_url(path: &str, manifest: &AssetManifest, site_url: &SiteUrl) -> String {
    if path.starts_with('/') {
        return site_url.resolve(path);
    }
    let revisioned = manifest.get(path);
    site_url.resolve(&format!("/assets/{}", revisioned.trim_matches('/')))
}

/// Match `url` against `*`-wildcard patterns separated by `|`.
pub(crate) fn is_current(url: &str, pattern: &str) -> bool {
    if url == pattern {
        return true;
    }
    pattern.split('|').any(|alternative| {
        let quoted = regex::escape(alternative).replace(r"\*", ".*");
        Regex::new(&format!(r"^{quoted}\z")).is_ok_and(|re| re.is_match(url))
    })
}

/// Collapse runs of whitespace and trim.
pub(crate) fn clean_string(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First word-wrapped line of at most `width` characters, with `...` when
/// text was cut. A single word longer than `width` is kept whole.
pub(crate) fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_owned();
    }

    let mut line = String::new();
    for word in s.split(' ') {
        if line.is_empty() {
            line.push_str(word);
        } else if line.chars().count() + 1 + word.chars().count() > width {
            line.push_str("...");
            return line;
        } else {
            line.push(' ');
            line.push_str(word);
        }
    }
    line
}

/// Surround non-empty text with `prefix` and `suffix`.
pub(crate) fn wrap(s: &str, prefix: &str, suffix: &str) -> String {
    if s.is_empty() {
        String::new()
    } else {
        format!("{prefix}{s}{suffix}")
    }
}

/// String attribute of a template value, if present.
fn attr_str(value: &Value, name: &str) -> Option<String> {
    value
        .get_attr(name)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
}

/// `images/<name>` from the page's `images` directory when that file exists
/// in the output, else `default`.
fn page_image(
    page: &Value,
    name: &str,
    default: Option<&str>,
    output_dir: &Path,
    site_url: &SiteUrl,
) -> String {
    if let Some(images) = attr_str(page, "images") {
        let path = format!("{}/{name}", images.trim_end_matches('/'));
        if output_dir.join(path.trim_start_matches('/')).is_file() {
            return site_url.resolve(&path);
        }
    }
    site_url.resolve(default.unwrap_or_default())
}

/// Render `template` with an `edit_url` built from the parent's `edit_url`
/// (`{filename}` replaced by the page's source filename).
///
/// Only markdown pages with a parent that declares `edit_url` get a button.
fn edit_button(state: &State<'_, '_>, page: Value, parent: Value, template: &str) -> Result<Value, Error> {
    if attr_str(&page, "type").as_deref() != Some("markdown") {
        return Ok(Value::from(""));
    }
    let Some(edit_url) = attr_str(&parent, "edit_url").filter(|url| !url.is_empty()) else {
        return Ok(Value::from(""));
    };

    let filename = attr_str(&page, "filename").unwrap_or_default();
    let edit_url = edit_url.replace("{filename}", &filename);
    let html = state
        .env()
        .get_template(template)?
        .render(minijinja::context! { edit_url, page })?;
    Ok(Value::from_safe_string(html))
}

fn date_filter(value: &Value, format: Option<&str>) -> Result<String, Error> {
    let date = to_date(value).ok_or_else(|| {
        Error::new(ErrorKind::InvalidOperation, format!("cannot format {value} as a date"))
    })?;

    let mut out = String::new();
    write!(out, "{}", date.format(format.unwrap_or(DEFAULT_DATE_FORMAT))).map_err(|_| {
        Error::new(ErrorKind::InvalidOperation, "invalid date format string")
    })?;
    Ok(out)
}

fn to_date(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(s) = value.as_str() {
        return parse_date(&serde_json::Value::String(s.to_owned()));
    }
    i64::try_from(value.clone())
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::TimeZone;
    use folio_content::{ContentEntity, ContentKind, SiteContext, SourceFile};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::SiteGraph;

    fn env_with(source_dir: &Path, pages: &[(&str, &str)]) -> Environment<'static> {
        let site_url = SiteUrl::new("https://example.com", false);
        let ctx = SiteContext::new(site_url.clone());
        let mut graph = SiteGraph::new();
        for (relative, data) in pages {
            let file = SourceFile::virtual_file(relative, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
            graph.add_content(ContentEntity::parse(ContentKind::Page, &file, data, &ctx).unwrap());
        }
        let globals = SiteGlobals::new("Test", "https://example.com", Utc::now(), "local", &graph);
        let graph = Arc::new(graph);
        create_environment(
            TemplateResolver::new(graph),
            EnvironmentOptions {
                site_url,
                manifest: Arc::new(AssetManifest::from_entries(HashMap::from([(
                    "app.css".to_owned(),
                    "app-1a2b.css".to_owned(),
                )]))),
                source_dir: source_dir.to_path_buf(),
                output_dir: source_dir.join("public"),
                globals,
            },
        )
    }

    #[test]
    fn test_virtual_template_extends_layout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("_templates")).unwrap();
        std::fs::write(
            dir.path().join("_templates/page.twig"),
            "<title>{{ site.title }}</title><main>{% block content %}{% endblock %}</main>",
        )
        .unwrap();

        let env = env_with(dir.path(), &[("about.md", "---\ntemplate: page\n---\nHi *you*")]);
        let html = env.get_template("about.html").unwrap().render(()).unwrap();

        assert_eq!(html, "<title>Test</title><main><p>Hi <em>you</em></p>\n</main>");
    }

    #[test]
    fn test_includes_directory_and_named_block() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("_templates")).unwrap();
        std::fs::create_dir_all(dir.path().join("_includes")).unwrap();
        std::fs::write(
            dir.path().join("_templates/base.html"),
            "[{% block header %}{% endblock %}|{% include \"nav\" %}]",
        )
        .unwrap();
        std::fs::write(dir.path().join("_includes/nav.twig"), "nav").unwrap();

        let env = env_with(dir.path(), &[("x.twig", "---\ntemplate: base::header\n---\nTop")]);
        let html = env.get_template("x.html").unwrap().render(()).unwrap();

        assert_eq!(html, "[Top|nav]");
    }

    #[test]
    fn test_code_block_directives_are_not_evaluated() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_with(
            dir.path(),
            &[("code.md", "---\ntemplate: none\n---\n```\n{{ secret }}\n```")],
        );
        let html = env.get_template("code.md").unwrap().render(()).unwrap();
        assert!(html.contains("{{ secret }}"));
    }

    #[test]
    fn test_missing_layout_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_with(dir.path(), &[("a.twig", "---\ntemplate: nope\n---\nA")]);
        let err = env.get_template("a.html").unwrap().render(()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
    }

    #[test]
    fn test_functions() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_with(dir.path(), &[]);
        let render = |src: &str| env.render_str(src, ()).unwrap();

        assert_eq!(render("{{ url('/blog') }}"), "https://example.com/blog");
        assert_eq!(render("{{ asset('app.css') }}"), "https://example.com/assets/app-1a2b.css");
        assert_eq!(render("{{ asset('/img/a.png') }}"), "https://example.com/img/a.png");
        assert_eq!(render("{{ is_current('https://example.com/blog/x', '/blog/*') }}"), "true");
        assert_eq!(render("{{ clean_string('  a \n  b ') }}"), "a b");
        assert_eq!(render("{{ file_exists('nope.html') }}"), "false");
    }

    #[test]
    fn test_image_prefers_existing_output_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("public/img/trip")).unwrap();
        std::fs::write(dir.path().join("public/img/trip/cover.jpg"), "").unwrap();
        let env = env_with(dir.path(), &[]);
        let render = |src: &str| {
            env.render_str(src, minijinja::context! { page => minijinja::context! { images => "/img/trip/" } })
                .unwrap()
        };

        assert_eq!(
            render("{{ image(page, 'cover.jpg', '/img/default.jpg') }}"),
            "https://example.com/img/trip/cover.jpg"
        );
        assert_eq!(
            render("{{ image(page, 'missing.jpg', '/img/default.jpg') }}"),
            "https://example.com/img/default.jpg"
        );
        assert_eq!(render("{{ image(page, 'missing.jpg') }}"), "");
    }

    #[test]
    fn test_share_link_function() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_with(dir.path(), &[]);
        let ctx = minijinja::context! { page => minijinja::context! { url => "https://example.com/a", title => "A" } };

        assert_eq!(
            env.render_str("{{ share_link('reddit', page)|safe }}", ctx.clone()).unwrap(),
            "https://www.reddit.com/submit?url=https%3A%2F%2Fexample.com%2Fa&title=A"
        );
        let err = env.render_str("{{ share_link('myspace', page) }}", ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_edit_button() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("_includes")).unwrap();
        std::fs::write(
            dir.path().join("_includes/edit.html"),
            "<a href=\"{{ edit_url }}\">Edit {{ page.title }}</a>",
        )
        .unwrap();
        let env = env_with(dir.path(), &[]);
        let parent = minijinja::context! { edit_url => "https://git.example/edit/docs/{filename}" };
        let render = |page_type: &str, parent: Value| {
            env.render_str(
                "{{ edit_button(page, parent, 'edit') }}",
                minijinja::context! {
                    page => Value::from_serialize(serde_json::json!({
                        "type": page_type,
                        "filename": "intro.md",
                        "title": "Intro",
                    })),
                    parent,
                },
            )
            .unwrap()
        };

        assert_eq!(
            render("markdown", parent.clone()),
            "<a href=\"https://git.example/edit/docs/intro.md\">Edit Intro</a>"
        );
        assert_eq!(render("template", parent), "");
        assert_eq!(render("markdown", Value::from(())), "");
        assert_eq!(render("markdown", minijinja::context! { title => "No edit" }), "");
    }

    #[test]
    fn test_filters() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_with(dir.path(), &[]);
        let render = |src: &str| env.render_str(src, ()).unwrap();

        assert_eq!(render("{{ '*hi*'|markdown }}"), "<p><em>hi</em></p>\n");
        assert_eq!(render("{{ 'the quick brown fox'|truncate(10) }}"), "the quick...");
        assert_eq!(render("{{ 'x'|wrap('<b>', '</b>') }}"), "<b>x</b>");
        assert_eq!(render("{{ ''|wrap('<b>', '</b>') }}"), "");
        assert_eq!(render("{{ '2021-06-01T10:00:00Z'|date('%d/%m/%Y') }}"), "01/06/2021");
        assert_eq!(render("{{ '2021-06-01'|date }}"), "2021-06-01");
    }

    #[test]
    fn test_html_escaping_keeps_urls() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_with(dir.path(), &[]);
        let html = env
            .render_str("{{ a }} {{ b }} {{ c|safe }}", minijinja::context! {
                a => "https://example.com/a?x=1&y=2",
                b => "<i>\"q\"</i>",
                c => "<b>ok</b>",
            })
            .unwrap();
        assert_eq!(
            html,
            "https://example.com/a?x=1&amp;y=2 &lt;i&gt;&quot;q&quot;&lt;/i&gt; <b>ok</b>"
        );
    }

    #[test]
    fn test_auto_escape() {
        assert!(matches!(auto_escape("page.html"), AutoEscape::Html));
        assert!(matches!(auto_escape("root"), AutoEscape::Html));
        assert!(matches!(auto_escape("robots.txt"), AutoEscape::None));
        assert!(matches!(auto_escape("data.json"), AutoEscape::None));
    }

    #[test]
    fn test_is_current() {
        assert!(is_current("/blog", "/blog"));
        assert!(is_current("/blog/post", "/blog/*"));
        assert!(is_current("/about", "/blog/*|/about"));
        assert!(!is_current("/blogger", "/blog"));
        assert!(!is_current("/x/blog/a", "/blog/*"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("one two three", 7), "one two...");
        assert_eq!(truncate("supercalifragilistic word", 5), "supercalifragilistic...");
    }

    #[test]
    fn test_candidates() {
        assert_eq!(candidates("base.html"), vec!["base.html"]);
        assert_eq!(
            candidates("layouts/post"),
            vec![
                "layouts/post",
                "layouts/post.twig",
                "layouts/post.html",
                "layouts/post.jinja",
                "layouts/post.xml"
            ]
        );
    }
}
