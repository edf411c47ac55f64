use regex::{NoExpand, Regex};
use site_kit_core::error::Result;
use site_kit_core::types::{HtmlTemplateData, Metadata, Script, ScriptTag};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static LOCALE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*locale\s*\}\}").unwrap());
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*title\s*\}\}").unwrap());
static DESCRIPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*description\s*\}\}").unwrap());
static CSS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*css\s*\}\}").unwrap());
static PAGE_CONTENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*pageContent\s*\}\}").unwrap());

/// Load the HTML shell shared by all pages.
pub fn load_html_template(template_path: &Path) -> Result<String> {
    let raw = fs::read_to_string(template_path)?;
    Ok(raw.trim().to_string())
}

/// Population pass: replace every occurrence of the five substitution tokens.
///
/// Replacement is textual; no HTML escaping is applied. Callers are
/// responsible for pre-escaped content.
pub fn populate_html_template(template: &str, data: &HtmlTemplateData) -> String {
    let html = LOCALE_RE.replace_all(template, NoExpand(&data.locale));
    let html = TITLE_RE.replace_all(&html, NoExpand(&data.title));
    let html = DESCRIPTION_RE.replace_all(&html, NoExpand(&data.description));
    let html = CSS_RE.replace_all(&html, NoExpand(&data.css));
    let html = PAGE_CONTENT_RE.replace_all(&html, NoExpand(&data.page_content));
    html.into_owned()
}

fn escape_attr_value(value: &str) -> String {
    value.replace('"', "&quot;")
}

/// Serialize one script tag. Boolean attributes are emitted bare, string
/// attributes with a quote-escaped value, empty values skipped.
pub fn script_tag_string(tag: &ScriptTag) -> String {
    let mut attributes = String::new();
    if let Some(src) = &tag.src
        && !src.is_empty()
    {
        attributes.push_str(&format!(" src=\"{}\"", escape_attr_value(src)));
    }
    if let Some(script_type) = &tag.script_type
        && !script_type.is_empty()
    {
        attributes.push_str(&format!(" type=\"{}\"", escape_attr_value(script_type)));
    }
    if tag.is_async {
        attributes.push_str(" async");
    }
    if tag.defer {
        attributes.push_str(" defer");
    }
    for (name, value) in &tag.attrs {
        if !value.is_empty() {
            attributes.push_str(&format!(" {}=\"{}\"", name, escape_attr_value(value)));
        }
    }

    match &tag.text_content {
        Some(text) if !text.is_empty() => format!("<script{attributes}>{text}</script>"),
        _ => format!("<script{attributes}></script>"),
    }
}

/// Script injection pass. Without a script both markers are removed, never
/// left as literal placeholders.
pub fn render_scripts(html: &str, script: Option<&Script>) -> String {
    let (before, after) = match script {
        Some(script) => (
            script
                .before
                .iter()
                .map(script_tag_string)
                .collect::<Vec<_>>()
                .join("\n"),
            script
                .after
                .iter()
                .map(script_tag_string)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        None => (String::new(), String::new()),
    };

    html.replacen("{{scriptBefore}}", &before, 1)
        .replacen("{{scriptAfter}}", &after, 1)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Metadata injection pass: the ten literal head placeholders, each with a
/// defined fallback. og:* falls back to the top-level title/description,
/// og:type to "website", twitter:* to the top-level title/description.
pub fn render_metadata(html: &str, metadata: &Metadata) -> String {
    let og = metadata.og.as_ref();
    let twitter = metadata.twitter.as_ref();

    let og_title = non_empty(og.and_then(|og| og.title.as_deref())).unwrap_or(&metadata.title);
    let og_description = non_empty(og.and_then(|og| og.description.as_deref()))
        .unwrap_or(&metadata.description);
    let og_type = non_empty(og.and_then(|og| og.kind.as_deref())).unwrap_or("website");
    let og_url = non_empty(og.and_then(|og| og.url.as_deref())).unwrap_or("");
    let og_image = non_empty(og.and_then(|og| og.image.as_deref())).unwrap_or("");
    let twitter_title =
        non_empty(twitter.and_then(|t| t.title.as_deref())).unwrap_or(&metadata.title);
    let twitter_description = non_empty(twitter.and_then(|t| t.description.as_deref()))
        .unwrap_or(&metadata.description);
    let twitter_image = non_empty(twitter.and_then(|t| t.image.as_deref())).unwrap_or("");

    html.replacen("{{title}}", &metadata.title, 1)
        .replacen("{{description}}", &metadata.description, 1)
        .replacen("{{og:title}}", og_title, 1)
        .replacen("{{og:description}}", og_description, 1)
        .replacen("{{og:type}}", og_type, 1)
        .replacen("{{og:url}}", og_url, 1)
        .replacen("{{og:image}}", og_image, 1)
        .replacen("{{twitter:title}}", twitter_title, 1)
        .replacen("{{twitter:description}}", twitter_description, 1)
        .replacen("{{twitter:image}}", twitter_image, 1)
}

/// Live-reload client served in dev mode, inserted immediately before the
/// closing body tag. It is not an anchor, so it is exempt from link
/// rewriting by pass order.
pub fn inject_dev_reload_script(html: &str) -> String {
    let client_script = r#"<script>
        const es = new EventSource('/_reload');
        es.onmessage = (event) => {
            if (event.data === 'reload') {
                console.log('[site-kit] Reloading page due to file change...');
                window.location.reload();
            }
        };
        es.onerror = () => {
            console.log('[site-kit] Dev server disconnected');
            es.close();
        };
    </script>"#;
    html.replacen("</body>", &format!("{client_script}</body>"), 1)
}
