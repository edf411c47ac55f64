use regex::{Captures, Regex};
use std::sync::LazyLock;

static INTERNAL_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<a\s+[^>]*href=["'])(/[^"']*)(["'][^>]*>)"#).unwrap());

/// Rewrite root-relative hyperlinks for the target locale.
///
/// Only anchor hrefs beginning with `/` are touched; external, relative and
/// fragment links pass through, and the attribute quote style is preserved.
/// Rewriting is a fixed point: hrefs already carrying the correct prefix are
/// left alone, so running the pass twice equals running it once.
pub fn process_html_links(html: &str, locale: &str, default_locale: &str) -> String {
    let locale_root = format!("/{locale}");
    let locale_prefix = format!("/{locale}/");
    let default_root = format!("/{default_locale}");
    let default_prefix = format!("/{default_locale}/");

    INTERNAL_LINK_RE
        .replace_all(html, |caps: &Captures<'_>| {
            let href = &caps[2];

            let new_href = if locale != default_locale {
                if href == "/" {
                    locale_prefix.clone()
                } else if href == locale_root || href.starts_with(&locale_prefix) {
                    href.to_string()
                } else {
                    format!("{locale_root}{href}")
                }
            } else if let Some(rest) = href.strip_prefix(&default_prefix) {
                format!("/{rest}")
            } else if href == default_root {
                "/".to_string()
            } else {
                href.to_string()
            };

            format!("{}{}{}", &caps[1], new_href, &caps[3])
        })
        .into_owned()
}
