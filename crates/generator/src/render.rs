use crate::css::process_css;
use crate::links::process_html_links;
use crate::page::{Page, PageRegistry};
use crate::template;
use site_kit_core::UserConfig;
use site_kit_core::error::{Error, Result};
use site_kit_core::i18n;
use site_kit_core::types::{HtmlTemplateData, Metadata, Script, Translations};
use std::fs;
use std::path::PathBuf;

/// What a page exports for one render: its metadata and optional scripts.
pub struct PageExports {
    pub metadata: Metadata,
    pub script: Option<Script>,
}

/// A page without a metadata generator yields empty title/description; the
/// script set is passed through unchanged, `None` meaning no scripts.
pub fn extract_page_exports(page: &dyn Page, translations: &Translations) -> PageExports {
    PageExports {
        metadata: page.metadata(translations).unwrap_or_default(),
        script: page.scripts(),
    }
}

/// The page-specific stylesheet lives under the "pages" subdirectory of the
/// styles root, mirroring the page's route.
pub fn page_css_paths(config: &UserConfig, route: &str) -> Vec<PathBuf> {
    vec![config.styles_dir.join("pages").join(format!("{route}.css"))]
}

/// Map (route, locale) to the output file. The route's basename becomes a
/// subdirectory unless it is "index", the directory component is preserved,
/// non-default locales nest once under the locale code, and the file is
/// always `index.html` so every page gets a clean trailing-slash URL.
pub fn output_file_path(config: &UserConfig, route: &str, locale: &str) -> PathBuf {
    let (dir_name, page_name) = match route.rsplit_once('/') {
        Some((dir, name)) => (dir, name),
        None => ("", route),
    };

    let mut output_sub_dir = PathBuf::from(dir_name);
    if page_name != "index" {
        output_sub_dir.push(page_name);
    }

    let final_output_dir = if locale == config.default_locale {
        config.out_dir.join(&output_sub_dir)
    } else {
        config.out_dir.join(locale).join(&output_sub_dir)
    };

    final_output_dir.join("index.html")
}

/// Render one page to a complete HTML document.
///
/// Strictly sequential, single pass, no retries: template, page lookup,
/// translations, exports, CSS, body, population, script injection, metadata
/// injection, link localization, then the dev reload client when `dev_mode`
/// is set. Passing `html_template` skips the disk read so a batch build can
/// load the shell once for many pages.
pub fn render_page(
    config: &UserConfig,
    registry: &PageRegistry,
    route: &str,
    locale: &str,
    dev_mode: bool,
    html_template: Option<&str>,
) -> Result<String> {
    let template_string = match html_template {
        Some(template) => template.to_string(),
        None => template::load_html_template(&config.template_path)?,
    };

    let page = registry
        .get(route)
        .ok_or_else(|| Error::PageNotFound(route.to_string()))?;

    let translations = i18n::load_translations(config, locale)?;
    let PageExports { metadata, script } = extract_page_exports(page.as_ref(), &translations);

    let inlined_css = process_css(config, &page_css_paths(config, route));
    let page_content = page.render(&translations);

    let mut html = template::populate_html_template(
        &template_string,
        &HtmlTemplateData {
            locale: locale.to_string(),
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            css: inlined_css,
            page_content,
        },
    );

    html = template::render_scripts(&html, script.as_ref());
    html = template::render_metadata(&html, &metadata);
    html = process_html_links(&html, locale, &config.default_locale);

    if dev_mode {
        html = template::inject_dev_reload_script(&html);
    }

    Ok(html)
}

/// Render one page and persist it at its resolved output path.
pub fn build_page(
    config: &UserConfig,
    registry: &PageRegistry,
    route: &str,
    locale: &str,
    html_template: &str,
) -> Result<()> {
    let output_path = output_file_path(config, route, locale);
    let html = render_page(config, registry, route, locale, false, Some(html_template))?;

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_path, html)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_kit_core::config::parse_config_str;
    use site_kit_core::types::ScriptTag;
    use std::path::Path;

    struct TestPage;

    impl Page for TestPage {
        fn render(&self, translations: &Translations) -> String {
            format!(
                "<main><h1>{}</h1><a href=\"/about\">about</a></main>",
                translations.get("heading").cloned().unwrap_or_default()
            )
        }

        fn metadata(&self, translations: &Translations) -> Option<Metadata> {
            Some(Metadata {
                title: translations.get("title").cloned().unwrap_or_default(),
                description: "A test page".to_string(),
                ..Metadata::default()
            })
        }

        fn scripts(&self) -> Option<Script> {
            Some(Script {
                before: vec![ScriptTag::external("/js/pre.js")],
                after: Vec::new(),
            })
        }
    }

    struct BarePage;

    impl Page for BarePage {
        fn render(&self, _translations: &Translations) -> String {
            "<p>bare</p>".to_string()
        }
    }

    const TEMPLATE: &str = concat!(
        "<!DOCTYPE html>\n<html lang=\"{{ locale }}\">\n<head>\n",
        "<title>{{ title }}</title>\n",
        "<meta name=\"description\" content=\"{{ description }}\">\n",
        "<meta property=\"og:title\" content=\"{{og:title}}\">\n",
        "<style>{{ css }}</style>\n</head>\n",
        "<body>\n{{scriptBefore}}\n{{ pageContent }}\n{{scriptAfter}}\n</body>\n</html>",
    );

    fn project(dir: &Path) -> UserConfig {
        parse_config_str(dir, "").unwrap()
    }

    fn write_project_files(dir: &Path) {
        std::fs::create_dir_all(dir.join("app/locales")).unwrap();
        std::fs::write(dir.join("app/template.html"), TEMPLATE).unwrap();
        std::fs::write(
            dir.join("app/locales/en.json"),
            r#"{"title": "Home", "heading": "Welcome"}"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("app/locales/fr.json"),
            r#"{"title": "Accueil", "heading": "Bienvenue"}"#,
        )
        .unwrap();
    }

    fn registry() -> PageRegistry {
        let mut registry = PageRegistry::new();
        registry.insert("index", TestPage);
        registry.insert("about", BarePage);
        registry
    }

    #[test]
    fn test_extract_page_exports_defaults() {
        let exports = extract_page_exports(&BarePage, &Translations::new());
        assert_eq!(exports.metadata.title, "");
        assert_eq!(exports.metadata.description, "");
        assert!(exports.script.is_none());
    }

    #[test]
    fn test_extract_page_exports_with_generator() {
        let mut translations = Translations::new();
        translations.insert("title".to_string(), "Home".to_string());
        let exports = extract_page_exports(&TestPage, &translations);
        assert_eq!(exports.metadata.title, "Home");
        assert!(exports.script.is_some());
    }

    #[test]
    fn test_page_css_paths() {
        let config = project(Path::new("/srv/site"));
        assert_eq!(
            page_css_paths(&config, "blog/post"),
            vec![PathBuf::from("/srv/site/app/styles/pages/blog/post.css")]
        );
    }

    #[test]
    fn test_output_file_path_default_locale() {
        let config = project(Path::new("/srv/site"));
        assert_eq!(
            output_file_path(&config, "about", "en"),
            PathBuf::from("/srv/site/out/about/index.html")
        );
    }

    #[test]
    fn test_output_file_path_non_default_locale() {
        let config = project(Path::new("/srv/site"));
        assert_eq!(
            output_file_path(&config, "about", "fr"),
            PathBuf::from("/srv/site/out/fr/about/index.html")
        );
    }

    #[test]
    fn test_output_file_path_index_page() {
        let config = project(Path::new("/srv/site"));
        assert_eq!(
            output_file_path(&config, "index", "en"),
            PathBuf::from("/srv/site/out/index.html")
        );
        assert_eq!(
            output_file_path(&config, "index", "fr"),
            PathBuf::from("/srv/site/out/fr/index.html")
        );
    }

    #[test]
    fn test_output_file_path_preserves_directories() {
        let config = project(Path::new("/srv/site"));
        assert_eq!(
            output_file_path(&config, "blog/post", "en"),
            PathBuf::from("/srv/site/out/blog/post/index.html")
        );
        assert_eq!(
            output_file_path(&config, "blog/index", "en"),
            PathBuf::from("/srv/site/out/blog/index.html")
        );
    }

    #[test]
    fn test_render_page_assembles_document() {
        let tmp = tempfile::tempdir().unwrap();
        write_project_files(tmp.path());
        let config = project(tmp.path());

        let html = render_page(&config, &registry(), "index", "en", false, None).unwrap();
        assert!(html.contains("<html lang=\"en\">"));
        assert!(html.contains("<title>Home</title>"));
        assert!(html.contains("content=\"Home\"")); // og:title fallback
        assert!(html.contains("<h1>Welcome</h1>"));
        assert!(html.contains("<script src=\"/js/pre.js\"></script>"));
        // Default locale: internal links stay unprefixed
        assert!(html.contains("href=\"/about\""));
        assert!(!html.contains("{{"));
        assert!(!html.contains("EventSource"));
    }

    #[test]
    fn test_render_page_localizes_links_for_non_default_locale() {
        let tmp = tempfile::tempdir().unwrap();
        write_project_files(tmp.path());
        let config = project(tmp.path());

        let html = render_page(&config, &registry(), "index", "fr", false, None).unwrap();
        assert!(html.contains("<html lang=\"fr\">"));
        assert!(html.contains("<h1>Bienvenue</h1>"));
        assert!(html.contains("href=\"/fr/about\""));
    }

    #[test]
    fn test_render_page_dev_mode_injects_reload_client() {
        let tmp = tempfile::tempdir().unwrap();
        write_project_files(tmp.path());
        let config = project(tmp.path());

        let html = render_page(&config, &registry(), "index", "en", true, None).unwrap();
        assert!(html.contains("EventSource('/_reload')"));
    }

    #[test]
    fn test_render_page_missing_page_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write_project_files(tmp.path());
        let config = project(tmp.path());

        let result = render_page(&config, &registry(), "missing", "en", false, None);
        assert!(matches!(result, Err(Error::PageNotFound(_))));
    }

    #[test]
    fn test_render_page_missing_locale_renders_empty_translations() {
        let tmp = tempfile::tempdir().unwrap();
        write_project_files(tmp.path());
        let config = project(tmp.path());

        let html = render_page(&config, &registry(), "index", "es", false, None).unwrap();
        // Headings resolve to empty strings, the document still renders
        assert!(html.contains("<h1></h1>"));
        assert!(html.contains("<html lang=\"es\">"));
    }

    #[test]
    fn test_render_page_no_scripts_removes_markers() {
        let tmp = tempfile::tempdir().unwrap();
        write_project_files(tmp.path());
        let config = project(tmp.path());

        let html = render_page(&config, &registry(), "about", "en", false, None).unwrap();
        assert!(!html.contains("{{scriptBefore}}"));
        assert!(!html.contains("{{scriptAfter}}"));
    }

    #[test]
    fn test_build_page_writes_output_file() {
        let tmp = tempfile::tempdir().unwrap();
        write_project_files(tmp.path());
        let config = project(tmp.path());

        build_page(&config, &registry(), "about", "fr", TEMPLATE).unwrap();
        let output = tmp.path().join("out/fr/about/index.html");
        assert!(output.is_file());
        let html = std::fs::read_to_string(output).unwrap();
        assert!(html.contains("<p>bare</p>"));
    }
}
