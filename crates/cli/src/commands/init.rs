use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_SITE_TOML: &str = r#"# site-kit configuration

[site]
default_locale = "en"
base_url = "http://localhost:3000"

[serve]
port = 3000

[paths]
app_dir = "app"
out_dir = "out"
pages_dir = "app/pages"
locales_dir = "app/locales"
styles_dir = "app/styles"
public_dir = "app/public"
template = "app/template.html"
global_css = "app/styles/main.css"
"#;

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{ locale }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <meta name="description" content="{{ description }}">
    <meta property="og:title" content="{{og:title}}">
    <meta property="og:description" content="{{og:description}}">
    <meta property="og:type" content="{{og:type}}">
    <meta property="og:url" content="{{og:url}}">
    <meta property="og:image" content="{{og:image}}">
    <meta name="twitter:card" content="summary_large_image">
    <meta name="twitter:title" content="{{twitter:title}}">
    <meta name="twitter:description" content="{{twitter:description}}">
    <meta name="twitter:image" content="{{twitter:image}}">
    <style>{{ css }}</style>
</head>
<body>
    {{scriptBefore}}
    <div id="root">{{ pageContent }}</div>
    {{scriptAfter}}
</body>
</html>
"#;

const DEFAULT_LOCALE_EN: &str = r#"{
    "site.title": "My Site",
    "site.description": "A localized static site"
}
"#;

const DEFAULT_GLOBAL_CSS: &str = r#"* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    line-height: 1.6;
}
"#;

/// Scaffold the asset side of a site project: site.toml, the HTML shell
/// with every placeholder token, a starter locale and stylesheet, and the
/// pages/public directories. Page code stays in the site crate itself.
pub async fn run(project: &Path) -> Result<()> {
    println!("🚀 Initializing site project at {}", project.display());

    let site_toml = project.join("site.toml");
    if site_toml.exists() {
        anyhow::bail!("site.toml already exists in {}", project.display());
    }

    for dir in ["app/pages", "app/locales", "app/styles/pages", "app/public"] {
        fs::create_dir_all(project.join(dir))
            .with_context(|| format!("Failed to create {dir}"))?;
    }

    fs::write(&site_toml, DEFAULT_SITE_TOML).context("Failed to write site.toml")?;
    fs::write(project.join("app/template.html"), DEFAULT_TEMPLATE)
        .context("Failed to write template.html")?;
    fs::write(project.join("app/locales/en.json"), DEFAULT_LOCALE_EN)
        .context("Failed to write en.json")?;
    fs::write(project.join("app/styles/main.css"), DEFAULT_GLOBAL_CSS)
        .context("Failed to write main.css")?;

    println!("   ✓ Created site.toml");
    println!("   ✓ Created app/template.html");
    println!("   ✓ Created app/locales/en.json");
    println!("   ✓ Created app/styles/main.css");
    println!("   ✓ Created app/pages, app/styles/pages, app/public");
    println!();
    println!("Next steps:");
    println!("   1. Register your pages in the site binary");
    println!("   2. Add locales as app/locales/{{code}}.json");
    println!("   3. Run the serve command to preview with live reload");

    Ok(())
}
