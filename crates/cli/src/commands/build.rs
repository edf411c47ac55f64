use anyhow::{Context, Result};
use site_kit_core::UserConfig;
use site_kit_core::config::load_config;
use site_kit_core::i18n;
use site_kit_generator::page::PageRegistry;
use site_kit_generator::{render, sitemap, template};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Build the full static site: every registered page for every discovered
/// locale, then static assets and the sitemap.
pub async fn run(project: &Path, output: Option<PathBuf>, registry: PageRegistry) -> Result<()> {
    let start = Instant::now();

    let mut config = load_config(project).context("Failed to load site.toml")?;
    if let Some(output) = output {
        config.out_dir = if output.is_absolute() {
            output
        } else {
            project.join(output)
        };
    }

    println!("🚀 Starting build...");
    println!("   Project: {}", project.display());
    println!("   Output:  {}", config.out_dir.display());

    prepare_build_directory(&config.out_dir)?;

    let locale_infos = i18n::discover_locales(&config);
    let locales: Vec<String> = locale_infos.iter().map(|info| info.code.clone()).collect();
    if locales.is_empty() {
        return Err(site_kit_core::Error::NoLocales).with_context(|| {
            format!(
                "No locales found in {}. Build aborted.",
                config.locales_dir.display()
            )
        });
    }

    let routes = registry.routes();
    if routes.is_empty() {
        eprintln!("⚠ No pages registered. Building an empty site.");
    }

    println!("📄 Found {} pages and {} locales.", routes.len(), locales.len());

    let html_template = template::load_html_template(&config.template_path).with_context(|| {
        format!(
            "Failed to load HTML template at {}",
            config.template_path.display()
        )
    })?;

    println!("🏗️ Building pages...");
    let mut failures = Vec::new();
    for locale in &locales {
        println!("  - Building for locale: {locale}");
        for route in &routes {
            if let Err(e) = render::build_page(&config, &registry, route, locale, &html_template) {
                eprintln!("   ✗ {route} [{locale}]: {e}");
                failures.push((route.clone(), locale.clone()));
            }
        }
    }

    if !failures.is_empty() {
        anyhow::bail!("Build failed: {} page(s) did not render.", failures.len());
    }
    println!("✅ Pages built.");

    println!("📦 Copying static assets...");
    copy_static(&config)?;

    println!("🗺️ Generating sitemap...");
    let sitemap_xml = sitemap::generate_sitemap(&config)?;
    fs::write(config.out_dir.join("sitemap.xml"), sitemap_xml)
        .context("Failed to write sitemap.xml")?;
    println!("✅ Sitemap generated.");

    println!("⏱️ Total build time: {:.2}s", start.elapsed().as_secs_f64());
    println!("🎉 Build complete!");
    Ok(())
}

fn prepare_build_directory(out_dir: &Path) -> Result<()> {
    println!("🗑️ Cleaning build directory: {}", out_dir.display());
    if out_dir.exists() {
        fs::remove_dir_all(out_dir).context("Failed to clean output directory")?;
    }
    fs::create_dir_all(out_dir).context("Failed to create output directory")?;
    Ok(())
}

/// Copy the public directory verbatim into the output directory. Pages can
/// be shadowed by static files of the same path, matching dev serving.
fn copy_static(config: &UserConfig) -> Result<()> {
    if !config.public_dir.exists() {
        eprintln!(
            "⚠ Public directory not found at {}. Skipping static file copy.",
            config.public_dir.display()
        );
        return Ok(());
    }

    let mut copied = 0;
    for entry in WalkDir::new(&config.public_dir) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(&config.public_dir)?;
        let destination = config.out_dir.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else {
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &destination)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
            copied += 1;
        }
    }
    println!("   ✓ Copied {copied} static files");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_kit_core::config::parse_config_str;

    #[test]
    fn test_copy_static_recursive() {
        let tmp = tempfile::tempdir().unwrap();
        let config = parse_config_str(tmp.path(), "").unwrap();
        fs::create_dir_all(config.public_dir.join("img")).unwrap();
        fs::write(config.public_dir.join("robots.txt"), "User-agent: *").unwrap();
        fs::write(config.public_dir.join("img/logo.svg"), "<svg/>").unwrap();
        fs::create_dir_all(&config.out_dir).unwrap();

        copy_static(&config).unwrap();
        assert!(config.out_dir.join("robots.txt").is_file());
        assert!(config.out_dir.join("img/logo.svg").is_file());
    }

    #[test]
    fn test_copy_static_missing_public_dir_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let config = parse_config_str(tmp.path(), "").unwrap();
        fs::create_dir_all(&config.out_dir).unwrap();

        copy_static(&config).unwrap();
    }

    #[test]
    fn test_prepare_build_directory_cleans_previous_output() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = tmp.path().join("out");
        fs::create_dir_all(out_dir.join("stale")).unwrap();
        fs::write(out_dir.join("stale/index.html"), "old").unwrap();

        prepare_build_directory(&out_dir).unwrap();
        assert!(out_dir.exists());
        assert!(!out_dir.join("stale").exists());
    }
}
