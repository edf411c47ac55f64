use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use lightningcss::bundler::{Bundler, FileProvider};
use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions};
use lightningcss::targets::{Browsers, Targets};
use regex::{Captures, Regex};
use site_kit_core::UserConfig;
use site_kit_core::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\(\s*['"]?([^'")]+)['"]?\s*\)"#).unwrap());

/// Browser floor used for vendor prefixing.
fn browser_targets() -> Targets {
    Targets::from(Browsers {
        chrome: Some(80 << 16),
        edge: Some(80 << 16),
        firefox: Some(78 << 16),
        safari: Some(13 << 16),
        ios_saf: Some(13 << 16),
        ..Browsers::default()
    })
}

/// Run one stylesheet through the transform chain: `@import` inlining,
/// vendor prefixing, minification, then `url()` asset inlining on the
/// printed output.
fn transform_stylesheet(css_path: &Path) -> Result<String> {
    let provider = FileProvider::new();
    let mut bundler = Bundler::new(&provider, None, ParserOptions::default());
    let mut stylesheet = bundler
        .bundle(css_path)
        .map_err(|e| Error::Css(format!("failed to bundle {}: {}", css_path.display(), e)))?;

    stylesheet
        .minify(MinifyOptions {
            targets: browser_targets(),
            ..MinifyOptions::default()
        })
        .map_err(|e| Error::Css(format!("failed to minify {}: {}", css_path.display(), e)))?;

    let output = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            targets: browser_targets(),
            ..PrinterOptions::default()
        })
        .map_err(|e| Error::Css(format!("failed to print {}: {}", css_path.display(), e)))?;

    let base_dir = css_path.parent().unwrap_or(Path::new("."));
    Ok(inline_urls(&output.code, base_dir))
}

/// Replace `url(...)` references to local assets with base64 data URIs.
/// Remote, data and fragment references pass through; an unreadable asset
/// is left untouched with a warning rather than failing the file.
fn inline_urls(css: &str, base_dir: &Path) -> String {
    URL_RE
        .replace_all(css, |caps: &Captures<'_>| {
            let reference = caps[1].trim();
            if reference.starts_with("data:")
                || reference.starts_with("http://")
                || reference.starts_with("https://")
                || reference.starts_with("//")
                || reference.starts_with('#')
            {
                return caps[0].to_string();
            }

            // Query strings and fragments are not part of the file lookup
            let file_part = reference.split(['?', '#']).next().unwrap_or(reference);
            let asset_path = base_dir.join(file_part);
            match std::fs::read(&asset_path) {
                Ok(bytes) => {
                    let mime = mime_guess::from_path(&asset_path).first_or_octet_stream();
                    format!("url(\"data:{};base64,{}\")", mime, BASE64.encode(bytes))
                }
                Err(_) => {
                    eprintln!(
                        "   ⚠ Warning: could not inline CSS asset {}",
                        asset_path.display()
                    );
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// Resolve and concatenate the site's CSS: the global stylesheet always
/// first, then the caller-supplied extra paths in order.
///
/// A missing file is skipped (warned for non-global paths only); a transform
/// failure for one file is logged and does not abort the remaining files.
pub fn process_css(config: &UserConfig, extra_paths: &[PathBuf]) -> String {
    let mut combined = String::new();
    let mut all_paths: Vec<&Path> = vec![config.global_css_path.as_path()];
    all_paths.extend(extra_paths.iter().map(PathBuf::as_path));

    for css_path in all_paths {
        if !css_path.exists() {
            if css_path != config.global_css_path {
                eprintln!(
                    "   ⚠ Warning: CSS file not found at {}. Skipping.",
                    css_path.display()
                );
            }
            continue;
        }

        match transform_stylesheet(css_path) {
            Ok(css) => combined.push_str(&css),
            Err(e) => {
                eprintln!("   ⚠ Error processing CSS file {}: {}", css_path.display(), e);
            }
        }
    }

    combined
}
