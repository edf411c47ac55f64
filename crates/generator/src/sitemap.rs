use site_kit_core::UserConfig;
use site_kit_core::error::Result;
use std::path::Path;
use walkdir::WalkDir;

/// Collect the directories under the output root that contain rendered HTML,
/// as relative path strings. The root itself is reported as "index".
fn find_html_dirs(out_dir: &Path) -> Result<Vec<String>> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(out_dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().is_none_or(|ext| ext != "html") {
            continue;
        }

        let parent = entry.path().parent().unwrap_or(out_dir);
        let relative = parent.strip_prefix(out_dir).unwrap_or(Path::new(""));
        let relative = relative.to_string_lossy().replace('\\', "/");
        dirs.push(if relative.is_empty() {
            "index".to_string()
        } else {
            relative
        });
    }
    Ok(dirs)
}

/// Generate the sitemap XML for the built site: one `<url>` per discovered
/// output HTML file, the root page mapped to `/`, others to `/{path}/`.
pub fn generate_sitemap(config: &UserConfig) -> Result<String> {
    let mut sitemap = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    sitemap.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

    for page in find_html_dirs(&config.out_dir)? {
        let url_path = if page == "index" {
            "/".to_string()
        } else {
            format!("/{page}/")
        };

        sitemap.push_str("  <url>\n");
        sitemap.push_str(&format!("    <loc>{}{}</loc>\n", config.base_url, url_path));
        sitemap.push_str("  </url>\n");
    }

    sitemap.push_str("</urlset>");
    Ok(sitemap)
}
