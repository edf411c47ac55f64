use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    site: RawSite,
    serve: RawServe,
    paths: RawPaths,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawSite {
    default_locale: String,
    base_url: String,
}

impl Default for RawSite {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawServe {
    port: u16,
}

impl Default for RawServe {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawPaths {
    app_dir: String,
    out_dir: String,
    pages_dir: String,
    locales_dir: String,
    styles_dir: String,
    public_dir: String,
    template: String,
    global_css: String,
}

impl Default for RawPaths {
    fn default() -> Self {
        Self {
            app_dir: "app".to_string(),
            out_dir: "out".to_string(),
            pages_dir: "app/pages".to_string(),
            locales_dir: "app/locales".to_string(),
            styles_dir: "app/styles".to_string(),
            public_dir: "app/public".to_string(),
            template: "app/template.html".to_string(),
            global_css: "app/styles/main.css".to_string(),
        }
    }
}

/// Process-wide configuration, resolved once at startup and read-only
/// thereafter. All paths are absolute by the time rendering begins.
#[derive(Debug, Clone)]
pub struct UserConfig {
    pub project_root: PathBuf,
    pub port: u16,
    pub app_dir: PathBuf,
    pub out_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub locales_dir: PathBuf,
    pub styles_dir: PathBuf,
    pub public_dir: PathBuf,
    pub template_path: PathBuf,
    pub global_css_path: PathBuf,
    pub default_locale: String,
    pub base_url: String,
}

/// Load site.toml from the project root. A missing file yields the default
/// configuration, matching the behavior of an empty site.toml.
pub fn load_config(project_root: &Path) -> Result<UserConfig> {
    let config_path = project_root.join("site.toml");
    if !config_path.exists() {
        eprintln!(
            "\"site.toml\" not found in {}. Using default configuration.",
            project_root.display()
        );
        return resolve_config(project_root, RawConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    parse_config_str(project_root, &content)
}

/// Parse site.toml from a string (useful for testing)
pub fn parse_config_str(project_root: &Path, content: &str) -> Result<UserConfig> {
    let raw: RawConfig = toml::from_str(content)?;
    resolve_config(project_root, raw)
}

fn resolve_config(project_root: &Path, raw: RawConfig) -> Result<UserConfig> {
    if raw.site.default_locale.trim().is_empty() {
        return Err(Error::ConfigParse(
            "Empty 'site.default_locale' field".to_string(),
        ));
    }
    if raw.site.base_url.trim().is_empty() {
        return Err(Error::ConfigParse("Empty 'site.base_url' field".to_string()));
    }

    Ok(UserConfig {
        project_root: project_root.to_path_buf(),
        port: raw.serve.port,
        app_dir: resolve_path(project_root, &raw.paths.app_dir, "paths.app_dir")?,
        out_dir: resolve_path(project_root, &raw.paths.out_dir, "paths.out_dir")?,
        pages_dir: resolve_path(project_root, &raw.paths.pages_dir, "paths.pages_dir")?,
        locales_dir: resolve_path(project_root, &raw.paths.locales_dir, "paths.locales_dir")?,
        styles_dir: resolve_path(project_root, &raw.paths.styles_dir, "paths.styles_dir")?,
        public_dir: resolve_path(project_root, &raw.paths.public_dir, "paths.public_dir")?,
        template_path: resolve_path(project_root, &raw.paths.template, "paths.template")?,
        global_css_path: resolve_path(project_root, &raw.paths.global_css, "paths.global_css")?,
        default_locale: raw.site.default_locale,
        base_url: raw.site.base_url,
    })
}

/// Validate a configured path and make it absolute.
///
/// Parent directory references are rejected so a site.toml cannot point the
/// generator outside the project tree. Absolute paths are accepted as-is;
/// relative paths are resolved against the project root.
fn resolve_path(project_root: &Path, path_str: &str, field_name: &str) -> Result<PathBuf> {
    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    let path = Path::new(path_str);
    for component in path.components() {
        if component == std::path::Component::ParentDir {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(project_root.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/srv/site")
    }

    #[test]
    fn test_defaults_from_empty_config() {
        let config = parse_config_str(&root(), "").unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.pages_dir, PathBuf::from("/srv/site/app/pages"));
        assert_eq!(config.template_path, PathBuf::from("/srv/site/app/template.html"));
        assert_eq!(config.global_css_path, PathBuf::from("/srv/site/app/styles/main.css"));
    }

    #[test]
    fn test_parse_overrides() {
        let toml = r#"
[site]
default_locale = "fr"
base_url = "https://example.com"

[serve]
port = 8080

[paths]
out_dir = "dist"
"#;
        let config = parse_config_str(&root(), toml).unwrap();
        assert_eq!(config.default_locale, "fr");
        assert_eq!(config.base_url, "https://example.com");
        assert_eq!(config.port, 8080);
        assert_eq!(config.out_dir, PathBuf::from("/srv/site/dist"));
        // Unspecified paths keep their defaults
        assert_eq!(config.locales_dir, PathBuf::from("/srv/site/app/locales"));
    }

    #[test]
    fn test_absolute_path_accepted() {
        let toml = r#"
[paths]
out_dir = "/var/www/site"
"#;
        let config = parse_config_str(&root(), toml).unwrap();
        assert_eq!(config.out_dir, PathBuf::from("/var/www/site"));
    }

    #[test]
    fn test_rejects_parent_dir_references() {
        let toml = r#"
[paths]
out_dir = "../outside"
"#;
        let result = parse_config_str(&root(), toml);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Parent directory references")
        );
    }

    #[test]
    fn test_rejects_empty_default_locale() {
        let toml = r#"
[site]
default_locale = "  "
"#;
        let result = parse_config_str(&root(), toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("default_locale"));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(parse_config_str(&root(), "[site").is_err());
    }
}
