use crate::config::UserConfig;
use crate::error::{Error, Result};
use crate::types::{LocaleInfo, Translations};
use std::fs;

/// Scan the locales directory for `{code}.json` files.
///
/// The returned set has exactly one default whenever it is non-empty: the
/// configured default locale when present, else the first discovered locale.
/// Discovery order is alphabetical so the fallback is deterministic.
pub fn discover_locales(config: &UserConfig) -> Vec<LocaleInfo> {
    let locales_dir = &config.locales_dir;
    if !locales_dir.exists() {
        eprintln!(
            "Locales directory not found at {}. Returning empty locales.",
            locales_dir.display()
        );
        return Vec::new();
    }

    let mut infos: Vec<LocaleInfo> = match fs::read_dir(locales_dir) {
        Ok(entries) => entries
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    let code = path.file_stem()?.to_str()?.to_string();
                    let is_default = code == config.default_locale;
                    Some(LocaleInfo { code, is_default })
                } else {
                    None
                }
            })
            .collect(),
        Err(e) => {
            eprintln!("Failed to read locales directory {}: {}", locales_dir.display(), e);
            return Vec::new();
        }
    };
    infos.sort_by(|a, b| a.code.cmp(&b.code));

    resolve_default(&mut infos, &config.default_locale);
    infos
}

/// Enforce the exactly-one-default invariant on a non-empty locale set.
fn resolve_default(infos: &mut [LocaleInfo], configured_default: &str) {
    if infos.is_empty() {
        eprintln!("No locales found. Cannot set a default locale.");
        return;
    }

    let default_count = infos.iter().filter(|info| info.is_default).count();
    if default_count == 0 {
        if let Some(info) = infos.iter_mut().find(|info| info.code == configured_default) {
            info.is_default = true;
            eprintln!(
                "No locale marked as default. Using configured default \"{}\".",
                configured_default
            );
        } else {
            infos[0].is_default = true;
            eprintln!(
                "No locale marked as default and configured default \"{}\" not found. Using the first locale \"{}\" as default.",
                configured_default, infos[0].code
            );
        }
    } else if default_count > 1 {
        eprintln!("Multiple locales marked as default. Using the first one found.");
        let first_default = infos
            .iter()
            .position(|info| info.is_default)
            .unwrap_or(0);
        for (index, info) in infos.iter_mut().enumerate() {
            if index != first_default {
                info.is_default = false;
            }
        }
    }
}

/// Load one locale's translation table.
///
/// A missing file yields empty translations (logged, render continues); a
/// malformed file is a fatal load error for that locale.
pub fn load_translations(config: &UserConfig, locale: &str) -> Result<Translations> {
    let content_path = config.locales_dir.join(format!("{locale}.json"));
    if !content_path.exists() {
        eprintln!(
            "Locale content not found for locale \"{}\" at {}.",
            locale,
            content_path.display()
        );
        return Ok(Translations::new());
    }

    let content = fs::read_to_string(&content_path)?;
    serde_json::from_str(&content).map_err(|e| {
        Error::LocaleParse(format!(
            "invalid locale file {}: {}",
            content_path.display(),
            e
        ))
    })
}
