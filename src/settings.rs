use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Effective configuration after merging every settings source.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Language codes in priority order. The first language that holds a key
    /// supplies the source value during reconciliation.
    pub languages: Vec<String>,
    /// Directory holding one `<code>.json` dictionary per language.
    pub translations_dir: PathBuf,
    /// Base URL of the LibreTranslate-compatible service.
    pub translate_url: String,
    /// Optional API key forwarded with every translate/detect request.
    pub translate_api_key: Option<String>,
    /// Language assumed when detection fails.
    pub fallback_language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            languages: vec![
                "en".to_string(),
                "es".to_string(),
                "pt".to_string(),
                "nl".to_string(),
            ],
            translations_dir: PathBuf::from("src/translations"),
            translate_url: "https://lt.vern.cc".to_string(),
            translate_api_key: None,
            fallback_language: "es".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    system: Option<SystemSettings>,
    translate: Option<TranslateSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct SystemSettings {
    languages: Option<Vec<String>>,
    translations_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TranslateSettings {
    url: Option<String>,
    api_key: Option<String>,
    fallback_language: Option<String>,
}

/// Loads settings by merging, in order: `settings.toml`,
/// `settings.local.toml`, then an explicit extra path. Later files win.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    if settings.languages.is_empty() {
        return Err(anyhow!("settings define no languages"));
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(system) = incoming.system {
            if let Some(languages) = system.languages {
                if !languages.is_empty() {
                    self.languages = languages
                        .into_iter()
                        .map(|code| code.trim().to_lowercase())
                        .filter(|code| !code.is_empty())
                        .collect();
                }
            }
            if let Some(dir) = system.translations_dir {
                if !dir.trim().is_empty() {
                    self.translations_dir = PathBuf::from(dir);
                }
            }
        }
        if let Some(translate) = incoming.translate {
            if let Some(url) = translate.url {
                if !url.trim().is_empty() {
                    self.translate_url = url.trim().trim_end_matches('/').to_string();
                }
            }
            if let Some(key) = translate.api_key {
                if !key.trim().is_empty() {
                    self.translate_api_key = Some(key);
                }
            }
            if let Some(code) = translate.fallback_language {
                if !code.trim().is_empty() {
                    self.fallback_language = code.trim().to_lowercase();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_supported_languages() {
        let settings = Settings::default();
        assert_eq!(settings.languages, ["en", "es", "pt", "nl"]);
        assert_eq!(settings.fallback_language, "es");
    }

    #[test]
    fn merge_overrides_languages_and_url() {
        let mut settings = Settings::default();
        let parsed: SettingsFile = toml::from_str(
            r#"
            [system]
            languages = ["EN", "fr"]

            [translate]
            url = "http://localhost:5000/"
            api_key = "secret"
            "#,
        )
        .expect("parse");
        settings.merge(parsed);
        assert_eq!(settings.languages, ["en", "fr"]);
        assert_eq!(settings.translate_url, "http://localhost:5000");
        assert_eq!(settings.translate_api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn merge_keeps_defaults_for_blank_values() {
        let mut settings = Settings::default();
        let parsed: SettingsFile = toml::from_str(
            r#"
            [translate]
            url = "  "
            fallback_language = ""
            "#,
        )
        .expect("parse");
        settings.merge(parsed);
        assert_eq!(settings.translate_url, "https://lt.vern.cc");
        assert_eq!(settings.fallback_language, "es");
    }
}
