use anyhow::{Result, anyhow};
use std::path::Path;

pub mod drift;
pub mod gateway;
pub mod interactive;
pub mod languages;
pub mod logging;
pub mod ops;
pub mod prompt;
pub mod reconcile;
pub mod settings;
pub mod store;

pub use drift::{DriftEntry, compute_drift};
pub use gateway::{GatewayConfig, GatewayError, LibreTranslate, TranslationService};
pub use reconcile::{ReconcileSummary, RepairPolicy, SourceValue, reconcile};
pub use store::{Dictionary, DictionarySet};

/// Outcome of one invocation; `Drift` becomes a non-zero exit code for
/// unattended verify runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Clean,
    Drift,
}

#[derive(Debug, Clone)]
pub enum Operation {
    /// One text: automatic mode (detect + translate). Several texts: manual
    /// mode, mapped positionally to the configured language order.
    CreateOrUpdate { key: String, texts: Vec<String> },
    Read { key: String },
    Remove { key: String },
    Verify,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` starts the interactive session.
    pub operation: Option<Operation>,
    pub unattended: bool,
    pub settings_path: Option<String>,
}

/// Routes one operation request onto the store, checker, engine, and gateway.
/// Owns no logic beyond routing.
pub async fn run(config: Config) -> Result<RunStatus> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;

    let gateway = LibreTranslate::new(GatewayConfig {
        base_url: settings.translate_url.clone(),
        api_key: settings.translate_api_key.clone(),
        fallback_language: settings.fallback_language.clone(),
    });
    let mut set = DictionarySet::load(&settings.translations_dir, &settings.languages);

    match config.operation {
        None => {
            let mut prompter = prompt::ConsolePrompter::new();
            interactive::run_session(&mut set, &gateway, &mut prompter).await?;
            Ok(RunStatus::Clean)
        }
        Some(Operation::CreateOrUpdate { key, texts }) => {
            if texts.len() > settings.languages.len() {
                return Err(anyhow!(
                    "too many texts: got {} for {} configured languages",
                    texts.len(),
                    settings.languages.len()
                ));
            }
            if texts.len() == 1 {
                ops::create_or_update_auto(&mut set, &key, &texts[0], &gateway).await?;
            } else {
                ops::create_or_update_manual(&mut set, &key, &texts)?;
            }
            Ok(RunStatus::Clean)
        }
        Some(Operation::Read { key }) => {
            ops::read_key(&set, &key);
            Ok(RunStatus::Clean)
        }
        Some(Operation::Remove { key }) => {
            ops::remove_key(&mut set, &key)?;
            Ok(RunStatus::Clean)
        }
        Some(Operation::Verify) => {
            if config.unattended {
                Ok(ops::verify_unattended(&set))
            } else {
                let mut prompter = prompt::ConsolePrompter::new();
                ops::verify_attended(&mut set, &gateway, &mut prompter).await?;
                Ok(RunStatus::Clean)
            }
        }
    }
}
