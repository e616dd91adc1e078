use anyhow::Result;
use tracing::{info, warn};

use crate::drift::DriftEntry;
use crate::gateway::TranslationService;
use crate::prompt::Prompter;
use crate::store::DictionarySet;

/// How missing keys get filled during a verify run. Chosen once per
/// invocation and applied uniformly to every reported key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairPolicy {
    /// Machine-translate from the source value.
    Automatic,
    /// Ask for explicit text per missing (key, language) pair.
    Manual,
    /// Report only, no mutation.
    None,
}

/// The text used as translation input during repair, together with the
/// language it was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceValue {
    pub text: String,
    pub language: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub filled: usize,
    pub skipped: usize,
}

/// First dictionary in configured priority order that contains the key.
pub fn source_value(set: &DictionarySet, key: &str) -> Option<SourceValue> {
    set.iter().find_map(|(lang, dict)| {
        dict.get(key).map(|text| SourceValue {
            text: text.to_string(),
            language: lang.to_string(),
        })
    })
}

/// Fills the missing (key, language) pairs of a drift report according to the
/// chosen policy. Each produced value is persisted immediately, so an
/// interrupted run leaves a strictly smaller drift for the next invocation.
/// Languages that already hold a key are never touched.
pub async fn reconcile(
    set: &mut DictionarySet,
    report: &[DriftEntry],
    policy: RepairPolicy,
    service: &dyn TranslationService,
    prompter: &mut dyn Prompter,
) -> Result<ReconcileSummary> {
    let mut summary = ReconcileSummary::default();
    if policy == RepairPolicy::None {
        summary.skipped = report.iter().map(|entry| entry.missing_in.len()).sum();
        return Ok(summary);
    }

    for entry in report {
        // A report entry without a source anywhere is a structural
        // inconsistency, not normal drift.
        let Some(source) = source_value(set, &entry.key) else {
            warn!(
                "no source text found for key \"{}\" in any language, skipping",
                entry.key
            );
            summary.skipped += entry.missing_in.len();
            continue;
        };

        for lang in &entry.missing_in {
            let value = match policy {
                RepairPolicy::Automatic => {
                    match service
                        .translate(source.text.clone(), source.language.clone(), lang.clone())
                        .await
                    {
                        Ok(text) => text,
                        Err(err) => {
                            warn!(
                                "failed to translate \"{}\" from {} to {}: {}",
                                entry.key, source.language, lang, err
                            );
                            summary.skipped += 1;
                            continue;
                        }
                    }
                }
                RepairPolicy::Manual => {
                    let message = format!(
                        "Translation for \"{}\" in {} (from {}: \"{}\")",
                        entry.key,
                        lang,
                        source.language.to_uppercase(),
                        source.text
                    );
                    prompter.input(&message, None)?
                }
                RepairPolicy::None => unreachable!("handled above"),
            };

            if value.trim().is_empty() {
                summary.skipped += 1;
                continue;
            }
            set.set(lang, &entry.key, &value)?;
            info!("key \"{}\" synced in {}", entry.key, lang);
            summary.filled += 1;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::compute_drift;
    use crate::gateway::{GatewayError, ServiceFuture};
    use crate::prompt::testing::ScriptedPrompter;
    use std::collections::HashMap;
    use tempfile::tempdir;

    struct StubService {
        translations: HashMap<(String, String, String), String>,
    }

    impl StubService {
        fn new(entries: &[(&str, &str, &str, &str)]) -> Self {
            Self {
                translations: entries
                    .iter()
                    .map(|(text, from, to, result)| {
                        (
                            (text.to_string(), from.to_string(), to.to_string()),
                            result.to_string(),
                        )
                    })
                    .collect(),
            }
        }
    }

    impl TranslationService for StubService {
        fn is_available(&self) -> ServiceFuture<bool> {
            Box::pin(async { true })
        }

        fn detect_language(&self, _text: String) -> ServiceFuture<String> {
            Box::pin(async { "es".to_string() })
        }

        fn translate(
            &self,
            text: String,
            from: String,
            to: String,
        ) -> ServiceFuture<Result<String, GatewayError>> {
            let result = self.translations.get(&(text, from, to)).cloned();
            Box::pin(async move {
                result.ok_or_else(|| GatewayError::Malformed("no stub translation".to_string()))
            })
        }
    }

    fn scenario_a() -> (tempfile::TempDir, DictionarySet) {
        let dir = tempdir().expect("tempdir");
        let languages = vec!["en".to_string(), "es".to_string()];
        let mut set = DictionarySet::load(dir.path(), &languages);
        set.set("es", "greet", "Hola").expect("set");
        (dir, set)
    }

    #[tokio::test]
    async fn automatic_repair_restores_parity() {
        let (_dir, mut set) = scenario_a();
        let report = compute_drift(&set);
        assert_eq!(report.len(), 1);

        let service = StubService::new(&[("Hola", "es", "en", "Hello")]);
        let mut prompter = ScriptedPrompter::new(&[]);
        let summary = reconcile(
            &mut set,
            &report,
            RepairPolicy::Automatic,
            &service,
            &mut prompter,
        )
        .await
        .expect("reconcile");

        assert_eq!(summary.filled, 1);
        assert_eq!(set.get("en", "greet"), Some("Hello"));
        assert!(compute_drift(&set).is_empty());
    }

    #[tokio::test]
    async fn manual_repair_accepts_empty_input_as_skip() {
        let (_dir, mut set) = scenario_a();
        let report = compute_drift(&set);

        let service = StubService::new(&[]);
        let mut prompter = ScriptedPrompter::new(&[""]);
        let summary = reconcile(
            &mut set,
            &report,
            RepairPolicy::Manual,
            &service,
            &mut prompter,
        )
        .await
        .expect("reconcile");

        assert_eq!(summary.filled, 0);
        assert_eq!(summary.skipped, 1);
        assert!(!set.contains("en", "greet"));
    }

    #[tokio::test]
    async fn manual_repair_writes_entered_text() {
        let (_dir, mut set) = scenario_a();
        let report = compute_drift(&set);

        let service = StubService::new(&[]);
        let mut prompter = ScriptedPrompter::new(&["Hello"]);
        let summary = reconcile(
            &mut set,
            &report,
            RepairPolicy::Manual,
            &service,
            &mut prompter,
        )
        .await
        .expect("reconcile");

        assert_eq!(summary.filled, 1);
        assert_eq!(set.get("en", "greet"), Some("Hello"));
    }

    #[tokio::test]
    async fn translation_failure_skips_pair_and_continues() {
        let dir = tempdir().expect("tempdir");
        let languages = vec!["en".to_string(), "es".to_string(), "pt".to_string()];
        let mut set = DictionarySet::load(dir.path(), &languages);
        set.set("en", "greet", "Hello").expect("set");

        // Only the pt translation is known; es fails.
        let service = StubService::new(&[("Hello", "en", "pt", "Olá")]);
        let report = compute_drift(&set);
        let mut prompter = ScriptedPrompter::new(&[]);
        let summary = reconcile(
            &mut set,
            &report,
            RepairPolicy::Automatic,
            &service,
            &mut prompter,
        )
        .await
        .expect("reconcile");

        assert_eq!(summary.filled, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(set.get("pt", "greet"), Some("Olá"));

        // The failed pair is exactly what the next drift run reports.
        let remaining = compute_drift(&set);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].missing_in, ["es"]);
    }

    #[tokio::test]
    async fn none_policy_mutates_nothing() {
        let (_dir, mut set) = scenario_a();
        let report = compute_drift(&set);

        let service = StubService::new(&[("Hola", "es", "en", "Hello")]);
        let mut prompter = ScriptedPrompter::new(&[]);
        let summary = reconcile(
            &mut set,
            &report,
            RepairPolicy::None,
            &service,
            &mut prompter,
        )
        .await
        .expect("reconcile");

        assert_eq!(summary.filled, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(compute_drift(&set), report);
    }

    #[tokio::test]
    async fn source_value_follows_language_priority() {
        let dir = tempdir().expect("tempdir");
        let languages = vec!["en".to_string(), "es".to_string(), "pt".to_string()];
        let mut set = DictionarySet::load(dir.path(), &languages);
        set.set("es", "greet", "Hola").expect("set");
        set.set("pt", "greet", "Olá").expect("set");

        let source = source_value(&set, "greet").expect("source");
        assert_eq!(source.language, "es");
        assert_eq!(source.text, "Hola");
        assert_eq!(source_value(&set, "absent"), None);
    }

    #[tokio::test]
    async fn existing_values_are_never_overwritten() {
        let dir = tempdir().expect("tempdir");
        let languages = vec!["en".to_string(), "es".to_string()];
        let mut set = DictionarySet::load(dir.path(), &languages);
        set.set("en", "greet", "Hello").expect("set");
        set.set("es", "greet", "Buenas").expect("set");
        set.set("en", "bye", "Goodbye").expect("set");

        let service = StubService::new(&[
            ("Hello", "en", "es", "Hola"),
            ("Goodbye", "en", "es", "Adiós"),
        ]);
        let report = compute_drift(&set);
        let mut prompter = ScriptedPrompter::new(&[]);
        reconcile(
            &mut set,
            &report,
            RepairPolicy::Automatic,
            &service,
            &mut prompter,
        )
        .await
        .expect("reconcile");

        // "greet" already existed in es with a different text; repair only
        // fills absences.
        assert_eq!(set.get("es", "greet"), Some("Buenas"));
        assert_eq!(set.get("es", "bye"), Some("Adiós"));
    }
}
