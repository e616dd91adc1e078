use anyhow::{Result, anyhow};
use tracing::info;

use crate::RunStatus;
use crate::drift::{DriftEntry, compute_drift};
use crate::gateway::TranslationService;
use crate::languages;
use crate::prompt::Prompter;
use crate::reconcile::{RepairPolicy, reconcile};
use crate::store::DictionarySet;

/// Detects the language of `base_text` and produces one text per configured
/// language: the detected language keeps the base text verbatim, every other
/// language gets a machine translation. The first translation failure aborts
/// the whole fill; callers fall back to manual entry.
pub async fn machine_fill(
    languages_order: &[String],
    base_text: &str,
    service: &dyn TranslationService,
) -> Result<Vec<(String, String)>> {
    let detected = service.detect_language(base_text.to_string()).await;
    info!("detected language: {}", detected);

    let mut filled = Vec::with_capacity(languages_order.len());
    for lang in languages_order {
        if *lang == detected {
            filled.push((lang.clone(), base_text.to_string()));
            continue;
        }
        info!("translating to {}...", languages::display_name_or_code(lang));
        let text = service
            .translate(base_text.to_string(), detected.clone(), lang.clone())
            .await?;
        filled.push((lang.clone(), text));
    }
    Ok(filled)
}

/// Writes one prepared text per language, skipping empty entries. Returns the
/// number of keys written.
pub fn apply_entries(
    set: &mut DictionarySet,
    key: &str,
    entries: &[(String, String)],
) -> Result<usize> {
    let mut written = 0;
    for (lang, text) in entries {
        if text.trim().is_empty() {
            continue;
        }
        set.set(lang, key, text)?;
        written += 1;
    }
    Ok(written)
}

pub fn print_entries(entries: &[(String, String)]) {
    for (lang, text) in entries {
        println!("{}: {}", lang.to_uppercase(), text);
    }
}

/// Automatic create-or-update for the non-interactive path: a failed fill
/// aborts without touching any file.
pub async fn create_or_update_auto(
    set: &mut DictionarySet,
    key: &str,
    base_text: &str,
    service: &dyn TranslationService,
) -> Result<()> {
    let languages_order = set.languages().to_vec();
    let entries = machine_fill(&languages_order, base_text, service)
        .await
        .map_err(|err| {
            anyhow!("automatic translation failed ({err}); use manual or interactive mode")
        })?;

    println!("Generated translations:");
    print_entries(&entries);
    apply_entries(set, key, &entries)?;
    println!("Translations saved for key \"{}\"", key);
    Ok(())
}

/// Manual create-or-update from positional texts, mapped to the configured
/// language order. A language without a new text keeps its existing value.
pub fn create_or_update_manual(
    set: &mut DictionarySet,
    key: &str,
    texts: &[String],
) -> Result<()> {
    let languages_order = set.languages().to_vec();
    let mut written = 0;
    for (index, lang) in languages_order.iter().enumerate() {
        let provided = texts
            .get(index)
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty());
        match provided {
            Some(text) => {
                set.set(lang, key, text)?;
                written += 1;
            }
            None if set.contains(lang, key) => {}
            None => info!("no text for \"{}\" in {}, leaving it absent", key, lang),
        }
    }
    println!("Translations saved for key \"{}\" ({} updated)", key, written);
    Ok(())
}

/// Prints each language's value for a key, or marks it missing.
pub fn read_key(set: &DictionarySet, key: &str) {
    for (lang, dict) in set.iter() {
        match dict.get(key) {
            Some(value) => println!("{}: {}", lang, value),
            None => println!("{}: (missing)", lang),
        }
    }
}

/// Removes a key from every dictionary that has it; absence is reported per
/// language and is not fatal.
pub fn remove_key(set: &mut DictionarySet, key: &str) -> Result<()> {
    let languages_order = set.languages().to_vec();
    for lang in &languages_order {
        if set.remove(lang, key)? {
            println!("Key \"{}\" removed for {}", key, lang);
        } else {
            println!("Key \"{}\" was not found for {}", key, lang);
        }
    }
    Ok(())
}

pub fn print_drift(report: &[DriftEntry]) {
    println!("Out-of-sync keys found:");
    for entry in report {
        println!("- \"{}\" missing in: {}", entry.key, entry.missing_in.join(", "));
    }
}

/// Headless verify: report drift and signal it through the exit status so the
/// check can gate automated pipelines.
pub fn verify_unattended(set: &DictionarySet) -> RunStatus {
    let report = compute_drift(set);
    if report.is_empty() {
        println!("All translation files are aligned!");
        return RunStatus::Clean;
    }
    let keys: Vec<&str> = report.iter().map(|entry| entry.key.as_str()).collect();
    eprintln!(
        "The following keys are not present in all languages: {}",
        keys.join(", ")
    );
    RunStatus::Drift
}

/// Attended verify: report drift, then offer a repair policy and reconcile.
pub async fn verify_attended(
    set: &mut DictionarySet,
    service: &dyn TranslationService,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    let report = compute_drift(set);
    if report.is_empty() {
        println!("Everything is in sync.");
        return Ok(());
    }

    print_drift(&report);
    let choice = prompter.select(
        "Drift detected. What do you want to do?",
        &[
            "Synchronize automatically",
            "Synchronize manually",
            "Do nothing",
        ],
        0,
    )?;
    let policy = match choice {
        0 => RepairPolicy::Automatic,
        1 => RepairPolicy::Manual,
        _ => RepairPolicy::None,
    };
    if policy == RepairPolicy::None {
        return Ok(());
    }

    let summary = reconcile(set, &report, policy, service, prompter).await?;
    println!(
        "Reconciliation finished: {} filled, {} skipped.",
        summary.filled, summary.skipped
    );
    Ok(())
}
