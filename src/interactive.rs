use anyhow::{Result, anyhow};
use tracing::warn;

use crate::gateway::TranslationService;
use crate::languages;
use crate::ops;
use crate::prompt::Prompter;
use crate::store::DictionarySet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    CreateOrUpdate,
    Read,
    Remove,
}

/// The next input the attended session needs. Each answer decides the
/// following step, so the flow is a plain transition loop instead of a chain
/// of conditional prompts.
#[derive(Debug)]
enum Step {
    SelectOperation,
    AskKey(Operation),
    SelectMode {
        key: String,
    },
    AskBaseText {
        key: String,
    },
    CollectManual {
        key: String,
        defaults: Option<Vec<(String, String)>>,
    },
    Verify,
}

/// Runs one attended session: probe the gateway, pick an operation (Verify is
/// the default), collect the inputs that operation needs, execute it.
pub async fn run_session(
    set: &mut DictionarySet,
    service: &dyn TranslationService,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    let available = service.is_available().await;
    if available {
        println!("Translation service detected. Automatic mode available.");
    } else {
        println!("Translation service not reachable. Manual mode available.");
    }

    let mut step = Step::SelectOperation;
    loop {
        step = match step {
            Step::SelectOperation => {
                let choice = prompter.select(
                    "Which operation do you want to run?",
                    &["Create or update", "Read", "Remove", "Verify"],
                    3,
                )?;
                match choice {
                    0 => Step::AskKey(Operation::CreateOrUpdate),
                    1 => Step::AskKey(Operation::Read),
                    2 => Step::AskKey(Operation::Remove),
                    _ => Step::Verify,
                }
            }

            Step::AskKey(operation) => {
                let key = prompter.input("What is the key?", None)?;
                let key = key.trim().to_string();
                if key.is_empty() {
                    return Err(anyhow!("a translation key is required"));
                }
                match operation {
                    Operation::CreateOrUpdate => Step::SelectMode { key },
                    Operation::Read => {
                        ops::read_key(set, &key);
                        return Ok(());
                    }
                    Operation::Remove => {
                        ops::remove_key(set, &key)?;
                        return Ok(());
                    }
                }
            }

            Step::SelectMode { key } => {
                let default = if available { 0 } else { 1 };
                let choice = prompter.select(
                    "How do you want to create the translations?",
                    &[
                        "Automatic (detect the language, translate the rest)",
                        "Manual (enter each language yourself)",
                    ],
                    default,
                )?;
                if choice == 0 {
                    Step::AskBaseText { key }
                } else {
                    Step::CollectManual {
                        key,
                        defaults: None,
                    }
                }
            }

            Step::AskBaseText { key } => {
                let base_text = prompter
                    .input("Enter the base text (its language is detected automatically):", None)?;
                let base_text = base_text.trim().to_string();
                if base_text.is_empty() {
                    return Err(anyhow!("a base text is required for automatic mode"));
                }

                let languages_order = set.languages().to_vec();
                match ops::machine_fill(&languages_order, &base_text, service).await {
                    Ok(entries) => {
                        println!("Machine-generated translations:");
                        ops::print_entries(&entries);
                        if prompter.confirm("Use these translations?", true)? {
                            let written = ops::apply_entries(set, &key, &entries)?;
                            println!(
                                "Translations saved for key \"{}\" ({} written)",
                                key, written
                            );
                            return Ok(());
                        }
                        // Declined: re-enter by hand with the generated texts
                        // as defaults.
                        Step::CollectManual {
                            key,
                            defaults: Some(entries),
                        }
                    }
                    Err(err) => {
                        warn!("automatic translation failed: {}", err);
                        println!("Automatic translation did not work. Switching to manual entry.");
                        Step::CollectManual {
                            key,
                            defaults: None,
                        }
                    }
                }
            }

            Step::CollectManual { key, defaults } => {
                let languages_order = set.languages().to_vec();
                let mut entries = Vec::with_capacity(languages_order.len());
                for (index, lang) in languages_order.iter().enumerate() {
                    let message =
                        format!("{} translation?", languages::display_name_or_code(lang));
                    let generated = defaults
                        .as_ref()
                        .and_then(|entries| entries.get(index))
                        .map(|(_, text)| text.as_str());
                    // Blank input falls back to the generated text, then to
                    // the value already stored for this language.
                    let default = generated.or_else(|| set.get(lang, &key));
                    let text = prompter.input(&message, default)?;
                    entries.push((lang.clone(), text));
                }
                let written = ops::apply_entries(set, &key, &entries)?;
                println!("Translations saved for key \"{}\" ({} written)", key, written);
                return Ok(());
            }

            Step::Verify => {
                ops::verify_attended(set, service, prompter).await?;
                return Ok(());
            }
        };
    }
}
