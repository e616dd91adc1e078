use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unknown language '{0}'")]
    UnknownLanguage(String),
}

/// One language's key→text mapping. Backed by a `BTreeMap` so every
/// serialization comes out with keys in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    entries: BTreeMap<String, String>,
}

impl Dictionary {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All configured dictionaries for one command invocation. Loaded once up
/// front; every mutation persists the affected file immediately.
#[derive(Debug)]
pub struct DictionarySet {
    dir: PathBuf,
    languages: Vec<String>,
    dicts: HashMap<String, Dictionary>,
}

impl DictionarySet {
    /// Loads every language's dictionary. An unreadable or malformed file is
    /// logged and treated as empty so the other languages keep working.
    pub fn load(dir: impl Into<PathBuf>, languages: &[String]) -> Self {
        let dir = dir.into();
        let mut dicts = HashMap::new();
        for lang in languages {
            let path = dictionary_path(&dir, lang);
            let dict = match load_dictionary(&path) {
                Ok(dict) => dict,
                Err(err) => {
                    warn!("{}, treating '{}' as empty", err, lang);
                    Dictionary::default()
                }
            };
            dicts.insert(lang.clone(), dict);
        }
        Self {
            dir,
            languages: languages.to_vec(),
            dicts,
        }
    }

    /// Language codes in configured priority order.
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn dictionary(&self, lang: &str) -> Option<&Dictionary> {
        self.dicts.get(lang)
    }

    /// Iterates dictionaries in configured language order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dictionary)> {
        self.languages
            .iter()
            .filter_map(|lang| self.dicts.get(lang).map(|dict| (lang.as_str(), dict)))
    }

    pub fn get(&self, lang: &str, key: &str) -> Option<&str> {
        self.dicts.get(lang).and_then(|dict| dict.get(key))
    }

    pub fn contains(&self, lang: &str, key: &str) -> bool {
        self.dicts
            .get(lang)
            .is_some_and(|dict| dict.contains_key(key))
    }

    /// Upserts a key and persists that language's file right away. Writes are
    /// never batched across keys, so an interrupted run keeps every repair
    /// made so far.
    pub fn set(&mut self, lang: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let dict = self
            .dicts
            .get_mut(lang)
            .ok_or_else(|| StoreError::UnknownLanguage(lang.to_string()))?;
        dict.insert(key, value);
        self.save(lang)
    }

    /// Removes a key if present and persists. Returns whether the key existed.
    pub fn remove(&mut self, lang: &str, key: &str) -> Result<bool, StoreError> {
        let dict = self
            .dicts
            .get_mut(lang)
            .ok_or_else(|| StoreError::UnknownLanguage(lang.to_string()))?;
        if dict.remove(key).is_none() {
            return Ok(false);
        }
        self.save(lang)?;
        Ok(true)
    }

    pub fn file_path(&self, lang: &str) -> PathBuf {
        dictionary_path(&self.dir, lang)
    }

    fn save(&self, lang: &str) -> Result<(), StoreError> {
        let dict = self
            .dicts
            .get(lang)
            .ok_or_else(|| StoreError::UnknownLanguage(lang.to_string()))?;
        save_dictionary(&self.dir, lang, dict)
    }
}

fn dictionary_path(dir: &Path, lang: &str) -> PathBuf {
    dir.join(format!("{}.json", lang))
}

fn load_dictionary(path: &Path) -> Result<Dictionary, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("dictionary not found, starting empty: {}", path.display());
            return Ok(Dictionary::default());
        }
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Full-file replacement through a temp file in the same directory, renamed
/// over the target so a crash never leaves a half-written dictionary.
fn save_dictionary(dir: &Path, lang: &str, dict: &Dictionary) -> Result<(), StoreError> {
    let path = dictionary_path(dir, lang);
    let wrap_write = |source: std::io::Error| StoreError::Write {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(dir).map_err(wrap_write)?;
    let content = serde_json::to_string_pretty(dict).map_err(|source| StoreError::Parse {
        path: path.clone(),
        source,
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(wrap_write)?;
    tmp.write_all(content.as_bytes()).map_err(wrap_write)?;
    tmp.write_all(b"\n").map_err(wrap_write)?;
    tmp.persist(&path).map_err(|err| wrap_write(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|code| code.to_string()).collect()
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().expect("tempdir");
        let languages = langs(&["en"]);
        let mut set = DictionarySet::load(dir.path(), &languages);
        set.set("en", "greet", "Hello").expect("set");
        set.set("en", "bye", "Goodbye").expect("set");

        let reloaded = DictionarySet::load(dir.path(), &languages);
        assert_eq!(reloaded.get("en", "greet"), Some("Hello"));
        assert_eq!(reloaded.get("en", "bye"), Some("Goodbye"));
        assert_eq!(reloaded.dictionary("en").map(Dictionary::len), Some(2));
    }

    #[test]
    fn persisted_keys_stay_sorted() {
        let dir = tempdir().expect("tempdir");
        let languages = langs(&["en"]);
        let mut set = DictionarySet::load(dir.path(), &languages);
        set.set("en", "zebra", "z").expect("set");
        set.set("en", "apple", "a").expect("set");
        set.set("en", "mango", "m").expect("set");
        set.remove("en", "mango").expect("remove");

        let raw = fs::read_to_string(set.file_path("en")).expect("read raw");
        let apple = raw.find("\"apple\"").expect("apple present");
        let zebra = raw.find("\"zebra\"").expect("zebra present");
        assert!(apple < zebra);
        assert!(raw.starts_with("{\n  "));
    }

    #[test]
    fn malformed_json_loads_as_empty() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("en.json"), "{not json").expect("write");
        let set = DictionarySet::load(dir.path(), &langs(&["en"]));
        assert!(set.dictionary("en").expect("dict").is_empty());
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempdir().expect("tempdir");
        let set = DictionarySet::load(dir.path(), &langs(&["en", "es"]));
        assert!(set.dictionary("en").expect("dict").is_empty());
        assert!(set.dictionary("es").expect("dict").is_empty());
    }

    #[test]
    fn remove_reports_absence() {
        let dir = tempdir().expect("tempdir");
        let mut set = DictionarySet::load(dir.path(), &langs(&["en"]));
        assert!(!set.remove("en", "ghost").expect("remove"));
        set.set("en", "ghost", "Boo").expect("set");
        assert!(set.remove("en", "ghost").expect("remove"));
        assert!(!set.contains("en", "ghost"));
    }

    #[test]
    fn unknown_language_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let mut set = DictionarySet::load(dir.path(), &langs(&["en"]));
        let err = set.set("fr", "greet", "Bonjour").expect_err("unknown");
        assert!(matches!(err, StoreError::UnknownLanguage(code) if code == "fr"));
    }

    #[test]
    fn empty_string_value_survives_round_trip() {
        let dir = tempdir().expect("tempdir");
        let languages = langs(&["en"]);
        let mut set = DictionarySet::load(dir.path(), &languages);
        set.set("en", "blank", "").expect("set");
        let reloaded = DictionarySet::load(dir.path(), &languages);
        assert_eq!(reloaded.get("en", "blank"), Some(""));
        assert!(reloaded.contains("en", "blank"));
    }
}
