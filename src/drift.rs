use serde::Serialize;
use std::collections::HashSet;

use crate::store::DictionarySet;

/// One out-of-sync key: present somewhere, absent in `missing_in`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftEntry {
    pub key: String,
    pub missing_in: Vec<String>,
}

/// Computes the drift report: for every key in the union of all dictionaries,
/// the languages whose dictionary lacks it. Keys shared by every language are
/// not reported. Union keys keep encounter order across the configured
/// language priority.
///
/// Absence is decided by key presence, never by value truthiness, so an
/// intentionally empty translation does not count as drift.
pub fn compute_drift(set: &DictionarySet) -> Vec<DriftEntry> {
    let mut seen = HashSet::new();
    let mut union_keys = Vec::new();
    for (_, dict) in set.iter() {
        for key in dict.keys() {
            if seen.insert(key.to_string()) {
                union_keys.push(key.to_string());
            }
        }
    }

    let mut report = Vec::new();
    for key in union_keys {
        let missing_in: Vec<String> = set
            .iter()
            .filter(|(_, dict)| !dict.contains_key(&key))
            .map(|(lang, _)| lang.to_string())
            .collect();
        if !missing_in.is_empty() {
            report.push(DriftEntry { key, missing_in });
        }
    }
    report
}
