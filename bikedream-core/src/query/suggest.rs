//! Typeahead suggestion index.
//!
//! The index holds one entry per distinct manufacturer and model with the
//! number of catalog records it matches. It is rebuilt whenever the
//! catalog is mutated (seeding, scheduler passes, admin writes) and every
//! lookup is a warm in-memory scan, so suggestion queries stay cheap.

use std::cmp::Reverse;
use std::sync::RwLock;

use serde::Serialize;

use crate::model::Motorcycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Manufacturer,
    Model,
}

/// One ranked suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub count: u64,
    pub display_text: String,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    value: String,
    lower: String,
    kind: SuggestionKind,
    count: u64,
    display: String,
}

/// Rebuildable suggestion index.
pub struct SuggestionIndex {
    entries: RwLock<Vec<IndexEntry>>,
}

impl Default for SuggestionIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionIndex {
    pub fn new() -> Self {
        Self { entries: RwLock::new(Vec::new()) }
    }

    /// Rebuild the index from a catalog snapshot.
    pub fn rebuild(&self, motorcycles: &[Motorcycle]) {
        use std::collections::BTreeMap;

        let mut manufacturers: BTreeMap<String, u64> = BTreeMap::new();
        // model -> (count, manufacturer of the first sighting)
        let mut models: BTreeMap<String, (u64, String)> = BTreeMap::new();

        for m in motorcycles {
            *manufacturers.entry(m.manufacturer.clone()).or_insert(0) += 1;
            models
                .entry(m.model.clone())
                .or_insert_with(|| (0, m.manufacturer.clone()))
                .0 += 1;
        }

        let mut entries = Vec::with_capacity(manufacturers.len() + models.len());
        for (value, count) in manufacturers {
            entries.push(IndexEntry {
                lower: value.to_lowercase(),
                display: format!("{value} ({count} motorcycles)"),
                kind: SuggestionKind::Manufacturer,
                count,
                value,
            });
        }
        for (value, (count, manufacturer)) in models {
            entries.push(IndexEntry {
                lower: value.to_lowercase(),
                display: format!("{manufacturer} {value}"),
                kind: SuggestionKind::Model,
                count,
                value,
            });
        }

        let total = entries.len();
        *self.entries.write().expect("suggestion index lock poisoned") = entries;
        log::debug!("Suggestion index rebuilt: {total} entries");
    }

    /// Rank matches for `q`: exact-prefix matches before substring
    /// matches; within a class by count descending, then alphabetical.
    pub fn suggest(&self, q: &str, limit: usize) -> Vec<Suggestion> {
        let q = q.trim().to_lowercase();
        if q.is_empty() || limit == 0 {
            return Vec::new();
        }

        let entries = self.entries.read().expect("suggestion index lock poisoned");
        let mut ranked: Vec<(u8, Reverse<u64>, String, &IndexEntry)> = entries
            .iter()
            .filter_map(|e| {
                if e.lower.starts_with(&q) {
                    Some((0u8, Reverse(e.count), e.value.clone(), e))
                } else if e.lower.contains(&q) {
                    Some((1u8, Reverse(e.count), e.value.clone(), e))
                } else {
                    None
                }
            })
            .collect();

        ranked.sort_by(|a, b| (a.0, &a.1, &a.2).cmp(&(b.0, &b.1, &b.2)));
        ranked
            .into_iter()
            .take(limit)
            .map(|(_, _, _, e)| Suggestion {
                value: e.value.clone(),
                kind: e.kind,
                count: e.count,
                display_text: e.display.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::motorcycle::tests::sample;

    fn corpus() -> Vec<Motorcycle> {
        let mut out = Vec::new();
        for (manufacturer, model, n) in [
            ("Yamaha", "MT-09", 3),
            ("Yam-Tech", "Bolt", 2),
            ("Honda-Yamaha-Imports", "Grey CB", 1),
            ("Honda", "CB500X", 4),
        ] {
            for i in 0..n {
                let mut m = sample(&format!("{manufacturer}-{model}-{i}"));
                m.manufacturer = manufacturer.to_string();
                m.model = model.to_string();
                out.push(m);
            }
        }
        out
    }

    #[test]
    fn test_prefix_class_outranks_substring() {
        let index = SuggestionIndex::new();
        index.rebuild(&corpus());

        let suggestions = index.suggest("Ya", 3);
        let values: Vec<&str> = suggestions.iter().map(|s| s.value.as_str()).collect();
        // Prefix matches first (by count desc), substring match last.
        assert_eq!(values, ["Yamaha", "Yam-Tech", "Honda-Yamaha-Imports"]);
    }

    #[test]
    fn test_counts_reported() {
        let index = SuggestionIndex::new();
        index.rebuild(&corpus());

        let suggestions = index.suggest("yamaha", 5);
        let yamaha = suggestions.iter().find(|s| s.value == "Yamaha").unwrap();
        assert_eq!(yamaha.count, 3);
        assert_eq!(yamaha.kind, SuggestionKind::Manufacturer);
    }

    #[test]
    fn test_models_included() {
        let index = SuggestionIndex::new();
        index.rebuild(&corpus());

        let suggestions = index.suggest("cb", 5);
        assert!(suggestions.iter().any(|s| s.value == "CB500X" && s.kind == SuggestionKind::Model));
    }

    #[test]
    fn test_limit_and_blank_query() {
        let index = SuggestionIndex::new();
        index.rebuild(&corpus());

        assert_eq!(index.suggest("Ya", 1).len(), 1);
        assert!(index.suggest("  ", 5).is_empty());
        assert!(index.suggest("zzz", 5).is_empty());
    }

    #[test]
    fn test_rebuild_replaces() {
        let index = SuggestionIndex::new();
        index.rebuild(&corpus());
        assert!(!index.suggest("Yamaha", 5).is_empty());

        index.rebuild(&[]);
        assert!(index.suggest("Yamaha", 5).is_empty());
    }
}
