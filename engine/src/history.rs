use crate::clock;
use crate::console;
use crate::storage::HistoryStorage;
use crate::types::{FrequencySnapshot, HistoryEntry, HistoryMap};
use std::cmp::Ordering;

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Recency halves every week
const RECENCY_HALF_LIFE_DAYS: f64 = 7.0;

/// Suggestion blend: 60% recency, 40% normalized frequency
const RECENCY_WEIGHT: f64 = 0.6;
const FREQUENCY_WEIGHT: f64 = 0.4;

/// Selection history, owned in memory and mirrored to a storage adapter
pub struct SearchHistory {
    entries: HistoryMap,
    storage: Box<dyn HistoryStorage>,
}

impl SearchHistory {
    /// Load once from storage; an unreadable store starts an empty history
    pub fn new(storage: Box<dyn HistoryStorage>) -> Self {
        let entries = match storage.load() {
            Ok(loaded) => loaded
                .into_values()
                .map(|entry| (entry.result_id.clone(), entry))
                .collect(),
            Err(e) => {
                console::warn(&format!(
                    "Failed to load search history, starting empty: {}",
                    e
                ));
                HistoryMap::new()
            }
        };
        tracing::debug!(entries = entries.len(), "Loaded search history");

        SearchHistory { entries, storage }
    }

    pub fn record_selection(&mut self, result_id: &str) {
        self.record_selection_at(result_id, clock::now_ms());
    }

    /// Count a selection made at `now` (ms since epoch) and persist
    pub fn record_selection_at(&mut self, result_id: &str, now: f64) {
        let entry = self
            .entries
            .entry(result_id.to_string())
            .or_insert_with(|| HistoryEntry {
                result_id: result_id.to_string(),
                selection_count: 0,
                last_selected_at: now,
            });
        entry.selection_count = entry.selection_count.saturating_add(1);
        entry.last_selected_at = now;

        self.persist();
    }

    /// Best effort: the in-memory update already happened
    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.entries) {
            console::warn(&format!("Failed to save search history: {}", e));
        }
    }

    pub fn frequency_snapshot(&self) -> FrequencySnapshot {
        self.entries
            .iter()
            .map(|(id, entry)| (id.clone(), entry.selection_count))
            .collect()
    }

    pub fn recent_suggestions(&self, limit: usize) -> Vec<String> {
        self.recent_suggestions_at(limit, clock::now_ms())
    }

    /// Result ids ordered by a blend of recency and frequency as of `now`
    pub fn recent_suggestions_at(&self, limit: usize, now: f64) -> Vec<String> {
        let max_count = self
            .entries
            .values()
            .map(|entry| entry.selection_count)
            .max()
            .unwrap_or(0);
        let frequency_scale = (1.0 + f64::from(max_count)).ln();

        let mut scored: Vec<(f64, &str)> = self
            .entries
            .values()
            .map(|entry| {
                let age_days = (now - entry.last_selected_at).max(0.0) / MS_PER_DAY;
                let recency = 0.5f64.powf(age_days / RECENCY_HALF_LIFE_DAYS);
                let frequency = if frequency_scale > 0.0 {
                    (1.0 + f64::from(entry.selection_count)).ln() / frequency_scale
                } else {
                    0.0
                };
                (
                    RECENCY_WEIGHT * recency + FREQUENCY_WEIGHT * frequency,
                    entry.result_id.as_str(),
                )
            })
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(b.1))
        });
        scored
            .into_iter()
            .take(limit)
            .map(|(_, id)| id.to_string())
            .collect()
    }

    pub fn entry(&self, result_id: &str) -> Option<&HistoryEntry> {
        self.entries.get(result_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
