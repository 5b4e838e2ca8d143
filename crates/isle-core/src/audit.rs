//! Append-only record of parameter overrides.
//!
//! Every entry is keyed by a wall-clock timestamp string; keys colliding
//! within the same tick get a numeric suffix so iteration order stays total
//! and insertion-ordered. Batch resets share one timestamp prefix with
//! distinct suffixes.

use chrono::Local;
use serde::Serialize;

use crate::species::{ParamValue, Species};

const STAMP_FORMAT: &str = "%H:%M:%S%.6f";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    /// Timestamp key, unique within the log.
    pub stamp: String,
    pub species: Species,
    pub parameter: String,
    pub value: ParamValue,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
    #[serde(skip)]
    last_base: String,
    #[serde(skip)]
    seq: u32,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one override entry.
    pub fn record(&mut self, species: Species, parameter: impl Into<String>, value: ParamValue) {
        let base = Local::now().format(STAMP_FORMAT).to_string();
        let stamp = self.unique_stamp(base);
        let parameter = parameter.into();
        log::debug!("audit: {species} {parameter} = {value}");
        self.entries.push(AuditEntry { stamp, species, parameter, value });
    }

    /// Append a batch under one shared timestamp prefix. Each entry gets a
    /// distinct `#n` suffix, preserving the iteration order of `items`.
    pub fn record_batch(&mut self, items: Vec<(Species, String, ParamValue)>) {
        let base = Local::now().format(STAMP_FORMAT).to_string();
        let count = items.len() as u32;
        for (i, (species, parameter, value)) in items.into_iter().enumerate() {
            let stamp = format!("{base}#{i}");
            self.entries.push(AuditEntry { stamp, species, parameter, value });
        }
        // A single record landing in the same tick must continue the suffix
        // sequence past the batch.
        self.last_base = base;
        self.seq = count.saturating_sub(1);
    }

    fn unique_stamp(&mut self, base: String) -> String {
        if base == self.last_base {
            self.seq += 1;
            format!("{base}#{}", self.seq)
        } else {
            self.last_base = base.clone();
            self.seq = 0;
            base
        }
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_base.clear();
        self.seq = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_appends_in_insertion_order() {
        let mut log = AuditLog::new();
        log.record(Species::Herbivore, "beta", ParamValue::Number(0.5));
        log.record(Species::Carnivore, "F", ParamValue::Number(60.0));
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].parameter, "beta");
        assert_eq!(log.entries()[1].species, Species::Carnivore);
    }

    #[test]
    fn stamps_are_unique_even_within_one_tick() {
        let mut log = AuditLog::new();
        for _ in 0..50 {
            log.record(Species::Fodder, "Lowland", ParamValue::Number(800.0));
        }
        let mut stamps: Vec<&str> =
            log.entries().iter().map(|e| e.stamp.as_str()).collect();
        stamps.sort();
        stamps.dedup();
        assert_eq!(stamps.len(), 50, "timestamp keys must be unique");
    }

    #[test]
    fn batch_shares_prefix_with_distinct_suffixes() {
        let mut log = AuditLog::new();
        log.record_batch(vec![
            (Species::Herbivore, "beta".into(), ParamValue::Number(0.9)),
            (Species::Carnivore, "beta".into(), ParamValue::Number(0.75)),
            (Species::Fodder, "Lowland".into(), ParamValue::Number(800.0)),
        ]);
        let entries = log.entries();
        assert_eq!(entries.len(), 3);

        let prefix = entries[0].stamp.split('#').next().unwrap().to_string();
        for (i, e) in entries.iter().enumerate() {
            assert!(
                e.stamp.starts_with(&prefix),
                "entry {i} stamp {} lacks shared prefix {prefix}",
                e.stamp
            );
            assert_eq!(e.stamp, format!("{prefix}#{i}"));
        }
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = AuditLog::new();
        log.record(Species::Herbivore, "mu", ParamValue::Number(1.0));
        log.clear();
        assert!(log.is_empty());
    }
}
