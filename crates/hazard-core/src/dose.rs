//! Per-actor dose records and their binary encoding

use ahash::AHashMap;
use hazard_rules::RuleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DoseError {
    #[error("failed to encode dose record: {0}")]
    Encode(String),
    #[error("failed to decode dose record: {0}")]
    Decode(String),
}

/// Accumulated dose per hazard type for one actor
///
/// Sparse: a hazard type with zero dose has no entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DoseRecord {
    doses: BTreeMap<RuleId, f64>,
}

impl DoseRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, hazard: &RuleId) -> f64 {
        self.doses.get(hazard).copied().unwrap_or(0.0)
    }

    /// Store a dose; zero, negative or non-finite values remove the entry
    pub fn set(&mut self, hazard: &RuleId, dose: f64) {
        if dose.is_finite() && dose > 0.0 {
            self.doses.insert(hazard.clone(), dose);
        } else {
            self.doses.remove(hazard);
        }
    }

    pub fn add(&mut self, hazard: &RuleId, amount: f64) {
        let next = self.get(hazard) + amount;
        self.set(hazard, next);
    }

    /// Subtract `amount` from every entry, flooring at zero
    ///
    /// Returns the total actually removed.
    pub fn remove_from_all(&mut self, amount: f64) -> f64 {
        if amount.is_nan() || amount <= 0.0 {
            return 0.0;
        }
        let mut removed = 0.0;
        self.doses.retain(|_, dose| {
            let taken = dose.min(amount);
            removed += taken;
            *dose -= taken;
            *dose > 0.0
        });
        removed
    }

    pub fn clear(&mut self) {
        self.doses.clear();
    }

    pub fn copy_from(&mut self, other: &DoseRecord) {
        self.doses.clone_from(&other.doses);
    }

    pub fn is_empty(&self) -> bool {
        self.doses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.doses.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RuleId, f64)> {
        self.doses.iter().map(|(id, dose)| (id, *dose))
    }

    pub fn encode(&self) -> Result<Vec<u8>, DoseError> {
        bincode_next::serde::encode_to_vec(&self.doses, bincode_next::config::standard())
            .map_err(|e| DoseError::Encode(e.to_string()))
    }

    /// Decode a record, dropping zero or non-finite entries
    pub fn decode(bytes: &[u8]) -> Result<Self, DoseError> {
        let (doses, _): (BTreeMap<RuleId, f64>, _) =
            bincode_next::serde::decode_from_slice(bytes, bincode_next::config::standard())
                .map_err(|e| DoseError::Decode(e.to_string()))?;

        let mut record = DoseRecord::new();
        for (hazard, dose) in &doses {
            record.set(hazard, *dose);
        }
        Ok(record)
    }
}

/// Dose records of every actor in a world, created on first access
#[derive(Debug, Default)]
pub struct DoseStore {
    records: AHashMap<u64, DoseRecord>,
}

impl DoseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, actor: u64) -> Option<&DoseRecord> {
        self.records.get(&actor)
    }

    pub fn record_mut(&mut self, actor: u64) -> &mut DoseRecord {
        self.records.entry(actor).or_default()
    }

    pub fn dose(&self, actor: u64, hazard: &RuleId) -> f64 {
        self.records.get(&actor).map_or(0.0, |record| record.get(hazard))
    }

    pub fn reset(&mut self, actor: u64) {
        if let Some(record) = self.records.get_mut(&actor) {
            record.clear();
        }
    }

    /// Carry a record over to a re-instantiated actor
    pub fn transfer(&mut self, from: u64, to: u64) {
        if from == to {
            return;
        }
        let source = self.records.remove(&from).unwrap_or_default();
        self.record_mut(to).copy_from(&source);
    }

    pub fn remove_actor(&mut self, actor: u64) -> Option<DoseRecord> {
        self.records.remove(&actor)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
