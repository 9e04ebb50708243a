use astro_common::SatelliteId;
use std::collections::HashMap;

use crate::model::{InitialState, PositionRecord};

#[derive(Debug, Clone)]
struct StoredRecord {
    record: PositionRecord,
    /// Batch that wrote the record; 0 for injected or directly set records
    sequence: u64,
}

/// Latest record per tracked satellite.
///
/// Records are only ever replaced whole, never removed.
#[derive(Debug, Default)]
pub struct PositionStore {
    records: HashMap<SatelliteId, StoredRecord>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one record per injected satellite.
    pub fn from_initial(initial: &InitialState) -> Self {
        let mut store = Self::new();
        for satellite in &initial.satellites {
            let record = PositionRecord::from_initial(satellite);
            if record.is_valid() {
                tracing::debug!("Stored initial valid data for ID {}", satellite.id);
            } else {
                tracing::warn!("Initial data for ID {} is invalid", satellite.id);
            }
            store.set(satellite.id, record);
        }
        store
    }

    pub fn get(&self, id: SatelliteId) -> Option<&PositionRecord> {
        self.records.get(&id).map(|stored| &stored.record)
    }

    /// Unconditional overwrite, keeping the sequence already recorded for `id`.
    pub fn set(&mut self, id: SatelliteId, record: PositionRecord) {
        let sequence = self.records.get(&id).map_or(0, |stored| stored.sequence);
        self.records.insert(id, StoredRecord { record, sequence });
    }

    /// Write `record` unless a newer batch already wrote `id`.
    ///
    /// Returns whether the record was stored.
    pub fn apply(&mut self, id: SatelliteId, record: PositionRecord, sequence: u64) -> bool {
        if let Some(stored) = self.records.get(&id) {
            if stored.sequence > sequence {
                tracing::debug!(
                    "Dropping stale outcome for ID {} (batch {} < applied {})",
                    id,
                    sequence,
                    stored.sequence
                );
                return false;
            }
        }
        self.records.insert(id, StoredRecord { record, sequence });
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
