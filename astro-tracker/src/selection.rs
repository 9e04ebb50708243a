use astro_common::SatelliteId;

use crate::map::MapProjector;
use crate::model::PositionRecord;
use crate::store::PositionStore;

/// Which satellite the map follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionController {
    selected: SatelliteId,
}

impl SelectionController {
    pub fn new(default: SatelliteId) -> Self {
        Self { selected: default }
    }

    pub fn selected(&self) -> SatelliteId {
        self.selected
    }

    pub fn is_selected(&self, id: SatelliteId) -> bool {
        self.selected == id
    }

    /// Bind `id` to the map and jump to its cached position.
    ///
    /// Reads the store only; never fetches.
    pub fn select(&mut self, id: SatelliteId, store: &PositionStore, projector: &mut MapProjector) {
        tracing::info!("Selected satellite changed to ID {}", id);
        self.selected = id;
        self.reconcile(store, projector);
    }

    /// Recenter on the selected satellite, or fall back to the world view.
    pub fn reconcile(&self, store: &PositionStore, projector: &mut MapProjector) {
        match store.get(self.selected) {
            Some(PositionRecord::Valid(position)) => {
                tracing::debug!(
                    "Valid data for selected ID {}: lat {}, lon {}",
                    self.selected,
                    position.latitude(),
                    position.longitude()
                );
                projector.move_marker_and_recenter(position.latitude(), position.longitude(), Some(position.name()));
            }
            _ => {
                tracing::warn!(
                    "No valid position for selected satellite ID {}, showing world view",
                    self.selected
                );
                projector.reset_to_unknown();
            }
        }
    }
}
