//! Derives disappearance events from successive collectible observations.

use std::collections::BTreeSet;

use crate::events::ObjectiveEvent;
use crate::geometry::Tile;

/// Remembers the last set of visible collectibles and the collected counter.
///
/// A location that vanished between two observations only counts as picked up
/// when the counter rose in the same interval; otherwise it merely left view.
#[derive(Debug, Clone, Default)]
pub struct CollectibleWatcher {
    previous: BTreeSet<Tile>,
    previous_count: Option<u32>,
}

impl CollectibleWatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation and return the disappearances it implies.
    pub fn observe(
        &mut self,
        visible: impl IntoIterator<Item = Tile>,
        collected_count: u32,
    ) -> Vec<ObjectiveEvent> {
        let current: BTreeSet<Tile> = visible.into_iter().collect();
        let rose = self
            .previous_count
            .is_some_and(|before| collected_count > before);
        let events = if rose {
            self.previous
                .difference(&current)
                .map(|&location| ObjectiveEvent::Disappearance { location })
                .collect()
        } else {
            Vec::new()
        };
        self.previous = current;
        self.previous_count = Some(collected_count);
        events
    }

    pub fn reset(&mut self) {
        self.previous.clear();
        self.previous_count = None;
    }
}
