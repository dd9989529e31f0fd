//! Objective signals fed to the progress tracker and what they changed.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::geometry::Tile;
use crate::route::WaypointKind;

/// Recognised chat/overlay messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSignal {
    RumCollected,
    RumDelivered,
    ToadsCollected,
    PortalTraversed,
}

impl TextSignal {
    /// Waypoint kind completed by this message.
    #[must_use]
    pub const fn waypoint_kind(self) -> WaypointKind {
        match self {
            Self::RumCollected => WaypointKind::RumPickup,
            Self::RumDelivered => WaypointKind::RumDropoff,
            Self::ToadsCollected => WaypointKind::ToadPickup,
            Self::PortalTraversed => WaypointKind::PortalEntry,
        }
    }

    /// Deliveries count toward the lap total.
    #[must_use]
    pub const fn is_delivery(self) -> bool {
        matches!(self, Self::RumDelivered)
    }
}

/// One observation from the environment layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectiveEvent {
    Text { signal: TextSignal },
    /// An identity-swapping object changed state.
    IdentityToggle { object_id: u32, now_active: bool },
    /// The vessel is at `location`.
    Proximity { location: Tile },
    /// A collectible at `location` vanished after the vessel picked it up.
    Disappearance { location: Tile },
}

/// Indices completed by a single event; almost always zero or one.
pub type CompletedIndices = SmallVec<[usize; 2]>;

/// What one event (or trial entry) changed in the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressChange {
    pub completed: CompletedIndices,
    /// New lap number when it changed.
    pub lap: Option<u32>,
    /// The current path must be discarded (the vessel was teleported).
    pub reset_path: bool,
}

impl ProgressChange {
    #[must_use]
    pub fn completed(index: usize) -> Self {
        let mut completed = CompletedIndices::new();
        completed.push(index);
        Self {
            completed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.lap.is_none() && !self.reset_path
    }

    /// Fold a later change into this one.
    pub fn merge(&mut self, later: Self) {
        self.completed.extend(later.completed);
        if later.lap.is_some() {
            self.lap = later.lap;
        }
        self.reset_path |= later.reset_path;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_latest_lap_and_sticky_reset() {
        let mut change = ProgressChange::completed(2);
        change.merge(ProgressChange {
            lap: Some(3),
            reset_path: true,
            ..ProgressChange::completed(4)
        });
        change.merge(ProgressChange::default());
        assert_eq!(change.completed.as_slice(), &[2, 4]);
        assert_eq!(change.lap, Some(3));
        assert!(change.reset_path);
        assert!(!change.is_empty());
        assert!(ProgressChange::default().is_empty());
    }

    #[test]
    fn events_use_tagged_json() {
        let event: ObjectiveEvent =
            serde_json::from_str(r#"{ "type": "identity_toggle", "object_id": 9, "now_active": true }"#)
                .unwrap();
        assert_eq!(
            event,
            ObjectiveEvent::IdentityToggle {
                object_id: 9,
                now_active: true
            }
        );
        assert_eq!(TextSignal::PortalTraversed.waypoint_kind(), WaypointKind::PortalEntry);
        assert!(TextSignal::RumDelivered.is_delivery());
    }
}
