//! Per-tick immutable view of everything that shapes traversal cost.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use crate::constants::SPEED_BOOST_HALO;
use crate::geometry::{Tile, TileRect, tiles_with_tolerance};
use crate::route::VesselFootprint;

/// Hazard and terrain snapshot for one tick.
///
/// Built by the environment layer each tick and never mutated afterwards.
/// All sets are ordered so the fingerprint is independent of insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HazardSnapshot {
    /// Tiles currently loaded in the scene; nothing outside can be pathed.
    pub bounds: TileRect,
    /// Trial area the vessel must stay inside.
    pub exclusion_zone: TileRect,
    /// Mobile hazards that are dangerous right now (e.g. charged clouds).
    pub dangerous: BTreeSet<Tile>,
    /// Static obstacles such as rocks.
    pub rocks: BTreeSet<Tile>,
    pub speed_boosts: BTreeSet<Tile>,
    pub slow_hazards: BTreeSet<Tile>,
    /// Optional structures (e.g. pillars) keyed by tile, with interacted flag.
    pub structures: BTreeMap<Tile, bool>,
    pub footprint: VesselFootprint,
}

impl HazardSnapshot {
    /// Empty sea where the scene and the trial area share the same bounds.
    #[must_use]
    pub fn open_water(bounds: TileRect, footprint: VesselFootprint) -> Self {
        Self {
            bounds,
            exclusion_zone: bounds,
            dangerous: BTreeSet::new(),
            rocks: BTreeSet::new(),
            speed_boosts: BTreeSet::new(),
            slow_hazards: BTreeSet::new(),
            structures: BTreeMap::new(),
            footprint,
        }
    }

    #[must_use]
    pub const fn with_exclusion_zone(mut self, zone: TileRect) -> Self {
        self.exclusion_zone = zone;
        self
    }

    #[must_use]
    pub fn with_rocks(mut self, tiles: impl IntoIterator<Item = Tile>) -> Self {
        self.rocks.extend(tiles);
        self
    }

    #[must_use]
    pub fn with_dangerous(mut self, tiles: impl IntoIterator<Item = Tile>) -> Self {
        self.dangerous.extend(tiles);
        self
    }

    #[must_use]
    pub fn with_slow_hazards(mut self, tiles: impl IntoIterator<Item = Tile>) -> Self {
        self.slow_hazards.extend(tiles);
        self
    }

    /// Adds raw boost tiles with no halo.
    #[must_use]
    pub fn with_speed_boosts(mut self, tiles: impl IntoIterator<Item = Tile>) -> Self {
        self.speed_boosts.extend(tiles);
        self
    }

    /// Adds a boost object anchored at `anchor`; the surrounding 3x3 counts as boost.
    pub fn add_speed_boost_object(&mut self, anchor: Tile) {
        self.speed_boosts
            .extend(tiles_with_tolerance(anchor, SPEED_BOOST_HALO));
    }

    pub fn set_structure(&mut self, tile: Tile, interacted: bool) {
        self.structures.insert(tile, interacted);
    }

    /// Static obstacle: a rock, or a structure nobody has interacted with yet.
    #[must_use]
    pub fn is_static_blocked(&self, tile: Tile) -> bool {
        self.rocks.contains(&tile) || self.structures.get(&tile) == Some(&false)
    }

    #[must_use]
    pub fn is_obstacle(&self, tile: Tile) -> bool {
        self.is_static_blocked(tile) || self.dangerous.contains(&tile)
    }

    /// Inside both the loaded scene and the trial area.
    #[must_use]
    pub const fn is_in_play(&self, tile: Tile) -> bool {
        self.bounds.contains(tile) && self.exclusion_zone.contains(tile)
    }

    /// Comparable digest used to detect "materially unchanged" hazards.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = XxHash64::with_seed(0);
        self.bounds.hash(&mut hasher);
        self.exclusion_zone.hash(&mut hasher);
        self.dangerous.hash(&mut hasher);
        self.rocks.hash(&mut hasher);
        self.speed_boosts.hash(&mut hasher);
        self.slow_hazards.hash(&mut hasher);
        self.structures.hash(&mut hasher);
        self.footprint.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sea() -> HazardSnapshot {
        HazardSnapshot::open_water(
            TileRect::new(Tile::new(0, 0), Tile::new(20, 20)),
            VesselFootprint::new(3, 2),
        )
    }

    #[test]
    fn fingerprint_ignores_insertion_order() {
        let a = sea().with_rocks([Tile::new(1, 1), Tile::new(4, 4)]);
        let b = sea().with_rocks([Tile::new(4, 4), Tile::new(1, 1)]);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_tracks_moving_hazards() {
        let a = sea().with_dangerous([Tile::new(5, 5)]);
        let b = sea().with_dangerous([Tile::new(6, 5)]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn boost_object_adds_halo() {
        let mut snapshot = sea();
        snapshot.add_speed_boost_object(Tile::new(10, 10));
        assert_eq!(snapshot.speed_boosts.len(), 9);
        assert!(snapshot.speed_boosts.contains(&Tile::new(11, 9)));
    }

    #[test]
    fn structures_block_like_rocks() {
        let mut snapshot = sea();
        snapshot.set_structure(Tile::new(3, 3), false);
        assert!(snapshot.is_static_blocked(Tile::new(3, 3)));
        assert!(snapshot.is_obstacle(Tile::new(3, 3)));
        assert!(!snapshot.is_obstacle(Tile::new(3, 4)));
    }

    #[test]
    fn interacted_structures_open_up() {
        let mut snapshot = sea();
        snapshot.set_structure(Tile::new(3, 3), false);
        let dormant = snapshot.fingerprint();
        snapshot.set_structure(Tile::new(3, 3), true);
        assert!(!snapshot.is_static_blocked(Tile::new(3, 3)));
        assert!(!snapshot.is_obstacle(Tile::new(3, 3)));
        assert_ne!(snapshot.fingerprint(), dormant);
    }
}
