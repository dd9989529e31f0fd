//! Tile-space primitives shared by the cost model, the search and the planner.
//!
//! The trial sea is a flat grid of tiles. Distances are Chebyshev because a
//! vessel moves one tile in any of eight directions per step.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;

/// A single world tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance in tiles.
    #[must_use]
    pub const fn chebyshev(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Step vector from `self` to `next`.
    #[must_use]
    pub const fn heading_to(self, next: Self) -> Heading {
        Heading::new(next.x - self.x, next.y - self.y)
    }
}

impl From<(i32, i32)> for Tile {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Tile> for (i32, i32) {
    fn from(tile: Tile) -> Self {
        (tile.x, tile.y)
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The eight neighbour offsets, clockwise from east.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Direction of travel as an integer vector. A zero vector means "no preference".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Heading {
    pub dx: i32,
    pub dy: i32,
}

impl Heading {
    pub const NONE: Self = Self { dx: 0, dy: 0 };

    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Nearest of the eight compass octants (0 = east, counter-clockwise),
    /// or `None` for a zero vector.
    #[must_use]
    pub fn octant(self) -> Option<u8> {
        if self.is_none() {
            return None;
        }
        let angle = f64::from(self.dy).atan2(f64::from(self.dx));
        let slot = (angle / FRAC_PI_4).round().rem_euclid(8.0);
        // slot is in [0, 8) after rem_euclid, so the cast is lossless.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let octant = slot as u8 % 8;
        Some(octant)
    }

    /// Number of 45° turns (0..=4) between this heading and `other`.
    /// Zero when either vector carries no direction.
    #[must_use]
    pub fn turn_steps(self, other: Self) -> u8 {
        match (self.octant(), other.octant()) {
            (Some(a), Some(b)) => {
                let diff = a.abs_diff(b);
                diff.min(8 - diff)
            }
            _ => 0,
        }
    }
}

/// Inclusive axis-aligned tile rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    pub min: Tile,
    pub max: Tile,
}

impl TileRect {
    #[must_use]
    pub fn new(a: Tile, b: Tile) -> Self {
        Self {
            min: Tile::new(a.x.min(b.x), a.y.min(b.y)),
            max: Tile::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Rectangle centred on `center` extending `half_width`/`half_height` each way.
    #[must_use]
    pub const fn around(center: Tile, half_width: i32, half_height: i32) -> Self {
        Self {
            min: Tile::new(center.x - half_width, center.y - half_height),
            max: Tile::new(center.x + half_width, center.y + half_height),
        }
    }

    #[must_use]
    pub const fn contains(&self, tile: Tile) -> bool {
        tile.x >= self.min.x && tile.x <= self.max.x && tile.y >= self.min.y && tile.y <= self.max.y
    }

    pub fn tiles(self) -> impl Iterator<Item = Tile> {
        let (min_y, max_y) = (self.min.y, self.max.y);
        (self.min.x..=self.max.x).flat_map(move |x| (min_y..=max_y).map(move |y| Tile::new(x, y)))
    }
}

/// Every tile within Chebyshev `tolerance` of `center` (a `(2t+1)²` square).
pub fn tiles_with_tolerance(center: Tile, tolerance: u32) -> impl Iterator<Item = Tile> {
    let reach = i32::try_from(tolerance).unwrap_or(i32::MAX / 4);
    TileRect::around(center, reach, reach).tiles()
}

/// Tile `step` of `steps` along the straight line from `start` toward `target`.
#[must_use]
pub fn point_along(start: Tile, target: Tile, step: i32, steps: i32) -> Tile {
    if steps <= 0 {
        return start;
    }
    let dx = target.x - start.x;
    let dy = target.y - start.y;
    Tile::new(start.x + dx * step / steps, start.y + dy * step / steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chebyshev_takes_the_larger_axis() {
        assert_eq!(Tile::new(0, 0).chebyshev(Tile::new(3, -7)), 7);
        assert_eq!(Tile::new(-2, 4).chebyshev(Tile::new(-2, 4)), 0);
    }

    #[test]
    fn octants_and_turns() {
        assert_eq!(Heading::new(1, 0).octant(), Some(0));
        assert_eq!(Heading::new(0, 1).octant(), Some(2));
        assert_eq!(Heading::new(-1, 0).octant(), Some(4));
        assert_eq!(Heading::new(0, -3).octant(), Some(6));
        assert_eq!(Heading::NONE.octant(), None);
        assert_eq!(Heading::new(1, 0).turn_steps(Heading::new(-1, 0)), 4);
        assert_eq!(Heading::new(1, 0).turn_steps(Heading::new(1, 1)), 1);
        assert_eq!(Heading::new(0, -1).turn_steps(Heading::new(1, 0)), 2);
        assert_eq!(Heading::NONE.turn_steps(Heading::new(1, 0)), 0);
    }

    #[test]
    fn rect_contains_is_inclusive() {
        let rect = TileRect::new(Tile::new(5, 5), Tile::new(0, 0));
        assert!(rect.contains(Tile::new(0, 0)));
        assert!(rect.contains(Tile::new(5, 5)));
        assert!(!rect.contains(Tile::new(6, 5)));
        assert_eq!(rect.tiles().count(), 36);
    }

    #[test]
    fn tolerance_square_size() {
        assert_eq!(tiles_with_tolerance(Tile::new(10, 10), 1).count(), 9);
        assert_eq!(tiles_with_tolerance(Tile::new(10, 10), 0).count(), 1);
    }

    #[test]
    fn tile_serializes_as_pair() {
        let json = serde_json::to_string(&Tile::new(3, -4)).unwrap();
        assert_eq!(json, "[3,-4]");
        let back: Tile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Tile::new(3, -4));
    }
}
