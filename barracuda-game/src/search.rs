//! Bounded A* over the 8-connected tile grid.
//!
//! The search always returns a path. When the goal cannot be reached within
//! the expansion budget it returns the best partial path it found and flags
//! the result as not having reached the goal.

use log::{debug, trace};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::constants::{SEARCH_EXPANSIONS_PER_TILE, SEARCH_MAX_EXPANSIONS, SEARCH_MIN_EXPANSIONS};
use crate::cost::{Cost, CostModel};
use crate::geometry::{Heading, NEIGHBOR_OFFSETS, Tile};

/// Expansion budget for a search between two tiles: grows with distance,
/// clamped to `[35, 80]`.
#[must_use]
pub fn expansion_budget(start: Tile, goal: Tile) -> usize {
    let distance = usize::try_from(start.chebyshev(goal)).unwrap_or(usize::MAX);
    distance
        .saturating_mul(SEARCH_EXPANSIONS_PER_TILE)
        .clamp(SEARCH_MIN_EXPANSIONS, SEARCH_MAX_EXPANSIONS)
}

/// One search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRequest {
    pub start: Tile,
    pub goal: Tile,
    /// Any tile within this Chebyshev distance of `goal` satisfies the search.
    pub tolerance: u32,
    /// Direction the vessel is already travelling; breaks ties between
    /// equally cheap first steps.
    pub heading: Heading,
}

impl SearchRequest {
    #[must_use]
    pub const fn new(start: Tile, goal: Tile, tolerance: u32) -> Self {
        Self {
            start,
            goal,
            tolerance,
            heading: Heading::NONE,
        }
    }

    #[must_use]
    pub const fn with_heading(mut self, heading: Heading) -> Self {
        self.heading = heading;
        self
    }
}

/// Outcome of a search. `path` always begins at the start tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    pub path: Vec<Tile>,
    /// Sum of the entered tiles' costs; the start tile is free.
    pub cost: u64,
    pub reached_goal: bool,
}

impl PathResult {
    #[must_use]
    pub fn stationary(at: Tile, reached_goal: bool) -> Self {
        Self {
            path: vec![at],
            cost: 0,
            reached_goal,
        }
    }

    #[must_use]
    pub fn last_tile(&self) -> Option<Tile> {
        self.path.last().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    tile: Tile,
    g: u64,
    f: u64,
    h: u64,
    turn: u8,
    preference: u32,
    seq: u64,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the cheapest node first.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.turn.cmp(&self.turn))
            .then_with(|| other.preference.cmp(&self.preference))
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Stateless bounded A* search.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedAStarSearch;

impl BoundedAStarSearch {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Search from `request.start` toward `request.goal`.
    ///
    /// The start tile is expanded even when the cost model blocks it, so a
    /// vessel brushing a hazard can still steer away.
    pub fn find_path<C: CostModel + ?Sized>(&self, costs: &C, request: &SearchRequest) -> PathResult {
        let SearchRequest {
            start,
            goal,
            tolerance,
            heading,
        } = *request;
        let budget = expansion_budget(start, goal);
        let unit = u64::from(costs.min_step_cost().max(1));
        let heuristic = |tile: Tile| u64::from(tile.chebyshev(goal)) * unit;

        trace!("search {start} -> {goal} (tolerance {tolerance}, budget {budget})");

        let mut open = BinaryHeap::new();
        let mut closed: HashSet<Tile> = HashSet::new();
        let mut came_from: HashMap<Tile, Tile> = HashMap::new();
        let mut g_scores: HashMap<Tile, u64> = HashMap::new();
        let mut approach: HashMap<Tile, Heading> = HashMap::new();
        let mut seq = 0_u64;
        let mut expanded = 0_usize;
        // Closest node to the goal popped so far (least h, then least g). A
        // search that runs dry or out of budget ends there, so repeated partial
        // searches never drift away from the goal.
        let mut nearest = (heuristic(start), 0_u64, start);

        open.push(OpenNode {
            tile: start,
            g: 0,
            f: heuristic(start),
            h: heuristic(start),
            turn: 0,
            preference: 0,
            seq,
        });
        g_scores.insert(start, 0);
        approach.insert(start, heading);

        while let Some(current) = open.pop() {
            if closed.contains(&current.tile) {
                continue;
            }
            if current.tile.chebyshev(goal) <= tolerance {
                debug!(
                    "search reached {} after {expanded} expansions (cost {})",
                    current.tile, current.g
                );
                return finish(&came_from, current.tile, current.g, true);
            }
            if (current.h, current.g) < (nearest.0, nearest.1) {
                nearest = (current.h, current.g, current.tile);
            }
            if expanded >= budget {
                let (_, g, tile) = nearest;
                debug!(
                    "search budget {budget} exhausted; closest tile {tile} is {} from goal",
                    tile.chebyshev(goal)
                );
                return finish(&came_from, tile, g, false);
            }
            closed.insert(current.tile);
            expanded += 1;

            let reference = approach.get(&current.tile).copied().unwrap_or(Heading::NONE);
            for (dx, dy) in NEIGHBOR_OFFSETS {
                let next = current.tile.offset(dx, dy);
                if closed.contains(&next) {
                    continue;
                }
                let Cost::Finite(step) = costs.cost(next) else {
                    continue;
                };
                let tentative = current.g + u64::from(step);
                if g_scores.get(&next).is_some_and(|&known| known <= tentative) {
                    continue;
                }
                let step_heading = Heading::new(dx, dy);
                g_scores.insert(next, tentative);
                came_from.insert(next, current.tile);
                approach.insert(next, step_heading);
                seq += 1;
                let h = heuristic(next);
                open.push(OpenNode {
                    tile: next,
                    g: tentative,
                    f: tentative + h,
                    h,
                    turn: step_heading.turn_steps(reference),
                    preference: costs.preference(next),
                    seq,
                });
            }
        }

        let (_, g, tile) = nearest;
        debug!("search from {start} ran out of reachable tiles; stopping at {tile}");
        finish(&came_from, tile, g, false)
    }
}

fn finish(came_from: &HashMap<Tile, Tile>, end: Tile, cost: u64, reached_goal: bool) -> PathResult {
    let mut path = vec![end];
    let mut cursor = end;
    while let Some(&previous) = came_from.get(&cursor) {
        path.push(previous);
        cursor = previous;
    }
    path.reverse();
    PathResult {
        path,
        cost,
        reached_goal,
    }
}
