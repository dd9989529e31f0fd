//! Path reuse across ticks so the drawn path does not flicker.

use log::trace;
use std::cmp::Reverse;

use crate::constants::REJOIN_DISTANCE;
use crate::cost::{Cost, CostModel};
use crate::geometry::Tile;
use crate::search::{BoundedAStarSearch, PathResult, SearchRequest};

/// The path most recently produced for the segment the vessel is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePathState {
    pub path: Vec<Tile>,
    pub start: Tile,
    pub goal: Tile,
    pub tolerance: u32,
    pub hazard_fingerprint: u64,
    pub reached_goal: bool,
}

impl ActivePathState {
    fn matches_target(&self, request: &SearchRequest) -> bool {
        self.goal == request.goal && self.tolerance == request.tolerance
    }

    /// Index of the path tile closest to `at`, furthest along on ties, if
    /// within rejoin range.
    fn rejoin_index(&self, at: Tile) -> Option<usize> {
        let (index, distance) = self
            .path
            .iter()
            .enumerate()
            .map(|(i, tile)| (i, tile.chebyshev(at)))
            .max_by_key(|&(i, distance)| (Reverse(distance), i))?;
        (distance <= REJOIN_DISTANCE).then_some(index)
    }
}

/// Wraps [`BoundedAStarSearch`] and hands back the remainder of the previous
/// path while the goal and the hazards are unchanged.
#[derive(Debug, Clone, Default)]
pub struct PathStabilizer {
    search: BoundedAStarSearch,
    active: Option<ActivePathState>,
}

impl PathStabilizer {
    #[must_use]
    pub const fn new(search: BoundedAStarSearch) -> Self {
        Self {
            search,
            active: None,
        }
    }

    #[must_use]
    pub const fn active_path(&self) -> Option<&ActivePathState> {
        self.active.as_ref()
    }

    /// Forget the cached path; the next call searches from scratch.
    pub fn clear_active_path(&mut self) {
        self.active = None;
    }

    /// Find a path for `request`.
    ///
    /// Only searches flagged `on_active_segment` read or replace the cached
    /// state. Other segments always get a fresh search.
    pub fn find_path<C: CostModel + ?Sized>(
        &mut self,
        costs: &C,
        hazard_fingerprint: u64,
        request: &SearchRequest,
        on_active_segment: bool,
    ) -> PathResult {
        if !on_active_segment {
            return self.search.find_path(costs, request);
        }
        if let Some(reused) = self.try_reuse(costs, hazard_fingerprint, request) {
            trace!(
                "reusing cached path to {} ({} tiles left)",
                request.goal,
                reused.path.len()
            );
            return reused;
        }

        let fresh = self.search.find_path(costs, request);
        self.active = Some(ActivePathState {
            path: fresh.path.clone(),
            start: request.start,
            goal: request.goal,
            tolerance: request.tolerance,
            hazard_fingerprint,
            reached_goal: fresh.reached_goal,
        });
        fresh
    }

    fn try_reuse<C: CostModel + ?Sized>(
        &self,
        costs: &C,
        hazard_fingerprint: u64,
        request: &SearchRequest,
    ) -> Option<PathResult> {
        let active = self.active.as_ref()?;
        if !active.reached_goal
            || !active.matches_target(request)
            || active.hazard_fingerprint != hazard_fingerprint
        {
            return None;
        }
        let index = active.rejoin_index(request.start)?;
        let mut path = Vec::with_capacity(active.path.len() - index + 1);
        if active.path[index] != request.start {
            path.push(request.start);
        }
        path.extend_from_slice(&active.path[index..]);

        let mut cost = 0_u64;
        for tile in path.iter().skip(1) {
            match costs.cost(*tile) {
                Cost::Blocked => return None,
                Cost::Finite(step) => cost += u64::from(step),
            }
        }
        Some(PathResult {
            path,
            cost,
            reached_goal: true,
        })
    }
}
