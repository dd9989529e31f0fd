use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use super::{Difficulty, Route, TrialKind, Waypoint};

/// Trait for abstracting where route tables come from.
/// Platform layers provide this (embedded asset, file, editor export).
pub trait RouteSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the full route catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the route data cannot be read or parsed.
    fn load_routes(&self) -> Result<RouteCatalog, Self::Error>;
}

/// Errors raised while loading or validating route data.
#[derive(Debug, Error)]
pub enum RouteDataError {
    #[error("route catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{kind}/{difficulty} waypoint {index}: lap must be at least 1")]
    ZeroLap {
        kind: &'static str,
        difficulty: &'static str,
        index: usize,
    },
    #[error("{kind}/{difficulty} waypoint {index}: helper waypoints cannot carry a tolerance")]
    HelperTolerance {
        kind: &'static str,
        difficulty: &'static str,
        index: usize,
    },
    #[error("{kind}/{difficulty} waypoint {index}: {waypoint_kind:?} does not take object ids")]
    UnexpectedObjectIds {
        kind: &'static str,
        difficulty: &'static str,
        index: usize,
        waypoint_kind: super::WaypointKind,
    },
}

/// Route tables keyed by trial kind then difficulty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteCatalog {
    routes: HashMap<TrialKind, HashMap<Difficulty, Vec<Waypoint>>>,
}

impl RouteCatalog {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse and validate a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns `RouteDataError` if the JSON is malformed or any waypoint
    /// violates the route invariants.
    pub fn from_json(json: &str) -> Result<Self, RouteDataError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Insert (or replace) the route for a pair.
    pub fn insert(&mut self, kind: TrialKind, difficulty: Difficulty, waypoints: Vec<Waypoint>) {
        self.routes
            .entry(kind)
            .or_default()
            .insert(difficulty, waypoints);
    }

    #[must_use]
    pub fn with_route(
        mut self,
        kind: TrialKind,
        difficulty: Difficulty,
        waypoints: Vec<Waypoint>,
    ) -> Self {
        self.insert(kind, difficulty, waypoints);
        self
    }

    /// Route for a pair, or `None` when no non-empty route is defined.
    #[must_use]
    pub fn route(&self, kind: TrialKind, difficulty: Difficulty) -> Option<Route> {
        let waypoints = self.routes.get(&kind)?.get(&difficulty)?;
        if waypoints.is_empty() {
            return None;
        }
        Some(Route::new(kind, difficulty, waypoints.clone()))
    }

    /// Validate every route against the waypoint invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), RouteDataError> {
        for (kind, tiers) in &self.routes {
            for (difficulty, waypoints) in tiers {
                for (index, waypoint) in waypoints.iter().enumerate() {
                    validate_waypoint(*kind, *difficulty, index, waypoint)?;
                }
            }
        }
        Ok(())
    }
}

fn validate_waypoint(
    kind: TrialKind,
    difficulty: Difficulty,
    index: usize,
    waypoint: &Waypoint,
) -> Result<(), RouteDataError> {
    let kind_label = kind.label();
    let difficulty_label = difficulty.label();
    if waypoint.lap == 0 {
        return Err(RouteDataError::ZeroLap {
            kind: kind_label,
            difficulty: difficulty_label,
            index,
        });
    }
    if waypoint.kind.is_helper() && waypoint.tolerance.is_some_and(|t| t != 0) {
        return Err(RouteDataError::HelperTolerance {
            kind: kind_label,
            difficulty: difficulty_label,
            index,
        });
    }
    if !waypoint.object_ids.is_empty() && !waypoint.kind.takes_object_ids() {
        return Err(RouteDataError::UnexpectedObjectIds {
            kind: kind_label,
            difficulty: difficulty_label,
            index,
            waypoint_kind: waypoint.kind,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Tile;
    use crate::route::WaypointKind;

    #[test]
    fn catalog_parses_compact_json() {
        let json = r#"{
            "jubbly_jive": {
                "shark": [
                    { "kind": "toad_pickup", "location": [10, 12] },
                    { "kind": "toad_pillar", "lap": 1, "location": [30, 40], "object_ids": [5001, 5002] },
                    { "kind": "shipment", "lap": 2, "location": [5, 5], "fallbacks": [[6, 6]] }
                ]
            }
        }"#;

        let catalog = RouteCatalog::from_json(json).unwrap();
        let route = catalog
            .route(TrialKind::JubblyJive, Difficulty::Shark)
            .expect("route present");
        assert_eq!(route.len(), 3);
        assert_eq!(route.waypoints()[0].lap, 1);
        assert!(route.waypoints()[1].matches_object(5002));
        assert_eq!(route.waypoints()[2].fallbacks.as_slice(), &[Tile::new(6, 6)]);
        assert!(catalog.route(TrialKind::JubblyJive, Difficulty::Marlin).is_none());
    }

    #[test]
    fn catalog_rejects_zero_lap() {
        let json = r#"{ "gwenith_glide": { "swordfish": [ { "kind": "crystal_mote", "lap": 0, "location": [0, 0] } ] } }"#;
        let err = RouteCatalog::from_json(json).unwrap_err();
        assert!(matches!(err, RouteDataError::ZeroLap { index: 0, .. }));
    }

    #[test]
    fn catalog_rejects_ids_on_plain_kinds() {
        let catalog = RouteCatalog::empty().with_route(
            TrialKind::TemporTantrum,
            Difficulty::Swordfish,
            vec![Waypoint::new(WaypointKind::RumPickup, 1, Tile::new(0, 0)).with_object_ids([7])],
        );
        assert!(matches!(
            catalog.validate(),
            Err(RouteDataError::UnexpectedObjectIds { .. })
        ));
    }

    #[test]
    fn empty_route_counts_as_missing() {
        let catalog =
            RouteCatalog::empty().with_route(TrialKind::GwenithGlide, Difficulty::Shark, Vec::new());
        assert!(catalog.route(TrialKind::GwenithGlide, Difficulty::Shark).is_none());
    }
}
