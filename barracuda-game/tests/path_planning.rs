use barracuda_game::{
    BoundedAStarSearch, Cost, CostModel, Difficulty, HazardSnapshot, NavigatorConfig,
    ObjectiveEvent, PathPlanner, RecomputeReason, RouteCatalog, RouteOptimization,
    RouteProgressTracker, SearchRequest, TextSignal, TickInput, Tile, TileCostCalculator,
    TileRect, TrialKind, TrialNavigator, VesselFootprint, VesselPose, Waypoint, WaypointKind,
    tiles_with_tolerance,
};

fn sea(size: i32, footprint: VesselFootprint) -> HazardSnapshot {
    HazardSnapshot::open_water(
        TileRect::new(Tile::new(0, 0), Tile::new(size, size)),
        footprint,
    )
}

fn mote(x: i32, y: i32) -> Waypoint {
    Waypoint::new(WaypointKind::CrystalMote, 1, Tile::new(x, y)).with_tolerance(0)
}

fn catcher(x: i32, y: i32) -> Waypoint {
    Waypoint::new(WaypointKind::WindCatcher, 1, Tile::new(x, y))
}

fn assert_walkable(path: &[Tile], costs: &impl CostModel) {
    for tile in path.iter().skip(1) {
        assert_ne!(costs.cost(*tile), Cost::Blocked, "path crosses blocked tile {tile}");
    }
}

fn glide_tracker(waypoints: Vec<Waypoint>) -> RouteProgressTracker {
    let catalog =
        RouteCatalog::empty().with_route(TrialKind::GwenithGlide, Difficulty::Swordfish, waypoints);
    let mut tracker = RouteProgressTracker::new(catalog);
    tracker.on_trial_entered(TrialKind::GwenithGlide, Difficulty::Swordfish);
    tracker
}

#[test]
fn search_from_goal_is_a_single_free_tile() {
    let hazards = sea(20, VesselFootprint::new(3, 2));
    let costs = TileCostCalculator::new(&hazards, RouteOptimization::Relaxed);
    let at = Tile::new(7, 7);
    let result = BoundedAStarSearch::new().find_path(&costs, &SearchRequest::new(at, at, 0));
    assert_eq!(result.path, vec![at]);
    assert_eq!(result.cost, 0);
    assert!(result.reached_goal);
}

#[test]
fn enclosed_goal_returns_partial_path_within_budget() {
    let goal = Tile::new(20, 20);
    let walls = tiles_with_tolerance(goal, 3).filter(|t| t.chebyshev(goal) == 3);
    let hazards = sea(40, VesselFootprint::new(3, 2)).with_rocks(walls);
    let costs = TileCostCalculator::new(&hazards, RouteOptimization::Relaxed);
    let start = Tile::new(5, 20);

    let result = BoundedAStarSearch::new().find_path(&costs, &SearchRequest::new(start, goal, 0));
    assert!(!result.reached_goal);
    assert_eq!(result.path.first(), Some(&start));
    assert!(result.path.len() <= 81);
    assert_walkable(&result.path, &costs);
}

#[test]
fn footprint_blocks_tiles_next_to_obstacle() {
    // Rock one tile off the centreline; a 3x2 hull centred on the centreline
    // still touches it.
    let rock = Tile::new(10, 11);
    let hazards = sea(30, VesselFootprint::new(3, 2)).with_rocks([rock]);
    let costs = TileCostCalculator::new(&hazards, RouteOptimization::Relaxed);
    assert_eq!(costs.cost(Tile::new(10, 10)), Cost::Blocked);
    assert_eq!(costs.cost(Tile::new(9, 10)), Cost::Blocked);
    assert_eq!(costs.cost(Tile::new(10, 13)), Cost::Finite(100));

    let request = SearchRequest::new(Tile::new(4, 10), Tile::new(16, 10), 0);
    let result = BoundedAStarSearch::new().find_path(&costs, &request);
    assert!(result.reached_goal);
    assert!(!result.path.contains(&Tile::new(10, 10)));
    assert_walkable(&result.path, &costs);
}

#[test]
fn wind_catcher_branch_wins_when_direct_route_fails() {
    // A wall splits the sea; only the wind carries the vessel across.
    let wall = (0..=40).map(|y| Tile::new(20, y));
    let hazards = sea(40, VesselFootprint::new(3, 2)).with_rocks(wall);
    let mut tracker = glide_tracker(vec![
        mote(14, 10),
        catcher(18, 10),
        catcher(22, 10),
        mote(26, 10),
    ]);
    tracker.on_objective_event(ObjectiveEvent::Disappearance {
        location: Tile::new(14, 10),
    });

    let mut planner = PathPlanner::default();
    let outcome = planner.plan(
        tracker.context().unwrap(),
        VesselPose::at(Tile::new(14, 10)),
        &hazards,
    );
    assert!(outcome.reached_goal);
    assert!(outcome.path.contains(&Tile::new(18, 10)));
    assert!(outcome.path.contains(&Tile::new(22, 10)));
    assert_eq!(outcome.path.last(), Some(&Tile::new(26, 10)));
}

#[test]
fn direct_route_wins_when_branch_is_a_detour() {
    let hazards = sea(40, VesselFootprint::new(3, 2));
    let mut tracker = glide_tracker(vec![
        mote(5, 5),
        catcher(5, 30),
        catcher(12, 30),
        mote(12, 5),
    ]);
    tracker.on_objective_event(ObjectiveEvent::Disappearance {
        location: Tile::new(5, 5),
    });

    let mut planner = PathPlanner::default();
    let outcome = planner.plan(
        tracker.context().unwrap(),
        VesselPose::at(Tile::new(5, 5)),
        &hazards,
    );
    assert!(outcome.reached_goal);
    assert!(!outcome.path.contains(&Tile::new(5, 30)));
    assert_eq!(outcome.path.last(), Some(&Tile::new(12, 5)));
    assert_eq!(outcome.path.len(), 8);
}

#[test]
fn navigator_recompute_is_idempotent() {
    let catalog = RouteCatalog::empty().with_route(
        TrialKind::GwenithGlide,
        Difficulty::Swordfish,
        vec![mote(12, 4), mote(18, 14), mote(6, 16)],
    );
    let hazards = sea(24, VesselFootprint::new(3, 2)).with_rocks([Tile::new(9, 4), Tile::new(9, 5)]);
    let config = NavigatorConfig {
        recalc_interval_ticks: 1,
        ..NavigatorConfig::default()
    };
    let mut nav = TrialNavigator::new(catalog, config).unwrap();
    nav.tick(TickInput {
        pose: Some(VesselPose::at(Tile::new(2, 4))),
        hazards: Some(hazards.clone()),
    });
    nav.enter_trial(TrialKind::GwenithGlide, Difficulty::Swordfish);
    let first = nav.view();
    assert!(first.reached_goal);
    assert_eq!(first.path.last(), Some(&Tile::new(6, 16)));

    for _ in 0..3 {
        nav.tick(TickInput {
            pose: Some(VesselPose::at(Tile::new(2, 4))),
            hazards: Some(hazards.clone()),
        });
        let view = nav.view();
        assert_eq!(view.path, first.path);
        assert_eq!(view.last_recompute_reason, Some(RecomputeReason::Periodic));
    }
}

#[test]
fn portal_traversal_drops_the_old_path() {
    let catalog = RouteCatalog::empty().with_route(
        TrialKind::GwenithGlide,
        Difficulty::Shark,
        vec![
            Waypoint::new(WaypointKind::PortalEntry, 1, Tile::new(8, 4)).with_tolerance(0),
            Waypoint::new(WaypointKind::PortalExit, 1, Tile::new(30, 30)),
            mote(34, 30),
        ],
    );
    let hazards = sea(40, VesselFootprint::new(3, 2));
    let mut nav = TrialNavigator::new(catalog, NavigatorConfig::default()).unwrap();
    nav.tick(TickInput {
        pose: Some(VesselPose::at(Tile::new(2, 4))),
        hazards: Some(hazards),
    });
    nav.enter_trial(TrialKind::GwenithGlide, Difficulty::Shark);
    assert_eq!(nav.view().path.last(), Some(&Tile::new(8, 4)));

    // The environment teleports the vessel before the signal arrives.
    nav.tick(TickInput {
        pose: Some(VesselPose::at(Tile::new(30, 30))),
        hazards: None,
    });
    let change = nav.ingest(ObjectiveEvent::Text {
        signal: TextSignal::PortalTraversed,
    });
    assert!(change.reset_path);
    let view = nav.view();
    assert_eq!(view.path.first(), Some(&Tile::new(30, 30)));
    assert_eq!(view.path.last(), Some(&Tile::new(34, 30)));
    assert!(nav.planner().stabilizer().active_path().is_some());
}

#[test]
fn partial_searches_never_drift_from_the_goal() {
    // A boost far from the route lowers the heuristic floor so every search
    // runs out of budget long before the goal.
    let mut hazards = sea(60, VesselFootprint::new(3, 2))
        .with_rocks((0..=60).map(|y| Tile::new(30, y)));
    hazards.add_speed_boost_object(Tile::new(48, 26));
    let costs = TileCostCalculator::new(&hazards, RouteOptimization::Efficient);
    let goal = Tile::new(20, 10);
    let mut from = Tile::new(5, 10);
    let mut reached = false;

    for _ in 0..15 {
        let result =
            BoundedAStarSearch::new().find_path(&costs, &SearchRequest::new(from, goal, 7));
        assert_walkable(&result.path, &costs);
        let end = result.path.last().copied().unwrap();
        assert!(
            end.chebyshev(goal) <= from.chebyshev(goal),
            "partial path from {from} ended at {end}, further from {goal}"
        );
        if result.reached_goal {
            reached = true;
            break;
        }
        assert!(end.chebyshev(goal) < from.chebyshev(goal), "no progress from {from}");
        from = end;
    }
    assert!(reached, "stalled at {from}");
}
