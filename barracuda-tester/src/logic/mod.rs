pub mod assets;
pub mod reports;
pub mod simulation;
pub mod tester;
pub mod world;

pub use assets::{FileRoutes, TesterAssets};
pub use simulation::Simulator;
pub use tester::*;
