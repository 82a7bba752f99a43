pub mod catalog;
pub mod cli;
pub mod error;
pub mod interface;
pub mod logging;
pub mod models;
pub mod planner;
pub mod report;
pub mod solver;

pub use catalog::Catalog;
pub use error::{PlanError, Result};
pub use models::{Item, ItemId, PlanPolicy, PlanSolution};
pub use planner::PlanningRun;
pub use solver::SolveOutcome;
