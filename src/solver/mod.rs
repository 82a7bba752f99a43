mod adapter;
mod backend;
mod good_lp_backend;
pub mod progress;

pub use adapter::{Assignment, SolveOutcome, SolverAdapter};
pub use backend::{BackendOutcome, LimitReason, MilpBackend};
pub use good_lp_backend::GoodLpBackend;
pub use progress::{ProgressSink, SilentProgress, StderrBar};
