use std::fmt;

use crate::error::Result;
use crate::models::SolverPolicy;
use crate::planner::MilpModel;

/// Why a backend stopped before proving optimality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitReason {
    TimeLimit,
    GapReached,
}

impl LimitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            LimitReason::TimeLimit => "time_limit",
            LimitReason::GapReached => "gap_reached",
        }
    }
}

impl fmt::Display for LimitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw terminal result of one backend call.
///
/// Value vectors are indexed by `VarId` and cover every model variable.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutcome {
    Optimal(Vec<f64>),
    Limited { reason: LimitReason, values: Vec<f64> },
    Infeasible,
}

impl BackendOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendOutcome::Optimal(_) => "optimal",
            BackendOutcome::Limited { .. } => "limited",
            BackendOutcome::Infeasible => "infeasible",
        }
    }
}

/// A MILP solver that minimizes a model snapshot under a policy.
///
/// Implementations must not keep state between calls; the adapter relies on
/// a backend being a function of `(model, policy)`.
pub trait MilpBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Solve the model.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::Backend` when the solver itself fails. Proven
    /// infeasibility is an outcome, not an error.
    fn solve(&self, model: &MilpModel, policy: &SolverPolicy) -> Result<BackendOutcome>;
}
