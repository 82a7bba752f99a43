use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::{PlanError, Result};
use crate::models::SolverPolicy;
use crate::planner::MilpModel;
use crate::planner::constants::{FEASIBILITY_TOLERANCE, INTEGRALITY_TOLERANCE, PROGRESS_POLL_MS};
use crate::solver::backend::{BackendOutcome, LimitReason, MilpBackend};
use crate::solver::progress::{self, ProgressSink, SilentProgress, StderrBar};

/// Variable values indexed by `VarId`, with the objective they evaluate to.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub values: Vec<f64>,
    pub objective: f64,
}

/// Terminal state of a solve.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Optimal(Assignment),
    FeasibleButNotProven {
        reason: LimitReason,
        assignment: Assignment,
    },
    Infeasible,
}

impl SolveOutcome {
    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            SolveOutcome::Optimal(a) => Some(a),
            SolveOutcome::FeasibleButNotProven { assignment, .. } => Some(assignment),
            SolveOutcome::Infeasible => None,
        }
    }

    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveOutcome::Optimal(_))
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, SolveOutcome::Infeasible)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolveOutcome::Optimal(_) => "optimal",
            SolveOutcome::FeasibleButNotProven { .. } => "feasible (not proven optimal)",
            SolveOutcome::Infeasible => "infeasible",
        }
    }
}

/// Solves one immutable model at most once.
///
/// The first successful call stores the terminal outcome; later calls return
/// the same `Arc` without touching the backend. A backend error leaves the
/// cache empty, so nothing stale is ever returned.
pub struct SolverAdapter {
    model: MilpModel,
    policy: SolverPolicy,
    backend: Box<dyn MilpBackend>,
    cache: Mutex<Option<Arc<SolveOutcome>>>,
    invocations: AtomicUsize,
}

impl SolverAdapter {
    pub fn new(model: MilpModel, policy: SolverPolicy, backend: Box<dyn MilpBackend>) -> Self {
        Self {
            model,
            policy,
            backend,
            cache: Mutex::new(None),
            invocations: AtomicUsize::new(0),
        }
    }

    pub fn model(&self) -> &MilpModel {
        &self.model
    }

    pub fn policy(&self) -> &SolverPolicy {
        &self.policy
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Number of times the backend has been called.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// The stored outcome, if a solve has completed.
    pub fn cached(&self) -> Option<Arc<SolveOutcome>> {
        let guard = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone()
    }

    /// Solve, drawing a progress bar on stderr when the policy asks for one.
    pub fn solve(&self) -> Result<Arc<SolveOutcome>> {
        if self.policy.show_progress {
            self.solve_with(&mut StderrBar)
        } else {
            self.solve_with(&mut SilentProgress)
        }
    }

    pub fn solve_with<S: ProgressSink>(&self, sink: &mut S) -> Result<Arc<SolveOutcome>> {
        let mut cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(outcome) = cache.as_ref() {
            tracing::debug!(status = outcome.as_str(), "returning cached solve outcome");
            return Ok(Arc::clone(outcome));
        }

        self.invocations.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            backend = self.backend.name(),
            variables = self.model.variables.len(),
            constraints = self.model.constraints.len(),
            "solving"
        );

        let started = Instant::now();
        let raw = progress::observe(
            Duration::from_secs_f64(self.policy.time_limit_secs),
            Duration::from_millis(PROGRESS_POLL_MS),
            sink,
            || self.backend.solve(&self.model, &self.policy),
        )?;
        tracing::debug!(backend = self.backend.name(), outcome = raw.as_str(), "backend returned");
        let outcome = Arc::new(self.accept(raw)?);

        tracing::info!(
            backend = self.backend.name(),
            status = outcome.as_str(),
            objective = ?outcome.assignment().map(|a| a.objective),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "solve finished"
        );

        *cache = Some(Arc::clone(&outcome));
        Ok(outcome)
    }

    /// Check a backend assignment against the model before it is cached.
    ///
    /// Optimal and limited assignments pass the same check; one that fails
    /// is a backend error, never a stored outcome.
    fn accept(&self, raw: BackendOutcome) -> Result<SolveOutcome> {
        let (values, reason) = match raw {
            BackendOutcome::Infeasible => return Ok(SolveOutcome::Infeasible),
            BackendOutcome::Optimal(values) => (values, None),
            BackendOutcome::Limited { reason, values } => (values, Some(reason)),
        };

        let assignment = self.assignment(values)?;
        let violations = self
            .model
            .check_assignment(&assignment.values, FEASIBILITY_TOLERANCE);
        if let Some(first) = violations.first() {
            let claim = match reason {
                Some(reason) => format!("{} reached without a feasible incumbent", reason),
                None => "optimal assignment violates the model".to_string(),
            };
            return Err(PlanError::Backend {
                backend: self.backend.name().to_string(),
                message: format!(
                    "{} ({} violation(s), first: {})",
                    claim,
                    violations.len(),
                    first
                ),
            });
        }

        match reason {
            None => Ok(SolveOutcome::Optimal(assignment)),
            Some(reason) => {
                tracing::warn!(reason = %reason, "solver stopped at a limit; plan is not proven optimal");
                Ok(SolveOutcome::FeasibleButNotProven { reason, assignment })
            }
        }
    }

    fn assignment(&self, values: Vec<f64>) -> Result<Assignment> {
        if values.len() != self.model.variables.len() {
            return Err(PlanError::Backend {
                backend: self.backend.name().to_string(),
                message: format!(
                    "returned {} values for {} variables",
                    values.len(),
                    self.model.variables.len()
                ),
            });
        }
        // Every variable is integral; snap solver noise onto the grid.
        let values: Vec<f64> = values
            .into_iter()
            .map(|v| {
                let nearest = v.round();
                if (v - nearest).abs() <= INTEGRALITY_TOLERANCE { nearest } else { v }
            })
            .collect();
        let objective = self.model.objective.evaluate(&values);
        Ok(Assignment { values, objective })
    }
}
