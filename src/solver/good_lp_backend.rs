use good_lp::solvers::{SolutionStatus, WithMipGap, WithTimeLimit};
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    variable,
};

#[cfg(feature = "highs")]
use good_lp::solvers::highs::highs as default_solver;
#[cfg(not(feature = "highs"))]
use good_lp::solvers::microlp::microlp as default_solver;

use crate::error::{PlanError, Result};
use crate::models::SolverPolicy;
use crate::planner::{LinearExpr, MilpModel, Sense, VarDomain};
use crate::solver::backend::{BackendOutcome, LimitReason, MilpBackend};

#[cfg(feature = "highs")]
const BACKEND_NAME: &str = "good_lp/highs";
#[cfg(not(feature = "highs"))]
const BACKEND_NAME: &str = "good_lp/microlp";

/// Backend built on `good_lp`.
///
/// Uses the pure-Rust `microlp` solver by default and HiGHS with the `highs`
/// feature. Both stop at the policy's wall-clock limit or relative gap,
/// whichever comes first. Only HiGHS honours the thread count.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoodLpBackend;

impl GoodLpBackend {
    pub fn new() -> Self {
        Self
    }
}

fn to_expression(expr: &LinearExpr, vars: &[Variable]) -> Expression {
    let mut out = Expression::default();
    for (var, coef) in expr.terms() {
        out += vars[var.index()] * *coef;
    }
    out
}

fn backend_error(message: String) -> PlanError {
    PlanError::Backend {
        backend: BACKEND_NAME.to_string(),
        message,
    }
}

/// Label an assignment by why the solver stopped.
fn classify(status: SolutionStatus, values: Vec<f64>) -> BackendOutcome {
    match status {
        SolutionStatus::Optimal => BackendOutcome::Optimal(values),
        SolutionStatus::TimeLimit => BackendOutcome::Limited {
            reason: LimitReason::TimeLimit,
            values,
        },
        SolutionStatus::GapLimit => BackendOutcome::Limited {
            reason: LimitReason::GapReached,
            values,
        },
    }
}

impl MilpBackend for GoodLpBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn solve(&self, model: &MilpModel, policy: &SolverPolicy) -> Result<BackendOutcome> {
        let mut problem = ProblemVariables::new();
        let vars: Vec<Variable> = model
            .variables
            .declarations()
            .map(|(_, domain)| match domain {
                VarDomain::NonNegativeInteger => problem.add(variable().integer().min(0)),
                VarDomain::Binary => problem.add(variable().binary()),
            })
            .collect();

        let objective = to_expression(&model.objective, &vars);
        let lp = problem
            .minimise(objective)
            .using(default_solver)
            .with_time_limit(policy.time_limit_secs)
            .with_mip_gap(policy.relative_gap as f32)
            .map_err(|e| backend_error(format!("invalid relative gap: {}", e)))?;

        #[cfg(feature = "highs")]
        let lp = match policy.threads {
            Some(threads) => lp.set_threads(threads as u32),
            None => lp,
        };
        if cfg!(not(feature = "highs")) && policy.threads.is_some() {
            tracing::debug!(
                backend = BACKEND_NAME,
                threads = ?policy.threads,
                "single-threaded backend; thread count not applied"
            );
        }

        let mut lp = lp;
        for c in &model.constraints {
            let lhs = to_expression(&c.expr, &vars);
            let row = match c.sense {
                Sense::Le => constraint::leq(lhs, c.rhs),
                Sense::Ge => constraint::geq(lhs, c.rhs),
                Sense::Eq => constraint::eq(lhs, c.rhs),
            };
            lp.add_constraint(row);
        }

        tracing::debug!(
            backend = BACKEND_NAME,
            time_limit_secs = policy.time_limit_secs,
            relative_gap = policy.relative_gap,
            "handing model to solver"
        );

        match lp.solve() {
            Ok(solution) => {
                let values = vars.iter().map(|v| solution.value(*v)).collect();
                Ok(classify(solution.status(), values))
            }
            Err(ResolutionError::Infeasible) => Ok(BackendOutcome::Infeasible),
            Err(ResolutionError::Unbounded) => Err(backend_error("model is unbounded".to_string())),
            // A limit hit before any incumbent surfaces as a generic error.
            Err(e) => Err(backend_error(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_stop_reasons() {
        assert_eq!(
            classify(SolutionStatus::Optimal, vec![1.0]),
            BackendOutcome::Optimal(vec![1.0])
        );
        assert_eq!(
            classify(SolutionStatus::TimeLimit, vec![2.0]),
            BackendOutcome::Limited {
                reason: LimitReason::TimeLimit,
                values: vec![2.0],
            }
        );
        assert_eq!(
            classify(SolutionStatus::GapLimit, vec![3.0]),
            BackendOutcome::Limited {
                reason: LimitReason::GapReached,
                values: vec![3.0],
            }
        );
    }
}
