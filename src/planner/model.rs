use std::fmt;

use rayon::prelude::*;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::models::PlanPolicy;
use crate::planner::constants::INTEGRALITY_TOLERANCE;
use crate::planner::constraints::ConstraintBuilder;
use crate::planner::objective::assemble_objective;
use crate::planner::variables::{VarDomain, VarId, VariableModel};

/// Sparse linear expression `Σ coef · var`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            terms: Vec::with_capacity(n),
        }
    }

    /// Append a term. Zero coefficients are kept so every constraint names
    /// the variables it ranges over.
    pub fn add(&mut self, var: VarId, coef: f64) -> &mut Self {
        self.terms.push((var, coef));
        self
    }

    pub fn term(mut self, var: VarId, coef: f64) -> Self {
        self.terms.push((var, coef));
        self
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coef)| coef * values[var.index()])
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sense::Le => "<=",
            Sense::Ge => ">=",
            Sense::Eq => "=",
        })
    }
}

/// Independent families of constraints. Each reads only the variable layout
/// and catalog constants, so groups can be built in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintGroup {
    InventoryBalance,
    NutrientBands,
    OrderThreshold,
    ServingCaps,
    PerishableConsumption,
    PackageMultiples,
    StockAvailability,
}

impl ConstraintGroup {
    /// Fixed emission order.
    pub const ALL: [ConstraintGroup; 7] = [
        ConstraintGroup::InventoryBalance,
        ConstraintGroup::NutrientBands,
        ConstraintGroup::OrderThreshold,
        ConstraintGroup::ServingCaps,
        ConstraintGroup::PerishableConsumption,
        ConstraintGroup::PackageMultiples,
        ConstraintGroup::StockAvailability,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ConstraintGroup::InventoryBalance => "inventory_balance",
            ConstraintGroup::NutrientBands => "nutrient_band",
            ConstraintGroup::OrderThreshold => "order_threshold",
            ConstraintGroup::ServingCaps => "serving_cap",
            ConstraintGroup::PerishableConsumption => "perishable_consumption",
            ConstraintGroup::PackageMultiples => "package_multiple",
            ConstraintGroup::StockAvailability => "stock_availability",
        }
    }
}

/// `expr sense rhs`, with every variable on the left.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub group: ConstraintGroup,
    pub name: String,
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Amount by which `values` violate this constraint (0 when satisfied).
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::Le => (lhs - self.rhs).max(0.0),
            Sense::Ge => (self.rhs - lhs).max(0.0),
            Sense::Eq => (lhs - self.rhs).abs(),
        }
    }

    /// Satisfied within `tolerance`, scaled by the right-hand side magnitude.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        self.violation(values) <= tolerance * self.rhs.abs().max(1.0)
    }
}

/// Immutable MILP snapshot: variable layout, objective and constraints.
#[derive(Debug, Clone)]
pub struct MilpModel {
    pub variables: VariableModel,
    pub objective: LinearExpr,
    pub constraints: Vec<LinearConstraint>,
}

impl MilpModel {
    /// Validate inputs, declare variables, build every constraint group and
    /// assemble the objective.
    ///
    /// All configuration errors surface here, before anything reaches a
    /// solver.
    pub fn build(catalog: &Catalog, policy: &PlanPolicy) -> Result<Self> {
        policy.validate()?;
        let weekly_limits = catalog.weekly_limits(&policy.order)?;
        let variables = VariableModel::new(policy.order.weeks, catalog.len())?;

        let builder = ConstraintBuilder::new(&variables, catalog, policy, &weekly_limits);
        let groups: Vec<Vec<LinearConstraint>> = ConstraintGroup::ALL
            .as_slice()
            .par_iter()
            .map(|group| builder.build_group(*group))
            .collect();

        for (group, built) in ConstraintGroup::ALL.iter().zip(&groups) {
            tracing::debug!(group = group.key(), constraints = built.len(), "built constraint group");
        }

        let constraints: Vec<LinearConstraint> = groups.into_iter().flatten().collect();
        let objective = assemble_objective(&variables, catalog, policy);

        tracing::info!(
            weeks = variables.weeks(),
            items = variables.items(),
            variables = variables.len(),
            constraints = constraints.len(),
            "built procurement model"
        );

        Ok(Self {
            variables,
            objective,
            constraints,
        })
    }

    pub fn constraints_in(&self, group: ConstraintGroup) -> impl Iterator<Item = &LinearConstraint> {
        self.constraints.iter().filter(move |c| c.group == group)
    }

    /// Every domain and constraint violation of a full assignment.
    pub fn check_assignment(&self, values: &[f64], tolerance: f64) -> Vec<String> {
        let mut violations = Vec::new();

        if values.len() != self.variables.len() {
            violations.push(format!(
                "assignment has {} values, model has {} variables",
                values.len(),
                self.variables.len()
            ));
            return violations;
        }

        for (var, domain) in self.variables.declarations() {
            let value = values[var.index()];
            let off_grid = (value - value.round()).abs() > INTEGRALITY_TOLERANCE;
            let out_of_range = match domain {
                VarDomain::NonNegativeInteger => value < -INTEGRALITY_TOLERANCE,
                VarDomain::Binary => {
                    value < -INTEGRALITY_TOLERANCE || value > 1.0 + INTEGRALITY_TOLERANCE
                }
            };
            if !value.is_finite() || off_grid || out_of_range {
                violations.push(format!(
                    "{} = {} outside its {:?} domain",
                    self.variables.name(var),
                    value,
                    domain
                ));
            }
        }

        for constraint in &self.constraints {
            if !constraint.is_satisfied(values, tolerance) {
                violations.push(format!(
                    "{}: {:.6} {} {} violated by {:.6}",
                    constraint.name,
                    constraint.expr.evaluate(values),
                    constraint.sense,
                    constraint.rhs,
                    constraint.violation(values)
                ));
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_evaluate() {
        let expr = LinearExpr::new().term(VarId(0), 2.0).term(VarId(2), -1.5);
        assert!((expr.evaluate(&[3.0, 100.0, 2.0]) - 3.0).abs() < 1e-12);
        assert_eq!(expr.len(), 2);
    }

    #[test]
    fn test_constraint_violation() {
        let c = LinearConstraint {
            group: ConstraintGroup::ServingCaps,
            name: "serving_cap[0,0]".to_string(),
            expr: LinearExpr::new().term(VarId(0), 1.0),
            sense: Sense::Le,
            rhs: 14.0,
        };
        assert!(c.is_satisfied(&[14.0], 1e-6));
        assert!(!c.is_satisfied(&[15.0], 1e-6));
        assert!((c.violation(&[15.0]) - 1.0).abs() < 1e-12);

        let eq = LinearConstraint {
            sense: Sense::Eq,
            rhs: 0.0,
            ..c
        };
        assert!((eq.violation(&[-2.0]) - 2.0).abs() < 1e-12);
    }
}
