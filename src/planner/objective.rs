use crate::catalog::Catalog;
use crate::models::PlanPolicy;
use crate::planner::model::LinearExpr;
use crate::planner::variables::VariableModel;

/// Total cost: servings ordered at unit cost plus one delivery fee per
/// order week.
pub fn assemble_objective(vars: &VariableModel, catalog: &Catalog, policy: &PlanPolicy) -> LinearExpr {
    let mut objective = LinearExpr::with_capacity(vars.weeks() * (catalog.len() + 1));
    for w in 0..vars.weeks() {
        for (id, item) in catalog.iter() {
            objective.add(vars.order(w, id), item.unit_cost);
        }
        objective.add(vars.order_week(w), policy.order.delivery_fee);
    }
    objective
}
