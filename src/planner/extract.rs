use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::models::{
    CostBreakdown, Nutrient, NutrientVector, OrderLine, PlanPolicy, PlanSolution, WeekCost,
};
use crate::planner::constants::{BINARY_THRESHOLD, FEASIBILITY_TOLERANCE};
use crate::planner::model::MilpModel;
use crate::planner::variables::VarId;
use crate::solver::Assignment;

#[inline]
fn whole(values: &[f64], var: VarId) -> u64 {
    values[var.index()].round().max(0.0) as u64
}

/// Rebuild the weekly schedules from a solver assignment.
///
/// Integer values are rounded to the nearest integer, flags read as set above
/// one half, and zero quantities are left out of every map.
pub fn extract_solution(
    model: &MilpModel,
    catalog: &Catalog,
    policy: &PlanPolicy,
    assignment: &Assignment,
) -> PlanSolution {
    let vars = &model.variables;
    let values = &assignment.values;
    let weeks = vars.weeks();

    let mut order_schedule = Vec::with_capacity(weeks);
    let mut consumption_schedule = Vec::with_capacity(weeks);
    let mut inventory_levels = Vec::with_capacity(weeks);
    let mut order_weeks = Vec::with_capacity(weeks);
    let mut weekly = Vec::with_capacity(weeks);

    for w in 0..weeks {
        let mut orders = BTreeMap::new();
        let mut eaten = BTreeMap::new();
        let mut stock = BTreeMap::new();
        let mut item_spend = 0.0;

        for (id, item) in catalog.iter() {
            let servings = whole(values, vars.order(w, id));
            if servings > 0 {
                orders.insert(
                    id,
                    OrderLine {
                        servings,
                        packages: whole(values, vars.packages(w, id)),
                    },
                );
                item_spend += servings as f64 * item.unit_cost;
            }
            let e = whole(values, vars.eat(w, id));
            if e > 0 {
                eaten.insert(id, e);
            }
            let s = whole(values, vars.inventory(w, id));
            if s > 0 {
                stock.insert(id, s);
            }
        }

        let active = values[vars.order_week(w).index()] > BINARY_THRESHOLD;
        let delivery = if active { policy.order.delivery_fee } else { 0.0 };
        weekly.push(WeekCost {
            items: item_spend,
            delivery,
            total: item_spend + delivery,
        });

        order_schedule.push(orders);
        consumption_schedule.push(eaten);
        inventory_levels.push(stock);
        order_weeks.push(active);
    }

    let total = weekly.iter().map(|w| w.total).sum();
    PlanSolution {
        order_schedule,
        consumption_schedule,
        inventory_levels,
        order_weeks,
        cost_breakdown: CostBreakdown { weekly, total },
        objective: assignment.objective,
    }
}

#[inline]
fn within(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() <= FEASIBILITY_TOLERANCE * expected.abs().max(1.0)
}

/// Re-check an extracted plan against the catalog and policy.
///
/// Returns one message per violated invariant; an empty list means the plan
/// is consistent.
pub fn verify_solution(
    solution: &PlanSolution,
    catalog: &Catalog,
    policy: &PlanPolicy,
) -> Result<Vec<String>> {
    let limits = catalog.weekly_limits(&policy.order)?;
    let mut violations = Vec::new();
    let weeks = solution.weeks();

    if weeks != policy.order.weeks
        || solution.order_schedule.len() != weeks
        || solution.consumption_schedule.len() != weeks
        || solution.inventory_levels.len() != weeks
        || solution.cost_breakdown.weekly.len() != weeks
    {
        violations.push(format!(
            "schedule covers {} weeks, horizon is {}",
            weeks, policy.order.weeks
        ));
        return Ok(violations);
    }

    let mut grand_total = 0.0;
    for w in 0..weeks {
        let mut spend = 0.0;
        let mut any_order = false;
        let mut intake = NutrientVector::default();

        for (id, item) in catalog.iter() {
            let order = solution.ordered(w, id);
            let packages = solution.packages(w, id);
            let eat = solution.eaten(w, id);
            let stock = solution.stocked(w, id);
            let label = |what: &str| format!("week {} {}: {}", w, item.id, what);

            let expected_stock = if w == 0 || item.perishable {
                order as i64
            } else {
                solution.stocked(w - 1, id) as i64 + order as i64
                    - solution.eaten(w - 1, id) as i64
            };
            if stock as i64 != expected_stock {
                violations.push(label(&format!(
                    "inventory {} but balance gives {}",
                    stock, expected_stock
                )));
            }

            if item.perishable && eat != order {
                violations.push(label(&format!(
                    "perishable eaten {} but ordered {}",
                    eat, order
                )));
            }
            if !item.perishable && eat > stock {
                violations.push(label(&format!("eaten {} exceeds stock {}", eat, stock)));
            }

            let limit = limits[id.index()] as u64;
            if eat > limit {
                violations.push(label(&format!("eaten {} exceeds weekly limit {}", eat, limit)));
            }

            let size = item.package_size as u64;
            if order % size != 0 || packages * size != order {
                violations.push(label(&format!(
                    "ordered {} is not {} packages of {}",
                    order, packages, size
                )));
            }

            if order > 0 {
                any_order = true;
                spend += order as f64 * item.unit_cost;
            }
            intake.accumulate(&item.nutrients, eat as f64);
        }

        let active = solution.order_weeks[w];
        if any_order && !active {
            violations.push(format!("week {}: orders placed without an order week", w));
        }
        if active && spend + FEASIBILITY_TOLERANCE < policy.order.min_order_value {
            violations.push(format!(
                "week {}: spend {:.2} below minimum order {:.2}",
                w, spend, policy.order.min_order_value
            ));
        }

        for nutrient in Nutrient::ALL {
            let band = policy.nutrients.get(nutrient);
            let amount = intake.get(nutrient);
            let tol = FEASIBILITY_TOLERANCE * band.max.abs().max(1.0);
            if !band.contains(amount, tol) {
                violations.push(format!(
                    "week {}: {} {:.3} outside [{}, {}]",
                    w,
                    nutrient.key(),
                    amount,
                    band.min,
                    band.max
                ));
            }
        }

        let cost = &solution.cost_breakdown.weekly[w];
        let delivery = if active { policy.order.delivery_fee } else { 0.0 };
        if !within(cost.items, spend) || !within(cost.delivery, delivery) {
            violations.push(format!(
                "week {}: cost {:.2}+{:.2} does not match orders {:.2}+{:.2}",
                w, cost.items, cost.delivery, spend, delivery
            ));
        }
        if !within(cost.total, cost.items + cost.delivery) {
            violations.push(format!("week {}: total {:.2} is not items plus delivery", w, cost.total));
        }
        grand_total += cost.total;
    }

    if !within(solution.cost_breakdown.total, grand_total) {
        violations.push(format!(
            "grand total {:.2} does not equal weekly sum {:.2}",
            solution.cost_breakdown.total, grand_total
        ));
    }

    Ok(violations)
}
