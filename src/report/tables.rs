use chrono::NaiveDate;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::models::{Nutrient, NutrientBands, NutrientVector, PlanPolicy, PlanSolution};
use crate::planner::constants::FEASIBILITY_TOLERANCE;
use crate::report::waste::WasteLedger;

/// One (week, item) line of the detailed schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRow {
    pub week: usize,
    pub date: NaiveDate,
    pub item: String,
    pub ordered: u64,
    pub packages: u64,
    pub eaten: u64,
    /// Stock carried into the next week, as in the action plan. Always 0 in
    /// the final week, whose leftover is waste.
    pub remaining: u64,
    pub perishable: bool,
    pub unit_cost: f64,
    pub final_week_waste: u64,
}

/// `(item, servings)` pairs for one column of the action plan.
pub type ItemQuantities = Vec<(String, u64)>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderEntry {
    pub item: String,
    pub servings: u64,
    pub packages: u64,
}

/// What to order and eat in one week that has any activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRow {
    pub week: usize,
    pub date: NaiveDate,
    pub orders: Vec<OrderEntry>,
    pub consumption: ItemQuantities,
    /// Stock carried into the next week.
    pub remaining: ItemQuantities,
    pub waste: ItemQuantities,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRow {
    pub week: usize,
    pub date: NaiveDate,
    pub items: f64,
    pub delivery: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientRow {
    pub week: usize,
    pub date: NaiveDate,
    pub intake: NutrientVector,
    pub in_band: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeRow {
    pub week: usize,
    pub date: NaiveDate,
    pub ordered_perishable: u64,
    pub ordered_non_perishable: u64,
    pub eaten: u64,
    pub wasted: u64,
    pub waste_cost: f64,
}

/// Every human-facing view of a solved plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    pub schedule: Vec<ScheduleRow>,
    pub actions: Vec<ActionRow>,
    pub costs: Vec<CostRow>,
    pub nutrients: Vec<NutrientRow>,
    pub bands: NutrientBands,
    pub waste: WasteLedger,
    /// Waste totals per item: `(name, servings, cost)`.
    pub waste_by_item: Vec<(String, u64, f64)>,
    pub volume: Vec<VolumeRow>,
    pub item_total: f64,
    pub delivery_total: f64,
    pub total_cost: f64,
    pub delivery_count: usize,
    pub objective: f64,
    /// Catalog names in item order, for the raw matrices.
    pub item_names: Vec<String>,
    /// The plan the views were derived from.
    pub solution: PlanSolution,
}

impl PlanReport {
    pub fn build(solution: &PlanSolution, catalog: &Catalog, policy: &PlanPolicy) -> Self {
        let weeks = solution.weeks();
        let last = weeks.saturating_sub(1);
        let waste = WasteLedger::build(solution, catalog);
        let dates: Vec<NaiveDate> = (0..weeks).map(|w| policy.week_date(w)).collect();

        let mut schedule = Vec::with_capacity(weeks * catalog.len());
        let mut actions = Vec::new();
        let mut costs = Vec::with_capacity(weeks);
        let mut nutrients = Vec::with_capacity(weeks);
        let mut volume = Vec::with_capacity(weeks);

        for (w, &date) in dates.iter().enumerate() {
            let is_last = w == last;
            let mut intake = NutrientVector::default();
            let mut orders = Vec::new();
            let mut consumption = Vec::new();
            let mut remaining = Vec::new();
            let mut wasted = Vec::new();
            let mut ordered_perishable = 0;
            let mut ordered_non_perishable = 0;
            let mut eaten_total = 0;

            for (id, item) in catalog.iter() {
                let ordered = solution.ordered(w, id);
                let packages = solution.packages(w, id);
                let eaten = solution.eaten(w, id);
                let leftover = WasteLedger::leftover(solution, w, id);
                let item_waste = waste.servings(w, id);

                schedule.push(ScheduleRow {
                    week: w,
                    date,
                    item: item.name.clone(),
                    ordered,
                    packages,
                    eaten,
                    remaining: if is_last { 0 } else { leftover },
                    perishable: item.perishable,
                    unit_cost: item.unit_cost,
                    final_week_waste: if is_last { leftover } else { 0 },
                });

                if ordered > 0 {
                    orders.push(OrderEntry {
                        item: item.name.clone(),
                        servings: ordered,
                        packages,
                    });
                }
                if eaten > 0 {
                    consumption.push((item.name.clone(), eaten));
                }
                if !is_last && leftover > 0 {
                    remaining.push((item.name.clone(), leftover));
                }
                if item_waste > 0 {
                    wasted.push((item.name.clone(), item_waste));
                }

                if item.perishable {
                    ordered_perishable += ordered;
                } else {
                    ordered_non_perishable += ordered;
                }
                eaten_total += eaten;
                intake.accumulate(&item.nutrients, eaten as f64);
            }

            let cost = solution.cost_breakdown.weekly[w];
            costs.push(CostRow {
                week: w,
                date,
                items: cost.items,
                delivery: cost.delivery,
                total: cost.total,
            });

            if !orders.is_empty() || !consumption.is_empty() || !wasted.is_empty() {
                actions.push(ActionRow {
                    week: w,
                    date,
                    orders,
                    consumption,
                    remaining,
                    waste: wasted,
                    total_cost: cost.total,
                });
            }

            let in_band = Nutrient::ALL.into_iter().all(|n| {
                let band = policy.nutrients.get(n);
                band.contains(intake.get(n), FEASIBILITY_TOLERANCE * band.max.abs().max(1.0))
            });
            nutrients.push(NutrientRow {
                week: w,
                date,
                intake,
                in_band,
            });

            volume.push(VolumeRow {
                week: w,
                date,
                ordered_perishable,
                ordered_non_perishable,
                eaten: eaten_total,
                wasted: waste.week_servings(w),
                waste_cost: waste.week_cost(w),
            });
        }

        let waste_by_item = waste
            .totals_by_item()
            .into_iter()
            .map(|(id, servings, cost)| (catalog.get(id).name.clone(), servings, cost))
            .collect();

        Self {
            schedule,
            actions,
            costs,
            nutrients,
            bands: policy.nutrients.clone(),
            waste,
            waste_by_item,
            volume,
            item_total: solution.cost_breakdown.item_total(),
            delivery_total: solution.cost_breakdown.delivery_total(),
            total_cost: solution.cost_breakdown.total,
            delivery_count: solution.delivery_count(),
            objective: solution.objective,
            item_names: catalog.items().iter().map(|item| item.name.clone()).collect(),
            solution: solution.clone(),
        }
    }

    pub fn weeks(&self) -> usize {
        self.costs.len()
    }

    /// Mean weekly intake over the horizon.
    pub fn average_intake(&self) -> NutrientVector {
        let mut avg = NutrientVector::default();
        if self.nutrients.is_empty() {
            return avg;
        }
        let share = 1.0 / self.nutrients.len() as f64;
        for row in &self.nutrients {
            avg.accumulate(&row.intake, share);
        }
        avg
    }
}
