use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::ItemId;

/// Servings and whole packages of one item ordered in one week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub servings: u64,
    pub packages: u64,
}

/// Spend for one week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeekCost {
    /// Sum of servings ordered times unit cost.
    pub items: f64,

    /// Delivery fee if the week has a delivery, else 0.
    pub delivery: f64,

    /// `items + delivery`.
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub weekly: Vec<WeekCost>,
    pub total: f64,
}

impl CostBreakdown {
    pub fn item_total(&self) -> f64 {
        self.weekly.iter().map(|w| w.items).sum()
    }

    pub fn delivery_total(&self) -> f64 {
        self.weekly.iter().map(|w| w.delivery).sum()
    }
}

/// Weekly plan reconstructed from a solver assignment.
///
/// Every per-week map omits items whose quantity is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSolution {
    pub order_schedule: Vec<BTreeMap<ItemId, OrderLine>>,
    pub consumption_schedule: Vec<BTreeMap<ItemId, u64>>,
    pub inventory_levels: Vec<BTreeMap<ItemId, u64>>,

    /// Order-week indicator per week.
    pub order_weeks: Vec<bool>,

    pub cost_breakdown: CostBreakdown,

    /// Objective value reported with the assignment.
    pub objective: f64,
}

impl PlanSolution {
    pub fn weeks(&self) -> usize {
        self.order_weeks.len()
    }

    pub fn ordered(&self, week: usize, item: ItemId) -> u64 {
        self.order_schedule[week]
            .get(&item)
            .map(|line| line.servings)
            .unwrap_or(0)
    }

    pub fn packages(&self, week: usize, item: ItemId) -> u64 {
        self.order_schedule[week]
            .get(&item)
            .map(|line| line.packages)
            .unwrap_or(0)
    }

    pub fn eaten(&self, week: usize, item: ItemId) -> u64 {
        self.consumption_schedule[week]
            .get(&item)
            .copied()
            .unwrap_or(0)
    }

    pub fn stocked(&self, week: usize, item: ItemId) -> u64 {
        self.inventory_levels[week].get(&item).copied().unwrap_or(0)
    }

    /// Number of weeks with a delivery.
    pub fn delivery_count(&self) -> usize {
        self.order_weeks.iter().filter(|w| **w).count()
    }
}
