use std::fmt;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::models::{ItemId, PlanSolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WasteKind {
    /// Perishable stock from the previous week that was not eaten.
    Spoiled,
    /// Stock left after the last planned week.
    EndOfHorizon,
}

impl fmt::Display for WasteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WasteKind::Spoiled => "spoiled",
            WasteKind::EndOfHorizon => "end of horizon",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WasteEntry {
    pub week: usize,
    pub item: ItemId,
    pub name: String,
    pub servings: u64,
    pub cost: f64,
    pub kind: WasteKind,
}

/// Servings that are paid for but never eaten.
///
/// Waste is a reporting notion only; the model never penalizes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WasteLedger {
    entries: Vec<WasteEntry>,
}

impl WasteLedger {
    pub fn build(solution: &PlanSolution, catalog: &Catalog) -> Self {
        let weeks = solution.weeks();
        let mut entries = Vec::new();

        for w in 1..weeks {
            for (id, item) in catalog.iter().filter(|(_, item)| item.perishable) {
                let left = solution
                    .stocked(w - 1, id)
                    .saturating_sub(solution.eaten(w - 1, id));
                if left > 0 {
                    entries.push(WasteEntry {
                        week: w,
                        item: id,
                        name: item.name.clone(),
                        servings: left,
                        cost: left as f64 * item.unit_cost,
                        kind: WasteKind::Spoiled,
                    });
                }
            }
        }

        if let Some(last) = weeks.checked_sub(1) {
            for (id, item) in catalog.iter() {
                let left = Self::leftover(solution, last, id);
                if left > 0 {
                    entries.push(WasteEntry {
                        week: last,
                        item: id,
                        name: item.name.clone(),
                        servings: left,
                        cost: left as f64 * item.unit_cost,
                        kind: WasteKind::EndOfHorizon,
                    });
                }
            }
        }

        entries.sort_by_key(|e| (e.week, e.item));
        Self { entries }
    }

    /// Stock of `item` not eaten in `week`.
    pub fn leftover(solution: &PlanSolution, week: usize, item: ItemId) -> u64 {
        solution
            .stocked(week, item)
            .saturating_sub(solution.eaten(week, item))
    }

    pub fn entries(&self) -> &[WasteEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn in_week(&self, week: usize) -> impl Iterator<Item = &WasteEntry> {
        self.entries.iter().filter(move |e| e.week == week)
    }

    /// Wasted servings of `item` in `week`, across kinds.
    pub fn servings(&self, week: usize, item: ItemId) -> u64 {
        self.in_week(week)
            .filter(|e| e.item == item)
            .map(|e| e.servings)
            .sum()
    }

    pub fn week_servings(&self, week: usize) -> u64 {
        self.in_week(week).map(|e| e.servings).sum()
    }

    pub fn week_cost(&self, week: usize) -> f64 {
        self.in_week(week).map(|e| e.cost).sum()
    }

    pub fn total_servings(&self) -> u64 {
        self.entries.iter().map(|e| e.servings).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.entries.iter().map(|e| e.cost).sum()
    }

    /// Total wasted servings per item, in catalog order.
    pub fn totals_by_item(&self) -> Vec<(ItemId, u64, f64)> {
        let mut totals: Vec<(ItemId, u64, f64)> = Vec::new();
        for e in &self.entries {
            match totals.iter_mut().find(|(id, _, _)| *id == e.item) {
                Some(slot) => {
                    slot.1 += e.servings;
                    slot.2 += e.cost;
                }
                None => totals.push((e.item, e.servings, e.cost)),
            }
        }
        totals.sort_by_key(|(id, _, _)| *id);
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CostBreakdown, Item, NutrientVector};
    use std::collections::BTreeMap;

    fn sample_item(id: &str, perishable: bool) -> Item {
        Item {
            id: id.to_string(),
            name: id.to_string(),
            unit_cost: 2.0,
            nutrients: NutrientVector::default(),
            perishable,
            package_size: 1,
            weekly_limit: None,
        }
    }

    fn sample_solution(stock: Vec<Vec<(usize, u64)>>, eaten: Vec<Vec<(usize, u64)>>) -> PlanSolution {
        let to_map = |rows: Vec<(usize, u64)>| -> BTreeMap<ItemId, u64> {
            rows.into_iter().map(|(i, q)| (ItemId(i), q)).collect()
        };
        let weeks = stock.len();
        PlanSolution {
            order_schedule: vec![BTreeMap::new(); weeks],
            consumption_schedule: eaten.into_iter().map(to_map).collect(),
            inventory_levels: stock.into_iter().map(to_map).collect(),
            order_weeks: vec![false; weeks],
            cost_breakdown: CostBreakdown::default(),
            objective: 0.0,
        }
    }

    #[test]
    fn test_final_week_leftover_is_waste() {
        let catalog = Catalog::new(vec![sample_item("rice", false)]).unwrap();
        // 12 bought in week 0, 4 eaten per week for 2 weeks, 4 left at the end.
        let solution = sample_solution(
            vec![vec![(0, 12)], vec![(0, 8)]],
            vec![vec![(0, 4)], vec![(0, 4)]],
        );
        let ledger = WasteLedger::build(&solution, &catalog);
        assert_eq!(ledger.entries().len(), 1);
        let entry = &ledger.entries()[0];
        assert_eq!(entry.week, 1);
        assert_eq!(entry.servings, 4);
        assert_eq!(entry.kind, WasteKind::EndOfHorizon);
        assert!((ledger.total_cost() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_perishable_spoilage_counted_next_week() {
        let catalog = Catalog::new(vec![sample_item("milk", true)]).unwrap();
        let solution = sample_solution(
            vec![vec![(0, 5)], vec![], vec![]],
            vec![vec![(0, 3)], vec![], vec![]],
        );
        let ledger = WasteLedger::build(&solution, &catalog);
        assert_eq!(ledger.servings(1, ItemId(0)), 2);
        assert_eq!(ledger.entries()[0].kind, WasteKind::Spoiled);
        assert_eq!(ledger.week_servings(2), 0);
        assert_eq!(ledger.totals_by_item(), vec![(ItemId(0), 2, 4.0)]);
    }

    #[test]
    fn test_clean_plan_has_no_waste() {
        let catalog = Catalog::new(vec![sample_item("milk", true)]).unwrap();
        let solution = sample_solution(vec![vec![(0, 3)]], vec![vec![(0, 3)]]);
        assert!(WasteLedger::build(&solution, &catalog).is_empty());
    }
}
