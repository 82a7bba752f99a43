use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};
use crate::models::Nutrient;
use crate::planner::constants::*;

/// Inclusive weekly band `[min, max]` for one nutrient.
///
/// A `min` of zero is an explicit lower bound, not an absent one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientBand {
    pub min: f64,
    pub max: f64,
}

impl NutrientBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        value >= self.min - tolerance && value <= self.max + tolerance
    }

    fn validate(&self, nutrient: Nutrient) -> Result<()> {
        for (bound, value) in [("min", self.min), ("max", self.max)] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlanError::NegativeValue {
                    field: format!("nutrients.{}.{}", nutrient.key(), bound),
                    value,
                });
            }
        }
        if self.min > self.max {
            return Err(PlanError::InvalidBand {
                nutrient: nutrient.key(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Weekly bands for all six tracked nutrients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientBands {
    pub calories: NutrientBand,
    pub protein: NutrientBand,
    pub fat: NutrientBand,
    pub carbs: NutrientBand,
    pub fiber: NutrientBand,
    pub sugar: NutrientBand,
}

impl Default for NutrientBands {
    fn default() -> Self {
        Self {
            calories: DEFAULT_CALORIES,
            protein: DEFAULT_PROTEIN,
            fat: DEFAULT_FAT,
            carbs: DEFAULT_CARBS,
            fiber: DEFAULT_FIBER,
            sugar: DEFAULT_SUGAR,
        }
    }
}

impl NutrientBands {
    /// Bands wide enough that no realistic week reaches them.
    pub fn unbounded() -> Self {
        let open = NutrientBand::new(0.0, OPEN_BAND_MAX);
        Self {
            calories: open,
            protein: open,
            fat: open,
            carbs: open,
            fiber: open,
            sugar: open,
        }
    }

    pub fn get(&self, nutrient: Nutrient) -> NutrientBand {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Fat => self.fat,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fiber => self.fiber,
            Nutrient::Sugar => self.sugar,
        }
    }

    pub fn set(&mut self, nutrient: Nutrient, band: NutrientBand) {
        let slot = match nutrient {
            Nutrient::Calories => &mut self.calories,
            Nutrient::Protein => &mut self.protein,
            Nutrient::Fat => &mut self.fat,
            Nutrient::Carbs => &mut self.carbs,
            Nutrient::Fiber => &mut self.fiber,
            Nutrient::Sugar => &mut self.sugar,
        };
        *slot = band;
    }
}

/// Ordering economics and horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderPolicy {
    /// Minimum item spend in any week with a delivery.
    pub min_order_value: f64,

    /// Flat fee per week with a delivery.
    pub delivery_fee: f64,

    /// Number of planned weeks.
    pub weeks: usize,

    /// Calendar date of week 0; reporting only.
    pub start_date: NaiveDate,

    /// Weekly serving cap for items without their own.
    pub default_weekly_limit: u32,

    /// Weekly serving caps keyed by item identifier; these win over the catalog.
    pub weekly_limit_overrides: BTreeMap<String, u32>,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        let (y, m, d) = DEFAULT_START_DATE;
        Self {
            min_order_value: DEFAULT_MIN_ORDER_VALUE,
            delivery_fee: DEFAULT_DELIVERY_FEE,
            weeks: DEFAULT_WEEKS,
            start_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN),
            default_weekly_limit: DEFAULT_WEEKLY_LIMIT,
            weekly_limit_overrides: BTreeMap::new(),
        }
    }
}

/// Stop conditions and resources for one solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverPolicy {
    /// Wall-clock limit in seconds.
    pub time_limit_secs: f64,

    /// Relative MIP gap in `[0, 1)`.
    pub relative_gap: f64,

    /// Worker threads; `None` lets the backend decide.
    pub threads: Option<usize>,

    /// Render a progress bar while the solve runs.
    pub show_progress: bool,
}

impl Default for SolverPolicy {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            relative_gap: DEFAULT_RELATIVE_GAP,
            threads: None,
            show_progress: true,
        }
    }
}

impl SolverPolicy {
    pub fn validate(&self) -> Result<()> {
        if !self.time_limit_secs.is_finite() || self.time_limit_secs <= 0.0 {
            return Err(PlanError::InvalidSolverPolicy(format!(
                "time limit must be > 0 seconds (got {})",
                self.time_limit_secs
            )));
        }
        if !(0.0..1.0).contains(&self.relative_gap) {
            return Err(PlanError::InvalidSolverPolicy(format!(
                "relative gap must be in [0, 1) (got {})",
                self.relative_gap
            )));
        }
        if self.threads == Some(0) {
            return Err(PlanError::InvalidSolverPolicy(
                "thread count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete policy input: nutrition, ordering, and solver settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanPolicy {
    pub nutrients: NutrientBands,
    pub order: OrderPolicy,
    pub solver: SolverPolicy,
}

impl PlanPolicy {
    /// Load a policy from a JSON file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Check everything that does not depend on the catalog.
    pub fn validate(&self) -> Result<()> {
        if self.order.weeks == 0 {
            return Err(PlanError::InvalidHorizon(self.order.weeks));
        }
        for nutrient in Nutrient::ALL {
            self.nutrients.get(nutrient).validate(nutrient)?;
        }
        for (field, value) in [
            ("order.min_order_value", self.order.min_order_value),
            ("order.delivery_fee", self.order.delivery_fee),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlanError::NegativeValue {
                    field: field.to_string(),
                    value,
                });
            }
        }
        if self.order.default_weekly_limit == 0 {
            return Err(PlanError::InvalidWeeklyLimit {
                item: "<default>".to_string(),
            });
        }
        if let Some((id, _)) = self
            .order
            .weekly_limit_overrides
            .iter()
            .find(|(_, limit)| **limit == 0)
        {
            return Err(PlanError::InvalidWeeklyLimit { item: id.clone() });
        }
        self.solver.validate()
    }

    /// Calendar date of week `week`.
    pub fn week_date(&self, week: usize) -> NaiveDate {
        self.order.start_date + chrono::Duration::weeks(week as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        let policy = PlanPolicy::default();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.order.weeks, 36);
        assert_eq!(
            policy.order.start_date,
            NaiveDate::from_ymd_opt(2024, 9, 29).unwrap()
        );
        assert_eq!(policy.nutrients.sugar.min, 0.0);
    }

    #[test]
    fn test_zero_weeks_rejected() {
        let mut policy = PlanPolicy::default();
        policy.order.weeks = 0;
        assert!(matches!(policy.validate(), Err(PlanError::InvalidHorizon(0))));
    }

    #[test]
    fn test_min_above_max_rejected() {
        let mut policy = PlanPolicy::default();
        policy.nutrients.fiber = NutrientBand::new(400.0, 350.0);
        match policy.validate() {
            Err(PlanError::InvalidBand { nutrient, .. }) => assert_eq!(nutrient, "fiber"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_negative_fee_rejected() {
        let mut policy = PlanPolicy::default();
        policy.order.delivery_fee = -5.0;
        assert!(matches!(
            policy.validate(),
            Err(PlanError::NegativeValue { .. })
        ));
    }

    #[test]
    fn test_solver_policy_bounds() {
        let mut solver = SolverPolicy::default();
        solver.relative_gap = 1.0;
        assert!(solver.validate().is_err());

        solver.relative_gap = 0.0;
        solver.time_limit_secs = 0.0;
        assert!(solver.validate().is_err());

        solver.time_limit_secs = 5.0;
        solver.threads = Some(0);
        assert!(solver.validate().is_err());

        solver.threads = Some(2);
        assert!(solver.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "nutrients": { "protein": { "min": 100, "max": 200 } },
            "order": { "weeks": 4, "start_date": "2025-01-06" }
        }"#;
        let policy: PlanPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.order.weeks, 4);
        assert_eq!(policy.nutrients.protein, NutrientBand::new(100.0, 200.0));
        assert_eq!(policy.nutrients.calories, DEFAULT_CALORIES);
        assert_eq!(policy.order.delivery_fee, DEFAULT_DELIVERY_FEE);
        assert_eq!(
            policy.week_date(2),
            NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()
        );
    }
}
