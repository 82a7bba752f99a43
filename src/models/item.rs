use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// The six nutrients tracked per serving and bounded per week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nutrient {
    Calories,
    Protein,
    Fat,
    Carbs,
    Fiber,
    Sugar,
}

impl Nutrient {
    pub const ALL: [Nutrient; 6] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Fat,
        Nutrient::Carbs,
        Nutrient::Fiber,
        Nutrient::Sugar,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Fat => "fat",
            Nutrient::Carbs => "carbs",
            Nutrient::Fiber => "fiber",
            Nutrient::Sugar => "sugar",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Nutrient::Calories => "Calories",
            Nutrient::Protein => "Protein",
            Nutrient::Fat => "Fat",
            Nutrient::Carbs => "Carbs",
            Nutrient::Fiber => "Fiber",
            Nutrient::Sugar => "Sugar",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Nutrient::Calories => "kcal",
            _ => "g",
        }
    }
}

/// Nutrient content of one serving, or a weekly total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientVector {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub fiber: f64,
    pub sugar: f64,
}

impl NutrientVector {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Fat => self.fat,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fiber => self.fiber,
            Nutrient::Sugar => self.sugar,
        }
    }

    fn get_mut(&mut self, nutrient: Nutrient) -> &mut f64 {
        match nutrient {
            Nutrient::Calories => &mut self.calories,
            Nutrient::Protein => &mut self.protein,
            Nutrient::Fat => &mut self.fat,
            Nutrient::Carbs => &mut self.carbs,
            Nutrient::Fiber => &mut self.fiber,
            Nutrient::Sugar => &mut self.sugar,
        }
    }

    /// Add `servings` servings of `per_serving` to this total.
    pub fn accumulate(&mut self, per_serving: &NutrientVector, servings: f64) {
        for nutrient in Nutrient::ALL {
            *self.get_mut(nutrient) += per_serving.get(nutrient) * servings;
        }
    }

    /// First nutrient that is negative or not finite, if any.
    pub fn first_invalid(&self) -> Option<(Nutrient, f64)> {
        Nutrient::ALL
            .into_iter()
            .map(|n| (n, self.get(n)))
            .find(|(_, v)| !v.is_finite() || *v < 0.0)
    }
}

/// Dense, stable position of an item in its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub usize);

impl ItemId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A purchasable catalog item. Immutable once the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique key, snake_case of the product name.
    pub id: String,

    /// Display name as it appears in the catalog.
    pub name: String,

    /// Price of one serving.
    pub unit_cost: f64,

    /// Nutrient content of one serving.
    pub nutrients: NutrientVector,

    /// Perishable items must be eaten in the week they arrive.
    pub perishable: bool,

    /// Servings per package; orders are whole packages.
    pub package_size: u32,

    /// Per-item weekly serving cap; the policy default applies when absent.
    #[serde(default)]
    pub weekly_limit: Option<u32>,
}

impl Item {
    /// Derive a catalog key from a product name.
    ///
    /// Lowercase, spaces become underscores, parentheses are dropped.
    pub fn key_from_name(name: &str) -> String {
        name.trim()
            .to_lowercase()
            .chars()
            .filter(|c| *c != '(' && *c != ')')
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect()
    }

    /// Reject data the model cannot represent.
    pub fn validate(&self) -> Result<()> {
        if self.package_size == 0 {
            return Err(PlanError::InvalidPackageSize(self.id.clone()));
        }
        if self.weekly_limit == Some(0) {
            return Err(PlanError::InvalidWeeklyLimit {
                item: self.id.clone(),
            });
        }
        if !self.unit_cost.is_finite() || self.unit_cost < 0.0 {
            return Err(PlanError::NegativeValue {
                field: format!("{}.unit_cost", self.id),
                value: self.unit_cost,
            });
        }
        if let Some((nutrient, value)) = self.nutrients.first_invalid() {
            return Err(PlanError::NegativeValue {
                field: format!("{}.{}", self.id, nutrient.key()),
                value,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> Item {
        Item {
            id: "greek_yogurt".to_string(),
            name: "Greek Yogurt".to_string(),
            unit_cost: 1.25,
            nutrients: NutrientVector {
                calories: 150.0,
                protein: 15.0,
                fat: 4.0,
                carbs: 12.0,
                fiber: 0.0,
                sugar: 9.0,
            },
            perishable: true,
            package_size: 4,
            weekly_limit: None,
        }
    }

    #[test]
    fn test_key_from_name() {
        assert_eq!(Item::key_from_name("Greek Yogurt"), "greek_yogurt");
        assert_eq!(
            Item::key_from_name("Peanut Butter (Crunchy)"),
            "peanut_butter_crunchy"
        );
    }

    #[test]
    fn test_validate_rejects_zero_package() {
        let mut item = sample_item();
        assert!(item.validate().is_ok());

        item.package_size = 0;
        assert!(matches!(
            item.validate(),
            Err(PlanError::InvalidPackageSize(id)) if id == "greek_yogurt"
        ));
    }

    #[test]
    fn test_validate_rejects_negative_cost_and_nutrients() {
        let mut item = sample_item();
        item.unit_cost = -1.0;
        assert!(matches!(
            item.validate(),
            Err(PlanError::NegativeValue { .. })
        ));

        let mut item = sample_item();
        item.nutrients.fiber = f64::NAN;
        match item.validate() {
            Err(PlanError::NegativeValue { field, .. }) => assert_eq!(field, "greek_yogurt.fiber"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_accumulate() {
        let item = sample_item();
        let mut total = NutrientVector::default();
        total.accumulate(&item.nutrients, 2.0);
        total.accumulate(&item.nutrients, 1.0);
        assert!((total.get(Nutrient::Calories) - 450.0).abs() < 1e-9);
        assert!((total.get(Nutrient::Protein) - 45.0).abs() < 1e-9);
    }
}
