use std::collections::HashMap;

use strsim::jaro_winkler;

use crate::error::{PlanError, Result};
use crate::models::{Item, ItemId, OrderPolicy};
use crate::planner::constants::SUGGESTION_THRESHOLD;

/// Immutable item arena.
///
/// Each item gets a dense `ItemId` in load order, so every per-item array in
/// the model is indexed the same way and iteration order is reproducible.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    by_key: HashMap<String, ItemId>,
}

impl Catalog {
    /// Build a catalog, validating every item.
    pub fn new(items: Vec<Item>) -> Result<Self> {
        if items.is_empty() {
            return Err(PlanError::EmptyCatalog);
        }

        let mut by_key = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            item.validate()?;
            if by_key.insert(item.id.to_lowercase(), ItemId(idx)).is_some() {
                return Err(PlanError::DuplicateItem(item.id.clone()));
            }
        }

        Ok(Self { items, by_key })
    }

    #[inline]
    pub fn get(&self, id: ItemId) -> &Item {
        &self.items[id.index()]
    }

    /// Find an item by identifier (case-insensitive).
    pub fn find(&self, key: &str) -> Option<ItemId> {
        self.by_key.get(&key.to_lowercase()).copied()
    }

    /// Find an item by identifier, suggesting the closest one on a miss.
    pub fn lookup(&self, key: &str) -> Result<ItemId> {
        self.find(key).ok_or_else(|| PlanError::UnknownItem {
            name: key.to_string(),
            suggestion: self.suggest(key).map(str::to_string),
        })
    }

    /// Closest identifier by Jaro-Winkler similarity, if close enough.
    pub fn suggest(&self, key: &str) -> Option<&str> {
        let needle = key.to_lowercase();
        self.items
            .iter()
            .map(|item| (item.id.as_str(), jaro_winkler(&item.id.to_lowercase(), &needle)))
            .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.items
            .iter()
            .enumerate()
            .map(|(idx, item)| (ItemId(idx), item))
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        (0..self.items.len()).map(ItemId)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn perishable_count(&self) -> usize {
        self.items.iter().filter(|i| i.perishable).count()
    }

    /// Weekly serving cap per item, indexed by `ItemId`.
    ///
    /// Policy overrides win over the catalog's own cap, which wins over the
    /// policy default. Overrides naming unknown items are rejected.
    pub fn weekly_limits(&self, order: &OrderPolicy) -> Result<Vec<u32>> {
        let mut limits: Vec<u32> = self
            .items
            .iter()
            .map(|item| item.weekly_limit.unwrap_or(order.default_weekly_limit))
            .collect();

        for (key, limit) in &order.weekly_limit_overrides {
            let id = self.lookup(key)?;
            if *limit == 0 {
                return Err(PlanError::InvalidWeeklyLimit { item: key.clone() });
            }
            limits[id.index()] = *limit;
        }

        Ok(limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NutrientVector;

    fn item(id: &str, perishable: bool, weekly_limit: Option<u32>) -> Item {
        Item {
            id: id.to_string(),
            name: id.replace('_', " "),
            unit_cost: 1.0,
            nutrients: NutrientVector {
                calories: 100.0,
                ..Default::default()
            },
            perishable,
            package_size: 1,
            weekly_limit,
        }
    }

    fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            item("rolled_oats", false, None),
            item("banana", true, Some(10)),
            item("peanut_butter", false, None),
        ])
        .unwrap()
    }

    #[test]
    fn test_ids_follow_load_order() {
        let catalog = sample_catalog();
        assert_eq!(catalog.find("rolled_oats"), Some(ItemId(0)));
        assert_eq!(catalog.find("BANANA"), Some(ItemId(1)));
        assert_eq!(catalog.get(ItemId(2)).id, "peanut_butter");
        assert_eq!(catalog.ids().collect::<Vec<_>>().len(), 3);
        assert_eq!(catalog.perishable_count(), 1);
    }

    #[test]
    fn test_empty_and_duplicate_rejected() {
        assert!(matches!(Catalog::new(vec![]), Err(PlanError::EmptyCatalog)));
        assert!(matches!(
            Catalog::new(vec![item("oats", false, None), item("OATS", false, None)]),
            Err(PlanError::DuplicateItem(_))
        ));
    }

    #[test]
    fn test_zero_package_rejected_at_load() {
        let mut bad = item("rice", false, None);
        bad.package_size = 0;
        assert!(matches!(
            Catalog::new(vec![bad]),
            Err(PlanError::InvalidPackageSize(_))
        ));
    }

    #[test]
    fn test_lookup_suggests_close_match() {
        let catalog = sample_catalog();
        match catalog.lookup("rolled_oat") {
            Err(PlanError::UnknownItem { suggestion, .. }) => {
                assert_eq!(suggestion.as_deref(), Some("rolled_oats"))
            }
            other => panic!("unexpected: {:?}", other),
        }
        match catalog.lookup("zzzz") {
            Err(PlanError::UnknownItem { suggestion, .. }) => assert!(suggestion.is_none()),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_weekly_limits_precedence() {
        let catalog = sample_catalog();
        let mut order = OrderPolicy::default();
        order.default_weekly_limit = 14;
        order
            .weekly_limit_overrides
            .insert("peanut_butter".to_string(), 3);

        let limits = catalog.weekly_limits(&order).unwrap();
        assert_eq!(limits, vec![14, 10, 3]);

        order.weekly_limit_overrides.insert("penut_butter".to_string(), 2);
        assert!(matches!(
            catalog.weekly_limits(&order),
            Err(PlanError::UnknownItem { .. })
        ));
    }
}
