use crate::catalog::Catalog;
use crate::models::{Item, ItemId, Nutrient, PlanPolicy};
use crate::planner::constants::REFERENCE_BIG_M;
use crate::planner::model::{ConstraintGroup, LinearConstraint, LinearExpr, Sense};
use crate::planner::variables::VariableModel;

/// Emits the constraint groups of the procurement model.
///
/// Holds only shared references to immutable inputs, so one builder can
/// serve every group from parallel workers.
pub struct ConstraintBuilder<'a> {
    vars: &'a VariableModel,
    catalog: &'a Catalog,
    policy: &'a PlanPolicy,
    weekly_limits: &'a [u32],
}

impl<'a> ConstraintBuilder<'a> {
    pub fn new(
        vars: &'a VariableModel,
        catalog: &'a Catalog,
        policy: &'a PlanPolicy,
        weekly_limits: &'a [u32],
    ) -> Self {
        Self {
            vars,
            catalog,
            policy,
            weekly_limits,
        }
    }

    pub fn build_group(&self, group: ConstraintGroup) -> Vec<LinearConstraint> {
        match group {
            ConstraintGroup::InventoryBalance => self.inventory_balance(),
            ConstraintGroup::NutrientBands => self.nutrient_bands(),
            ConstraintGroup::OrderThreshold => self.order_threshold(),
            ConstraintGroup::ServingCaps => self.serving_caps(),
            ConstraintGroup::PerishableConsumption => self.perishable_consumption(),
            ConstraintGroup::PackageMultiples => self.package_multiples(),
            ConstraintGroup::StockAvailability => self.stock_availability(),
        }
    }

    /// Upper bound on servings of `item` ordered in one week.
    ///
    /// At least the reference value, and never below what the whole
    /// horizon can consume plus one package of rounding.
    pub fn big_m(&self, item: ItemId) -> f64 {
        let horizon_need = self.vars.weeks() as f64 * self.weekly_limits[item.index()] as f64
            + self.catalog.get(item).package_size as f64;
        REFERENCE_BIG_M.max(horizon_need)
    }

    fn weeks(&self) -> std::ops::Range<usize> {
        0..self.vars.weeks()
    }

    fn constraint(
        group: ConstraintGroup,
        name: String,
        expr: LinearExpr,
        sense: Sense,
        rhs: f64,
    ) -> LinearConstraint {
        LinearConstraint {
            group,
            name,
            expr,
            sense,
            rhs,
        }
    }

    fn inventory_balance(&self) -> Vec<LinearConstraint> {
        let group = ConstraintGroup::InventoryBalance;
        let mut out = Vec::with_capacity(self.vars.weeks() * self.vars.items());

        for w in self.weeks() {
            for (id, item) in self.catalog.iter() {
                let mut expr = LinearExpr::with_capacity(4);
                expr.add(self.vars.inventory(w, id), 1.0)
                    .add(self.vars.order(w, id), -1.0);

                // Week 0 starts empty; perishables never carry over.
                if w > 0 && !item.perishable {
                    expr.add(self.vars.inventory(w - 1, id), -1.0)
                        .add(self.vars.eat(w - 1, id), 1.0);
                }

                out.push(Self::constraint(
                    group,
                    format!("{}[{},{}]", group.key(), w, id.index()),
                    expr,
                    Sense::Eq,
                    0.0,
                ));
            }
        }
        out
    }

    fn nutrient_bands(&self) -> Vec<LinearConstraint> {
        let group = ConstraintGroup::NutrientBands;
        let mut out = Vec::with_capacity(self.vars.weeks() * Nutrient::ALL.len() * 2);

        for w in self.weeks() {
            for nutrient in Nutrient::ALL {
                let band = self.policy.nutrients.get(nutrient);
                let mut expr = LinearExpr::with_capacity(self.catalog.len());
                for (id, item) in self.catalog.iter() {
                    expr.add(self.vars.eat(w, id), item.nutrients.get(nutrient));
                }

                // A zero minimum is still emitted as an explicit bound.
                out.push(Self::constraint(
                    group,
                    format!("{}_min[{},{}]", group.key(), w, nutrient.key()),
                    expr.clone(),
                    Sense::Ge,
                    band.min,
                ));
                out.push(Self::constraint(
                    group,
                    format!("{}_max[{},{}]", group.key(), w, nutrient.key()),
                    expr,
                    Sense::Le,
                    band.max,
                ));
            }
        }
        out
    }

    fn order_threshold(&self) -> Vec<LinearConstraint> {
        let group = ConstraintGroup::OrderThreshold;
        let mut out = Vec::with_capacity(self.vars.weeks() * (self.vars.items() + 1));

        for w in self.weeks() {
            let flag = self.vars.order_week(w);

            for id in self.catalog.ids() {
                let expr = LinearExpr::new()
                    .term(self.vars.order(w, id), 1.0)
                    .term(flag, -self.big_m(id));
                out.push(Self::constraint(
                    group,
                    format!("{}_link[{},{}]", group.key(), w, id.index()),
                    expr,
                    Sense::Le,
                    0.0,
                ));
            }

            let mut spend = LinearExpr::with_capacity(self.catalog.len() + 1);
            for (id, item) in self.catalog.iter() {
                spend.add(self.vars.order(w, id), item.unit_cost);
            }
            spend.add(flag, -self.policy.order.min_order_value);
            out.push(Self::constraint(
                group,
                format!("{}_min_spend[{}]", group.key(), w),
                spend,
                Sense::Ge,
                0.0,
            ));
        }
        out
    }

    fn serving_caps(&self) -> Vec<LinearConstraint> {
        let group = ConstraintGroup::ServingCaps;
        let mut out = Vec::with_capacity(self.vars.weeks() * self.vars.items());

        for w in self.weeks() {
            for id in self.catalog.ids() {
                out.push(Self::constraint(
                    group,
                    format!("{}[{},{}]", group.key(), w, id.index()),
                    LinearExpr::new().term(self.vars.eat(w, id), 1.0),
                    Sense::Le,
                    self.weekly_limits[id.index()] as f64,
                ));
            }
        }
        out
    }

    fn perishable_consumption(&self) -> Vec<LinearConstraint> {
        let group = ConstraintGroup::PerishableConsumption;
        self.per_item(group, |item| item.perishable, |w, id| {
            LinearExpr::new()
                .term(self.vars.eat(w, id), 1.0)
                .term(self.vars.order(w, id), -1.0)
        }, Sense::Eq)
    }

    fn package_multiples(&self) -> Vec<LinearConstraint> {
        let group = ConstraintGroup::PackageMultiples;
        self.per_item(group, |_| true, |w, id| {
            LinearExpr::new()
                .term(self.vars.order(w, id), 1.0)
                .term(
                    self.vars.packages(w, id),
                    -(self.catalog.get(id).package_size as f64),
                )
        }, Sense::Eq)
    }

    fn stock_availability(&self) -> Vec<LinearConstraint> {
        let group = ConstraintGroup::StockAvailability;
        self.per_item(group, |item| !item.perishable, |w, id| {
            LinearExpr::new()
                .term(self.vars.eat(w, id), 1.0)
                .term(self.vars.inventory(w, id), -1.0)
        }, Sense::Le)
    }

    /// One `expr sense 0` constraint per week for every item passing `keep`.
    fn per_item<K, E>(
        &self,
        group: ConstraintGroup,
        keep: K,
        expr: E,
        sense: Sense,
    ) -> Vec<LinearConstraint>
    where
        K: Fn(&Item) -> bool,
        E: Fn(usize, ItemId) -> LinearExpr,
    {
        let selected: Vec<ItemId> = self
            .catalog
            .iter()
            .filter(|(_, item)| keep(*item))
            .map(|(id, _)| id)
            .collect();

        let mut out = Vec::with_capacity(self.vars.weeks() * selected.len());
        for w in self.weeks() {
            for &id in &selected {
                out.push(Self::constraint(
                    group,
                    format!("{}[{},{}]", group.key(), w, id.index()),
                    expr(w, id),
                    sense,
                    0.0,
                ));
            }
        }
        out
    }
}
