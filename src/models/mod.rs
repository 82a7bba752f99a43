pub mod item;
pub mod plan;
pub mod policy;

pub use item::{Item, ItemId, Nutrient, NutrientVector};
pub use plan::{CostBreakdown, OrderLine, PlanSolution, WeekCost};
pub use policy::{NutrientBand, NutrientBands, OrderPolicy, PlanPolicy, SolverPolicy};
