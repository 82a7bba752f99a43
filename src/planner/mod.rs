pub mod constants;
pub mod constraints;
pub mod extract;
pub mod model;
pub mod objective;
pub mod run;
pub mod variables;

pub use constraints::ConstraintBuilder;
pub use extract::{extract_solution, verify_solution};
pub use model::{ConstraintGroup, LinearConstraint, LinearExpr, MilpModel, Sense};
pub use objective::assemble_objective;
pub use run::PlanningRun;
pub use variables::{VarDomain, VarFamily, VarId, VariableModel};
