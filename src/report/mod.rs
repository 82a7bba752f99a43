pub mod output;
pub mod render;
pub mod tables;
pub mod waste;

pub use output::write_all;
pub use render::{display_catalog, display_report, display_status, status_line};
pub use tables::{
    ActionRow, CostRow, NutrientRow, OrderEntry, PlanReport, ScheduleRow, VolumeRow,
};
pub use waste::{WasteEntry, WasteKind, WasteLedger};
