use crate::models::NutrientBand;

/// Smallest per-item bound linking servings ordered to the order-week flag.
///
/// Raised per item so it never binds a feasible order (see
/// `ConstraintBuilder::big_m`).
pub const REFERENCE_BIG_M: f64 = 1000.0;

/// Absolute tolerance for linear constraints when checking an assignment.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Distance from the nearest integer tolerated for integer variables.
pub const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Binary values above this read as 1.
pub const BINARY_THRESHOLD: f64 = 0.5;

// ─────────────────────────────────────────────────────────────────────────────
// Default policy (weekly values)
// ─────────────────────────────────────────────────────────────────────────────

/// Horizon length in weeks.
pub const DEFAULT_WEEKS: usize = 36;

/// First reported week, as (year, month, day).
pub const DEFAULT_START_DATE: (i32, u32, u32) = (2024, 9, 29);

/// ~2850 to ~4000 kcal/day.
pub const DEFAULT_CALORIES: NutrientBand = NutrientBand::new(20000.0, 28000.0);

/// ~100 to ~200 g/day.
pub const DEFAULT_PROTEIN: NutrientBand = NutrientBand::new(700.0, 1400.0);

/// ~50 to ~120 g/day.
pub const DEFAULT_FAT: NutrientBand = NutrientBand::new(350.0, 840.0);

/// ~300 to ~750 g/day.
pub const DEFAULT_CARBS: NutrientBand = NutrientBand::new(2100.0, 5250.0);

/// ~20 to ~50 g/day.
pub const DEFAULT_FIBER: NutrientBand = NutrientBand::new(140.0, 350.0);

/// No minimum, ~100 g/day maximum.
pub const DEFAULT_SUGAR: NutrientBand = NutrientBand::new(0.0, 700.0);

/// Upper bound used by `NutrientBands::unbounded`.
pub const OPEN_BAND_MAX: f64 = 1e9;

/// Minimum spend on items for a week with a delivery.
pub const DEFAULT_MIN_ORDER_VALUE: f64 = 75.0;

/// Flat fee charged once per week with a delivery.
pub const DEFAULT_DELIVERY_FEE: f64 = 10.0;

/// Weekly serving cap for items without their own.
pub const DEFAULT_WEEKLY_LIMIT: u32 = 14;

// ─────────────────────────────────────────────────────────────────────────────
// Solver defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Wall-clock limit for one solve, in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: f64 = 900.0;

/// Relative optimality gap at which the solver may stop.
pub const DEFAULT_RELATIVE_GAP: f64 = 0.20;

/// Interval between progress reports, in milliseconds.
pub const PROGRESS_POLL_MS: u64 = 500;

/// Width of the progress bar in cells.
pub const PROGRESS_BAR_WIDTH: usize = 40;

/// Minimum Jaro-Winkler score for a "did you mean" suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.7;
