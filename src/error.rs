use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid horizon: {0} weeks (need at least 1)")]
    InvalidHorizon(usize),

    #[error("Catalog has no items")]
    EmptyCatalog,

    #[error("Item '{0}' has package size 0")]
    InvalidPackageSize(String),

    #[error("Item '{item}' has weekly serving limit 0")]
    InvalidWeeklyLimit { item: String },

    #[error("Infeasible {nutrient} band: min {min} > max {max}")]
    InvalidBand {
        nutrient: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a finite value >= 0 (got {value})")]
    NegativeValue { field: String, value: f64 },

    #[error("Invalid solver policy: {0}")]
    InvalidSolverPolicy(String),

    #[error("Unknown item '{name}'{}", suggestion_suffix(.suggestion))]
    UnknownItem {
        name: String,
        suggestion: Option<String>,
    },

    #[error("Duplicate item identifier '{0}' in catalog")]
    DuplicateItem(String),

    #[error("Catalog row {row}: {message}")]
    CatalogRow { row: usize, message: String },

    #[error("No feasible plan exists for this catalog and policy")]
    Infeasible,

    #[error("Solver backend '{backend}' failed: {message}")]
    Backend { backend: String, message: String },

    #[error("Plan has not produced an assignment")]
    NotSolved,

    #[error("Extracted plan violates {} model invariant(s): {}", .0.len(), .0.join("; "))]
    InvariantViolation(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PlanError {
    /// Errors detected before any variable or constraint is built.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PlanError::InvalidHorizon(_)
                | PlanError::EmptyCatalog
                | PlanError::InvalidPackageSize(_)
                | PlanError::InvalidWeeklyLimit { .. }
                | PlanError::InvalidBand { .. }
                | PlanError::NegativeValue { .. }
                | PlanError::InvalidSolverPolicy(_)
                | PlanError::UnknownItem { .. }
                | PlanError::DuplicateItem(_)
        )
    }

    /// True when no feasible plan can exist, whether the solver proved it
    /// or an empty nutrient band was rejected up front.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, PlanError::Infeasible | PlanError::InvalidBand { .. })
    }
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_item_message_includes_suggestion() {
        let err = PlanError::UnknownItem {
            name: "oats".to_string(),
            suggestion: Some("rolled_oats".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Unknown item 'oats' (did you mean 'rolled_oats'?)"
        );

        let err = PlanError::UnknownItem {
            name: "zzz".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "Unknown item 'zzz'");
    }

    #[test]
    fn test_classification() {
        let band = PlanError::InvalidBand {
            nutrient: "protein",
            min: 10.0,
            max: 5.0,
        };
        assert!(band.is_configuration());
        assert!(band.is_infeasible());

        assert!(PlanError::Infeasible.is_infeasible());
        assert!(!PlanError::Infeasible.is_configuration());
        assert!(PlanError::InvalidHorizon(0).is_configuration());
        assert!(!PlanError::InvalidHorizon(0).is_infeasible());
    }
}
