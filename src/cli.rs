use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::models::PlanPolicy;

/// Multi-week grocery ordering planner: meet weekly nutrient bands at the
/// lowest total cost of food and deliveries.
#[derive(Parser, Debug)]
#[command(name = "diet_order_planner")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub inputs: InputArgs,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Default)]
pub enum Command {
    /// Build and solve the plan, print it, and write the report files.
    #[default]
    Plan,

    /// Load and validate the catalog and policy without solving.
    Check,
}

/// Input files and per-run overrides of the policy file.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Catalog CSV file.
    #[arg(short, long, default_value = "food_items.csv", global = true)]
    pub catalog: PathBuf,

    /// Policy JSON file; defaults apply when omitted.
    #[arg(short, long, global = true)]
    pub policy: Option<PathBuf>,

    /// Number of weeks to plan.
    #[arg(long, global = true)]
    pub weeks: Option<usize>,

    /// Date of week 1 (YYYY-MM-DD).
    #[arg(long, global = true)]
    pub start_date: Option<NaiveDate>,

    /// Solver time limit in seconds.
    #[arg(long, global = true)]
    pub time_limit: Option<f64>,

    /// Relative optimality gap in [0, 1).
    #[arg(long, global = true)]
    pub gap: Option<f64>,

    /// Solver threads.
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Directory for report files.
    #[arg(short, long, default_value = "output", global = true)]
    pub output: PathBuf,

    /// Print the plan without writing report files.
    #[arg(long, global = true)]
    pub no_csv: bool,

    /// Hide the solver progress bar.
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Overwrite existing report files without asking.
    #[arg(short, long, global = true)]
    pub yes: bool,
}

impl InputArgs {
    /// Apply command-line overrides on top of a loaded policy.
    pub fn apply(&self, policy: &mut PlanPolicy) {
        if let Some(weeks) = self.weeks {
            policy.order.weeks = weeks;
        }
        if let Some(date) = self.start_date {
            policy.order.start_date = date;
        }
        if let Some(secs) = self.time_limit {
            policy.solver.time_limit_secs = secs;
        }
        if let Some(gap) = self.gap {
            policy.solver.relative_gap = gap;
        }
        if self.threads.is_some() {
            policy.solver.threads = self.threads;
        }
        if self.no_progress {
            policy.solver.show_progress = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_to_policy() {
        let cli = Cli::parse_from([
            "diet_order_planner",
            "--weeks",
            "4",
            "--start-date",
            "2025-01-06",
            "--gap",
            "0.05",
            "--no-progress",
        ]);
        assert!(cli.command.is_none());

        let mut policy = PlanPolicy::default();
        cli.inputs.apply(&mut policy);
        assert_eq!(policy.order.weeks, 4);
        assert_eq!(
            policy.order.start_date,
            NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
        );
        assert_eq!(policy.solver.relative_gap, 0.05);
        assert!(!policy.solver.show_progress);
        assert_eq!(policy.solver.time_limit_secs, 900.0);
    }

    #[test]
    fn test_check_subcommand_with_verbosity() {
        let cli = Cli::parse_from(["diet_order_planner", "check", "-vv", "--catalog", "items.csv"]);
        assert!(matches!(cli.command, Some(Command::Check)));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.inputs.catalog, PathBuf::from("items.csv"));
    }
}
