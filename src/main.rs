use clap::Parser;

use diet_order_planner_rs::catalog::load_catalog;
use diet_order_planner_rs::cli::{Cli, Command, InputArgs};
use diet_order_planner_rs::error::Result;
use diet_order_planner_rs::interface::confirm_overwrite;
use diet_order_planner_rs::logging::init_logging;
use diet_order_planner_rs::models::PlanPolicy;
use diet_order_planner_rs::planner::PlanningRun;
use diet_order_planner_rs::report::{display_catalog, display_report, display_status, write_all};
use diet_order_planner_rs::{Catalog, PlanError};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command.unwrap_or_default() {
        Command::Plan => cmd_plan(&cli.inputs),
        Command::Check => cmd_check(&cli.inputs),
    }
}

/// Load the catalog and the policy, with command-line overrides applied.
fn load_inputs(args: &InputArgs) -> Result<(Catalog, PlanPolicy)> {
    let catalog = load_catalog(&args.catalog)?;
    let mut policy = match &args.policy {
        Some(path) => PlanPolicy::load(path)?,
        None => PlanPolicy::default(),
    };
    args.apply(&mut policy);
    policy.validate()?;
    Ok((catalog, policy))
}

/// Validate inputs and list the catalog.
fn cmd_check(args: &InputArgs) -> Result<()> {
    let (catalog, policy) = load_inputs(args)?;
    let limits = catalog.weekly_limits(&policy.order)?;

    display_catalog(&catalog, &limits);
    println!(
        "Policy OK: {} weeks from {}, min order ${:.2}, delivery ${:.2}",
        policy.order.weeks,
        policy.order.start_date,
        policy.order.min_order_value,
        policy.order.delivery_fee
    );
    Ok(())
}

/// Build, solve, print and save the plan.
fn cmd_plan(args: &InputArgs) -> Result<()> {
    let (catalog, policy) = load_inputs(args)?;

    println!(
        "Loaded {} items ({} perishable); planning {} weeks from {}",
        catalog.len(),
        catalog.perishable_count(),
        policy.order.weeks,
        policy.order.start_date
    );

    let run = PlanningRun::new(catalog, policy)?;
    println!(
        "Model: {} variables, {} constraints",
        run.model().variables.len(),
        run.model().constraints.len()
    );

    let outcome = run.solve()?;
    display_status(&outcome, run.adapter().backend_name());
    if outcome.is_infeasible() {
        return Err(PlanError::Infeasible);
    }

    let report = run.report()?;
    display_report(&report);

    if args.no_csv {
        return Ok(());
    }

    if !confirm_overwrite(&args.output, args.yes)? {
        println!("Report files not written.");
        return Ok(());
    }

    let files = write_all(&report, run.policy(), outcome.as_str(), &args.output)?;
    println!(
        "Saved {} report files to '{}'.",
        files.len(),
        args.output.display()
    );
    Ok(())
}
