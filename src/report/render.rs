use crate::catalog::Catalog;
use crate::models::Nutrient;
use crate::report::tables::PlanReport;
use crate::solver::SolveOutcome;

fn quantities(entries: &[(String, u64)]) -> String {
    entries
        .iter()
        .map(|(item, servings)| format!("{} x{}", item, servings))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Headline status line for a finished solve, tagged with the backend name.
pub fn status_line(outcome: &SolveOutcome, backend: &str) -> String {
    match outcome {
        SolveOutcome::Optimal(a) => {
            format!("Status: optimal (objective ${:.2}) [{}]", a.objective, backend)
        }
        SolveOutcome::FeasibleButNotProven { reason, assignment } => format!(
            "Status: feasible, NOT proven optimal ({}; objective ${:.2}) [{}]",
            reason, assignment.objective, backend
        ),
        SolveOutcome::Infeasible => format!(
            "Status: infeasible [{}]. No plan satisfies the nutrient bands and order rules.",
            backend
        ),
    }
}

pub fn display_status(outcome: &SolveOutcome, backend: &str) {
    println!("{}", status_line(outcome, backend));
}

/// What to order and eat each week.
pub fn display_action_plan(report: &PlanReport) {
    println!();
    println!("=== WEEKLY ACTION PLAN ===");
    println!("What to order and eat each week:");
    println!();

    if report.actions.is_empty() {
        println!("No activity planned.");
        return;
    }

    for row in &report.actions {
        println!("Week {:>2} ({})  ${:.2}", row.week + 1, row.date, row.total_cost);
        if row.orders.is_empty() {
            println!("    Order:   none");
        } else {
            let orders = row
                .orders
                .iter()
                .map(|o| {
                    let unit = if o.packages == 1 { "pkg" } else { "pkgs" };
                    format!("{} x{} ({} {})", o.item, o.servings, o.packages, unit)
                })
                .collect::<Vec<_>>()
                .join(", ");
            println!("    Order:   {}", orders);
        }
        println!("    Eat:     {}", quantities(&row.consumption));
        if !row.remaining.is_empty() {
            println!("    Carry:   {}", quantities(&row.remaining));
        }
        if !row.waste.is_empty() {
            println!("    Waste:   {}", quantities(&row.waste));
        }
    }

    println!();
    if report.waste_by_item.is_empty() {
        println!("TOTAL WASTAGE: none");
    } else {
        println!("TOTAL WASTAGE: ${:.2}", report.waste.total_cost());
        for (item, servings, cost) in &report.waste_by_item {
            println!("    {}: {} servings (${:.2})", item, servings, cost);
        }
    }
    println!("TOTAL COST: ${:.2}", report.total_cost);
}

pub fn display_cost_summary(report: &PlanReport) {
    println!();
    println!("=== COST SUMMARY ===");
    println!();
    println!(
        "{:<12} {:>12} {:>12} {:>12}",
        "Week", "Item Costs", "Delivery", "Total"
    );
    for row in &report.costs {
        println!(
            "{:<12} {:>12.2} {:>12.2} {:>12.2}",
            row.date.to_string(),
            row.items,
            row.delivery,
            row.total
        );
    }
    println!(
        "{:<12} {:>12.2} {:>12.2} {:>12.2}",
        "TOTAL", report.item_total, report.delivery_total, report.total_cost
    );
    println!("Deliveries: {}", report.delivery_count);
}

pub fn display_nutrition(report: &PlanReport) {
    println!();
    println!("=== NUTRITIONAL SUMMARY ===");
    println!();

    let mut header = format!("{:<12}", "Week");
    for n in Nutrient::ALL {
        header.push_str(&format!(" {:>10}", n.label()));
    }
    println!("{}  OK", header);

    for row in &report.nutrients {
        let mut line = format!("{:<12}", row.date.to_string());
        for n in Nutrient::ALL {
            line.push_str(&format!(" {:>10.1}", row.intake.get(n)));
        }
        println!("{}  {}", line, if row.in_band { "yes" } else { "NO" });
    }

    let avg = report.average_intake();
    let mut line = format!("{:<12}", "AVERAGE");
    for n in Nutrient::ALL {
        line.push_str(&format!(" {:>10.1}", avg.get(n)));
    }
    println!("{}", line);

    let mut bounds = format!("{:<12}", "BAND");
    for n in Nutrient::ALL {
        let band = report.bands.get(n);
        bounds.push_str(&format!(" {:>10}", format!("{:.0}-{:.0}", band.min, band.max)));
    }
    println!("{}", bounds);
}

/// Per-week volumes; a text stand-in for charts.
pub fn display_volume(report: &PlanReport) {
    println!();
    println!("=== ORDER VOLUME ===");
    println!();
    println!(
        "{:<12} {:>10} {:>14} {:>9} {:>7} {:>10}",
        "Week", "Perishable", "Non-Perishable", "Consumed", "Wasted", "Waste $"
    );
    for row in &report.volume {
        println!(
            "{:<12} {:>10} {:>14} {:>9} {:>7} {:>10.2}",
            row.date.to_string(),
            row.ordered_perishable,
            row.ordered_non_perishable,
            row.eaten,
            row.wasted,
            row.waste_cost
        );
    }
}

/// Print every view of the report.
pub fn display_report(report: &PlanReport) {
    display_action_plan(report);
    display_cost_summary(report);
    display_nutrition(report);
    display_volume(report);
    println!();
}

/// Catalog listing for the `check` command.
pub fn display_catalog(catalog: &Catalog, weekly_limits: &[u32]) {
    println!();
    println!(
        "=== Catalog ({} items, {} perishable) ===",
        catalog.len(),
        catalog.perishable_count()
    );
    println!();

    let width = catalog.iter().map(|(_, i)| i.name.len()).max().unwrap_or(10);
    for (id, item) in catalog.iter() {
        println!(
            "  {:<width$}  ${:>6.2}/serving  pkg {:>3}  limit {:>3}/wk  {:>6.0} kcal{}",
            item.name,
            item.unit_cost,
            item.package_size,
            weekly_limits[id.index()],
            item.nutrients.calories,
            if item.perishable { "  perishable" } else { "" },
            width = width
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{Assignment, LimitReason};

    #[test]
    fn test_status_line_names_backend() {
        let assignment = Assignment {
            values: vec![],
            objective: 12.5,
        };
        assert_eq!(
            status_line(&SolveOutcome::Optimal(assignment.clone()), "good_lp/microlp"),
            "Status: optimal (objective $12.50) [good_lp/microlp]"
        );

        let limited = SolveOutcome::FeasibleButNotProven {
            reason: LimitReason::TimeLimit,
            assignment,
        };
        let line = status_line(&limited, "scripted");
        assert!(line.contains("NOT proven optimal (time_limit; objective $12.50)"));
        assert!(line.ends_with("[scripted]"));

        assert!(status_line(&SolveOutcome::Infeasible, "good_lp/highs")
            .starts_with("Status: infeasible [good_lp/highs]."));
    }
}
