use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{ItemId, Nutrient, PlanPolicy, PlanSolution};
use crate::report::tables::{ItemQuantities, OrderEntry, PlanReport};

pub const SCHEDULE_FILE: &str = "weekly_schedule.csv";
pub const ACTION_PLAN_FILE: &str = "weekly_action_plan.csv";
pub const COST_FILE: &str = "cost_summary.csv";
pub const NUTRITION_FILE: &str = "nutritional_summary.csv";
pub const WASTE_FILE: &str = "waste_ledger.csv";
pub const VOLUME_FILE: &str = "volume_summary.csv";
pub const ORDERS_MATRIX_FILE: &str = "detailed_orders.csv";
pub const CONSUMPTION_MATRIX_FILE: &str = "detailed_consumption.csv";
pub const INVENTORY_MATRIX_FILE: &str = "detailed_inventory.csv";
pub const PARAMETERS_FILE: &str = "optimization_parameters.json";

fn money(value: f64) -> String {
    format!("${:.2}", value)
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn join_quantities(entries: &ItemQuantities) -> String {
    entries
        .iter()
        .map(|(item, servings)| format!("{}: {} servings", item, servings))
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_orders(orders: &[OrderEntry]) -> String {
    orders
        .iter()
        .map(|o| {
            let packages = if o.packages == 1 {
                "1 package".to_string()
            } else {
                format!("{} packages", o.packages)
            };
            format!("{}: {} servings ({})", o.item, o.servings, packages)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn or_none(text: String) -> String {
    if text.is_empty() { "None".to_string() } else { text }
}

/// Detailed schedule, one row per week and item.
pub fn write_schedule(report: &PlanReport, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "Week",
        "Item",
        "Order (Servings)",
        "Order (Packages)",
        "Consumption",
        "Remaining Inventory",
        "Perishable",
        "Cost per Serving",
        "Final Week Waste",
    ])?;
    for row in &report.schedule {
        wtr.write_record([
            row.date.to_string(),
            row.item.clone(),
            row.ordered.to_string(),
            row.packages.to_string(),
            row.eaten.to_string(),
            row.remaining.to_string(),
            yes_no(row.perishable).to_string(),
            money(row.unit_cost),
            row.final_week_waste.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Active weeks followed by the TOTAL WASTAGE and TOTAL COST rows.
pub fn write_action_plan(report: &PlanReport, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "Week",
        "Orders",
        "Consumption Plan",
        "Remaining Inventory",
        "Wastage",
        "Total Cost",
    ])?;
    for row in &report.actions {
        let orders = join_orders(&row.orders);
        wtr.write_record([
            row.date.to_string(),
            if orders.is_empty() { "No orders needed".to_string() } else { orders },
            join_quantities(&row.consumption),
            or_none(join_quantities(&row.remaining)),
            or_none(join_quantities(&row.waste)),
            money(row.total_cost),
        ])?;
    }

    let wastage = report
        .waste_by_item
        .iter()
        .map(|(item, servings, cost)| format!("{}: {} servings ({})", item, servings, money(*cost)))
        .collect::<Vec<_>>()
        .join("\n");
    wtr.write_record([
        "TOTAL WASTAGE".to_string(),
        String::new(),
        String::new(),
        String::new(),
        or_none(wastage),
        format!("{} wasted", money(report.waste.total_cost())),
    ])?;
    wtr.write_record([
        "TOTAL COST".to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        money(report.total_cost),
    ])?;
    wtr.flush()?;
    Ok(())
}

pub fn write_costs(report: &PlanReport, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["Week", "Item Costs", "Delivery Fee", "Total Cost"])?;
    for row in &report.costs {
        wtr.write_record([
            row.date.to_string(),
            money(row.items),
            money(row.delivery),
            money(row.total),
        ])?;
    }
    wtr.write_record([
        "TOTAL".to_string(),
        money(report.item_total),
        money(report.delivery_total),
        money(report.total_cost),
    ])?;
    wtr.flush()?;
    Ok(())
}

pub fn write_nutrition(report: &PlanReport, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["Week".to_string()];
    header.extend(
        Nutrient::ALL
            .iter()
            .map(|n| format!("{} ({})", n.label(), n.unit())),
    );
    header.push("Within Bounds".to_string());
    wtr.write_record(&header)?;

    for row in &report.nutrients {
        let mut record = vec![row.date.to_string()];
        record.extend(
            Nutrient::ALL
                .iter()
                .map(|n| format!("{:.1}", row.intake.get(*n))),
        );
        record.push(yes_no(row.in_band).to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_waste(report: &PlanReport, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["Week", "Item", "Servings", "Cost", "Kind"])?;
    for entry in report.waste.entries() {
        let date = report
            .costs
            .get(entry.week)
            .map(|c| c.date.to_string())
            .unwrap_or_default();
        wtr.write_record([
            date,
            entry.name.clone(),
            entry.servings.to_string(),
            money(entry.cost),
            entry.kind.to_string(),
        ])?;
    }
    wtr.write_record([
        "TOTAL".to_string(),
        String::new(),
        report.waste.total_servings().to_string(),
        money(report.waste.total_cost()),
        String::new(),
    ])?;
    wtr.flush()?;
    Ok(())
}

pub fn write_volume(report: &PlanReport, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "Week",
        "Ordered Perishable",
        "Ordered Non-Perishable",
        "Consumed",
        "Wasted",
        "Waste Cost",
    ])?;
    for row in &report.volume {
        wtr.write_record([
            row.date.to_string(),
            row.ordered_perishable.to_string(),
            row.ordered_non_perishable.to_string(),
            row.eaten.to_string(),
            row.wasted.to_string(),
            money(row.waste_cost),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Raw solver quantities as a week-by-item matrix, zeros included.
fn write_matrix<F>(report: &PlanReport, path: &Path, value: F) -> Result<()>
where
    F: Fn(&PlanSolution, usize, ItemId) -> u64,
{
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["Week".to_string()];
    header.extend(report.item_names.iter().cloned());
    wtr.write_record(&header)?;

    for row in &report.costs {
        let mut record = vec![row.date.to_string()];
        record.extend(
            (0..report.item_names.len())
                .map(|i| value(&report.solution, row.week, ItemId(i)).to_string()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Servings ordered per week and item.
pub fn write_order_matrix(report: &PlanReport, path: &Path) -> Result<()> {
    write_matrix(report, path, PlanSolution::ordered)
}

/// Servings eaten per week and item.
pub fn write_consumption_matrix(report: &PlanReport, path: &Path) -> Result<()> {
    write_matrix(report, path, PlanSolution::eaten)
}

/// Stock on hand per week and item, straight from the solver (the final
/// week is not reclassified here).
pub fn write_inventory_matrix(report: &PlanReport, path: &Path) -> Result<()> {
    write_matrix(report, path, PlanSolution::stocked)
}

/// Echo the policy the plan was solved under, with the headline results.
pub fn write_parameters(report: &PlanReport, policy: &PlanPolicy, status: &str, path: &Path) -> Result<()> {
    let json = serde_json::json!({
        "status": status,
        "policy": policy,
        "results": {
            "total_cost": report.total_cost,
            "item_cost": report.item_total,
            "delivery_cost": report.delivery_total,
            "deliveries": report.delivery_count,
            "objective": report.objective,
            "wasted_servings": report.waste.total_servings(),
            "waste_cost": report.waste.total_cost(),
        },
    });

    let mut file = File::create(path)?;
    file.write_all(serde_json::to_string_pretty(&json)?.as_bytes())?;
    Ok(())
}

/// Write every table into `dir`, creating it if needed. Returns the files
/// written, in a fixed order.
pub fn write_all(
    report: &PlanReport,
    policy: &PlanPolicy,
    status: &str,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let files: Vec<PathBuf> = [
        SCHEDULE_FILE,
        ACTION_PLAN_FILE,
        COST_FILE,
        NUTRITION_FILE,
        WASTE_FILE,
        VOLUME_FILE,
        ORDERS_MATRIX_FILE,
        CONSUMPTION_MATRIX_FILE,
        INVENTORY_MATRIX_FILE,
        PARAMETERS_FILE,
    ]
    .iter()
    .map(|name| dir.join(name))
    .collect();

    write_schedule(report, &files[0])?;
    write_action_plan(report, &files[1])?;
    write_costs(report, &files[2])?;
    write_nutrition(report, &files[3])?;
    write_waste(report, &files[4])?;
    write_volume(report, &files[5])?;
    write_order_matrix(report, &files[6])?;
    write_consumption_matrix(report, &files[7])?;
    write_inventory_matrix(report, &files[8])?;
    write_parameters(report, policy, status, &files[9])?;

    tracing::info!(dir = %dir.display(), files = files.len(), "wrote report files");
    Ok(files)
}
