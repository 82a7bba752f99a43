use diet_order_planner_rs::error::PlanError;
use diet_order_planner_rs::models::{Item, ItemId, NutrientBand, NutrientVector, PlanPolicy};
use diet_order_planner_rs::planner::{ConstraintGroup, MilpModel, Sense, VarDomain};
use diet_order_planner_rs::Catalog;

fn make_item(id: &str, perishable: bool, package_size: u32) -> Item {
    Item {
        id: id.to_string(),
        name: id.to_string(),
        unit_cost: 1.25,
        nutrients: NutrientVector {
            calories: 250.0,
            protein: 12.0,
            fat: 8.0,
            carbs: 30.0,
            fiber: 4.0,
            sugar: 0.0,
        },
        perishable,
        package_size,
        weekly_limit: None,
    }
}

fn sample_catalog() -> Catalog {
    Catalog::new(vec![
        make_item("oats", false, 10),
        make_item("eggs", true, 12),
        make_item("lentils", false, 4),
    ])
    .unwrap()
}

fn sample_policy(weeks: usize) -> PlanPolicy {
    let mut policy = PlanPolicy::default();
    policy.order.weeks = weeks;
    policy
}

#[test]
fn test_model_dimensions() {
    let catalog = sample_catalog();
    let model = MilpModel::build(&catalog, &sample_policy(4)).unwrap();

    // Four per-item families plus one flag per week.
    assert_eq!(model.variables.len(), 4 * 4 * 3 + 4);
    // 5 per-item rows per week (one of balance, cap, package, threshold
    // link each, plus perishable or stock), 12 band rows, 1 spend row.
    assert_eq!(model.constraints.len(), 4 * (5 * 3 + 13));
    assert_eq!(model.objective.len(), 4 * (3 + 1));

    let binaries = model
        .variables
        .declarations()
        .filter(|(_, d)| *d == VarDomain::Binary)
        .count();
    assert_eq!(binaries, 4);
}

#[test]
fn test_groups_emitted_in_fixed_order() {
    let model = MilpModel::build(&sample_catalog(), &sample_policy(2)).unwrap();
    let mut seen: Vec<ConstraintGroup> = Vec::new();
    for c in &model.constraints {
        if seen.last() != Some(&c.group) {
            seen.push(c.group);
        }
    }
    assert_eq!(seen, ConstraintGroup::ALL.to_vec());
}

#[test]
fn test_build_is_deterministic() {
    let catalog = sample_catalog();
    let policy = sample_policy(3);
    let a = MilpModel::build(&catalog, &policy).unwrap();
    let b = MilpModel::build(&catalog, &policy).unwrap();
    assert_eq!(a.constraints, b.constraints);
    assert_eq!(a.objective, b.objective);
}

#[test]
fn test_single_week_has_no_carryover_terms() {
    let model = MilpModel::build(&sample_catalog(), &sample_policy(1)).unwrap();
    for c in model.constraints_in(ConstraintGroup::InventoryBalance) {
        assert_eq!(c.expr.len(), 2, "{}", c.name);
        assert_eq!(c.sense, Sense::Eq);
    }
    // Non-perishables cannot be eaten beyond what was bought this week.
    assert_eq!(model.constraints_in(ConstraintGroup::StockAvailability).count(), 2);
}

#[test]
fn test_zero_minimum_bands_are_constraints() {
    let mut policy = sample_policy(2);
    policy.nutrients.protein = NutrientBand::new(0.0, 500.0);
    let model = MilpModel::build(&sample_catalog(), &policy).unwrap();

    let lower: Vec<_> = model
        .constraints_in(ConstraintGroup::NutrientBands)
        .filter(|c| c.name.starts_with("nutrient_band_min") && c.name.ends_with("protein]"))
        .collect();
    assert_eq!(lower.len(), 2);
    for c in lower {
        assert_eq!(c.sense, Sense::Ge);
        assert_eq!(c.rhs, 0.0);
        assert_eq!(c.expr.len(), 3);
    }
}

#[test]
fn test_configuration_errors_fail_before_build() {
    let catalog = sample_catalog();

    assert!(matches!(
        MilpModel::build(&catalog, &sample_policy(0)),
        Err(PlanError::InvalidHorizon(0))
    ));

    let mut policy = sample_policy(2);
    policy.order.min_order_value = -1.0;
    assert!(matches!(
        MilpModel::build(&catalog, &policy),
        Err(PlanError::NegativeValue { .. })
    ));

    let mut policy = sample_policy(2);
    policy
        .order
        .weekly_limit_overrides
        .insert("lentil".to_string(), 5);
    match MilpModel::build(&catalog, &policy) {
        Err(PlanError::UnknownItem { suggestion, .. }) => {
            assert_eq!(suggestion.as_deref(), Some("lentils"))
        }
        other => panic!("unexpected: {:?}", other.map(|m| m.constraints.len())),
    }

    assert!(matches!(
        Catalog::new(vec![make_item("rice", false, 0)]),
        Err(PlanError::InvalidPackageSize(_))
    ));
}

#[test]
fn test_check_assignment_reports_violations() {
    let catalog = sample_catalog();
    let model = MilpModel::build(&catalog, &sample_policy(1)).unwrap();
    let vars = &model.variables;

    let mut values = vec![0.0; vars.len()];
    let violations = model.check_assignment(&values, 1e-6);
    // Nothing eaten misses every positive nutrient minimum.
    assert!(violations.iter().any(|v| v.contains("nutrient_band_min[0,calories]")));
    assert!(!violations.iter().any(|v| v.contains("sugar")));

    values[vars.order(0, ItemId(0)).index()] = 2.5;
    values[vars.order_week(0).index()] = 2.0;
    let violations = model.check_assignment(&values, 1e-6);
    assert!(violations.iter().any(|v| v.starts_with("order[0,0] = 2.5")));
    assert!(violations.iter().any(|v| v.starts_with("order_week[0] = 2")));

    assert_eq!(model.check_assignment(&[0.0], 1e-6).len(), 1);
}
