use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::catalog::Catalog;
use crate::error::{PlanError, Result};
use crate::models::{Item, NutrientVector};

/// One catalog row as it appears in the CSV file.
///
/// Numeric fields are read as text so a malformed value can be reported with
/// its row number instead of a bare deserialization error.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    #[serde(rename = "Product Name")]
    name: String,

    #[serde(rename = "Price per serving")]
    price: String,

    #[serde(rename = "Calories")]
    calories: String,

    #[serde(rename = "Protein (g)")]
    protein: String,

    #[serde(rename = "Fat (g)")]
    fat: String,

    #[serde(rename = "Carbs (g)")]
    carbs: String,

    #[serde(rename = "Fiber (g)")]
    fiber: String,

    #[serde(rename = "Sugar (g)")]
    sugar: String,

    #[serde(rename = "Perishable")]
    perishable: String,

    #[serde(rename = "Package Size")]
    package_size: String,

    #[serde(rename = "Weekly Limit", default)]
    weekly_limit: Option<String>,
}

fn row_error(row: usize, message: String) -> PlanError {
    PlanError::CatalogRow { row, message }
}

fn parse_number(row: usize, field: &str, raw: &str) -> Result<f64> {
    let cleaned = raw.trim().trim_start_matches('$').trim();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| row_error(row, format!("{} is not a number: '{}'", field, raw)))?;
    if !value.is_finite() {
        return Err(row_error(row, format!("{} is not finite: '{}'", field, raw)));
    }
    Ok(value)
}

fn parse_count(row: usize, field: &str, raw: &str) -> Result<u32> {
    raw.trim()
        .parse()
        .map_err(|_| row_error(row, format!("{} is not a whole number: '{}'", field, raw)))
}

fn parse_flag(row: usize, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Ok(true),
        "n" | "no" | "false" | "0" => Ok(false),
        _ => Err(row_error(
            row,
            format!("Perishable must be Y or N: '{}'", raw),
        )),
    }
}

impl CatalogRecord {
    fn into_item(self, row: usize) -> Result<Item> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(row_error(row, "Product Name is empty".to_string()));
        }

        let weekly_limit = match self.weekly_limit.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_count(row, "Weekly Limit", raw)?),
        };

        Ok(Item {
            id: Item::key_from_name(&name),
            unit_cost: parse_number(row, "Price per serving", &self.price)?,
            nutrients: NutrientVector {
                calories: parse_number(row, "Calories", &self.calories)?,
                protein: parse_number(row, "Protein (g)", &self.protein)?,
                fat: parse_number(row, "Fat (g)", &self.fat)?,
                carbs: parse_number(row, "Carbs (g)", &self.carbs)?,
                fiber: parse_number(row, "Fiber (g)", &self.fiber)?,
                sugar: parse_number(row, "Sugar (g)", &self.sugar)?,
            },
            perishable: parse_flag(row, &self.perishable)?,
            package_size: parse_count(row, "Package Size", &self.package_size)?,
            weekly_limit,
            name,
        })
    }
}

/// Load a catalog from any CSV source.
///
/// Items keep file order; identifiers must be unique.
pub fn read_catalog<R: io::Read>(reader: R) -> Result<Catalog> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut items = Vec::new();
    for (idx, record) in rdr.deserialize::<CatalogRecord>().enumerate() {
        let row = idx + 1;
        items.push(record?.into_item(row)?);
    }

    tracing::debug!(items = items.len(), "parsed catalog rows");
    Catalog::new(items)
}

/// Load a catalog from a CSV file.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let file = std::fs::File::open(path.as_ref())?;
    let catalog = read_catalog(file)?;
    tracing::info!(
        path = %path.as_ref().display(),
        items = catalog.len(),
        perishable = catalog.perishable_count(),
        "loaded catalog"
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Product Name,Price per serving,Calories,Protein (g),Fat (g),Carbs (g),Fiber (g),Sugar (g),Perishable,Package Size";

    #[test]
    fn test_load_catalog_file() {
        let csv = format!(
            "{}\nRolled Oats,$0.35,150,5,3,27,4,1,N,30\nBanana,$0.25,105,1.3,0.4,27,3.1,14,Y,6\n",
            HEADER
        );
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(csv.as_bytes()).unwrap();

        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);

        let oats = catalog.get(catalog.find("rolled_oats").unwrap());
        assert_eq!(oats.name, "Rolled Oats");
        assert!((oats.unit_cost - 0.35).abs() < 1e-9);
        assert!(!oats.perishable);
        assert_eq!(oats.package_size, 30);
        assert_eq!(oats.weekly_limit, None);

        let banana = catalog.get(catalog.find("banana").unwrap());
        assert!(banana.perishable);
        assert!((banana.nutrients.sugar - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_optional_weekly_limit_column() {
        let csv = format!(
            "{},Weekly Limit\nEggs,0.30,70,6,5,0.6,0,0.2,Y,12,21\nRice,0.10,200,4,0.4,45,0.6,0,N,20,\n",
            HEADER
        );
        let catalog = read_catalog(csv.as_bytes()).unwrap();
        assert_eq!(catalog.get(catalog.find("eggs").unwrap()).weekly_limit, Some(21));
        assert_eq!(catalog.get(catalog.find("rice").unwrap()).weekly_limit, None);
    }

    #[test]
    fn test_malformed_number_reports_row() {
        let csv = format!(
            "{}\nRice,0.10,200,4,0.4,45,0.6,0,N,20\nEggs,0.30,lots,6,5,0.6,0,0.2,Y,12\n",
            HEADER
        );
        match read_catalog(csv.as_bytes()) {
            Err(PlanError::CatalogRow { row, message }) => {
                assert_eq!(row, 2);
                assert!(message.contains("Calories"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_zero_package_size_rejected() {
        let csv = format!("{}\nRice,0.10,200,4,0.4,45,0.6,0,N,0\n", HEADER);
        assert!(matches!(
            read_catalog(csv.as_bytes()),
            Err(PlanError::InvalidPackageSize(_))
        ));
    }

    #[test]
    fn test_bad_perishable_flag() {
        let csv = format!("{}\nRice,0.10,200,4,0.4,45,0.6,0,maybe,20\n", HEADER);
        assert!(matches!(
            read_catalog(csv.as_bytes()),
            Err(PlanError::CatalogRow { row: 1, .. })
        ));
    }
}
