use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DashboardError, Result};
use crate::types::RESERVED_SERIES_LABELS;

/// Layout of the spreadsheet export plus view defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Column holding financial-year labels, customer names and the total row.
    pub label_column: String,
    /// Label of the summary row, also the name of the summary column.
    pub aggregate_label: String,
    /// Labels that open a financial-year section, in display order.
    pub known_years: Vec<String>,
    pub top_n_options: Vec<usize>,
    pub default_top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            label_column: "Financial Year".to_string(),
            aggregate_label: "Grand Total".to_string(),
            known_years: vec![
                "FY 2022".to_string(),
                "FY 2023".to_string(),
                "FY 2024".to_string(),
            ],
            top_n_options: vec![5, 10, 15, 20, 25],
            default_top_n: 10,
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<()> {
        if self.label_column.trim().is_empty() {
            return Err(DashboardError::Config("label column is empty".into()));
        }
        if self.known_years.is_empty() {
            return Err(DashboardError::Config("no known years configured".into()));
        }
        if let Some(year) = self
            .known_years
            .iter()
            .find(|y| RESERVED_SERIES_LABELS.contains(&y.as_str()))
        {
            return Err(DashboardError::ReservedLabel(year.clone()));
        }
        if self.top_n_options.contains(&0) {
            return Err(DashboardError::Config("top-N options must be positive".into()));
        }
        if !self.top_n_options.contains(&self.default_top_n) {
            return Err(DashboardError::Config(format!(
                "default top-N {} is not one of {:?}",
                self.default_top_n, self.top_n_options
            )));
        }
        Ok(())
    }
}

/// Read a JSON config file; fields left out keep their defaults.
pub fn load_config(path: &Path) -> Result<DashboardConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: DashboardConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.label_column, "Financial Year");
        assert_eq!(config.aggregate_label, "Grand Total");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, r#"{"known_years": ["FY21", "FY22"]}"#).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.known_years, vec!["FY21", "FY22"]);
        assert_eq!(config.default_top_n, 10);
        assert_eq!(config.label_column, "Financial Year");
    }

    #[test]
    fn test_rejects_empty_years() {
        let config = DashboardConfig {
            known_years: vec![],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_rejects_reserved_year_label() {
        let config = DashboardConfig {
            known_years: vec!["FY 2022".into(), "fullName".into()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DashboardError::ReservedLabel(l)) if l == "fullName"
        ));
    }

    #[test]
    fn test_rejects_default_outside_options() {
        let config = DashboardConfig {
            default_top_n: 7,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DashboardError::Config(_))));
    }
}
