// Selection state for the three dashboard views.
//
// Each view owns its own selection and only changes it through setters that
// keep it valid against the loaded model: known years and metrics only, at
// least one year/metric selected, top-N from the configured options.
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::reports::{merge_across_metrics, merge_across_years, top_n};
use crate::types::{ChartRow, NormalizedModel, SeriesRow};
use crate::util::shorten_name;

/// Number of metrics pre-selected in the multi-metric view.
pub const DEFAULT_METRIC_COUNT: usize = 3;

pub trait ChartView {
    fn title(&self) -> String;
    /// Series labels in plotting order, one numeric field per label in each row.
    fn series(&self) -> Vec<String>;
    fn rows(&self, model: &NormalizedModel) -> Vec<ChartRow>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TopNChoice {
    value: usize,
    #[serde(skip)]
    options: Vec<usize>,
}

impl TopNChoice {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            value: config.default_top_n,
            options: config.top_n_options.clone(),
        }
    }

    pub fn value(&self) -> usize {
        self.value
    }

    pub fn set(&mut self, n: usize) -> Result<()> {
        if !self.options.contains(&n) {
            return Err(DashboardError::InvalidSelection(format!(
                "top-N {} is not one of {:?}",
                n, self.options
            )));
        }
        self.value = n;
        Ok(())
    }
}

fn check_year(model: &NormalizedModel, year: &str) -> Result<()> {
    if model.has_year(year) {
        Ok(())
    } else {
        Err(DashboardError::UnknownYear(year.to_string()))
    }
}

fn check_metric(model: &NormalizedModel, metric: &str) -> Result<()> {
    if model.has_metric(metric) {
        Ok(())
    } else {
        Err(DashboardError::UnknownMetric(metric.to_string()))
    }
}

// Keep `wanted` in the canonical order of `all`, dropping duplicates.
fn in_canonical_order(all: &[String], wanted: &[String]) -> Vec<String> {
    all.iter().filter(|x| wanted.contains(*x)).cloned().collect()
}

fn chart_rows(rows: Vec<SeriesRow>) -> Vec<ChartRow> {
    rows.into_iter()
        .map(|row| ChartRow {
            name: shorten_name(&row.customer),
            full_name: row.customer,
            series: row.values,
        })
        .collect()
}

/// View 1: top customers for one year and metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomersSelection {
    year: String,
    metric: String,
    top_n: TopNChoice,
}

impl TopCustomersSelection {
    pub fn new(model: &NormalizedModel, config: &DashboardConfig) -> Self {
        Self {
            year: model.years().first().cloned().unwrap_or_default(),
            metric: model.metrics().first().cloned().unwrap_or_default(),
            top_n: TopNChoice::from_config(config),
        }
    }

    pub fn set_year(&mut self, model: &NormalizedModel, year: &str) -> Result<()> {
        check_year(model, year)?;
        self.year = year.to_string();
        Ok(())
    }

    pub fn set_metric(&mut self, model: &NormalizedModel, metric: &str) -> Result<()> {
        check_metric(model, metric)?;
        self.metric = metric.to_string();
        Ok(())
    }

    pub fn set_top_n(&mut self, n: usize) -> Result<()> {
        self.top_n.set(n)
    }
}

impl ChartView for TopCustomersSelection {
    fn title(&self) -> String {
        format!("Top {} Customers by {} ({})", self.top_n.value(), self.metric, self.year)
    }

    fn series(&self) -> Vec<String> {
        vec![self.metric.clone()]
    }

    fn rows(&self, model: &NormalizedModel) -> Vec<ChartRow> {
        top_n(model, &self.year, &self.metric, self.top_n.value())
            .iter()
            .map(|e| ChartRow {
                name: shorten_name(&e.customer),
                full_name: e.customer.clone(),
                series: vec![(self.metric.clone(), e.value)],
            })
            .collect()
    }
}

/// View 2: one metric compared across several years.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearComparisonSelection {
    years: Vec<String>,
    metric: String,
    top_n: TopNChoice,
}

impl YearComparisonSelection {
    pub fn new(model: &NormalizedModel, config: &DashboardConfig) -> Self {
        Self {
            years: model.years().to_vec(),
            metric: model.metrics().first().cloned().unwrap_or_default(),
            top_n: TopNChoice::from_config(config),
        }
    }

    pub fn years(&self) -> &[String] {
        &self.years
    }

    /// Replace the selected years. An empty list is refused.
    pub fn set_years(&mut self, model: &NormalizedModel, years: &[String]) -> Result<()> {
        if years.is_empty() {
            return Err(DashboardError::InvalidSelection(
                "at least one year must be selected".into(),
            ));
        }
        for year in years {
            check_year(model, year)?;
        }
        self.years = in_canonical_order(model.years(), years);
        Ok(())
    }

    /// Add or remove a year. Returns `false` and leaves the selection alone
    /// when asked to remove the last selected year.
    pub fn toggle_year(&mut self, model: &NormalizedModel, year: &str) -> Result<bool> {
        check_year(model, year)?;
        if self.years.iter().any(|y| y == year) {
            if self.years.len() == 1 {
                return Ok(false);
            }
            self.years.retain(|y| y != year);
        } else {
            let mut wanted = self.years.clone();
            wanted.push(year.to_string());
            self.years = in_canonical_order(model.years(), &wanted);
        }
        Ok(true)
    }

    pub fn set_metric(&mut self, model: &NormalizedModel, metric: &str) -> Result<()> {
        check_metric(model, metric)?;
        self.metric = metric.to_string();
        Ok(())
    }

    pub fn set_top_n(&mut self, n: usize) -> Result<()> {
        self.top_n.set(n)
    }
}

impl ChartView for YearComparisonSelection {
    fn title(&self) -> String {
        format!("{} Year-over-Year (Top {} per year)", self.metric, self.top_n.value())
    }

    fn series(&self) -> Vec<String> {
        self.years.clone()
    }

    fn rows(&self, model: &NormalizedModel) -> Vec<ChartRow> {
        chart_rows(merge_across_years(model, &self.years, &self.metric, self.top_n.value()))
    }
}

/// View 3: several metrics compared within one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparisonSelection {
    year: String,
    metrics: Vec<String>,
    top_n: TopNChoice,
}

impl MetricComparisonSelection {
    pub fn new(model: &NormalizedModel, config: &DashboardConfig) -> Self {
        Self {
            year: model.years().first().cloned().unwrap_or_default(),
            metrics: model
                .metrics()
                .iter()
                .take(DEFAULT_METRIC_COUNT)
                .cloned()
                .collect(),
            top_n: TopNChoice::from_config(config),
        }
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn set_year(&mut self, model: &NormalizedModel, year: &str) -> Result<()> {
        check_year(model, year)?;
        self.year = year.to_string();
        Ok(())
    }

    /// Replace the selected metrics. An empty list is refused.
    pub fn set_metrics(&mut self, model: &NormalizedModel, metrics: &[String]) -> Result<()> {
        if metrics.is_empty() {
            return Err(DashboardError::InvalidSelection(
                "at least one metric must be selected".into(),
            ));
        }
        for metric in metrics {
            check_metric(model, metric)?;
        }
        self.metrics = in_canonical_order(model.metrics(), metrics);
        Ok(())
    }

    /// Add or remove a metric. Returns `false` and leaves the selection alone
    /// when asked to remove the last selected metric.
    pub fn toggle_metric(&mut self, model: &NormalizedModel, metric: &str) -> Result<bool> {
        check_metric(model, metric)?;
        if self.metrics.iter().any(|m| m == metric) {
            if self.metrics.len() == 1 {
                return Ok(false);
            }
            self.metrics.retain(|m| m != metric);
        } else {
            let mut wanted = self.metrics.clone();
            wanted.push(metric.to_string());
            self.metrics = in_canonical_order(model.metrics(), &wanted);
        }
        Ok(true)
    }

    pub fn set_top_n(&mut self, n: usize) -> Result<()> {
        self.top_n.set(n)
    }
}

impl ChartView for MetricComparisonSelection {
    fn title(&self) -> String {
        format!("Top {} Customers across Metrics ({})", self.top_n.value(), self.year)
    }

    fn series(&self) -> Vec<String> {
        self.metrics.clone()
    }

    fn rows(&self, model: &NormalizedModel) -> Vec<ChartRow> {
        chart_rows(merge_across_metrics(model, &self.year, &self.metrics, self.top_n.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_csv;
    use crate::normalize::normalize;

    const SAMPLE: &str = "\
Financial Year,Revenue,Margin,Volume,Headcount,Grand Total
FY 2022
Acme Pty Ltd t/as Green Solutions,500,50,5,2,
Globex,300,80,9,1,
FY 2023
Globex,250,20,4,3,
FY 2024
Grand Total,,,,,
";

    fn setup() -> (NormalizedModel, DashboardConfig) {
        let config = DashboardConfig::default();
        let (model, _) = normalize(&parse_csv(SAMPLE).unwrap(), &config).unwrap();
        (model, config)
    }

    #[test]
    fn test_defaults() {
        let (model, config) = setup();
        let top = TopCustomersSelection::new(&model, &config);
        assert_eq!(top.series(), vec!["Revenue"]);
        assert_eq!(top.title(), "Top 10 Customers by Revenue (FY 2022)");

        let years = YearComparisonSelection::new(&model, &config);
        assert_eq!(years.years(), &["FY 2022", "FY 2023", "FY 2024"]);

        let metrics = MetricComparisonSelection::new(&model, &config);
        assert_eq!(metrics.metrics(), &["Revenue", "Margin", "Volume"]);
    }

    #[test]
    fn test_selection_json_is_camel_case() {
        let (model, config) = setup();
        let mut view = YearComparisonSelection::new(&model, &config);
        view.set_top_n(5).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "years": ["FY 2022", "FY 2023", "FY 2024"],
                "metric": "Revenue",
                "topN": 5,
            })
        );
    }

    #[test]
    fn test_top_customers_rows_use_short_names() {
        let (model, config) = setup();
        let top = TopCustomersSelection::new(&model, &config);
        let rows = top.rows(&model);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Acme");
        assert_eq!(rows[0].full_name, "Acme Pty Ltd t/as Green Solutions");
        assert_eq!(rows[0].series, vec![("Revenue".to_string(), 500.0)]);
    }

    #[test]
    fn test_empty_year_gives_no_rows() {
        let (model, config) = setup();
        let mut top = TopCustomersSelection::new(&model, &config);
        top.set_year(&model, "FY 2024").unwrap();
        assert!(top.rows(&model).is_empty());
    }

    #[test]
    fn test_unknown_selections_rejected() {
        let (model, config) = setup();
        let mut top = TopCustomersSelection::new(&model, &config);
        assert!(matches!(
            top.set_year(&model, "FY 1999"),
            Err(DashboardError::UnknownYear(_))
        ));
        assert!(matches!(
            top.set_metric(&model, "Grand Total"),
            Err(DashboardError::UnknownMetric(_))
        ));
        assert!(matches!(top.set_top_n(7), Err(DashboardError::InvalidSelection(_))));
        assert!(top.set_top_n(5).is_ok());
        assert_eq!(top.title(), "Top 5 Customers by Revenue (FY 2022)");
    }

    #[test]
    fn test_cannot_deselect_last_year() {
        let (model, config) = setup();
        let mut view = YearComparisonSelection::new(&model, &config);
        view.set_years(&model, &["FY 2023".to_string()]).unwrap();
        assert!(!view.toggle_year(&model, "FY 2023").unwrap());
        assert_eq!(view.years(), &["FY 2023"]);
        assert!(view.toggle_year(&model, "FY 2022").unwrap());
        assert_eq!(view.years(), &["FY 2022", "FY 2023"]);
        assert!(view.toggle_year(&model, "FY 2023").unwrap());
        assert_eq!(view.years(), &["FY 2022"]);
        assert!(view.set_years(&model, &[]).is_err());
    }

    #[test]
    fn test_cannot_deselect_last_metric() {
        let (model, config) = setup();
        let mut view = MetricComparisonSelection::new(&model, &config);
        view.set_metrics(&model, &["Headcount".to_string(), "Revenue".to_string()])
            .unwrap();
        assert_eq!(view.metrics(), &["Revenue", "Headcount"]);
        assert!(view.toggle_metric(&model, "Revenue").unwrap());
        assert!(!view.toggle_metric(&model, "Headcount").unwrap());
        assert_eq!(view.metrics(), &["Headcount"]);
    }

    #[test]
    fn test_year_comparison_rows() {
        let (model, config) = setup();
        let view = YearComparisonSelection::new(&model, &config);
        let rows = view.rows(&model);
        assert_eq!(rows[0].full_name, "Globex");
        assert_eq!(
            rows[0].series,
            vec![
                ("FY 2022".to_string(), 300.0),
                ("FY 2023".to_string(), 250.0),
                ("FY 2024".to_string(), 0.0),
            ]
        );
        assert_eq!(rows[1].name, "Acme");
    }

    #[test]
    fn test_metric_comparison_rows() {
        let (model, config) = setup();
        let view = MetricComparisonSelection::new(&model, &config);
        let rows = view.rows(&model);
        // n = 10: Acme 10 + 9 + 9 = 28, Globex 9 + 10 + 10 = 29
        assert_eq!(rows[0].full_name, "Globex");
        assert_eq!(rows[1].name, "Acme");
        assert_eq!(rows[1].series.len(), 3);
    }
}
