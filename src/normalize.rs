use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::types::{
    CsvTable, CustomerEntry, NormalizedModel, RawRow, RESERVED_SERIES_LABELS,
};
use crate::util::parse_amount;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub customer_rows: usize,
    pub skipped_rows: usize,
    /// Non-blank metric cells left out because they were zero, negative or
    /// not a number.
    pub dropped_values: usize,
}

/// Position in the flat row stream: before the first year marker, or inside
/// a year section.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cursor<'a> {
    NoCurrentYear,
    InYear(&'a str),
}

struct Scan<'a> {
    cursor: Cursor<'a>,
    data: HashMap<String, HashMap<String, Vec<CustomerEntry>>>,
    report: LoadReport,
}

/// Metric columns in header order: everything except the label and the
/// aggregate column.
pub fn metric_columns(headers: &[String], config: &DashboardConfig) -> Vec<String> {
    headers
        .iter()
        .filter(|h| !h.is_empty() && **h != config.label_column && **h != config.aggregate_label)
        .cloned()
        .collect()
}

/// Build the year -> metric -> ranked entries model in one forward pass.
///
/// Every `known_years x metrics` slot exists in the result, even when no row
/// contributed to it. Entries with equal values keep CSV order.
pub fn normalize(
    table: &CsvTable,
    config: &DashboardConfig,
) -> Result<(NormalizedModel, LoadReport)> {
    if table.rows.is_empty() {
        return Err(DashboardError::EmptyInput);
    }
    if !table.headers.iter().any(|h| *h == config.label_column) {
        return Err(DashboardError::MissingColumn(config.label_column.clone()));
    }
    let metrics = metric_columns(&table.headers, config);
    if metrics.is_empty() {
        return Err(DashboardError::NoMetrics);
    }
    if let Some(reserved) = metrics
        .iter()
        .find(|m| RESERVED_SERIES_LABELS.contains(&m.as_str()))
    {
        return Err(DashboardError::ReservedLabel(reserved.clone()));
    }
    info!("{} metric columns: {:?}", metrics.len(), metrics);

    let empty_slots: HashMap<String, Vec<CustomerEntry>> =
        metrics.iter().map(|m| (m.clone(), Vec::new())).collect();
    let start = Scan {
        cursor: Cursor::NoCurrentYear,
        data: config
            .known_years
            .iter()
            .map(|y| (y.clone(), empty_slots.clone()))
            .collect(),
        report: LoadReport::default(),
    };

    let Scan { mut data, report, .. } = table.rows.iter().fold(start, |mut scan, row| {
        scan.report.total_rows += 1;
        let label = row.get(&config.label_column);
        match (scan.cursor, label) {
            (_, Some(l)) if config.known_years.iter().any(|y| y == l) => {
                debug!("entering section {}", l);
                scan.cursor = Cursor::InYear(l);
            }
            (Cursor::InYear(year), Some(customer)) if customer != config.aggregate_label => {
                scan.report.customer_rows += 1;
                if let Some(slots) = scan.data.get_mut(year) {
                    collect_values(row, customer, &metrics, slots, &mut scan.report);
                }
            }
            _ => scan.report.skipped_rows += 1,
        }
        scan
    });

    for by_metric in data.values_mut() {
        for entries in by_metric.values_mut() {
            entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
        }
    }

    info!(
        "normalized {} customer rows ({} skipped, {} values dropped)",
        report.customer_rows, report.skipped_rows, report.dropped_values
    );
    let model = NormalizedModel {
        years: config.known_years.clone(),
        metrics,
        data,
    };
    Ok((model, report))
}

fn collect_values(
    row: &RawRow,
    customer: &str,
    metrics: &[String],
    slots: &mut HashMap<String, Vec<CustomerEntry>>,
    report: &mut LoadReport,
) {
    for metric in metrics {
        let cell = row.get(metric);
        let value = parse_amount(cell).unwrap_or(0.0);
        if value > 0.0 {
            if let Some(entries) = slots.get_mut(metric) {
                entries.push(CustomerEntry::new(customer, value));
            }
        } else if cell.is_some() {
            report.dropped_values += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_csv;

    const SAMPLE: &str = "\
Financial Year,MetricA,MetricB,Grand Total
FY 2022,,,
Acme,500,0,500
Globex,300,100,400
FY 2023,,,
Acme,200,50,250
Grand Total,700,150,850
";

    fn config() -> DashboardConfig {
        DashboardConfig {
            known_years: vec!["FY 2022".into(), "FY 2023".into()],
            ..Default::default()
        }
    }

    fn model(text: &str) -> NormalizedModel {
        normalize(&parse_csv(text).unwrap(), &config()).unwrap().0
    }

    #[test]
    fn test_metrics_exclude_label_and_aggregate() {
        let m = model(SAMPLE);
        assert_eq!(m.metrics(), &["MetricA".to_string(), "MetricB".to_string()]);
        assert_eq!(m.years(), &["FY 2022".to_string(), "FY 2023".to_string()]);
    }

    #[test]
    fn test_entries_sorted_and_positive() {
        let m = model(SAMPLE);
        assert_eq!(
            m.entries("FY 2022", "MetricA").unwrap(),
            &[CustomerEntry::new("Acme", 500.0), CustomerEntry::new("Globex", 300.0)]
        );
        assert_eq!(
            m.entries("FY 2022", "MetricB").unwrap(),
            &[CustomerEntry::new("Globex", 100.0)]
        );
        assert_eq!(
            m.entries("FY 2023", "MetricA").unwrap(),
            &[CustomerEntry::new("Acme", 200.0)]
        );
    }

    #[test]
    fn test_grand_total_row_is_skipped() {
        let m = model(SAMPLE);
        for year in m.years() {
            for metric in m.metrics() {
                assert!(m
                    .entries(year, metric)
                    .unwrap()
                    .iter()
                    .all(|e| e.customer != "Grand Total"));
            }
        }
    }

    #[test]
    fn test_every_slot_exists() {
        let cfg = DashboardConfig {
            known_years: vec!["FY 2022".into(), "FY 2023".into(), "FY 2024".into()],
            ..Default::default()
        };
        let (m, _) = normalize(&parse_csv(SAMPLE).unwrap(), &cfg).unwrap();
        for year in &cfg.known_years {
            for metric in m.metrics() {
                assert!(m.entries(year, metric).is_some(), "{year}/{metric}");
            }
        }
        assert_eq!(m.entries("FY 2024", "MetricA").unwrap().len(), 0);
        assert!(m.entries("FY 2025", "MetricA").is_none());
    }

    #[test]
    fn test_rows_before_first_year_are_ignored() {
        let text = "Financial Year,Revenue\nStray Co,999\n,5\nFY 2022\nAcme,10\n";
        let (m, report) = normalize(&parse_csv(text).unwrap(), &config()).unwrap();
        assert_eq!(m.entries("FY 2022", "Revenue").unwrap().len(), 1);
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.customer_rows, 1);
        assert_eq!(report.skipped_rows, 2);
    }

    #[test]
    fn test_equal_values_keep_csv_order() {
        let text = "Financial Year,Revenue\nFY 2022\nBeta,10\nAlpha,10\nGamma,20\n";
        let m = model(text);
        let names: Vec<&str> = m
            .entries("FY 2022", "Revenue")
            .unwrap()
            .iter()
            .map(|e| e.customer.as_str())
            .collect();
        assert_eq!(names, vec!["Gamma", "Beta", "Alpha"]);
    }

    #[test]
    fn test_unparsable_and_negative_values_dropped() {
        let text = "Financial Year,Revenue\nFY 2022\nAcme,-5\nGlobex,n/a\nInitech,\"$1,200\"\n";
        let (m, report) = normalize(&parse_csv(text).unwrap(), &config()).unwrap();
        assert_eq!(
            m.entries("FY 2022", "Revenue").unwrap(),
            &[CustomerEntry::new("Initech", 1200.0)]
        );
        assert_eq!(report.dropped_values, 2);
    }

    #[test]
    fn test_missing_label_column() {
        let table = parse_csv("Customer,Revenue\nAcme,1\n").unwrap();
        let err = normalize(&table, &config()).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn(c) if c == "Financial Year"));
    }

    #[test]
    fn test_no_metric_columns() {
        let table = parse_csv("Financial Year,Grand Total\nFY 2022,\n").unwrap();
        assert!(matches!(normalize(&table, &config()), Err(DashboardError::NoMetrics)));
    }

    #[test]
    fn test_reserved_metric_name() {
        let table = parse_csv("Financial Year,Revenue,name\nFY 2022\nAcme,1,2\n").unwrap();
        let err = normalize(&table, &config()).unwrap_err();
        assert!(matches!(err, DashboardError::ReservedLabel(l) if l == "name"));
    }

    #[test]
    fn test_empty_rows() {
        let table = CsvTable {
            headers: vec!["Financial Year".into(), "Revenue".into()],
            rows: vec![],
        };
        assert!(matches!(normalize(&table, &config()), Err(DashboardError::EmptyInput)));
    }
}
