use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use tabled::Tabled;

/// One physical CSV line keyed by header name. Cells past the end of a short
/// line are simply absent.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    fields: HashMap<String, String>,
}

impl RawRow {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    /// Trimmed cell value; `None` when the cell is missing or blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Parsed CSV: header order plus every data line.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CustomerEntry {
    pub customer: String,
    pub value: f64,
}

impl CustomerEntry {
    pub fn new(customer: impl Into<String>, value: f64) -> Self {
        Self {
            customer: customer.into(),
            value,
        }
    }
}

/// Financial year -> metric -> entries sorted by value, highest first.
///
/// Every `(year, metric)` pair of `years x metrics` has a slot, possibly empty.
#[derive(Debug, Clone, Default)]
pub struct NormalizedModel {
    pub(crate) years: Vec<String>,
    pub(crate) metrics: Vec<String>,
    pub(crate) data: HashMap<String, HashMap<String, Vec<CustomerEntry>>>,
}

impl NormalizedModel {
    /// Known years in configured order.
    pub fn years(&self) -> &[String] {
        &self.years
    }

    /// Metric columns in header order.
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn has_year(&self, year: &str) -> bool {
        self.data.contains_key(year)
    }

    pub fn has_metric(&self, metric: &str) -> bool {
        self.metrics.iter().any(|m| m == metric)
    }

    /// `None` only when the key pair is unknown; an empty slice is a valid slot.
    pub fn entries(&self, year: &str, metric: &str) -> Option<&[CustomerEntry]> {
        self.data
            .get(year)
            .and_then(|by_metric| by_metric.get(metric))
            .map(Vec::as_slice)
    }

    /// Raw value for a customer in one slice, 0 when absent.
    pub fn value_of(&self, year: &str, metric: &str, customer: &str) -> f64 {
        self.entries(year, metric)
            .and_then(|entries| entries.iter().find(|e| e.customer == customer))
            .map(|e| e.value)
            .unwrap_or(0.0)
    }

    pub fn entry_count(&self) -> usize {
        self.data
            .values()
            .flat_map(|by_metric| by_metric.values())
            .map(Vec::len)
            .sum()
    }
}

/// A customer with one value per selected series (year or metric), in
/// selection order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    pub customer: String,
    pub values: Vec<(String, f64)>,
}

impl SeriesRow {
    pub fn value(&self, series: &str) -> f64 {
        self.values
            .iter()
            .find(|(label, _)| label == series)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.values.iter().map(|(_, v)| v).sum()
    }
}

/// Keys a `ChartRow` writes itself; a series may not use them.
pub const RESERVED_SERIES_LABELS: [&str; 2] = ["name", "fullName"];

/// Flat record handed to a chart: display name plus one numeric field per
/// series.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub name: String,
    pub full_name: String,
    pub series: Vec<(String, f64)>,
}

impl Serialize for ChartRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.series.len() + 2))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("fullName", &self.full_name)?;
        for (label, value) in &self.series {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// One line of the `summary` table: how populated a year/metric slot is.
#[derive(Debug, Clone, Tabled)]
pub struct SliceSummaryRow {
    #[tabled(rename = "FinancialYear")]
    pub year: String,
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Customers")]
    pub customers: usize,
    #[tabled(rename = "Leader")]
    pub leader: String,
    #[tabled(rename = "Total")]
    pub total: String,
}
