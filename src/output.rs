use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::error::Result;
use crate::types::{ChartRow, NormalizedModel};
use crate::util::format_currency;
use crate::views::ChartView;

pub const NO_DATA: &str = "No data available";

/// One rendered view: what was selected and the flat rows for its chart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewExport<S: Serialize> {
    pub title: String,
    pub selection: S,
    pub series: Vec<String>,
    pub rows: Vec<ChartRow>,
}

impl<S: Serialize + ChartView> ViewExport<S> {
    pub fn build(selection: S, model: &NormalizedModel) -> Self {
        Self {
            title: selection.title(),
            series: selection.series(),
            rows: selection.rows(model),
            selection,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardExport<A: Serialize, B: Serialize, C: Serialize> {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub years: Vec<String>,
    pub metrics: Vec<String>,
    pub top_customers: ViewExport<A>,
    pub year_comparison: ViewExport<B>,
    pub metric_comparison: ViewExport<C>,
}

/// Markdown table with one currency column per series.
pub fn chart_table(series: &[String], rows: &[ChartRow]) -> String {
    if rows.is_empty() {
        return NO_DATA.to_string();
    }
    let mut builder = Builder::default();
    let mut header = vec!["Customer".to_string()];
    header.extend(series.iter().cloned());
    builder.push_record(header);
    for row in rows {
        let mut record = vec![row.name.clone()];
        record.extend(row.series.iter().map(|(_, v)| format_currency(*v)));
        builder.push_record(record);
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn preview_view(view: &dyn ChartView, rows: &[ChartRow]) {
    println!("{}\n", view.title());
    println!("{}\n", chart_table(&view.series(), rows));
}

pub fn preview_table_rows<T>(rows: &[T])
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        println!("{}\n", NO_DATA);
        return;
    }
    let table_str = Table::new(rows.iter().cloned()).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// CSV with `name`, `fullName` and one raw numeric column per series.
pub fn write_chart_csv<W: Write>(writer: W, series: &[String], rows: &[ChartRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["name".to_string(), "fullName".to_string()];
    header.extend(series.iter().cloned());
    wtr.write_record(&header)?;
    for row in rows {
        let mut record = vec![row.name.clone(), row.full_name.clone()];
        record.extend(row.series.iter().map(|(_, v)| v.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv(path: &Path, series: &[String], rows: &[ChartRow]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_chart_csv(file, series, rows)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}
