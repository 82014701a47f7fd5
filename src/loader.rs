use crate::error::{DashboardError, Result};
use crate::types::{CsvTable, RawRow};
use csv::{ReaderBuilder, Trim};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Read a CSV export from disk. The file must be valid UTF-8.
pub fn load_csv(path: &Path) -> Result<CsvTable> {
    info!("loading {}", path.display());
    let text = std::fs::read_to_string(path)?;
    parse_csv(&text)
}

/// Split CSV text into header order plus one `RawRow` per data line.
///
/// Lines may be shorter than the header (financial-year marker lines usually
/// carry only the label), so the reader is flexible about field counts.
pub fn parse_csv(text: &str) -> Result<CsvTable> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(DashboardError::EmptyInput);
    }
    let mut seen = HashSet::new();
    if let Some(dup) = headers
        .iter()
        .find(|h| !h.is_empty() && !seen.insert(h.as_str()))
    {
        return Err(DashboardError::DuplicateColumn(dup.clone()));
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let fields: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .filter(|(h, _)| !h.is_empty())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        rows.push(RawRow::new(fields));
    }
    if rows.is_empty() {
        return Err(DashboardError::EmptyInput);
    }

    debug!("parsed {} columns, {} rows", headers.len(), rows.len());
    Ok(CsvTable { headers, rows })
}
