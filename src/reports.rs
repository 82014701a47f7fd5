// Ranking queries behind the three dashboard views. All of them read the
// normalized model and never modify it.
use crate::types::{CustomerEntry, NormalizedModel, SeriesRow};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// The `n` highest entries of one year/metric slice.
///
/// Unknown keys and empty slices both give an empty slice; `n` larger than
/// the slice gives the whole slice.
pub fn top_n<'m>(
    model: &'m NormalizedModel,
    year: &str,
    metric: &str,
    n: usize,
) -> &'m [CustomerEntry] {
    let entries = model.entries(year, metric).unwrap_or(&[]);
    &entries[..n.min(entries.len())]
}

// customer -> value for one slice; the first (highest) entry wins on
// duplicate names.
fn value_lookup<'m>(
    model: &'m NormalizedModel,
    year: &str,
    metric: &str,
) -> HashMap<&'m str, f64> {
    let mut lookup = HashMap::new();
    for e in model.entries(year, metric).unwrap_or(&[]) {
        lookup.entry(e.customer.as_str()).or_insert(e.value);
    }
    lookup
}

/// Year-over-year comparison for one metric.
///
/// Takes the union of every selected year's top `n` customers, then fills in
/// each customer's full-slice value for every year (0 when absent) and orders
/// by the cross-year sum. Customers with equal sums keep the order in which
/// they were first met (year selection order, then rank).
pub fn merge_across_years(
    model: &NormalizedModel,
    years: &[String],
    metric: &str,
    n: usize,
) -> Vec<SeriesRow> {
    let mut seen = HashSet::new();
    let customers: Vec<&str> = years
        .iter()
        .flat_map(|year| top_n(model, year, metric, n))
        .map(|e| e.customer.as_str())
        .filter(|c| seen.insert(*c))
        .collect();

    let lookups: Vec<(&String, HashMap<&str, f64>)> = years
        .iter()
        .map(|year| (year, value_lookup(model, year, metric)))
        .collect();

    let mut rows: Vec<SeriesRow> = customers
        .into_iter()
        .map(|customer| SeriesRow {
            customer: customer.to_string(),
            values: lookups
                .iter()
                .map(|(year, lookup)| {
                    ((*year).clone(), lookup.get(customer).copied().unwrap_or(0.0))
                })
                .collect(),
        })
        .collect();
    rows.sort_by(|a, b| b.total().partial_cmp(&a.total()).unwrap_or(Ordering::Equal));
    rows
}

/// Positional score per customer across several metrics of one year.
///
/// A customer at zero-based position `i` of a metric's top `n` earns `n - i`
/// for that metric. Result is ordered by score, highest first; ties keep
/// first-encountered order (metric selection order, then rank).
pub fn metric_scores(
    model: &NormalizedModel,
    year: &str,
    metrics: &[String],
    n: usize,
) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut scores: Vec<(&str, usize)> = Vec::new();
    for metric in metrics {
        for (i, e) in top_n(model, year, metric, n).iter().enumerate() {
            let slot = *index.entry(e.customer.as_str()).or_insert_with(|| {
                scores.push((e.customer.as_str(), 0));
                scores.len() - 1
            });
            scores[slot].1 += n - i;
        }
    }
    scores.sort_by(|a, b| b.1.cmp(&a.1));
    scores
        .into_iter()
        .map(|(customer, score)| (customer.to_string(), score))
        .collect()
}

/// Multi-metric comparison for one year: the `n` best positional scorers,
/// each with its raw value for every selected metric (0 when absent).
pub fn merge_across_metrics(
    model: &NormalizedModel,
    year: &str,
    metrics: &[String],
    n: usize,
) -> Vec<SeriesRow> {
    let lookups: Vec<(&String, HashMap<&str, f64>)> = metrics
        .iter()
        .map(|metric| (metric, value_lookup(model, year, metric)))
        .collect();

    metric_scores(model, year, metrics, n)
        .into_iter()
        .take(n)
        .map(|(customer, _)| {
            let values = lookups
                .iter()
                .map(|(metric, lookup)| {
                    ((*metric).clone(), lookup.get(customer.as_str()).copied().unwrap_or(0.0))
                })
                .collect();
            SeriesRow { customer, values }
        })
        .collect()
}
