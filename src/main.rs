// Entry point and high-level CLI flow.
//
// The CSV is loaded and normalized once; a failure there ends the run with a
// single "failed to load data" message. Each subcommand then builds its own
// view selection from the model and renders it as a table, JSON or CSV.
mod cli;

use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use std::io;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use cli::{Cli, Commands, OutputFormat};
use customer_dashboard::config::{load_config, DashboardConfig};
use customer_dashboard::error::Result;
use customer_dashboard::normalize::LoadReport;
use customer_dashboard::output::{self, DashboardExport, ViewExport};
use customer_dashboard::types::{NormalizedModel, SliceSummaryRow};
use customer_dashboard::views::{
    ChartView, MetricComparisonSelection, TopCustomersSelection, YearComparisonSelection,
};
use customer_dashboard::{loader, normalize, util};

fn init_logging(verbose: bool) {
    let env = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();
}

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(label) = &cli.label_column {
        config.label_column = label.clone();
    }
    if let Some(aggregate) = &cli.aggregate_label {
        config.aggregate_label = aggregate.clone();
    }
    if !cli.known_years.is_empty() {
        config.known_years = cli.known_years.clone();
    }
    config.validate()?;
    Ok(config)
}

fn load(cli: &Cli, config: &DashboardConfig) -> Result<(NormalizedModel, LoadReport)> {
    let table = loader::load_csv(&cli.csv)?;
    normalize::normalize(&table, config)
}

fn handle_summary(model: &NormalizedModel, report: &LoadReport) {
    println!(
        "Processing dataset... ({} rows read, {} customer rows, {} skipped)",
        util::format_int(report.total_rows),
        util::format_int(report.customer_rows),
        util::format_int(report.skipped_rows)
    );
    if report.dropped_values > 0 {
        println!(
            "Note: {} zero, negative or non-numeric values left out.",
            util::format_int(report.dropped_values)
        );
    }
    println!("Financial years: {}", model.years().join(", "));
    println!("Metrics: {}\n", model.metrics().join(", "));

    let rows: Vec<SliceSummaryRow> = model
        .years()
        .iter()
        .flat_map(|year| model.metrics().iter().map(move |metric| (year, metric)))
        .map(|(year, metric)| {
            let entries = model.entries(year, metric).unwrap_or(&[]);
            SliceSummaryRow {
                year: year.clone(),
                metric: metric.clone(),
                customers: entries.len(),
                leader: entries
                    .first()
                    .map(|e| util::shorten_name(&e.customer))
                    .unwrap_or_else(|| "-".to_string()),
                total: util::format_number(entries.iter().map(|e| e.value).sum(), 2),
            }
        })
        .collect();
    output::preview_table_rows(&rows);
}

fn emit<S>(selection: S, model: &NormalizedModel, format: OutputFormat) -> Result<()>
where
    S: ChartView + Serialize,
{
    match format {
        OutputFormat::Table => {
            let rows = selection.rows(model);
            output::preview_view(&selection, &rows);
        }
        OutputFormat::Json => {
            let export = ViewExport::build(selection, model);
            println!("{}", serde_json::to_string_pretty(&export)?);
        }
        OutputFormat::Csv => {
            output::write_chart_csv(
                io::stdout().lock(),
                &selection.series(),
                &selection.rows(model),
            )?;
        }
    }
    Ok(())
}

fn handle_export(
    model: &NormalizedModel,
    config: &DashboardConfig,
    source: &Path,
    out_dir: &Path,
) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;

    let top = ViewExport::build(TopCustomersSelection::new(model, config), model);
    let years = ViewExport::build(YearComparisonSelection::new(model, config), model);
    let metrics = ViewExport::build(MetricComparisonSelection::new(model, config), model);

    output::write_csv(&out_dir.join("top_customers.csv"), &top.series, &top.rows)?;
    output::write_csv(&out_dir.join("year_comparison.csv"), &years.series, &years.rows)?;
    output::write_csv(&out_dir.join("metric_comparison.csv"), &metrics.series, &metrics.rows)?;

    let bundle = DashboardExport {
        generated_at: Utc::now(),
        source: source.display().to_string(),
        years: model.years().to_vec(),
        metrics: model.metrics().to_vec(),
        top_customers: top,
        year_comparison: years,
        metric_comparison: metrics,
    };
    output::write_json(&out_dir.join("dashboard.json"), &bundle)?;
    println!("Outputs saved to {}", out_dir.display());
    Ok(())
}

fn run(
    cli: &Cli,
    config: &DashboardConfig,
    model: &NormalizedModel,
    report: &LoadReport,
) -> Result<()> {
    match &cli.command {
        Commands::Summary => handle_summary(model, report),
        Commands::Top { year, metric, top, format } => {
            let mut view = TopCustomersSelection::new(model, config);
            if let Some(year) = year {
                view.set_year(model, year)?;
            }
            if let Some(metric) = metric {
                view.set_metric(model, metric)?;
            }
            if let Some(n) = top {
                view.set_top_n(*n)?;
            }
            emit(view, model, *format)?;
        }
        Commands::Years { metric, years, top, format } => {
            let mut view = YearComparisonSelection::new(model, config);
            if !years.is_empty() {
                view.set_years(model, years)?;
            }
            if let Some(metric) = metric {
                view.set_metric(model, metric)?;
            }
            if let Some(n) = top {
                view.set_top_n(*n)?;
            }
            emit(view, model, *format)?;
        }
        Commands::Metrics { year, metrics, top, format } => {
            let mut view = MetricComparisonSelection::new(model, config);
            if let Some(year) = year {
                view.set_year(model, year)?;
            }
            if !metrics.is_empty() {
                view.set_metrics(model, metrics)?;
            }
            if let Some(n) = top {
                view.set_top_n(*n)?;
            }
            emit(view, model, *format)?;
        }
        Commands::Export { out_dir } => handle_export(model, config, &cli.csv, out_dir)?,
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let loaded = resolve_config(&cli)
        .and_then(|config| load(&cli, &config).map(|(model, report)| (config, model, report)));
    let (config, model, report) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            debug!("load failed: {e:?}");
            eprintln!("Error: failed to load data: {e}");
            std::process::exit(1);
        }
    };
    info!(
        "loaded {} entries across {} years and {} metrics",
        model.entry_count(),
        model.years().len(),
        model.metrics().len()
    );

    if let Err(e) = run(&cli, &config, &model, &report) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
