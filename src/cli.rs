use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "customer-dashboard",
    version,
    about = "Explore customer financial metrics by financial year."
)]
pub struct Cli {
    /// CSV export with a financial-year label column and one column per metric
    pub csv: PathBuf,

    /// JSON config file (label column, aggregate label, known years, top-N options)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Name of the label column
    #[arg(long, global = true)]
    pub label_column: Option<String>,

    /// Label of the summary row/column to skip
    #[arg(long, global = true)]
    pub aggregate_label: Option<String>,

    /// Financial-year section label (repeat for each year, in display order)
    #[arg(long = "known-year", global = true)]
    pub known_years: Vec<String>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show what was loaded: years, metrics and customers per slot.
    Summary,
    /// Top customers for one year and metric.
    Top {
        /// Financial year (default: first known year)
        #[arg(long)]
        year: Option<String>,
        /// Metric column (default: first metric)
        #[arg(long)]
        metric: Option<String>,
        /// How many customers
        #[arg(long)]
        top: Option<usize>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Compare one metric across financial years.
    Years {
        /// Metric column (default: first metric)
        #[arg(long)]
        metric: Option<String>,
        /// Year to include (repeatable, default: all known years)
        #[arg(long = "year")]
        years: Vec<String>,
        /// How many customers per year
        #[arg(long)]
        top: Option<usize>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Compare several metrics within one financial year.
    Metrics {
        /// Financial year (default: first known year)
        #[arg(long)]
        year: Option<String>,
        /// Metric to include (repeatable, default: first three metrics)
        #[arg(long = "metric")]
        metrics: Vec<String>,
        /// How many customers
        #[arg(long)]
        top: Option<usize>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Write the three default views as CSV plus a JSON bundle.
    Export {
        /// Output directory (created if missing)
        #[arg(long)]
        out_dir: PathBuf,
    },
}
