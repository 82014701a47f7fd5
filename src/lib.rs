//! Customer financial metrics dashboard.
//!
//! A spreadsheet export lists customers under financial-year marker rows,
//! with one column per metric and a trailing "Grand Total" row. [`loader`]
//! reads it, [`normalize`] turns it into a year -> metric -> ranked entries
//! model, [`reports`] runs the ranking queries and [`views`] holds the
//! per-view selections that feed [`output`].
pub mod config;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;
pub mod views;
