//! Analytical views over Autarky energy-system optimization results.
//!
//! The core components are pure transformations over [`table::TimeSeriesTable`]:
//! [`flow::decompose`] turns a dispatch table into stacked energy-flow bands,
//! [`compare::compare`] joins two projects' summary tables with a tolerance,
//! and [`metrics`] reduces forecast-error grids to seasonal statistics.
//! [`loader::ResultLoader`] finds and parses the files they consume.

pub mod columns;
pub mod compare;
pub mod config;
pub mod dispatch;
mod error;
pub mod flow;
pub mod io;
pub mod loader;
pub mod metrics;
pub mod palette;
pub mod parameters;
pub mod reporting;
pub mod season;
pub mod summary;
pub mod table;

pub use error::{Error, Result};
