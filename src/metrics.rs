//! Forecast-error statistics per season.
//!
//! An error table is a simulations x timesteps grid for one season: each
//! column is one simulation, each row one timestep.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::season::Season;
use crate::table::TimeSeriesTable;

/// Aggregate error statistics of one season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonErrorMetrics {
    /// Root-mean-square error.
    pub rmse: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Mean error (positive = over-forecast).
    pub bias: f64,
    /// Number of numeric samples aggregated.
    pub samples: usize,
}

impl fmt::Display for SeasonErrorMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RMSE={:.3}  MAE={:.3}  Bias={:+.3}  (n={})",
            self.rmse, self.mae, self.bias, self.samples
        )
    }
}

/// RMSE, MAE and bias over every numeric cell of `table`.
///
/// Row and column structure is ignored. Returns `None` when the table holds
/// no numeric samples, so partially populated projects still report the
/// seasons they have.
///
/// # Examples
///
/// ```
/// use autarky_viewer::metrics::season_metrics;
/// use autarky_viewer::table::TimeSeriesTable;
///
/// let errors = TimeSeriesTable::builder("load_errors_1")
///     .with_column("sim_1", [1.0, 2.0])
///     .with_column("sim_2", [-1.0, -2.0])
///     .build()
///     .unwrap();
/// let m = season_metrics(&errors).unwrap();
/// assert!((m.rmse - 2.5_f64.sqrt()).abs() < 1e-12);
/// assert_eq!(m.mae, 1.5);
/// assert_eq!(m.bias, 0.0);
/// ```
pub fn season_metrics(table: &TimeSeriesTable) -> Option<SeasonErrorMetrics> {
    let mut n = 0_usize;
    let mut sq_sum = 0.0_f64;
    let mut abs_sum = 0.0_f64;
    let mut sum = 0.0_f64;

    for e in table.cells().filter_map(|c| c.as_f64()) {
        sq_sum += e * e;
        abs_sum += e.abs();
        sum += e;
        n += 1;
    }

    if n == 0 {
        trace!(table = table.name(), "no numeric error samples");
        return None;
    }

    let count = n as f64;
    Some(SeasonErrorMetrics {
        rmse: (sq_sum / count).sqrt(),
        mae: abs_sum / count,
        bias: sum / count,
        samples: n,
    })
}

/// Mean absolute error of each simulation (column) across its timesteps.
///
/// The result has one entry per column, in column order. A column without
/// numeric samples yields `NaN`. Returns `None` for an empty table.
pub fn mae_per_simulation(table: &TimeSeriesTable) -> Option<Vec<f64>> {
    if table.is_empty() {
        return None;
    }
    let curve = table
        .columns()
        .map(|(_, cells)| {
            let (abs_sum, n) = cells
                .iter()
                .filter_map(|c| c.as_f64())
                .fold((0.0_f64, 0_usize), |(s, n), e| (s + e.abs(), n + 1));
            if n == 0 { f64::NAN } else { abs_sum / n as f64 }
        })
        .collect();
    Some(curve)
}

/// Per-simulation MAE values of one season, aligned to simulation index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaeCurve {
    pub season: Season,
    pub values: Vec<f64>,
}

impl MaeCurve {
    /// `(simulation number, MAE)` points, numbered from 1.
    pub fn points(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values.iter().enumerate().map(|(i, v)| (i + 1, *v))
    }
}

/// Forecast quantity whose errors were sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorFamily {
    Load,
    Solar,
    Wind,
}

impl ErrorFamily {
    /// File name prefix; season `i` lives in `{prefix}_{i}.csv`.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Load => "load_errors",
            Self::Solar => "solar_errors",
            Self::Wind => "wind_errors",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Load => "Load Forecast",
            Self::Solar => "Solar Forecast",
            Self::Wind => "Wind Forecast",
        }
    }
}

/// Metrics and MAE curve of one season that had data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonEntry {
    pub season: Season,
    pub metrics: SeasonErrorMetrics,
    pub mae_curve: MaeCurve,
}

/// Error statistics of one family over the seasons that have data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalErrorReport {
    pub family: ErrorFamily,
    pub seasons: Vec<SeasonEntry>,
}

impl SeasonalErrorReport {
    /// Builds the report from the season tables that were found.
    ///
    /// Seasons are computed independently; empty tables are skipped.
    pub fn from_tables<'a>(
        family: ErrorFamily,
        tables: impl IntoIterator<Item = (Season, &'a TimeSeriesTable)>,
    ) -> Self {
        let mut seasons: Vec<SeasonEntry> = tables
            .into_iter()
            .filter_map(|(season, table)| {
                let metrics = season_metrics(table)?;
                let values = mae_per_simulation(table)?;
                Some(SeasonEntry {
                    season,
                    metrics,
                    mae_curve: MaeCurve { season, values },
                })
            })
            .collect();
        seasons.sort_by_key(|e| e.season);
        debug!(family = family.prefix(), seasons = seasons.len(), "error report built");
        Self { family, seasons }
    }

    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }

    pub fn season(&self, season: Season) -> Option<&SeasonEntry> {
        self.seasons.iter().find(|e| e.season == season)
    }
}

impl fmt::Display for SeasonalErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--- {} Errors ---", self.family.title())?;
        if self.seasons.is_empty() {
            return write!(f, "\nno error data available");
        }
        for entry in &self.seasons {
            write!(f, "\n{:<7} {}", entry.season.name(), entry.metrics)?;
        }
        Ok(())
    }
}
