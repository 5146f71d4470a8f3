//! Typed view over an optimal-dispatch table.
//!
//! Optional columns are read once into `Option` fields, and the band flags
//! are derived once from column presence, so the decomposer never probes
//! the raw table.

use serde::{Deserialize, Serialize};

use crate::columns;
use crate::error::Result;
use crate::table::{Cell, TimeSeriesTable};

/// Which optional band groups the decomposer should consult.
///
/// A flag set without the matching column is a caller error; the
/// decomposer then emits an all-zero band for that slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandFlags {
    /// Grid import is part of the stack.
    pub on_grid: bool,
    /// Grid export is drawn below the axis (needs `on_grid`).
    pub allow_grid_export: bool,
    /// Lost load tops the stack.
    pub lost_load: bool,
    /// Reserve columns are drawn as hatched bars.
    pub uncertainty: bool,
}

impl BandFlags {
    /// Derives flags from the columns a dispatch table actually carries.
    ///
    /// # Examples
    ///
    /// ```
    /// use autarky_viewer::dispatch::BandFlags;
    /// use autarky_viewer::table::TimeSeriesTable;
    ///
    /// let table = TimeSeriesTable::builder("d")
    ///     .with_column("Grid Import (kWh)", [1.0])
    ///     .with_column("Expected Shortfall (kWh)", [0.0])
    ///     .build()
    ///     .unwrap();
    /// let flags = BandFlags::from_table(&table);
    /// assert!(flags.on_grid && flags.uncertainty);
    /// assert!(!flags.allow_grid_export && !flags.lost_load);
    /// ```
    pub fn from_table(table: &TimeSeriesTable) -> Self {
        Self {
            on_grid: table.has_column(columns::GRID_IMPORT),
            allow_grid_export: table.has_column(columns::GRID_EXPORT),
            lost_load: table.has_column(columns::LOST_LOAD),
            uncertainty: columns::UNCERTAINTY_MARKERS
                .iter()
                .any(|c| table.has_column(c)),
        }
    }
}

/// Battery discharge and charge, present only as a pair.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryFlows {
    pub discharge: Vec<f64>,
    pub charge: Vec<f64>,
}

/// Dispatch time series with optional columns made explicit.
///
/// Missing or non-numeric cells read as zero energy.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchSeries {
    pub solar: Vec<f64>,
    pub generator: Vec<f64>,
    pub load: Vec<f64>,
    pub battery: Option<BatteryFlows>,
    pub grid_import: Option<Vec<f64>>,
    pub grid_export: Option<Vec<f64>>,
    pub lost_load: Option<Vec<f64>>,
    pub battery_reserve: Option<Vec<f64>>,
    pub generator_reserve: Option<Vec<f64>>,
}

impl DispatchSeries {
    /// Reads the dispatch columns out of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingColumn`] when solar production,
    /// generator production, or load demand is absent.
    pub fn from_table(table: &TimeSeriesTable) -> Result<Self> {
        let solar = energy(table.require_column(columns::SOLAR_PRODUCTION)?);
        let generator = energy(table.require_column(columns::GENERATOR_PRODUCTION)?);
        let load = energy(table.require_column(columns::LOAD_DEMAND)?);

        let optional = |name: &str| table.column(name).map(energy);

        let battery = match (
            optional(columns::BATTERY_DISCHARGE),
            optional(columns::BATTERY_CHARGE),
        ) {
            (Some(discharge), Some(charge)) => Some(BatteryFlows { discharge, charge }),
            _ => None,
        };

        Ok(Self {
            solar,
            generator,
            load,
            battery,
            grid_import: optional(columns::GRID_IMPORT),
            grid_export: optional(columns::GRID_EXPORT),
            lost_load: optional(columns::LOST_LOAD),
            battery_reserve: optional(columns::BATTERY_RESERVE),
            generator_reserve: optional(columns::GENERATOR_RESERVE),
        })
    }

    /// Number of timesteps.
    pub fn len(&self) -> usize {
        self.load.len()
    }

    pub fn is_empty(&self) -> bool {
        self.load.is_empty()
    }
}

fn energy(cells: &[Cell]) -> Vec<f64> {
    cells.iter().map(|c| c.as_f64().unwrap_or(0.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn base_table() -> TimeSeriesTable {
        TimeSeriesTable::builder("dispatch")
            .with_column(columns::SOLAR_PRODUCTION, [1.0, 2.0])
            .with_column(columns::GENERATOR_PRODUCTION, [0.5, 0.0])
            .with_column(columns::LOAD_DEMAND, [1.5, 2.0])
            .build()
            .expect("valid table")
    }

    #[test]
    fn required_columns_only() {
        let series = DispatchSeries::from_table(&base_table()).expect("valid table");
        assert_eq!(series.len(), 2);
        assert!(series.battery.is_none());
        assert!(series.grid_import.is_none());
        assert_eq!(BandFlags::from_table(&base_table()), BandFlags::default());
    }

    #[test]
    fn missing_required_column_is_named() {
        let table = TimeSeriesTable::builder("season_1.csv")
            .with_column(columns::SOLAR_PRODUCTION, [1.0])
            .with_column(columns::LOAD_DEMAND, [1.0])
            .build()
            .expect("valid table");
        match DispatchSeries::from_table(&table) {
            Err(Error::MissingColumn { column, table }) => {
                assert_eq!(column, columns::GENERATOR_PRODUCTION);
                assert_eq!(table, "season_1.csv");
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn battery_requires_both_columns() {
        let table = base_table()
            .into_builder()
            .with_column(columns::BATTERY_DISCHARGE, [1.0, 0.0])
            .build()
            .expect("valid table");
        let series = DispatchSeries::from_table(&table).expect("valid");
        assert!(series.battery.is_none());

        let table = table
            .into_builder()
            .with_column(columns::BATTERY_CHARGE, [0.0, 1.0])
            .build()
            .expect("valid table");
        let series = DispatchSeries::from_table(&table).expect("valid");
        assert!(series.battery.is_some());
    }

    #[test]
    fn missing_cells_read_as_zero() {
        let table = TimeSeriesTable::builder("d")
            .with_column(columns::SOLAR_PRODUCTION, [Some(1.0), None])
            .with_column(columns::GENERATOR_PRODUCTION, [0.0, 0.0])
            .with_column(columns::LOAD_DEMAND, [1.0, 1.0])
            .build()
            .expect("valid table");
        let series = DispatchSeries::from_table(&table).expect("valid");
        assert_eq!(series.solar, vec![1.0, 0.0]);
    }

    #[test]
    fn reserve_columns_set_uncertainty() {
        let table = base_table()
            .into_builder()
            .with_column(columns::GENERATOR_RESERVE, [0.1, 0.2])
            .build()
            .expect("valid table");
        assert!(BandFlags::from_table(&table).uncertainty);
    }
}
