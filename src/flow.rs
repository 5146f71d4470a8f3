//! Layered energy-flow decomposition of a dispatch table.
//!
//! Outflow bands (energy serving demand) stack upward from zero on one
//! running accumulator; inflow bands (charging, export) stack downward on
//! a second accumulator. Reserve bands are side annotations that touch
//! neither. Stacking order, bottom to top:
//!
//! 1. Solar Production
//! 2. Battery Discharge (outflow) / Battery Charge (inflow), from the net
//!    battery flow
//! 3. Generator Production
//! 4. Grid Import (outflow), then Grid Export (inflow)
//! 5. Battery Reserve / Generator Reserve (unstacked bars)
//! 6. Lost Load, the unmet residual on top
//!
//! The load demand column becomes a separate reference curve.

use serde::Serialize;
use tracing::debug;

use crate::dispatch::{BandFlags, DispatchSeries};
use crate::error::Result;
use crate::table::TimeSeriesTable;

/// How a band participates in the picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BandRole {
    /// Stacked above the axis on the outflow accumulator.
    StackedOutflow,
    /// Stacked below the axis on the inflow accumulator.
    StackedInflow,
    /// Drawn as a standalone bar from zero.
    DiscreteReserve,
}

/// Color identity of a band; the renderer maps it to an actual color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BandColor {
    Solar,
    Battery,
    Generator,
    Grid,
    LostLoad,
    Load,
}

/// Fill pattern identity distinguishing reserve bars from solid fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillPattern {
    ForwardHatch,
    BackHatch,
}

/// One layer of the decomposition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowBand {
    pub name: &'static str,
    pub role: BandRole,
    pub color: BandColor,
    pub pattern: Option<FillPattern>,
    /// Accumulator value beneath this band, per timestep (zero for reserves).
    pub baseline: Vec<f64>,
    /// Non-negative band thickness, per timestep.
    pub magnitude: Vec<f64>,
}

impl FlowBand {
    /// Plot-space `(lower, upper)` edges with the role's sign applied.
    ///
    /// Inflow bands hang below the axis, so both edges are negated.
    pub fn edges(&self) -> (Vec<f64>, Vec<f64>) {
        let sign = match self.role {
            BandRole::StackedInflow => -1.0,
            BandRole::StackedOutflow | BandRole::DiscreteReserve => 1.0,
        };
        self.baseline
            .iter()
            .zip(&self.magnitude)
            .map(|(b, m)| (sign * b, sign * (b + m)))
            .unzip()
    }
}

/// The unstacked demand curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceCurve {
    pub name: &'static str,
    pub color: BandColor,
    pub values: Vec<f64>,
}

/// Ordered bands plus the demand reference curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowDecomposition {
    pub timesteps: usize,
    pub bands: Vec<FlowBand>,
    pub demand: ReferenceCurve,
}

impl FlowDecomposition {
    pub fn band(&self, name: &str) -> Option<&FlowBand> {
        self.bands.iter().find(|b| b.name == name)
    }

    pub fn bands_with_role(&self, role: BandRole) -> impl Iterator<Item = &FlowBand> {
        self.bands.iter().filter(move |b| b.role == role)
    }

    /// Sum of outflow magnitudes per timestep (the top of the stack).
    pub fn outflow_total(&self) -> Vec<f64> {
        self.role_total(BandRole::StackedOutflow)
    }

    /// Sum of inflow magnitudes per timestep.
    pub fn inflow_total(&self) -> Vec<f64> {
        self.role_total(BandRole::StackedInflow)
    }

    fn role_total(&self, role: BandRole) -> Vec<f64> {
        let mut total = vec![0.0; self.timesteps];
        for band in self.bands_with_role(role) {
            for (t, m) in total.iter_mut().zip(&band.magnitude) {
                *t += m;
            }
        }
        total
    }
}

#[derive(Clone, Copy)]
enum Stack {
    Outflow,
    Inflow,
}

/// Running per-timestep accumulators for the two stacks.
struct Stacker {
    bands: Vec<FlowBand>,
    outflow: Vec<f64>,
    inflow: Vec<f64>,
}

impl Stacker {
    fn new(timesteps: usize) -> Self {
        Self {
            bands: Vec::new(),
            outflow: vec![0.0; timesteps],
            inflow: vec![0.0; timesteps],
        }
    }

    fn push(&mut self, name: &'static str, stack: Stack, color: BandColor, values: Vec<f64>) {
        let magnitude = clamp_non_negative(values, self.outflow.len());
        let (acc, role) = match stack {
            Stack::Outflow => (&mut self.outflow, BandRole::StackedOutflow),
            Stack::Inflow => (&mut self.inflow, BandRole::StackedInflow),
        };
        let baseline = acc.clone();
        for (a, m) in acc.iter_mut().zip(&magnitude) {
            *a += m;
        }
        self.bands.push(FlowBand {
            name,
            role,
            color,
            pattern: None,
            baseline,
            magnitude,
        });
    }

    fn push_reserve(
        &mut self,
        name: &'static str,
        color: BandColor,
        pattern: FillPattern,
        values: Vec<f64>,
    ) {
        let magnitude = clamp_non_negative(values, self.outflow.len());
        self.bands.push(FlowBand {
            name,
            role: BandRole::DiscreteReserve,
            color,
            pattern: Some(pattern),
            baseline: vec![0.0; magnitude.len()],
            magnitude,
        });
    }
}

/// Forces every entry to a finite value >= 0 and the series to `len` entries.
fn clamp_non_negative(mut values: Vec<f64>, len: usize) -> Vec<f64> {
    values.resize(len, 0.0);
    for v in &mut values {
        if !v.is_finite() || *v < 0.0 {
            *v = 0.0;
        }
    }
    values
}

/// Decomposes a dispatch table into stacked bands.
///
/// `flags` is normally [`BandFlags::from_table`] of the same table.
///
/// # Errors
///
/// Returns [`crate::Error::MissingColumn`] if solar production, generator
/// production, or load demand is absent. No other validation is performed.
///
/// # Examples
///
/// ```
/// use autarky_viewer::dispatch::BandFlags;
/// use autarky_viewer::flow::decompose;
/// use autarky_viewer::table::TimeSeriesTable;
///
/// let table = TimeSeriesTable::builder("d")
///     .with_column("Solar Production (kWh)", [5.0])
///     .with_column("Generator Production (kWh)", [0.0])
///     .with_column("Load Demand (kWh)", [5.0])
///     .build()
///     .unwrap();
/// let result = decompose(&table, BandFlags::default()).unwrap();
/// assert_eq!(result.band("Solar Production").unwrap().magnitude, vec![5.0]);
/// assert_eq!(result.demand.values, vec![5.0]);
/// ```
pub fn decompose(table: &TimeSeriesTable, flags: BandFlags) -> Result<FlowDecomposition> {
    let series = DispatchSeries::from_table(table)?;
    let result = decompose_series(&series, flags);
    debug!(
        table = table.name(),
        timesteps = result.timesteps,
        bands = result.bands.len(),
        "decomposed dispatch"
    );
    Ok(result)
}

/// Decomposes already-typed dispatch series.
pub fn decompose_series(series: &DispatchSeries, flags: BandFlags) -> FlowDecomposition {
    let n = series.len();
    let mut stack = Stacker::new(n);

    stack.push(
        "Solar Production",
        Stack::Outflow,
        BandColor::Solar,
        series.solar.clone(),
    );

    if let Some(battery) = &series.battery {
        let net: Vec<f64> = battery
            .discharge
            .iter()
            .zip(&battery.charge)
            .map(|(d, c)| d - c)
            .collect();
        let discharge = net.iter().map(|v| v.max(0.0)).collect();
        let charge = net.iter().map(|v| (-v).max(0.0)).collect();
        stack.push(
            "Battery Discharge",
            Stack::Outflow,
            BandColor::Battery,
            discharge,
        );
        stack.push(
            "Battery Charge",
            Stack::Inflow,
            BandColor::Battery,
            charge,
        );
    }

    stack.push(
        "Generator Production",
        Stack::Outflow,
        BandColor::Generator,
        series.generator.clone(),
    );

    if flags.on_grid {
        stack.push(
            "Grid Import",
            Stack::Outflow,
            BandColor::Grid,
            series.grid_import.clone().unwrap_or_default(),
        );
        if flags.allow_grid_export {
            if let Some(export) = &series.grid_export {
                stack.push(
                    "Grid Export",
                    Stack::Inflow,
                    BandColor::Grid,
                    export.clone(),
                );
            }
        }
    }

    if flags.uncertainty {
        if let Some(reserve) = &series.battery_reserve {
            stack.push_reserve(
                "Battery Reserve",
                BandColor::Battery,
                FillPattern::ForwardHatch,
                reserve.clone(),
            );
        }
        if let Some(reserve) = &series.generator_reserve {
            stack.push_reserve(
                "Generator Reserve",
                BandColor::Generator,
                FillPattern::BackHatch,
                reserve.clone(),
            );
        }
    }

    if flags.lost_load {
        stack.push(
            "Lost Load",
            Stack::Outflow,
            BandColor::LostLoad,
            series.lost_load.clone().unwrap_or_default(),
        );
    }

    FlowDecomposition {
        timesteps: n,
        bands: stack.bands,
        demand: ReferenceCurve {
            name: "Load",
            color: BandColor::Load,
            values: series.load.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns;

    fn full_table() -> TimeSeriesTable {
        TimeSeriesTable::builder("dispatch")
            .with_column(columns::SOLAR_PRODUCTION, [3.0, 0.0, 1.0])
            .with_column(columns::BATTERY_DISCHARGE, [0.0, 2.0, 1.0])
            .with_column(columns::BATTERY_CHARGE, [1.0, 0.0, 1.0])
            .with_column(columns::GENERATOR_PRODUCTION, [0.0, 1.0, 0.5])
            .with_column(columns::GRID_IMPORT, [0.5, 0.5, 0.0])
            .with_column(columns::GRID_EXPORT, [0.5, 0.0, 0.0])
            .with_column(columns::BATTERY_RESERVE, [0.2, 0.2, 0.2])
            .with_column(columns::GENERATOR_RESERVE, [0.1, 0.0, 0.1])
            .with_column(columns::LOST_LOAD, [0.0, 0.5, 0.5])
            .with_column(columns::LOAD_DEMAND, [2.0, 4.0, 2.0])
            .build()
            .expect("valid table")
    }

    fn names(result: &FlowDecomposition) -> Vec<&'static str> {
        result.bands.iter().map(|b| b.name).collect()
    }

    /// The generator column is required, so a solar-only table still yields
    /// an all-zero Generator Production band beside Solar Production.
    #[test]
    fn solar_only_scenario() {
        let table = TimeSeriesTable::builder("d")
            .with_column(columns::SOLAR_PRODUCTION, [5.0])
            .with_column(columns::GENERATOR_PRODUCTION, [0.0])
            .with_column(columns::LOAD_DEMAND, [5.0])
            .build()
            .expect("valid table");
        let result = decompose(&table, BandFlags::from_table(&table)).expect("valid");
        assert_eq!(names(&result), vec!["Solar Production", "Generator Production"]);
        assert_eq!(result.band("Solar Production").map(|b| b.magnitude.clone()), Some(vec![5.0]));
        assert_eq!(result.demand.values, vec![5.0]);
        assert_eq!(result.bands_with_role(BandRole::StackedInflow).count(), 0);
        assert_eq!(result.bands_with_role(BandRole::DiscreteReserve).count(), 0);
    }

    #[test]
    fn fixed_stacking_order() {
        let table = full_table();
        let result = decompose(&table, BandFlags::from_table(&table)).expect("valid");
        assert_eq!(
            names(&result),
            vec![
                "Solar Production",
                "Battery Discharge",
                "Battery Charge",
                "Generator Production",
                "Grid Import",
                "Grid Export",
                "Battery Reserve",
                "Generator Reserve",
                "Lost Load",
            ]
        );
    }

    #[test]
    fn net_battery_flow_splits_into_discharge_and_charge() {
        let table = full_table();
        let result = decompose(&table, BandFlags::from_table(&table)).expect("valid");
        let discharge = result.band("Battery Discharge").expect("present");
        let charge = result.band("Battery Charge").expect("present");
        assert_eq!(discharge.magnitude, vec![0.0, 2.0, 0.0]);
        assert_eq!(charge.magnitude, vec![1.0, 0.0, 0.0]);
        assert_eq!(discharge.role, BandRole::StackedOutflow);
        assert_eq!(charge.role, BandRole::StackedInflow);
    }

    #[test]
    fn accumulators_are_shared_per_direction() {
        let table = full_table();
        let result = decompose(&table, BandFlags::from_table(&table)).expect("valid");

        let generator = result.band("Generator Production").expect("present");
        // solar + net discharge beneath the generator
        assert_eq!(generator.baseline, vec![3.0, 2.0, 1.0]);

        let lost = result.band("Lost Load").expect("present");
        // solar + discharge + generator + grid import
        assert_eq!(lost.baseline, vec![3.5, 3.5, 1.5]);

        let export = result.band("Grid Export").expect("present");
        // battery charge beneath the export
        assert_eq!(export.baseline, vec![1.0, 0.0, 0.0]);
        let (lower, upper) = export.edges();
        assert_eq!(lower, vec![-1.0, 0.0, 0.0]);
        assert_eq!(upper, vec![-1.5, 0.0, 0.0]);
    }

    #[test]
    fn reserves_are_not_stacked() {
        let table = full_table();
        let result = decompose(&table, BandFlags::from_table(&table)).expect("valid");
        let reserve = result.band("Battery Reserve").expect("present");
        assert_eq!(reserve.baseline, vec![0.0; 3]);
        assert_eq!(reserve.pattern, Some(FillPattern::ForwardHatch));
        assert_eq!(
            result.band("Generator Reserve").and_then(|b| b.pattern),
            Some(FillPattern::BackHatch)
        );
        let outflow = result.outflow_total();
        assert_eq!(outflow, vec![3.5, 4.0, 2.0]);
    }

    #[test]
    fn flags_gate_optional_bands() {
        let table = full_table();
        let result = decompose(&table, BandFlags::default()).expect("valid");
        assert_eq!(
            names(&result),
            vec![
                "Solar Production",
                "Battery Discharge",
                "Battery Charge",
                "Generator Production",
            ]
        );
    }

    #[test]
    fn export_requires_grid_flag() {
        let table = full_table();
        let flags = BandFlags {
            on_grid: false,
            allow_grid_export: true,
            ..BandFlags::from_table(&table)
        };
        let result = decompose(&table, flags).expect("valid");
        assert!(result.band("Grid Import").is_none());
        assert!(result.band("Grid Export").is_none());
    }

    #[test]
    fn flag_without_column_yields_zero_band() {
        let table = TimeSeriesTable::builder("d")
            .with_column(columns::SOLAR_PRODUCTION, [1.0, 1.0])
            .with_column(columns::GENERATOR_PRODUCTION, [0.0, 0.0])
            .with_column(columns::LOAD_DEMAND, [1.0, 1.0])
            .build()
            .expect("valid table");
        let flags = BandFlags {
            on_grid: true,
            allow_grid_export: true,
            lost_load: true,
            uncertainty: true,
        };
        let result = decompose(&table, flags).expect("valid");
        assert_eq!(
            result.band("Grid Import").map(|b| b.magnitude.clone()),
            Some(vec![0.0, 0.0])
        );
        assert_eq!(
            result.band("Lost Load").map(|b| b.magnitude.clone()),
            Some(vec![0.0, 0.0])
        );
        assert!(result.band("Grid Export").is_none());
        assert!(result.band("Battery Reserve").is_none());
    }

    #[test]
    fn negative_source_values_clamp_to_zero() {
        let table = TimeSeriesTable::builder("d")
            .with_column(columns::SOLAR_PRODUCTION, [-1.0, 2.0])
            .with_column(columns::GENERATOR_PRODUCTION, [0.0, 0.0])
            .with_column(columns::LOAD_DEMAND, [1.0, 1.0])
            .build()
            .expect("valid table");
        let result = decompose(&table, BandFlags::default()).expect("valid");
        assert_eq!(
            result.band("Solar Production").map(|b| b.magnitude.clone()),
            Some(vec![0.0, 2.0])
        );
    }

    #[test]
    fn missing_required_column_fails() {
        let table = TimeSeriesTable::builder("d")
            .with_column(columns::SOLAR_PRODUCTION, [1.0])
            .build()
            .expect("valid table");
        assert!(decompose(&table, BandFlags::default()).is_err());
    }
}
