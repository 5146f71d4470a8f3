//! Plain-text reports for terminal output.

use std::io::{self, Write};

use crate::compare::{ComparisonSection, DiffSummary};
use crate::flow::{BandRole, FlowDecomposition};
use crate::metrics::SeasonalErrorReport;
use crate::palette::Palette;
use crate::parameters::{ProjectParameters, text};
use crate::season::Season;
use crate::summary::{CostSummary, IndicatorRow, SizingRow};

/// Per-band energy totals and peaks of a decomposition.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_flow_report(
    out: &mut impl Write,
    project: &str,
    season: Option<Season>,
    decomposition: &FlowDecomposition,
    palette: &Palette,
) -> io::Result<()> {
    match season {
        Some(s) => writeln!(out, "--- Dispatch: {project} ({s}) ---")?,
        None => writeln!(out, "--- Dispatch: {project} ---")?,
    }
    writeln!(out, "Timesteps: {}", decomposition.timesteps)?;
    writeln!(
        out,
        "{:<22} {:<16} {:<8} {:>12} {:>10}",
        "Band", "Role", "Color", "Total (kWh)", "Peak"
    )?;
    for band in &decomposition.bands {
        let role = match band.role {
            BandRole::StackedOutflow => "supply",
            BandRole::StackedInflow => "absorption",
            BandRole::DiscreteReserve => "reserve",
        };
        let style = match band.pattern {
            Some(p) => format!("{} {}", palette.band_color(band.color), palette.pattern(p)),
            None => palette.band_color(band.color).to_string(),
        };
        writeln!(
            out,
            "{:<22} {:<16} {:<8} {:>12.2} {:>10.2}",
            band.name,
            role,
            style,
            band.magnitude.iter().sum::<f64>(),
            band.magnitude.iter().copied().fold(0.0_f64, f64::max),
        )?;
    }
    let demand = &decomposition.demand;
    writeln!(
        out,
        "{:<22} {:<16} {:<8} {:>12.2} {:>10.2}",
        demand.name,
        "reference",
        palette.band_color(demand.color),
        demand.values.iter().sum::<f64>(),
        demand.values.iter().copied().fold(0.0_f64, f64::max),
    )
}

/// Side-by-side comparison tables with a class column and per-section counts.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_comparison_report(
    out: &mut impl Write,
    project_a: &str,
    project_b: &str,
    sections: &[ComparisonSection],
) -> io::Result<()> {
    for section in sections {
        writeln!(out, "--- {} ---", section.title)?;
        let Some(rows) = &section.rows else {
            writeln!(out, "not available for both projects")?;
            writeln!(out)?;
            continue;
        };
        writeln!(
            out,
            "{:<40} {:>16} {:>16}  {}",
            "Key", project_a, project_b, "Status"
        )?;
        for row in rows {
            let key = match &row.annotation {
                Some(unit) if !unit.is_missing() => format!("{} ({unit})", row.key),
                _ => row.key.to_string(),
            };
            let dup = if row.duplicate_key { " (duplicate key)" } else { "" };
            writeln!(
                out,
                "{:<40} {:>16} {:>16}  {}{dup}",
                key,
                row.value_a.to_string(),
                row.value_b.to_string(),
                row.class
            )?;
        }
        let s = DiffSummary::from_rows(rows);
        writeln!(
            out,
            "{} match, {} differ, {} missing, {} not comparable",
            s.matches, s.numeric_mismatches, s.missing_operands, s.incomparable
        )?;
        writeln!(out)?;
    }
    Ok(())
}

/// Seasonal error statistics of every family.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_error_report(out: &mut impl Write, reports: &[SeasonalErrorReport]) -> io::Result<()> {
    if reports.is_empty() {
        return writeln!(out, "no uncertainty settings: forecast errors not reported");
    }
    for report in reports {
        writeln!(out, "{report}")?;
        for entry in &report.seasons {
            let finite: Vec<f64> = entry
                .mae_curve
                .values
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .collect();
            if let (Some(lo), Some(hi)) = (
                finite.iter().copied().reduce(f64::min),
                finite.iter().copied().reduce(f64::max),
            ) {
                writeln!(
                    out,
                    "  {:<7} MAE per simulation: {} sims, min {lo:.3}, max {hi:.3}",
                    entry.season.name(),
                    entry.mae_curve.values.len()
                )?;
            }
        }
    }
    Ok(())
}

/// Location, time settings, constraints and components of a project.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_inputs_report(out: &mut impl Write, params: &ProjectParameters) -> io::Result<()> {
    let p = &params.project_settings;
    writeln!(out, "--- Project Location ---")?;
    match params.location() {
        Some((lat, lon)) => writeln!(out, "Latitude: {lat}  Longitude: {lon}")?,
        None => writeln!(out, "Location not specified")?,
    }

    writeln!(out, "\n--- Time Settings ---")?;
    writeln!(out, "Start Date:          {}", text(&p.start_date))?;
    writeln!(out, "Project Lifetime:    {} years", text(&p.project_lifetime))?;
    writeln!(out, "Time Step Duration:  {} h", text(&p.time_step_duration))?;

    let ts = &params.time_series_settings;
    writeln!(out, "\n--- Seasonality ---")?;
    writeln!(out, "Data Type:           {}", text(&ts.data_type))?;
    writeln!(out, "Seasonality:         {}", text(&ts.seasonality))?;
    writeln!(out, "Number of Seasons:   {}", text(&ts.num_seasons))?;
    for (season, months) in params.seasonal_definition() {
        writeln!(out, "  Season {season}: months {months}")?;
    }

    writeln!(out, "\n--- Optimization Constraints ---")?;
    for c in params.constraints() {
        writeln!(out, "{:<38} {}", c.name, c.value)?;
    }

    writeln!(out, "\n--- System Components ---")?;
    for c in params.components() {
        let status = if c.enabled { "enabled" } else { "disabled" };
        writeln!(out, "{} ({status})", c.name)?;
        for d in &c.details {
            let unit = if d.unit.is_empty() { String::new() } else { format!(" {}", d.unit) };
            writeln!(out, "  {}: {}{unit}", d.label, d.value)?;
        }
    }
    Ok(())
}

/// Sizing, costs and indicators of one project; absent parts are skipped.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_results_summary(
    out: &mut impl Write,
    sizing: Option<&[SizingRow]>,
    costs: Option<&CostSummary>,
    indicators: Option<&[IndicatorRow]>,
) -> io::Result<()> {
    if let Some(rows) = sizing {
        writeln!(out, "--- System Sizing ---")?;
        for r in rows {
            let units = r.installed_units.map_or("N/A".to_string(), |u| u.to_string());
            let cap = r
                .total_installed_capacity
                .map_or("N/A".to_string(), |c| format!("{c:.2}"));
            writeln!(
                out,
                "{:<28} units {:>8}  capacity {:>12}",
                r.technology.to_string(),
                units,
                cap
            )?;
        }
        writeln!(out)?;
    }
    if let Some(c) = costs {
        writeln!(out, "{c}")?;
        writeln!(out)?;
    }
    if let Some(rows) = indicators {
        writeln!(out, "--- Operational Indicators ---")?;
        for r in rows {
            let unit = r.unit.as_ref().filter(|u| !u.is_missing());
            match unit {
                Some(u) => writeln!(out, "{:<40} {} {u}", r.indicator.to_string(), r.value)?,
                None => writeln!(out, "{:<40} {}", r.indicator.to_string(), r.value)?,
            }
        }
    }
    Ok(())
}
