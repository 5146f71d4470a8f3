//! CSV export of decompositions, comparisons, and error statistics.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::compare::DiffRow;
use crate::flow::FlowDecomposition;
use crate::metrics::SeasonalErrorReport;
use crate::palette::Palette;
use crate::table::{Cell, TimeSeriesTable};

/// Header of the comparison export; `highlight` is present only when a
/// palette is supplied.
const DIFF_HEADER: [&str; 6] = [
    "key",
    "value_a",
    "value_b",
    "class",
    "duplicate_key",
    "annotation",
];

const METRICS_HEADER: [&str; 6] = ["family", "season", "rmse", "mae", "bias", "samples"];

const MAE_CURVE_HEADER: [&str; 4] = ["family", "season", "simulation", "mae"];

/// Writes a decomposition to a CSV file at `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_flow_csv(decomposition: &FlowDecomposition, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_flow_csv(decomposition, io::BufWriter::new(file))
}

/// Writes one row per timestep: the band magnitudes in stacking order,
/// then the demand curve.
///
/// Inflow bands are written as positive magnitudes; their direction is
/// carried by [`crate::flow::BandRole`].
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_flow_csv(decomposition: &FlowDecomposition, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header = vec!["timestep"];
    header.extend(decomposition.bands.iter().map(|b| b.name));
    header.push(decomposition.demand.name);
    wtr.write_record(&header)?;

    for t in 0..decomposition.timesteps {
        let mut record = Vec::with_capacity(header.len());
        record.push(t.to_string());
        record.extend(
            decomposition
                .bands
                .iter()
                .map(|b| format!("{:.4}", b.magnitude[t])),
        );
        record.push(format!("{:.4}", decomposition.demand.values[t]));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes comparison rows, adding a `highlight` column when `palette` is
/// given.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_diff_csv(
    rows: &[DiffRow],
    palette: Option<&Palette>,
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header = DIFF_HEADER.to_vec();
    if palette.is_some() {
        header.push("highlight");
    }
    wtr.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            cell_field(&row.key),
            cell_field(&row.value_a),
            cell_field(&row.value_b),
            row.class.label().to_string(),
            row.duplicate_key.to_string(),
            row.annotation.as_ref().map(cell_field).unwrap_or_default(),
        ];
        if let Some(p) = palette {
            record.push(p.highlight(row.class).unwrap_or_default().to_string());
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes one row per (family, season) with RMSE, MAE, bias and sample count.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_metrics_csv(reports: &[SeasonalErrorReport], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(METRICS_HEADER)?;

    for report in reports {
        for entry in &report.seasons {
            let m = entry.metrics;
            wtr.write_record(&[
                report.family.prefix().to_string(),
                entry.season.name().to_string(),
                format!("{:.6}", m.rmse),
                format!("{:.6}", m.mae),
                format!("{:.6}", m.bias),
                m.samples.to_string(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the per-simulation MAE curves in long format.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_mae_curves_csv(reports: &[SeasonalErrorReport], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(MAE_CURVE_HEADER)?;

    for report in reports {
        for entry in &report.seasons {
            for (sim, mae) in entry.mae_curve.points() {
                wtr.write_record(&[
                    report.family.prefix().to_string(),
                    entry.season.name().to_string(),
                    sim.to_string(),
                    if mae.is_nan() { String::new() } else { format!("{mae:.6}") },
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Writes a table back out with its own header; missing cells are empty.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_table_csv(table: &TimeSeriesTable, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(table.column_names())?;
    let names: Vec<&str> = table.column_names().collect();
    for row in table.rows() {
        wtr.write_record(
            names
                .iter()
                .map(|c| row.get(c).map(cell_field).unwrap_or_default()),
        )?;
    }
    wtr.flush()?;
    Ok(())
}

fn cell_field(cell: &Cell) -> String {
    match cell {
        Cell::Missing => String::new(),
        other => other.to_string(),
    }
}
