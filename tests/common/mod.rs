//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use autarky_viewer::columns;
use autarky_viewer::table::TimeSeriesTable;

/// The sample projects shipped with the crate.
pub fn sample_projects_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("projects")
}

/// One timestep of a full-featured dispatch table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchRow {
    pub solar: f64,
    pub discharge: f64,
    pub charge: f64,
    pub generator: f64,
    pub grid_import: f64,
    pub grid_export: f64,
    pub lost_load: f64,
    pub load: f64,
}

/// Dispatch table with every optional flow column present.
pub fn full_dispatch_table(rows: &[DispatchRow]) -> TimeSeriesTable {
    TimeSeriesTable::builder("full dispatch")
        .with_column(columns::SOLAR_PRODUCTION, rows.iter().map(|r| r.solar))
        .with_column(columns::BATTERY_DISCHARGE, rows.iter().map(|r| r.discharge))
        .with_column(columns::BATTERY_CHARGE, rows.iter().map(|r| r.charge))
        .with_column(columns::GENERATOR_PRODUCTION, rows.iter().map(|r| r.generator))
        .with_column(columns::GRID_IMPORT, rows.iter().map(|r| r.grid_import))
        .with_column(columns::GRID_EXPORT, rows.iter().map(|r| r.grid_export))
        .with_column(columns::LOST_LOAD, rows.iter().map(|r| r.lost_load))
        .with_column(columns::LOAD_DEMAND, rows.iter().map(|r| r.load))
        .build()
        .expect("valid table")
}

/// Two-column key/value table; `None` values are missing cells.
pub fn kv_table(name: &str, key: &str, value: &str, rows: &[(&str, Option<f64>)]) -> TimeSeriesTable {
    TimeSeriesTable::builder(name)
        .with_column(key, rows.iter().map(|(k, _)| *k))
        .with_column(value, rows.iter().map(|(_, v)| *v))
        .build()
        .expect("valid table")
}

/// Simulations x timesteps error grid; column `s` holds `f(s, t)`.
pub fn error_grid(sims: usize, steps: usize, f: impl Fn(usize, usize) -> f64) -> TimeSeriesTable {
    (0..sims)
        .fold(TimeSeriesTable::builder("errors"), |builder, s| {
            builder.with_column((s + 1).to_string(), (0..steps).map(|t| f(s, t)))
        })
        .build()
        .expect("valid table")
}

/// Writes `files` (relative path, content) below `root/project`.
pub fn write_project(root: &Path, project: &str, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(project).join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create project dir");
        }
        fs::write(path, content).expect("write project file");
    }
}
