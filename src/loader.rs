//! Project discovery and file loading.
//!
//! A projects root holds one directory per project:
//!
//! ```text
//! <root>/<project>/results/optimal_dispatch[_season_{i}].csv
//! <root>/<project>/results/{sizing_summary,costs_summary,operation_indicators}.csv
//! <root>/<project>/inputs/parameters.yaml
//! <root>/<project>/inputs/{load,solar_production,...}.csv
//! <root>/<project>/inputs/errors/{load,solar,wind}_errors_{i}.csv
//! ```
//!
//! Absent optional files load as `None`; only unreadable or malformed files
//! are errors.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::compare::{ComparisonSection, ComparisonSpec, compare_with};
use crate::error::{Error, Result};
use crate::metrics::{ErrorFamily, SeasonalErrorReport};
use crate::parameters::ProjectParameters;
use crate::season::Season;
use crate::table::TimeSeriesTable;

pub const RESULTS_DIR: &str = "results";
pub const INPUTS_DIR: &str = "inputs";
pub const ERRORS_DIR: &str = "errors";

pub const SIZING_SUMMARY: &str = "sizing_summary.csv";
pub const COSTS_SUMMARY: &str = "costs_summary.csv";
pub const OPERATION_INDICATORS: &str = "operation_indicators.csv";
pub const FLAT_DISPATCH: &str = "optimal_dispatch.csv";
pub const PARAMETERS: &str = "parameters.yaml";

/// File name of the seasonal dispatch table for `season`.
pub fn seasonal_dispatch_file(season: Season) -> String {
    format!("optimal_dispatch_season_{}.csv", season.index())
}

/// Input time series exposed for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSeries {
    Load,
    SolarProduction,
    WindProduction,
    GridCost,
    GridPrice,
}

impl InputSeries {
    pub const ALL: [InputSeries; 5] = [
        Self::Load,
        Self::SolarProduction,
        Self::WindProduction,
        Self::GridCost,
        Self::GridPrice,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Load => "load.csv",
            Self::SolarProduction => "solar_production.csv",
            Self::WindProduction => "wind_production.csv",
            Self::GridCost => "grid_cost.csv",
            Self::GridPrice => "grid_price.csv",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Load => "Load Demand",
            Self::SolarProduction => "Solar PV Production",
            Self::WindProduction => "Wind Production",
            Self::GridCost => "Grid Electricity Cost",
            Self::GridPrice => "Grid Electricity Price",
        }
    }
}

/// Where a project's dispatch results come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchSource {
    /// One file per season; only the seasons present are listed.
    Seasonal(Vec<(Season, PathBuf)>),
    /// A single `optimal_dispatch.csv`.
    Flat(PathBuf),
    Missing,
}

impl DispatchSource {
    /// Seasons a caller may choose from. Empty for flat or missing sources.
    pub fn seasons(&self) -> Vec<Season> {
        match self {
            Self::Seasonal(files) => files.iter().map(|(s, _)| *s).collect(),
            Self::Flat(_) | Self::Missing => Vec::new(),
        }
    }

    /// File to read for `season`.
    ///
    /// A seasonal source defaults to its first season; a flat source ignores
    /// the request. Returns `None` when nothing matches.
    pub fn select(&self, season: Option<Season>) -> Option<(Option<Season>, &Path)> {
        match self {
            Self::Seasonal(files) => {
                let (s, path) = match season {
                    Some(wanted) => files.iter().find(|(s, _)| *s == wanted)?,
                    None => files.first()?,
                };
                Some((Some(*s), path.as_path()))
            }
            Self::Flat(path) => Some((None, path.as_path())),
            Self::Missing => None,
        }
    }
}

/// A dispatch table with the season it was read for.
#[derive(Debug, Clone)]
pub struct LoadedDispatch {
    /// `None` for a flat (non-seasonal) project.
    pub season: Option<Season>,
    pub table: TimeSeriesTable,
}

/// Reads project result and input files below a projects root.
#[derive(Debug, Clone)]
pub struct ResultLoader {
    root: PathBuf,
}

impl ResultLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of the project directories, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the root cannot be listed.
    pub fn list_projects(&self) -> Result<Vec<String>> {
        let io_err = |source| Error::Io {
            path: self.root.clone(),
            source,
        };
        let mut projects = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if entry.path().is_dir() {
                projects.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        projects.sort();
        info!(root = %self.root.display(), count = projects.len(), "projects listed");
        Ok(projects)
    }

    /// Directory of `project`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectNotFound`] unless `project` names a direct
    /// sub-directory of the root.
    pub fn project_dir(&self, project: &str) -> Result<PathBuf> {
        let plain = Path::new(project).file_name().is_some_and(|n| n == project);
        let dir = self.root.join(project);
        if !plain || !dir.is_dir() {
            return Err(Error::ProjectNotFound(project.to_string()));
        }
        Ok(dir)
    }

    /// # Errors
    ///
    /// Returns [`Error::ProjectNotFound`] for an unknown project.
    pub fn results_dir(&self, project: &str) -> Result<PathBuf> {
        Ok(self.project_dir(project)?.join(RESULTS_DIR))
    }

    /// # Errors
    ///
    /// Returns [`Error::ProjectNotFound`] for an unknown project.
    pub fn inputs_dir(&self, project: &str) -> Result<PathBuf> {
        Ok(self.project_dir(project)?.join(INPUTS_DIR))
    }

    /// Loads `results/<file>` of `project`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectNotFound`], [`Error::Io`] or [`Error::Csv`].
    pub fn load_result(&self, project: &str, file: &str) -> Result<Option<TimeSeriesTable>> {
        load_optional_csv(&self.results_dir(project)?.join(file))
    }

    /// Resolves how `project` stores its dispatch results.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectNotFound`] for an unknown project.
    pub fn dispatch_source(&self, project: &str) -> Result<DispatchSource> {
        let results = self.results_dir(project)?;
        let seasonal: Vec<(Season, PathBuf)> = Season::ALL
            .into_iter()
            .map(|s| (s, results.join(seasonal_dispatch_file(s))))
            .filter(|(_, path)| path.is_file())
            .collect();
        if !seasonal.is_empty() {
            debug!(project, seasons = seasonal.len(), "seasonal dispatch");
            return Ok(DispatchSource::Seasonal(seasonal));
        }
        let flat = results.join(FLAT_DISPATCH);
        if flat.is_file() {
            debug!(project, "flat dispatch");
            return Ok(DispatchSource::Flat(flat));
        }
        Ok(DispatchSource::Missing)
    }

    /// Loads the dispatch table of `project` for `season`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoDispatchData`] when no dispatch file exists or the
    /// requested season is not among the seasonal files, plus any load error.
    pub fn load_dispatch(&self, project: &str, season: Option<Season>) -> Result<LoadedDispatch> {
        let source = self.dispatch_source(project)?;
        let Some((season, path)) = source.select(season) else {
            let what = match season {
                Some(s) => format!("{project} ({s})"),
                None => project.to_string(),
            };
            return Err(Error::NoDispatchData(what));
        };
        Ok(LoadedDispatch {
            season,
            table: read_csv(path)?,
        })
    }

    /// Parses `inputs/parameters.yaml`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Yaml`] for an unreadable or
    /// malformed file.
    pub fn load_parameters(&self, project: &str) -> Result<Option<ProjectParameters>> {
        let path = self.inputs_dir(project)?.join(PARAMETERS);
        if !path.is_file() {
            debug!(path = %path.display(), "no parameters file");
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        ProjectParameters::from_yaml_str(&text)
            .map(Some)
            .map_err(|source| Error::Yaml { path, source })
    }

    /// Loads `inputs/<series>`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectNotFound`], [`Error::Io`] or [`Error::Csv`].
    pub fn load_input(&self, project: &str, series: InputSeries) -> Result<Option<TimeSeriesTable>> {
        load_optional_csv(&self.inputs_dir(project)?.join(series.file_name()))
    }

    /// Error tables of `family` for the seasons whose files exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectNotFound`], [`Error::Io`] or [`Error::Csv`].
    pub fn load_error_tables(
        &self,
        project: &str,
        family: ErrorFamily,
    ) -> Result<Vec<(Season, TimeSeriesTable)>> {
        let dir = self.inputs_dir(project)?.join(ERRORS_DIR);
        let mut tables = Vec::new();
        for season in Season::ALL {
            let path = dir.join(format!("{}_{}.csv", family.prefix(), season.index()));
            if let Some(table) = load_optional_csv(&path)? {
                tables.push((season, table));
            }
        }
        Ok(tables)
    }

    /// Seasonal error reports of every family the parameters call for.
    ///
    /// Empty when the project has no parameters file or no uncertainty
    /// settings.
    ///
    /// # Errors
    ///
    /// Propagates parameter and error-table load failures.
    pub fn error_reports(&self, project: &str) -> Result<Vec<SeasonalErrorReport>> {
        let Some(params) = self.load_parameters(project)? else {
            return Ok(Vec::new());
        };
        let mut reports = Vec::new();
        for family in params.error_families() {
            let tables = self.load_error_tables(project, family)?;
            let report =
                SeasonalErrorReport::from_tables(family, tables.iter().map(|(s, t)| (*s, t)));
            if report.is_empty() {
                warn!(project, family = family.prefix(), "no error data");
            }
            reports.push(report);
        }
        Ok(reports)
    }

    /// Runs the sizing, cost and indicator comparisons between two projects.
    ///
    /// A section whose file is missing in either project is returned as
    /// unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectNotFound`], load errors, and comparison errors
    /// ([`Error::MissingColumn`], [`Error::InvalidTolerance`]).
    pub fn compare_projects(
        &self,
        project_a: &str,
        project_b: &str,
        tolerance: f64,
    ) -> Result<Vec<ComparisonSection>> {
        let presets = [
            (SIZING_SUMMARY, ComparisonSpec::sizing()),
            (COSTS_SUMMARY, ComparisonSpec::costs()),
            (OPERATION_INDICATORS, ComparisonSpec::indicators()),
        ];
        let mut sections = Vec::with_capacity(presets.len());
        for (file, spec) in presets {
            let spec = spec.with_tolerance(tolerance);
            let a = self.load_result(project_a, file)?;
            let b = self.load_result(project_b, file)?;
            let rows = match (a, b) {
                (Some(a), Some(b)) => Some(compare_with(&a, &b, &spec)?),
                _ => {
                    warn!(file, project_a, project_b, "comparison not available");
                    None
                }
            };
            sections.push(ComparisonSection {
                title: spec.title,
                rows,
            });
        }
        Ok(sections)
    }
}

/// Reads a CSV file into a table named after its path.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened and [`Error::Csv`] if
/// it is malformed.
pub fn read_csv(path: &Path) -> Result<TimeSeriesTable> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = TimeSeriesTable::from_csv_reader(path.display().to_string(), BufReader::new(file))
        .map_err(|source| Error::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "csv loaded"
    );
    Ok(table)
}

fn load_optional_csv(path: &Path) -> Result<Option<TimeSeriesTable>> {
    if !path.is_file() {
        debug!(path = %path.display(), "file absent");
        return Ok(None);
    }
    read_csv(path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, content).expect("write");
    }

    #[test]
    fn lists_only_directories_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("zeta")).expect("mkdir");
        fs::create_dir(dir.path().join("alpha")).expect("mkdir");
        write(dir.path(), "notes.txt", "x");
        let loader = ResultLoader::new(dir.path());
        assert_eq!(loader.list_projects().expect("listed"), vec!["alpha", "zeta"]);
    }

    #[test]
    fn missing_root_is_io_error() {
        let loader = ResultLoader::new("/nonexistent/projects/root");
        assert!(matches!(loader.list_projects(), Err(Error::Io { .. })));
    }

    #[test]
    fn unknown_or_nested_project_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("p/inner")).expect("mkdir");
        let loader = ResultLoader::new(dir.path());
        assert!(matches!(loader.project_dir("nope"), Err(Error::ProjectNotFound(_))));
        assert!(matches!(loader.project_dir("p/inner"), Err(Error::ProjectNotFound(_))));
        assert!(matches!(loader.project_dir(".."), Err(Error::ProjectNotFound(_))));
        assert!(loader.project_dir("p").is_ok());
    }

    #[test]
    fn seasonal_files_take_precedence_over_flat() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "p/results/optimal_dispatch.csv", "a\n1\n");
        write(dir.path(), "p/results/optimal_dispatch_season_3.csv", "a\n3\n");
        write(dir.path(), "p/results/optimal_dispatch_season_2.csv", "a\n2\n");
        let loader = ResultLoader::new(dir.path());

        let source = loader.dispatch_source("p").expect("resolved");
        assert_eq!(source.seasons(), vec![Season::Spring, Season::Summer]);

        let first = loader.load_dispatch("p", None).expect("default season");
        assert_eq!(first.season, Some(Season::Spring));
        assert_eq!(first.table.get(0, "a").and_then(|c| c.as_f64()), Some(2.0));

        assert!(matches!(
            loader.load_dispatch("p", Some(Season::Winter)),
            Err(Error::NoDispatchData(_))
        ));
    }

    #[test]
    fn flat_dispatch_ignores_season() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "p/results/optimal_dispatch.csv", "a\n1\n");
        let loader = ResultLoader::new(dir.path());
        let loaded = loader.load_dispatch("p", Some(Season::Fall)).expect("flat");
        assert_eq!(loaded.season, None);
        assert_eq!(loaded.table.row_count(), 1);
    }

    #[test]
    fn no_dispatch_files_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("p/results")).expect("mkdir");
        let loader = ResultLoader::new(dir.path());
        assert_eq!(loader.dispatch_source("p").expect("ok"), DispatchSource::Missing);
        assert!(matches!(loader.load_dispatch("p", None), Err(Error::NoDispatchData(_))));
    }

    #[test]
    fn malformed_csv_names_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "p/results/sizing_summary.csv", "a,b\n1,2,3\n");
        let loader = ResultLoader::new(dir.path());
        let err = loader.load_result("p", SIZING_SUMMARY).expect_err("ragged");
        assert!(matches!(err, Error::Csv { .. }));
        assert!(err.to_string().contains("sizing_summary.csv"));
    }

    #[test]
    fn parameters_absent_or_malformed() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("p/inputs")).expect("mkdir");
        let loader = ResultLoader::new(dir.path());
        assert!(loader.load_parameters("p").expect("absent ok").is_none());

        write(dir.path(), "p/inputs/parameters.yaml", "project_settings: [unclosed\n");
        assert!(matches!(loader.load_parameters("p"), Err(Error::Yaml { .. })));
    }

    #[test]
    fn error_reports_need_uncertainty_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "p/inputs/parameters.yaml", "solar_pv:\n  enabled: true\n");
        write(dir.path(), "p/inputs/errors/load_errors_1.csv", "1,2\n0.5,-0.5\n");
        let loader = ResultLoader::new(dir.path());
        assert!(loader.error_reports("p").expect("ok").is_empty());

        write(
            dir.path(),
            "p/inputs/parameters.yaml",
            "uncertainty_settings:\n  outage_duration: 2\n",
        );
        let reports = loader.error_reports("p").expect("ok");
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].family, ErrorFamily::Load);
        assert_eq!(reports[0].seasons.len(), 1);
        assert_eq!(reports[0].seasons[0].metrics.mae, 0.5);
        assert!(reports[1].is_empty());
    }

    #[test]
    fn comparison_sections_unavailable_when_file_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sizing = "Technology,Total Installed Capacity\nSolar PV,10\n";
        write(dir.path(), "a/results/sizing_summary.csv", sizing);
        write(dir.path(), "b/results/sizing_summary.csv", sizing);
        write(dir.path(), "a/results/costs_summary.csv", "Cost Component,Value (kUSD)\nNPC,1\n");
        let loader = ResultLoader::new(dir.path());

        let sections = loader.compare_projects("a", "b", 1e-5).expect("compared");
        assert_eq!(sections.len(), 3);
        assert!(sections[0].is_available());
        assert!(sections[0].summary().is_some_and(|s| s.is_identical()));
        assert!(!sections[1].is_available());
        assert!(!sections[2].is_available());
    }

    #[test]
    fn input_series_load_when_present() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "p/inputs/load.csv", "1,2,3,4\n10,11,12,13\n");
        let loader = ResultLoader::new(dir.path());
        let load = loader.load_input("p", InputSeries::Load).expect("ok");
        assert_eq!(load.map(|t| t.column_count()), Some(4));
        assert!(loader.load_input("p", InputSeries::GridPrice).expect("ok").is_none());
    }
}
