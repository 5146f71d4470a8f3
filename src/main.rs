//! Autarky viewer entry point: CLI wiring, config loading, output formats.

mod cli;

use std::io::{self, Write};
use std::process;

use clap::Parser;
use serde_json::json;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use autarky_viewer::config::{ConfigError, ViewerConfig};
use autarky_viewer::dispatch::BandFlags;
use autarky_viewer::flow::decompose;
use autarky_viewer::io::export;
use autarky_viewer::loader::{
    COSTS_SUMMARY, InputSeries, OPERATION_INDICATORS, ResultLoader, SIZING_SUMMARY,
};
use autarky_viewer::reporting;
use autarky_viewer::season::Season;
use autarky_viewer::summary::{CostSummary, indicators, sizing_summary};

use cli::{Cli, Command, OutputFormat};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Viewer(#[from] autarky_viewer::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid configuration:\n{}", join_lines(.0))]
    InvalidConfig(Vec<ConfigError>),
    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),
    #[error("cannot write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("cannot encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("project {0} has no parameters.yaml")]
    NoParameters(String),
}

fn join_lines(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("autarky_viewer=info")),
        )
        .init();
}

fn load_config(cli: &Cli) -> Result<ViewerConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => ViewerConfig::from_toml_file(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(root) = &cli.projects_root {
        config.projects.root = root.clone();
    }
    if let Command::Compare {
        tolerance: Some(t), ..
    } = cli.command
    {
        config.compare.tolerance = t;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(CliError::InvalidConfig(errors));
    }
    Ok(config)
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let loader = ResultLoader::new(&config.projects.root);
    debug!(root = %loader.root().display(), "using projects root");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Command::Projects => {
            let projects = loader.list_projects()?;
            match cli.format {
                OutputFormat::Json => {
                    writeln!(out, "{}", serde_json::to_string_pretty(&projects)?)?;
                }
                OutputFormat::Csv => {
                    writeln!(out, "project")?;
                    for p in &projects {
                        writeln!(out, "{p}")?;
                    }
                }
                OutputFormat::Text => {
                    if projects.is_empty() {
                        writeln!(out, "no projects under {}", loader.root().display())?;
                    }
                    for p in &projects {
                        writeln!(out, "{p}")?;
                    }
                }
            }
        }

        Command::Dispatch { project, season } => {
            let season = season.and_then(|i| Season::from_index(usize::from(i)));
            let loaded = loader.load_dispatch(project, season)?;
            let flags = BandFlags::from_table(&loaded.table);
            let decomposition = decompose(&loaded.table, flags)?;
            match cli.format {
                OutputFormat::Text => reporting::write_flow_report(
                    &mut out,
                    project,
                    loaded.season,
                    &decomposition,
                    &config.palette,
                )?,
                OutputFormat::Csv => export::write_flow_csv(&decomposition, &mut out)?,
                OutputFormat::Json => {
                    let doc = json!({
                        "project": project,
                        "season": loaded.season,
                        "flags": flags,
                        "decomposition": decomposition,
                    });
                    writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
                }
            }
        }

        Command::Compare {
            project_a,
            project_b,
            ..
        } => {
            let sections =
                loader.compare_projects(project_a, project_b, config.compare.tolerance)?;
            match cli.format {
                OutputFormat::Text => {
                    reporting::write_comparison_report(&mut out, project_a, project_b, &sections)?;
                }
                OutputFormat::Csv => {
                    for section in &sections {
                        if let Some(rows) = &section.rows {
                            writeln!(out, "# {}", section.title)?;
                            export::write_diff_csv(rows, Some(&config.palette), &mut out)?;
                        }
                    }
                }
                OutputFormat::Json => {
                    let doc: Vec<_> = sections
                        .iter()
                        .map(|s| {
                            json!({
                                "title": s.title,
                                "available": s.is_available(),
                                "summary": s.summary(),
                                "rows": s.rows,
                            })
                        })
                        .collect();
                    writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
                }
            }
        }

        Command::Errors { project } => {
            let reports = loader.error_reports(project)?;
            match cli.format {
                OutputFormat::Text => reporting::write_error_report(&mut out, &reports)?,
                OutputFormat::Csv => export::write_metrics_csv(&reports, &mut out)?,
                OutputFormat::Json => {
                    writeln!(out, "{}", serde_json::to_string_pretty(&reports)?)?;
                }
            }
        }

        Command::Inputs { project } => {
            let params = loader
                .load_parameters(project)?
                .ok_or_else(|| CliError::NoParameters(project.clone()))?;
            let mut series = Vec::new();
            for s in InputSeries::ALL {
                if let Some(table) = loader.load_input(project, s)? {
                    series.push((s, table.row_count(), table.column_count()));
                }
            }
            match cli.format {
                OutputFormat::Text => {
                    reporting::write_inputs_report(&mut out, &params)?;
                    writeln!(out, "\n--- Input Time Series ---")?;
                    for (s, rows, cols) in &series {
                        writeln!(out, "{:<24} {rows} rows x {cols} columns", s.title())?;
                    }
                }
                OutputFormat::Csv => {
                    let mut wtr = csv::Writer::from_writer(&mut out);
                    wtr.write_record(["constraint", "value"])?;
                    for c in params.constraints() {
                        wtr.write_record([c.name.to_string(), c.value.to_string()])?;
                    }
                    wtr.flush()?;
                }
                OutputFormat::Json => {
                    let doc = json!({
                        "location": params.location(),
                        "seasonal_definition": params.seasonal_definition(),
                        "constraints": params.constraints(),
                        "components": params.components(),
                        "error_families": params.error_families(),
                        "input_series": series
                            .iter()
                            .map(|(s, rows, cols)| {
                                json!({ "series": s, "rows": rows, "columns": cols })
                            })
                            .collect::<Vec<_>>(),
                    });
                    writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
                }
            }
        }

        Command::Summary { project } => {
            let sizing_table = loader.load_result(project, SIZING_SUMMARY)?;
            let costs_table = loader.load_result(project, COSTS_SUMMARY)?;
            let indicator_table = loader.load_result(project, OPERATION_INDICATORS)?;

            let sizing = sizing_table.as_ref().map(sizing_summary).transpose()?;
            let costs = costs_table.as_ref().map(CostSummary::from_table).transpose()?;
            let indicator_rows = indicator_table.as_ref().map(indicators).transpose()?;

            match cli.format {
                OutputFormat::Text => reporting::write_results_summary(
                    &mut out,
                    sizing.as_deref(),
                    costs.as_ref(),
                    indicator_rows.as_deref(),
                )?,
                OutputFormat::Csv => {
                    for table in [&sizing_table, &costs_table, &indicator_table]
                        .into_iter()
                        .flatten()
                    {
                        writeln!(out, "# {}", table.name())?;
                        export::write_table_csv(table, &mut out)?;
                    }
                }
                OutputFormat::Json => {
                    let doc = json!({
                        "sizing": sizing,
                        "costs": costs,
                        "key_cost_shares": costs.map(|c| c.key_cost_shares()),
                        "indicators": indicator_rows,
                    });
                    writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
                }
            }
        }
    }

    out.flush()?;
    Ok(())
}
