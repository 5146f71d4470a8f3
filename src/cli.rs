use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "autarky-viewer")]
#[command(about = "Analytical views over Autarky optimization results", long_about = None)]
pub struct Cli {
    /// Viewer configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Directory holding one sub-directory per project
    #[arg(long, global = true)]
    pub projects_root: Option<PathBuf>,
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the projects under the projects root
    Projects,
    /// Decompose a project's dispatch into stacked energy-flow bands
    Dispatch {
        project: String,
        /// Season index (1 = Winter .. 4 = Fall); defaults to the first available
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
        season: Option<u8>,
    },
    /// Compare sizing, costs and indicators of two projects
    Compare {
        project_a: String,
        project_b: String,
        /// Absolute tolerance below which values are equal
        #[arg(long)]
        tolerance: Option<f64>,
    },
    /// Seasonal forecast-error statistics of a project
    Errors { project: String },
    /// Input parameter summary of a project
    Inputs { project: String },
    /// Sizing, cost and indicator summary of a project
    Summary { project: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dispatch_with_season() {
        let cli = Cli::try_parse_from(["autarky-viewer", "dispatch", "demo_a", "--season", "2"])
            .expect("parse should succeed");
        match cli.command {
            Command::Dispatch { project, season } => {
                assert_eq!(project, "demo_a");
                assert_eq!(season, Some(2));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn rejects_out_of_range_season() {
        assert!(Cli::try_parse_from(["autarky-viewer", "dispatch", "p", "--season", "5"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "autarky-viewer",
            "compare",
            "a",
            "b",
            "--tolerance",
            "0.01",
            "--format",
            "json",
            "--projects-root",
            "/tmp/p",
        ])
        .expect("parse should succeed");
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.projects_root, Some(PathBuf::from("/tmp/p")));
        assert!(matches!(cli.command, Command::Compare { tolerance: Some(t), .. } if t == 0.01));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["autarky-viewer"]).is_err());
    }
}
