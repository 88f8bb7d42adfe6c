use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "shiftboard",
    about = "Shift production timelines and signal-light board for factory machines"
)]
pub struct Cli {
    /// Settings file (defaults to $SHIFTBOARD_SETTINGS, then ./settings.json).
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the shift dashboard of one machine as JSON.
    Dashboard(DashboardArgs),
    /// Print one signal-light board snapshot as JSON.
    Board(BoardArgs),
    /// Keep the board cache refreshed until interrupted.
    Watch,
    /// List registered machines as JSON.
    Machines(MachinesArgs),
    /// Register a machine or update its details.
    Register(RegisterArgs),
    /// Load a JSON array of raw records for a machine.
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    #[arg(long, value_name = "CODE")]
    pub machine: String,
    /// Production date (YYYY-MM-DD); defaults to the day containing --as-of.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Plant-local reference time, e.g. "2026-03-02 11:30"; defaults to now.
    #[arg(long, value_name = "TIME")]
    pub as_of: Option<String>,
}

#[derive(Debug, Args)]
pub struct BoardArgs {
    #[arg(long)]
    pub location: Option<String>,
}

#[derive(Debug, Args)]
pub struct MachinesArgs {
    #[arg(long)]
    pub location: Option<String>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long, value_name = "CODE")]
    pub machine: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub line: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[arg(long, value_name = "CODE")]
    pub machine: String,
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clap_parses_dashboard_flags() {
        let cli = Cli::parse_from([
            "shiftboard",
            "dashboard",
            "--machine",
            "M-01",
            "--date",
            "2026-03-02",
            "--as-of",
            "2026-03-02 11:30",
        ]);
        match cli.command {
            CliCommand::Dashboard(args) => {
                assert_eq!(args.machine, "M-01");
                assert_eq!(args.date, NaiveDate::from_ymd_opt(2026, 3, 2));
                assert_eq!(args.as_of.as_deref(), Some("2026-03-02 11:30"));
            }
            _ => panic!("expected dashboard command"),
        }
    }

    #[test]
    fn clap_parses_global_settings_after_subcommand() {
        let cli = Cli::parse_from(["shiftboard", "board", "--settings", "/tmp/s.json"]);
        assert_eq!(cli.settings, Some(PathBuf::from("/tmp/s.json")));
        match cli.command {
            CliCommand::Board(args) => assert!(args.location.is_none()),
            _ => panic!("expected board command"),
        }
    }

    #[test]
    fn clap_parses_machines_location() {
        let cli = Cli::parse_from(["shiftboard", "machines", "--location", "plant-2"]);
        match cli.command {
            CliCommand::Machines(args) => assert_eq!(args.location.as_deref(), Some("plant-2")),
            _ => panic!("expected machines command"),
        }
    }

    #[test]
    fn clap_rejects_bad_date() {
        let result = Cli::try_parse_from([
            "shiftboard",
            "dashboard",
            "--machine",
            "M-01",
            "--date",
            "02/03/2026",
        ]);
        assert!(result.is_err());
    }
}
