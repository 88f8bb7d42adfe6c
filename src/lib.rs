pub mod board;
pub mod cli;
pub mod commands;
pub mod db;
pub mod error;
pub mod models;
pub mod settings;
pub mod timeline;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde::Serialize;

use board::{board_locations, load_board, BoardCache, BoardController, BoardSource};
use cli::{Cli, CliCommand};
use commands::{import_records, machine_dashboard, resolve_as_of};
use db::{Database, Machine};
use models::RawRecord;
use settings::{resolve_settings_path, DashboardSettings, SettingsStore};

pub use timeline::dashboard::{build_dashboard, MachineDashboard, ShiftReport};

pub(crate) struct AppState {
    pub(crate) db: Database,
    pub(crate) settings: DashboardSettings,
}

impl AppState {
    fn board_source(&self) -> Result<BoardSource> {
        Ok(BoardSource {
            db: self.db.clone(),
            plant_offset: self.settings.plant_offset()?,
            stale_after: self.settings.stale_after(),
        })
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{rendered}");
    Ok(())
}

/// Entry point of the `shiftboard` binary.
pub fn run() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings_path = resolve_settings_path(cli.settings.clone());
    let store = SettingsStore::new(settings_path)?;
    let settings = store.get()?;
    info!("Loaded settings from {}", store.path().display());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async move {
        let db = Database::new(settings.database_path.clone())?;
        let state = AppState { db, settings };
        dispatch(&state, cli.command).await
    })
}

async fn dispatch(state: &AppState, command: CliCommand) -> Result<()> {
    let settings = &state.settings;

    match command {
        CliCommand::Dashboard(args) => {
            let as_of = resolve_as_of(args.as_of.as_deref(), settings.plant_offset()?)?;
            let dashboard =
                machine_dashboard(&state.db, settings, &args.machine, args.date, as_of).await?;
            print_json(&dashboard)
        }
        CliCommand::Board(args) => {
            let cache = BoardCache::new(settings.board_cache_ttl());
            let snapshot =
                load_board(&state.board_source()?, &cache, args.location.as_deref()).await?;
            print_json(&snapshot)
        }
        CliCommand::Watch => {
            let cache = BoardCache::new(settings.board_cache_ttl());
            let mut controller = BoardController::new();
            controller.start(
                state.board_source()?,
                cache,
                board_locations(&settings.locations),
                settings.board_refresh(),
            )?;

            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for Ctrl-C")?;
            info!("Interrupted, stopping board poller");
            controller.stop().await
        }
        CliCommand::Machines(args) => {
            let machines = state.db.list_machines(args.location).await?;
            print_json(&machines)
        }
        CliCommand::Register(args) => {
            state
                .db
                .upsert_machine(&Machine {
                    machine_code: args.machine,
                    machine_name: args.name,
                    line_group: args.line,
                    location: args.location,
                })
                .await
        }
        CliCommand::Import(args) => {
            let contents = std::fs::read_to_string(&args.file)
                .with_context(|| format!("failed to read {}", args.file.display()))?;
            let raw: Vec<RawRecord> = serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse records in {}", args.file.display()))?;
            let summary =
                import_records(&state.db, settings.plant_offset()?, &args.machine, &raw).await?;
            print_json(&summary)
        }
    }
}
