use anyhow::{anyhow, bail, Context, Result};
use chrono::{Duration as ChronoDuration, FixedOffset};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::RwLock,
    time::Duration,
};

use crate::timeline::config::ShiftSchedule;

pub const SETTINGS_ENV_VAR: &str = "SHIFTBOARD_SETTINGS";
const DEFAULT_SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardSettings {
    pub database_path: PathBuf,
    /// Offset of the plant's wall clock from UTC.
    pub plant_utc_offset_minutes: i32,
    /// How far before a production day to look for the state carried into it.
    pub continuity_lookback_hours: u32,
    pub board_refresh_secs: u64,
    pub board_cache_ttl_secs: u64,
    pub stale_after_mins: u32,
    pub locations: Vec<String>,
    pub shifts: ShiftSchedule,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("shiftboard.db"),
            plant_utc_offset_minutes: 7 * 60,
            continuity_lookback_hours: 24,
            board_refresh_secs: 30,
            board_cache_ttl_secs: 60,
            stale_after_mins: 10,
            locations: Vec::new(),
            shifts: ShiftSchedule::default(),
        }
    }
}

impl DashboardSettings {
    pub fn validate(&self) -> Result<()> {
        self.plant_offset()?;
        if self.board_refresh_secs == 0 {
            bail!("boardRefreshSecs must be greater than zero");
        }
        self.shifts.validate().context("invalid shift schedule")?;
        Ok(())
    }

    pub fn plant_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.plant_utc_offset_minutes * 60).ok_or_else(|| {
            anyhow!(
                "plantUtcOffsetMinutes {} is out of range",
                self.plant_utc_offset_minutes
            )
        })
    }

    pub fn continuity_lookback(&self) -> ChronoDuration {
        ChronoDuration::hours(i64::from(self.continuity_lookback_hours))
    }

    pub fn board_refresh(&self) -> Duration {
        Duration::from_secs(self.board_refresh_secs)
    }

    pub fn board_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.board_cache_ttl_secs)
    }

    pub fn stale_after(&self) -> ChronoDuration {
        ChronoDuration::minutes(i64::from(self.stale_after_mins))
    }
}

/// Settings file location: explicit path, then `SHIFTBOARD_SETTINGS`, then
/// `settings.json` in the working directory.
pub fn resolve_settings_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| env::var_os(SETTINGS_ENV_VAR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<DashboardSettings>,
}

impl SettingsStore {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            read_settings(&path)?
        } else {
            DashboardSettings::default()
        };
        data.validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Result<DashboardSettings> {
        self.data
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| anyhow!("settings lock poisoned"))
    }
}

fn read_settings(path: &Path) -> Result<DashboardSettings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse settings in {}", path.display()))
}
