//! Operations behind the CLI subcommands.

use anyhow::{Context, Result};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::db::{helpers::to_u64, Database, StoredRecord};
use crate::models::{RawRecord, RecordRejection};
use crate::settings::DashboardSettings;
use crate::timeline::aggregator::ProductionDay;
use crate::timeline::dashboard::{build_dashboard, MachineDashboard};
use crate::timeline::records::{parse_timestamp, plant_now};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Reference time for a request: the given plant-local time, or now.
pub fn resolve_as_of(value: Option<&str>, plant_offset: FixedOffset) -> Result<NaiveDateTime> {
    match value {
        Some(raw) => parse_timestamp(raw, plant_offset)
            .with_context(|| format!("invalid --as-of value '{raw}'")),
        None => Ok(plant_now(plant_offset)),
    }
}

/// Loads a machine's rows around the production day and builds its dashboard.
///
/// Rows from `continuityLookbackHours` before the day are included so the
/// first shift can carry over the last state of the previous day.
pub async fn machine_dashboard(
    db: &Database,
    settings: &DashboardSettings,
    machine_code: &str,
    selected_date: Option<NaiveDate>,
    as_of: NaiveDateTime,
) -> Result<MachineDashboard> {
    let schedule = &settings.shifts;
    let day = match selected_date {
        Some(date) => ProductionDay::new(date, schedule),
        None => ProductionDay::containing(as_of, schedule),
    };

    if db.get_machine(machine_code).await?.is_none() {
        log_warn!("machine {machine_code} is not registered");
    }

    let raw = db
        .get_raw_records(machine_code, day.start - settings.continuity_lookback(), day.end)
        .await
        .with_context(|| format!("failed to load records for {machine_code}"))?;

    Ok(build_dashboard(
        machine_code,
        &raw,
        schedule,
        day.date,
        as_of,
        settings.plant_offset()?,
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub machine_code: String,
    pub inserted: usize,
    pub rejected: Vec<RecordRejection>,
}

/// Stores raw rows for one machine in plant-local time. Rows that cannot be
/// read are reported, not stored.
pub async fn import_records(
    db: &Database,
    plant_offset: FixedOffset,
    machine_code: &str,
    raw: &[RawRecord],
) -> Result<ImportSummary> {
    let mut stored = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for (index, row) in raw.iter().enumerate() {
        let parsed = parse_timestamp(&row.timestamp, plant_offset)
            .map_err(anyhow::Error::from)
            .and_then(|created_at| {
                let machine_counter = row
                    .counter
                    .map(|value| to_u64(value, "counter"))
                    .transpose()?;
                Ok(StoredRecord {
                    created_at,
                    machine_counter,
                    operation_name: row.status.clone(),
                })
            });

        match parsed {
            Ok(record) => stored.push(record),
            Err(err) => {
                log_warn!("skipping import row #{index}: {err}");
                rejected.push(RecordRejection {
                    index,
                    raw_timestamp: row.timestamp.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    let inserted = db.insert_raw_records(machine_code, stored).await?;
    log_info!(
        "imported {inserted} records for {machine_code} ({} rejected)",
        rejected.len()
    );

    Ok(ImportSummary {
        machine_code: machine_code.to_string(),
        inserted,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn plant() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    #[test]
    fn as_of_accepts_minutes_precision() {
        let parsed = resolve_as_of(Some("2026-03-02 11:30"), plant()).unwrap();
        assert_eq!(parsed.to_string(), "2026-03-02 11:30:00");
        assert!(resolve_as_of(Some("yesterday"), plant()).is_err());
    }

    #[tokio::test]
    async fn import_converts_to_plant_time_and_reports_bad_rows() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("import.db")).unwrap();
        let rows = vec![
            RawRecord::new("2026-03-02T01:00:00Z", Some(100), Some("Normal Operation")),
            RawRecord::new("", Some(1), None),
            RawRecord::new("2026-03-02 08:30:00", Some(-4), Some("Repair")),
            RawRecord::new("2026-03-02 09:00:00", None, Some("Repair")),
        ];

        let summary = import_records(&db, plant(), "M-01", &rows).await.unwrap();
        assert_eq!(summary.inserted, 2);
        let rejected: Vec<usize> = summary.rejected.iter().map(|r| r.index).collect();
        assert_eq!(rejected, vec![1, 2]);

        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let stored = db
            .get_raw_records(
                "M-01",
                day.and_hms_opt(0, 0, 0).unwrap(),
                day.and_hms_opt(23, 59, 59).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].timestamp, "2026-03-02 08:00:00");
        assert_eq!(stored[1].counter, None);
    }

    #[tokio::test]
    async fn dashboard_includes_state_from_the_previous_day() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("dash.db")).unwrap();
        let rows = vec![RawRecord::new("2026-03-02 05:00:00", Some(10), Some("Dandori"))];
        import_records(&db, plant(), "M-01", &rows).await.unwrap();

        let settings = DashboardSettings::default();
        let as_of = resolve_as_of(Some("2026-03-02 09:00"), plant()).unwrap();
        let dashboard = machine_dashboard(&db, &settings, "M-01", None, as_of)
            .await
            .unwrap();

        assert_eq!(dashboard.selected_date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(dashboard.shifts.len(), 1);
        let first = &dashboard.shifts[0].segments[0];
        assert_eq!(first.status, "Dandori");
        assert_eq!(first.start_time.to_string(), "2026-03-02 07:00:00");
    }
}
