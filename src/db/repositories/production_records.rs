use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::db::{
    helpers::{format_timestamp, to_i64},
    models::StoredRecord,
    Database,
};
use crate::models::RawRecord;

fn insert_row(conn: &Connection, machine_code: &str, record: &StoredRecord) -> Result<i64> {
    conn.execute(
        "INSERT INTO production_records (machine_code, created_at, machine_counter, operation_name)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            machine_code,
            format_timestamp(record.created_at),
            record.machine_counter.map(to_i64).transpose()?,
            record.operation_name,
        ],
    )
    .with_context(|| format!("failed to insert production record for {machine_code}"))?;
    Ok(conn.last_insert_rowid())
}

impl Database {
    pub async fn insert_raw_record(&self, machine_code: &str, record: StoredRecord) -> Result<i64> {
        let machine_code = machine_code.to_string();
        self.execute(move |conn| insert_row(conn, &machine_code, &record))
            .await
    }

    /// Inserts a batch in one transaction; nothing is written if any row fails.
    pub async fn insert_raw_records(
        &self,
        machine_code: &str,
        records: Vec<StoredRecord>,
    ) -> Result<usize> {
        let machine_code = machine_code.to_string();
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open import transaction")?;
            for record in &records {
                insert_row(&tx, &machine_code, record)?;
            }
            tx.commit().context("failed to commit import transaction")?;
            Ok(records.len())
        })
        .await
    }

    /// Rows of one machine with `from <= created_at <= to`, oldest first.
    /// Values are handed over untouched; parsing happens in the timeline.
    pub async fn get_raw_records(
        &self,
        machine_code: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<RawRecord>> {
        let machine_code = machine_code.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT created_at, machine_counter, operation_name
                 FROM production_records
                 WHERE machine_code = ?1 AND created_at >= ?2 AND created_at <= ?3
                 ORDER BY created_at ASC, id ASC",
            )?;

            let mut rows = stmt.query(params![
                machine_code,
                format_timestamp(from),
                format_timestamp(to),
            ])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(RawRecord {
                    timestamp: row.get(0)?,
                    counter: row.get(1)?,
                    status: row.get(2)?,
                });
            }

            Ok(records)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn stored(hour: u32, minute: u32, counter: Option<u64>, status: Option<&str>) -> StoredRecord {
        StoredRecord {
            created_at: at(hour, minute),
            machine_counter: counter,
            operation_name: status.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn range_query_is_inclusive_and_ordered() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();

        let inserted = db
            .insert_raw_records(
                "M-01",
                vec![
                    stored(9, 0, Some(140), Some("Normal Operation")),
                    stored(8, 0, Some(100), Some("Normal Operation")),
                    stored(11, 0, None, None),
                    stored(6, 59, Some(90), Some("Dandori")),
                ],
            )
            .await
            .unwrap();
        assert_eq!(inserted, 4);
        db.insert_raw_record("M-02", stored(8, 30, Some(1), Some("Repair")))
            .await
            .unwrap();

        let rows = db.get_raw_records("M-01", at(7, 0), at(11, 0)).await.unwrap();
        let stamps: Vec<&str> = rows.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(
            stamps,
            vec!["2026-03-02 08:00:00", "2026-03-02 09:00:00", "2026-03-02 11:00:00"]
        );
        assert_eq!(rows[0].counter, Some(100));
        assert_eq!(rows[2].counter, None);
        assert_eq!(rows[2].status, None);
    }
}
