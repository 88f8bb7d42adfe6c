use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    models::{Machine, MachineStatusRow},
    Database,
};

fn row_to_machine(row: &Row) -> rusqlite::Result<Machine> {
    Ok(Machine {
        machine_code: row.get("machine_code")?,
        machine_name: row.get("machine_name")?,
        line_group: row.get("line_group")?,
        location: row.get("location")?,
    })
}

impl Database {
    /// Insert a machine or refresh its name, line and location.
    pub async fn upsert_machine(&self, machine: &Machine) -> Result<()> {
        let machine = machine.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO machines (machine_code, machine_name, line_group, location)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(machine_code) DO UPDATE SET
                     machine_name = excluded.machine_name,
                     line_group = excluded.line_group,
                     location = excluded.location",
                params![
                    machine.machine_code,
                    machine.machine_name,
                    machine.line_group,
                    machine.location,
                ],
            )
            .with_context(|| format!("failed to upsert machine {}", machine.machine_code))?;
            Ok(())
        })
        .await
    }

    pub async fn get_machine(&self, machine_code: &str) -> Result<Option<Machine>> {
        let machine_code = machine_code.to_string();
        self.execute(move |conn| {
            let machine = conn
                .query_row(
                    "SELECT machine_code, machine_name, line_group, location
                     FROM machines
                     WHERE machine_code = ?1",
                    params![machine_code],
                    row_to_machine,
                )
                .optional()?;
            Ok(machine)
        })
        .await
    }

    /// All machines, optionally restricted to one location, in board order.
    pub async fn list_machines(&self, location: Option<String>) -> Result<Vec<Machine>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT machine_code, machine_name, line_group, location
                 FROM machines
                 WHERE ?1 IS NULL OR location = ?1
                 ORDER BY line_group ASC, machine_code ASC",
            )?;

            let mut rows = stmt.query(params![location])?;
            let mut machines = Vec::new();
            while let Some(row) = rows.next()? {
                machines.push(row_to_machine(row)?);
            }

            Ok(machines)
        })
        .await
    }

    /// Every machine (optionally of one location) with its newest production row.
    pub async fn latest_records(&self, location: Option<String>) -> Result<Vec<MachineStatusRow>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT m.machine_code, m.machine_name, m.line_group, m.location,
                        r.created_at, r.machine_counter, r.operation_name
                 FROM machines m
                 LEFT JOIN production_records r ON r.id = (
                     SELECT id FROM production_records
                     WHERE machine_code = m.machine_code
                     ORDER BY created_at DESC, id DESC
                     LIMIT 1
                 )
                 WHERE ?1 IS NULL OR m.location = ?1
                 ORDER BY m.line_group ASC, m.machine_code ASC",
            )?;

            let mut rows = stmt.query(params![location])?;
            let mut statuses = Vec::new();
            while let Some(row) = rows.next()? {
                statuses.push(MachineStatusRow {
                    machine: row_to_machine(row)?,
                    created_at: row.get("created_at")?,
                    machine_counter: row.get("machine_counter")?,
                    operation_name: row.get("operation_name")?,
                });
            }

            Ok(statuses)
        })
        .await
    }
}
