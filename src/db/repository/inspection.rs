use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Inspection;

use super::conversion_err;

const COLUMNS: &str = "id, service_id, inspection_date, inspection_time, inspection_type, \
                       sub_type, duration_minutes, observations, findings, exit_time, created_at";

pub fn insert_inspection(conn: &Connection, inspection: &Inspection) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO inspections (id, service_id, inspection_date, inspection_time, inspection_type,
         sub_type, duration_minutes, observations, findings, exit_time, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            inspection.id.to_string(),
            inspection.service_id.to_string(),
            inspection.inspection_date,
            inspection.inspection_time,
            inspection.inspection_type,
            inspection.sub_type,
            inspection.duration_minutes,
            inspection.observations,
            inspection.findings.as_ref().map(|f| f.to_string()),
            inspection.exit_time,
            inspection.created_at,
        ],
    )
    .map_err(|e| DatabaseError::from_sqlite(e, "inspection service"))?;
    Ok(())
}

pub fn get_inspection(conn: &Connection, id: &Uuid) -> Result<Option<Inspection>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM inspections WHERE id = ?1"))?;
    match stmt.query_row(params![id.to_string()], inspection_from_row) {
        Ok(inspection) => Ok(Some(inspection)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_inspections_by_service(
    conn: &Connection,
    service_id: &Uuid,
) -> Result<Vec<Inspection>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM inspections WHERE service_id = ?1
         ORDER BY inspection_date DESC, inspection_time DESC"
    ))?;
    let rows = stmt.query_map(params![service_id.to_string()], inspection_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Update the in-progress fields a technician edits during the visit.
pub fn update_inspection_progress(
    conn: &Connection,
    id: &Uuid,
    duration_minutes: Option<i64>,
    observations: Option<&str>,
    sub_type: Option<&str>,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE inspections SET duration_minutes = ?2, observations = ?3, sub_type = ?4
         WHERE id = ?1",
        params![id.to_string(), duration_minutes, observations, sub_type],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Inspection".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Close an inspection with its reconciled findings document.
///
/// Single UPDATE ... RETURNING statement: observations and findings are
/// replaced wholesale and the exit timestamp is stamped. Zero rows
/// returned means the inspection does not exist — nothing was written.
pub fn close_with_findings(
    conn: &Connection,
    id: &Uuid,
    observations: Option<&str>,
    findings: &serde_json::Value,
    exit_time: NaiveDateTime,
) -> Result<Inspection, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "UPDATE inspections SET observations = ?2, findings = ?3, exit_time = ?4
         WHERE id = ?1
         RETURNING {COLUMNS}"
    ))?;
    match stmt.query_row(
        params![id.to_string(), observations, findings.to_string(), exit_time],
        inspection_from_row,
    ) {
        Ok(inspection) => Ok(inspection),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DatabaseError::NotFound {
            entity_type: "Inspection".into(),
            id: id.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_inspection(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "DELETE FROM inspections WHERE id = ?1",
        params![id.to_string()],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Inspection".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn inspection_from_row(row: &rusqlite::Row) -> rusqlite::Result<Inspection> {
    let id: String = row.get(0)?;
    let service_id: String = row.get(1)?;
    let findings: Option<String> = row.get(8)?;
    let findings = findings
        .map(|f| serde_json::from_str(&f).map_err(|e| conversion_err(8, e)))
        .transpose()?;
    Ok(Inspection {
        id: Uuid::parse_str(&id).map_err(|e| conversion_err(0, e))?,
        service_id: Uuid::parse_str(&service_id).map_err(|e| conversion_err(1, e))?,
        inspection_date: row.get(2)?,
        inspection_time: row.get(3)?,
        inspection_type: row.get(4)?,
        sub_type: row.get(5)?,
        duration_minutes: row.get(6)?,
        observations: row.get(7)?,
        findings,
        exit_time: row.get(9)?,
        created_at: row.get(10)?,
    })
}
