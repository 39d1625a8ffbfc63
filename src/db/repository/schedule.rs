use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::ScheduleStatus;
use crate::models::Schedule;

use super::conversion_err;

const COLUMNS: &str =
    "id, service_id, user_id, scheduled_date, scheduled_time, status, notes, created_at";

pub fn insert_schedule(conn: &Connection, schedule: &Schedule) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO schedules (id, service_id, user_id, scheduled_date, scheduled_time, status, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            schedule.id.to_string(),
            schedule.service_id.to_string(),
            schedule.user_id.to_string(),
            schedule.scheduled_date,
            schedule.scheduled_time,
            schedule.status.as_str(),
            schedule.notes,
            schedule.created_at,
        ],
    )
    .map_err(|e| DatabaseError::from_sqlite(e, "schedule service or user"))?;
    Ok(())
}

pub fn get_schedule(conn: &Connection, id: &Uuid) -> Result<Option<Schedule>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM schedules WHERE id = ?1"))?;
    match stmt.query_row(params![id.to_string()], schedule_from_row) {
        Ok(schedule) => Ok(Some(schedule)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_schedules_by_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<Schedule>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM schedules WHERE user_id = ?1
         ORDER BY scheduled_date, scheduled_time"
    ))?;
    let rows = stmt.query_map(params![user_id.to_string()], schedule_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn update_schedule_status(
    conn: &Connection,
    id: &Uuid,
    status: ScheduleStatus,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE schedules SET status = ?2 WHERE id = ?1",
        params![id.to_string(), status.as_str()],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Schedule".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_schedule(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let rows = conn.execute("DELETE FROM schedules WHERE id = ?1", params![id.to_string()])?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Schedule".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn schedule_from_row(row: &rusqlite::Row) -> rusqlite::Result<Schedule> {
    let id: String = row.get(0)?;
    let service_id: String = row.get(1)?;
    let user_id: String = row.get(2)?;
    let status: String = row.get(5)?;
    Ok(Schedule {
        id: Uuid::parse_str(&id).map_err(|e| conversion_err(0, e))?,
        service_id: Uuid::parse_str(&service_id).map_err(|e| conversion_err(1, e))?,
        user_id: Uuid::parse_str(&user_id).map_err(|e| conversion_err(2, e))?,
        scheduled_date: row.get(3)?,
        scheduled_time: row.get(4)?,
        status: ScheduleStatus::from_str(&status).map_err(|e| conversion_err(5, e))?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
    })
}
