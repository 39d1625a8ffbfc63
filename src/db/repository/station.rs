use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Station;

use super::conversion_err;

const COLUMNS: &str = "id, service_id, code, station_type, location, active, created_at";

pub fn insert_station(conn: &Connection, station: &Station) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO stations (id, service_id, code, station_type, location, active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            station.id.to_string(),
            station.service_id.to_string(),
            station.code,
            station.station_type,
            station.location,
            station.active as i32,
            station.created_at,
        ],
    )
    .map_err(|e| DatabaseError::from_sqlite(e, "station service"))?;
    Ok(())
}

pub fn get_station(conn: &Connection, id: &Uuid) -> Result<Option<Station>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM stations WHERE id = ?1"))?;
    match stmt.query_row(params![id.to_string()], station_from_row) {
        Ok(station) => Ok(Some(station)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_stations_by_service(
    conn: &Connection,
    service_id: &Uuid,
) -> Result<Vec<Station>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM stations WHERE service_id = ?1 ORDER BY code"
    ))?;
    let rows = stmt.query_map(params![service_id.to_string()], station_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn update_station(conn: &Connection, station: &Station) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE stations SET code = ?2, station_type = ?3, location = ?4, active = ?5
         WHERE id = ?1",
        params![
            station.id.to_string(),
            station.code,
            station.station_type,
            station.location,
            station.active as i32,
        ],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Station".into(),
            id: station.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_station(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let rows = conn.execute("DELETE FROM stations WHERE id = ?1", params![id.to_string()])?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Station".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn station_from_row(row: &rusqlite::Row) -> rusqlite::Result<Station> {
    let id: String = row.get(0)?;
    let service_id: String = row.get(1)?;
    Ok(Station {
        id: Uuid::parse_str(&id).map_err(|e| conversion_err(0, e))?,
        service_id: Uuid::parse_str(&service_id).map_err(|e| conversion_err(1, e))?,
        code: row.get(2)?,
        station_type: row.get(3)?,
        location: row.get(4)?,
        active: row.get::<_, i32>(5)? != 0,
        created_at: row.get(6)?,
    })
}
