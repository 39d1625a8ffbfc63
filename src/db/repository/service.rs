use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Service;

use super::conversion_err;

const COLUMNS: &str = "id, client_id, service_type, frequency, address, notes, active, created_at";

pub fn insert_service(conn: &Connection, service: &Service) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO services (id, client_id, service_type, frequency, address, notes, active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            service.id.to_string(),
            service.client_id.to_string(),
            service.service_type,
            service.frequency,
            service.address,
            service.notes,
            service.active as i32,
            service.created_at,
        ],
    )
    .map_err(|e| DatabaseError::from_sqlite(e, "service client"))?;
    Ok(())
}

pub fn get_service(conn: &Connection, id: &Uuid) -> Result<Option<Service>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM services WHERE id = ?1"))?;
    match stmt.query_row(params![id.to_string()], service_from_row) {
        Ok(service) => Ok(Some(service)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_services(conn: &Connection) -> Result<Vec<Service>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {COLUMNS} FROM services ORDER BY created_at DESC"))?;
    let rows = stmt.query_map([], service_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn list_services_by_client(
    conn: &Connection,
    client_id: &Uuid,
) -> Result<Vec<Service>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM services WHERE client_id = ?1 ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![client_id.to_string()], service_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn update_service(conn: &Connection, service: &Service) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE services SET service_type = ?2, frequency = ?3, address = ?4, notes = ?5, active = ?6
         WHERE id = ?1",
        params![
            service.id.to_string(),
            service.service_type,
            service.frequency,
            service.address,
            service.notes,
            service.active as i32,
        ],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Service".into(),
            id: service.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_service(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let rows = conn.execute("DELETE FROM services WHERE id = ?1", params![id.to_string()])?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Service".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn service_from_row(row: &rusqlite::Row) -> rusqlite::Result<Service> {
    let id: String = row.get(0)?;
    let client_id: String = row.get(1)?;
    Ok(Service {
        id: Uuid::parse_str(&id).map_err(|e| conversion_err(0, e))?,
        client_id: Uuid::parse_str(&client_id).map_err(|e| conversion_err(1, e))?,
        service_type: row.get(2)?,
        frequency: row.get(3)?,
        address: row.get(4)?,
        notes: row.get(5)?,
        active: row.get::<_, i32>(6)? != 0,
        created_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::client::insert_client;
    use crate::models::Client;
    use chrono::Utc;

    fn seed_client(conn: &Connection) -> Uuid {
        let client = Client {
            id: Uuid::new_v4(),
            name: "Hotel Mirador".into(),
            contact_name: None,
            email: None,
            phone: None,
            address: None,
            created_at: Utc::now().naive_utc(),
        };
        insert_client(conn, &client).unwrap();
        client.id
    }

    fn sample_service(client_id: Uuid) -> Service {
        Service {
            id: Uuid::new_v4(),
            client_id,
            service_type: "rodent_control".into(),
            frequency: Some("monthly".into()),
            address: Some("Calle 8 #44".into()),
            notes: None,
            active: true,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn insert_and_list_by_client() {
        let conn = open_memory_database().unwrap();
        let client_id = seed_client(&conn);
        insert_service(&conn, &sample_service(client_id)).unwrap();
        insert_service(&conn, &sample_service(client_id)).unwrap();

        let services = list_services_by_client(&conn, &client_id).unwrap();
        assert_eq!(services.len(), 2);
        assert!(services.iter().all(|s| s.client_id == client_id));
    }

    #[test]
    fn deactivate_service() {
        let conn = open_memory_database().unwrap();
        let client_id = seed_client(&conn);
        let mut service = sample_service(client_id);
        insert_service(&conn, &service).unwrap();

        service.active = false;
        update_service(&conn, &service).unwrap();
        let found = get_service(&conn, &service.id).unwrap().unwrap();
        assert!(!found.active);
    }

    #[test]
    fn delete_missing_service_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = delete_service(&conn, &Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}
