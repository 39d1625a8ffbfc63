use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Client;

use super::conversion_err;

const COLUMNS: &str = "id, name, contact_name, email, phone, address, created_at";

pub fn insert_client(conn: &Connection, client: &Client) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO clients (id, name, contact_name, email, phone, address, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            client.id.to_string(),
            client.name,
            client.contact_name,
            client.email,
            client.phone,
            client.address,
            client.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_client(conn: &Connection, id: &Uuid) -> Result<Option<Client>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM clients WHERE id = ?1"))?;
    match stmt.query_row(params![id.to_string()], client_from_row) {
        Ok(client) => Ok(Some(client)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_clients(conn: &Connection) -> Result<Vec<Client>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM clients ORDER BY name"))?;
    let rows = stmt.query_map([], client_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn update_client(conn: &Connection, client: &Client) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE clients SET name = ?2, contact_name = ?3, email = ?4, phone = ?5, address = ?6
         WHERE id = ?1",
        params![
            client.id.to_string(),
            client.name,
            client.contact_name,
            client.email,
            client.phone,
            client.address,
        ],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Client".into(),
            id: client.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_client(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let rows = conn.execute("DELETE FROM clients WHERE id = ?1", params![id.to_string()])?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Client".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn client_from_row(row: &rusqlite::Row) -> rusqlite::Result<Client> {
    let id: String = row.get(0)?;
    Ok(Client {
        id: Uuid::parse_str(&id).map_err(|e| conversion_err(0, e))?,
        name: row.get(1)?,
        contact_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        created_at: row.get(6)?,
    })
}
