use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::UserRole;
use crate::models::User;

use super::conversion_err;

const COLUMNS: &str = "id, name, email, password, role, created_at";

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, name, email, password, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id.to_string(),
            user.name,
            user.email,
            user.password,
            user.role.as_str(),
            user.created_at,
        ],
    )
    .map_err(|e| DatabaseError::from_sqlite(e, "user email"))?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {COLUMNS} FROM users WHERE id = ?1"))?;
    match stmt.query_row(params![id.to_string()], user_from_row) {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {COLUMNS} FROM users WHERE email = ?1"))?;
    match stmt.query_row(params![email], user_from_row) {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {COLUMNS} FROM users ORDER BY created_at"))?;
    let rows = stmt.query_map([], user_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Replace a user's stored credential (used to upgrade legacy plaintext
/// rows to the hashed form after a successful login).
pub fn set_password(conn: &Connection, id: &Uuid, password: &str) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE users SET password = ?2 WHERE id = ?1",
        params![id.to_string(), password],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn user_from_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let role: String = row.get(4)?;
    Ok(User {
        id: Uuid::parse_str(&id).map_err(|e| conversion_err(0, e))?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        role: UserRole::from_str(&role).map_err(|e| conversion_err(4, e))?,
        created_at: row.get(5)?,
    })
}
