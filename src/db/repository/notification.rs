use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Notification;

use super::conversion_err;

const COLUMNS: &str = "id, user_id, title, body, read, created_at";

pub fn insert_notification(
    conn: &Connection,
    notification: &Notification,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (id, user_id, title, body, read, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            notification.id.to_string(),
            notification.user_id.to_string(),
            notification.title,
            notification.body,
            notification.read as i32,
            notification.created_at,
        ],
    )
    .map_err(|e| DatabaseError::from_sqlite(e, "notification user"))?;
    Ok(())
}

pub fn list_notifications_by_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM notifications WHERE user_id = ?1 ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![user_id.to_string()], notification_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn mark_notification_read(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE notifications SET read = 1 WHERE id = ?1",
        params![id.to_string()],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Notification".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn notification_from_row(row: &rusqlite::Row) -> rusqlite::Result<Notification> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    Ok(Notification {
        id: Uuid::parse_str(&id).map_err(|e| conversion_err(0, e))?,
        user_id: Uuid::parse_str(&user_id).map_err(|e| conversion_err(1, e))?,
        title: row.get(2)?,
        body: row.get(3)?,
        read: row.get::<_, i32>(4)? != 0,
        created_at: row.get(5)?,
    })
}
