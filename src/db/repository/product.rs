use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Product;

use super::conversion_err;

const COLUMNS: &str =
    "id, name, active_ingredient, registration_number, category, presentation, created_at";

pub fn insert_product(conn: &Connection, product: &Product) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO products (id, name, active_ingredient, registration_number, category, presentation, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            product.id.to_string(),
            product.name,
            product.active_ingredient,
            product.registration_number,
            product.category,
            product.presentation,
            product.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_product(conn: &Connection, id: &Uuid) -> Result<Option<Product>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM products WHERE id = ?1"))?;
    match stmt.query_row(params![id.to_string()], product_from_row) {
        Ok(product) => Ok(Some(product)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_products(conn: &Connection) -> Result<Vec<Product>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM products ORDER BY name"))?;
    let rows = stmt.query_map([], product_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn update_product(conn: &Connection, product: &Product) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE products SET name = ?2, active_ingredient = ?3, registration_number = ?4,
         category = ?5, presentation = ?6
         WHERE id = ?1",
        params![
            product.id.to_string(),
            product.name,
            product.active_ingredient,
            product.registration_number,
            product.category,
            product.presentation,
        ],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Product".into(),
            id: product.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_product(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let rows = conn.execute("DELETE FROM products WHERE id = ?1", params![id.to_string()])?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Product".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn product_from_row(row: &rusqlite::Row) -> rusqlite::Result<Product> {
    let id: String = row.get(0)?;
    Ok(Product {
        id: Uuid::parse_str(&id).map_err(|e| conversion_err(0, e))?,
        name: row.get(1)?,
        active_ingredient: row.get(2)?,
        registration_number: row.get(3)?,
        category: row.get(4)?,
        presentation: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use chrono::Utc;

    fn sample_product() -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Bromatrol Block".into(),
            active_ingredient: Some("bromadiolone 0.005%".into()),
            registration_number: Some("RSCO-1234".into()),
            category: Some("rodenticide".into()),
            presentation: Some("20g block".into()),
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn insert_get_update_delete() {
        let conn = open_memory_database().unwrap();
        let mut product = sample_product();
        insert_product(&conn, &product).unwrap();

        product.presentation = Some("bulk 5kg".into());
        update_product(&conn, &product).unwrap();

        let found = get_product(&conn, &product.id).unwrap().unwrap();
        assert_eq!(found.presentation.as_deref(), Some("bulk 5kg"));

        delete_product(&conn, &product.id).unwrap();
        assert!(get_product(&conn, &product.id).unwrap().is_none());
    }
}
