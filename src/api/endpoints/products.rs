use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DataBody, MessageBody};
use crate::db::repository::product;
use crate::models::Product;

#[derive(Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub active_ingredient: Option<String>,
    pub registration_number: Option<String>,
    pub category: Option<String>,
    pub presentation: Option<String>,
}

/// `POST /api/products`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<DataBody<Product>>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    let new_product = Product {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_string(),
        active_ingredient: payload.active_ingredient,
        registration_number: payload.registration_number,
        category: payload.category,
        presentation: payload.presentation,
        created_at: Utc::now().naive_utc(),
    };
    let conn = ctx.open_db()?;
    product::insert_product(&conn, &new_product)?;
    Ok((StatusCode::CREATED, Json(DataBody::new(new_product))))
}

/// `GET /api/products`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<DataBody<Vec<Product>>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(DataBody::new(product::list_products(&conn)?)))
}

/// `GET /api/products/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataBody<Product>>, ApiError> {
    let conn = ctx.open_db()?;
    let found = product::get_product(&conn, &id)?.ok_or_else(|| ApiError::NotFound {
        entity_type: "Product".into(),
        id: id.to_string(),
    })?;
    Ok(Json(DataBody::new(found)))
}

/// `PUT /api/products/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<DataBody<Product>>, ApiError> {
    let conn = ctx.open_db()?;
    let existing = product::get_product(&conn, &id)?.ok_or_else(|| ApiError::NotFound {
        entity_type: "Product".into(),
        id: id.to_string(),
    })?;
    let updated = Product {
        name: payload.name.trim().to_string(),
        active_ingredient: payload.active_ingredient,
        registration_number: payload.registration_number,
        category: payload.category,
        presentation: payload.presentation,
        ..existing
    };
    product::update_product(&conn, &updated)?;
    Ok(Json(DataBody::new(updated)))
}

/// `DELETE /api/products/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageBody>, ApiError> {
    let conn = ctx.open_db()?;
    product::delete_product(&conn, &id)?;
    Ok(Json(MessageBody::new("Product deleted")))
}
