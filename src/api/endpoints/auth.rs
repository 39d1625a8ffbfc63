//! Registration and login.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{hash_password, ApiContext, DataBody};
use crate::db::repository::user;
use crate::models::enums::UserRole;
use crate::models::User;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/register`
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<DataBody<User>>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(ApiError::Validation("a valid email is required".into()));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::Validation(
            "password must be at least 6 characters".into(),
        ));
    }

    let new_user = User {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_lowercase(),
        password: hash_password(&payload.password),
        role: payload.role,
        created_at: Utc::now().naive_utc(),
    };

    let conn = ctx.open_db()?;
    user::insert_user(&conn, &new_user)?;
    tracing::info!(user_id = %new_user.id, "User registered");
    Ok((StatusCode::CREATED, Json(DataBody::new(new_user))))
}

/// `POST /api/auth/login`
///
/// Accounts created before password hashing hold plaintext; a successful
/// plaintext match upgrades the row to the hashed form.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<DataBody<User>>, ApiError> {
    let conn = ctx.open_db()?;
    let found = user::get_user_by_email(&conn, &payload.email.trim().to_lowercase())?
        .ok_or(ApiError::Unauthorized)?;

    let hashed = hash_password(&payload.password);
    if found.password == hashed {
        return Ok(Json(DataBody::new(found)));
    }
    if found.password == payload.password {
        user::set_password(&conn, &found.id, &hashed)?;
        tracing::info!(user_id = %found.id, "Legacy password upgraded to hash");
        let mut upgraded = found;
        upgraded.password = hashed;
        return Ok(Json(DataBody::new(upgraded)));
    }
    Err(ApiError::Unauthorized)
}
