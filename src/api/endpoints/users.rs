use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DataBody};
use crate::db::repository::user;
use crate::models::User;

/// `GET /api/users`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<DataBody<Vec<User>>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(DataBody::new(user::list_users(&conn)?)))
}

/// `GET /api/users/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataBody<User>>, ApiError> {
    let conn = ctx.open_db()?;
    let found = user::get_user(&conn, &id)?.ok_or_else(|| ApiError::NotFound {
        entity_type: "User".into(),
        id: id.to_string(),
    })?;
    Ok(Json(DataBody::new(found)))
}
