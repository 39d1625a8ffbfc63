use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// SHA-256 hex of the password. Never serialized into API responses.
    #[serde(skip_serializing)]
    pub password: String,
    pub role: UserRole,
    pub created_at: NaiveDateTime,
}
