use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pesticide or control product applied during inspections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub active_ingredient: Option<String>,
    pub registration_number: Option<String>,
    pub category: Option<String>,
    pub presentation: Option<String>,
    pub created_at: NaiveDateTime,
}
