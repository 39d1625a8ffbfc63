use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fixed control station (bait box, trap, UV lamp) at a service site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: Uuid,
    pub service_id: Uuid,
    pub code: String,
    pub station_type: String,
    pub location: Option<String>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}
