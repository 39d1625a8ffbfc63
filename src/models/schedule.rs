use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ScheduleStatus;

/// A planned visit: which technician goes to which service, when.
/// Plain rows — no scheduler runs against these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub service_id: Uuid,
    pub user_id: Uuid,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub status: ScheduleStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}
