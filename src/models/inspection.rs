use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A technician visit against a service.
///
/// Lifecycle: created with date/time/type, updated with duration and
/// observations during the visit, and closed by the findings save which
/// writes the reconciled findings document and stamps `exit_time`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inspection {
    pub id: Uuid,
    pub service_id: Uuid,
    pub inspection_date: String,
    pub inspection_time: String,
    pub inspection_type: String,
    pub sub_type: Option<String>,
    pub duration_minutes: Option<i64>,
    pub observations: Option<String>,
    /// Reconciled findings document; replaced wholesale on every save.
    pub findings: Option<serde_json::Value>,
    pub exit_time: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}
