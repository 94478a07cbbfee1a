use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the append-only audit trail.
///
/// `before` and `after` hold a compact textual snapshot of the changed
/// fields; the store decides the exact shape per entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub action: String,
    pub before: Option<String>,
    pub after: Option<String>,
    pub created_at: DateTime<Utc>,
}
