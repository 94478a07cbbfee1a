use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::ReviewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Missing,
    InProgress,
    Ok,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::InProgress => "in_progress",
            Self::Ok => "ok",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "missing" => Some(Self::Missing),
            "in_progress" => Some(Self::InProgress),
            "ok" => Some(Self::Ok),
            _ => None,
        }
    }
}

/// A document category. Critical types gate the sale of a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    pub id: i64,
    pub name: String,
    pub is_critical: bool,
    pub is_active: bool,
    pub review: ReviewState,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDocument {
    pub id: i64,
    pub vehicle_id: i64,
    pub doc_type_id: i64,
    pub status: DocumentStatus,
    pub updated_at: DateTime<Utc>,
}
