//! Document completeness and sale-eligibility gate.
//!
//! Every vehicle carries a set of document records, one per document type at
//! most. The active document types define what a complete file looks like;
//! critical types additionally block the sale until they are `ok`.
//!
//! # Signal
//!
//! | Signal   | Condition |
//! |----------|-----------|
//! | `Red`    | some critical type has no `ok` record |
//! | `Yellow` | every critical type is `ok`, some other type is not |
//! | `Green`  | every active type has an `ok` record |
//!
//! A vehicle can be sold while `Yellow`, never while `Red`.
//!
//! An empty set of document types reads as `Red` unless the caller
//! explicitly confirms that no documents are required, see
//! [`DocumentRequirements::confirm_none_required`].
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use dealer_core::calculations::{DocumentRequirements, Signal};
//! use dealer_core::{DocumentStatus, DocumentType, ReviewState, VehicleDocument};
//!
//! let doc_type = |id, is_critical| DocumentType {
//!     id,
//!     name: format!("doc {id}"),
//!     is_critical,
//!     is_active: true,
//!     review: ReviewState::Approved,
//!     created_at: Utc::now(),
//! };
//! let record = |doc_type_id, status| VehicleDocument {
//!     id: doc_type_id,
//!     vehicle_id: 1,
//!     doc_type_id,
//!     status,
//!     updated_at: Utc::now(),
//! };
//!
//! let types = vec![doc_type(1, true), doc_type(2, false)];
//! let records = vec![record(1, DocumentStatus::Ok), record(2, DocumentStatus::InProgress)];
//!
//! let readiness = DocumentRequirements::new(&types).evaluate(&records);
//!
//! assert_eq!(readiness.signal, Signal::Yellow);
//! assert!(readiness.can_sell);
//! assert_eq!(readiness.missing_optional, vec![2]);
//! ```

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{DocumentStatus, DocumentType, VehicleDocument};

/// Traffic-light summary of a vehicle's document file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Red,
    Yellow,
    Green,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Red => "Docs Críticos Faltantes",
            Self::Yellow => "Docs Pendientes",
            Self::Green => "Completo",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating a vehicle's documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReadiness {
    pub signal: Signal,

    /// Whether every critical document type has an `ok` record.
    pub can_sell: bool,

    /// Critical document type ids without an `ok` record, ascending.
    pub missing_critical: Vec<i64>,

    /// Non-critical document type ids without an `ok` record, ascending.
    pub missing_optional: Vec<i64>,
}

/// The active document types a vehicle is measured against.
#[derive(Debug, Clone)]
pub struct DocumentRequirements<'a> {
    types: Vec<&'a DocumentType>,
    none_required: bool,
}

impl<'a> DocumentRequirements<'a> {
    /// Builds the requirement set from catalog document types.
    ///
    /// Inactive types are ignored, so callers may pass the whole catalog.
    pub fn new(types: &'a [DocumentType]) -> Self {
        Self {
            types: types.iter().filter(|t| t.is_active).collect(),
            none_required: false,
        }
    }

    /// Marks an empty requirement set as intentionally empty.
    ///
    /// Without this an empty set evaluates to [`Signal::Red`]. Has no effect
    /// when at least one active type is present.
    pub fn confirm_none_required(mut self) -> Self {
        self.none_required = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn critical_count(&self) -> usize {
        self.types.iter().filter(|t| t.is_critical).count()
    }

    /// Evaluates one vehicle's document records.
    ///
    /// Records may arrive in any order and may contain several entries for
    /// the same type; any `ok` record satisfies its type. Records for types
    /// outside the requirement set are ignored.
    pub fn evaluate(
        &self,
        records: &[VehicleDocument],
    ) -> DocumentReadiness {
        if self.types.is_empty() {
            return if self.none_required {
                DocumentReadiness {
                    signal: Signal::Green,
                    can_sell: true,
                    missing_critical: Vec::new(),
                    missing_optional: Vec::new(),
                }
            } else {
                DocumentReadiness {
                    signal: Signal::Red,
                    can_sell: false,
                    missing_critical: Vec::new(),
                    missing_optional: Vec::new(),
                }
            };
        }

        let ok_types: HashSet<i64> = records
            .iter()
            .filter(|r| r.status == DocumentStatus::Ok)
            .map(|r| r.doc_type_id)
            .collect();

        let mut missing_critical = BTreeSet::new();
        let mut missing_optional = BTreeSet::new();
        for doc_type in &self.types {
            if ok_types.contains(&doc_type.id) {
                continue;
            }
            if doc_type.is_critical {
                missing_critical.insert(doc_type.id);
            } else {
                missing_optional.insert(doc_type.id);
            }
        }

        // A type listed twice with different criticality counts as critical.
        missing_optional.retain(|id| !missing_critical.contains(id));

        let signal = if !missing_critical.is_empty() {
            Signal::Red
        } else if !missing_optional.is_empty() {
            Signal::Yellow
        } else {
            Signal::Green
        };

        DocumentReadiness {
            signal,
            can_sell: missing_critical.is_empty(),
            missing_critical: missing_critical.into_iter().collect(),
            missing_optional: missing_optional.into_iter().collect(),
        }
    }
}
