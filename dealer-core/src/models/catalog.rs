use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The catalogs a vehicle or its records can point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Brands,
    Models,
    Trims,
    Fuels,
    Transmissions,
    Colors,
    ExpenseTypes,
    DocTypes,
}

impl CatalogKind {
    pub fn all() -> &'static [CatalogKind] {
        &[
            CatalogKind::Brands,
            CatalogKind::Models,
            CatalogKind::Trims,
            CatalogKind::Fuels,
            CatalogKind::Transmissions,
            CatalogKind::Colors,
            CatalogKind::ExpenseTypes,
            CatalogKind::DocTypes,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brands => "brands",
            Self::Models => "models",
            Self::Trims => "trims",
            Self::Fuels => "fuels",
            Self::Transmissions => "transmissions",
            Self::Colors => "colors",
            Self::ExpenseTypes => "expense_types",
            Self::DocTypes => "doc_types",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.as_str() == s)
    }

    /// Backing table name. Never derived from user input.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Brands => "catalog_brands",
            Self::Models => "catalog_models",
            Self::Trims => "catalog_trims",
            Self::Fuels => "catalog_fuels",
            Self::Transmissions => "catalog_transmissions",
            Self::Colors => "catalog_colors",
            Self::ExpenseTypes => "catalog_expense_types",
            Self::DocTypes => "catalog_doc_types",
        }
    }

    /// Column holding the parent id for dependent catalogs.
    pub fn parent_column(&self) -> Option<&'static str> {
        match self {
            Self::Models => Some("brand_id"),
            Self::Trims => Some("model_id"),
            _ => None,
        }
    }

    /// Column on `vehicles` that references this catalog, when there is one.
    pub fn vehicle_column(&self) -> Option<&'static str> {
        match self {
            Self::Brands => Some("brand_id"),
            Self::Models => Some("model_id"),
            Self::Trims => Some("trim_id"),
            Self::Fuels => Some("fuel_id"),
            Self::Transmissions => Some("transmission_id"),
            Self::Colors => Some("color_id"),
            Self::ExpenseTypes | Self::DocTypes => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Brands => "Marcas",
            Self::Models => "Modelos",
            Self::Trims => "Versiones",
            Self::Fuels => "Combustibles",
            Self::Transmissions => "Transmisiones",
            Self::Colors => "Colores",
            Self::ExpenseTypes => "Tipos de Gasto",
            Self::DocTypes => "Tipos de Doc",
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review lifecycle of a catalog entry.
///
/// Entries created inline from a form start as `Pending` and are usable
/// right away. Back-office review moves them to `Approved` or `Rejected`;
/// both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move a catalog entry from {from} to {to}")]
pub struct ReviewTransitionError {
    pub from: ReviewState,
    pub to: ReviewState,
}

impl ReviewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn needs_review(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Applies a review decision. Only `Pending` entries can be decided.
    pub fn transition(
        self,
        to: ReviewState,
    ) -> Result<ReviewState, ReviewTransitionError> {
        match (self, to) {
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected) => Ok(to),
            _ => Err(ReviewTransitionError { from: self, to }),
        }
    }
}

impl std::fmt::Display for ReviewState {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub kind: CatalogKind,
    pub name: String,
    pub parent_id: Option<i64>,
    pub is_active: bool,
    pub review: ReviewState,
    /// Only meaningful for [`CatalogKind::DocTypes`].
    pub is_critical: bool,
    pub created_at: DateTime<Utc>,
}

/// For creating new catalog entries (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCatalogEntry {
    pub kind: CatalogKind,
    pub name: String,
    pub parent_id: Option<i64>,
    pub is_critical: bool,
    pub review: ReviewState,
}
