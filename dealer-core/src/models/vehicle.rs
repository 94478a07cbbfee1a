use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    InStock,
    Reserved,
    Sold,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::Reserved => "reserved",
            Self::Sold => "sold",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in_stock" => Some(Self::InStock),
            "reserved" => Some(Self::Reserved),
            "sold" => Some(Self::Sold),
            _ => None,
        }
    }

    /// Label used on reports and listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InStock => "En Stock",
            Self::Reserved => "Reservado",
            Self::Sold => "Vendido",
        }
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,

    // Catalog references
    pub brand_id: i64,
    pub model_id: i64,
    pub trim_id: Option<i64>,
    pub fuel_id: Option<i64>,
    pub transmission_id: Option<i64>,
    pub color_id: Option<i64>,

    pub year: i32,
    pub mileage: i64,
    pub plate: String,

    // Prices
    pub take_price: Decimal,
    pub info_price: Option<Decimal>,
    pub zero_km_price: Option<Decimal>,
    pub suggested_price: Option<Decimal>,
    pub list_price: Option<Decimal>,

    pub status: VehicleStatus,
    pub entry_date: NaiveDate,
    pub sold_at: Option<DateTime<Utc>>,
    pub sold_price: Option<Decimal>,

    // Joined catalog names
    pub brand_name: Option<String>,
    pub model_name: Option<String>,
    pub trim_name: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn financials(&self) -> VehicleFinancials {
        VehicleFinancials {
            take_price: self.take_price,
            list_price: self.list_price,
            sold_price: self.sold_price,
            status: self.status,
        }
    }

    /// "Brand Model" as shown in listings; missing names are skipped.
    pub fn display_name(&self) -> String {
        [self.brand_name.as_deref(), self.model_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Case-insensitive match against brand, model, plate and year.
    pub fn matches_search(
        &self,
        term: &str,
    ) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        let haystack = format!(
            "{} {} {} {}",
            self.brand_name.as_deref().unwrap_or_default(),
            self.model_name.as_deref().unwrap_or_default(),
            self.plate,
            self.year
        )
        .to_lowercase();
        haystack.contains(&term)
    }
}

/// The price fields the profitability calculator reads from a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleFinancials {
    pub take_price: Decimal,
    pub list_price: Option<Decimal>,
    pub sold_price: Option<Decimal>,
    pub status: VehicleStatus,
}

/// For creating or editing vehicles (no id, status or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDraft {
    pub brand_id: Option<i64>,
    pub model_id: Option<i64>,
    pub trim_id: Option<i64>,
    pub fuel_id: Option<i64>,
    pub transmission_id: Option<i64>,
    pub color_id: Option<i64>,
    pub year: i32,
    pub mileage: i64,
    pub plate: String,
    pub take_price: Decimal,
    pub info_price: Option<Decimal>,
    pub zero_km_price: Option<Decimal>,
    pub suggested_price: Option<Decimal>,
    pub list_price: Option<Decimal>,
    pub entry_date: NaiveDate,
}

/// A validated draft, ready to hand to the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub brand_id: i64,
    pub model_id: i64,
    pub trim_id: Option<i64>,
    pub fuel_id: Option<i64>,
    pub transmission_id: Option<i64>,
    pub color_id: Option<i64>,
    pub year: i32,
    pub mileage: i64,
    pub plate: String,
    pub take_price: Decimal,
    pub info_price: Option<Decimal>,
    pub zero_km_price: Option<Decimal>,
    pub suggested_price: Option<Decimal>,
    pub list_price: Option<Decimal>,
    pub entry_date: NaiveDate,
}

/// Plates are stored upper-cased with surrounding whitespace removed.
pub fn normalize_plate(plate: &str) -> String {
    plate.trim().to_uppercase()
}
