use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub vehicle_id: i64,
    pub sold_price: Decimal,
    pub sold_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// For recording a sale (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSale {
    pub vehicle_id: i64,
    pub sold_price: Decimal,
    pub sold_at: DateTime<Utc>,
    pub notes: Option<String>,
}
