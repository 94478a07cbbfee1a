use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub vehicle_id: i64,
    pub expense_type_id: i64,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// For creating new expenses (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub vehicle_id: i64,
    pub expense_type_id: i64,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub notes: Option<String>,
}
