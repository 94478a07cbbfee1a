use dealer_core::RepositoryError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::{Row, TypeInfo, ValueRef};

/// Reads an amount column stored as INTEGER, REAL or numeric TEXT.
/// NULL reads as zero.
pub fn get_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(Decimal::ZERO);
    }

    let type_name = value_ref.type_info().name().to_string();

    match type_name.as_str() {
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get INTEGER from '{}': {}", column, e))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        "TEXT" => {
            let val: String = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get TEXT from '{}': {}", column, e))
            })?;
            val.trim().parse().map_err(|e| {
                RepositoryError::Database(format!(
                    "Column '{}' holds non-numeric text '{}': {}",
                    column, val, e
                ))
            })
        }
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Like [`get_decimal`], but NULL reads as `None`.
pub fn get_optional_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(None);
    }

    get_decimal(row, column).map(Some)
}

/// Amounts are bound as REAL. Whole pesos are exact far beyond any price.
pub fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}
