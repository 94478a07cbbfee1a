use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dealer_core::{
    AuditEntry, CatalogEntry, CatalogKind, DealerRepository, DocumentStatus, DocumentType,
    Expense, NewCatalogEntry, NewExpense, NewSale, NewVehicle, RepositoryError, ReviewState, Sale,
    Vehicle, VehicleDocument, VehicleStatus,
};
use rust_decimal::Decimal;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Decode, Row, Sqlite, Type};
use tracing::{debug, info};

use crate::decimal::{decimal_to_f64, get_decimal, get_optional_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Opens `database_url` (a path, `sqlite:` URL or `:memory:`), creating
    /// the file when missing.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database location: {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        // Every connection to `:memory:` is its own database; keep exactly one alive.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        info!(database = %database_url, "connected to sqlite");
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Executes every `.sql` file in `seeds_dir`, in file name order.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(file = %path.display(), "applied seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

/// Maps unique-constraint violations to [`RepositoryError::Duplicate`].
fn write_error(
    e: sqlx::Error,
    field: &str,
    value: &str,
) -> RepositoryError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => RepositoryError::Duplicate {
            field: field.to_string(),
            value: value.to_string(),
        },
        _ => db_error(e),
    }
}

fn column<'r, T>(
    row: &'r SqliteRow,
    name: &str,
) -> Result<T, RepositoryError>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", name, e)))
}

fn enum_column<T>(
    row: &SqliteRow,
    name: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, RepositoryError> {
    let raw: String = column(row, name)?;
    parse(&raw).ok_or_else(|| {
        RepositoryError::Database(format!("Unknown value '{}' in column '{}'", raw, name))
    })
}

async fn write_audit(
    conn: &mut SqliteConnection,
    entity_type: &str,
    entity_id: i64,
    action: &str,
    before: Option<String>,
    after: Option<String>,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO audit_log (entity_type, entity_id, action, before_data, after_data, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(entity_type)
    .bind(entity_id)
    .bind(action)
    .bind(before)
    .bind(after)
    .bind(Utc::now())
    .execute(conn)
    .await
    .map_err(db_error)?;
    Ok(())
}

fn vehicle_snapshot(
    plate: &str,
    status: VehicleStatus,
    take_price: Decimal,
    list_price: Option<Decimal>,
) -> String {
    format!(
        "plate={};status={};take_price={};list_price={}",
        plate,
        status,
        take_price,
        list_price.map(|p| p.to_string()).unwrap_or_default()
    )
}

fn catalog_snapshot(entry: &CatalogEntry) -> String {
    format!("is_active={};review={}", entry.is_active, entry.review)
}

const VEHICLE_SELECT: &str = "SELECT v.id, v.brand_id, v.model_id, v.trim_id, v.fuel_id,
        v.transmission_id, v.color_id, v.year, v.mileage, v.plate,
        v.take_price, v.info_price, v.zero_km_price, v.suggested_price, v.list_price,
        v.status, v.entry_date, v.sold_at, v.sold_price, v.created_at, v.updated_at,
        b.name AS brand_name, m.name AS model_name, t.name AS trim_name
    FROM vehicles v
    LEFT JOIN catalog_brands b ON b.id = v.brand_id
    LEFT JOIN catalog_models m ON m.id = v.model_id
    LEFT JOIN catalog_trims t ON t.id = v.trim_id";

fn row_to_vehicle(row: &SqliteRow) -> Result<Vehicle, RepositoryError> {
    Ok(Vehicle {
        id: column(row, "id")?,
        brand_id: column(row, "brand_id")?,
        model_id: column(row, "model_id")?,
        trim_id: column(row, "trim_id")?,
        fuel_id: column(row, "fuel_id")?,
        transmission_id: column(row, "transmission_id")?,
        color_id: column(row, "color_id")?,
        year: column(row, "year")?,
        mileage: column(row, "mileage")?,
        plate: column(row, "plate")?,
        take_price: get_decimal(row, "take_price")?,
        info_price: get_optional_decimal(row, "info_price")?,
        zero_km_price: get_optional_decimal(row, "zero_km_price")?,
        suggested_price: get_optional_decimal(row, "suggested_price")?,
        list_price: get_optional_decimal(row, "list_price")?,
        status: enum_column(row, "status", VehicleStatus::parse)?,
        entry_date: column(row, "entry_date")?,
        sold_at: column::<Option<DateTime<Utc>>>(row, "sold_at")?,
        sold_price: get_optional_decimal(row, "sold_price")?,
        brand_name: column(row, "brand_name")?,
        model_name: column(row, "model_name")?,
        trim_name: column(row, "trim_name")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

/// Uniform projection over the per-kind catalog tables.
fn catalog_select(kind: CatalogKind) -> String {
    format!(
        "SELECT id, name, {parent} AS parent_id, is_active, review,
                {critical} AS is_critical, created_at
         FROM {table}",
        parent = kind.parent_column().unwrap_or("NULL"),
        critical = if kind == CatalogKind::DocTypes {
            "is_critical"
        } else {
            "0"
        },
        table = kind.table(),
    )
}

fn row_to_catalog_entry(
    kind: CatalogKind,
    row: &SqliteRow,
) -> Result<CatalogEntry, RepositoryError> {
    Ok(CatalogEntry {
        id: column(row, "id")?,
        kind,
        name: column(row, "name")?,
        parent_id: column(row, "parent_id")?,
        is_active: column(row, "is_active")?,
        review: enum_column(row, "review", ReviewState::parse)?,
        is_critical: column(row, "is_critical")?,
        created_at: column(row, "created_at")?,
    })
}

fn row_to_document(row: &SqliteRow) -> Result<VehicleDocument, RepositoryError> {
    Ok(VehicleDocument {
        id: column(row, "id")?,
        vehicle_id: column(row, "vehicle_id")?,
        doc_type_id: column(row, "doc_type_id")?,
        status: enum_column(row, "status", DocumentStatus::parse)?,
        updated_at: column(row, "updated_at")?,
    })
}

fn row_to_expense(row: &SqliteRow) -> Result<Expense, RepositoryError> {
    Ok(Expense {
        id: column(row, "id")?,
        vehicle_id: column(row, "vehicle_id")?,
        expense_type_id: column(row, "expense_type_id")?,
        amount: get_decimal(row, "amount")?,
        expense_date: column(row, "expense_date")?,
        notes: column(row, "notes")?,
        created_at: column(row, "created_at")?,
    })
}

fn row_to_sale(row: &SqliteRow) -> Result<Sale, RepositoryError> {
    Ok(Sale {
        id: column(row, "id")?,
        vehicle_id: column(row, "vehicle_id")?,
        sold_price: get_decimal(row, "sold_price")?,
        sold_at: column(row, "sold_at")?,
        notes: column(row, "notes")?,
    })
}

#[async_trait]
impl DealerRepository for SqliteRepository {
    async fn list_catalog_entries(
        &self,
        kind: CatalogKind,
        parent_id: Option<i64>,
        include_inactive: bool,
    ) -> Result<Vec<CatalogEntry>, RepositoryError> {
        let parent_filter = kind.parent_column().zip(parent_id);

        let mut sql = format!("{} WHERE (? OR is_active = 1)", catalog_select(kind));
        if let Some((parent_column, _)) = parent_filter {
            sql.push_str(&format!(" AND {} = ?", parent_column));
        }
        sql.push_str(" ORDER BY name COLLATE NOCASE");

        let mut query = sqlx::query(&sql).bind(include_inactive);
        if let Some((_, parent_id)) = parent_filter {
            query = query.bind(parent_id);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(db_error)?;

        rows.iter().map(|row| row_to_catalog_entry(kind, row)).collect()
    }

    async fn get_catalog_entry(
        &self,
        kind: CatalogKind,
        id: i64,
    ) -> Result<CatalogEntry, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", catalog_select(kind)))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_catalog_entry(kind, &row)
    }

    async fn create_catalog_entry(
        &self,
        entry: NewCatalogEntry,
    ) -> Result<CatalogEntry, RepositoryError> {
        let mut columns = vec!["name", "review", "is_active", "created_at"];
        if let Some(parent_column) = entry.kind.parent_column() {
            columns.push(parent_column);
        }
        if entry.kind == CatalogKind::DocTypes {
            columns.push("is_critical");
        }
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            entry.kind.table(),
            columns.join(", "),
            placeholders
        );

        let mut query = sqlx::query(&sql)
            .bind(&entry.name)
            .bind(entry.review.as_str())
            .bind(true)
            .bind(Utc::now());
        if entry.kind.parent_column().is_some() {
            query = query.bind(entry.parent_id);
        }
        if entry.kind == CatalogKind::DocTypes {
            query = query.bind(entry.is_critical);
        }
        let result = query.execute(&self.pool).await.map_err(db_error)?;

        self.get_catalog_entry(entry.kind, result.last_insert_rowid())
            .await
    }

    async fn update_catalog_entry(
        &self,
        entry: &CatalogEntry,
    ) -> Result<(), RepositoryError> {
        let before = self.get_catalog_entry(entry.kind, entry.id).await?;

        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let result = sqlx::query(&format!(
            "UPDATE {} SET is_active = ?, review = ? WHERE id = ?",
            entry.kind.table()
        ))
        .bind(entry.is_active)
        .bind(entry.review.as_str())
        .bind(entry.id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        write_audit(
            &mut tx,
            entry.kind.table(),
            entry.id,
            "update",
            Some(catalog_snapshot(&before)),
            Some(catalog_snapshot(entry)),
        )
        .await?;
        tx.commit().await.map_err(db_error)?;

        Ok(())
    }

    async fn count_catalog_references(
        &self,
        kind: CatalogKind,
        id: i64,
    ) -> Result<i64, RepositoryError> {
        let sql = match kind.vehicle_column() {
            Some(vehicle_column) => {
                format!("SELECT COUNT(*) FROM vehicles WHERE {} = ?", vehicle_column)
            }
            None if kind == CatalogKind::ExpenseTypes => {
                "SELECT COUNT(*) FROM vehicle_expenses WHERE expense_type_id = ?".to_string()
            }
            None => "SELECT COUNT(*) FROM vehicle_documents WHERE doc_type_id = ?".to_string(),
        };

        sqlx::query_scalar::<_, i64>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn list_document_types(&self) -> Result<Vec<DocumentType>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, is_critical, is_active, review, created_at
             FROM catalog_doc_types
             ORDER BY is_critical DESC, name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter()
            .map(|row| {
                Ok(DocumentType {
                    id: column(row, "id")?,
                    name: column(row, "name")?,
                    is_critical: column(row, "is_critical")?,
                    is_active: column(row, "is_active")?,
                    review: enum_column(row, "review", ReviewState::parse)?,
                    created_at: column(row, "created_at")?,
                })
            })
            .collect()
    }

    async fn create_vehicle(
        &self,
        vehicle: NewVehicle,
    ) -> Result<Vehicle, RepositoryError> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let result = sqlx::query(
            "INSERT INTO vehicles (
                brand_id, model_id, trim_id, fuel_id, transmission_id, color_id,
                year, mileage, plate, take_price, info_price, zero_km_price,
                suggested_price, list_price, status, entry_date, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(vehicle.brand_id)
        .bind(vehicle.model_id)
        .bind(vehicle.trim_id)
        .bind(vehicle.fuel_id)
        .bind(vehicle.transmission_id)
        .bind(vehicle.color_id)
        .bind(vehicle.year)
        .bind(vehicle.mileage)
        .bind(&vehicle.plate)
        .bind(decimal_to_f64(vehicle.take_price))
        .bind(vehicle.info_price.map(decimal_to_f64))
        .bind(vehicle.zero_km_price.map(decimal_to_f64))
        .bind(vehicle.suggested_price.map(decimal_to_f64))
        .bind(vehicle.list_price.map(decimal_to_f64))
        .bind(VehicleStatus::InStock.as_str())
        .bind(vehicle.entry_date)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error(e, "plate", &vehicle.plate))?;

        let id = result.last_insert_rowid();
        write_audit(
            &mut tx,
            "vehicles",
            id,
            "create",
            None,
            Some(vehicle_snapshot(
                &vehicle.plate,
                VehicleStatus::InStock,
                vehicle.take_price,
                vehicle.list_price,
            )),
        )
        .await?;
        tx.commit().await.map_err(db_error)?;

        self.get_vehicle(id).await
    }

    async fn update_vehicle(
        &self,
        id: i64,
        vehicle: NewVehicle,
    ) -> Result<Vehicle, RepositoryError> {
        let before = self.get_vehicle(id).await?;

        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let result = sqlx::query(
            "UPDATE vehicles SET
                brand_id = ?, model_id = ?, trim_id = ?, fuel_id = ?, transmission_id = ?,
                color_id = ?, year = ?, mileage = ?, plate = ?, take_price = ?, info_price = ?,
                zero_km_price = ?, suggested_price = ?, list_price = ?, entry_date = ?,
                updated_at = ?
             WHERE id = ?",
        )
        .bind(vehicle.brand_id)
        .bind(vehicle.model_id)
        .bind(vehicle.trim_id)
        .bind(vehicle.fuel_id)
        .bind(vehicle.transmission_id)
        .bind(vehicle.color_id)
        .bind(vehicle.year)
        .bind(vehicle.mileage)
        .bind(&vehicle.plate)
        .bind(decimal_to_f64(vehicle.take_price))
        .bind(vehicle.info_price.map(decimal_to_f64))
        .bind(vehicle.zero_km_price.map(decimal_to_f64))
        .bind(vehicle.suggested_price.map(decimal_to_f64))
        .bind(vehicle.list_price.map(decimal_to_f64))
        .bind(vehicle.entry_date)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error(e, "plate", &vehicle.plate))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        write_audit(
            &mut tx,
            "vehicles",
            id,
            "update",
            Some(vehicle_snapshot(
                &before.plate,
                before.status,
                before.take_price,
                before.list_price,
            )),
            Some(vehicle_snapshot(
                &vehicle.plate,
                before.status,
                vehicle.take_price,
                vehicle.list_price,
            )),
        )
        .await?;
        tx.commit().await.map_err(db_error)?;

        self.get_vehicle(id).await
    }

    async fn get_vehicle(
        &self,
        id: i64,
    ) -> Result<Vehicle, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE v.id = ?", VEHICLE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_vehicle(&row)
    }

    async fn list_vehicles(
        &self,
        status: Option<VehicleStatus>,
    ) -> Result<Vec<Vehicle>, RepositoryError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "{} WHERE v.status = ? ORDER BY v.created_at DESC, v.id DESC",
                    VEHICLE_SELECT
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "{} ORDER BY v.created_at DESC, v.id DESC",
                    VEHICLE_SELECT
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_error)?;

        rows.iter().map(row_to_vehicle).collect()
    }

    async fn set_vehicle_status(
        &self,
        id: i64,
        status: VehicleStatus,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let result = sqlx::query(
            "UPDATE vehicles SET status = ?, updated_at = ? WHERE id = ? AND status != 'sold'",
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        write_audit(
            &mut tx,
            "vehicles",
            id,
            "status",
            None,
            Some(format!("status={}", status)),
        )
        .await?;
        tx.commit().await.map_err(db_error)?;

        Ok(())
    }

    async fn list_vehicle_documents(
        &self,
        vehicle_id: Option<i64>,
    ) -> Result<Vec<VehicleDocument>, RepositoryError> {
        const BASE_QUERY: &str =
            "SELECT id, vehicle_id, doc_type_id, status, updated_at FROM vehicle_documents";

        let rows = match vehicle_id {
            Some(vehicle_id) => {
                sqlx::query(&format!("{} WHERE vehicle_id = ? ORDER BY id", BASE_QUERY))
                    .bind(vehicle_id)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY id", BASE_QUERY))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db_error)?;

        rows.iter().map(row_to_document).collect()
    }

    async fn set_document_status(
        &self,
        vehicle_id: i64,
        doc_type_id: i64,
        status: DocumentStatus,
    ) -> Result<VehicleDocument, RepositoryError> {
        sqlx::query(
            "INSERT INTO vehicle_documents (vehicle_id, doc_type_id, status, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (vehicle_id, doc_type_id)
             DO UPDATE SET status = excluded.status, updated_at = excluded.updated_at",
        )
        .bind(vehicle_id)
        .bind(doc_type_id)
        .bind(status.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let row = sqlx::query(
            "SELECT id, vehicle_id, doc_type_id, status, updated_at
             FROM vehicle_documents WHERE vehicle_id = ? AND doc_type_id = ?",
        )
        .bind(vehicle_id)
        .bind(doc_type_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_document(&row)
    }

    async fn add_expense(
        &self,
        expense: NewExpense,
    ) -> Result<Expense, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO vehicle_expenses (
                vehicle_id, expense_type_id, amount, expense_date, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(expense.vehicle_id)
        .bind(expense.expense_type_id)
        .bind(decimal_to_f64(expense.amount))
        .bind(expense.expense_date)
        .bind(&expense.notes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let row = sqlx::query(
            "SELECT id, vehicle_id, expense_type_id, amount, expense_date, notes, created_at
             FROM vehicle_expenses WHERE id = ?",
        )
        .bind(result.last_insert_rowid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_expense(&row)
    }

    async fn delete_expense(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM vehicle_expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_expenses(
        &self,
        vehicle_id: Option<i64>,
    ) -> Result<Vec<Expense>, RepositoryError> {
        const BASE_QUERY: &str =
            "SELECT id, vehicle_id, expense_type_id, amount, expense_date, notes, created_at
             FROM vehicle_expenses";

        let rows = match vehicle_id {
            Some(vehicle_id) => {
                sqlx::query(&format!(
                    "{} WHERE vehicle_id = ? ORDER BY expense_date, id",
                    BASE_QUERY
                ))
                .bind(vehicle_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY expense_date, id", BASE_QUERY))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db_error)?;

        rows.iter().map(row_to_expense).collect()
    }

    async fn record_sale(
        &self,
        sale: NewSale,
    ) -> Result<Sale, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        // Only unsold rows match, so sold_price and sold_at are written once.
        let result = sqlx::query(
            "UPDATE vehicles SET status = 'sold', sold_price = ?, sold_at = ?, updated_at = ?
             WHERE id = ? AND status != 'sold'",
        )
        .bind(decimal_to_f64(sale.sold_price))
        .bind(sale.sold_at)
        .bind(Utc::now())
        .bind(sale.vehicle_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let inserted = sqlx::query(
            "INSERT INTO sales (vehicle_id, sold_price, sold_at, notes) VALUES (?, ?, ?, ?)",
        )
        .bind(sale.vehicle_id)
        .bind(decimal_to_f64(sale.sold_price))
        .bind(sale.sold_at)
        .bind(&sale.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error(e, "sale", &sale.vehicle_id.to_string()))?;

        write_audit(
            &mut tx,
            "vehicles",
            sale.vehicle_id,
            "sale",
            None,
            Some(format!("status=sold;sold_price={}", sale.sold_price)),
        )
        .await?;
        tx.commit().await.map_err(db_error)?;

        Ok(Sale {
            id: inserted.last_insert_rowid(),
            vehicle_id: sale.vehicle_id,
            sold_price: sale.sold_price,
            sold_at: sale.sold_at,
            notes: sale.notes,
        })
    }

    async fn list_sales(&self) -> Result<Vec<Sale>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, vehicle_id, sold_price, sold_at, notes
             FROM sales ORDER BY sold_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_sale).collect()
    }

    async fn list_audit_entries(
        &self,
        limit: i64,
    ) -> Result<Vec<AuditEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, entity_type, entity_id, action, before_data, after_data, created_at
             FROM audit_log ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter()
            .map(|row| {
                Ok(AuditEntry {
                    id: column(row, "id")?,
                    entity_type: column(row, "entity_type")?,
                    entity_id: column(row, "entity_id")?,
                    action: column(row, "action")?,
                    before: column(row, "before_data")?,
                    after: column(row, "after_data")?,
                    created_at: column(row, "created_at")?,
                })
            })
            .collect()
    }
}
