use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;

use dealer_core::calculations::{DashboardSummary, ProfitabilityResult};
use dealer_core::db::DbConfig;
use dealer_core::format::{
    format_currency, format_date, format_number, format_percent, parse_amount,
};
use dealer_core::services::{InventoryFilter, SaleRequest};
use dealer_core::{
    CatalogEntry, CatalogKind, DealerError, DocumentStatus, NewExpense, ReviewState, VehicleDraft,
    VehicleStatus,
};

use crate::app::{self, Services};
use crate::export::ReportExporter;

/// Back office for a used-vehicle dealership.
///
/// Tracks stock, document files, expenses and sales, and reports margins
/// computed the same way on every screen.
#[derive(Debug, Parser)]
#[command(name = "dealer", version)]
pub struct Cli {
    /// Storage backend.
    #[arg(long, global = true, default_value = "sqlite")]
    pub backend: String,

    /// Connection string. For SQLite a file path or `:memory:`.
    #[arg(long, global = true, default_value = "dealer.db")]
    pub db: String,

    /// Log filter, e.g. `debug` or `dealer_core=trace`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Treat an empty document-type catalog as nothing to collect instead
    /// of blocking every sale.
    #[arg(long, global = true)]
    pub no_documents_required: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List vehicles with their document signal and margin.
    Inventory(InventoryArgs),

    /// Show one vehicle: documents, expenses and profitability.
    Vehicle { id: i64 },

    /// Register a vehicle, or edit one with `--id`.
    Intake(IntakeArgs),

    /// Set the status of one document of a vehicle.
    Document {
        vehicle_id: i64,
        doc_type_id: i64,
        /// missing, in_progress or ok
        #[arg(value_parser = parse_document_status)]
        status: DocumentStatus,
    },

    /// Log or remove vehicle expenses.
    #[command(subcommand)]
    Expense(ExpenseCommand),

    /// Put a vehicle on hold, or release it with `--release`.
    Reserve {
        id: i64,
        #[arg(long)]
        release: bool,
    },

    /// Record the sale of a vehicle.
    Sell(SellArgs),

    /// Completed sales with realized margins.
    Sales,

    /// Stock, sales and document figures for the dashboard.
    Summary,

    /// Write the inventory listing as CSV.
    ExportInventory {
        /// Defaults to `Inventario_<date>.csv` in the working directory.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, value_parser = parse_vehicle_status)]
        status: Option<VehicleStatus>,
    },

    /// Write the accounting sales report as CSV.
    ExportSales {
        /// Defaults to `Reporte_Ventas_Contable_<date>.csv`.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Browse and review catalogs.
    #[command(subcommand)]
    Catalog(CatalogCommand),

    /// Most recent changes, newest first.
    Audit {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[derive(Debug, Args)]
pub struct InventoryArgs {
    /// in_stock, reserved or sold
    #[arg(long, value_parser = parse_vehicle_status)]
    pub status: Option<VehicleStatus>,

    /// Matches brand, model, plate or year.
    #[arg(long)]
    pub search: Option<String>,
}

/// Catalog values are given by name; unknown names are added for review.
#[derive(Debug, Args)]
pub struct IntakeArgs {
    /// Edit this vehicle instead of creating one.
    #[arg(long)]
    pub id: Option<i64>,

    #[arg(long)]
    pub brand: String,
    #[arg(long)]
    pub model: String,
    #[arg(long)]
    pub trim: Option<String>,
    #[arg(long)]
    pub fuel: Option<String>,
    #[arg(long)]
    pub transmission: Option<String>,
    #[arg(long)]
    pub color: Option<String>,

    #[arg(long)]
    pub year: i32,
    #[arg(long, default_value_t = 0)]
    pub mileage: i64,
    #[arg(long)]
    pub plate: String,

    #[arg(long, value_parser = parse_money)]
    pub take_price: Decimal,
    #[arg(long, value_parser = parse_money)]
    pub info_price: Option<Decimal>,
    #[arg(long, value_parser = parse_money)]
    pub zero_km_price: Option<Decimal>,
    #[arg(long, value_parser = parse_money)]
    pub suggested_price: Option<Decimal>,
    #[arg(long, value_parser = parse_money)]
    pub list_price: Option<Decimal>,

    /// Defaults to today.
    #[arg(long)]
    pub entry_date: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum ExpenseCommand {
    /// Log an expense; the type is given by name.
    Add {
        vehicle_id: i64,
        #[arg(long = "type")]
        expense_type: String,
        #[arg(long, value_parser = parse_money)]
        amount: Decimal,
        /// Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },

    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct SellArgs {
    pub id: i64,

    /// Defaults to the list price.
    #[arg(long, value_parser = parse_money)]
    pub price: Option<Decimal>,

    /// Defaults to now.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// Entries of one catalog, pending review first.
    List {
        #[arg(value_parser = parse_catalog_kind)]
        kind: CatalogKind,
        /// Brand id for models, model id for trims.
        #[arg(long)]
        parent: Option<i64>,
        /// Include inactive entries.
        #[arg(long)]
        all: bool,
    },

    /// Add an entry, or reuse the active one with the same name.
    Add {
        #[arg(value_parser = parse_catalog_kind)]
        kind: CatalogKind,
        name: String,
        #[arg(long)]
        parent: Option<i64>,
        /// Document types only: blocks the sale until ok.
        #[arg(long)]
        critical: bool,
    },

    Approve {
        #[arg(value_parser = parse_catalog_kind)]
        kind: CatalogKind,
        id: i64,
    },

    Reject {
        #[arg(value_parser = parse_catalog_kind)]
        kind: CatalogKind,
        id: i64,
    },

    /// Flip an entry between active and inactive.
    Toggle {
        #[arg(value_parser = parse_catalog_kind)]
        kind: CatalogKind,
        id: i64,
    },
}

fn parse_vehicle_status(s: &str) -> Result<VehicleStatus, String> {
    VehicleStatus::parse(s)
        .ok_or_else(|| format!("unknown status '{s}'; expected in_stock, reserved or sold"))
}

fn parse_document_status(s: &str) -> Result<DocumentStatus, String> {
    DocumentStatus::parse(s)
        .ok_or_else(|| format!("unknown status '{s}'; expected missing, in_progress or ok"))
}

fn parse_catalog_kind(s: &str) -> Result<CatalogKind, String> {
    CatalogKind::parse(s).ok_or_else(|| {
        let known: Vec<&str> = CatalogKind::all().iter().map(|k| k.as_str()).collect();
        format!("unknown catalog '{s}'; expected one of {}", known.join(", "))
    })
}

/// Accepts whole amounts grouped with dots, such as `14.000.000` or
/// `$ 14.000.000`. A trailing group of one or two digits reads as cents and
/// is rejected instead of being folded into the amount.
fn parse_money(s: &str) -> Result<Decimal, String> {
    if !s.chars().any(|c| c.is_ascii_digit()) {
        return Err(format!("'{s}' is not an amount"));
    }
    if let Some((_, tail)) = s.trim().rsplit_once(['.', ',']) {
        if (1..=2).contains(&tail.len()) && tail.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!(
                "'{s}' has decimals; amounts are whole pesos, e.g. 14.000.000"
            ));
        }
    }
    Ok(parse_amount(s))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Opens the configured store and runs `cli.command`, writing to `out`.
pub async fn run<W: Write>(
    cli: Cli,
    out: &mut W,
) -> Result<()> {
    let config = DbConfig {
        backend: cli.backend,
        connection_string: cli.db,
    };
    let repository = app::connect(&config).await?;
    let services = Services::new(repository, cli.no_documents_required);
    execute(&services, cli.command, out).await
}

pub async fn execute<W: Write>(
    services: &Services,
    command: Command,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Inventory(args) => inventory(services, args, out).await,
        Command::Vehicle { id } => vehicle(services, id, out).await,
        Command::Intake(args) => intake(services, args, out).await,
        Command::Document {
            vehicle_id,
            doc_type_id,
            status,
        } => {
            services
                .inventory
                .set_document_status(vehicle_id, doc_type_id, status)
                .await
                .with_context(|| {
                    format!("Failed to update document {doc_type_id} of vehicle {vehicle_id}")
                })?;
            writeln!(
                out,
                "Documento {doc_type_id} del vehículo {vehicle_id}: {}",
                status.as_str()
            )?;
            Ok(())
        }
        Command::Expense(command) => expense(services, command, out).await,
        Command::Reserve { id, release } => {
            services
                .inventory
                .set_reserved(id, !release)
                .await
                .with_context(|| format!("Failed to change reservation of vehicle {id}"))?;
            let label = if release {
                VehicleStatus::InStock.label()
            } else {
                VehicleStatus::Reserved.label()
            };
            writeln!(out, "Vehículo {id}: {label}")?;
            Ok(())
        }
        Command::Sell(args) => sell(services, args, out).await,
        Command::Sales => sales(services, out).await,
        Command::Summary => {
            let summary = services.reports.dashboard(today()).await?;
            write_summary(&summary, out)
        }
        Command::ExportInventory { out: path, status } => {
            let rows = services
                .inventory
                .list_inventory(&InventoryFilter {
                    status,
                    search: None,
                })
                .await?;
            let path = path.unwrap_or_else(|| ReportExporter::inventory_file_name(today()).into());
            let file = File::create(&path)
                .with_context(|| format!("Failed to create: {}", path.display()))?;
            let written = ReportExporter::write_inventory(file, &rows)
                .with_context(|| format!("Failed to write: {}", path.display()))?;
            info!(records = written, path = %path.display(), "inventory exported");
            writeln!(out, "{written} vehículos exportados a {}", path.display())?;
            Ok(())
        }
        Command::ExportSales { out: path } => {
            let report = services.reports.sales_report().await?;
            let path = path.unwrap_or_else(|| ReportExporter::sales_file_name(today()).into());
            let file = File::create(&path)
                .with_context(|| format!("Failed to create: {}", path.display()))?;
            let written = ReportExporter::write_sales(file, &report)
                .with_context(|| format!("Failed to write: {}", path.display()))?;
            info!(records = written, path = %path.display(), "sales exported");
            writeln!(out, "{written} ventas exportadas a {}", path.display())?;
            Ok(())
        }
        Command::Catalog(command) => catalog(services, command, out).await,
        Command::Audit { limit } => {
            for entry in services.reports.audit_log(limit).await? {
                writeln!(
                    out,
                    "{}  {} #{} {}  {} -> {}",
                    entry.created_at.with_timezone(&Local).format("%d/%m/%Y %H:%M"),
                    entry.entity_type,
                    entry.entity_id,
                    entry.action,
                    entry.before.as_deref().unwrap_or("-"),
                    entry.after.as_deref().unwrap_or("-"),
                )?;
            }
            Ok(())
        }
    }
}

fn write_figures<W: Write>(
    figures: &ProfitabilityResult,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "  Inversión total:  {}", format_currency(Some(figures.total_investment)))?;
    writeln!(out, "  Precio referencia: {}", format_currency(Some(figures.reference_price)))?;
    writeln!(out, "  Margen:           {}", format_currency(Some(figures.margin)))?;
    writeln!(out, "  ROI:              {}", format_percent(figures.roi, 1))?;
    writeln!(out, "  Base:             {}", figures.basis.label())?;
    Ok(())
}

async fn inventory<W: Write>(
    services: &Services,
    args: InventoryArgs,
    out: &mut W,
) -> Result<()> {
    let rows = services
        .inventory
        .list_inventory(&InventoryFilter {
            status: args.status,
            search: args.search,
        })
        .await?;

    writeln!(
        out,
        "{:>4}  {:<9} {:<28} {:<10} {:<24} {:>14} {:>14} {:>8}",
        "ID", "Patente", "Vehículo", "Estado", "Documentación", "Precio Lista", "Margen", "ROI"
    )?;
    for row in &rows {
        let vehicle = &row.vehicle;
        writeln!(
            out,
            "{:>4}  {:<9} {:<28} {:<10} {:<24} {:>14} {:>14} {:>8}",
            vehicle.id,
            vehicle.plate,
            format!("{} {}", vehicle.display_name(), vehicle.year),
            vehicle.status.label(),
            row.readiness.signal.label(),
            format_currency(vehicle.list_price),
            format_currency(Some(row.profitability.margin)),
            format_percent(row.profitability.roi, 1),
        )?;
    }
    writeln!(out, "{} vehículos", rows.len())?;
    Ok(())
}

async fn vehicle<W: Write>(
    services: &Services,
    id: i64,
    out: &mut W,
) -> Result<()> {
    let overview = services
        .inventory
        .vehicle_overview(id)
        .await
        .with_context(|| format!("Failed to load vehicle {id}"))?;
    let expense_types: HashMap<i64, String> = services
        .catalogs
        .list(CatalogKind::ExpenseTypes, None, true)
        .await?
        .into_iter()
        .map(|e| (e.id, e.name))
        .collect();

    let vehicle = &overview.vehicle;
    writeln!(
        out,
        "{} {} {} ({})",
        vehicle.display_name(),
        vehicle.trim_name.as_deref().unwrap_or_default(),
        vehicle.year,
        vehicle.plate
    )?;
    writeln!(out, "Estado: {}", vehicle.status.label())?;
    writeln!(out, "Kms: {}", format_number(vehicle.mileage))?;
    writeln!(out, "Fecha de toma: {}", format_date(vehicle.entry_date))?;
    writeln!(out, "Precio info: {}", format_currency(vehicle.info_price))?;
    writeln!(out, "Precio 0km: {}", format_currency(vehicle.zero_km_price))?;

    writeln!(out)?;
    writeln!(
        out,
        "Documentación: {}{}",
        overview.readiness.signal.label(),
        if overview.readiness.can_sell {
            ""
        } else {
            " (venta bloqueada)"
        }
    )?;
    for doc_type in &overview.document_types {
        writeln!(
            out,
            "  {:>3} {:<28} {:<8} {}",
            doc_type.id,
            doc_type.name,
            if doc_type.is_critical { "crítico" } else { "" },
            overview.document_status(doc_type.id).as_str()
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Gastos:")?;
    for expense in &overview.expenses {
        writeln!(
            out,
            "  {:>4}  {}  {:<22} {:>14}  {}",
            expense.id,
            format_date(expense.expense_date),
            expense_types
                .get(&expense.expense_type_id)
                .map(String::as_str)
                .unwrap_or("-"),
            format_currency(Some(expense.amount)),
            expense.notes.as_deref().unwrap_or_default()
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Rentabilidad:")?;
    write_figures(&overview.profitability, out)
}

/// Resolves a catalog value typed by name, keeping entries added for review
/// in `added`.
async fn resolve_named(
    services: &Services,
    kind: CatalogKind,
    name: &str,
    parent_id: Option<i64>,
    added: &mut Vec<CatalogEntry>,
) -> Result<i64> {
    let resolution = services.catalogs.resolve(kind, name, parent_id).await?;
    let id = resolution.entry.id;
    if resolution.created {
        added.push(resolution.entry);
    }
    Ok(id)
}

async fn resolve_optional(
    services: &Services,
    kind: CatalogKind,
    name: Option<&str>,
    parent_id: Option<i64>,
    added: &mut Vec<CatalogEntry>,
) -> Result<Option<i64>> {
    match name {
        Some(name) => Ok(Some(resolve_named(services, kind, name, parent_id, added).await?)),
        None => Ok(None),
    }
}

async fn intake<W: Write>(
    services: &Services,
    args: IntakeArgs,
    out: &mut W,
) -> Result<()> {
    let mut added = Vec::new();
    let brand_id =
        resolve_named(services, CatalogKind::Brands, &args.brand, None, &mut added).await?;
    let model_id =
        resolve_named(services, CatalogKind::Models, &args.model, Some(brand_id), &mut added)
            .await?;
    let trim_id = resolve_optional(
        services,
        CatalogKind::Trims,
        args.trim.as_deref(),
        Some(model_id),
        &mut added,
    )
    .await?;
    let fuel_id =
        resolve_optional(services, CatalogKind::Fuels, args.fuel.as_deref(), None, &mut added)
            .await?;
    let transmission_id = resolve_optional(
        services,
        CatalogKind::Transmissions,
        args.transmission.as_deref(),
        None,
        &mut added,
    )
    .await?;
    let color_id =
        resolve_optional(services, CatalogKind::Colors, args.color.as_deref(), None, &mut added)
            .await?;

    for entry in &added {
        writeln!(
            out,
            "Nuevo en {}: {} (pendiente de revisión)",
            entry.kind.label(),
            entry.name
        )?;
    }

    let draft = VehicleDraft {
        brand_id: Some(brand_id),
        model_id: Some(model_id),
        trim_id,
        fuel_id,
        transmission_id,
        color_id,
        year: args.year,
        mileage: args.mileage,
        plate: args.plate,
        take_price: args.take_price,
        info_price: args.info_price,
        zero_km_price: args.zero_km_price,
        suggested_price: args.suggested_price,
        list_price: args.list_price,
        entry_date: args.entry_date.unwrap_or_else(today),
    };

    let saved = services.inventory.save_vehicle(args.id, draft).await?;
    writeln!(out, "Vehículo {} guardado: {} {}", saved.id, saved.display_name(), saved.plate)?;
    Ok(())
}

async fn expense<W: Write>(
    services: &Services,
    command: ExpenseCommand,
    out: &mut W,
) -> Result<()> {
    match command {
        ExpenseCommand::Add {
            vehicle_id,
            expense_type,
            amount,
            date,
            notes,
        } => {
            let expense_type = services
                .catalogs
                .resolve(CatalogKind::ExpenseTypes, &expense_type, None)
                .await?;
            let expense = services
                .inventory
                .add_expense(NewExpense {
                    vehicle_id,
                    expense_type_id: expense_type.entry.id,
                    amount,
                    expense_date: date.unwrap_or_else(today),
                    notes,
                })
                .await
                .with_context(|| format!("Failed to add expense to vehicle {vehicle_id}"))?;
            writeln!(
                out,
                "Gasto {} registrado: {} {}",
                expense.id,
                expense_type.entry.name,
                format_currency(Some(expense.amount))
            )?;
        }
        ExpenseCommand::Delete { id } => {
            services
                .inventory
                .delete_expense(id)
                .await
                .with_context(|| format!("Failed to delete expense {id}"))?;
            writeln!(out, "Gasto {id} eliminado")?;
        }
    }
    Ok(())
}

async fn sell<W: Write>(
    services: &Services,
    args: SellArgs,
    out: &mut W,
) -> Result<()> {
    let sold_at: DateTime<Utc> = match args.date {
        Some(date) => date.and_time(NaiveTime::MIN).and_utc(),
        None => Utc::now(),
    };
    let request = SaleRequest {
        vehicle_id: args.id,
        sold_price: args.price,
        sold_at,
        notes: args.notes,
    };

    match services.inventory.record_sale(request).await {
        Ok(sale) => {
            writeln!(
                out,
                "Venta {} registrada: vehículo {} por {}",
                sale.id,
                sale.vehicle_id,
                format_currency(Some(sale.sold_price))
            )?;
            Ok(())
        }
        Err(DealerError::SaleBlocked { missing_critical }) => {
            let overview = services.inventory.vehicle_overview(args.id).await?;
            let names: Vec<&str> = overview
                .document_types
                .iter()
                .filter(|t| missing_critical.contains(&t.id))
                .map(|t| t.name.as_str())
                .collect();
            if names.is_empty() {
                bail!(
                    "sale blocked: no document types are configured \
                     (use --no-documents-required to allow it)"
                );
            }
            bail!("sale blocked: critical documents missing: {}", names.join(", "))
        }
        Err(e) => Err(e).with_context(|| format!("Failed to sell vehicle {}", args.id)),
    }
}

async fn sales<W: Write>(
    services: &Services,
    out: &mut W,
) -> Result<()> {
    let report = services.reports.sales_report().await?;

    writeln!(
        out,
        "{:<10}  {:<9} {:<28} {:>14} {:>14} {:>8}",
        "Fecha", "Patente", "Vehículo", "Precio Venta", "Margen", "ROI"
    )?;
    for line in &report.lines {
        let vehicle = line.vehicle.as_ref();
        writeln!(
            out,
            "{:<10}  {:<9} {:<28} {:>14} {:>14} {:>8}",
            format_date(line.sale.sold_at.date_naive()),
            vehicle.map(|v| v.plate.as_str()).unwrap_or("-"),
            vehicle.map(|v| v.display_name()).unwrap_or_default(),
            format_currency(Some(line.sale.sold_price)),
            format_currency(Some(line.profitability.margin)),
            format_percent(line.profitability.roi, 1),
        )?;
    }
    writeln!(
        out,
        "Total vendido: {}  Margen total: {}",
        format_currency(Some(report.total_sold)),
        format_currency(Some(report.total_margin))
    )?;
    Ok(())
}

fn write_summary<W: Write>(
    summary: &DashboardSummary,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Stock: {} vehículos", summary.stock_count)?;
    writeln!(
        out,
        "Capital invertido en stock: {}",
        format_currency(Some(summary.invested_in_stock))
    )?;
    writeln!(out, "Ventas totales: {}", format_currency(Some(summary.total_sales)))?;
    writeln!(out, "Margen neto: {}", format_currency(Some(summary.net_margin)))?;
    writeln!(out, "Costo de ventas: {}", format_currency(Some(summary.cost_of_sales)))?;
    writeln!(out, "Margen promedio: {}", format_percent(summary.average_margin_pct, 1))?;
    writeln!(out, "Documentos faltantes: {}", summary.pending_documents)?;

    writeln!(out)?;
    writeln!(out, "Stock por marca:")?;
    for (brand, count) in &summary.stock_by_brand {
        writeln!(out, "  {brand:<20} {count:>4}")?;
    }

    writeln!(out)?;
    writeln!(out, "Stock por precio de lista:")?;
    for range in &summary.price_ranges {
        writeln!(out, "  {:<20} {:>4}", range.label, range.count)?;
    }

    writeln!(out)?;
    writeln!(out, "Ventas por mes:")?;
    for month in &summary.monthly {
        writeln!(
            out,
            "  {} {}  {:>14} {:>14}",
            month.label,
            month.year,
            format_currency(Some(month.sales)),
            format_currency(Some(month.margin))
        )?;
    }
    Ok(())
}

async fn catalog<W: Write>(
    services: &Services,
    command: CatalogCommand,
    out: &mut W,
) -> Result<()> {
    let catalogs = &services.catalogs;
    match command {
        CatalogCommand::List { kind, parent, all } => {
            for entry in catalogs.list(kind, parent, all).await? {
                let mut flags = Vec::new();
                if entry.review == ReviewState::Pending {
                    flags.push("pendiente");
                }
                if !entry.is_active {
                    flags.push("inactivo");
                }
                if entry.is_critical {
                    flags.push("crítico");
                }
                writeln!(out, "{:>4}  {:<28} {}", entry.id, entry.name, flags.join(", "))?;
            }
        }
        CatalogCommand::Add {
            kind,
            name,
            parent,
            critical,
        } => {
            let resolution = if kind == CatalogKind::DocTypes {
                catalogs.resolve_document_type(&name, critical).await?
            } else {
                catalogs.resolve(kind, &name, parent).await?
            };
            let verb = if resolution.created {
                "agregado (pendiente de revisión)"
            } else {
                "ya existente"
            };
            writeln!(
                out,
                "{} {}: {} {verb}",
                kind.label(),
                resolution.entry.id,
                resolution.entry.name
            )?;
        }
        CatalogCommand::Approve { kind, id } => {
            review(services, kind, id, ReviewState::Approved, out).await?;
        }
        CatalogCommand::Reject { kind, id } => {
            review(services, kind, id, ReviewState::Rejected, out).await?;
        }
        CatalogCommand::Toggle { kind, id } => {
            let entry = catalogs.toggle_active(kind, id).await?;
            let state = if entry.is_active { "activo" } else { "inactivo" };
            writeln!(out, "{} {}: {state}", kind.label(), id)?;
        }
    }
    Ok(())
}

async fn review<W: Write>(
    services: &Services,
    kind: CatalogKind,
    id: i64,
    decision: ReviewState,
    out: &mut W,
) -> Result<()> {
    let outcome = services.catalogs.review(kind, id, decision).await?;
    writeln!(out, "{} {}: {}", kind.label(), id, outcome.entry.review.as_str())?;
    if outcome.references > 0 {
        writeln!(out, "  {} registros siguen usando esta entrada", outcome.references)?;
    }
    Ok(())
}
