use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use dealer_core::format::{format_currency, format_date, format_number, format_percent};
use dealer_core::services::{InventoryRow, SaleLine, SalesReport};

/// Errors that can occur while writing a report.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv(err.to_string())
    }
}

/// One row of the inventory spreadsheet.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InventoryRecord {
    #[serde(rename = "Patente")]
    pub plate: String,
    #[serde(rename = "Marca")]
    pub brand: String,
    #[serde(rename = "Modelo")]
    pub model: String,
    #[serde(rename = "Versión")]
    pub trim: String,
    #[serde(rename = "Año")]
    pub year: i32,
    #[serde(rename = "Kms")]
    pub mileage: String,
    #[serde(rename = "Costo Toma")]
    pub take_price: String,
    #[serde(rename = "Total Gastos")]
    pub total_expenses: String,
    #[serde(rename = "Inversión Total")]
    pub total_investment: String,
    #[serde(rename = "Precio Lista")]
    pub list_price: String,
    #[serde(rename = "Margen")]
    pub margin: String,
    #[serde(rename = "ROI %")]
    pub roi: String,
    #[serde(rename = "Base")]
    pub basis: String,
    #[serde(rename = "Estado")]
    pub status: String,
    #[serde(rename = "Fecha Toma")]
    pub entry_date: String,
    #[serde(rename = "Fecha Carga Sistema")]
    pub created_date: String,
}

impl From<&InventoryRow> for InventoryRecord {
    fn from(row: &InventoryRow) -> Self {
        let vehicle = &row.vehicle;
        let figures = &row.profitability;
        Self {
            plate: vehicle.plate.clone(),
            brand: vehicle.brand_name.clone().unwrap_or_default(),
            model: vehicle.model_name.clone().unwrap_or_default(),
            trim: vehicle.trim_name.clone().unwrap_or_default(),
            year: vehicle.year,
            mileage: format_number(vehicle.mileage),
            take_price: format_currency(Some(vehicle.take_price)),
            total_expenses: format_currency(Some(figures.total_expenses)),
            total_investment: format_currency(Some(figures.total_investment)),
            list_price: format_currency(vehicle.list_price),
            margin: format_currency(Some(figures.margin)),
            roi: format_percent(figures.roi, 1),
            basis: figures.basis.label().to_string(),
            status: vehicle.status.label().to_string(),
            entry_date: format_date(vehicle.entry_date),
            created_date: format_date(vehicle.created_at.date_naive()),
        }
    }
}

/// One row of the accounting sales report.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SaleRecord {
    #[serde(rename = "Fecha Venta")]
    pub sold_date: String,
    #[serde(rename = "Patente")]
    pub plate: String,
    #[serde(rename = "Marca")]
    pub brand: String,
    #[serde(rename = "Modelo")]
    pub model: String,
    #[serde(rename = "Versión")]
    pub trim: String,
    #[serde(rename = "Precio Venta")]
    pub sold_price: String,
    #[serde(rename = "Costo Toma")]
    pub take_price: String,
    #[serde(rename = "Gastos Acumulados")]
    pub total_expenses: String,
    #[serde(rename = "Inversión Total")]
    pub total_investment: String,
    #[serde(rename = "Margen Neto Real")]
    pub margin: String,
    #[serde(rename = "ROI %")]
    pub roi: String,
    #[serde(rename = "Notas")]
    pub notes: String,
}

impl From<&SaleLine> for SaleRecord {
    fn from(line: &SaleLine) -> Self {
        let vehicle = line.vehicle.as_ref();
        let figures = &line.profitability;
        Self {
            sold_date: format_date(line.sale.sold_at.date_naive()),
            plate: vehicle.map(|v| v.plate.clone()).unwrap_or_default(),
            brand: vehicle.and_then(|v| v.brand_name.clone()).unwrap_or_default(),
            model: vehicle.and_then(|v| v.model_name.clone()).unwrap_or_default(),
            trim: vehicle.and_then(|v| v.trim_name.clone()).unwrap_or_default(),
            sold_price: format_currency(Some(line.sale.sold_price)),
            take_price: format_currency(vehicle.map(|v| v.take_price)),
            total_expenses: format_currency(Some(figures.total_expenses)),
            total_investment: format_currency(Some(figures.total_investment)),
            margin: format_currency(Some(figures.margin)),
            roi: format_percent(figures.roi, 2),
            notes: line.sale.notes.clone().unwrap_or_default(),
        }
    }
}

/// Spreadsheet-friendly CSV exports of the inventory and sales listings.
pub struct ReportExporter;

impl ReportExporter {
    pub fn inventory_file_name(today: NaiveDate) -> String {
        format!("Inventario_{}.csv", today.format("%Y-%m-%d"))
    }

    pub fn sales_file_name(today: NaiveDate) -> String {
        format!("Reporte_Ventas_Contable_{}.csv", today.format("%Y-%m-%d"))
    }

    /// Writes one record per inventory row, in listing order.
    ///
    /// Returns the number of records written.
    pub fn write_inventory<W: Write>(
        writer: W,
        rows: &[InventoryRow],
    ) -> Result<usize, ExportError> {
        Self::write_records(writer, rows.iter().map(InventoryRecord::from))
    }

    /// Writes one record per sale, newest first.
    pub fn write_sales<W: Write>(
        writer: W,
        report: &SalesReport,
    ) -> Result<usize, ExportError> {
        Self::write_records(writer, report.lines.iter().map(SaleRecord::from))
    }

    fn write_records<W, T, I>(
        writer: W,
        records: I,
    ) -> Result<usize, ExportError>
    where
        W: Write,
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let mut written = 0;
        for record in records {
            csv_writer.serialize(record)?;
            written += 1;
        }
        csv_writer.flush()?;
        Ok(written)
    }
}
