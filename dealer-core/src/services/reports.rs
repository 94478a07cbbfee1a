use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::{
    DashboardSummary, DocumentRequirements, Profitability, ProfitabilityInput, ProfitabilityResult,
    expense_totals, pending_document_count,
};
use crate::db::DealerRepository;
use crate::errors::DealerError;
use crate::models::{AuditEntry, Sale, Vehicle, VehicleStatus};

/// A completed sale with its realized figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLine {
    pub sale: Sale,
    /// `None` when the vehicle row is gone.
    pub vehicle: Option<Vehicle>,
    pub profitability: ProfitabilityResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesReport {
    /// Newest sale first.
    pub lines: Vec<SaleLine>,
    pub total_sold: Decimal,
    pub total_margin: Decimal,
}

/// Read-only reporting over sales, stock and the audit trail.
pub struct ReportService {
    repository: Arc<dyn DealerRepository>,
}

impl ReportService {
    pub fn new(repository: Arc<dyn DealerRepository>) -> Self {
        Self { repository }
    }

    pub async fn sales_report(&self) -> Result<SalesReport, DealerError> {
        let sales = self.repository.list_sales().await?;
        let vehicles: HashMap<i64, Vehicle> = self
            .repository
            .list_vehicles(Some(VehicleStatus::Sold))
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();
        let totals = expense_totals(&self.repository.list_expenses(None).await?);

        let lines: Vec<SaleLine> = sales
            .into_iter()
            .map(|sale| {
                let vehicle = vehicles.get(&sale.vehicle_id).cloned();
                if vehicle.is_none() {
                    warn!(sale_id = sale.id, vehicle_id = sale.vehicle_id, "sale without vehicle");
                }
                let profitability = Profitability::calculate(&ProfitabilityInput {
                    take_price: vehicle.as_ref().map(|v| v.take_price).unwrap_or_default(),
                    expenses: totals.get(&sale.vehicle_id).copied().into_iter().collect(),
                    reference_price: sale.sold_price,
                    status: VehicleStatus::Sold,
                });
                SaleLine {
                    sale,
                    vehicle,
                    profitability,
                }
            })
            .collect();

        Ok(SalesReport {
            total_sold: lines.iter().map(|l| l.sale.sold_price).sum(),
            total_margin: lines.iter().map(|l| l.profitability.margin).sum(),
            lines,
        })
    }

    pub async fn dashboard(
        &self,
        today: NaiveDate,
    ) -> Result<DashboardSummary, DealerError> {
        let vehicles = self.repository.list_vehicles(None).await?;
        let sales = self.repository.list_sales().await?;
        let totals = expense_totals(&self.repository.list_expenses(None).await?);
        let document_types = self.repository.list_document_types().await?;
        let documents = self.repository.list_vehicle_documents(None).await?;
        let pending = pending_document_count(
            &DocumentRequirements::new(&document_types),
            &vehicles,
            &documents,
        );

        Ok(DashboardSummary::build(
            &vehicles, &sales, &totals, pending, today,
        ))
    }

    pub async fn audit_log(
        &self,
        limit: i64,
    ) -> Result<Vec<AuditEntry>, DealerError> {
        Ok(self.repository.list_audit_entries(limit).await?)
    }
}
