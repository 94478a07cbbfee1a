use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::calculations::{
    DocumentReadiness, DocumentRequirements, Profitability, ProfitabilityResult,
};
use crate::db::{DealerRepository, RepositoryError};
use crate::errors::DealerError;
use crate::models::{
    DocumentStatus, DocumentType, Expense, NewExpense, NewSale, NewVehicle, Sale, Vehicle,
    VehicleDocument, VehicleDraft, VehicleStatus, normalize_plate,
};

/// Filters for [`InventoryService::list_inventory`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryFilter {
    pub status: Option<VehicleStatus>,
    /// Free text matched against brand, model, plate and year.
    pub search: Option<String>,
}

/// One line of the inventory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRow {
    pub vehicle: Vehicle,
    pub readiness: DocumentReadiness,
    pub profitability: ProfitabilityResult,
}

/// Everything the detail view shows for a single vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleOverview {
    pub vehicle: Vehicle,
    /// Active document types, critical first.
    pub document_types: Vec<DocumentType>,
    pub documents: Vec<VehicleDocument>,
    pub expenses: Vec<Expense>,
    pub readiness: DocumentReadiness,
    pub profitability: ProfitabilityResult,
}

impl VehicleOverview {
    /// Price offered by default when recording the sale.
    pub fn suggested_sale_price(&self) -> Option<Decimal> {
        self.vehicle.list_price
    }

    /// Status of `doc_type_id` for this vehicle; no record reads as missing.
    pub fn document_status(
        &self,
        doc_type_id: i64,
    ) -> DocumentStatus {
        self.documents
            .iter()
            .find(|d| d.doc_type_id == doc_type_id)
            .map(|d| d.status)
            .unwrap_or(DocumentStatus::Missing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRequest {
    pub vehicle_id: i64,
    /// Falls back to the list price when absent.
    pub sold_price: Option<Decimal>,
    pub sold_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Vehicle intake, document tracking, expenses and sales.
pub struct InventoryService {
    repository: Arc<dyn DealerRepository>,
    no_documents_required: bool,
}

impl InventoryService {
    pub fn new(repository: Arc<dyn DealerRepository>) -> Self {
        Self {
            repository,
            no_documents_required: false,
        }
    }

    /// Treats an empty document-type catalog as "nothing to collect"
    /// instead of blocking every sale.
    pub fn with_no_documents_required(
        mut self,
        confirmed: bool,
    ) -> Self {
        self.no_documents_required = confirmed;
        self
    }

    fn requirements<'a>(
        &self,
        types: &'a [DocumentType],
    ) -> DocumentRequirements<'a> {
        let requirements = DocumentRequirements::new(types);
        if self.no_documents_required {
            requirements.confirm_none_required()
        } else {
            requirements
        }
    }

    /// Vehicles with their readiness signal and projected (or realized)
    /// profitability, in the order the store returns them.
    pub async fn list_inventory(
        &self,
        filter: &InventoryFilter,
    ) -> Result<Vec<InventoryRow>, DealerError> {
        let vehicles = self.repository.list_vehicles(filter.status).await?;
        let document_types = self.repository.list_document_types().await?;
        let documents = self.repository.list_vehicle_documents(None).await?;
        let expenses = self.repository.list_expenses(None).await?;

        let mut documents_by_vehicle: HashMap<i64, Vec<VehicleDocument>> = HashMap::new();
        for document in documents {
            documents_by_vehicle
                .entry(document.vehicle_id)
                .or_default()
                .push(document);
        }
        let mut expenses_by_vehicle: HashMap<i64, Vec<Decimal>> = HashMap::new();
        for expense in expenses {
            expenses_by_vehicle
                .entry(expense.vehicle_id)
                .or_default()
                .push(expense.amount);
        }

        let requirements = self.requirements(&document_types);
        let search = filter.search.as_deref().unwrap_or_default();
        let rows: Vec<InventoryRow> = vehicles
            .into_iter()
            .filter(|v| v.matches_search(search))
            .map(|vehicle| {
                let readiness = requirements.evaluate(
                    documents_by_vehicle
                        .get(&vehicle.id)
                        .map(Vec::as_slice)
                        .unwrap_or_default(),
                );
                let profitability = Profitability::for_vehicle(
                    &vehicle.financials(),
                    expenses_by_vehicle.remove(&vehicle.id).unwrap_or_default(),
                );
                InventoryRow {
                    vehicle,
                    readiness,
                    profitability,
                }
            })
            .collect();

        debug!(rows = rows.len(), "listed inventory");
        Ok(rows)
    }

    pub async fn vehicle_overview(
        &self,
        id: i64,
    ) -> Result<VehicleOverview, DealerError> {
        let vehicle = self.repository.get_vehicle(id).await?;
        let mut document_types: Vec<DocumentType> = self
            .repository
            .list_document_types()
            .await?
            .into_iter()
            .filter(|t| t.is_active)
            .collect();
        document_types.sort_by(|a, b| {
            b.is_critical
                .cmp(&a.is_critical)
                .then_with(|| a.name.cmp(&b.name))
        });
        let documents = self.repository.list_vehicle_documents(Some(id)).await?;
        let expenses = self.repository.list_expenses(Some(id)).await?;

        let readiness = self.requirements(&document_types).evaluate(&documents);
        let profitability = Profitability::for_vehicle(
            &vehicle.financials(),
            expenses.iter().map(|e| e.amount).collect(),
        );

        Ok(VehicleOverview {
            vehicle,
            document_types,
            documents,
            expenses,
            readiness,
            profitability,
        })
    }

    /// Validates a draft into a [`NewVehicle`].
    ///
    /// # Errors
    /// [`DealerError::MissingField`] for a missing brand, model or plate.
    pub fn validate_draft(draft: VehicleDraft) -> Result<NewVehicle, DealerError> {
        let brand_id = draft.brand_id.ok_or(DealerError::MissingField("brand"))?;
        let model_id = draft.model_id.ok_or(DealerError::MissingField("model"))?;
        let plate = normalize_plate(&draft.plate);
        if plate.is_empty() {
            return Err(DealerError::MissingField("plate"));
        }

        Ok(NewVehicle {
            brand_id,
            model_id,
            trim_id: draft.trim_id,
            fuel_id: draft.fuel_id,
            transmission_id: draft.transmission_id,
            color_id: draft.color_id,
            year: draft.year,
            mileage: draft.mileage,
            plate,
            take_price: draft.take_price,
            info_price: draft.info_price,
            zero_km_price: draft.zero_km_price,
            suggested_price: draft.suggested_price,
            list_price: draft.list_price,
            entry_date: draft.entry_date,
        })
    }

    /// Creates a vehicle when `id` is `None`, otherwise updates it.
    pub async fn save_vehicle(
        &self,
        id: Option<i64>,
        draft: VehicleDraft,
    ) -> Result<Vehicle, DealerError> {
        let vehicle = Self::validate_draft(draft)?;
        let plate = vehicle.plate.clone();

        let saved = match id {
            Some(id) => self.repository.update_vehicle(id, vehicle).await,
            None => self.repository.create_vehicle(vehicle).await,
        }
        .map_err(|e| match e {
            RepositoryError::Duplicate { field, .. } if field == "plate" => {
                warn!(plate = %plate, "duplicate plate rejected");
                DealerError::DuplicatePlate(plate.clone())
            }
            other => other.into(),
        })?;

        info!(id = saved.id, plate = %saved.plate, "saved vehicle");
        Ok(saved)
    }

    /// Toggles an unsold vehicle between in stock and reserved.
    pub async fn set_reserved(
        &self,
        id: i64,
        reserved: bool,
    ) -> Result<(), DealerError> {
        let vehicle = self.repository.get_vehicle(id).await?;
        if vehicle.status == VehicleStatus::Sold {
            return Err(DealerError::NotForSale(vehicle.status));
        }
        let status = if reserved {
            VehicleStatus::Reserved
        } else {
            VehicleStatus::InStock
        };
        self.repository.set_vehicle_status(id, status).await?;
        Ok(())
    }

    pub async fn set_document_status(
        &self,
        vehicle_id: i64,
        doc_type_id: i64,
        status: DocumentStatus,
    ) -> Result<VehicleDocument, DealerError> {
        self.repository.get_vehicle(vehicle_id).await?;
        let document = self
            .repository
            .set_document_status(vehicle_id, doc_type_id, status)
            .await?;
        debug!(vehicle_id, doc_type_id, status = status.as_str(), "document updated");
        Ok(document)
    }

    pub async fn add_expense(
        &self,
        expense: NewExpense,
    ) -> Result<Expense, DealerError> {
        if expense.amount < Decimal::ZERO {
            return Err(DealerError::NegativeExpense);
        }
        self.repository.get_vehicle(expense.vehicle_id).await?;
        Ok(self.repository.add_expense(expense).await?)
    }

    pub async fn delete_expense(
        &self,
        id: i64,
    ) -> Result<(), DealerError> {
        Ok(self.repository.delete_expense(id).await?)
    }

    /// Records the sale of a vehicle.
    ///
    /// # Errors
    /// * [`DealerError::NotForSale`] when the vehicle is already sold.
    /// * [`DealerError::SaleBlocked`] while a critical document is not `ok`.
    /// * [`DealerError::InvalidSalePrice`] for a price that is not positive.
    pub async fn record_sale(
        &self,
        request: SaleRequest,
    ) -> Result<Sale, DealerError> {
        let overview = self.vehicle_overview(request.vehicle_id).await?;
        if overview.vehicle.status == VehicleStatus::Sold {
            return Err(DealerError::NotForSale(overview.vehicle.status));
        }
        if !overview.readiness.can_sell {
            return Err(DealerError::SaleBlocked {
                missing_critical: overview.readiness.missing_critical,
            });
        }

        let sold_price = request
            .sold_price
            .or(overview.suggested_sale_price())
            .unwrap_or(Decimal::ZERO);
        if sold_price <= Decimal::ZERO {
            return Err(DealerError::InvalidSalePrice);
        }

        let sale = self
            .repository
            .record_sale(NewSale {
                vehicle_id: request.vehicle_id,
                sold_price,
                sold_at: request.sold_at,
                notes: request.notes.filter(|n| !n.trim().is_empty()),
            })
            .await
            .map_err(|e| match e {
                // Lost a race with another sale of the same vehicle.
                RepositoryError::NotFound => DealerError::NotForSale(VehicleStatus::Sold),
                other => other.into(),
            })?;

        info!(vehicle_id = sale.vehicle_id, sold_price = %sale.sold_price, "sale recorded");
        Ok(sale)
    }
}
