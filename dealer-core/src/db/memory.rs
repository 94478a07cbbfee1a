//! In-memory [`DealerRepository`] for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::repository::{DealerRepository, RepositoryError};
use crate::models::{
    AuditEntry, CatalogEntry, CatalogKind, DocumentStatus, DocumentType, Expense, NewCatalogEntry,
    NewExpense, NewSale, NewVehicle, Sale, Vehicle, VehicleDocument, VehicleStatus,
};

#[derive(Default)]
struct State {
    next_id: i64,
    catalog: Vec<CatalogEntry>,
    vehicles: Vec<Vehicle>,
    documents: Vec<VehicleDocument>,
    expenses: Vec<Expense>,
    sales: Vec<Sale>,
    audit: Vec<AuditEntry>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn audit(
        &mut self,
        entity_type: &str,
        entity_id: i64,
        action: &str,
    ) {
        let id = self.next_id();
        self.audit.push(AuditEntry {
            id,
            entity_type: entity_type.to_string(),
            entity_id,
            action: action.to_string(),
            before: None,
            after: None,
            created_at: Utc::now(),
        });
    }

    fn catalog_name(
        &self,
        kind: CatalogKind,
        id: Option<i64>,
    ) -> Option<String> {
        let id = id?;
        self.catalog
            .iter()
            .find(|e| e.kind == kind && e.id == id)
            .map(|e| e.name.clone())
    }

    fn build_vehicle(
        &self,
        id: i64,
        vehicle: NewVehicle,
    ) -> Vehicle {
        let now = Utc::now();
        Vehicle {
            id,
            brand_name: self.catalog_name(CatalogKind::Brands, Some(vehicle.brand_id)),
            model_name: self.catalog_name(CatalogKind::Models, Some(vehicle.model_id)),
            trim_name: self.catalog_name(CatalogKind::Trims, vehicle.trim_id),
            brand_id: vehicle.brand_id,
            model_id: vehicle.model_id,
            trim_id: vehicle.trim_id,
            fuel_id: vehicle.fuel_id,
            transmission_id: vehicle.transmission_id,
            color_id: vehicle.color_id,
            year: vehicle.year,
            mileage: vehicle.mileage,
            plate: vehicle.plate,
            take_price: vehicle.take_price,
            info_price: vehicle.info_price,
            zero_km_price: vehicle.zero_km_price,
            suggested_price: vehicle.suggested_price,
            list_price: vehicle.list_price,
            status: VehicleStatus::InStock,
            entry_date: vehicle.entry_date,
            sold_at: None,
            sold_price: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn check_plate(
        &self,
        plate: &str,
        except: Option<i64>,
    ) -> Result<(), RepositoryError> {
        if self
            .vehicles
            .iter()
            .any(|v| v.plate == plate && Some(v.id) != except)
        {
            return Err(RepositoryError::Duplicate {
                field: "plate".to_string(),
                value: plate.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

impl MemoryRepository {
    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl DealerRepository for MemoryRepository {
    async fn list_catalog_entries(
        &self,
        kind: CatalogKind,
        parent_id: Option<i64>,
        include_inactive: bool,
    ) -> Result<Vec<CatalogEntry>, RepositoryError> {
        let mut entries: Vec<CatalogEntry> = self
            .state()
            .catalog
            .iter()
            .filter(|e| e.kind == kind)
            .filter(|e| parent_id.is_none() || e.parent_id == parent_id)
            .filter(|e| include_inactive || e.is_active)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn get_catalog_entry(
        &self,
        kind: CatalogKind,
        id: i64,
    ) -> Result<CatalogEntry, RepositoryError> {
        self.state()
            .catalog
            .iter()
            .find(|e| e.kind == kind && e.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_catalog_entry(
        &self,
        entry: NewCatalogEntry,
    ) -> Result<CatalogEntry, RepositoryError> {
        let mut state = self.state();
        let id = state.next_id();
        let created = CatalogEntry {
            id,
            kind: entry.kind,
            name: entry.name,
            parent_id: entry.parent_id,
            is_active: true,
            review: entry.review,
            is_critical: entry.is_critical,
            created_at: Utc::now(),
        };
        state.catalog.push(created.clone());
        Ok(created)
    }

    async fn update_catalog_entry(
        &self,
        entry: &CatalogEntry,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state();
        let stored = state
            .catalog
            .iter_mut()
            .find(|e| e.kind == entry.kind && e.id == entry.id)
            .ok_or(RepositoryError::NotFound)?;
        stored.is_active = entry.is_active;
        stored.review = entry.review;
        state.audit(entry.kind.table(), entry.id, "update");
        Ok(())
    }

    async fn count_catalog_references(
        &self,
        kind: CatalogKind,
        id: i64,
    ) -> Result<i64, RepositoryError> {
        let state = self.state();
        let count = match kind {
            CatalogKind::ExpenseTypes => state
                .expenses
                .iter()
                .filter(|e| e.expense_type_id == id)
                .count(),
            CatalogKind::DocTypes => state
                .documents
                .iter()
                .filter(|d| d.doc_type_id == id)
                .count(),
            _ => state
                .vehicles
                .iter()
                .filter(|v| {
                    let column = match kind {
                        CatalogKind::Brands => Some(v.brand_id),
                        CatalogKind::Models => Some(v.model_id),
                        CatalogKind::Trims => v.trim_id,
                        CatalogKind::Fuels => v.fuel_id,
                        CatalogKind::Transmissions => v.transmission_id,
                        _ => v.color_id,
                    };
                    column == Some(id)
                })
                .count(),
        };
        Ok(count as i64)
    }

    async fn list_document_types(&self) -> Result<Vec<DocumentType>, RepositoryError> {
        Ok(self
            .state()
            .catalog
            .iter()
            .filter(|e| e.kind == CatalogKind::DocTypes)
            .map(|e| DocumentType {
                id: e.id,
                name: e.name.clone(),
                is_critical: e.is_critical,
                is_active: e.is_active,
                review: e.review,
                created_at: e.created_at,
            })
            .collect())
    }

    async fn create_vehicle(
        &self,
        vehicle: NewVehicle,
    ) -> Result<Vehicle, RepositoryError> {
        let mut state = self.state();
        state.check_plate(&vehicle.plate, None)?;
        let id = state.next_id();
        let created = state.build_vehicle(id, vehicle);
        state.vehicles.push(created.clone());
        Ok(created)
    }

    async fn update_vehicle(
        &self,
        id: i64,
        vehicle: NewVehicle,
    ) -> Result<Vehicle, RepositoryError> {
        let mut state = self.state();
        state.check_plate(&vehicle.plate, Some(id))?;
        let index = state
            .vehicles
            .iter()
            .position(|v| v.id == id)
            .ok_or(RepositoryError::NotFound)?;
        let previous = state.vehicles[index].clone();
        let mut updated = state.build_vehicle(id, vehicle);
        updated.status = previous.status;
        updated.sold_at = previous.sold_at;
        updated.sold_price = previous.sold_price;
        updated.created_at = previous.created_at;
        state.vehicles[index] = updated.clone();
        state.audit("vehicles", id, "update");
        Ok(updated)
    }

    async fn get_vehicle(
        &self,
        id: i64,
    ) -> Result<Vehicle, RepositoryError> {
        self.state()
            .vehicles
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_vehicles(
        &self,
        status: Option<VehicleStatus>,
    ) -> Result<Vec<Vehicle>, RepositoryError> {
        Ok(self
            .state()
            .vehicles
            .iter()
            .filter(|v| status.is_none_or(|s| v.status == s))
            .cloned()
            .collect())
    }

    async fn set_vehicle_status(
        &self,
        id: i64,
        status: VehicleStatus,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state();
        let vehicle = state
            .vehicles
            .iter_mut()
            .find(|v| v.id == id && v.status != VehicleStatus::Sold)
            .ok_or(RepositoryError::NotFound)?;
        vehicle.status = status;
        Ok(())
    }

    async fn list_vehicle_documents(
        &self,
        vehicle_id: Option<i64>,
    ) -> Result<Vec<VehicleDocument>, RepositoryError> {
        Ok(self
            .state()
            .documents
            .iter()
            .filter(|d| vehicle_id.is_none_or(|id| d.vehicle_id == id))
            .cloned()
            .collect())
    }

    async fn set_document_status(
        &self,
        vehicle_id: i64,
        doc_type_id: i64,
        status: DocumentStatus,
    ) -> Result<VehicleDocument, RepositoryError> {
        let mut state = self.state();
        if let Some(existing) = state
            .documents
            .iter_mut()
            .find(|d| d.vehicle_id == vehicle_id && d.doc_type_id == doc_type_id)
        {
            existing.status = status;
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }
        let id = state.next_id();
        let created = VehicleDocument {
            id,
            vehicle_id,
            doc_type_id,
            status,
            updated_at: Utc::now(),
        };
        state.documents.push(created.clone());
        Ok(created)
    }

    async fn add_expense(
        &self,
        expense: NewExpense,
    ) -> Result<Expense, RepositoryError> {
        let mut state = self.state();
        let id = state.next_id();
        let created = Expense {
            id,
            vehicle_id: expense.vehicle_id,
            expense_type_id: expense.expense_type_id,
            amount: expense.amount,
            expense_date: expense.expense_date,
            notes: expense.notes,
            created_at: Utc::now(),
        };
        state.expenses.push(created.clone());
        Ok(created)
    }

    async fn delete_expense(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state();
        let before = state.expenses.len();
        state.expenses.retain(|e| e.id != id);
        if state.expenses.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_expenses(
        &self,
        vehicle_id: Option<i64>,
    ) -> Result<Vec<Expense>, RepositoryError> {
        Ok(self
            .state()
            .expenses
            .iter()
            .filter(|e| vehicle_id.is_none_or(|id| e.vehicle_id == id))
            .cloned()
            .collect())
    }

    async fn record_sale(
        &self,
        sale: NewSale,
    ) -> Result<Sale, RepositoryError> {
        let mut state = self.state();
        let vehicle = state
            .vehicles
            .iter_mut()
            .find(|v| v.id == sale.vehicle_id && v.status != VehicleStatus::Sold)
            .ok_or(RepositoryError::NotFound)?;
        vehicle.status = VehicleStatus::Sold;
        vehicle.sold_price = Some(sale.sold_price);
        vehicle.sold_at = Some(sale.sold_at);
        let id = state.next_id();
        let created = Sale {
            id,
            vehicle_id: sale.vehicle_id,
            sold_price: sale.sold_price,
            sold_at: sale.sold_at,
            notes: sale.notes,
        };
        state.sales.push(created.clone());
        state.audit("vehicles", sale.vehicle_id, "sale");
        Ok(created)
    }

    async fn list_sales(&self) -> Result<Vec<Sale>, RepositoryError> {
        let mut sales = self.state().sales.clone();
        sales.sort_by(|a, b| b.sold_at.cmp(&a.sold_at));
        Ok(sales)
    }

    async fn list_audit_entries(
        &self,
        limit: i64,
    ) -> Result<Vec<AuditEntry>, RepositoryError> {
        let state = self.state();
        Ok(state
            .audit
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
