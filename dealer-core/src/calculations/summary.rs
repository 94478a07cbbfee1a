//! Dashboard figures aggregated over the whole inventory and sales history.
//!
//! Every per-vehicle figure goes through [`Profitability`], so the dashboard,
//! the sales report and the exports agree on margins.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{percent_of, sum};
use crate::calculations::documents::DocumentRequirements;
use crate::calculations::profitability::{Profitability, ProfitabilityInput};
use crate::models::{Expense, Sale, Vehicle, VehicleDocument, VehicleStatus};

const MONTH_LABELS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

/// Brand bucket for vehicles whose brand name could not be resolved.
pub const UNKNOWN_BRAND: &str = "Otros";

/// Months shown in the sales history, current month included.
pub const HISTORY_MONTHS: u32 = 6;

/// Groups expense amounts by vehicle id.
pub fn expense_totals(expenses: &[Expense]) -> HashMap<i64, Decimal> {
    let mut totals: HashMap<i64, Decimal> = HashMap::new();
    for expense in expenses {
        *totals.entry(expense.vehicle_id).or_insert(Decimal::ZERO) += expense.amount;
    }
    totals
}

/// Documents still to collect across the in-stock and reserved vehicles.
///
/// A type with no record for a vehicle counts the same as one marked
/// `missing`; only an `ok` record settles it.
pub fn pending_document_count(
    requirements: &DocumentRequirements<'_>,
    vehicles: &[Vehicle],
    documents: &[VehicleDocument],
) -> i64 {
    let mut by_vehicle: HashMap<i64, Vec<VehicleDocument>> = HashMap::new();
    for document in documents {
        by_vehicle
            .entry(document.vehicle_id)
            .or_default()
            .push(document.clone());
    }

    vehicles
        .iter()
        .filter(|v| v.status != VehicleStatus::Sold)
        .map(|v| {
            let readiness = requirements.evaluate(
                by_vehicle
                    .get(&v.id)
                    .map(Vec::as_slice)
                    .unwrap_or_default(),
            );
            (readiness.missing_critical.len() + readiness.missing_optional.len()) as i64
        })
        .sum()
}

/// List-price bands used by the stock distribution chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub label: &'static str,
    pub min: Decimal,
    /// Exclusive upper bound; `None` for the open top band.
    pub max: Option<Decimal>,
    pub count: usize,
}

impl PriceRange {
    fn contains(
        &self,
        price: Decimal,
    ) -> bool {
        price >= self.min && self.max.is_none_or(|max| price < max)
    }
}

fn price_ranges() -> Vec<PriceRange> {
    let million = Decimal::from(1_000_000);
    vec![
        PriceRange {
            label: "< $15M",
            min: Decimal::MIN,
            max: Some(million * Decimal::from(15)),
            count: 0,
        },
        PriceRange {
            label: "$15M - $30M",
            min: million * Decimal::from(15),
            max: Some(million * Decimal::from(30)),
            count: 0,
        },
        PriceRange {
            label: "$30M - $50M",
            min: million * Decimal::from(30),
            max: Some(million * Decimal::from(50)),
            count: 0,
        },
        PriceRange {
            label: "> $50M",
            min: million * Decimal::from(50),
            max: None,
            count: 0,
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySales {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub sales: Decimal,
    pub margin: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub stock_count: usize,

    /// Take prices plus expenses of every in-stock vehicle.
    pub invested_in_stock: Decimal,

    pub total_sales: Decimal,

    /// Realized margin summed over all sales.
    pub net_margin: Decimal,

    /// `total_sales - net_margin`.
    pub cost_of_sales: Decimal,

    /// Net margin as a percentage of total sales; 0 without sales.
    pub average_margin_pct: Decimal,

    /// Active document types not yet `ok`, summed over unsold vehicles.
    pub pending_documents: i64,

    /// In-stock vehicles per brand name, sorted by name.
    pub stock_by_brand: Vec<(String, usize)>,

    pub price_ranges: Vec<PriceRange>,

    /// Oldest month first, ending with the month of `today`.
    pub monthly: Vec<MonthlySales>,
}

impl DashboardSummary {
    /// Aggregates the dashboard.
    ///
    /// `vehicles` should contain every vehicle referenced by `sales`; a sale
    /// whose vehicle is absent is counted with a zero take price.
    pub fn build(
        vehicles: &[Vehicle],
        sales: &[Sale],
        expense_totals: &HashMap<i64, Decimal>,
        pending_documents: i64,
        today: NaiveDate,
    ) -> Self {
        let expenses_for =
            |id: i64| expense_totals.get(&id).copied().unwrap_or(Decimal::ZERO);
        let by_id: HashMap<i64, &Vehicle> = vehicles.iter().map(|v| (v.id, v)).collect();

        let stock: Vec<&Vehicle> = vehicles
            .iter()
            .filter(|v| v.status == VehicleStatus::InStock)
            .collect();

        let invested_in_stock = sum(stock.iter().map(|v| v.take_price + expenses_for(v.id)));

        let mut brands: BTreeMap<String, usize> = BTreeMap::new();
        let mut ranges = price_ranges();
        for vehicle in &stock {
            let brand = vehicle
                .brand_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_BRAND.to_string());
            *brands.entry(brand).or_default() += 1;

            let price = vehicle.list_price.unwrap_or(Decimal::ZERO);
            if let Some(range) = ranges.iter_mut().find(|r| r.contains(price)) {
                range.count += 1;
            }
        }

        let mut monthly = history_months(today);
        let mut total_sales = Decimal::ZERO;
        let mut net_margin = Decimal::ZERO;
        for sale in sales {
            let take_price = by_id
                .get(&sale.vehicle_id)
                .map(|v| v.take_price)
                .unwrap_or(Decimal::ZERO);
            let result = Profitability::calculate(&ProfitabilityInput {
                take_price,
                expenses: vec![expenses_for(sale.vehicle_id)],
                reference_price: sale.sold_price,
                status: VehicleStatus::Sold,
            });

            total_sales += sale.sold_price;
            net_margin += result.margin;

            let sold_on = sale.sold_at.date_naive();
            if let Some(bucket) = monthly
                .iter_mut()
                .find(|m| m.year == sold_on.year() && m.month == sold_on.month())
            {
                bucket.sales += sale.sold_price;
                bucket.margin += result.margin;
            }
        }

        Self {
            stock_count: stock.len(),
            invested_in_stock,
            total_sales,
            net_margin,
            cost_of_sales: total_sales - net_margin,
            average_margin_pct: percent_of(net_margin, total_sales),
            pending_documents,
            stock_by_brand: brands.into_iter().collect(),
            price_ranges: ranges,
            monthly,
        }
    }
}

/// Empty buckets for the last [`HISTORY_MONTHS`] calendar months.
fn history_months(today: NaiveDate) -> Vec<MonthlySales> {
    let current = today.year() * 12 + today.month0() as i32;
    (0..HISTORY_MONTHS as i32)
        .rev()
        .map(|back| {
            let index = current - back;
            let year = index.div_euclid(12);
            let month0 = index.rem_euclid(12) as usize;
            MonthlySales {
                year,
                month: month0 as u32 + 1,
                label: MONTH_LABELS[month0].to_string(),
                sales: Decimal::ZERO,
                margin: Decimal::ZERO,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{DocumentStatus, DocumentType, ReviewState};

    fn vehicle(
        id: i64,
        brand: Option<&str>,
        take_price: Decimal,
        list_price: Option<Decimal>,
        status: VehicleStatus,
    ) -> Vehicle {
        let now = Utc::now();
        Vehicle {
            id,
            brand_id: 1,
            model_id: 1,
            trim_id: None,
            fuel_id: None,
            transmission_id: None,
            color_id: None,
            year: 2020,
            mileage: 50000,
            plate: format!("AA{id:03}BB"),
            take_price,
            info_price: None,
            zero_km_price: None,
            suggested_price: None,
            list_price,
            status,
            entry_date: now.date_naive(),
            sold_at: None,
            sold_price: None,
            brand_name: brand.map(str::to_string),
            model_name: Some("Modelo".to_string()),
            trim_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sale(
        vehicle_id: i64,
        sold_price: Decimal,
        year: i32,
        month: u32,
    ) -> Sale {
        Sale {
            id: vehicle_id,
            vehicle_id,
            sold_price,
            sold_at: Utc.with_ymd_and_hms(year, month, 15, 12, 0, 0).unwrap(),
            notes: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn expense_totals_groups_by_vehicle() {
        let date = today();
        let expense = |vehicle_id, amount| Expense {
            id: 0,
            vehicle_id,
            expense_type_id: 1,
            amount,
            expense_date: date,
            notes: None,
            created_at: Utc::now(),
        };
        let totals = expense_totals(&[
            expense(1, dec!(100)),
            expense(2, dec!(50)),
            expense(1, dec!(25)),
        ]);

        assert_eq!(totals.get(&1), Some(&dec!(125)));
        assert_eq!(totals.get(&2), Some(&dec!(50)));
        assert_eq!(totals.get(&3), None);
    }

    #[test]
    fn stock_figures_only_count_in_stock_vehicles() {
        let vehicles = vec![
            vehicle(1, Some("Ford"), dec!(10000000), Some(dec!(14000000)), VehicleStatus::InStock),
            vehicle(2, None, dec!(20000000), Some(dec!(31000000)), VehicleStatus::InStock),
            vehicle(3, Some("Fiat"), dec!(5000000), None, VehicleStatus::Sold),
        ];
        let expenses = HashMap::from([(1, dec!(800000)), (3, dec!(999))]);

        let summary = DashboardSummary::build(&vehicles, &[], &expenses, 4, today());

        assert_eq!(summary.stock_count, 2);
        assert_eq!(summary.invested_in_stock, dec!(30800000));
        assert_eq!(summary.pending_documents, 4);
        assert_eq!(
            summary.stock_by_brand,
            vec![("Ford".to_string(), 1), (UNKNOWN_BRAND.to_string(), 1)]
        );
        let counts: Vec<usize> = summary.price_ranges.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![1, 0, 1, 0]);
    }

    fn doc_type(
        id: i64,
        is_critical: bool,
    ) -> DocumentType {
        DocumentType {
            id,
            name: format!("doc {id}"),
            is_critical,
            is_active: true,
            review: ReviewState::Approved,
            created_at: Utc::now(),
        }
    }

    fn record(
        vehicle_id: i64,
        doc_type_id: i64,
        status: DocumentStatus,
    ) -> VehicleDocument {
        VehicleDocument {
            id: vehicle_id * 100 + doc_type_id,
            vehicle_id,
            doc_type_id,
            status,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn vehicle_without_records_counts_every_active_type() {
        let types = vec![doc_type(1, true), doc_type(2, true), doc_type(3, false)];
        let vehicles = vec![vehicle(1, None, dec!(1), None, VehicleStatus::InStock)];

        let pending = pending_document_count(&DocumentRequirements::new(&types), &vehicles, &[]);

        assert_eq!(pending, 3);
    }

    #[test]
    fn only_ok_records_settle_a_pending_document() {
        let types = vec![doc_type(1, true), doc_type(2, false), doc_type(3, false)];
        let vehicles = vec![
            vehicle(1, None, dec!(1), None, VehicleStatus::InStock),
            vehicle(2, None, dec!(1), None, VehicleStatus::Reserved),
            vehicle(3, None, dec!(1), None, VehicleStatus::Sold),
        ];
        let documents = vec![
            record(1, 1, DocumentStatus::Ok),
            record(1, 2, DocumentStatus::InProgress),
            record(1, 3, DocumentStatus::Missing),
            record(2, 1, DocumentStatus::Ok),
            record(2, 2, DocumentStatus::Ok),
            record(2, 3, DocumentStatus::Ok),
        ];

        let pending =
            pending_document_count(&DocumentRequirements::new(&types), &vehicles, &documents);

        assert_eq!(pending, 2);
    }

    #[test]
    fn price_range_bounds_are_lower_inclusive() {
        let vehicles = vec![
            vehicle(1, None, dec!(1), Some(dec!(15000000)), VehicleStatus::InStock),
            vehicle(2, None, dec!(1), Some(dec!(50000000)), VehicleStatus::InStock),
        ];

        let summary = DashboardSummary::build(&vehicles, &[], &HashMap::new(), 0, today());

        let counts: Vec<usize> = summary.price_ranges.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![0, 1, 0, 1]);
    }

    #[test]
    fn sales_figures_use_realized_margin() {
        let vehicles = vec![
            vehicle(1, None, dec!(5000000), None, VehicleStatus::Sold),
            vehicle(2, None, dec!(10000000), None, VehicleStatus::Sold),
        ];
        let sales = vec![
            sale(1, dec!(4000000), 2025, 3),
            sale(2, dec!(13000000), 2025, 1),
        ];
        let expenses = HashMap::from([(2, dec!(1000000))]);

        let summary = DashboardSummary::build(&vehicles, &sales, &expenses, 0, today());

        assert_eq!(summary.total_sales, dec!(17000000));
        assert_eq!(summary.net_margin, dec!(1000000));
        assert_eq!(summary.cost_of_sales, dec!(16000000));
        assert_eq!(
            crate::calculations::common::round_half_up(summary.average_margin_pct, 2),
            dec!(5.88)
        );
    }

    #[test]
    fn no_sales_means_zero_average_margin() {
        let summary = DashboardSummary::build(&[], &[], &HashMap::new(), 0, today());

        assert_eq!(summary.average_margin_pct, Decimal::ZERO);
        assert_eq!(summary.stock_count, 0);
    }

    #[test]
    fn history_spans_six_months_across_year_boundary() {
        let summary = DashboardSummary::build(&[], &[], &HashMap::new(), 0, today());

        let months: Vec<(i32, u32)> = summary.monthly.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(
            months,
            vec![(2024, 10), (2024, 11), (2024, 12), (2025, 1), (2025, 2), (2025, 3)]
        );
        assert_eq!(summary.monthly[0].label, "Oct");
        assert_eq!(summary.monthly[5].label, "Mar");
    }

    #[test]
    fn same_month_of_previous_year_is_not_bucketed() {
        let vehicles = vec![vehicle(1, None, dec!(100), None, VehicleStatus::Sold)];
        let sales = vec![sale(1, dec!(150), 2024, 3)];

        let summary = DashboardSummary::build(&vehicles, &sales, &HashMap::new(), 0, today());

        assert!(summary.monthly.iter().all(|m| m.sales == Decimal::ZERO));
        assert_eq!(summary.total_sales, dec!(150));
    }

    #[test]
    fn sale_lands_in_its_month_bucket() {
        let vehicles = vec![vehicle(1, None, dec!(100), None, VehicleStatus::Sold)];
        let sales = vec![sale(1, dec!(150), 2024, 12)];

        let summary = DashboardSummary::build(&vehicles, &sales, &HashMap::new(), 0, today());

        let december = &summary.monthly[2];
        assert_eq!((december.year, december.month), (2024, 12));
        assert_eq!(december.sales, dec!(150));
        assert_eq!(december.margin, dec!(50));
    }

    #[test]
    fn sale_without_vehicle_counts_zero_take_price() {
        let sales = vec![sale(42, dec!(1000), 2025, 3)];

        let summary = DashboardSummary::build(&[], &sales, &HashMap::new(), 0, today());

        assert_eq!(summary.net_margin, dec!(1000));
    }
}
