//! Property-based tests for the document gate and profitability calculator.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use dealer_core::calculations::{
    Basis, DocumentRequirements, Profitability, ProfitabilityInput, Signal,
};
use dealer_core::{DocumentStatus, DocumentType, ReviewState, VehicleDocument, VehicleStatus};

fn doc_type(
    id: i64,
    is_critical: bool,
    is_active: bool,
) -> DocumentType {
    DocumentType {
        id,
        name: format!("doc-{id}"),
        is_critical,
        is_active,
        review: ReviewState::Approved,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn arb_status() -> impl Strategy<Value = DocumentStatus> {
    prop_oneof![
        Just(DocumentStatus::Missing),
        Just(DocumentStatus::InProgress),
        Just(DocumentStatus::Ok),
    ]
}

fn arb_vehicle_status() -> impl Strategy<Value = VehicleStatus> {
    prop_oneof![
        Just(VehicleStatus::InStock),
        Just(VehicleStatus::Reserved),
        Just(VehicleStatus::Sold),
    ]
}

/// Up to eight document types with ids 1..=n and random flags.
fn arb_types() -> impl Strategy<Value = Vec<DocumentType>> {
    proptest::collection::vec((any::<bool>(), any::<bool>()), 0..8).prop_map(|flags| {
        flags
            .into_iter()
            .enumerate()
            .map(|(i, (critical, active))| doc_type(i as i64 + 1, critical, active))
            .collect()
    })
}

/// Records for type ids in 1..=10, so some point at unknown types.
fn arb_records() -> impl Strategy<Value = Vec<VehicleDocument>> {
    proptest::collection::vec((1i64..=10, arb_status()), 0..16).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (doc_type_id, status))| VehicleDocument {
                id: i as i64,
                vehicle_id: 1,
                doc_type_id,
                status,
                updated_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            })
            .collect()
    })
}

/// Types and records together with a random permutation of each.
fn arb_permuted() -> impl Strategy<
    Value = (
        Vec<DocumentType>,
        Vec<DocumentType>,
        Vec<VehicleDocument>,
        Vec<VehicleDocument>,
    ),
> {
    (arb_types(), arb_records()).prop_flat_map(|(types, records)| {
        (
            Just(types.clone()),
            Just(types).prop_shuffle(),
            Just(records.clone()),
            Just(records).prop_shuffle(),
        )
    })
}

/// Whole amounts up to one billion, negatives included.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..1_000_000_000i64).prop_map(Decimal::from)
}

fn is_ok(
    records: &[VehicleDocument],
    id: i64,
) -> bool {
    records
        .iter()
        .any(|r| r.doc_type_id == id && r.status == DocumentStatus::Ok)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Red exactly when an active critical type lacks an ok record, and red never sells.
    #[test]
    fn prop_red_iff_critical_missing(types in arb_types(), records in arb_records()) {
        let readiness = DocumentRequirements::new(&types).evaluate(&records);
        let active: Vec<&DocumentType> = types.iter().filter(|t| t.is_active).collect();
        let critical_missing = active
            .iter()
            .any(|t| t.is_critical && !is_ok(&records, t.id));

        if active.is_empty() {
            prop_assert_eq!(readiness.signal, Signal::Red);
        } else {
            prop_assert_eq!(readiness.signal == Signal::Red, critical_missing);
        }
        if readiness.signal == Signal::Red {
            prop_assert!(!readiness.can_sell);
        }
    }

    /// Yellow sells; green means every active type is ok.
    #[test]
    fn prop_yellow_and_green_conditions(types in arb_types(), records in arb_records()) {
        let readiness = DocumentRequirements::new(&types).evaluate(&records);

        match readiness.signal {
            Signal::Yellow => {
                prop_assert!(readiness.can_sell);
                prop_assert!(readiness.missing_critical.is_empty());
                prop_assert!(!readiness.missing_optional.is_empty());
            }
            Signal::Green => {
                prop_assert!(readiness.can_sell);
                for t in types.iter().filter(|t| t.is_active) {
                    prop_assert!(is_ok(&records, t.id));
                }
            }
            Signal::Red => {}
        }
    }

    /// Record order does not matter and repeated evaluation agrees.
    #[test]
    fn prop_evaluation_is_idempotent(types in arb_types(), records in arb_records()) {
        let requirements = DocumentRequirements::new(&types);
        let mut reversed = records.clone();
        reversed.reverse();

        let first = requirements.evaluate(&records);

        prop_assert_eq!(&first, &requirements.evaluate(&records));
        prop_assert_eq!(&first, &requirements.evaluate(&reversed));
    }

    /// Any ordering of the types and of the records gives the same readiness.
    #[test]
    fn prop_evaluation_ignores_order(
        (types, shuffled_types, records, shuffled_records) in arb_permuted(),
    ) {
        let expected = DocumentRequirements::new(&types).evaluate(&records);

        prop_assert_eq!(
            &expected,
            &DocumentRequirements::new(&types).evaluate(&shuffled_records)
        );
        prop_assert_eq!(
            &expected,
            &DocumentRequirements::new(&shuffled_types).evaluate(&shuffled_records)
        );
    }

    /// margin = reference - take - sum(expenses), exactly.
    #[test]
    fn prop_margin_identity(
        take_price in arb_amount(),
        expenses in proptest::collection::vec(arb_amount(), 0..10),
        reference_price in arb_amount(),
        status in arb_vehicle_status(),
    ) {
        let expected = expenses
            .iter()
            .fold(reference_price - take_price, |acc, e| acc - *e);

        let result = Profitability::calculate(&ProfitabilityInput {
            take_price,
            expenses,
            reference_price,
            status,
        });

        prop_assert_eq!(result.margin, expected);
        prop_assert_eq!(result.basis == Basis::Realized, status == VehicleStatus::Sold);
    }

    /// ROI is zero whenever the investment is not positive.
    #[test]
    fn prop_roi_zero_without_investment(
        reference_price in arb_amount(),
        expense in arb_amount(),
    ) {
        let result = Profitability::calculate(&ProfitabilityInput {
            take_price: -expense,
            expenses: vec![expense],
            reference_price,
            status: VehicleStatus::InStock,
        });

        prop_assert_eq!(result.total_investment, Decimal::ZERO);
        prop_assert_eq!(result.roi, Decimal::ZERO);
    }
}

#[test]
fn two_critical_one_missing_with_optional_ok_is_red() {
    let mut types = vec![doc_type(1, true, true), doc_type(2, true, true)];
    types.extend((3..=7).map(|id| doc_type(id, false, true)));
    let mut records: Vec<VehicleDocument> = (3..=7)
        .map(|id| VehicleDocument {
            id,
            vehicle_id: 1,
            doc_type_id: id,
            status: DocumentStatus::Ok,
            updated_at: Utc::now(),
        })
        .collect();
    records.push(VehicleDocument {
        id: 1,
        vehicle_id: 1,
        doc_type_id: 1,
        status: DocumentStatus::Ok,
        updated_at: Utc::now(),
    });

    let readiness = DocumentRequirements::new(&types).evaluate(&records);

    assert_eq!(readiness.signal, Signal::Red);
    assert!(!readiness.can_sell);
    assert_eq!(readiness.missing_critical, vec![2]);
}
