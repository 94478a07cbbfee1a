//! Margin and ROI for a single vehicle.
//!
//! | Figure             | Formula |
//! |--------------------|---------|
//! | `total_expenses`   | sum of expense amounts |
//! | `total_investment` | `take_price + total_expenses` |
//! | `margin`           | `reference_price - total_investment` |
//! | `roi`              | `margin / total_investment * 100`; 0 for a non-positive investment |
//!
//! The reference price is the list price while the vehicle is in stock or
//! reserved ([`Basis::Projected`]) and the sold price once it is sold
//! ([`Basis::Realized`]). Every result carries its basis so projected and
//! realized figures are never mixed on a report.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use dealer_core::calculations::{Basis, Profitability, ProfitabilityInput};
//! use dealer_core::VehicleStatus;
//!
//! let input = ProfitabilityInput {
//!     take_price: dec!(10000000),
//!     expenses: vec![dec!(500000), dec!(300000)],
//!     reference_price: dec!(14000000),
//!     status: VehicleStatus::InStock,
//! };
//!
//! let result = Profitability::calculate(&input);
//!
//! assert_eq!(result.total_investment, dec!(10800000));
//! assert_eq!(result.margin, dec!(3200000));
//! assert_eq!(result.roi_rounded(1), dec!(29.6));
//! assert_eq!(result.basis, Basis::Projected);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::{percent_of, round_half_up, sum};
use crate::models::{VehicleFinancials, VehicleStatus};

/// Which price a margin was computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    /// Against the list price, while the vehicle is still for sale.
    Projected,
    /// Against the transacted price of a completed sale.
    Realized,
}

impl Basis {
    pub fn for_status(status: VehicleStatus) -> Self {
        match status {
            VehicleStatus::Sold => Self::Realized,
            VehicleStatus::InStock | VehicleStatus::Reserved => Self::Projected,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Projected => "Proyectado",
            Self::Realized => "Real",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitabilityInput {
    /// Acquisition cost paid for the vehicle.
    pub take_price: Decimal,

    /// Individual expense amounts logged against the vehicle.
    pub expenses: Vec<Decimal>,

    /// List price or sold price, chosen by the caller.
    pub reference_price: Decimal,

    pub status: VehicleStatus,
}

impl ProfitabilityInput {
    /// Picks the reference price from the vehicle's own fields.
    ///
    /// Sold vehicles use their sold price. A sold vehicle without a recorded
    /// sold price falls back to a projected figure on the list price. A
    /// missing list price counts as zero.
    pub fn from_financials(
        financials: &VehicleFinancials,
        expenses: Vec<Decimal>,
    ) -> Self {
        let list_price = financials.list_price.unwrap_or(Decimal::ZERO);
        let (reference_price, status) = match (financials.status, financials.sold_price) {
            (VehicleStatus::Sold, Some(sold_price)) => (sold_price, VehicleStatus::Sold),
            (VehicleStatus::Sold, None) => {
                warn!("sold vehicle has no sold price; falling back to projected figures");
                (list_price, VehicleStatus::InStock)
            }
            (status, _) => (list_price, status),
        };

        Self {
            take_price: financials.take_price,
            expenses,
            reference_price,
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitabilityResult {
    pub total_expenses: Decimal,
    pub total_investment: Decimal,
    pub reference_price: Decimal,
    pub margin: Decimal,

    /// Percentage, unrounded. Zero when `total_investment` is not positive.
    pub roi: Decimal,

    pub basis: Basis,
}

impl ProfitabilityResult {
    pub fn roi_rounded(
        &self,
        dp: u32,
    ) -> Decimal {
        round_half_up(self.roi, dp)
    }

    pub fn is_loss(&self) -> bool {
        self.margin < Decimal::ZERO
    }
}

/// Stateless calculator; see the module docs for the formulas.
pub struct Profitability;

impl Profitability {
    pub fn calculate(input: &ProfitabilityInput) -> ProfitabilityResult {
        let total_expenses = sum(input.expenses.iter().copied());
        let total_investment = input.take_price + total_expenses;
        let margin = input.reference_price - total_investment;

        ProfitabilityResult {
            total_expenses,
            total_investment,
            reference_price: input.reference_price,
            margin,
            roi: percent_of(margin, total_investment),
            basis: Basis::for_status(input.status),
        }
    }

    /// Shortcut for [`ProfitabilityInput::from_financials`] followed by
    /// [`Profitability::calculate`].
    pub fn for_vehicle(
        financials: &VehicleFinancials,
        expenses: Vec<Decimal>,
    ) -> ProfitabilityResult {
        Self::calculate(&ProfitabilityInput::from_financials(financials, expenses))
    }
}
