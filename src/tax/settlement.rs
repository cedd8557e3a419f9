use crate::core::constants::TaxConstants;
use crate::core::decimal::{non_negative, round2};
use crate::core::form::{ParentTaxAllocation, TwoPercentAllocation};
use rust_decimal::Decimal;

/// Outcome of the return: tax to pay or to be refunded, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settlement {
    /// Signed difference, negative for a refund
    pub r135: Decimal,
    pub r136: Decimal,
    pub r137: Decimal,
    pub is_refund: bool,
    pub final_amount: Decimal,
}

pub fn settle(
    r124: Decimal,
    r123: Decimal,
    r120: Decimal,
    r131: Decimal,
    constants: &TaxConstants,
) -> Settlement {
    let mut difference = round2(r124 - r123 - r120 - r131);
    if difference > Decimal::ZERO && difference <= constants.de_minimis {
        log::debug!("payable {} waived as de minimis", difference);
        difference = Decimal::ZERO;
    }

    let r136 = non_negative(difference);
    let r137 = non_negative(-difference);
    let is_refund = r137 > Decimal::ZERO;
    let final_amount = if is_refund { r137 } else { r136 };

    Settlement {
        r135: difference,
        r136,
        r137,
        is_refund,
        final_amount,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocations {
    /// Share for the recipient organisation
    pub r151: Decimal,
    /// Share for each designated parent
    pub r152: Decimal,
}

fn share(tax: Decimal, rate: Decimal, minimum: Decimal) -> Decimal {
    let amount = round2(tax * rate);
    if amount < minimum {
        Decimal::ZERO
    } else {
        amount
    }
}

pub fn allocations(
    r124: Decimal,
    ngo: &TwoPercentAllocation,
    parents: &ParentTaxAllocation,
    constants: &TaxConstants,
) -> Allocations {
    let r151 = if ngo.enabled {
        let rate = if ngo.volunteer {
            constants.ngo_rate_volunteer
        } else {
            constants.ngo_rate
        };
        share(r124, rate, constants.ngo_minimum)
    } else {
        Decimal::ZERO
    };

    let r152 = if parents.is_enabled() {
        share(r124, constants.parent_rate, constants.parent_minimum)
    } else {
        Decimal::ZERO
    };

    Allocations { r151, r152 }
}
