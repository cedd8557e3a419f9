//! Non-taxable parts of the base (nezdaniteľná časť základu dane).

use crate::core::constants::TaxConstants;
use crate::core::decimal::{amount, non_negative, round2};
use crate::core::form::SpouseNczd;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NczdStage {
    pub r72: Decimal,
    pub r73: Decimal,
    pub r74: Decimal,
    /// Total claimed, never more than the base it reduces
    pub r77: Decimal,
    pub r78: Decimal,
}

/// NCZD on the taxpayer for an employment base of `base`.
pub fn taxpayer(base: Decimal, constants: &TaxConstants) -> Decimal {
    if base <= constants.taxpayer_nczd_threshold() {
        constants.taxpayer_nczd_flat()
    } else {
        round2(non_negative(constants.taxpayer_nczd_high() - base / Decimal::from(4)))
    }
}

/// NCZD on the spouse, proportional to the months of eligibility.
pub fn spouse(base: Decimal, spouse: &SpouseNczd, constants: &TaxConstants) -> Decimal {
    if !spouse.enabled {
        return Decimal::ZERO;
    }

    let yearly = if base <= constants.spouse_nczd_threshold() {
        constants.spouse_nczd_low() - amount(spouse.own_income)
    } else {
        constants.spouse_nczd_high() - base / Decimal::from(4) - amount(spouse.own_income)
    };
    let months = Decimal::from(spouse.months.min(12));

    round2(non_negative(yearly) * months / Decimal::from(12))
}

pub fn calculate(r38: Decimal, spouse_input: &SpouseNczd, constants: &TaxConstants) -> NczdStage {
    let r72 = r38;
    // nothing to reduce without an employment base
    if r72.is_zero() {
        return NczdStage::default();
    }

    let r73 = taxpayer(r72, constants);
    let r74 = spouse(r72, spouse_input, constants);
    let r77 = (r73 + r74).min(r72);
    let r78 = non_negative(r72 - r77);

    log::debug!("nczd: taxpayer={} spouse={} claimed={} base={}", r73, r74, r77, r78);

    NczdStage {
        r72,
        r73,
        r74,
        r77,
        r78,
    }
}
