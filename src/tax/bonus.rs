//! Tax bonuses: dependent children (§33) and mortgage interest (§33a).

use crate::core::birth_number;
use crate::core::constants::{TaxConstants, TaxYear};
use crate::core::decimal::{amount, non_negative, round2};
use crate::core::form::{ChildBonus, ChildEntry, MortgageInterest};
use crate::core::result::ChildBonusBreakdown;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildBonusStage {
    pub r117: Decimal,
    pub children: Vec<ChildBonusBreakdown>,
}

/// Monthly amount subtracted from every child's bonus once the monthly
/// progressive base exceeds the phase-out threshold.
pub fn phase_out_reduction(r80: Decimal, constants: &TaxConstants) -> Decimal {
    let monthly_base = r80 / Decimal::from(12);
    if monthly_base > constants.child_bonus_phase_out_threshold {
        (monthly_base - constants.child_bonus_phase_out_threshold)
            / constants.child_bonus_phase_out_divisor
    } else {
        Decimal::ZERO
    }
}

fn child_breakdown(
    child: &ChildEntry,
    reduction: Decimal,
    year: TaxYear,
    constants: &TaxConstants,
) -> ChildBonusBreakdown {
    let mut monthly = [Decimal::ZERO; 12];

    match birth_number::parse_with_pivot(&child.birth_number, constants.birth_number_century_pivot)
    {
        Some(birth) => {
            let rates = birth_number::monthly_rates_for_year(birth, year.0, constants);
            for (month, amount) in monthly.iter_mut().enumerate() {
                if child.months[month] {
                    *amount = round2(non_negative(rates[month] - reduction));
                }
            }
        }
        None => log::warn!(
            "no birth date in birth number '{}', child bonus is zero",
            child.birth_number
        ),
    }

    let total = monthly.iter().sum();
    ChildBonusBreakdown {
        name: child.name.clone(),
        monthly,
        total,
    }
}

pub fn child_bonus(
    bonus: &ChildBonus,
    r80: Decimal,
    year: TaxYear,
    constants: &TaxConstants,
) -> ChildBonusStage {
    if !bonus.enabled {
        return ChildBonusStage::default();
    }

    let reduction = phase_out_reduction(r80, constants);
    let children: Vec<_> = bonus
        .children
        .iter()
        .map(|child| child_breakdown(child, reduction, year, constants))
        .collect();
    let r117 = children.iter().map(|c| c.total).sum();

    log::debug!(
        "child bonus: {} children, reduction {}/month, total {}",
        children.len(),
        round2(reduction),
        r117
    );

    ChildBonusStage { r117, children }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BonusApplication {
    /// Tax after the child bonus
    pub r118: Decimal,
    /// Bonus already paid by the employer
    pub r119: Decimal,
    /// Bonus still to be paid out through the return
    pub r120: Decimal,
}

pub fn apply_child_bonus(r116: Decimal, r117: Decimal, bonus: &ChildBonus) -> BonusApplication {
    let r118 = non_negative(r116 - r117);
    let r119 = if bonus.enabled {
        round2(non_negative(amount(bonus.employer_paid_bonus)))
    } else {
        Decimal::ZERO
    };
    let r120 = non_negative(r117 - r119).min(r118);

    BonusApplication { r118, r119, r120 }
}

/// Mortgage interest bonus, capped according to the contract date.
pub fn mortgage(mortgage: &MortgageInterest, constants: &TaxConstants) -> Decimal {
    if !mortgage.enabled {
        return Decimal::ZERO;
    }

    let cap = match mortgage.contract_date {
        Some(date) if date > constants.mortgage_contract_cutoff() => constants.mortgage_cap_new,
        _ => constants.mortgage_cap_old,
    };
    let interest = non_negative(amount(mortgage.interest_paid));
    let bonus = round2(interest * constants.mortgage_bonus_rate);

    log::debug!("mortgage bonus: {} (cap {})", bonus.min(cap), cap);

    bonus.min(cap)
}
