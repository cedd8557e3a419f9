//! DPFO typ B calculation.
//!
//! The return is computed by a fixed sequence of stages. Each stage reads
//! only its own form section and the rows produced upstream, so the order
//! below is the dependency order of the form.

pub mod bonus;
pub mod dividends;
pub mod employment;
pub mod nczd;
pub mod progressive;
pub mod securities;
pub mod settlement;

pub use dividends::{CountryDividends, ExchangeRates};

use crate::core::constants::{TaxConstants, TaxYear, CURRENT_TAX_YEAR};
use crate::core::decimal::{non_negative, round2};
use crate::core::form::TaxFormData;
use crate::core::result::TaxCalculationResult;

/// Calculate the return with the constants of the current tax year.
pub fn calculate(form: &TaxFormData) -> TaxCalculationResult {
    calculate_with(form, CURRENT_TAX_YEAR.constants(), CURRENT_TAX_YEAR)
}

/// Calculate the return with an explicit constants table. `year` decides the
/// children's ages for the bonus.
pub fn calculate_with(
    form: &TaxFormData,
    constants: &TaxConstants,
    year: TaxYear,
) -> TaxCalculationResult {
    let employment = employment::calculate(&form.employment);
    let capital = securities::capital(&form.mutual_funds, constants);
    let other = securities::other_income(&form.stocks, constants);
    let dividends = dividends::calculate(&form.dividends, constants);
    let nczd = nczd::calculate(employment.r38, &form.spouse, constants);

    let r80 = progressive::base(nczd.r78, other.r69);
    let r81 = progressive::tax(r80, constants);
    let r116 = round2(r81 + capital.r106 + dividends.pr5);

    let children = bonus::child_bonus(&form.child_bonus, r80, year, constants);
    let applied = bonus::apply_child_bonus(r116, children.r117, &form.child_bonus);
    let r123 = bonus::mortgage(&form.mortgage, constants);
    let r124 = non_negative(applied.r118 - r123);

    let settlement = settlement::settle(r124, r123, applied.r120, employment.r131, constants);
    let allocations = settlement::allocations(
        r124,
        &form.two_percent,
        &form.parent_allocation,
        constants,
    );

    log::debug!(
        "{}: base={} tax={} total={} after bonuses={} settlement={}",
        year,
        r80,
        r81,
        r116,
        r124,
        settlement.r135
    );

    TaxCalculationResult {
        r36: employment.r36,
        r36a: employment.r36a,
        r37: employment.r37,
        r38: employment.r38,
        r66: other.r66,
        r67: other.r67,
        r68: other.r68,
        r69: other.r69,
        r71: capital.r71,
        r72: nczd.r72,
        r73: nczd.r73,
        r74: nczd.r74,
        r77: nczd.r77,
        r78: nczd.r78,
        r80,
        r81,
        r106: capital.r106,
        pril2_pr1: dividends.pr1,
        pril2_pr2: dividends.pr2,
        pril2_pr3: dividends.pr3,
        pril2_pr4: dividends.pr4,
        pril2_pr5: dividends.pr5,
        r116,
        r117: children.r117,
        r118: applied.r118,
        r119: applied.r119,
        r120: applied.r120,
        r123,
        r124,
        r131: employment.r131,
        r135: settlement.r135,
        r136: settlement.r136,
        r137: settlement.r137,
        r151: allocations.r151,
        r152: allocations.r152,
        is_refund: settlement.is_refund,
        final_amount: settlement.final_amount,
        children: children.children,
    }
}
