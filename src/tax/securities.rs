//! Gains from selling mutual fund units and short-term securities.

use crate::core::constants::TaxConstants;
use crate::core::decimal::{non_negative, round2, sum};
use crate::core::form::{MutualFundSales, SaleEntry, StockSales};
use rust_decimal::Decimal;

/// Capital income taxed at a flat rate outside the progressive base (§7)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapitalStage {
    pub income: Decimal,
    pub expenses: Decimal,
    /// Special tax base, `max(income - expenses, 0)`
    pub r71: Decimal,
    /// Flat tax on `r71`
    pub r106: Decimal,
}

/// Other income entering the progressive base (§8)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtherIncomeStage {
    pub r66: Decimal,
    pub r67: Decimal,
    pub r68: Decimal,
    /// Gain after the one-time exemption
    pub r69: Decimal,
}

/// Sum of (purchase, sale) amounts.
pub fn totals(entries: &[SaleEntry]) -> (Decimal, Decimal) {
    let purchases = round2(sum(entries, |e| e.purchase_amount));
    let sales = round2(sum(entries, |e| e.sale_amount));
    (purchases, sales)
}

pub fn capital(sales: &MutualFundSales, constants: &TaxConstants) -> CapitalStage {
    if !sales.enabled {
        return CapitalStage::default();
    }

    let (expenses, income) = totals(&sales.entries);
    let r71 = non_negative(income - expenses);
    let r106 = round2(r71 * constants.capital_rate);

    log::debug!("capital income: base={} tax={}", r71, r106);

    CapitalStage {
        income,
        expenses,
        r71,
        r106,
    }
}

pub fn other_income(sales: &StockSales, constants: &TaxConstants) -> OtherIncomeStage {
    if !sales.enabled {
        return OtherIncomeStage::default();
    }

    let (r67, r66) = totals(&sales.entries);
    let r68 = non_negative(r66 - r67);
    let r69 = non_negative(r68 - constants.securities_exemption);

    log::debug!("securities: gain={} after exemption={}", r68, r69);

    OtherIncomeStage { r66, r67, r68, r69 }
}
