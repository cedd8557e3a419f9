use crate::core::decimal::{self, fixed2};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// Every computed row of the return.
///
/// All amounts are rounded to two places when produced by the engine and
/// serialize as fixed two-place strings. Only `r135` may be negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaxCalculationResult {
    #[serde(with = "fixed2")]
    pub r36: Decimal,
    #[serde(with = "fixed2")]
    pub r36a: Decimal,
    #[serde(with = "fixed2")]
    pub r37: Decimal,
    #[serde(with = "fixed2")]
    pub r38: Decimal,

    #[serde(with = "fixed2")]
    pub r66: Decimal,
    #[serde(with = "fixed2")]
    pub r67: Decimal,
    #[serde(with = "fixed2")]
    pub r68: Decimal,
    #[serde(with = "fixed2")]
    pub r69: Decimal,

    #[serde(with = "fixed2")]
    pub r71: Decimal,

    #[serde(with = "fixed2")]
    pub r72: Decimal,
    #[serde(with = "fixed2")]
    pub r73: Decimal,
    #[serde(with = "fixed2")]
    pub r74: Decimal,
    #[serde(with = "fixed2")]
    pub r77: Decimal,
    #[serde(with = "fixed2")]
    pub r78: Decimal,
    #[serde(with = "fixed2")]
    pub r80: Decimal,
    #[serde(with = "fixed2")]
    pub r81: Decimal,

    #[serde(with = "fixed2")]
    pub r106: Decimal,

    #[serde(with = "fixed2")]
    pub pril2_pr1: Decimal,
    #[serde(with = "fixed2")]
    pub pril2_pr2: Decimal,
    #[serde(with = "fixed2")]
    pub pril2_pr3: Decimal,
    #[serde(with = "fixed2")]
    pub pril2_pr4: Decimal,
    #[serde(with = "fixed2")]
    pub pril2_pr5: Decimal,

    #[serde(with = "fixed2")]
    pub r116: Decimal,
    #[serde(with = "fixed2")]
    pub r117: Decimal,
    #[serde(with = "fixed2")]
    pub r118: Decimal,
    #[serde(with = "fixed2")]
    pub r119: Decimal,
    #[serde(with = "fixed2")]
    pub r120: Decimal,
    #[serde(with = "fixed2")]
    pub r123: Decimal,
    #[serde(with = "fixed2")]
    pub r124: Decimal,
    #[serde(with = "fixed2")]
    pub r131: Decimal,
    #[serde(with = "fixed2")]
    pub r135: Decimal,
    #[serde(with = "fixed2")]
    pub r136: Decimal,
    #[serde(with = "fixed2")]
    pub r137: Decimal,

    #[serde(with = "fixed2")]
    pub r151: Decimal,
    #[serde(with = "fixed2")]
    pub r152: Decimal,

    pub is_refund: bool,
    /// Payable amount, or the refund when `is_refund`
    #[serde(with = "fixed2")]
    pub final_amount: Decimal,

    pub children: Vec<ChildBonusBreakdown>,
}

/// Monthly child bonus of one child after the phase-out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildBonusBreakdown {
    pub name: String,
    #[serde(serialize_with = "fixed2_months")]
    pub monthly: [Decimal; 12],
    #[serde(with = "fixed2")]
    pub total: Decimal,
}

fn fixed2_months<S: Serializer>(months: &[Decimal; 12], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(months.iter().map(|m| decimal::format(*m)))
}

/// One printable row of the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultRow {
    pub row: &'static str,
    pub label: &'static str,
    pub value: Decimal,
}

impl TaxCalculationResult {
    /// Rows in form order, for tables and CSV output.
    pub fn rows(&self) -> Vec<ResultRow> {
        fn row(row: &'static str, label: &'static str, value: Decimal) -> ResultRow {
            ResultRow { row, label, value }
        }

        vec![
            row("r36", "Employment income", self.r36),
            row("r36a", "of which work agreements", self.r36a),
            row("r37", "Mandatory insurance", self.r37),
            row("r38", "Employment tax base", self.r38),
            row("r66", "Securities sale income", self.r66),
            row("r67", "Securities purchase cost", self.r67),
            row("r68", "Securities gain", self.r68),
            row("r69", "Securities base after exemption", self.r69),
            row("r71", "Capital income special base", self.r71),
            row("r72", "Employment base for NCZD", self.r72),
            row("r73", "NCZD taxpayer", self.r73),
            row("r74", "NCZD spouse", self.r74),
            row("r77", "NCZD total", self.r77),
            row("r78", "Employment base after NCZD", self.r78),
            row("r80", "Progressive tax base", self.r80),
            row("r81", "Progressive tax", self.r81),
            row("r106", "Capital income tax", self.r106),
            row("pril2_pr1", "Dividends gross", self.pril2_pr1),
            row("pril2_pr2", "Dividend tax before credit", self.pril2_pr2),
            row("pril2_pr3", "Dividend tax withheld abroad", self.pril2_pr3),
            row("pril2_pr4", "Foreign tax credit", self.pril2_pr4),
            row("pril2_pr5", "Dividend tax", self.pril2_pr5),
            row("r116", "Total tax", self.r116),
            row("r117", "Child bonus", self.r117),
            row("r118", "Tax after child bonus", self.r118),
            row("r119", "Child bonus paid by employer", self.r119),
            row("r120", "Child bonus to claim", self.r120),
            row("r123", "Mortgage interest bonus", self.r123),
            row("r124", "Tax after bonuses", self.r124),
            row("r131", "Tax advances withheld", self.r131),
            row("r135", "Settlement", self.r135),
            row("r136", "Tax payable", self.r136),
            row("r137", "Tax refund", self.r137),
            row("r151", "Share for NGO", self.r151),
            row("r152", "Share per parent", self.r152),
        ]
    }
}
