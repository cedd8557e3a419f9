use crate::core::decimal::round2;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Statutory figures for one tax year.
///
/// Amounts derived from the subsistence minimum (ŽM) are stored as
/// multiples and computed on demand, so a change of ŽM touches one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxConstants {
    /// Životné minimum applicable to the tax year
    pub subsistence_minimum: Decimal,

    pub taxpayer_nczd_multiple: Decimal,
    pub taxpayer_nczd_threshold_multiple: Decimal,
    pub taxpayer_nczd_high_multiple: Decimal,

    pub spouse_nczd_threshold_multiple: Decimal,
    pub spouse_nczd_low_multiple: Decimal,
    pub spouse_nczd_high_multiple: Decimal,

    pub bracket_threshold_multiple: Decimal,
    pub lower_rate: Decimal,
    pub upper_rate: Decimal,

    /// Flat rate on the special base from capital income (§7)
    pub capital_rate: Decimal,
    /// Flat rate on dividends (príloha 2)
    pub dividend_rate: Decimal,

    pub mortgage_bonus_rate: Decimal,
    /// Cap for contracts concluded on or before the cutoff date
    pub mortgage_cap_old: Decimal,
    /// Cap for contracts concluded after the cutoff date
    pub mortgage_cap_new: Decimal,
    pub mortgage_cutoff: (i32, u32, u32),

    pub child_bonus_under_15: Decimal,
    pub child_bonus_15_to_18: Decimal,
    pub child_bonus_phase_out_threshold: Decimal,
    pub child_bonus_phase_out_divisor: Decimal,

    pub ngo_rate: Decimal,
    pub ngo_rate_volunteer: Decimal,
    pub ngo_minimum: Decimal,
    pub parent_rate: Decimal,
    pub parent_minimum: Decimal,

    /// One-time exemption for short-term securities gains
    pub securities_exemption: Decimal,
    /// Settlement amounts up to this value are not collected
    pub de_minimis: Decimal,

    /// Annual average, units of USD per 1 EUR
    pub default_usd_eur: Decimal,
    /// Annual average, units of CZK per 1 EUR
    pub default_czk_eur: Decimal,

    /// Two-digit birth years up to this value belong to the 2000s
    pub birth_number_century_pivot: u32,
}

pub const Y2025: TaxConstants = TaxConstants {
    subsistence_minimum: dec!(273.99),

    taxpayer_nczd_multiple: dec!(21),
    taxpayer_nczd_threshold_multiple: dec!(92.8),
    taxpayer_nczd_high_multiple: dec!(44.2),

    spouse_nczd_threshold_multiple: dec!(176.8),
    spouse_nczd_low_multiple: dec!(19.2),
    spouse_nczd_high_multiple: dec!(63.4),

    bracket_threshold_multiple: dec!(176.8),
    lower_rate: dec!(0.19),
    upper_rate: dec!(0.25),

    capital_rate: dec!(0.19),
    dividend_rate: dec!(0.07),

    mortgage_bonus_rate: dec!(0.5),
    mortgage_cap_old: dec!(400),
    mortgage_cap_new: dec!(1200),
    mortgage_cutoff: (2023, 12, 31),

    child_bonus_under_15: dec!(100),
    child_bonus_15_to_18: dec!(50),
    child_bonus_phase_out_threshold: dec!(2145),
    child_bonus_phase_out_divisor: dec!(10),

    ngo_rate: dec!(0.02),
    ngo_rate_volunteer: dec!(0.03),
    ngo_minimum: dec!(3),
    parent_rate: dec!(0.02),
    parent_minimum: dec!(3),

    securities_exemption: dec!(500),
    de_minimis: dec!(5),

    default_usd_eur: dec!(1.1300),
    default_czk_eur: dec!(24.9800),

    birth_number_century_pivot: 23,
};

impl TaxConstants {
    fn zm(&self, multiple: Decimal) -> Decimal {
        round2(self.subsistence_minimum * multiple)
    }

    pub fn taxpayer_nczd_flat(&self) -> Decimal {
        self.zm(self.taxpayer_nczd_multiple)
    }

    pub fn taxpayer_nczd_threshold(&self) -> Decimal {
        self.zm(self.taxpayer_nczd_threshold_multiple)
    }

    pub fn taxpayer_nczd_high(&self) -> Decimal {
        self.zm(self.taxpayer_nczd_high_multiple)
    }

    pub fn spouse_nczd_threshold(&self) -> Decimal {
        self.zm(self.spouse_nczd_threshold_multiple)
    }

    pub fn spouse_nczd_low(&self) -> Decimal {
        self.zm(self.spouse_nczd_low_multiple)
    }

    pub fn spouse_nczd_high(&self) -> Decimal {
        self.zm(self.spouse_nczd_high_multiple)
    }

    pub fn bracket_threshold(&self) -> Decimal {
        self.zm(self.bracket_threshold_multiple)
    }

    pub fn mortgage_contract_cutoff(&self) -> NaiveDate {
        let (y, m, d) = self.mortgage_cutoff;
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }
}

/// Calendar tax year of the return
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct TaxYear(pub i32);

/// The year whose form and constants this crate implements
pub const CURRENT_TAX_YEAR: TaxYear = TaxYear(2025);

impl TaxYear {
    /// Constants for this year. Only the current table is maintained, older
    /// years are imported as stale documents and never recalculated with
    /// their own figures.
    pub fn constants(&self) -> &'static TaxConstants {
        &Y2025
    }

    /// Documents from years before the supported one may carry amounts
    /// computed under different law.
    pub fn is_stale(&self) -> bool {
        *self < CURRENT_TAX_YEAR
    }
}

impl Default for TaxYear {
    fn default() -> Self {
        CURRENT_TAX_YEAR
    }
}

impl std::fmt::Display for TaxYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
