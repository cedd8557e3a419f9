use crate::core::decimal::{amount, non_negative, round2};
use crate::core::form::EmploymentIncome;
use rust_decimal::Decimal;

/// Rows derived from employment income (§5)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmploymentStage {
    pub r36: Decimal,
    pub r36a: Decimal,
    pub r37: Decimal,
    /// `max(r36 - r37, 0)`
    pub r38: Decimal,
    /// Advances withheld, settled at the end of the pipeline
    pub r131: Decimal,
}

pub fn calculate(employment: &EmploymentIncome) -> EmploymentStage {
    if !employment.enabled {
        return EmploymentStage::default();
    }

    let r36 = round2(non_negative(amount(employment.gross_income)));
    let r36a = round2(non_negative(amount(employment.agreement_income)));
    let r37 = round2(non_negative(amount(employment.mandatory_insurance)));
    let r38 = non_negative(r36 - r37);
    let r131 = round2(non_negative(amount(employment.tax_advances)));

    log::debug!("employment: r36={} r37={} r38={} r131={}", r36, r37, r38, r131);

    EmploymentStage {
        r36,
        r36a,
        r37,
        r38,
        r131,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn employment(gross: Decimal, insurance: Decimal) -> EmploymentIncome {
        EmploymentIncome {
            enabled: true,
            gross_income: gross,
            agreement_income: Decimal::ZERO,
            mandatory_insurance: insurance,
            tax_advances: dec!(1500),
        }
    }

    #[test]
    fn base_is_gross_minus_insurance() {
        let stage = calculate(&employment(dec!(24000), dec!(3240)));
        assert_eq!(stage.r38, dec!(20760));
        assert_eq!(stage.r131, dec!(1500));
    }

    #[test]
    fn base_never_negative() {
        let stage = calculate(&employment(dec!(1000), dec!(1500)));
        assert_eq!(stage.r38, Decimal::ZERO);
    }

    #[test]
    fn amounts_round_half_up() {
        let stage = calculate(&employment(dec!(1000.005), dec!(0.004)));
        assert_eq!(stage.r36, dec!(1000.01));
        assert_eq!(stage.r37, dec!(0.00));
        assert_eq!(stage.r38, dec!(1000.01));
    }

    #[test]
    fn disabled_section_is_zero() {
        let mut input = employment(dec!(24000), dec!(3240));
        input.enabled = false;
        assert_eq!(calculate(&input), EmploymentStage::default());
    }
}
