use crate::core::constants::TaxConstants;
use crate::core::decimal::{non_negative, round2};
use rust_decimal::Decimal;

/// Base taxed at progressive rates: employment after NCZD plus other income.
pub fn base(r78: Decimal, r69: Decimal) -> Decimal {
    round2(non_negative(r78 + r69))
}

/// Tax on the progressive base using the two-bracket schedule.
pub fn tax(base: Decimal, constants: &TaxConstants) -> Decimal {
    let threshold = constants.bracket_threshold();
    let tax = if base <= threshold {
        base * constants.lower_rate
    } else {
        threshold * constants.lower_rate + (base - threshold) * constants.upper_rate
    };
    round2(non_negative(tax))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::Y2025;
    use rust_decimal_macros::dec;

    #[test]
    fn lower_bracket() {
        assert_eq!(tax(dec!(20000), &Y2025), dec!(3800.00));
    }

    #[test]
    fn at_threshold() {
        // 48441.43 * 0.19 = 9203.8717
        assert_eq!(tax(dec!(48441.43), &Y2025), dec!(9203.87));
    }

    #[test]
    fn upper_bracket() {
        // 9203.8717 + 11558.57 * 0.25
        assert_eq!(tax(dec!(60000), &Y2025), dec!(12093.51));
    }

    #[test]
    fn base_adds_other_income() {
        assert_eq!(base(dec!(8985.60), dec!(700)), dec!(9685.60));
    }

    #[test]
    fn zero_base_zero_tax() {
        assert_eq!(tax(Decimal::ZERO, &Y2025), Decimal::ZERO);
    }
}
