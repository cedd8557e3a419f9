//! Rodné číslo (birth number) handling.
//!
//! Two independent entry points live here:
//!
//! - [`parse`] is lenient. It only extracts a birth date so that the child
//!   bonus can be derived from age, and accepts every alternate month
//!   encoding regardless of the birth year.
//! - [`validate`] applies the full national rule set including the check
//!   digit and is used to report problems with entered numbers.
//!
//! A number may therefore yield a birth date from [`parse`] while
//! [`validate`] rejects it.

use crate::core::constants::{TaxConstants, CURRENT_TAX_YEAR};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

/// Extract a birth date using the current tax year's century pivot.
pub fn parse(text: &str) -> Option<NaiveDate> {
    parse_with_pivot(text, CURRENT_TAX_YEAR.constants().birth_number_century_pivot)
}

/// Extract a birth date; two-digit years up to `pivot` belong to the 2000s.
pub fn parse_with_pivot(text: &str, pivot: u32) -> Option<NaiveDate> {
    let digits = strip_delimiter(text)?;
    if !(6..=10).contains(&digits.len()) {
        return None;
    }

    let (yy, mm, dd) = date_fields(&digits)?;
    let year = if yy <= pivot { 2000 + yy } else { 1900 + yy };
    let month = match mm {
        71..=82 => mm - 70,
        51..=62 => mm - 50,
        21..=32 => mm - 20,
        1..=12 => mm,
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year as i32, month, dd)
}

/// Age in whole years during the given month of the given year.
///
/// The birthday month already counts as the new age. Negative values mean
/// the person is not yet born in that month.
pub fn age_at(birth: NaiveDate, year: i32, month: u32) -> i32 {
    let age = year - birth.year();
    if birth.month() > month {
        age - 1
    } else {
        age
    }
}

/// Monthly child bonus for a child of the given age.
pub fn monthly_bonus_rate(age: i32, constants: &TaxConstants) -> Decimal {
    match age {
        0..=14 => constants.child_bonus_under_15,
        15..=17 => constants.child_bonus_15_to_18,
        _ => Decimal::ZERO,
    }
}

/// Age-based monthly bonus for January through December of `year`.
pub fn monthly_rates_for_year(
    birth: NaiveDate,
    year: i32,
    constants: &TaxConstants,
) -> [Decimal; 12] {
    let mut rates = [Decimal::ZERO; 12];
    for (index, rate) in rates.iter_mut().enumerate() {
        let month = index as u32 + 1;
        *rate = monthly_bonus_rate(age_at(birth, year, month), constants);
    }
    rates
}

/// Outcome of strict birth number validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthNumberValidity {
    pub valid: bool,
    pub reason: String,
    pub birth_date: Option<NaiveDate>,
}

impl BirthNumberValidity {
    fn invalid(reason: impl Into<String>) -> Self {
        BirthNumberValidity {
            valid: false,
            reason: reason.into(),
            birth_date: None,
        }
    }
}

/// Validate a birth number against the full national rule set.
pub fn validate(text: &str) -> BirthNumberValidity {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return BirthNumberValidity::invalid("birth number is empty");
    }

    if let Some(pos) = trimmed.find('/') {
        if pos != 6 || trimmed[pos + 1..].contains('/') {
            return BirthNumberValidity::invalid("delimiter '/' is allowed only after the sixth digit");
        }
    }

    let Some(digits) = strip_delimiter(trimmed) else {
        return BirthNumberValidity::invalid("birth number may contain only digits");
    };

    if digits.len() != 9 && digits.len() != 10 {
        return BirthNumberValidity::invalid("birth number must have 9 or 10 digits");
    }

    let Some((yy, mm, dd)) = date_fields(&digits) else {
        return BirthNumberValidity::invalid("birth number may contain only digits");
    };

    let year = if digits.len() == 9 {
        if yy >= 54 {
            return BirthNumberValidity::invalid(
                "9-digit birth numbers were issued only before 1954",
            );
        }
        1900 + yy as i32
    } else if yy >= 54 {
        1900 + yy as i32
    } else {
        2000 + yy as i32
    };

    let month = match mm {
        1..=12 => mm,
        51..=62 => mm - 50,
        21..=32 | 71..=82 if year >= 2004 => {
            if mm > 70 {
                mm - 70
            } else {
                mm - 20
            }
        }
        21..=32 | 71..=82 => {
            return BirthNumberValidity::invalid(
                "alternative month encoding is used only for births from 2004",
            )
        }
        _ => return BirthNumberValidity::invalid(format!("invalid month {mm:02}")),
    };

    let Some(birth_date) = NaiveDate::from_ymd_opt(year, month, dd) else {
        return BirthNumberValidity::invalid(format!("invalid day {dd:02} for month {month:02}"));
    };

    if digits.len() == 10 {
        let Ok(number) = digits.parse::<u64>() else {
            return BirthNumberValidity::invalid("birth number may contain only digits");
        };
        let divisible = number % 11 == 0;
        let historic_exception =
            (1954..=1985).contains(&year) && (number / 10) % 11 == 10 && number % 10 == 0;
        if !divisible && !historic_exception {
            return BirthNumberValidity::invalid("check digit does not match");
        }
    }

    BirthNumberValidity {
        valid: true,
        reason: "valid".to_string(),
        birth_date: Some(birth_date),
    }
}

/// Digits of the number with an optional delimiter and whitespace removed.
fn strip_delimiter(text: &str) -> Option<String> {
    let digits: String = text
        .chars()
        .filter(|c| *c != '/' && !c.is_whitespace())
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(digits)
}

fn date_fields(digits: &str) -> Option<(u32, u32, u32)> {
    let yy = digits.get(0..2)?.parse().ok()?;
    let mm = digits.get(2..4)?.parse().ok()?;
    let dd = digits.get(4..6)?.parse().ok()?;
    Some((yy, mm, dd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::Y2025;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_with_and_without_delimiter() {
        assert_eq!(parse("100715/1233"), Some(date(2010, 7, 15)));
        assert_eq!(parse("1007151233"), Some(date(2010, 7, 15)));
        assert_eq!(parse("100715"), Some(date(2010, 7, 15)));
    }

    #[test]
    fn parse_decodes_female_and_alternate_months() {
        assert_eq!(parse("1057123452"), Some(date(2010, 7, 12)));
        assert_eq!(parse("0522101239"), Some(date(2005, 2, 10)));
        assert_eq!(parse("057210"), Some(date(2005, 2, 10)));
    }

    #[test]
    fn parse_century_pivot() {
        assert_eq!(parse("240101"), Some(date(1924, 1, 1)));
        assert_eq!(parse("230101"), Some(date(2023, 1, 1)));
        assert_eq!(parse("850101"), Some(date(1985, 1, 1)));
        assert_eq!(parse_with_pivot("250101", 25), Some(date(2025, 1, 1)));
    }

    #[test]
    fn child_born_in_1924_gets_no_bonus() {
        let birth = parse("240101").unwrap();
        let rates = monthly_rates_for_year(birth, 2025, &Y2025);
        assert!(rates.iter().all(|r| r.is_zero()));
    }

    #[test]
    fn parse_rejects_out_of_range_components() {
        assert_eq!(parse("1065031231"), None);
        assert_eq!(parse("100732"), None);
        assert_eq!(parse("10071"), None);
        assert_eq!(parse("10071512345"), None);
        assert_eq!(parse("10a715"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn age_counts_birthday_month() {
        let birth = date(2010, 7, 15);
        assert_eq!(age_at(birth, 2025, 6), 14);
        assert_eq!(age_at(birth, 2025, 7), 15);
        assert_eq!(age_at(birth, 2025, 12), 15);
    }

    #[test]
    fn age_is_negative_before_birth() {
        let birth = date(2025, 8, 1);
        assert_eq!(age_at(birth, 2025, 7), -1);
        assert_eq!(age_at(birth, 2025, 8), 0);
    }

    #[test]
    fn monthly_rate_bands() {
        assert_eq!(monthly_bonus_rate(0, &Y2025), dec!(100));
        assert_eq!(monthly_bonus_rate(14, &Y2025), dec!(100));
        assert_eq!(monthly_bonus_rate(15, &Y2025), dec!(50));
        assert_eq!(monthly_bonus_rate(17, &Y2025), dec!(50));
        assert_eq!(monthly_bonus_rate(18, &Y2025), dec!(0));
        assert_eq!(monthly_bonus_rate(-1, &Y2025), dec!(0));
    }

    #[test]
    fn rates_for_child_turning_15_in_july() {
        let rates = monthly_rates_for_year(date(2010, 7, 15), 2025, &Y2025);
        assert_eq!(&rates[..6], &[dec!(100); 6]);
        assert_eq!(&rates[6..], &[dec!(50); 6]);
    }

    #[test]
    fn rates_for_child_turning_18_in_march() {
        let rates = monthly_rates_for_year(date(2007, 3, 15), 2025, &Y2025);
        assert_eq!(&rates[..2], &[dec!(50); 2]);
        assert_eq!(&rates[2..], &[dec!(0); 10]);
    }

    #[test]
    fn rates_for_child_born_during_the_year() {
        let rates = monthly_rates_for_year(date(2025, 8, 20), 2025, &Y2025);
        assert_eq!(&rates[..7], &[dec!(0); 7]);
        assert_eq!(&rates[7..], &[dec!(100); 5]);
    }

    #[test]
    fn validate_accepts_divisible_numbers() {
        let result = validate("100715/1233");
        assert!(result.valid, "{}", result.reason);
        assert_eq!(result.birth_date, Some(date(2010, 7, 15)));

        assert!(validate("1057123452").valid);
        assert!(validate("0703151240").valid);
    }

    #[test]
    fn validate_rejects_wrong_check_digit() {
        let result = validate("1007151234");
        assert!(!result.valid);
        assert_eq!(result.reason, "check digit does not match");
    }

    #[test]
    fn validate_historic_remainder_exception() {
        // remainder 10 with trailing zero, born 1980
        assert!(validate("8054121230").valid);
        // same remainder rule outside 1954-1985 is rejected
        assert!(!validate("0703151230").valid);
    }

    #[test]
    fn validate_nine_digit_numbers_before_1954() {
        let result = validate("500101/123");
        assert!(result.valid);
        assert_eq!(result.birth_date, Some(date(1950, 1, 1)));

        let result = validate("600101/123");
        assert!(!result.valid);
        assert_eq!(result.reason, "9-digit birth numbers were issued only before 1954");
    }

    #[test]
    fn validate_alternate_month_only_from_2004() {
        assert!(validate("0522101239").valid);

        let result = validate("9022101231");
        assert!(!result.valid);
        assert_eq!(
            result.reason,
            "alternative month encoding is used only for births from 2004"
        );
    }

    #[test]
    fn validator_is_stricter_than_parser() {
        // the lenient parser still derives a date for the 1990 alternate encoding
        assert_eq!(parse("9022101231"), Some(date(1990, 2, 10)));
        assert!(!validate("9022101231").valid);
    }

    #[test]
    fn validate_reports_format_problems() {
        assert_eq!(validate("").reason, "birth number is empty");
        assert_eq!(
            validate("10/07151233").reason,
            "delimiter '/' is allowed only after the sixth digit"
        );
        assert_eq!(validate("10071512x3").reason, "birth number may contain only digits");
        assert_eq!(validate("1007151").reason, "birth number must have 9 or 10 digits");
        assert_eq!(validate("1013151233").reason, "invalid month 13");
        assert_eq!(validate("1002301233").reason, "invalid day 30 for month 02");
    }
}
