//! Decimal helpers shared by the engine and the XML translators.
//!
//! Every function here is total: user input is free text, so anything that
//! does not parse is an exact zero rather than an error.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::str::FromStr;

/// Largest magnitude accepted as an amount on a personal return.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// `value`, or zero when its magnitude exceeds [`MAX_AMOUNT`].
///
/// Applied to every amount entering the engine so that sums and products of
/// form values stay far inside the range of `Decimal`.
pub fn amount(value: Decimal) -> Decimal {
    if value.abs() > MAX_AMOUNT {
        Decimal::ZERO
    } else {
        value
    }
}

/// Parse free text into a decimal, yielding zero for empty or unparsable input.
///
/// Accepts a decimal comma (`12,50`) and spaces as thousands separators. When
/// both `,` and `.` appear the commas are treated as thousands separators.
pub fn to_decimal(text: &str) -> Decimal {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    if compact.is_empty() {
        return Decimal::ZERO;
    }

    let normalized = if compact.contains('.') {
        compact.replace(',', "")
    } else {
        compact.replace(',', ".")
    };

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map(amount)
        .unwrap_or(Decimal::ZERO)
}

/// Round half-up (away from zero on the midpoint) to two decimal places.
pub fn round2(value: Decimal) -> Decimal {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        // avoid "-0.00"
        Decimal::ZERO
    } else {
        rounded
    }
}

/// Format with exactly two fractional digits.
pub fn format(value: Decimal) -> String {
    format!("{:.2}", round2(value))
}

/// `max(value, 0)`
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Sum a decimal accessor over a collection, skipping implausible amounts.
pub fn sum<I, T, F>(items: I, accessor: F) -> Decimal
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Decimal,
{
    items.into_iter().map(|item| amount(accessor(item))).sum()
}

/// Sum a text accessor over a collection, counting unparsable entries as zero.
pub fn sum_text<'a, I, T, F>(items: I, accessor: F) -> Decimal
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> &'a str,
{
    items.into_iter().map(|item| to_decimal(accessor(item))).sum()
}

/// Lenient serde adapter for input amounts: strings or numbers, parse-or-zero.
pub mod lenient {
    use super::{amount, to_decimal};
    use rust_decimal::Decimal;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.normalize().to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        deserializer.deserialize_any(LenientDecimal)
    }

    struct LenientDecimal;

    impl<'de> Visitor<'de> for LenientDecimal {
        type Value = Decimal;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a decimal number or a string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
            Ok(to_decimal(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
            Ok(amount(Decimal::from(v)))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
            Ok(amount(Decimal::from(v)))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
            // go through the shortest float representation so 0.1 stays 0.1
            Ok(to_decimal(&v.to_string()))
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> Result<Decimal, E> {
            Ok(Decimal::ZERO)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Decimal, E> {
            Ok(Decimal::ZERO)
        }

        fn visit_none<E: de::Error>(self) -> Result<Decimal, E> {
            Ok(Decimal::ZERO)
        }
    }
}

/// Serde adapter for result rows: always a string with two fractional digits.
pub mod fixed2 {
    use rust_decimal::Decimal;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        super::lenient::deserialize(deserializer)
    }
}
