//! Dividends from abroad, taxed at a flat rate with a credit for tax
//! withheld in the source country.

use crate::core::constants::TaxConstants;
use crate::core::decimal::{amount, non_negative, round2, MAX_AMOUNT};
use crate::core::form::{Currency, DividendEntry, ForeignDividends};
use rust_decimal::Decimal;

/// Annual average rates in units of foreign currency per 1 EUR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeRates {
    pub usd_eur: Decimal,
    pub czk_eur: Decimal,
}

impl ExchangeRates {
    /// Rates entered by the user when flagged as overridden, defaults otherwise.
    pub fn from_form(dividends: &ForeignDividends, constants: &TaxConstants) -> Self {
        let pick = |overridden: bool, entered: Decimal, default: Decimal| {
            if overridden && entered > Decimal::ZERO && entered <= MAX_AMOUNT {
                entered
            } else {
                default
            }
        };
        ExchangeRates {
            usd_eur: pick(
                dividends.usd_rate_overridden,
                dividends.usd_eur_rate,
                constants.default_usd_eur,
            ),
            czk_eur: pick(
                dividends.czk_rate_overridden,
                dividends.czk_eur_rate,
                constants.default_czk_eur,
            ),
        }
    }

    pub fn defaults(constants: &TaxConstants) -> Self {
        ExchangeRates {
            usd_eur: constants.default_usd_eur,
            czk_eur: constants.default_czk_eur,
        }
    }

    pub fn rate(&self, currency: Currency) -> Decimal {
        match currency {
            Currency::Usd => self.usd_eur,
            Currency::Czk => self.czk_eur,
            Currency::Eur => Decimal::ONE,
        }
    }

    pub fn to_eur(&self, amount: Decimal, currency: Currency) -> Decimal {
        let rate = self.rate(currency);
        if rate.is_zero() {
            return Decimal::ZERO;
        }
        amount
            .checked_div(rate)
            .map(round2)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn from_eur(&self, amount_eur: Decimal, currency: Currency) -> Decimal {
        amount_eur
            .checked_mul(self.rate(currency))
            .map(round2)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Gross dividend in EUR, derived from the original currency when the EUR
/// value was not filled in.
pub fn gross_eur(entry: &DividendEntry, rates: &ExchangeRates) -> Decimal {
    if entry.gross_amount_eur.is_zero() {
        amount(rates.to_eur(amount(entry.gross_amount), entry.currency))
    } else {
        round2(amount(entry.gross_amount_eur))
    }
}

/// Withheld tax in EUR, derived like [`gross_eur`].
pub fn withheld_eur(entry: &DividendEntry, rates: &ExchangeRates) -> Decimal {
    if entry.withheld_tax_eur.is_zero() {
        amount(rates.to_eur(amount(entry.withheld_tax), entry.currency))
    } else {
        round2(amount(entry.withheld_tax_eur))
    }
}

/// Dividends of all entries from one source country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryDividends {
    pub country_code: String,
    pub gross_eur: Decimal,
    pub withheld_eur: Decimal,
}

/// Totals per country code, in order of first appearance.
pub fn aggregate_by_country(entries: &[DividendEntry], rates: &ExchangeRates) -> Vec<CountryDividends> {
    let mut countries: Vec<CountryDividends> = Vec::new();
    for entry in entries {
        let code = entry.country_code.trim();
        let gross = gross_eur(entry, rates);
        let withheld = withheld_eur(entry, rates);
        match countries.iter_mut().find(|c| c.country_code == code) {
            Some(country) => {
                country.gross_eur += gross;
                country.withheld_eur += withheld;
            }
            None => countries.push(CountryDividends {
                country_code: code.to_string(),
                gross_eur: gross,
                withheld_eur: withheld,
            }),
        }
    }
    countries
}

/// Rows of príloha 2
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DividendStage {
    /// Gross dividends in EUR
    pub pr1: Decimal,
    /// Tax before credit
    pub pr2: Decimal,
    /// Tax withheld abroad in EUR
    pub pr3: Decimal,
    /// Credit for foreign tax
    pub pr4: Decimal,
    /// Tax due on dividends
    pub pr5: Decimal,
    pub countries: Vec<CountryDividends>,
}

pub fn calculate(dividends: &ForeignDividends, constants: &TaxConstants) -> DividendStage {
    if !dividends.enabled {
        return DividendStage::default();
    }

    let rates = ExchangeRates::from_form(dividends, constants);
    let countries = aggregate_by_country(&dividends.entries, &rates);

    let pr1 = non_negative(countries.iter().map(|c| c.gross_eur).sum());
    let pr2 = round2(pr1 * constants.dividend_rate);
    let pr3 = non_negative(countries.iter().map(|c| c.withheld_eur).sum());

    // each country's credit is capped at its proportional share of the tax
    let credit: Decimal = if pr1.is_zero() {
        Decimal::ZERO
    } else {
        countries
            .iter()
            .map(|c| {
                let share = pr2 * non_negative(c.gross_eur) / pr1;
                share.min(non_negative(c.withheld_eur))
            })
            .sum()
    };
    let pr4 = round2(credit).min(pr2);
    let pr5 = non_negative(pr2 - pr4);

    log::debug!(
        "dividends: gross={} tax={} withheld={} credit={} net={}",
        pr1,
        pr2,
        pr3,
        pr4,
        pr5
    );

    DividendStage {
        pr1,
        pr2,
        pr3,
        pr4,
        pr5,
        countries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::Y2025;
    use rust_decimal_macros::dec;

    fn eur_entry(country: &str, gross: Decimal, withheld: Decimal) -> DividendEntry {
        DividendEntry {
            ticker: "TEST".to_string(),
            country_code: country.to_string(),
            currency: Currency::Eur,
            gross_amount: gross,
            withheld_tax: withheld,
            gross_amount_eur: gross,
            withheld_tax_eur: withheld,
        }
    }

    fn enabled(entries: Vec<DividendEntry>) -> ForeignDividends {
        ForeignDividends {
            enabled: true,
            entries,
            ..ForeignDividends::default()
        }
    }

    #[test]
    fn credit_capped_at_domestic_tax() {
        let stage = calculate(&enabled(vec![eur_entry("840", dec!(1000), dec!(150))]), &Y2025);
        assert_eq!(stage.pr1, dec!(1000));
        assert_eq!(stage.pr2, dec!(70.00));
        assert_eq!(stage.pr3, dec!(150));
        assert_eq!(stage.pr4, dec!(70.00));
        assert_eq!(stage.pr5, dec!(0.00));
    }

    #[test]
    fn credit_limited_to_tax_withheld() {
        let stage = calculate(&enabled(vec![eur_entry("840", dec!(1000), dec!(30))]), &Y2025);
        assert_eq!(stage.pr4, dec!(30));
        assert_eq!(stage.pr5, dec!(40.00));
    }

    #[test]
    fn credit_is_capped_per_country() {
        // US over-withholds, Germany withholds nothing; the US excess does
        // not offset the German share
        let stage = calculate(
            &enabled(vec![
                eur_entry("840", dec!(1000), dec!(150)),
                eur_entry("276", dec!(1000), dec!(0)),
            ]),
            &Y2025,
        );
        assert_eq!(stage.pr2, dec!(140.00));
        assert_eq!(stage.pr4, dec!(70.00));
        assert_eq!(stage.pr5, dec!(70.00));
    }

    #[test]
    fn eur_values_derived_from_original_currency() {
        let entry = DividendEntry {
            ticker: "AAPL".to_string(),
            country_code: "840".to_string(),
            currency: Currency::Usd,
            gross_amount: dec!(113),
            withheld_tax: dec!(16.95),
            gross_amount_eur: Decimal::ZERO,
            withheld_tax_eur: Decimal::ZERO,
        };
        let rates = ExchangeRates::defaults(&Y2025);
        assert_eq!(gross_eur(&entry, &rates), dec!(100.00));
        assert_eq!(withheld_eur(&entry, &rates), dec!(15.00));
    }

    #[test]
    fn overridden_rates_apply_only_when_flagged() {
        let mut dividends = ForeignDividends {
            usd_eur_rate: dec!(1.25),
            ..ForeignDividends::default()
        };
        assert_eq!(ExchangeRates::from_form(&dividends, &Y2025).usd_eur, dec!(1.1300));

        dividends.usd_rate_overridden = true;
        assert_eq!(ExchangeRates::from_form(&dividends, &Y2025).usd_eur, dec!(1.25));

        dividends.usd_eur_rate = Decimal::ZERO;
        assert_eq!(ExchangeRates::from_form(&dividends, &Y2025).usd_eur, dec!(1.1300));
    }

    #[test]
    fn aggregates_entries_per_country() {
        let countries = aggregate_by_country(
            &[
                eur_entry("840", dec!(100), dec!(15)),
                eur_entry("276", dec!(50), dec!(13.19)),
                eur_entry("840", dec!(200), dec!(30)),
            ],
            &ExchangeRates::defaults(&Y2025),
        );
        assert_eq!(
            countries,
            vec![
                CountryDividends {
                    country_code: "840".to_string(),
                    gross_eur: dec!(300),
                    withheld_eur: dec!(45),
                },
                CountryDividends {
                    country_code: "276".to_string(),
                    gross_eur: dec!(50),
                    withheld_eur: dec!(13.19),
                },
            ]
        );
    }

    #[test]
    fn disabled_section_is_zero() {
        let mut dividends = enabled(vec![eur_entry("840", dec!(1000), dec!(30))]);
        dividends.enabled = false;
        assert_eq!(calculate(&dividends, &Y2025), DividendStage::default());
    }
}
