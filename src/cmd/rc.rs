//! Rc command - check a birth number and show the bonus rates it implies

use crate::core::birth_number;
use crate::core::constants::{TaxYear, CURRENT_TAX_YEAR};
use crate::core::decimal;
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct RcCommand {
    /// Birth number, with or without the '/' delimiter
    number: String,

    /// Tax year for the monthly bonus rates
    #[arg(long)]
    year: Option<i32>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RcOutput {
    number: String,
    #[serde(flatten)]
    validity: birth_number::BirthNumberValidity,
    lenient_birth_date: Option<chrono::NaiveDate>,
    monthly_bonus: Option<Vec<String>>,
}

impl RcCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let year = self.year.map(TaxYear).unwrap_or(CURRENT_TAX_YEAR);
        let constants = year.constants();

        let validity = birth_number::validate(&self.number);
        let lenient =
            birth_number::parse_with_pivot(&self.number, constants.birth_number_century_pivot);
        let monthly_bonus = lenient.map(|birth| {
            birth_number::monthly_rates_for_year(birth, year.0, constants)
                .iter()
                .map(|rate| decimal::format(*rate))
                .collect::<Vec<_>>()
        });

        if self.json {
            let output = RcOutput {
                number: self.number.clone(),
                validity,
                lenient_birth_date: lenient,
                monthly_bonus,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        if validity.valid {
            println!("valid");
        } else {
            println!("invalid: {}", validity.reason);
        }
        if let Some(date) = validity.birth_date {
            println!("birth date:         {}", date);
        }
        match lenient {
            Some(date) => println!("lenient birth date: {}", date),
            None => println!("lenient birth date: none"),
        }
        if let Some(rates) = monthly_bonus {
            println!("bonus {} (Jan-Dec): {}", year.0, rates.join(" "));
        }
        Ok(())
    }
}
