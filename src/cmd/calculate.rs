//! Calculate command - compute every row of the return from a JSON form

use crate::cmd::read_form;
use crate::core::decimal;
use crate::core::result::{ChildBonusBreakdown, ResultRow, TaxCalculationResult};
use crate::core::warnings::{check_form, Warning};
use crate::tax;
use clap::Args;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct CalculateCommand {
    /// JSON file containing the form (or "-" for stdin)
    #[arg(short, long)]
    file: PathBuf,

    /// Output as JSON instead of formatted table
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output rows as CSV
    #[arg(long)]
    csv: bool,
}

/// Row for the result table
#[derive(Debug, Clone, Tabled, Serialize)]
struct RowOutput {
    #[tabled(rename = "Row")]
    row: &'static str,
    #[tabled(rename = "Description")]
    description: &'static str,
    #[tabled(rename = "Amount (EUR)")]
    amount: String,
}

impl From<ResultRow> for RowOutput {
    fn from(row: ResultRow) -> Self {
        RowOutput {
            row: row.row,
            description: row.label,
            amount: decimal::format(row.value),
        }
    }
}

#[derive(Debug, Clone, Tabled)]
struct ChildOutput {
    #[tabled(rename = "Child")]
    name: String,
    #[tabled(rename = "Monthly bonus")]
    monthly: String,
    #[tabled(rename = "Total")]
    total: String,
}

impl From<&ChildBonusBreakdown> for ChildOutput {
    fn from(child: &ChildBonusBreakdown) -> Self {
        let monthly: Vec<String> = child.monthly.iter().map(|m| decimal::format(*m)).collect();
        ChildOutput {
            name: child.name.clone(),
            monthly: monthly.join(" "),
            total: decimal::format(child.total),
        }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    result: &'a TaxCalculationResult,
    warnings: &'a [Warning],
}

impl CalculateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let form = read_form(&self.file)?;

        let warnings = check_form(&form);
        for warning in &warnings {
            log::warn!("{}", warning.message());
        }

        let result = tax::calculate(&form);

        if self.json {
            let output = JsonOutput {
                result: &result,
                warnings: &warnings,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        } else if self.csv {
            self.write_csv(&result)
        } else {
            self.print_table(&result);
            Ok(())
        }
    }

    fn print_table(&self, result: &TaxCalculationResult) {
        let rows: Vec<RowOutput> = result.rows().into_iter().map(RowOutput::from).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);

        if !result.children.is_empty() {
            let children: Vec<ChildOutput> =
                result.children.iter().map(ChildOutput::from).collect();
            println!();
            println!("{}", Table::new(children).with(Style::rounded()));
        }

        println!();
        if result.is_refund {
            println!("Refund:  {} EUR", decimal::format(result.final_amount));
        } else {
            println!("Payable: {} EUR", decimal::format(result.final_amount));
        }
    }

    fn write_csv(&self, result: &TaxCalculationResult) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for row in result.rows() {
            wtr.serialize(RowOutput::from(row))?;
        }
        wtr.flush()?;
        Ok(())
    }
}
