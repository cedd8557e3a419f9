//! Schema command - print the expected form format

use crate::core::form::{field_sections, TaxFormData};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema or fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the form
    JsonSchema,
    /// Field descriptions per form section
    Fields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::Fields => self.print_fields(),
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(TaxFormData);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_fields(&self) -> anyhow::Result<()> {
        println!("Form Input Format");
        println!("=================");
        for (section, fields) in field_sections() {
            println!();
            println!("{}", section);
            for field in fields {
                let req = if field.optional { "optional" } else { "required" };
                println!(
                    "  {:22} {:10} ({:8})  {}",
                    field.name, field.kind, req, field.description
                );
            }
        }
        println!();
        println!("Amounts are decimal strings in EUR unless a currency is given; \"12,50\" is accepted.");
        Ok(())
    }
}
