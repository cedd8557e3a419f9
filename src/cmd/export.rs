//! Export command - write the filled XML return for filing

use crate::cmd::{read_form, write_output};
use crate::core::warnings::check_form;
use crate::tax;
use crate::xml;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ExportCommand {
    /// JSON file containing the form (or "-" for stdin)
    #[arg(short, long)]
    file: PathBuf,

    /// Write the XML here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ExportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let form = read_form(&self.file)?;
        form.require_identity()?;

        for warning in check_form(&form) {
            log::warn!("{}", warning.message());
        }

        let result = tax::calculate(&form);
        let document = xml::to_xml(&form, &result)?;
        write_output(self.output.as_deref(), &document)
    }
}
