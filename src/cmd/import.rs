//! Import command - turn a previously filed XML return back into a JSON form

use crate::cmd::{read_text, write_output};
use crate::xml;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ImportCommand {
    /// XML return (or "-" for stdin)
    #[arg(short, long)]
    file: PathBuf,

    /// Write the JSON form here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ImportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let text = read_text(&self.file)?;
        let form = xml::from_document(&text);
        let json = serde_json::to_string_pretty(&form)?;
        write_output(self.output.as_deref(), &json)
    }
}
