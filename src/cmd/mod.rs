pub mod calculate;
pub mod export;
pub mod import;
pub mod rc;
pub mod schema;

use crate::core::form::TaxFormData;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read a JSON form from a file (or stdin with "-") and merge it with defaults
pub fn read_form(path: &Path) -> anyhow::Result<TaxFormData> {
    if path.as_os_str() == "-" {
        let text = read_stdin()?;
        TaxFormData::read_json(text.as_bytes())
    } else {
        let file = File::open(path)?;
        TaxFormData::read_json(BufReader::new(file))
    }
}

/// Read a whole file (or stdin with "-") as text
pub fn read_text(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        read_stdin()
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn read_stdin() -> anyhow::Result<String> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = String::new();
    reader.read_to_string(&mut buffer)?;

    if buffer.trim().is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }
    Ok(buffer)
}

/// Write to the given file, or stdout when none is given
pub fn write_output(path: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, contents)?;
            log::info!("wrote {}", path.display());
        }
        None => println!("{}", contents),
    }
    Ok(())
}
