use clap::{Parser, Subcommand};
use dpfo::cmd::{
    calculate::CalculateCommand, export::ExportCommand, import::ImportCommand, rc::RcCommand,
    schema::SchemaCommand,
};

#[derive(Parser, Debug)]
#[command(name = "dpfo", version, about = "Slovak personal income tax return (DPFO typ B)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate every row of the return from a JSON form
    Calculate(CalculateCommand),
    /// Write the filled XML return for filing
    Export(ExportCommand),
    /// Read a filed XML return back into a JSON form
    Import(ImportCommand),
    /// Validate a birth number (rodné číslo)
    Rc(RcCommand),
    /// Print the expected form format
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Calculate(cmd) => cmd.exec(),
        Command::Export(cmd) => cmd.exec(),
        Command::Import(cmd) => cmd.exec(),
        Command::Rc(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
