pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "rfqdesk",
    about = "rfqdesk operator CLI",
    long_about = "Inspect rfqdesk configuration and run the text extractor against local files.",
    after_help = "Examples:\n  rfqdesk config\n  rfqdesk extract bom.xlsx\n  rfqdesk extract spec.pdf --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Extract text from a local spreadsheet, PDF, Word or text file")]
    Extract {
        #[arg(help = "File to extract")]
        path: PathBuf,
        #[arg(long, help = "Emit the extracted document as JSON")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::config::run(),
        Command::Extract { path, json } => commands::extract::run(&path, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
