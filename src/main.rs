use clap::{Parser, Subcommand};
use generic_attest::cli::{self, commands::AttestArgs};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = cli::CLI_NAME, version = cli::CLI_VERSION, author, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a signed SLSA provenance attestation for a list of artifacts
    Attest(AttestArgs),
}

fn main() -> ExitCode {
    // Initialize logging
    if let Err(e) = generic_attest::init_logging() {
        eprintln!("{}", cli::format_error(&e));
        return ExitCode::from(e.kind().exit_code());
    }

    // Parse command line arguments
    let cli = Cli::parse();

    // Handle commands
    let result = match cli.command {
        Commands::Attest(args) => cli::handlers::handle_attest_command(args),
    };

    // Format and display any errors
    match result {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", cli::format_error(&e));
            ExitCode::from(e.kind().exit_code())
        }
    }
}
