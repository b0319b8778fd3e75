use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use authzgen_cli::cli::Cli;
use authzgen_cli::config::AppConfig;
use authzgen_cli::error::CliError;
use authzgen_cli::logging::init_logging;
use authzgen_cli::run::{Destination, run};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return report(CliError::from(err)),
    };
    init_logging(&config);

    match run(&cli, &config) {
        Ok(outcome) => {
            match outcome.destination {
                Destination::File(path) => {
                    println!("Code generation completed successfully!");
                    println!("Output written to: {}", path.display());
                }
                Destination::Stdout => {
                    eprintln!("Code generation completed successfully!");
                }
                Destination::Skipped => {
                    eprintln!(
                        "Schema check passed: {} definition(s) in package '{}'",
                        outcome.artifact.definition_count, outcome.artifact.package
                    );
                }
            }
            ExitCode::SUCCESS
        }
        Err(CliError::MissingSchema) => {
            eprintln!("Error: {}", CliError::MissingSchema);
            eprintln!();
            eprintln!("{}", Cli::command().render_usage());
            ExitCode::from(CliError::MissingSchema.exit_code())
        }
        Err(err) => {
            tracing::error!(error = %err, "code generation failed");
            report(err)
        }
    }
}

fn report(err: CliError) -> ExitCode {
    eprintln!("Error: {err}");
    ExitCode::from(err.exit_code())
}
