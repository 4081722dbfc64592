mod commands;
mod helpers;
mod logging;

use clap::{ArgAction, Parser};
use wavefront_core::domain::WavefrontError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let diagnostic = error.as_wavefront_error();
            eprintln!("{}", diagnostic.diagnostic_line());
            if let Some(summary_line) = diagnostic.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            diagnostic.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("wavefront".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            logging::init_logging(cli.verbose, cli.quiet);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "wavefront",
    version,
    about = "Undulator radiation wavefront runs through a CRL beamline"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all log output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Print or save the built-in reference run configuration
    ReferenceConfig(commands::ReferenceConfigArgs),
    /// Write the beamline's transmission tables without running the source stages
    Transmission(commands::TransmissionArgs),
    /// Run the full pipeline for this process
    Run(commands::RunArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::ReferenceConfig(args) => commands::run_reference_config_command(args),
        CliCommand::Transmission(args) => commands::run_transmission_command(args),
        CliCommand::Run(args) => commands::run_pipeline_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(WavefrontError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_wavefront_error(&self) -> WavefrontError {
        match self {
            Self::Usage(message) => {
                WavefrontError::input_validation("INPUT.CLI_USAGE", message.clone())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => WavefrontError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CliError, run};

    #[test]
    fn unknown_subcommand_is_a_usage_error() {
        let error = run(["calibrate"]).expect_err("unknown subcommand");
        assert!(matches!(error, CliError::Usage(_)));
        let diagnostic = error.as_wavefront_error();
        assert_eq!(diagnostic.placeholder(), "INPUT.CLI_USAGE");
        assert_eq!(diagnostic.exit_code(), 2);
    }

    #[test]
    fn help_exits_successfully() {
        assert_eq!(run(["--help"]).expect("help is not an error"), 0);
    }

    #[test]
    fn internal_errors_render_their_context_chain() {
        let error = CliError::from(anyhow::anyhow!("disk full").context("writing config"));
        let diagnostic = error.as_wavefront_error();
        assert_eq!(diagnostic.placeholder(), "IO.CLI");
        assert_eq!(diagnostic.message(), "writing config: disk full");
    }
}
