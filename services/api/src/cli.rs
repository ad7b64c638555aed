use crate::commands::{check_lookups, to_gregorian, to_jalali};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_intake::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Intake",
    about = "Serve the loan intake forms and inspect their reference data",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Convert dates between the Jalali and Gregorian calendars
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },
    /// Inspect lookup table seed files
    Lookups {
        #[command(subcommand)]
        command: LookupsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CalendarCommand {
    /// Print the Gregorian date for a Jalali `YYYY/MM/DD` date
    ToGregorian { date: String },
    /// Print the Jalali date for a Gregorian `YYYY-MM-DD` date
    ToJalali { date: String },
}

#[derive(Subcommand, Debug)]
enum LookupsCommand {
    /// Validate a `kind,id,name` CSV and summarize its tables
    Check { path: PathBuf },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Calendar {
            command: CalendarCommand::ToGregorian { date },
        } => {
            println!("{}", to_gregorian(&date)?);
            Ok(())
        }
        Command::Calendar {
            command: CalendarCommand::ToJalali { date },
        } => {
            println!("{}", to_jalali(&date)?);
            Ok(())
        }
        Command::Lookups {
            command: LookupsCommand::Check { path },
        } => {
            print!("{}", check_lookups(&path)?);
            Ok(())
        }
    }
}
