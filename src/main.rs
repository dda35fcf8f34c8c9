use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dbver::artifacts::core::PagerWriter;
use dbver::{CheckoutOptions, FailurePolicy, Repository};
use is_terminal::IsTerminal;
use minus::Pager;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default upper bound on a single changescript's run time
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Exit status when at least one changescript failed
const EXIT_SCRIPT_FAILED: u8 = 1;
/// Exit status when the command itself could not complete
const EXIT_FATAL: u8 = 2;

#[derive(Parser)]
#[command(
    name = "dbver",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Changescript versioning for SQLite databases",
    long_about = "Keeps a SQLite database in step with a directory of numbered changescripts. \
    Every changescript that the database's ledger has not recorded yet is executed in order, \
    and each outcome is written to the ledger and reported.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "DBVER_DATABASE",
        default_value = "database.sqlite",
        help = "The database to version"
    )]
    database: PathBuf,
    #[arg(
        long,
        global = true,
        env = "DBVER_SCRIPTS",
        default_value = "changescripts",
        help = "The directory holding the changescripts"
    )]
    scripts: PathBuf,
    #[arg(
        long,
        global = true,
        env = "DBVER_LOG",
        default_value = "warn",
        help = "Log filter (trace, debug, info, warn, error)"
    )]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Create the versioning ledger",
        long_about = "This command creates the ledger tables in the database (creating the database \
        if needed) and the changescript directory. Running it again leaves existing state untouched."
    )]
    Init,
    #[command(
        name = "checkout",
        about = "Apply every pending changescript",
        long_about = "This command executes, in ascending order, every changescript the ledger has \
        not recorded yet. It exits with status 1 when any changescript failed."
    )]
    Checkout {
        #[arg(long, help = "Stop at the first failing changescript")]
        abort_on_failure: bool,
        #[arg(
            long,
            default_value_t = DEFAULT_TIMEOUT_SECS,
            help = "Seconds a single changescript may run (0 disables the limit)"
        )]
        timeout: u64,
    },
    #[command(
        name = "status",
        about = "Show the current version and pending changescripts"
    )]
    Status,
    #[command(
        name = "version",
        about = "Print the current database version",
        long_about = "This command prints the current version pointer, suitable for health checks. \
        With --all it also prints the fallback and last exception pointers."
    )]
    Version {
        #[arg(long, help = "Print every version pointer")]
        all: bool,
    },
    #[command(name = "history", about = "List applied changescripts, oldest first")]
    History,
    #[command(name = "show", about = "Print the text of a changescript")]
    Show {
        #[arg(index = 1, help = "The changescript identifier")]
        id: String,
    },
    #[command(
        name = "append",
        about = "Add a changescript after all others and check out",
        long_about = "This command stores the given statements as a new changescript named after the \
        current UTC time (always sorting last) and runs a checkout."
    )]
    Append {
        #[arg(index = 1, help = "File holding the statements, or - for stdin")]
        file: String,
        #[arg(long, help = "Stop at the first failing changescript")]
        abort_on_failure: bool,
        #[arg(
            long,
            default_value_t = DEFAULT_TIMEOUT_SECS,
            help = "Seconds a single changescript may run (0 disables the limit)"
        )]
        timeout: u64,
    },
}

fn checkout_options(abort_on_failure: bool, timeout: u64) -> CheckoutOptions {
    CheckoutOptions {
        failure_policy: if abort_on_failure {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Continue
        },
        script_timeout: (timeout > 0).then(|| Duration::from_secs(timeout)),
        lock_file: None,
    }
}

fn report_status(clean: bool) -> ExitCode {
    if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_SCRIPT_FAILED)
    }
}

fn read_statement(file: &str) -> Result<String> {
    if file == "-" {
        std::io::read_to_string(std::io::stdin()).context("Failed to read changescript from stdin")
    } else {
        std::fs::read_to_string(Path::new(file))
            .with_context(|| format!("Failed to read changescript from {}", file))
    }
}

fn use_pager() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_PAGER").is_none()
}

fn run(cli: Cli) -> Result<ExitCode> {
    let open = |writer: Box<dyn std::io::Write>| Repository::open(&cli.database, &cli.scripts, writer);

    match cli.command {
        Commands::Init => {
            let repository =
                Repository::create(&cli.database, &cli.scripts, Box::new(std::io::stdout()))?;
            repository.init()?;
        }
        Commands::Checkout {
            abort_on_failure,
            timeout,
        } => {
            let repository = open(Box::new(std::io::stdout()))?;
            let report = repository.checkout(checkout_options(abort_on_failure, timeout))?;

            return Ok(report_status(report.is_clean()));
        }
        Commands::Status => open(Box::new(std::io::stdout()))?.status()?,
        Commands::Version { all } => open(Box::new(std::io::stdout()))?.version(all)?,
        Commands::History => {
            if use_pager() {
                let pager = Pager::new();
                open(Box::new(PagerWriter::new(pager.clone())))?.history()?;
                minus::page_all(pager)?;
            } else {
                open(Box::new(std::io::stdout()))?.history()?;
            }
        }
        Commands::Show { id } => open(Box::new(std::io::stdout()))?.show(&id)?,
        Commands::Append {
            file,
            abort_on_failure,
            timeout,
        } => {
            let statement = read_statement(&file)?;
            let repository = open(Box::new(std::io::stdout()))?;
            let report = repository.append(&statement, checkout_options(abort_on_failure, timeout))?;

            return Ok(report_status(report.is_clean()));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout carries reports, logs go to stderr
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli) {
        Ok(status) => status,
        Err(err) => {
            eprintln!("fatal: {:#}", err);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
