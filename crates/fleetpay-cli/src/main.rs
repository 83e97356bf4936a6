mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{
    company::CompanySubcommand, element::ElementSubcommand, period::PeriodSubcommand,
    settlement::SettlementSubcommand,
};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "fleetpay",
    about = "Payroll period engine — materialize periods, assign elements, run payouts, close the books",
    version,
    propagate_version = true
)]
struct Cli {
    /// Database file (default: fleetpay.db in the working directory)
    #[arg(long, global = true, env = "FLEETPAY_DB", default_value = "fleetpay.db")]
    db: PathBuf,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage companies and their pay-cycle configuration
    Company {
        #[command(subcommand)]
        subcommand: CompanySubcommand,
    },

    /// Materialize, browse, close, and lock pay periods
    Period {
        #[command(subcommand)]
        subcommand: PeriodSubcommand,
    },

    /// Create, list, and reassign financial elements
    Element {
        #[command(subcommand)]
        subcommand: ElementSubcommand,
    },

    /// Record calculation results per (period, driver)
    Settlement {
        #[command(subcommand)]
        subcommand: SettlementSubcommand,
    },

    /// Mark settlements paid in a batch; satisfied periods auto-close
    Pay {
        /// Settlement ids (repeatable: --id A --id B)
        #[arg(long = "id", required = true)]
        ids: Vec<Uuid>,

        /// Payment method (ach, check, wire, ...)
        #[arg(long)]
        method: String,

        /// External payment reference
        #[arg(long)]
        reference: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Company { subcommand } => cmd::company::run(&cli.db, subcommand, cli.json),
        Commands::Period { subcommand } => cmd::period::run(&cli.db, subcommand, cli.json),
        Commands::Element { subcommand } => cmd::element::run(&cli.db, subcommand, cli.json),
        Commands::Settlement { subcommand } => cmd::settlement::run(&cli.db, subcommand, cli.json),
        Commands::Pay {
            ids,
            method,
            reference,
            notes,
        } => cmd::pay::run(&cli.db, ids, method, reference, notes, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
