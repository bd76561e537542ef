// Desktop/tooling crate: unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::use_debug)]
#![allow(missing_docs)]

mod check;
mod session;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "7segs driver development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clippy, formatting and no_std builds of the driver crates
    Check,
    /// Run all tests (unit, integration and doc)
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Load the driver against the mock kernel and write each payload to /dev/7segs
    Session {
        /// Payloads written in order, e.g. `5` `42` `abc`
        #[arg(required = true)]
        payloads: Vec<String>,
        /// First segment GPIO
        #[arg(long, default_value_t = 7)]
        first_gpio: u32,
        /// Digit shown before the first write (blank if omitted)
        #[arg(long)]
        boot_digit: Option<u8>,
        /// Show per-pin readback logs
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => check::run(),
        Commands::Test { unit, integration } => test::run(unit, integration),
        Commands::Session {
            payloads,
            first_gpio,
            boot_digit,
            verbose,
        } => session::run(&payloads, first_gpio, boot_digit, verbose),
    }
}
