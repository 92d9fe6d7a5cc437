// wardscrub/src/main.rs
//! Wardscrub entry point.
//!
//! Loads `.env`, initialises logging and dispatches to the chosen command.

use anyhow::Result;
use clap::Parser;

use wardscrub::cli::{Cli, Commands};
use wardscrub::logger;
use wardscrub::ui::output_format::error_msg;
use wardscrub::{run_batch, run_redact, run_scan};

#[tokio::main]
async fn main() {
    // A missing .env is normal.
    dotenvy::dotenv().ok();

    let args = Cli::parse();
    logger::init_logger(logger::level_from_flags(args.quiet, args.debug));

    if let Err(e) = run(&args).await {
        error_msg(format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(args: &Cli) -> Result<()> {
    match &args.command {
        Commands::Redact(cmd) => run_redact(cmd, args.quiet),
        Commands::Scan(cmd) => run_scan(cmd, args.quiet),
        Commands::Batch(cmd) => run_batch(cmd, args.quiet).await,
    }
}
