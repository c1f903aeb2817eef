//! Payment Facilitator Ledger CLI
//!
//! Runs card authorizations, processor settlement files and bank deposits
//! through the ledger, then executes payout batches.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --authorizations auth.csv > balances.csv
//! cargo run -- --authorizations auth.csv --settlements settlements.csv \
//!     --deposits deposits.csv --payout-rounds 2 --journal journal.csv > balances.csv
//! cargo run -- --strategy async --queue-capacity 128 --authorizations auth.csv > balances.csv
//! ```
//!
//! Balances are written to stdout; logs go to stderr (`RUST_LOG` controls
//! the level).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use payfac_ledger::cli;
use payfac_ledger::logging;
use payfac_ledger::strategy;
use std::process;

fn main() {
    let args = cli::parse_args();
    logging::init(args.log_format);

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_worker_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.to_pipeline(), &mut output) {
        tracing::error!(error = %e, "ledger run failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
