use crate::core::worker::WorkerConfig;
use crate::logging::LogFormat;
use crate::strategy::Pipeline;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Move card payments through settlement, reconciliation and payout
#[derive(Parser, Debug)]
#[command(name = "payfac-ledger")]
#[command(about = "Move card payments through settlement, reconciliation and payout", long_about = None)]
pub struct CliArgs {
    /// Authorizations CSV: transaction_id,merchant_id,processor_ref_id,amount[,card_number]
    #[arg(long = "authorizations", value_name = "CSV")]
    pub authorizations: PathBuf,

    /// Settlement lines CSV: file_id,date,processor_ref_id,merchant_id,amount
    #[arg(long = "settlements", value_name = "CSV")]
    pub settlements: Option<PathBuf>,

    /// Bank deposits CSV: date,amount
    #[arg(long = "deposits", value_name = "CSV")]
    pub deposits: Option<PathBuf>,

    /// Number of payout batches to run after deposits (0 disables payouts)
    #[arg(long = "payout-rounds", value_name = "N", default_value_t = 1)]
    pub payout_rounds: usize,

    /// Merchant whose payouts are always declined (repeatable)
    #[arg(long = "decline", value_name = "MERCHANT")]
    pub decline: Vec<String>,

    /// Merchant whose first payout attempt is declined (repeatable)
    #[arg(long = "decline-once", value_name = "MERCHANT")]
    pub decline_once: Vec<String>,

    /// Write the entry log as CSV to this path
    #[arg(long = "journal", value_name = "PATH")]
    pub journal: Option<PathBuf>,

    /// Processing strategy to drive the ledger with
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Processing strategy: 'sync' owns the ledger directly, 'async' runs it on a worker"
    )]
    pub strategy: StrategyType,

    /// Worker queue capacity (async mode only)
    #[arg(
        long = "queue-capacity",
        value_name = "COUNT",
        help = "Commands that can wait for the ledger worker (default: 64)"
    )]
    pub queue_capacity: Option<usize>,

    /// Log line format
    #[arg(long = "log-format", value_name = "FORMAT", default_value = "text")]
    pub log_format: LogFormat,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a WorkerConfig from CLI arguments
    ///
    /// Invalid values fall back to defaults with a warning.
    pub fn to_worker_config(&self) -> WorkerConfig {
        match self.queue_capacity {
            Some(capacity) => WorkerConfig::new(capacity),
            None => WorkerConfig::default(),
        }
    }

    /// Describe the pipeline run requested on the command line
    pub fn to_pipeline(&self) -> Pipeline {
        Pipeline {
            authorizations: self.authorizations.clone(),
            settlements: self.settlements.clone(),
            deposits: self.deposits.clone(),
            payout_rounds: self.payout_rounds,
            declines: self.decline.clone(),
            declines_once: self.decline_once.clone(),
            journal: self.journal.clone(),
        }
    }
}
