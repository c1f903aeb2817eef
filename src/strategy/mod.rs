//! Processing strategy module for ledger pipelines
//!
//! A pipeline run reads authorizations, settlement files and bank deposits
//! from CSV, feeds them through the ledger in that order, executes the
//! configured number of payout batches, and writes the resulting balances.
//! Strategies differ only in how they drive the ledger: the sync strategy
//! owns a `Ledger` directly, the async strategy talks to a `LedgerWorker`.

use crate::cli::StrategyType;
use crate::core::worker::WorkerConfig;
use crate::core::SimulatedIssuer;
use crate::io::csv_format::{write_balances_csv, write_entries_csv};
use crate::types::{Balance, LedgerEntry, LedgerError, MerchantId, PayoutResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub mod r#async;
pub mod sync;

pub use self::r#async::AsyncProcessingStrategy;
pub use sync::SyncProcessingStrategy;

/// Inputs and outputs of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    /// Authorizations CSV (required)
    pub authorizations: PathBuf,

    /// Settlement lines CSV
    pub settlements: Option<PathBuf>,

    /// Bank deposits CSV
    pub deposits: Option<PathBuf>,

    /// Number of payout batches to execute after deposits
    pub payout_rounds: usize,

    /// Merchants whose payouts the simulated issuer always declines
    pub declines: Vec<MerchantId>,

    /// Merchants whose first payout attempt the simulated issuer declines
    pub declines_once: Vec<MerchantId>,

    /// Where to write the entry log, if anywhere
    pub journal: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(authorizations: impl Into<PathBuf>) -> Self {
        Pipeline {
            authorizations: authorizations.into(),
            payout_rounds: 1,
            ..Pipeline::default()
        }
    }

    /// Build the payout issuer configured for this run
    pub fn issuer(&self) -> SimulatedIssuer {
        let issuer = self
            .declines
            .iter()
            .fold(SimulatedIssuer::new(), |issuer, m| issuer.decline(m.as_str()));
        self.declines_once
            .iter()
            .fold(issuer, |issuer, m| issuer.decline_once(m.as_str()))
    }
}

/// Processing strategy trait for complete ledger pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Run the pipeline and write the balance report to output
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal problems: a missing or unreadable
    /// input file, or a failure writing the report or the journal.
    /// Rejected authorizations, settlement files and deposits are logged
    /// and the run continues.
    fn process(&self, pipeline: &Pipeline, output: &mut dyn Write) -> Result<(), LedgerError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// `config` is only used by the async strategy.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<WorkerConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(config.unwrap_or_default())),
    }
}

/// Log the outcome of one payout round
pub(crate) fn log_payout_round(round: usize, results: &[PayoutResult]) {
    let succeeded = results.iter().filter(|r| r.success).count();
    tracing::info!(
        round,
        attempted = results.len(),
        succeeded,
        failed = results.len() - succeeded,
        "payout round complete"
    );
}

/// Write the balance report and, when configured, the journal
pub(crate) fn write_report(
    pipeline: &Pipeline,
    balances: &[Balance],
    system: &Balance,
    entries: &[LedgerEntry],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    if let Some(path) = &pipeline.journal {
        write_journal(path, entries)?;
    }
    write_balances_csv(balances, system, output)
}

fn write_journal(path: &Path, entries: &[LedgerEntry]) -> Result<(), LedgerError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_entries_csv(entries, &mut writer)?;
    writer.flush()?;
    tracing::info!(path = %path.display(), entries = entries.len(), "journal written");
    Ok(())
}
