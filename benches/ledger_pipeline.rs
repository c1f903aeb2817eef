//! Benchmark suite for the ledger pipeline
//!
//! Compares the sync and async processing strategies end to end, and
//! measures the in-memory engine on its own, using the divan benchmarking
//! framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```
//!
//! Inputs are generated per size: `n` authorizations spread over 50
//! merchants, all settled in one file and covered by one deposit, followed
//! by one payout round.

use chrono::NaiveDate;
use divan::Bencher;
use payfac_ledger::cli::StrategyType;
use payfac_ledger::strategy::{create_strategy, Pipeline};
use payfac_ledger::{
    Authorization, BankDeposit, Ledger, SettlementFile, SettlementRow, SimulatedIssuer,
    WorkerConfig,
};
use std::fmt::Write as _;
use std::fs;
use tempfile::TempDir;

const SIZES: &[usize] = &[100, 1_000, 10_000];
const MERCHANTS: usize = 50;

fn main() {
    divan::main();
}

fn merchant(i: usize) -> String {
    format!("merchant-{:02}", i % MERCHANTS)
}

fn amount(i: usize) -> i64 {
    (i as i64 % 997 + 1) * 100
}

/// Generated input files, removed when dropped
struct Fixture {
    _dir: TempDir,
    pipeline: Pipeline,
}

fn fixture(n: usize) -> Fixture {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let mut authorizations = String::from("transaction_id,merchant_id,processor_ref_id,amount\n");
    let mut settlements = String::from("file_id,date,processor_ref_id,merchant_id,amount\n");
    let mut total = 0;
    for i in 0..n {
        let _ = writeln!(authorizations, "txn-{:06},{},ref-{:06},{}", i, merchant(i), i, amount(i));
        let _ = writeln!(settlements, "file-1,2026-02-10,ref-{:06},{},{}", i, merchant(i), amount(i));
        total += amount(i);
    }
    let deposits = format!("date,amount\n2026-02-10,{}\n", total);

    let auth_path = dir.path().join("authorizations.csv");
    let settlement_path = dir.path().join("settlements.csv");
    let deposit_path = dir.path().join("deposits.csv");
    fs::write(&auth_path, authorizations).expect("Failed to write authorizations");
    fs::write(&settlement_path, settlements).expect("Failed to write settlements");
    fs::write(&deposit_path, deposits).expect("Failed to write deposits");

    let pipeline = Pipeline {
        settlements: Some(settlement_path),
        deposits: Some(deposit_path),
        ..Pipeline::new(auth_path)
    };
    Fixture {
        _dir: dir,
        pipeline,
    }
}

/// Benchmark the synchronous strategy end to end
#[divan::bench(args = SIZES)]
fn sync_strategy(bencher: Bencher, n: usize) {
    let fixture = fixture(n);
    let strategy = create_strategy(StrategyType::Sync, None);

    bencher.bench_local(|| {
        let mut output = Vec::new();
        strategy
            .process(&fixture.pipeline, &mut output)
            .expect("Processing failed");
        output
    });
}

/// Benchmark the asynchronous strategy end to end
#[divan::bench(args = SIZES)]
fn async_strategy(bencher: Bencher, n: usize) {
    let fixture = fixture(n);
    let strategy = create_strategy(StrategyType::Async, Some(WorkerConfig::default()));

    bencher.bench_local(|| {
        let mut output = Vec::new();
        strategy
            .process(&fixture.pipeline, &mut output)
            .expect("Processing failed");
        output
    });
}

/// Benchmark the engine alone, without CSV I/O
#[divan::bench(args = SIZES)]
fn engine_lifecycle(bencher: Bencher, n: usize) {
    let date = NaiveDate::from_ymd_opt(2026, 2, 10).expect("valid date");
    let authorizations: Vec<_> = (0..n)
        .map(|i| Authorization::new(format!("txn-{:06}", i), merchant(i), format!("ref-{:06}", i), amount(i)))
        .collect();
    let file = SettlementFile::new(
        "file-1",
        date,
        (0..n)
            .map(|i| SettlementRow::new(format!("ref-{:06}", i), merchant(i), amount(i)))
            .collect(),
    );
    let total: i64 = (0..n).map(amount).sum();

    bencher
        .with_inputs(|| authorizations.clone())
        .bench_local_values(|authorizations| {
            let mut ledger = Ledger::new(SimulatedIssuer::new());
            for authorization in authorizations {
                ledger
                    .record_authorization(authorization)
                    .expect("authorization failed");
            }
            ledger
                .process_settlement_file(&file)
                .expect("settlement failed");
            ledger
                .reconcile_bank_deposit(BankDeposit::new(total, date))
                .expect("reconciliation failed");
            ledger.execute_payout_batch();
            ledger.system_balance().expect("balance overflow")
        });
}
