//! # Merkle-Ledger Benchmarks
//!
//! | Area | Measured |
//! |------|----------|
//! | ml-01 Merkle tree | build and proof over N leaves |
//! | ml-04 State | apply + re-commit per transaction |
//! | ml-05 Mining | nonce search at low difficulty |
//! | ml-07 Ledger | submit-to-block throughput |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ml_01_merkle_tree::MerkleTree;
use ml_02_transactions::{Transaction, TransactionKind};
use ml_04_state_management::{StateConfig, StateManager};
use ml_05_block_production::{Block, MiningControl, GENESIS_PARENT_HASH};
use ml_07_ledger::{Ledger, LedgerConfig};
use serde_json::json;
use std::time::Duration;

fn bench_merkle(c: &mut Criterion) {
    let mut group = c.benchmark_group("ml-01-merkle-tree");

    for size in [16usize, 256, 4096] {
        let leaves: Vec<Vec<u8>> = (0..size).map(|i| format!("leaf-{i}").into_bytes()).collect();
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("build", size), &leaves, |b, leaves| {
            b.iter(|| black_box(MerkleTree::build(leaves).root()))
        });

        let tree = MerkleTree::build(&leaves);
        group.bench_with_input(BenchmarkId::new("proof_and_verify", size), &tree, |b, tree| {
            let root = tree.root();
            b.iter(|| {
                let proof = tree.proof(size / 2).map(|p| p.verify(&root));
                black_box(proof)
            })
        });
    }

    group.finish();
}

fn bench_state_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("ml-04-state-management");

    for accounts in [10usize, 100, 1000] {
        let txs: Vec<Transaction> = (0..accounts)
            .map(|i| {
                Transaction::create(
                    TransactionKind::Economic,
                    None,
                    Some(format!("acct-{i}")),
                    json!({ "action": "credit", "amount": 5 }),
                )
            })
            .collect();

        group.throughput(Throughput::Elements(accounts as u64));
        group.bench_with_input(BenchmarkId::new("apply_batch", accounts), &txs, |b, txs| {
            b.iter(|| {
                let mut state = StateManager::new(StateConfig::default());
                for tx in txs {
                    let _ = state.apply(tx);
                }
                black_box(state.state_root())
            })
        });
    }

    group.finish();
}

fn bench_mining(c: &mut Criterion) {
    let mut group = c.benchmark_group("ml-05-block-production");
    group.measurement_time(Duration::from_secs(10));

    let txs: Vec<Transaction> = (0..10)
        .map(|i| Transaction::create(TransactionKind::Generic, None, None, json!({ "n": i })))
        .collect();

    for difficulty in [1u32, 2, 3] {
        group.bench_with_input(
            BenchmarkId::new("mine", difficulty),
            &difficulty,
            |b, &difficulty| {
                b.iter(|| {
                    let mut block = Block::new(1, txs.clone(), GENESIS_PARENT_HASH, difficulty);
                    block.set_state_root([1; 32]);
                    black_box(block.mine(&MiningControl::default()).map(|o| o.attempts))
                })
            },
        );
    }

    group.finish();
}

fn bench_ledger_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("ml-07-ledger");
    group.sample_size(20);

    let batch = 50usize;
    group.throughput(Throughput::Elements(batch as u64));
    group.bench_function("submit_batch_to_block", |b| {
        b.iter(|| {
            let config = LedgerConfig {
                difficulty: 1,
                batch_size: batch,
                ..LedgerConfig::default()
            };
            let Ok(mut ledger) = Ledger::new(config) else {
                return;
            };
            for i in 0..batch {
                let tx = Transaction::create(TransactionKind::Generic, None, None, json!({ "i": i }));
                let _ = ledger.submit(tx);
            }
            black_box(ledger.chain().len());
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_merkle,
    bench_state_apply,
    bench_mining,
    bench_ledger_throughput
);
criterion_main!(benches);
