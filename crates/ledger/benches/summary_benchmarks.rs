use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::NaiveDate;
use ledgerly_core::TransactionId;
use ledgerly_ledger::{Summary, Transaction, TransactionKind, summarize, totals_by_kind};
use rust_decimal::Decimal;

fn ledger(n: usize) -> Vec<Transaction> {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    (0..n)
        .map(|i| Transaction {
            id: TransactionId::new(i as i64 + 1),
            kind: if i % 3 == 0 {
                TransactionKind::Expense
            } else {
                TransactionKind::Income
            },
            category: "bench".to_string(),
            amount: Decimal::new(1_234 + i as i64, 2),
            date,
            description: None,
        })
        .collect()
}

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary");

    for size in [100usize, 10_000, 100_000] {
        let records = ledger(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("in_process", size), &records, |b, records| {
            b.iter(|| summarize(black_box(records)))
        });

        group.bench_with_input(BenchmarkId::new("grouped", size), &records, |b, records| {
            b.iter(|| Summary::from_totals(totals_by_kind(black_box(records))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_summary);
criterion_main!(benches);
