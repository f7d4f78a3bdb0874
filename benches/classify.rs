use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;

use bouncewatch::classify::{classify_one, compute_funnel, summarize};
use bouncewatch::model::MessageRecord;

fn sample_records(n: usize) -> Vec<MessageRecord> {
    let states = ["sent", "soft-bounced", "rejected", "bounced", "queued"];
    (0..n)
        .map(|i| {
            MessageRecord::from_json(&json!({
                "_id": format!("id{i}"),
                "ts": 1_700_000_000 + i as i64,
                "email": format!("user{}@example.com", i % 97),
                "state": states[i % states.len()],
                "opens": i % 3,
                "diag": if i % 2 == 0 {
                    "450 4.2.2 <x@y>: Recipient address rejected: mailbox full\nend"
                } else {
                    "general SMTP timeout"
                },
            }))
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let records = sample_records(1000);

    c.bench_function("classify_one_1000", |b| {
        b.iter(|| records.iter().map(classify_one).count())
    });

    c.bench_function("summarize_1000", |b| b.iter(|| summarize(&records)));

    c.bench_function("compute_funnel_1000", |b| {
        b.iter(|| compute_funnel(&records, "subject:activate"))
    });
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
