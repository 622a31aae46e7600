#![allow(clippy::unwrap_used)]
//! Benchmarks for label set editing and upload response parsing

#![allow(missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};
use snaplabel::api::parse_upload_response;
use snaplabel::workflow::{LabelId, LabelOrigin, LabelSet};
use std::hint::black_box;

fn create_upload_body(label_count: usize) -> String {
    let labels: Vec<String> = (0..label_count).map(|i| format!("label {i}")).collect();
    serde_json::json!({ "image_id": "img-bench", "labels": labels }).to_string()
}

fn bench_parse_upload_response(c: &mut Criterion) {
    let body = create_upload_body(200);

    c.bench_function("parse_upload_response_200_labels", |b| {
        b.iter(|| {
            let parsed = parse_upload_response(black_box(&body)).unwrap();
            black_box(parsed);
        });
    });
}

fn bench_label_editing(c: &mut Criterion) {
    let ai_labels: Vec<String> = (0..50).map(|i| format!("ai {i}")).collect();

    c.bench_function("label_set_edit_session", |b| {
        b.iter(|| {
            let mut set = LabelSet::new();
            set.set_ai_labels(ai_labels.iter().cloned());

            // Drop every other AI label, then add custom ones
            for id in (0..50).step_by(2) {
                set.remove(LabelId(id), LabelOrigin::Ai);
            }
            for i in 0..50 {
                set.add_custom(&format!("custom {i}"));
            }
            black_box(set.final_labels());
        });
    });
}

criterion_group!(benches, bench_parse_upload_response, bench_label_editing);
criterion_main!(benches);
