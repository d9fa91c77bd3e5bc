use criterion::{black_box, criterion_group, criterion_main, Criterion};

use examkit_core::bank::{parse_bank_str, validate_bank, BankFormat};

fn site_json(n: u32) -> String {
    let records: Vec<String> = (1..=n)
        .map(|id| {
            if id % 2 == 0 {
                format!(
                    r#"{{"id": {id}, "type": "true_false", "question_en": "Statement {id}", "question_ar": "عبارة {id}", "correct_answer": true, "explanation_en": "e", "explanation_ar": "ش"}}"#
                )
            } else {
                format!(
                    r#"{{"id": {id}, "type": "multiple_choice", "question_en": "Question {id}", "question_ar": "سؤال {id}", "options_en": ["a", "b", "c", "d"], "options_ar": ["أ", "ب", "ج", "د"], "correct_answer": 2, "explanation_en": "e", "explanation_ar": "ش"}}"#
                )
            }
        })
        .collect();
    format!("[{}]", records.join(","))
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_bank");

    let small = site_json(10);
    let large = site_json(500);
    let toml_bank = r#"
[bank]
id = "css"
title_en = "CSS"
duration_secs = 600

[[questions]]
id = 1
type = "true_false"
question_en = "Grid is two-dimensional."
correct_answer = true

[[questions]]
id = 2
type = "multiple_choice"
question_en = "Which unit is relative to the root font size?"
options_en = ["em", "rem", "px"]
correct_answer = 1
"#;

    group.bench_function("json_10", |b| {
        b.iter(|| parse_bank_str(black_box(&small), BankFormat::Json, "bench"))
    });
    group.bench_function("json_500", |b| {
        b.iter(|| parse_bank_str(black_box(&large), BankFormat::Json, "bench"))
    });
    group.bench_function("toml_2", |b| {
        b.iter(|| parse_bank_str(black_box(toml_bank), BankFormat::Toml, "bench"))
    });
    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let bank = parse_bank_str(&site_json(500), BankFormat::Json, "bench").unwrap();
    c.bench_function("validate_500", |b| b.iter(|| validate_bank(black_box(&bank))));
}

criterion_group!(benches, bench_parse, bench_validate);
criterion_main!(benches);
