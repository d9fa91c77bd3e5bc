//! The `examkit init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("examkit.toml").exists() {
        println!("examkit.toml already exists, skipping.");
    } else {
        std::fs::write("examkit.toml", SAMPLE_CONFIG)?;
        println!("Created examkit.toml");
    }

    std::fs::create_dir_all("banks")?;
    let sample_path = std::path::Path::new("banks/sample.json");
    if sample_path.exists() {
        println!("banks/sample.json already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_BANK)?;
        println!("Created banks/sample.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: examkit validate --bank banks/sample.json");
    println!("  2. Run: examkit list");
    println!("  3. Run: examkit take --exam sample");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examkit configuration

default_exam = "sample"
default_locale = "en"
default_duration_secs = 3600

[exams.sample]
title_en = "Frontend sample exam"
title_ar = "اختبار تجريبي للواجهة الأمامية"
duration_secs = 300
source = { type = "file", path = "banks/sample.json" }

# [exams.remote]
# source = { type = "http", url = "https://${EXAMKIT_HOST}/banks/frontend.json", timeout_secs = 10 }
"#;

const SAMPLE_BANK: &str = r#"[
  {
    "id": 1,
    "type": "true_false",
    "question_en": "The <section> element is a semantic HTML element.",
    "question_ar": "عنصر <section> هو عنصر HTML دلالي.",
    "correct_answer": true,
    "explanation_en": "<section> groups thematically related content.",
    "explanation_ar": "يجمع <section> محتوى مترابطًا موضوعيًا."
  },
  {
    "id": 2,
    "type": "multiple_choice",
    "question_en": "Which CSS property controls the space inside an element's border?",
    "question_ar": "أي خاصية CSS تتحكم في المسافة داخل حدود العنصر؟",
    "options_en": ["margin", "padding", "gap", "outline"],
    "options_ar": ["margin", "padding", "gap", "outline"],
    "correct_answer": 1,
    "explanation_en": "padding sits between the content and the border.",
    "explanation_ar": "تقع padding بين المحتوى والحدود."
  },
  {
    "id": 3,
    "type": "multiple_choice",
    "question_en": "What does `typeof null` return in JavaScript?",
    "question_ar": "ماذا تعيد `typeof null` في JavaScript؟",
    "options_en": ["\"null\"", "\"undefined\"", "\"object\""],
    "options_ar": ["\"null\"", "\"undefined\"", "\"object\""],
    "correct_answer": 2,
    "explanation_en": "A long-standing quirk of the language reports null as an object.",
    "explanation_ar": "خلل قديم في اللغة يجعل null يظهر ككائن."
  }
]
"#;
