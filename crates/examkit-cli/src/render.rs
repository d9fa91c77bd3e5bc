//! Terminal rendering of snapshots and summaries.

use comfy_table::{Cell, Table};

use examkit_core::model::{Answer, Locale, Question, QuestionKind};
use examkit_core::scoring::{Band, Outcome, Summary};
use examkit_core::session::SessionSnapshot;

/// Fixed UI strings in both locales.
struct Labels {
    remaining: &'static str,
    true_: &'static str,
    false_: &'static str,
    selected: &'static str,
    correct: &'static str,
    incorrect: &'static str,
    not_attempted: &'static str,
    score: &'static str,
    band: &'static str,
    result: &'static str,
    passed: &'static str,
    not_passed: &'static str,
    answer: &'static str,
}

const EN: Labels = Labels {
    remaining: "remaining",
    true_: "True",
    false_: "False",
    selected: "Selected",
    correct: "Correct",
    incorrect: "Incorrect",
    not_attempted: "Not attempted",
    score: "Score",
    band: "Band",
    result: "Result",
    passed: "Passed",
    not_passed: "Not passed",
    answer: "Answer",
};

const AR: Labels = Labels {
    remaining: "متبقٍ",
    true_: "صح",
    false_: "خطأ",
    selected: "الاختيار",
    correct: "صحيحة",
    incorrect: "خاطئة",
    not_attempted: "لم تتم الإجابة",
    score: "النتيجة",
    band: "التقدير",
    result: "الحالة",
    passed: "ناجح",
    not_passed: "غير ناجح",
    answer: "الإجابة",
};

fn labels(locale: Locale) -> &'static Labels {
    match locale {
        Locale::En => &EN,
        Locale::Ar => &AR,
    }
}

/// `mm:ss`, with minutes allowed past 59.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn band_label(band: Band, locale: Locale) -> String {
    match locale {
        Locale::En => band.to_string(),
        Locale::Ar => match band {
            Band::Excellent => "ممتاز",
            Band::Good => "جيد",
            Band::Pass => "مقبول",
            Band::NeedsImprovement => "يحتاج إلى تحسين",
        }
        .to_string(),
    }
}

/// Human text for an answer to `question`.
pub fn answer_label(question: &Question, answer: Answer, locale: Locale) -> String {
    let l = labels(locale);
    match answer {
        Answer::Boolean(true) => l.true_.to_string(),
        Answer::Boolean(false) => l.false_.to_string(),
        Answer::Choice(i) => match question.options.get(i) {
            Some(option) => format!("{}) {}", i + 1, option.get(locale)),
            None => format!("{}) ?", i + 1),
        },
    }
}

/// The current question with its options and the clock.
pub fn question_block(snapshot: &SessionSnapshot, locale: Locale) -> Option<String> {
    let question = snapshot.current_question.as_ref()?;
    let l = labels(locale);

    let mut out = format!(
        "\n[{}/{}] {} {}\n{}\n",
        snapshot.current_index + 1,
        snapshot.question_count,
        format_clock(snapshot.remaining_secs),
        l.remaining,
        question.prompt.get(locale),
    );

    match question.kind {
        QuestionKind::BooleanChoice => {
            out.push_str(&format!("  t) {}\n  f) {}\n", l.true_, l.false_));
        }
        QuestionKind::MultipleChoice => {
            for (i, option) in question.options.iter().enumerate() {
                out.push_str(&format!("  {}) {}\n", i + 1, option.get(locale)));
            }
        }
    }

    let shown = snapshot
        .pending_selection
        .or(snapshot.current_answer.map(|r| r.submitted));
    if let Some(answer) = shown {
        out.push_str(&format!(
            "{}: {}\n",
            l.selected,
            answer_label(question, answer, locale)
        ));
    }

    Some(out)
}

pub fn selection_line(snapshot: &SessionSnapshot, locale: Locale) -> Option<String> {
    let question = snapshot.current_question.as_ref()?;
    let answer = snapshot.pending_selection?;
    Some(format!(
        "{}: {}",
        labels(locale).selected,
        answer_label(question, answer, locale)
    ))
}

fn outcome_label(outcome: Outcome, locale: Locale) -> &'static str {
    let l = labels(locale);
    match outcome {
        Outcome::Correct => l.correct,
        Outcome::Incorrect => l.incorrect,
        Outcome::NotAttempted => l.not_attempted,
    }
}

pub fn summary_table(summary: &Summary, locale: Locale) -> Table {
    let l = labels(locale);
    let mut table = Table::new();
    table.set_header(vec![l.score, l.band, l.correct, l.incorrect, l.not_attempted, l.result]);
    table.add_row(vec![
        Cell::new(format!("{}%", summary.percentage)),
        Cell::new(band_label(summary.band, locale)),
        Cell::new(summary.correct_count),
        Cell::new(summary.incorrect_count),
        Cell::new(summary.unattempted_count),
        Cell::new(if summary.passed() { l.passed } else { l.not_passed }),
    ]);
    table
}

/// Per-question review: outcome, correct answer and explanation.
pub fn review_table(questions: &[Question], summary: &Summary, locale: Locale) -> Table {
    let l = labels(locale);
    let mut table = Table::new();
    table.set_header(vec!["#", "", l.result, l.answer, ""]);

    for (i, (question, outcome)) in questions.iter().zip(&summary.outcomes).enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(question.prompt.get(locale)),
            Cell::new(outcome_label(outcome.outcome, locale)),
            Cell::new(answer_label(question, question.correct_answer, locale)),
            Cell::new(question.explanation.get(locale)),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use examkit_core::model::{AnsweredRecord, LocalizedText};
    use examkit_core::scoring::score;

    fn mc() -> Question {
        Question::multiple_choice(
            7,
            LocalizedText::new("Which hook runs after render?", "أي خطاف يعمل بعد العرض؟"),
            vec![
                LocalizedText::new("useMemo", "useMemo"),
                LocalizedText::new("useEffect", "useEffect"),
            ],
            1,
        )
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(3600), "60:00");
    }

    #[test]
    fn answer_labels_are_one_based() {
        let q = mc();
        assert_eq!(answer_label(&q, Answer::Choice(1), Locale::En), "2) useEffect");
        assert_eq!(answer_label(&q, Answer::Choice(5), Locale::En), "6) ?");
        assert_eq!(answer_label(&q, Answer::Boolean(true), Locale::Ar), "صح");
    }

    #[test]
    fn summary_table_shows_band() {
        let q = mc();
        let summary = score(
            std::slice::from_ref(&q),
            &[AnsweredRecord {
                question_id: 7,
                submitted: Answer::Choice(0),
                is_correct: false,
            }],
        );
        let rendered = summary_table(&summary, Locale::En).to_string();
        assert!(rendered.contains("0%"));
        assert!(rendered.contains("Needs Improvement"));
        assert!(rendered.contains("Not passed"));

        let arabic = summary_table(&summary, Locale::Ar).to_string();
        assert!(arabic.contains("يحتاج إلى تحسين"));
    }
}
