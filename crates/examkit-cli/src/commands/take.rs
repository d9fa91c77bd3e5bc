//! The `examkit take` command.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use uuid::Uuid;

use examkit_core::driver::{DriverConfig, DriverHandle, ExamDriver, SessionObserver};
use examkit_core::error::ExamError;
use examkit_core::loader::QuestionBankLoader;
use examkit_core::model::{Answer, AnsweredRecord, Locale, Question, QuestionKind};
use examkit_core::scoring::Summary;
use examkit_core::session::{FinishReason, SessionSnapshot, SessionStatus};
use examkit_core::traits::QuestionSource;
use examkit_sources::config::load_config_from;
use examkit_sources::{create_source, FileSource};

use crate::render;

pub struct TakeArgs {
    pub exam: Option<String>,
    pub bank: Option<PathBuf>,
    pub duration: Option<u32>,
    pub lang: Option<Locale>,
    pub json: bool,
    pub tick_ms: u64,
    pub config: Option<PathBuf>,
}

/// Console observer for clock milestones and the end of an attempt.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_started(&self, snapshot: &SessionSnapshot) {
        eprintln!(
            "  Started at {} ({} questions, {})",
            chrono::Local::now().format("%H:%M:%S"),
            snapshot.question_count,
            render::format_clock(snapshot.duration_secs),
        );
    }

    fn on_answer(&self, _record: &AnsweredRecord) {}

    fn on_tick(&self, remaining_secs: u32) {
        if remaining_secs == 60 || remaining_secs == 10 {
            eprintln!("  {} left", render::format_clock(remaining_secs));
        }
    }

    fn on_finished(&self, summary: &Summary, reason: FinishReason) {
        if reason == FinishReason::TimeExpired {
            eprintln!(
                "  Time is up. {}/{} questions answered.",
                summary.attempted_count, summary.total_questions
            );
        }
    }
}

/// One parsed line of terminal input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Select(Answer),
    Next,
    Prev,
    Reset,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let word = line.trim().to_lowercase();
    let command = match word.as_str() {
        "" => return Ok(None),
        "start" | "s" => Command::Start,
        "true" | "t" => Command::Select(Answer::Boolean(true)),
        "false" | "f" => Command::Select(Answer::Boolean(false)),
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => match other.parse::<usize>() {
            Ok(0) => return Err("options are numbered from 1".to_string()),
            Ok(n) => Command::Select(Answer::Choice(n - 1)),
            Err(_) => return Err(format!("unknown command '{other}', type `help`")),
        },
    };
    Ok(Some(command))
}

fn wrong_shape_hint(question: &Question) -> String {
    match question.kind {
        QuestionKind::BooleanChoice => "this is a true/false question, type t or f".to_string(),
        QuestionKind::MultipleChoice => {
            format!("choose an option from 1 to {}", question.options.len())
        }
    }
}

const HELP: &str = "Commands: start, t/true, f/false, <option number>, next, prev, reset, quit";

pub async fn execute(args: TakeArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let locale = args.lang.unwrap_or(config.default_locale);

    let (source, exam) = match &args.bank {
        Some(path) => (
            Arc::new(FileSource::new(path)) as Arc<dyn QuestionSource>,
            None,
        ),
        None => {
            let (_, exam) = config.exam(args.exam.as_deref())?;
            (
                create_source(&exam.source, config.base_dir.as_deref())?,
                Some(exam),
            )
        }
    };

    let outcome = QuestionBankLoader::new(source).load().await;
    if let Some(e) = &outcome.error {
        tracing::warn!("no questions loaded: {e:#}");
    }
    let bank = outcome.bank;

    let duration_secs = args
        .duration
        .unwrap_or_else(|| config.duration_for(exam, bank.duration_secs));
    let title = exam
        .and_then(|e| e.title(locale))
        .unwrap_or_else(|| bank.title.get(locale))
        .to_string();

    println!("{title}");
    println!(
        "{} questions, {} time limit",
        bank.len(),
        render::format_clock(duration_secs)
    );
    println!("{HELP}");

    let driver_config = DriverConfig {
        tick_period: Duration::from_millis(args.tick_ms.max(1)),
        ..DriverConfig::default()
    };
    let (handle, task) = ExamDriver::new(driver_config)
        .with_observer(Arc::new(ConsoleObserver))
        .spawn();

    let mut terminal = Terminal {
        handle: handle.clone(),
        questions: bank.questions,
        duration_secs,
        locale,
        json: args.json,
        reported: None,
    };
    terminal.run().await?;

    drop(terminal);
    drop(handle);
    let session = task.await.context("exam driver task failed")?;
    if session.is_running() {
        println!("Exam abandoned.");
    }

    Ok(())
}

/// Reads stdin and forwards intents until EOF or `quit`.
struct Terminal {
    handle: DriverHandle,
    questions: Vec<Question>,
    duration_secs: u32,
    locale: Locale,
    json: bool,
    /// Session whose summary has already been printed.
    reported: Option<Uuid>,
}

/// Read stdin on a dedicated thread; the channel closes at EOF.
fn spawn_stdin_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

impl Terminal {
    async fn run(&mut self) -> Result<()> {
        let mut lines = spawn_stdin_reader();
        let mut updates = self.handle.subscribe();
        let mut watching = true;

        loop {
            tokio::select! {
                biased;

                line = lines.recv() => {
                    let Some(line) = line else {
                        return Ok(());
                    };
                    let line = line.context("failed to read input")?;
                    match parse_command(&line) {
                        Ok(Some(Command::Quit)) => return Ok(()),
                        Ok(Some(command)) => self.dispatch(command).await?,
                        Ok(None) => {}
                        Err(message) => println!("! {message}"),
                    }
                }
                changed = updates.changed(), if watching => {
                    if changed.is_err() {
                        watching = false;
                        continue;
                    }
                    let snapshot = updates.borrow_and_update().clone();
                    self.report_if_finished(&snapshot)?;
                }
            }
        }
    }

    async fn dispatch(&mut self, command: Command) -> Result<()> {
        let result = match command {
            Command::Start => {
                self.handle
                    .start(self.questions.clone(), self.duration_secs)
                    .await
            }
            Command::Select(answer) => {
                if let Some(hint) = self.reject_locally(answer) {
                    println!("! {hint}");
                    return Ok(());
                }
                self.handle.select_answer(answer).await
            }
            Command::Next => self.handle.advance().await,
            Command::Prev => self.handle.go_to_previous().await,
            Command::Reset => self.handle.reset().await,
            Command::Help => {
                println!("{HELP}");
                return Ok(());
            }
            Command::Quit => return Ok(()),
        };

        match result {
            Ok(snapshot) => self.show(command, &snapshot),
            Err(ExamError::DriverClosed) => Err(ExamError::DriverClosed.into()),
            Err(e) => {
                println!("! {e}");
                Ok(())
            }
        }
    }

    /// A hint when `answer` cannot fit the question on screen. Mismatched
    /// shapes never reach the engine.
    fn reject_locally(&self, answer: Answer) -> Option<String> {
        let question = self.handle.snapshot().current_question?;
        if question.accepts(answer) {
            return None;
        }
        Some(wrong_shape_hint(&question))
    }

    fn show(&mut self, command: Command, snapshot: &SessionSnapshot) -> Result<()> {
        match snapshot.status {
            SessionStatus::Running => {
                let text = match command {
                    Command::Select(_) => render::selection_line(snapshot, self.locale),
                    _ => render::question_block(snapshot, self.locale),
                };
                if let Some(text) = text {
                    println!("{text}");
                }
                Ok(())
            }
            SessionStatus::Finished => self.report_if_finished(snapshot),
            SessionStatus::Idle => {
                println!("Exam reset. Type `start` to begin again.");
                Ok(())
            }
        }
    }

    fn report_if_finished(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        if snapshot.status != SessionStatus::Finished {
            return Ok(());
        }
        let Some(summary) = &snapshot.summary else {
            return Ok(());
        };
        if snapshot.session_id.is_some() && self.reported == snapshot.session_id {
            return Ok(());
        }
        self.reported = snapshot.session_id;

        if self.json {
            println!("{}", serde_json::to_string_pretty(snapshot)?);
            return Ok(());
        }

        println!("\n{}", render::summary_table(summary, self.locale));
        println!("{}", render::review_table(&self.questions, summary, self.locale));
        Ok(())
    }
}
