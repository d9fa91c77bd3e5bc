//! The `examkit list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examkit_sources::config::{load_all_exams, load_config_from, SourceConfig};

use crate::render::format_clock;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    if config.exams.is_empty() {
        println!("No exams configured. Run `examkit init` to create a config file.");
        return Ok(());
    }

    let outcomes = load_all_exams(&config).await;

    let mut table = Table::new();
    table.set_header(vec!["Exam", "Title", "Questions", "Time", "Source", "Status"]);

    for (name, outcome) in &outcomes {
        let Some(exam) = config.exams.get(name) else {
            continue;
        };
        let source = match &exam.source {
            SourceConfig::File { path } => path.display().to_string(),
            SourceConfig::Http { url, .. } => url.clone(),
        };
        let status = match &outcome.error {
            None => "ok".to_string(),
            Some(e) => format!("{e}"),
        };
        let default_marker = if config.default_exam.as_deref() == Some(name.as_str()) {
            " (default)"
        } else {
            ""
        };

        let title = exam
            .title(config.default_locale)
            .unwrap_or_else(|| outcome.bank.title.get(config.default_locale));
        let duration = config.duration_for(Some(exam), outcome.bank.duration_secs);

        table.add_row(vec![
            Cell::new(format!("{name}{default_marker}")),
            Cell::new(title),
            Cell::new(outcome.bank.len()),
            Cell::new(format_clock(duration)),
            Cell::new(source),
            Cell::new(status),
        ]);
    }

    println!("{table}");
    Ok(())
}
