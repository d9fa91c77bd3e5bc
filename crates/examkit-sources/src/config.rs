//! Exam configuration and source factory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use examkit_core::loader::{LoadOutcome, QuestionBankLoader};
use examkit_core::model::Locale;
use examkit_core::traits::QuestionSource;

use crate::error::ConfigError;
use crate::file::FileSource;
use crate::http::HttpSource;

/// Where an exam's questions come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    File {
        path: PathBuf,
    },
    Http {
        url: String,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
}

/// A named exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamConfig {
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub title_ar: Option<String>,
    /// Overrides the bank's own time limit.
    #[serde(default)]
    pub duration_secs: Option<u32>,
    pub source: SourceConfig,
}

impl ExamConfig {
    /// Configured title in `locale`, falling back to the English one.
    pub fn title(&self, locale: Locale) -> Option<&str> {
        match locale {
            Locale::Ar => self.title_ar.as_deref().or(self.title_en.as_deref()),
            Locale::En => self.title_en.as_deref(),
        }
    }
}

/// Top-level examkit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamkitConfig {
    /// Exams keyed by name.
    #[serde(default)]
    pub exams: BTreeMap<String, ExamConfig>,
    /// Exam taken when none is named.
    #[serde(default)]
    pub default_exam: Option<String>,
    #[serde(default)]
    pub default_locale: Locale,
    /// Time limit for exams whose bank and config leave it unset.
    #[serde(default = "default_duration")]
    pub default_duration_secs: u32,
    /// Directory relative file paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_duration() -> u32 {
    3600
}

impl Default for ExamkitConfig {
    fn default() -> Self {
        Self {
            exams: BTreeMap::new(),
            default_exam: None,
            default_locale: Locale::default(),
            default_duration_secs: default_duration(),
            base_dir: None,
        }
    }
}

impl ExamkitConfig {
    /// Look up an exam by name, or the default exam when `name` is `None`.
    pub fn exam(&self, name: Option<&str>) -> Result<(&str, &ExamConfig), ConfigError> {
        let name = name
            .or(self.default_exam.as_deref())
            .ok_or(ConfigError::NoExamSelected)?;

        self.exams
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownExam {
                name: name.to_string(),
                available: if self.exams.is_empty() {
                    "(none)".to_string()
                } else {
                    self.exams.keys().cloned().collect::<Vec<_>>().join(", ")
                },
            })
    }

    /// Time limit for an exam: config override, then bank, then default.
    pub fn duration_for(&self, exam: Option<&ExamConfig>, bank_duration: Option<u32>) -> u32 {
        exam.and_then(|e| e.duration_secs)
            .or(bank_duration)
            .filter(|d| *d > 0)
            .unwrap_or(self.default_duration_secs)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_source_config(config: &SourceConfig) -> SourceConfig {
    match config {
        SourceConfig::File { path } => SourceConfig::File {
            path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
        },
        SourceConfig::Http { url, timeout_secs } => SourceConfig::Http {
            url: resolve_env_vars(url),
            timeout_secs: *timeout_secs,
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examkit.toml` in the current directory
/// 2. `~/.config/examkit/config.toml`
///
/// Environment variable overrides: `EXAMKIT_LOCALE`, `EXAMKIT_DURATION_SECS`.
pub fn load_config() -> Result<ExamkitConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamkitConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examkit.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let mut config = toml::from_str::<ExamkitConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            config.base_dir = path.parent().map(Path::to_path_buf);
            config
        }
        None => ExamkitConfig::default(),
    };

    apply_env_overrides(&mut config)?;

    for exam in config.exams.values_mut() {
        exam.source = resolve_source_config(&exam.source);
    }

    tracing::debug!(
        path = config_path
            .as_ref()
            .map(|p| tracing::field::display(p.display())),
        exams = config.exams.len(),
        "configuration loaded"
    );
    Ok(config)
}

fn apply_env_overrides(config: &mut ExamkitConfig) -> Result<(), ConfigError> {
    if let Ok(value) = std::env::var("EXAMKIT_LOCALE") {
        config.default_locale = value.parse().map_err(|_| ConfigError::InvalidOverride {
            var: "EXAMKIT_LOCALE",
            value: value.clone(),
        })?;
    }

    if let Ok(value) = std::env::var("EXAMKIT_DURATION_SECS") {
        config.default_duration_secs = value
            .parse::<u32>()
            .ok()
            .filter(|d| *d > 0)
            .ok_or(ConfigError::InvalidOverride {
                var: "EXAMKIT_DURATION_SECS",
                value,
            })?;
    }

    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examkit"))
}

/// Create a source instance from its configuration.
///
/// Relative file paths are joined onto `base_dir` when one is given.
pub fn create_source(
    config: &SourceConfig,
    base_dir: Option<&Path>,
) -> Result<Arc<dyn QuestionSource>> {
    match config {
        SourceConfig::File { path } => {
            let path = match base_dir {
                Some(dir) if path.is_relative() => dir.join(path),
                _ => path.clone(),
            };
            Ok(Arc::new(FileSource::new(path)))
        }
        SourceConfig::Http { url, timeout_secs } => {
            Ok(Arc::new(HttpSource::new(url, *timeout_secs)?))
        }
    }
}

/// Load every configured exam concurrently, in name order.
pub async fn load_all_exams(config: &ExamkitConfig) -> Vec<(String, LoadOutcome)> {
    let loads = config.exams.iter().map(|(name, exam)| async move {
        let outcome = match create_source(&exam.source, config.base_dir.as_deref()) {
            Ok(source) => QuestionBankLoader::new(source).load().await,
            Err(e) => LoadOutcome {
                bank: examkit_core::model::QuestionBank::empty(name.as_str()),
                error: Some(e),
            },
        };
        (name.clone(), outcome)
    });

    join_all(loads).await
}
