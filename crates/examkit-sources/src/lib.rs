//! examkit-sources: question bank sources.
//!
//! Implements the `QuestionSource` trait for local files, HTTP endpoints,
//! and in-memory banks, plus the TOML configuration that names exams and
//! where their questions come from.

pub mod config;
pub mod error;
pub mod file;
pub mod http;
pub mod mock;

pub use config::{
    create_source, load_all_exams, load_config, load_config_from, ExamConfig, ExamkitConfig,
    SourceConfig,
};
pub use error::ConfigError;
pub use file::FileSource;
pub use http::HttpSource;
pub use mock::StaticSource;
