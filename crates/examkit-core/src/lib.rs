//! examkit-core: timed exam engine, answer evaluation and scoring.
//!
//! This crate defines the question model, the session state machine that
//! drives a timed exam, and the scoring logic applied once a session ends.

pub mod bank;
pub mod driver;
pub mod error;
pub mod evaluator;
pub mod loader;
pub mod model;
pub mod scoring;
pub mod session;
pub mod traits;
