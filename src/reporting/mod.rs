//! Output rendering.
//!
//! The terminal reporter writes results summaries, per-test detail, logs,
//! and history to a line-oriented sink, ANSI-colored unless disabled.

pub mod terminal;

pub use terminal::Reporter;
