//! # Output Formatting
//!
//! - **Text**: aligned, colored output for terminals
//! - **JSON**: pretty-printed arrays/objects with camelCase keys
//!
//! Rendering functions return `String`s so commands decide where they go
//! and tests can assert on them directly.

pub mod json;
pub mod text;

use clap::ValueEnum;

/// Output format options supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl OutputFormat {
    /// True for formats meant for other programs.
    pub const fn is_machine(self) -> bool {
        matches!(self, Self::Json)
    }
}
