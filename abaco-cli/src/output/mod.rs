//! Output formatting for CLI.

mod json;
mod text;

pub use json::{CategoryOutput, JsonFormatter, ProbeOutput, RecordOutput};
pub use text::TextFormatter;
