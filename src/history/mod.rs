pub mod capture;
pub mod format;
pub mod parser;
pub mod source;

#[cfg(test)]
#[path = "capture.test.rs"]
mod capture_test;

pub use capture::{truncate_and_index, CommandRecord, HistoryCapture};
pub use format::{format_for_analysis, NO_COMMANDS_SENTINEL};
pub use parser::FormatVariant;
pub use source::{candidate_sources, HistorySource, Platform, SourceKind};
