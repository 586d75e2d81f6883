//! Command exclusion filtering.
//!
//! Commands matching caller-configured ignore patterns are removed before
//! truncation so noise like `ls` or `clear` never reaches the analysis.

pub mod pattern;

pub use pattern::ExclusionFilter;
