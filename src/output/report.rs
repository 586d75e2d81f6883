use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::config::OutputConfig;
use crate::history::CommandRecord;
use crate::llm::extract_commands;

/// The complete result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub timestamp: String,
    pub session_id: String,
    pub command_count: usize,
    pub summary: String,
    pub predicted_commands: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_commands: Option<Vec<CommandRecord>>,
}

pub struct OutputManager {
    config: OutputConfig,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn save_to_file(&self) -> bool {
        self.config.save_to_file
    }

    /// Assemble the report from captured commands and collaborator output.
    pub fn build_report(
        &self,
        records: &[CommandRecord],
        summary: String,
        predictions: &str,
    ) -> AnalysisReport {
        let now = Utc::now();
        AnalysisReport {
            timestamp: now.to_rfc3339(),
            session_id: now.format("%Y%m%d_%H%M%S").to_string(),
            command_count: records.len(),
            summary,
            predicted_commands: extract_commands(predictions),
            raw_commands: if self.config.include_raw_commands {
                Some(records.to_vec())
            } else {
                None
            },
        }
    }

    /// Persist the report as `analysis_<session_id>.json` in the configured
    /// output directory.
    pub fn save(&self, report: &AnalysisReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.config.output_directory).with_context(|| {
            format!(
                "creating output directory {}",
                self.config.output_directory.display()
            )
        })?;

        let path = self
            .config
            .output_directory
            .join(format!("analysis_{}.json", report.session_id));
        let content = serde_json::to_string_pretty(report)?;
        fs::write(&path, content)
            .with_context(|| format!("writing report to {}", path.display()))?;

        Ok(path)
    }

    /// Print the report to the console with ruled sections.
    pub fn print_report(&self, report: &AnalysisReport) {
        println!();
        println!("{}", "=".repeat(60));
        println!("COMMAND PREDICTOR REPORT");
        println!("{}", "=".repeat(60));
        println!("Session ID: {}", report.session_id);
        println!("Timestamp: {}", report.timestamp);
        println!("Commands Analyzed: {}", report.command_count);

        println!();
        println!("{}", "-".repeat(40));
        println!("WORKFLOW SUMMARY");
        println!("{}", "-".repeat(40));
        println!("{}", report.summary);

        if !report.predicted_commands.is_empty() {
            println!();
            println!("{}", "-".repeat(40));
            println!("PREDICTED NEXT COMMANDS");
            println!("{}", "-".repeat(40));
            for (i, cmd) in report.predicted_commands.iter().enumerate() {
                println!("{}. {}", i + 1, cmd);
            }
        }

        if let Some(raw) = &report.raw_commands {
            println!();
            println!("{}", "-".repeat(40));
            println!("RECENT COMMANDS");
            println!("{}", "-".repeat(40));
            for record in raw {
                println!("{}. {}", record.sequence_index, record.text);
            }
        }

        println!();
        println!("{}", "=".repeat(60));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn records(texts: &[&str]) -> Vec<CommandRecord> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| CommandRecord {
                sequence_index: i + 1,
                text: text.to_string(),
                captured_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_build_report_without_raw_commands() {
        let manager = OutputManager::new(OutputConfig {
            save_to_file: false,
            output_directory: PathBuf::from("outputs"),
            include_raw_commands: false,
        });

        let report = manager.build_report(
            &records(&["git status", "git push"]),
            "Working with git.".to_string(),
            "git pull\ngit log",
        );

        assert_eq!(report.command_count, 2);
        assert_eq!(report.predicted_commands, vec!["git pull", "git log"]);
        assert!(report.raw_commands.is_none());
    }

    #[test]
    fn test_build_report_includes_raw_commands_when_configured() {
        let manager = OutputManager::new(OutputConfig {
            save_to_file: false,
            output_directory: PathBuf::from("outputs"),
            include_raw_commands: true,
        });

        let report = manager.build_report(&records(&["make"]), "Building.".to_string(), "");
        let raw = report.raw_commands.expect("raw commands present");
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].text, "make");
    }

    #[test]
    fn test_save_writes_json_file() {
        let dir = tempdir().unwrap();
        let manager = OutputManager::new(OutputConfig {
            save_to_file: true,
            output_directory: dir.path().join("outputs"),
            include_raw_commands: false,
        });

        let report = manager.build_report(
            &records(&["cargo test"]),
            "Testing.".to_string(),
            "cargo build",
        );
        let path = manager.save(&report).unwrap();

        assert!(path.exists());
        let content = fs::read_to_string(&path).unwrap();
        let loaded: AnalysisReport = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.command_count, 1);
        assert_eq!(loaded.summary, "Testing.");
        assert_eq!(loaded.predicted_commands, vec!["cargo build"]);
    }

    #[test]
    fn test_report_json_round_trip() {
        let report = AnalysisReport {
            timestamp: Utc::now().to_rfc3339(),
            session_id: "20240101_120000".to_string(),
            command_count: 3,
            summary: "summary".to_string(),
            predicted_commands: vec!["ls".to_string()],
            raw_commands: None,
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("raw_commands"));
        let loaded: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.session_id, report.session_id);
    }
}
