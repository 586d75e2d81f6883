use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::LlmProvider;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default = "AgentConfig::summarizer_default")]
    pub primary_agent: AgentConfig,
    #[serde(default = "AgentConfig::predictor_default")]
    pub secondary_agent: AgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Cap on returned entries; zero is rejected by `validate`.
    pub max_commands: usize,
    /// Case-insensitive substrings that disqualify a command.
    pub ignore_patterns: Vec<String>,
    /// Whether formatted output includes the capture time per entry.
    pub include_timestamps: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_commands: 5,
            ignore_patterns: vec![
                "ls".to_string(),
                "pwd".to_string(),
                "clear".to_string(),
                "history".to_string(),
            ],
            include_timestamps: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub provider: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_prompt: String,
    /// Optional endpoint override (self-hosted gateways, non-default ports).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl AgentConfig {
    fn summarizer_default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: "llama3-8b-8192".to_string(),
            max_tokens: 400,
            temperature: 0.7,
            system_prompt: "You are a command summarization expert. Analyze terminal \
                            commands and create concise, informative summaries."
                .to_string(),
            base_url: None,
        }
    }

    fn predictor_default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: "llama3-70b-8192".to_string(),
            max_tokens: 400,
            temperature: 0.6,
            system_prompt: "You are an intelligent command predictor. Based on terminal \
                            command history, predict the most likely next commands the \
                            user should run to continue their workflow."
                .to_string(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub save_to_file: bool,
    pub output_directory: PathBuf,
    pub include_raw_commands: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_to_file: true,
            output_directory: PathBuf::from("outputs"),
            include_raw_commands: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history: HistoryConfig::default(),
            primary_agent: AgentConfig::summarizer_default(),
            secondary_agent: AgentConfig::predictor_default(),
            output: OutputConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file. A missing or malformed file
    /// falls back to defaults with a notice on stderr; validation failures
    /// are fatal and reported separately.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("⚠️  Error parsing config file {}: {}", path.display(), e);
                    eprintln!("   Using default configuration.");
                    Self::default()
                }
            },
            Err(_) => {
                eprintln!("ℹ️  Config file {} not found. Using defaults.", path.display());
                Self::default()
            }
        }
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject invalid configuration before any capture attempt. Everything
    /// here is fatal: a capture run with a broken config must never start.
    pub fn validate(&self) -> Result<()> {
        if self.history.max_commands == 0 {
            return Err(anyhow!("history.max_commands must be a positive integer"));
        }

        // An empty-string pattern is a substring of every command and would
        // silently empty the capture result.
        if self.history.ignore_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(anyhow!(
                "history.ignore_patterns must not contain empty patterns"
            ));
        }

        for (label, agent) in [
            ("primary_agent", &self.primary_agent),
            ("secondary_agent", &self.secondary_agent),
        ] {
            LlmProvider::from_name(&agent.provider)
                .map_err(|e| anyhow!("{}: {}", label, e))?;
            if agent.max_tokens == 0 {
                return Err(anyhow!("{}.max_tokens must be positive", label));
            }
            if agent.model.trim().is_empty() {
                return Err(anyhow!("{}.model must not be empty", label));
            }
        }

        Ok(())
    }
}
