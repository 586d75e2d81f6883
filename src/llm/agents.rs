use anyhow::Result;

use crate::config::AgentConfig;
use crate::llm::client::{LlmClient, LlmProvider, LlmRequest};

/// Primary collaborator: turns the formatted history block into a prose
/// summary of what the user was doing.
pub struct SummarizerAgent {
    client: LlmClient,
    config: AgentConfig,
}

impl SummarizerAgent {
    pub fn new(config: AgentConfig) -> Result<Self> {
        let provider = LlmProvider::from_name(&config.provider)?;
        let api_key = provider.api_key_from_env()?;
        let client = LlmClient::new(provider, api_key, config.model.clone())?
            .with_base_url(config.base_url.clone());
        Ok(Self { client, config })
    }

    pub async fn summarize(&self, history_text: &str) -> Result<String> {
        let prompt = format!(
            "Please analyze the following terminal commands and provide a concise summary that includes:\n\
             1. What the user was trying to accomplish\n\
             2. The types of commands used (file operations, system commands, development tasks, etc.)\n\
             3. Any patterns or workflows you notice\n\
             4. Key files or directories being worked with\n\n\
             Commands to analyze:\n{}\n\n\
             Provide a clear, structured summary in 2-3 paragraphs.",
            history_text
        );

        let response = self
            .client
            .generate(LlmRequest {
                prompt,
                system_prompt: Some(self.config.system_prompt.clone()),
                context: None,
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            })
            .await?;

        Ok(response.content)
    }
}

/// Secondary collaborator: takes the summary plus the original history block
/// and returns suggested follow-up commands, one per line.
pub struct PredictorAgent {
    client: LlmClient,
    config: AgentConfig,
}

impl PredictorAgent {
    pub fn new(config: AgentConfig) -> Result<Self> {
        let provider = LlmProvider::from_name(&config.provider)?;
        let api_key = provider.api_key_from_env()?;
        let client = LlmClient::new(provider, api_key, config.model.clone())?
            .with_base_url(config.base_url.clone());
        Ok(Self { client, config })
    }

    pub async fn predict(&self, summary: &str, history_text: &str) -> Result<String> {
        let prompt = format!(
            "Based on the following command summary and original commands, predict the most \
             likely next commands the user should run to continue their workflow.\n\n\
             Command Summary:\n{}\n\n\
             Original Commands Context:\n{}\n\n\
             Please provide ONLY the next recommended commands to run.\n\n\
             Rules:\n\
             - Provide 2-5 practical commands that logically follow the current workflow\n\
             - Use actual executable commands (no explanatory text)\n\
             - Consider common development/system administration patterns\n\
             - Each command should be on a separate line\n\
             - Do not include any markers, headers, or explanatory text\n\
             - Only provide the raw commands, one per line",
            summary, history_text
        );

        let response = self
            .client
            .generate(LlmRequest {
                prompt,
                system_prompt: Some(self.config.system_prompt.clone()),
                context: Some(summary.to_string()),
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            })
            .await?;

        Ok(response.content)
    }
}

/// Pull individual commands out of a prediction response. Blank lines,
/// comments, and explanatory "Note:" lines are dropped; `1. cmd`-style
/// numbering is stripped.
pub fn extract_commands(response: &str) -> Vec<String> {
    response
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty()
                || line.starts_with('#')
                || line.starts_with("//")
                || line.to_lowercase().starts_with("note")
            {
                return None;
            }

            let command = if line.chars().next().is_some_and(|c| c.is_ascii_digit())
                && line.contains('.')
            {
                match line.split_once('.') {
                    Some((_, rest)) => rest.trim().to_string(),
                    None => line.to_string(),
                }
            } else {
                line.to_string()
            };

            if command.is_empty() {
                None
            } else {
                Some(command)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_commands_plain_lines() {
        let response = "git add .\ngit commit -m 'update'\ngit push\n";
        assert_eq!(
            extract_commands(response),
            vec!["git add .", "git commit -m 'update'", "git push"]
        );
    }

    #[test]
    fn test_extract_commands_strips_numbering() {
        let response = "1. cargo build\n2. cargo test\n3. cargo publish";
        assert_eq!(
            extract_commands(response),
            vec!["cargo build", "cargo test", "cargo publish"]
        );
    }

    #[test]
    fn test_extract_commands_drops_noise() {
        let response = "# suggested commands\n\nnpm install\nNote: run these in order\n// done\n";
        assert_eq!(extract_commands(response), vec!["npm install"]);
    }

    #[test]
    fn test_extract_commands_empty_response() {
        assert!(extract_commands("").is_empty());
        assert!(extract_commands("\n\n  \n").is_empty());
    }
}
