use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

use crate::llm::error_handler::{ErrorHandler, LlmError, RetryConfig};

#[derive(Debug, Clone, PartialEq)]
pub enum LlmProvider {
    Groq,
    OpenAi,
    Ollama,
}

impl LlmProvider {
    pub fn from_name(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(LlmProvider::Groq),
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAi),
            "ollama" | "local" => Ok(LlmProvider::Ollama),
            _ => Err(anyhow!("Unsupported LLM provider: {}", s)),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LlmProvider::Groq => "groq",
            LlmProvider::OpenAi => "openai",
            LlmProvider::Ollama => "ollama",
        }
    }

    pub fn api_base_url(&self) -> &str {
        match self {
            LlmProvider::Groq => "https://api.groq.com/openai/v1",
            LlmProvider::OpenAi => "https://api.openai.com/v1",
            LlmProvider::Ollama => "http://localhost:11434/api",
        }
    }

    /// Environment variable the API key is read from. Keys never live in the
    /// config file.
    pub fn api_key_env_var(&self) -> Option<&str> {
        match self {
            LlmProvider::Groq => Some("GROQ_API_KEY"),
            LlmProvider::OpenAi => Some("OPENAI_API_KEY"),
            LlmProvider::Ollama => None, // local, no key
        }
    }

    pub fn api_key_from_env(&self) -> Result<String> {
        match self.api_key_env_var() {
            Some(var) => {
                env::var(var).map_err(|_| anyhow!("{} not found in environment variables", var))
            }
            None => Ok(String::new()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub context: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub provider: String,
}

pub struct LlmClient {
    provider: LlmProvider,
    api_key: String,
    client: Client,
    model: String,
    base_url: Option<String>,
    error_handler: ErrorHandler,
}

impl LlmClient {
    pub fn new(provider: LlmProvider, api_key: String, model: String) -> Result<Self> {
        if api_key.trim().is_empty() && provider.api_key_env_var().is_some() {
            return Err(anyhow!(
                "API key cannot be empty for provider {}",
                provider.name()
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        let error_handler = ErrorHandler::new(provider.name(), RetryConfig::default());

        Ok(Self {
            provider,
            api_key,
            client,
            model,
            base_url: None,
            error_handler,
        })
    }

    /// Override the provider's default endpoint (self-hosted gateways,
    /// non-default Ollama ports).
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.api_base_url())
    }

    /// Send one generation request, with retry on transient failures.
    /// Failures surface as a distinguishable error, never a crash.
    pub async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        let operation = || async {
            let result = match self.provider {
                LlmProvider::Groq | LlmProvider::OpenAi => {
                    self.generate_chat_completion(request.clone()).await
                }
                LlmProvider::Ollama => self.generate_ollama(request.clone()).await,
            };

            result.map_err(|e| LlmError::classify(self.provider.name(), &e.to_string()))
        };

        self.error_handler
            .execute_with_retry(operation)
            .await
            .map_err(|e| anyhow!("LLM request failed: {}", e))
    }

    /// OpenAI-compatible chat completions, used by both Groq and OpenAI.
    async fn generate_chat_completion(&self, request: LlmRequest) -> Result<LlmResponse> {
        let url = format!("{}/chat/completions", self.base_url());

        let mut messages = Vec::new();
        if let Some(system) = &request.system_prompt {
            messages.push(json!({ "role": "system", "content": system }));
        }
        if let Some(context) = &request.context {
            messages.push(json!({ "role": "system", "content": format!("Context: {}", context) }));
        }
        messages.push(json!({ "role": "user", "content": request.prompt }));

        let payload = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature
        });

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "{} API error ({}): {}",
                self.provider.name(),
                status,
                error_text
            ));
        }

        let response_json: Value = response.json().await?;
        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("Invalid {} response format", self.provider.name()))?
            .to_string();

        Ok(LlmResponse {
            content,
            model: self.model.clone(),
            provider: self.provider.name().to_string(),
        })
    }

    async fn generate_ollama(&self, request: LlmRequest) -> Result<LlmResponse> {
        let url = format!("{}/generate", self.base_url());

        // Ollama's generate endpoint takes a single prompt string.
        let mut prompt = String::new();
        if let Some(system) = &request.system_prompt {
            prompt.push_str(&format!("System: {}\n\n", system));
        }
        if let Some(context) = &request.context {
            prompt.push_str(&format!("Context: {}\n\n", context));
        }
        prompt.push_str(&format!("User: {}", request.prompt));

        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "num_predict": request.max_tokens,
                "temperature": request.temperature
            }
        });

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Ollama API error: {}", error_text));
        }

        let response_json: Value = response.json().await?;
        let content = response_json["response"]
            .as_str()
            .ok_or_else(|| anyhow!("Invalid Ollama response format"))?
            .to_string();

        Ok(LlmResponse {
            content,
            model: self.model.clone(),
            provider: self.provider.name().to_string(),
        })
    }
}
