use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use super::parser::decode_lossy;
use super::source::{candidate_sources, HistorySource, Platform, SourceKind};
use crate::filter::ExclusionFilter;

/// How long the subprocess fallback may run before we give up and treat the
/// source as empty. An interactive shell that hangs must never hang the tool.
const SUBPROCESS_TIMEOUT: Duration = Duration::from_secs(5);

/// One captured command after filtering and truncation.
///
/// `captured_at` is the moment of capture, not the command's original
/// execution time; the history formats here do not reliably expose one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecord {
    pub sequence_index: usize,
    pub text: String,
    pub captured_at: DateTime<Utc>,
}

/// Keep the tail of the filtered sequence and assign final 1-based indices,
/// oldest-of-the-kept-set first.
pub fn truncate_and_index(commands: Vec<String>, max_commands: usize) -> Vec<CommandRecord> {
    let captured_at = Utc::now();
    let skip = commands.len().saturating_sub(max_commands);

    commands
        .into_iter()
        .skip(skip)
        .enumerate()
        .map(|(i, text)| CommandRecord {
            sequence_index: i + 1,
            text,
            captured_at,
        })
        .collect()
}

/// One-shot history capture: detect -> locate -> read -> parse -> filter ->
/// truncate. Each run is a fresh snapshot; nothing is cached between runs.
#[derive(Debug)]
pub struct HistoryCapture {
    platform: Platform,
    home: Option<PathBuf>,
    max_commands: usize,
}

impl HistoryCapture {
    pub fn new(platform: Platform, max_commands: usize) -> Self {
        Self {
            platform,
            home: dirs::home_dir(),
            max_commands,
        }
    }

    /// Point detection at an explicit home directory instead of the real one.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = Some(home);
        self
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Capture the most recent commands, already filtered and indexed.
    ///
    /// Every capture-path failure (missing files, undecodable bytes, a
    /// misbehaving fallback subprocess) degrades to an empty result. Only
    /// configuration problems are fatal, and those are rejected before this
    /// is ever called.
    pub async fn capture(&self, filter: &ExclusionFilter) -> Vec<CommandRecord> {
        let Some(home) = &self.home else {
            return Vec::new();
        };

        for source in candidate_sources(&self.platform, home) {
            let Some(content) = self.read_source(&source).await else {
                continue;
            };

            let commands = filter.apply(source.variant.parse_lines(&content));
            if !commands.is_empty() {
                return truncate_and_index(commands, self.max_commands);
            }
        }

        Vec::new()
    }

    /// Read raw text from one source, or None if it is absent or unreadable.
    async fn read_source(&self, source: &HistorySource) -> Option<String> {
        match &source.kind {
            SourceKind::File(path) => {
                if !path.exists() {
                    return None;
                }
                fs::read(path).ok().map(|bytes| decode_lossy(&bytes))
            }
            SourceKind::Subprocess { program, args } => {
                run_history_subprocess(program, args, SUBPROCESS_TIMEOUT).await
            }
        }
    }
}

/// Run the shell's own history listing with a bounded timeout, capturing
/// stdout. Timeout, spawn failure, and non-zero exit all read as "no
/// commands found".
async fn run_history_subprocess(
    program: &str,
    args: &[String],
    timeout_limit: Duration,
) -> Option<String> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .ok()?;

    let output = match timeout(timeout_limit, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        // Timed out or failed to run; kill_on_drop reaps the child.
        Ok(Err(_)) | Err(_) => return None,
    };

    if !output.status.success() {
        return None;
    }

    let text = decode_lossy(&output.stdout);
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
