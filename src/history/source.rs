use std::env;
use std::path::{Path, PathBuf};

use super::parser::FormatVariant;

#[derive(Debug, Clone, PartialEq)]
pub enum Platform {
    Linux,
    MacOS,
    Windows,
    Unknown(String),
}

impl Platform {
    /// Detect the host platform once at startup. The result is passed as a
    /// value into source detection so parsing never reads ambient state.
    pub fn detect() -> Self {
        match env::consts::OS {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOS,
            "windows" => Platform::Windows,
            other => Platform::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Platform::Linux => "linux",
            Platform::MacOS => "macos",
            Platform::Windows => "windows",
            Platform::Unknown(name) => name,
        }
    }

    pub fn is_posix(&self) -> bool {
        !matches!(self, Platform::Windows)
    }
}

/// Where history bytes come from: a file on disk, or the textual output of
/// the shell's own history listing run as a subprocess.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceKind {
    File(PathBuf),
    Subprocess { program: String, args: Vec<String> },
}

/// A candidate history source paired with the parser variant that understands
/// its layout. The capture pipeline cannot tell file and subprocess sources
/// apart beyond this descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySource {
    pub kind: SourceKind,
    pub variant: FormatVariant,
}

impl HistorySource {
    fn file(path: PathBuf, variant: FormatVariant) -> Self {
        Self {
            kind: SourceKind::File(path),
            variant,
        }
    }

    fn subprocess(program: &str, args: &[&str], variant: FormatVariant) -> Self {
        Self {
            kind: SourceKind::Subprocess {
                program: program.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
            },
            variant,
        }
    }

    /// Short human-readable label for log output.
    pub fn describe(&self) -> String {
        match &self.kind {
            SourceKind::File(path) => path.display().to_string(),
            SourceKind::Subprocess { program, args } => {
                format!("{} {}", program, args.join(" "))
            }
        }
    }
}

/// Ordered candidate sources for the given platform; first readable wins.
/// `home` is injected rather than resolved here so tests can point the
/// detector at a temporary directory.
pub fn candidate_sources(platform: &Platform, home: &Path) -> Vec<HistorySource> {
    if platform.is_posix() {
        vec![
            HistorySource::file(home.join(".bash_history"), FormatVariant::PlainLine),
            HistorySource::file(home.join(".zsh_history"), FormatVariant::MetadataPrefixed),
            // Fallback: ask an interactive shell for its own listing.
            HistorySource::subprocess("bash", &["-ic", "history"], FormatVariant::NumberedListing),
        ]
    } else {
        vec![
            HistorySource::file(
                home.join("AppData")
                    .join("Roaming")
                    .join("Microsoft")
                    .join("Windows")
                    .join("PowerShell")
                    .join("PSReadline")
                    .join("ConsoleHost_history.txt"),
                FormatVariant::PlainLine,
            ),
            HistorySource::subprocess("doskey", &["/history"], FormatVariant::PlainLine),
        ]
    }
}
