use regex::Regex;
use std::sync::OnceLock;

/// Recognized on-disk/subprocess history layouts. Each source descriptor
/// carries its variant so the format is decided once at detection time, not
/// re-inferred from path strings per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVariant {
    /// One command per line, trimmed (bash history, PSReadline).
    PlainLine,
    /// zsh extended history: `: <epoch>:<duration>;<command>`. Lines without
    /// the metadata marker are treated as plain lines.
    MetadataPrefixed,
    /// Interactive `history` listing with a leading numeric index.
    NumberedListing,
}

fn listing_index_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\d+\s*").expect("listing index regex"))
}

impl FormatVariant {
    pub fn name(&self) -> &str {
        match self {
            FormatVariant::PlainLine => "plain-line",
            FormatVariant::MetadataPrefixed => "metadata-prefixed",
            FormatVariant::NumberedListing => "numbered-listing",
        }
    }

    /// Normalize one raw line into a command, or None if nothing survives
    /// the variant's stripping rules.
    pub fn parse_line(&self, raw: &str) -> Option<String> {
        let line = raw.trim();
        if line.is_empty() {
            return None;
        }

        let command = match self {
            FormatVariant::PlainLine => line.to_string(),
            FormatVariant::MetadataPrefixed => {
                if line.starts_with(':') && line.contains(';') {
                    match line.split_once(';') {
                        Some((_, rest)) => rest.trim().to_string(),
                        None => line.to_string(),
                    }
                } else {
                    line.to_string()
                }
            }
            FormatVariant::NumberedListing => {
                listing_index_re().replace(line, "").trim().to_string()
            }
        };

        if command.is_empty() {
            None
        } else {
            Some(command)
        }
    }

    /// Normalize a decoded source into ordered commands, oldest first.
    /// Lines that strip down to nothing are dropped, not kept as blanks.
    pub fn parse_lines(&self, content: &str) -> Vec<String> {
        content
            .lines()
            .filter_map(|line| self.parse_line(line))
            .collect()
    }
}

/// Best-effort decoding: legacy shells write platform-default encodings, so
/// undecodable bytes are substituted rather than failing the whole read.
pub fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
