//! Case-insensitive substring exclusion of captured commands.

/// Drops any command containing one of the configured patterns as a
/// case-insensitive substring. Patterns apply uniformly regardless of which
/// source variant produced the command.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    patterns: Vec<String>,
}

impl ExclusionFilter {
    /// Patterns are lowercased once here; the configuration layer rejects
    /// empty-string patterns before they reach this point (an empty pattern
    /// would match every command).
    pub fn new(patterns: &[String]) -> Self {
        Self {
            patterns: patterns.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True if any configured pattern occurs anywhere in the command text.
    pub fn matches(&self, command: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let lowered = command.to_lowercase();
        self.patterns.iter().any(|p| lowered.contains(p))
    }

    /// Remove matching commands entirely, preserving the order of survivors.
    pub fn apply(&self, commands: Vec<String>) -> Vec<String> {
        if self.patterns.is_empty() {
            return commands;
        }
        commands.into_iter().filter(|c| !self.matches(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_case_insensitive_matching() {
        let filter = ExclusionFilter::new(&["git".to_string()]);
        assert!(filter.matches("git status"));
        assert!(filter.matches("GIT PUSH"));
        assert!(filter.matches("cd my-Git-repo"));
        assert!(!filter.matches("cargo build"));
    }

    #[test]
    fn test_substring_matches_anywhere() {
        let filter = ExclusionFilter::new(&["pass".to_string()]);
        assert!(filter.matches("passwd"));
        assert!(filter.matches("echo mypassword"));
    }

    #[test]
    fn test_empty_pattern_set_passes_everything() {
        let filter = ExclusionFilter::new(&[]);
        let input = commands(&["ls", "pwd", "clear"]);
        assert_eq!(filter.apply(input.clone()), input);
    }

    #[test]
    fn test_apply_preserves_order() {
        let filter = ExclusionFilter::new(&["ls".to_string(), "clear".to_string()]);
        let survivors = filter.apply(commands(&["ls -la", "git diff", "clear", "make test"]));
        assert_eq!(survivors, commands(&["git diff", "make test"]));
    }

    #[test]
    fn test_dropped_not_redacted() {
        let filter = ExclusionFilter::new(&["secret".to_string()]);
        let survivors = filter.apply(commands(&["export SECRET_KEY=abc", "echo ok"]));
        assert_eq!(survivors, commands(&["echo ok"]));
    }
}
