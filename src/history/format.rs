use super::capture::CommandRecord;

/// Defined sentinel for an empty capture so downstream collaborators never
/// receive an ambiguous empty string.
pub const NO_COMMANDS_SENTINEL: &str = "No recent commands found.";

/// Render captured commands into the single plain-text block handed to the
/// analysis collaborators. Pure function of the record list; formatting the
/// same list twice yields byte-identical output.
pub fn format_for_analysis(records: &[CommandRecord], include_timestamps: bool) -> String {
    if records.is_empty() {
        return NO_COMMANDS_SENTINEL.to_string();
    }

    let mut formatted = String::from("Recent Terminal Commands:\n");
    formatted.push_str(&"=".repeat(30));
    formatted.push('\n');

    for record in records {
        formatted.push_str(&format!("{}. {}\n", record.sequence_index, record.text));
        if include_timestamps {
            formatted.push_str(&format!(
                "   Time: {}\n",
                record.captured_at.format("%Y-%m-%d %H:%M:%S")
            ));
        }
    }

    formatted
}
