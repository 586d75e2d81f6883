use std::fs;

use tempfile::tempdir;

use super::capture::{truncate_and_index, HistoryCapture};
use super::source::Platform;
use crate::filter::ExclusionFilter;

#[test]
fn test_truncation_keeps_tail_and_reindexes() {
    let commands: Vec<String> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let records = truncate_and_index(commands, 3);

    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["c", "d", "e"]);

    let indices: Vec<usize> = records.iter().map(|r| r.sequence_index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
}

#[test]
fn test_truncation_shorter_than_max() {
    let commands = vec!["one".to_string(), "two".to_string()];
    let records = truncate_and_index(commands, 10);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].sequence_index, 1);
    assert_eq!(records[1].sequence_index, 2);
}

#[test]
fn test_sequence_indices_are_contiguous() {
    let commands: Vec<String> = (0..20).map(|i| format!("cmd-{}", i)).collect();
    let records = truncate_and_index(commands, 7);
    assert_eq!(records.len(), 7);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.sequence_index, i + 1);
    }
}

#[tokio::test]
async fn test_capture_reads_bash_history() {
    let home = tempdir().expect("tempdir");
    fs::write(
        home.path().join(".bash_history"),
        "cd project\ncargo build\ncargo test\n",
    )
    .expect("write history");

    let capture = HistoryCapture::new(Platform::Linux, 5).with_home(home.path().to_path_buf());
    let records = capture.capture(&ExclusionFilter::new(&[])).await;

    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["cd project", "cargo build", "cargo test"]);
}

#[tokio::test]
async fn test_capture_respects_max_commands() {
    let home = tempdir().expect("tempdir");
    let lines: Vec<String> = (1..=10).map(|i| format!("echo {}", i)).collect();
    fs::write(home.path().join(".bash_history"), lines.join("\n")).expect("write history");

    let capture = HistoryCapture::new(Platform::Linux, 3).with_home(home.path().to_path_buf());
    let records = capture.capture(&ExclusionFilter::new(&[])).await;

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].text, "echo 8");
    assert_eq!(records[2].text, "echo 10");
}

#[tokio::test]
async fn test_capture_prefers_bash_over_zsh() {
    let home = tempdir().expect("tempdir");
    fs::write(home.path().join(".bash_history"), "from bash\n").expect("write bash");
    fs::write(home.path().join(".zsh_history"), ": 1700000000:0;from zsh\n").expect("write zsh");

    let capture = HistoryCapture::new(Platform::Linux, 5).with_home(home.path().to_path_buf());
    let records = capture.capture(&ExclusionFilter::new(&[])).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text, "from bash");
}

#[tokio::test]
async fn test_capture_falls_through_to_zsh() {
    let home = tempdir().expect("tempdir");
    fs::write(
        home.path().join(".zsh_history"),
        ": 1700000000:0;git status\n: 1700000001:2;git push origin main\n",
    )
    .expect("write zsh");

    let capture = HistoryCapture::new(Platform::Linux, 5).with_home(home.path().to_path_buf());
    let records = capture.capture(&ExclusionFilter::new(&[])).await;

    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["git status", "git push origin main"]);
}

#[tokio::test]
async fn test_capture_applies_ignore_patterns() {
    let home = tempdir().expect("tempdir");
    fs::write(
        home.path().join(".bash_history"),
        "ls -la\ngit commit -m 'fix'\nclear\nLS /tmp\n",
    )
    .expect("write history");

    let filter = ExclusionFilter::new(&["ls".to_string(), "clear".to_string()]);
    let capture = HistoryCapture::new(Platform::Linux, 10).with_home(home.path().to_path_buf());
    let records = capture.capture(&filter).await;

    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["git commit -m 'fix'"]);
}

#[tokio::test]
async fn test_capture_survives_invalid_bytes() {
    let home = tempdir().expect("tempdir");
    let mut bytes = b"echo before\n".to_vec();
    bytes.extend_from_slice(&[0xc3, 0x28, 0xff, b'\n']);
    bytes.extend_from_slice(b"echo after\n");
    fs::write(home.path().join(".bash_history"), bytes).expect("write history");

    let capture = HistoryCapture::new(Platform::Linux, 10).with_home(home.path().to_path_buf());
    let records = capture.capture(&ExclusionFilter::new(&[])).await;

    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
    assert!(texts.contains(&"echo before"));
    assert!(texts.contains(&"echo after"));
}

#[tokio::test]
async fn test_capture_with_no_sources_is_empty() {
    let home = tempdir().expect("tempdir");

    // Windows candidates inside an empty tempdir: no PSReadline file, and
    // doskey does not exist on this host, so both candidates fall through.
    let capture = HistoryCapture::new(Platform::Windows, 5).with_home(home.path().to_path_buf());
    let records = capture.capture(&ExclusionFilter::new(&[])).await;

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_no_record_is_empty_or_excluded() {
    let home = tempdir().expect("tempdir");
    fs::write(
        home.path().join(".bash_history"),
        "\n\n  \npasswd root\necho done\n",
    )
    .expect("write history");

    let filter = ExclusionFilter::new(&["passwd".to_string()]);
    let capture = HistoryCapture::new(Platform::Linux, 10).with_home(home.path().to_path_buf());
    let records = capture.capture(&filter).await;

    for record in &records {
        assert!(!record.text.is_empty());
        assert!(!record.text.to_lowercase().contains("passwd"));
    }
    assert_eq!(records.len(), 1);
}
