//! End-to-end CLI tests that exercise the built binary without requiring a
//! reachable LLM endpoint: configuration failures and the empty-capture path
//! are both decided before any network call.

use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::process::Command;
use std::thread;
use tempfile::TempDir;

fn cmdcast() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cmdcast"))
}

/// Minimal chat-completions endpoint: answers every POST with a canned
/// response so the full analyze pipeline can run against localhost.
fn spawn_stub_llm() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
    let addr = listener.local_addr().expect("stub server addr");

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };

            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }

            let header_end = buf
                .windows(4)
                .position(|w| w == b"\r\n\r\n")
                .map_or(buf.len(), |p| p + 4);
            let content_length = String::from_utf8_lossy(&buf[..header_end])
                .to_lowercase()
                .lines()
                .find_map(|l| l.strip_prefix("content-length:").map(str::trim).and_then(|v| v.parse::<usize>().ok()))
                .unwrap_or(0);
            while buf.len() < header_end + content_length {
                match stream.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }

            let body = r#"{"choices":[{"message":{"content":"git fetch\ngit rebase"}}]}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    format!("http://{}/v1", addr)
}

#[test]
fn test_help_runs() {
    let output = cmdcast().arg("--help").output().expect("run --help");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cmdcast"));
    assert!(stdout.contains("--output-format"));
}

#[test]
fn test_invalid_config_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let config_path = dir.path().join("config.json");
    fs::write(
        &config_path,
        r#"{"history": {"max_commands": 0, "ignore_patterns": [], "include_timestamps": true}}"#,
    )
    .expect("write config");

    let output = cmdcast()
        .arg("--config")
        .arg(&config_path)
        .output()
        .expect("run cmdcast");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("max_commands"));
}

#[test]
fn test_empty_string_ignore_pattern_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let config_path = dir.path().join("config.json");
    fs::write(
        &config_path,
        r#"{"history": {"max_commands": 5, "ignore_patterns": [""], "include_timestamps": true}}"#,
    )
    .expect("write config");

    let output = cmdcast()
        .arg("--config")
        .arg(&config_path)
        .output()
        .expect("run cmdcast");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ignore_patterns"));
}

#[test]
fn test_missing_api_key_is_fatal() {
    let dir = TempDir::new().expect("tempdir");

    let output = cmdcast()
        .arg("--config")
        .arg(dir.path().join("absent.json"))
        .env_remove("GROQ_API_KEY")
        .env("HOME", dir.path())
        .output()
        .expect("run cmdcast");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GROQ_API_KEY"));
}

#[test]
fn test_empty_capture_is_warning_not_error() {
    // Empty HOME: no history files, and the interactive-shell fallback has
    // nothing to list either. Expect a warning and a zero exit with no
    // collaborator calls attempted.
    let dir = TempDir::new().expect("tempdir");

    let output = cmdcast()
        .arg("--config")
        .arg(dir.path().join("absent.json"))
        .env("GROQ_API_KEY", "test-key")
        .env("HOME", dir.path())
        .env("HISTFILE", dir.path().join("no_such_history"))
        .output()
        .expect("run cmdcast");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No commands found"));
}

#[test]
fn test_json_output_is_pure_json() {
    let base_url = spawn_stub_llm();
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join(".bash_history"),
        "git add .\ngit commit -m 'wip'\n",
    )
    .expect("write history");

    let config_path = dir.path().join("config.json");
    fs::write(
        &config_path,
        format!(
            r#"{{
  "history": {{"max_commands": 5, "ignore_patterns": [], "include_timestamps": false}},
  "primary_agent": {{"provider": "groq", "model": "llama3-8b-8192", "max_tokens": 400,
                     "temperature": 0.7, "system_prompt": "summarize", "base_url": "{base_url}"}},
  "secondary_agent": {{"provider": "groq", "model": "llama3-70b-8192", "max_tokens": 400,
                       "temperature": 0.6, "system_prompt": "predict", "base_url": "{base_url}"}},
  "output": {{"save_to_file": true, "output_directory": "{}", "include_raw_commands": false}}
}}"#,
            dir.path().join("outputs").display()
        ),
    )
    .expect("write config");

    let output = cmdcast()
        .arg("--config")
        .arg(&config_path)
        .arg("--output-format")
        .arg("json")
        .env("GROQ_API_KEY", "test-key")
        .env("HOME", dir.path())
        .output()
        .expect("run cmdcast");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // stdout must be one parseable JSON document, nothing appended.
    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("stdout is pure JSON");
    assert_eq!(report["command_count"], 2);
    assert_eq!(report["predicted_commands"][0], "git fetch");

    // The saved-path notice goes to stderr in json mode.
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("saved to"));
}
