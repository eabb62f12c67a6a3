use std::process::{Command, Output};

fn lymegpt(config_dir: &std::path::Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lymegpt"))
        .arg("--config-dir")
        .arg(config_dir)
        .args(args)
        .env_remove("LYMEGPT_KB_ENDPOINT")
        .env_remove("AWS_REGION")
        .env_remove("AWS_DEFAULT_REGION")
        .output()
        .expect("Failed to run lymegpt")
}

#[test]
fn test_status_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let output = lymegpt(dir.path(), &["status"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("InvokeKnowledgeBase"));
    assert!(stdout.contains("127.0.0.1:8501"));
    assert!(stdout.contains("60s"));
}

#[test]
fn test_status_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = serde_json::json!({
        "knowledge_base": { "backend": "http", "endpoint": "https://kb.example.com/ask" },
        "server": { "port": 9000 }
    });
    std::fs::write(dir.path().join("config.json"), config.to_string()).unwrap();

    let output = lymegpt(dir.path(), &["status"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("https://kb.example.com/ask"));
    assert!(stdout.contains(":9000"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = serde_json::json!({ "knowledge_base": { "backend": "http" } });
    std::fs::write(dir.path().join("config.json"), config.to_string()).unwrap();

    let output = lymegpt(dir.path(), &["status"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("endpoint"));
}
