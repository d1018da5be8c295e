use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "pullsim-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_presets_writes_output() {
    let exe = env!("CARGO_BIN_EXE_pullsim");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-presets", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available presets"));
    assert!(content.contains("1/1/1/1 (5, 3)"));
}

#[test]
fn cli_json_report_is_reproducible_with_seed() {
    let exe = env!("CARGO_BIN_EXE_pullsim");
    let run = |label: &str| {
        let output_path = temp_path(label);
        let status = Command::new(exe)
            .args([
                "--preset",
                "hero-fest",
                "--goal",
                "Any Focus",
                "--count",
                "2",
                "--seed",
                "1234",
                "--initial-batch",
                "256",
                "--max-rounds",
                "2",
                "--budget-ms",
                "60000",
                "--report",
                "json",
                "--output",
            ])
            .arg(&output_path)
            .status()
            .expect("run cli");
        assert!(status.success());
        let text = std::fs::read_to_string(output_path).expect("read output");
        let value: serde_json::Value = serde_json::from_str(&text).expect("json report");
        value
    };
    let first = run("seeded-a");
    let second = run("seeded-b");
    assert_eq!(first["samples"], 768);
    assert_eq!(first["goal"], "Any Focus x2");
    assert_eq!(first["percentiles"], second["percentiles"]);
    assert_eq!(first["summary"], second["summary"]);
}

#[test]
fn cli_rejects_unreachable_goal() {
    let exe = env!("CARGO_BIN_EXE_pullsim");
    let output = Command::new(exe)
        .args(["--banner", "0/2/0/0 (3, 3)", "--goal", "red", "--report", "json"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot be completed"), "stderr: {stderr}");
}

#[test]
fn cli_rejects_bad_percentiles() {
    let exe = env!("CARGO_BIN_EXE_pullsim");
    let output = Command::new(exe)
        .args(["--percentiles", "0.5,2", "--max-rounds", "1", "--initial-batch", "8"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
}
