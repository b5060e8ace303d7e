use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn dur_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("dur");
    path
}

fn run_dur(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = dur_binary();
    let output = Command::new(&binary)
        .current_dir(dir)
        .args(args)
        .env_remove("DATA_GO_KR_API_KEY")
        .env_remove("DUR_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run dur binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Config pointing at a closed local port so no real request can succeed.
fn write_offline_config(dir: &Path) -> PathBuf {
    let path = dir.join("dur.toml");
    fs::write(
        &path,
        r#"[api]
dur_url = "http://127.0.0.1:9/dur"
drug_info_url = "http://127.0.0.1:9/info"
timeout_secs = 1

[collect]
max_pages = 1
page_delay_ms = 0
lookup_delay_ms = 0
output = "out.csv"
"#,
    )
    .unwrap();
    path
}

#[test]
fn test_collect_without_key_fails_before_network() {
    let tmp = TempDir::new().unwrap();
    let config = write_offline_config(tmp.path());

    let (stdout, stderr, ok) = run_dur(
        tmp.path(),
        &["--config", config.to_str().unwrap(), "collect", "--progress", "off"],
    );

    assert!(!ok, "collect should fail without a key: {}", stdout);
    assert!(stderr.contains("DATA_GO_KR_API_KEY"), "stderr: {}", stderr);
    assert!(!stderr.contains("Fetching"), "no page should be requested: {}", stderr);
    assert!(!tmp.path().join("out.csv").exists());
}

#[test]
fn test_collect_honors_custom_key_env() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("dur.toml");
    fs::write(&config, "[api]\nkey_env = \"MY_DUR_KEY\"\n").unwrap();

    let output = Command::new(dur_binary())
        .current_dir(tmp.path())
        .args(["--config", config.to_str().unwrap(), "collect"])
        .env_remove("MY_DUR_KEY")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MY_DUR_KEY"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("dur.toml");
    fs::write(&config, "[collect]\nmax_pages = 0\n").unwrap();

    let (_, stderr, ok) = run_dur(tmp.path(), &["--config", config.to_str().unwrap(), "categories"]);

    assert!(!ok);
    assert!(stderr.contains("max_pages"), "stderr: {}", stderr);
}

#[test]
fn test_sample_writes_csv_and_json() {
    let tmp = TempDir::new().unwrap();

    let (stdout, stderr, ok) = run_dur(
        tmp.path(),
        &["sample", "--csv", "data/drugs.csv", "--json", "data/emr.json"],
    );
    assert!(ok, "sample failed: {}", stderr);
    assert!(stdout.contains("29 rows"), "stdout: {}", stdout);

    let csv = fs::read(tmp.path().join("data/drugs.csv")).unwrap();
    assert!(csv.starts_with(b"\xEF\xBB\xBF"));
    let text = String::from_utf8(csv[3..].to_vec()).unwrap();
    assert!(text.starts_with("drug_name,ingredient,interaction_type,caution_text"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("data/emr.json")).unwrap())
            .unwrap();
    assert_eq!(json["metadata"]["total_drugs"], 24);
    assert!(json["interaction_matrix"]["Losartan"].is_object());
}

#[test]
fn test_preview_reads_written_table() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, ok) = run_dur(tmp.path(), &["sample", "--csv", "s.csv", "--json", "s.json"]);
    assert!(ok, "sample failed: {}", stderr);

    let (stdout, stderr, ok) = run_dur(tmp.path(), &["preview", "s.csv", "--rows", "3"]);
    assert!(ok, "preview failed: {}", stderr);
    assert!(stdout.contains("아몰디핀정 5mg"));
    assert!(stdout.contains("Rows:                29"), "stdout: {}", stdout);
    assert!(stdout.contains("hypertension"));
}

#[test]
fn test_categories_lists_builtin_tables() {
    let tmp = TempDir::new().unwrap();
    let (stdout, _, ok) = run_dur(tmp.path(), &["categories"]);
    assert!(ok);
    assert!(stdout.contains("diabetes"));
    assert!(stdout.contains("hypertension"));
    assert!(stdout.contains("metformin"));
}

#[test]
fn test_completions_ignore_config() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("dur.toml");
    fs::write(&config, "[collect]\nmax_pages = 0\n").unwrap();

    let (stdout, stderr, ok) = run_dur(
        tmp.path(),
        &["--config", config.to_str().unwrap(), "completions", "zsh"],
    );
    assert!(ok, "completions failed: {}", stderr);
    assert!(stdout.contains("collect"));
}

#[test]
fn test_completions_generate_script() {
    let tmp = TempDir::new().unwrap();
    let (stdout, _, ok) = run_dur(tmp.path(), &["completions", "bash"]);
    assert!(ok);
    assert!(stdout.contains("dur"));
    assert!(stdout.contains("collect"));
}
