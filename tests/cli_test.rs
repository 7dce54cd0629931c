use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

const CSV: &str = "Unnamed: 0,repo,tasks\n\
0,detector,object detection\n\
1,segmenter,image segmentation\n\
2,,object tracking\n\
3,tracker,object detection and tracking\n";

fn write_dataset(dir: &Path) -> String {
    let path = dir.join("search_example.csv");
    fs::write(&path, CSV).unwrap();
    path.to_str().unwrap().to_string()
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_searchbench"))
        .args(args)
        .output()
        .expect("Failed to run searchbench")
}

#[test]
fn test_reference_only_run() {
    let dir = tempdir().unwrap();
    let data = write_dataset(dir.path());

    let output = run(&["--data-path", &data, "--query", "detection"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Function 'load_dataset' executed in"), "{}", stdout);
    assert!(stdout.contains("Function 'index_brt' executed in"), "{}", stdout);
    assert!(stdout.contains("Function 'query_brt' executed in"), "{}", stdout);
    // Row with an empty repo is dropped while loading
    assert!(stdout.contains("Found 2 results for query 'detection'"), "{}", stdout);
    assert!(!stdout.contains("faster than"), "{}", stdout);
}

#[test]
fn test_tantivy_comparison() {
    let dir = tempdir().unwrap();
    let data = write_dataset(dir.path());

    let output = run(&["tantivy", "--data-path", &data, "--query", "object"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Function 'index_tantivy' executed in"), "{}", stdout);
    // load + index/query for each of the two backends
    assert_eq!(stdout.matches("executed in").count(), 5, "{}", stdout);
    assert_eq!(stdout.matches("Found 2 results for query 'object'").count(), 2);
    assert!(stdout.contains("brt is "), "{}", stdout);
    assert!(stdout.contains("x faster than tantivy"), "{}", stdout);
}

#[test]
fn test_unknown_backend_fails() {
    let dir = tempdir().unwrap();
    let data = write_dataset(dir.path());

    let output = run(&["nonexistent-backend", "--data-path", &data]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nonexistent-backend"), "{}", stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("faster than"), "{}", stdout);
}

#[test]
fn test_missing_dataset_fails_before_trials() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.csv");

    let output = run(&["--data-path", missing.to_str().unwrap()]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("index_brt"), "{}", stdout);
}

#[test]
fn test_unreachable_elastic_fails() {
    let dir = tempdir().unwrap();
    let data = write_dataset(dir.path());

    let output = run(&[
        "elastic",
        "--data-path",
        &data,
        "--elastic-url",
        "http://127.0.0.1:1",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unavailable"), "{}", stderr);
}

#[test]
fn test_config_file_and_json_summary() {
    let dir = tempdir().unwrap();
    let data = write_dataset(dir.path());
    let config_path = dir.path().join("bench.yaml");
    let yaml = format!(
        r#"
data_path: "{data}"
query: "tracking"
backends: ["tantivy"]
"#,
        data = data
    );
    fs::write(&config_path, yaml).unwrap();

    let output = run(&["--config", config_path.to_str().unwrap(), "--json", "--quiet"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json_start = stdout.find('{').expect("JSON summary on stdout");
    let summary: serde_json::Value = serde_json::from_str(&stdout[json_start..]).unwrap();

    assert_eq!(summary["query"], "tracking");
    assert_eq!(summary["result_counts"]["brt"], 1);
    assert_eq!(summary["result_counts"]["tantivy"], 1);
    assert_eq!(summary["dataset"]["rows"], 3);
    assert!(summary["timings_s"]["index_tantivy"].as_f64().unwrap() >= 0.0);
    assert_eq!(summary["comparisons"][0]["candidate"], "tantivy");
}
