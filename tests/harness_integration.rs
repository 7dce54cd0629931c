use anyhow::Result;
use polars::prelude::*;
use searchbench::backends::{BackendRegistry, ColumnarBackend, RowTantivyBackend};
use searchbench::dataset::Dataset;
use std::io::Write;
use tempfile::NamedTempFile;

fn registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new(Box::new(ColumnarBackend::new(50_000_000)));
    registry.register(Box::new(RowTantivyBackend::new(50_000_000)));
    registry
}

/// Both tantivy backends agree on the number of matches
#[test]
fn test_backends_agree_on_counts() -> Result<()> {
    let df = df! {
        "repo" => ["yolov5", "detectron2", "whisper"],
        "tasks" => ["object detection", "keypoint detection", "speech recognition"],
    }?;
    let dataset = Dataset::from_frame(df, &[])?;

    let mut harness = searchbench::runner::Harness::new(registry());
    let outcome = harness.run(&dataset, "detection", &["tantivy".to_string()])?;

    assert_eq!(outcome.trials.len(), 2);
    assert!(outcome.trials.iter().all(|t| t.result_count == 2));
    assert_eq!(outcome.comparisons.len(), 1);
    assert!(outcome.comparisons[0].ratio > 0.0);
    Ok(())
}

/// Loading through the harness is timed and cleans the frame
#[test]
fn test_timed_load() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "Unnamed: 0,repo,tasks")?;
    writeln!(file, "0,yolov5,object detection")?;
    writeln!(file, "1,,object tracking")?;
    file.flush()?;

    let mut harness = searchbench::runner::Harness::new(registry());
    let dataset = harness.load_dataset(file.path(), &["Unnamed: 0".to_string()])?;

    assert_eq!(dataset.height(), 1);
    assert_eq!(dataset.column_names(), vec!["repo", "tasks"]);
    assert!(harness.timings().contains("load_dataset"));
    Ok(())
}
