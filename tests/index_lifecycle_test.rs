use std::fs;

use tempfile::TempDir;

use ragdex::vector::index::flat;
use ragdex::{ChunkRecord, IndexBuilder, IndexConfig, SearchEngine, SearchMode, Vector};

fn scenario_records() -> Vec<(ChunkRecord, Vector)> {
    vec![
        (
            ChunkRecord::new(1, 0, 40, "Employees accrue earned leave monthly."),
            Vector::new(vec![1.0, 0.0, 0.0, 0.0]),
        ),
        (
            ChunkRecord::new(1, 20, 60, "Remote work requires manager approval."),
            Vector::new(vec![0.0, 1.0, 0.0, 0.0]),
        ),
        (
            ChunkRecord::new(2, 0, 35, "Unused leave carries over up to ten days."),
            Vector::new(vec![1.0, 1.0, 0.0, 0.0]),
        ),
    ]
}

fn expected_mode() -> SearchMode {
    if flat::is_available() {
        SearchMode::Accelerated
    } else {
        SearchMode::BruteForce
    }
}

#[test]
fn test_build_open_search_scenario() -> ragdex::Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let result = IndexBuilder::default().build(scenario_records(), temp_dir.path())?;
    assert_eq!(result.count, 3);
    assert_eq!(result.dimension, 4);
    assert_eq!(result.accelerated, flat::is_available());

    let engine = SearchEngine::open(temp_dir.path())?;
    assert_eq!(engine.len(), 3);
    assert_eq!(engine.dimension(), 4);
    assert_eq!(engine.mode(), expected_mode());

    let hits = engine.search(&[1.0, 0.0, 0.0, 0.0], 2)?;
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].position, 0);
    assert!((hits[0].score - 1.0).abs() < 1e-5);
    assert_eq!(hits[1].position, 2);
    assert!((hits[1].score - 0.70710677).abs() < 1e-5);
    assert!(hits.iter().all(|hit| hit.position != 1));
    assert_eq!(hits[1].record.page, 2);
    Ok(())
}

#[test]
fn test_top_k_larger_than_index() -> ragdex::Result<()> {
    let temp_dir = TempDir::new().unwrap();
    IndexBuilder::default().build(scenario_records(), temp_dir.path())?;
    let engine = SearchEngine::open(temp_dir.path())?;

    let hits = engine.search(&[0.2, 0.3, 0.0, 0.0], 10)?;
    assert_eq!(hits.len(), 3);

    let mut positions: Vec<usize> = hits.iter().map(|hit| hit.position).collect();
    positions.sort_unstable();
    assert_eq!(positions, vec![0, 1, 2]);
    Ok(())
}

#[test]
fn test_artifacts_on_disk() -> ragdex::Result<()> {
    let temp_dir = TempDir::new().unwrap();
    IndexBuilder::default().build(scenario_records(), temp_dir.path())?;

    let npy = fs::read(temp_dir.path().join("embeddings.npy")).unwrap();
    assert_eq!(&npy[..6], b"\x93NUMPY");
    let header = String::from_utf8_lossy(&npy[10..64]);
    assert!(header.contains("'descr': '<f4'"));
    assert!(header.contains("'shape': (3, 4)"));

    let meta: serde_json::Value =
        serde_json::from_slice(&fs::read(temp_dir.path().join("meta.json")).unwrap()).unwrap();
    let entries = meta.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    for key in ["chunk_id", "page", "start", "end", "text"] {
        assert!(entries[0].get(key).is_some(), "missing key {key}");
    }

    let manifest: serde_json::Value =
        serde_json::from_slice(&fs::read(temp_dir.path().join("manifest.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["count"], 3);
    assert_eq!(manifest["dimension"], 4);
    assert_eq!(
        temp_dir.path().join("index.flat").exists(),
        flat::is_available()
    );
    Ok(())
}

#[test]
fn test_build_is_deterministic() -> ragdex::Result<()> {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    IndexBuilder::default().build(scenario_records(), first.path())?;
    IndexBuilder::default().build(scenario_records(), second.path())?;

    for name in ["embeddings.npy", "meta.json"] {
        assert_eq!(
            fs::read(first.path().join(name)).unwrap(),
            fs::read(second.path().join(name)).unwrap(),
            "{name} differs between identical builds"
        );
    }
    Ok(())
}

#[test]
fn test_rebuild_replaces_previous_build() -> ragdex::Result<()> {
    let temp_dir = TempDir::new().unwrap();
    IndexBuilder::default().build(scenario_records(), temp_dir.path())?;

    let smaller: Vec<_> = scenario_records().into_iter().take(2).collect();
    IndexBuilder::default().build(smaller, temp_dir.path())?;

    let engine = SearchEngine::open(temp_dir.path())?;
    assert_eq!(engine.len(), 2);
    assert_eq!(engine.search(&[1.0, 1.0, 0.0, 0.0], 5)?.len(), 2);
    Ok(())
}

#[test]
fn test_degraded_rebuild_removes_stale_accelerated_artifact() -> ragdex::Result<()> {
    let temp_dir = TempDir::new().unwrap();
    IndexBuilder::default().build(scenario_records(), temp_dir.path())?;

    let config = IndexConfig::builder().accelerate(false).build()?;
    let result = IndexBuilder::new(config)?.build(scenario_records(), temp_dir.path())?;
    assert!(!result.accelerated);
    assert!(!temp_dir.path().join("index.flat").exists());

    let engine = SearchEngine::open(temp_dir.path())?;
    assert_eq!(engine.mode(), SearchMode::BruteForce);
    assert_eq!(engine.search(&[1.0, 0.0, 0.0, 0.0], 1)?[0].position, 0);
    Ok(())
}

#[test]
fn test_build_rejects_invalid_batches() {
    let temp_dir = TempDir::new().unwrap();
    let builder = IndexBuilder::default();

    assert!(builder.build(vec![], temp_dir.path()).unwrap_err().is_input());

    let mut mixed = scenario_records();
    mixed[1].1 = Vector::new(vec![0.0, 1.0, 0.0]);
    assert!(builder.build(mixed, temp_dir.path()).unwrap_err().is_input());

    let mut nan = scenario_records();
    nan[2].1 = Vector::new(vec![f32::NAN, 0.0, 0.0, 0.0]);
    assert!(builder.build(nan, temp_dir.path()).unwrap_err().is_input());

    // Nothing was published.
    assert!(SearchEngine::open(temp_dir.path()).unwrap_err().is_not_found());
}
