use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::TempDir;

use ragdex::{ChunkRecord, EngineCell, IndexBuilder, Vector};

fn build_index(path: &std::path::Path) {
    let records = vec![
        (ChunkRecord::new(1, 0, 10, "first"), Vector::new(vec![1.0, 0.0])),
        (ChunkRecord::new(1, 8, 20, "second"), Vector::new(vec![0.0, 1.0])),
    ];
    IndexBuilder::default().build(records, path).unwrap();
}

#[test]
fn test_concurrent_first_use_opens_once() {
    let temp_dir = TempDir::new().unwrap();
    build_index(temp_dir.path());

    let cell = Arc::new(EngineCell::new(temp_dir.path()));
    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cell = Arc::clone(&cell);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cell.get_or_open().unwrap()
            })
        })
        .collect();

    let engines: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for engine in &engines[1..] {
        assert!(Arc::ptr_eq(&engines[0], engine));
    }
    assert!(Arc::ptr_eq(&engines[0], &cell.get().unwrap()));
}

#[test]
fn test_shared_engine_serves_concurrent_searches() {
    let temp_dir = TempDir::new().unwrap();
    build_index(temp_dir.path());
    let engine = EngineCell::new(temp_dir.path()).get_or_open().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let query = if i % 2 == 0 { [1.0, 0.1] } else { [0.1, 1.0] };
                engine.search(&query, 1).unwrap()[0].position
            })
        })
        .collect();

    let positions: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(positions, vec![0, 1, 0, 1]);
}

#[test]
fn test_failed_open_is_retried() {
    let temp_dir = TempDir::new().unwrap();
    let cell = EngineCell::new(temp_dir.path());

    assert!(cell.get_or_open().unwrap_err().is_not_found());
    assert!(cell.get().is_none());

    build_index(temp_dir.path());
    let engine = cell.get_or_open().unwrap();
    assert_eq!(engine.len(), 2);
    assert!(cell.is_open());
}
