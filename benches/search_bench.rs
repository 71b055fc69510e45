use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::RngExt;
use ragdex::vector::index::flat::FlatIndex;
use ragdex::vector::RecordStore;
use ragdex::{ChunkRecord, IndexBuilder, SearchEngine, Vector};

fn generate_random_vector(dim: usize) -> Vector {
    let mut rng = rand::rng();
    let data: Vec<f32> = (0..dim).map(|_| rng.random::<f32>() - 0.5).collect();
    Vector::new(data)
}

fn generate_records(count: usize, dim: usize) -> Vec<(ChunkRecord, Vector)> {
    (0..count)
        .map(|i| {
            let page = 1 + (i / 10) as u32;
            let record = ChunkRecord::new(page, i * 100, i * 100 + 120, format!("chunk {i}"));
            (record, generate_random_vector(dim))
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("Index Build");
    group.sample_size(10);
    let dim = 384;
    let counts = [1000, 5000];

    for count in counts.iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let records = generate_records(count, dim);
            let dir = tempfile::tempdir().unwrap();
            let builder = IndexBuilder::default();
            b.iter(|| builder.build(records.clone(), dir.path()).unwrap())
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("Search");
    group.sample_size(20);
    let dim = 384;
    let count = 20_000;
    let top_k = 5;

    let dir = tempfile::tempdir().unwrap();
    IndexBuilder::default()
        .build(generate_records(count, dim), dir.path())
        .unwrap();
    let store = RecordStore::load(dir.path()).unwrap();
    let index = FlatIndex::build(dim, store.vectors().to_vec()).unwrap();
    let brute = SearchEngine::with_index(store.clone(), None).unwrap();
    let accelerated = SearchEngine::with_index(store, Some(index)).unwrap();

    let query = generate_random_vector(dim);

    group.throughput(Throughput::Elements(count as u64));
    group.bench_function("brute_force", |b| {
        b.iter(|| brute.search(query.as_slice(), top_k).unwrap())
    });
    group.bench_function("accelerated", |b| {
        b.iter(|| accelerated.search(query.as_slice(), top_k).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_search);
criterion_main!(benches);
