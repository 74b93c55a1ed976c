use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gitrail_core::{layout_graph, CommitRecord, DiffAlgorithm, DiffEngine};

fn source(lines: usize, stride: usize, tag: &str) -> String {
    (0..lines)
        .map(|i| {
            if i % stride == 0 {
                format!("let value_{i} = {tag};")
            } else {
                format!("let value_{i} = {i};")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn history(len: usize) -> Vec<CommitRecord> {
    (0..len)
        .map(|i| {
            let id = format!("c{i}");
            let parents: Vec<String> = match i {
                0 => Vec::new(),
                i if i % 10 == 0 => vec![format!("c{}", i - 1), format!("c{}", i - 5)],
                i => vec![format!("c{}", i - 1)],
            };
            CommitRecord::new(id, parents, i as i64)
        })
        .collect()
}

fn bench_diff(c: &mut Criterion) {
    let old = source(2_000, 17, "old");
    let new = source(2_000, 23, "new");

    let lcs = DiffEngine::new();
    c.bench_function("diff_lcs_2k", |b| {
        b.iter(|| lcs.diff_strings(black_box(&old), black_box(&new)))
    });

    let histogram = DiffEngine::new().with_algorithm(DiffAlgorithm::Histogram);
    c.bench_function("diff_histogram_2k", |b| {
        b.iter(|| histogram.diff_strings(black_box(&old), black_box(&new)))
    });

    let diff = lcs.diff_strings(&old, &new);
    c.bench_function("align_2k", |b| b.iter(|| black_box(&diff).aligned()));
}

fn bench_layout(c: &mut Criterion) {
    let commits = history(5_000);
    c.bench_function("layout_5k", |b| b.iter(|| layout_graph(black_box(&commits))));
}

criterion_group!(benches, bench_diff, bench_layout);
criterion_main!(benches);
