use std::io::Write;

use criterion::{criterion_group, criterion_main, Criterion};
use tempfile::TempPath;

use scmp_core::{FileComparer, LengthCompare, StreamComparer};

fn payload() -> Vec<u8> {
    (0..=255).cycle().take(1024 * 1024).collect()
}

fn create_tmp_file(payload: &[u8]) -> TempPath {
    let mut f = tempfile::NamedTempFile::new().expect("failed creating temporary file");
    f.write_all(payload)
        .expect("failed to write payload to temporary file");
    f.into_temp_path()
}

fn bench_file_compare(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("failed to start runtime");
    let payload = payload();
    let (path1, path2) = (create_tmp_file(&payload), create_tmp_file(&payload));

    let mut comparer = FileComparer::new();
    c.bench_function("file_compare_1m", |b| {
        b.iter(|| rt.block_on(comparer.are_equal(&path1, &path2)).unwrap())
    });
}

fn bench_stream_compare(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("failed to start runtime");
    let payload = payload();

    let mut group = c.benchmark_group("stream_compare_1m");
    for buffer_size in [1024, 4096, 65536] {
        let mut comparer = StreamComparer::with_buffer_size(buffer_size).unwrap();
        group.bench_function(buffer_size.to_string(), |b| {
            b.iter(|| {
                let (mut s1, mut s2) = (&payload[..], &payload[..]);
                rt.block_on(comparer.are_equal(&mut s1, &mut s2, LengthCompare::Never))
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_file_compare, bench_stream_compare);
criterion_main!(benches);
