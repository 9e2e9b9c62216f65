use canonical::{tokenize, ShingleConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_tokenize(c: &mut Criterion) {
    let config = ShingleConfig::default();
    let mut group = c.benchmark_group("tokenize");

    for size in [64, 512, 4096, 32768].iter() {
        let text = "Word, ".repeat(*size / 6);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(format!("bytes_{size}"), |b| {
            b.iter(|| tokenize(black_box(&text), black_box(&config)).expect("tokenize"))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
