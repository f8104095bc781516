use criterion::{criterion_group, criterion_main};


criterion_group!(
    benches,
    sequence_bench::bench_insert,
    sequence_bench::bench_neighbour_lookup
);
criterion_main!(benches);
