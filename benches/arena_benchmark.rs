use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ordpool::Arena;

fn bench_arena(c: &mut Criterion) {
    let mut group = c.benchmark_group("arena");

    for &n in &[1_000usize, 100_000] {
        group.bench_with_input(BenchmarkId::new("alloc_from_zero", n), &n, |b, &n| {
            b.iter(|| {
                let mut arena = Arena::new();
                for i in 0..n {
                    black_box(arena.alloc(i));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("alloc_presized", n), &n, |b, &n| {
            b.iter(|| {
                let mut arena = Arena::with_capacity(n);
                for i in 0..n {
                    black_box(arena.alloc(i));
                }
            });
        });

        // Baseline: one Box per object
        group.bench_with_input(BenchmarkId::new("box_per_object", n), &n, |b, &n| {
            b.iter(|| {
                let boxes: Vec<Box<usize>> = (0..n).map(|i| Box::new(black_box(i))).collect();
                black_box(boxes);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_arena);
criterion_main!(benches);
