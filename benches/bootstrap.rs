use abstat::{mean_effect, ratio_effect, Group, RatioGroup, RatioMethod};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

fn session_group(group: Group, n: usize, seed: u64) -> RatioGroup {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut clicks = Vec::with_capacity(n);
    let mut sessions = Vec::with_capacity(n);
    for _ in 0..n {
        let s = rng.gen_range(1..=8) as f64;
        clicks.push((s * rng.gen::<f64>()).round());
        sessions.push(s);
    }
    RatioGroup::new(group, clicks, sessions).unwrap()
}

fn bench_ratio_bootstrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("ratio_bootstrap");
    group.sample_size(10);
    for &(n, resamples) in &[(1_000usize, 500usize), (10_000, 500), (10_000, 2_000)] {
        let a = session_group(Group::A, n, 1);
        let b = session_group(Group::B, n, 2);
        group.bench_with_input(
            BenchmarkId::new(format!("n{}", n), resamples),
            &resamples,
            |bench, &resamples| {
                bench.iter(|| {
                    // Fixed seed keeps every iteration on the same replicate streams.
                    let r = ratio_effect(&a, &b, RatioMethod::bootstrap(resamples, 42), 0.95);
                    black_box(r.map(|r| r.ci_high))
                });
            },
        );
    }
    group.finish();
}

fn bench_closed_form(c: &mut Criterion) {
    let mut group = c.benchmark_group("closed_form");
    let a = session_group(Group::A, 100_000, 3);
    let b = session_group(Group::B, 100_000, 4);
    group.bench_function("ratio_delta_100k", |bench| {
        bench.iter(|| black_box(ratio_effect(&a, &b, RatioMethod::Delta, 0.95).map(|r| r.p_value)));
    });
    group.bench_function("mean_welch_100k", |bench| {
        bench.iter(|| black_box(mean_effect(a.numerators(), b.numerators(), 0.95).map(|r| r.p_value)));
    });
    group.finish();
}

criterion_group!(benches, bench_ratio_bootstrap, bench_closed_form);
criterion_main!(benches);
