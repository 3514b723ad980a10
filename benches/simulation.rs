use criterion::{black_box, criterion_group, criterion_main, Criterion};
use seird::prelude::*;
use seird::settings::Solver;

fn benchmark_simulation(c: &mut Criterion) {
    let scenario = Scenario::default();
    let solver = Solver::default();

    c.bench_function("simulate_50_points", |b| {
        b.iter(|| {
            let _ = simulate(black_box(&scenario), black_box(&solver));
        });
    });

    let fine = Scenario {
        grid: TimeGrid::linspace(0.0, 150.0, 1500),
        ..Scenario::default()
    };
    c.bench_function("simulate_1500_points", |b| {
        b.iter(|| {
            let _ = simulate(black_box(&fine), black_box(&solver));
        });
    });

    let trajectory = simulate(&scenario, &solver).expect("reference scenario integrates");
    c.bench_function("threshold_crossing", |b| {
        b.iter(|| {
            let _ = threshold_crossing(
                black_box(&trajectory),
                Compartment::Infectious,
                black_box(10.0),
                2,
            );
        });
    });
}

criterion_group!(benches, benchmark_simulation);
criterion_main!(benches);
