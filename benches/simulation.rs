//! Performance benchmarks for OVERGROWTH

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use overgrowth::kernel::{next_cell, KernelParams};
use overgrowth::{
    Cell, Config, ExecutionStrategy, Grid, HashField, Rgb, SimulationRun, SourceImage, StepEngine,
};

fn gradient(width: usize, height: usize) -> SourceImage {
    SourceImage::from_fn(width, height, |x, y| {
        Rgb::new((x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8)
    })
    .unwrap()
}

fn benchmark_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    let mut config = Config::default();
    config.growth.sample_rate = 0.01;

    for size in [128usize, 256, 512].iter() {
        let image = gradient(*size, *size);

        for (name, strategy) in [
            ("sequential", ExecutionStrategy::Sequential),
            ("parallel", ExecutionStrategy::Parallel),
        ] {
            let engine = StepEngine::new(strategy);
            let mut run = SimulationRun::seed(&image, &config, 42).unwrap();

            // Warm up into the growing phase
            for _ in 0..10 {
                run.tick(&engine).unwrap();
            }

            group.bench_with_input(BenchmarkId::new(name, size), size, |b, _| {
                b.iter(|| {
                    run.tick(&engine).unwrap();
                });
            });
        }
    }

    group.finish();
}

fn benchmark_kernel(c: &mut Criterion) {
    let config = Config::default();
    let params = KernelParams::from(&config.growth);
    let field = HashField::new(7);

    let mut grid = Grid::new(3, 3).unwrap();
    grid.set(0, 0, Cell::occupied(Rgb::new(120, 0, 200)));
    grid.set(2, 2, Cell::occupied(Rgb::new(200, 80, 0)));

    let mut t = 0u64;
    c.bench_function("next_cell_front", |b| {
        b.iter(|| {
            t = t.wrapping_add(1);
            next_cell(black_box(&grid), 1, 1, t, &field, &params)
        });
    });
}

fn benchmark_seeding(c: &mut Criterion) {
    let mut group = c.benchmark_group("seed");
    let config = Config::default();

    for size in [256usize, 1024].iter() {
        let image = gradient(*size, *size);
        group.bench_with_input(BenchmarkId::new("gradient", size), size, |b, _| {
            b.iter(|| SimulationRun::seed(black_box(&image), &config, 42).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_step, benchmark_kernel, benchmark_seeding);
criterion_main!(benches);
