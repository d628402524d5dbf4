//! Integration tests for OVERGROWTH

use overgrowth::{
    Cell, Config, Convergence, ExecutionStrategy, Grid, GrowthError, QualityMode, Rgb,
    Scheduler, SchedulerState, SimulationRun, SourceImage, StepEngine,
};
use std::time::{Duration, Instant};

fn gradient(width: usize, height: usize) -> SourceImage {
    SourceImage::from_fn(width, height, |x, y| {
        Rgb::new((x * 7 % 256) as u8, (y * 11 % 256) as u8, ((x ^ y) % 256) as u8)
    })
    .unwrap()
}

#[test]
fn test_occupied_cells_never_change() {
    let image = gradient(48, 32);
    let mut config = Config::default();
    config.growth.sample_rate = 0.05;
    let mut run = SimulationRun::seed(&image, &config, 12345).unwrap();
    let engine = StepEngine::default();

    for _ in 0..60 {
        let before = run.current_grid().unwrap().clone();
        run.tick(&engine).unwrap();
        let after = run.current_grid().unwrap();

        for (old, new) in before.cells().iter().zip(after.cells()) {
            if old.occupied {
                assert_eq!(old, new);
            }
        }
        assert!(after.occupied_count() >= before.occupied_count());
    }
}

#[test]
fn test_strategies_agree() {
    let image = gradient(40, 40);
    let config = Config::default();
    let mut sequential = SimulationRun::seed(&image, &config, 7).unwrap();
    let mut parallel = SimulationRun::seed(&image, &config, 7).unwrap();
    let seq_engine = StepEngine::new(ExecutionStrategy::Sequential);
    let par_engine = StepEngine::new(ExecutionStrategy::Parallel);

    for _ in 0..30 {
        let a = sequential.tick(&seq_engine).unwrap();
        let b = parallel.tick(&par_engine).unwrap();
        assert_eq!(a, b);
        assert_eq!(sequential.current_grid().unwrap(), parallel.current_grid().unwrap());
    }
}

#[test]
fn test_reproducibility() {
    let image = gradient(64, 64);
    let config = Config::default();
    let engine = StepEngine::default();

    let mut run1 = SimulationRun::seed(&image, &config, 99999).unwrap();
    let mut run2 = SimulationRun::seed(&image, &config, 99999).unwrap();
    assert_eq!(run1.current_grid().unwrap(), run2.current_grid().unwrap());

    for _ in 0..50 {
        run1.tick(&engine).unwrap();
        run2.tick(&engine).unwrap();
    }
    assert_eq!(run1.export_pixels().unwrap(), run2.export_pixels().unwrap());

    let run3 = SimulationRun::seed(&image, &config, 11111).unwrap();
    let first = SimulationRun::seed(&image, &config, 99999).unwrap();
    assert_ne!(run3.current_grid().unwrap(), first.current_grid().unwrap());
}

#[test]
fn test_fully_seeded_grid_goes_stable_unchanged() {
    let mut config = Config::default();
    config.growth.sample_rate = 1.0;
    let threshold = config.convergence.stability_threshold;

    let image = SourceImage::solid(4, 4, Rgb::BLACK).unwrap();
    let mut run = SimulationRun::seed(&image, &config, 3).unwrap();
    let initial = run.current_grid().unwrap().clone();
    assert_eq!(initial.occupied_count(), 16);

    let engine = StepEngine::default();
    let mut ticks = 0;
    while !run.is_stable() {
        run.tick(&engine).unwrap();
        ticks += 1;
        assert!(ticks <= threshold, "not stable after {} ticks", ticks);
    }

    assert_eq!(run.current_grid().unwrap(), &initial);
    let pixels = run.export_pixels().unwrap();
    assert!(pixels.chunks(4).all(|p| p == [0, 0, 0, 255]));
}

#[test]
fn test_stable_run_stays_stable() {
    let mut config = Config::default();
    config.growth.sample_rate = 1.0;
    config.convergence.stability_threshold = 5;

    let image = gradient(8, 8);
    let mut run = SimulationRun::seed(&image, &config, 5).unwrap();
    let engine = StepEngine::default();
    while !run.is_stable() {
        run.tick(&engine).unwrap();
    }
    let frozen = run.current_grid().unwrap().clone();

    for _ in 0..20 {
        let report = run.tick(&engine).unwrap();
        assert_eq!(report.convergence, Convergence::Stable);
        assert_eq!(report.newly_occupied, 0);
    }
    assert_eq!(run.current_grid().unwrap(), &frozen);
}

#[test]
fn test_zero_sample_rate_rejected() {
    let mut config = Config::default();
    config.growth.sample_rate = 0.0;

    let image = SourceImage::solid(10, 10, Rgb::BLACK).unwrap();
    assert!(matches!(
        SimulationRun::seed(&image, &config, 1),
        Err(GrowthError::InvalidConfig(_))
    ));
}

#[test]
fn test_reduced_quality_keeps_aspect_ratio() {
    let mut config = Config::default();
    config.growth.sample_rate = 0.01;
    config.quality.mode = QualityMode::Reduced;
    config.quality.max_dimension = 64;

    for (w, h) in [(256, 144), (144, 256), (300, 300), (200, 150)] {
        let run = SimulationRun::seed(&gradient(w, h), &config, 1).unwrap();
        let (gw, gh) = run.current_grid().unwrap().dims();

        assert_eq!(gw.max(gh), 64);
        let expected = w as f64 / h as f64;
        let actual = gw as f64 / gh as f64;
        // Within one cell of rounding on the smaller side
        let smaller = gw.min(gh) as f64;
        assert!((actual - expected).abs() <= expected / smaller + 1e-9);
    }

    config.quality.mode = QualityMode::Full;
    let run = SimulationRun::seed(&gradient(256, 144), &config, 1).unwrap();
    assert_eq!(run.current_grid().unwrap().dims(), (256, 144));
}

#[test]
fn test_extreme_aspect_ratio_rejected() {
    let mut config = Config::default();
    config.quality.mode = QualityMode::Reduced;
    config.quality.max_dimension = 4;

    let image = gradient(1000, 1);
    assert!(matches!(
        SimulationRun::seed(&image, &config, 1),
        Err(GrowthError::InvalidDimensions { .. })
    ));
}

#[test]
fn test_single_seed_growth_is_local() {
    let mut config = Config::default();
    config.growth.held_back_chance = 0.8;
    let engine = StepEngine::default();
    let center = Rgb::new(200, 100, 50);

    let neighbors: Vec<(usize, usize)> = (4..=6)
        .flat_map(|x| (4..=6).map(move |y| (x, y)))
        .filter(|&p| p != (5, 5))
        .collect();

    let mut occupied = 0usize;
    let trials = 200u64;
    for seed in 0..trials {
        let mut grid = Grid::new(20, 20).unwrap();
        grid.set(5, 5, Cell::occupied(center));
        let mut run = SimulationRun::from_grid(grid, &config, seed).unwrap();
        run.tick(&engine).unwrap();

        let grid = run.current_grid().unwrap();
        for y in 0..20 {
            for x in 0..20 {
                let cell = grid.get(x, y).unwrap();
                if (x, y) == (5, 5) {
                    assert_eq!(*cell, Cell::occupied(center));
                } else if !neighbors.contains(&(x, y)) {
                    assert!(!cell.occupied, "({}, {}) grew without a neighbor", x, y);
                }
            }
        }
        occupied += neighbors
            .iter()
            .filter(|&&(x, y)| grid.get(x, y).unwrap().occupied)
            .count();
    }

    // Eligible cells are held back with probability held_back_chance
    let fraction = occupied as f64 / (trials as f64 * 8.0);
    let expected = 1.0 - config.growth.held_back_chance as f64;
    assert!((expected - 0.2).abs() < 1e-6);
    assert!(
        (fraction - expected).abs() < 0.05,
        "occupied fraction {} far from {}",
        fraction,
        expected
    );
}

#[test]
fn test_disposed_run_fails() {
    let image = gradient(16, 16);
    let mut run = SimulationRun::seed(&image, &Config::default(), 1).unwrap();
    run.dispose();

    assert!(matches!(
        run.tick(&StepEngine::default()),
        Err(GrowthError::InvalidState(_))
    ));
    assert!(run.export_pixels().is_err());
}

#[test]
fn test_export_pixels_layout() {
    let mut grid = Grid::new(3, 2).unwrap();
    grid.set(2, 1, Cell::occupied(Rgb::new(9, 8, 7)));
    let run = SimulationRun::from_grid(grid, &Config::default(), 1).unwrap();

    let pixels = run.export_pixels().unwrap();
    assert_eq!(pixels.len(), 3 * 2 * 4);
    assert_eq!(&pixels[20..24], &[9, 8, 7, 255]);
    assert!(pixels[..20].iter().all(|&b| b == 0));
}

#[test]
fn test_growth_eventually_covers_grid() {
    let mut config = Config::default();
    config.growth.sample_rate = 0.02;
    config.convergence.sample_stride = 1;
    config.convergence.stability_threshold = 20;

    let mut run = SimulationRun::seed(&gradient(32, 32), &config, 2024).unwrap();
    let engine = StepEngine::default();
    for _ in 0..2000 {
        if run.is_stable() {
            break;
        }
        run.tick(&engine).unwrap();
    }

    assert!(run.is_stable());
    assert!((run.current_grid().unwrap().coverage() - 1.0).abs() < 1e-6);
}

#[test]
fn test_scheduler_lifecycle() {
    let mut config = Config::default();
    config.growth.sample_rate = 1.0;
    config.convergence.stability_threshold = 3;
    config.scheduler.tick_rate = 10.0;

    let mut scheduler = Scheduler::new_with_seed(config, 8).unwrap();
    assert_eq!(scheduler.state(), SchedulerState::Idle);

    scheduler.seed(gradient(6, 6)).unwrap();
    assert_eq!(scheduler.state(), SchedulerState::Running);

    let mut now = Instant::now();
    for _ in 0..10 {
        now += Duration::from_millis(150);
        scheduler.poll(now).unwrap();
    }
    assert_eq!(scheduler.state(), SchedulerState::Stable);

    let ticks = scheduler.tick_count();
    scheduler.request_stop();
    scheduler.poll(now + Duration::from_millis(150)).unwrap();
    assert_eq!(scheduler.state(), SchedulerState::Idle);

    // Stopped run stays on screen and no longer advances
    assert!(scheduler.current_grid().is_some());
    scheduler.poll(now + Duration::from_secs(5)).unwrap();
    assert_eq!(scheduler.tick_count(), ticks);
}

#[test]
fn test_config_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");

    let mut config = Config::default();
    config.growth.held_back_chance = 0.8;
    config.quality.mode = QualityMode::Reduced;
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}
