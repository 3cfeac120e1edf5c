//! Headless frame loop for measuring throughput

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use pointfield_core::{FrameStats, PacedClock, PixelBuffer, Simulation, SimulationConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Frame time and particle counts collected by the presenter
#[derive(Debug, Default)]
struct Report {
    frames: u64,
    painted: u64,
    skipped: u64,
    slowest: Duration,
}

pub fn run(
    config: &SimulationConfig,
    frames: u64,
    fps: f32,
    seed: Option<u64>,
    attract: Option<(f32, f32)>,
) -> Result<()> {
    let mut sim = match seed {
        Some(seed) => Simulation::with_rng(config, &mut StdRng::seed_from_u64(seed)),
        None => Simulation::new(config),
    }
    .context("failed to set up the simulation")?;

    if let Some((x, y)) = attract {
        let input = sim.input();
        input.set_pointer(x, y);
        input.set_pressed(true);
        log::info!("pointer held at ({}, {})", x, y);
    }

    let mut clock = PacedClock::new((fps > 0.0).then_some(fps));
    let cancel = AtomicBool::new(frames == 0);
    let mut report = Report::default();
    let mut last = Instant::now();

    let started = Instant::now();
    let mut presenter = |_: &PixelBuffer, stats: FrameStats| {
        let now = Instant::now();
        report.slowest = report.slowest.max(now - last);
        last = now;

        report.frames += 1;
        report.painted += stats.painted as u64;
        report.skipped += stats.skipped as u64;
        if report.frames >= frames {
            cancel.store(true, Ordering::Release);
        }
    };
    sim.run(&mut clock, &mut presenter, &cancel);
    let elapsed = started.elapsed();

    if report.frames == 0 {
        log::warn!("no frames rendered");
        return Ok(());
    }

    let per_frame = elapsed.div_f64(report.frames as f64);
    log::info!(
        "{} frames of {} particles in {:.2?}: {:.2?} per frame ({:.1} fps), slowest {:.2?}",
        report.frames,
        config.particle_count,
        elapsed,
        per_frame,
        report.frames as f64 / elapsed.as_secs_f64(),
        report.slowest
    );
    log::info!(
        "on average {} particles painted and {} off-surface per frame",
        report.painted / report.frames,
        report.skipped / report.frames
    );

    Ok(())
}
