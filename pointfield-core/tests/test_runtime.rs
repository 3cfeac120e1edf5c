//! Frame timing and the run loop

use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec2;
use pointfield_core::tests::test_helpers::{approx_eq_f32, seeded_rng, ScriptedClock};
use pointfield_core::{
    DeltaTimer, FrameClock, FrameStats, PacedClock, Particle, ParticleStore, PixelBuffer,
    Simulation, SimulationConfig, SimulationStep, SimError, MAX_DT,
};

fn small_config() -> SimulationConfig {
    SimulationConfig {
        particle_count: 2_000,
        width: 64,
        height: 48,
        parallel: true,
    }
}

#[test]
fn test_delta_timer_first_frame_is_zero() {
    let mut timer = DeltaTimer::new();
    assert_eq!(timer.tick(12_345.0), 0.0);
    assert!(approx_eq_f32(timer.tick(12_361.0), 0.016, 1e-6));
}

#[test]
fn test_delta_timer_clamps_long_pauses() {
    let mut timer = DeltaTimer::new();
    timer.tick(0.0);
    assert_eq!(timer.tick(5_000.0), MAX_DT);
}

#[test]
fn test_delta_timer_clamps_backwards_time() {
    let mut timer = DeltaTimer::new();
    timer.tick(100.0);
    assert_eq!(timer.tick(50.0), 0.0);
}

#[test]
fn test_config_validation() {
    assert!(SimulationConfig::default().validate().is_ok());

    let empty = SimulationConfig {
        particle_count: 0,
        ..small_config()
    };
    assert!(matches!(empty.validate(), Err(SimError::InvalidConfig(_))));

    let flat = SimulationConfig {
        height: 0,
        ..small_config()
    };
    assert!(matches!(Simulation::new(&flat), Err(SimError::InvalidConfig(_))));
}

#[test]
fn test_from_parts_rejects_mismatched_surface() {
    let store = ParticleStore::from_particles(vec![Particle::at(1.0, 1.0)], 10.0, 10.0).unwrap();
    let pixels = PixelBuffer::new(20, 10).unwrap();

    let result = Simulation::from_parts(store, pixels, SimulationStep::default());
    assert!(matches!(result, Err(SimError::BufferMismatch { .. })));
}

#[test]
fn test_frame_feeds_delta_into_input() {
    let mut sim = Simulation::with_rng(&small_config(), &mut seeded_rng(1)).unwrap();

    sim.frame(1_000.0);
    assert_eq!(sim.input().snapshot().dt, 0.0);

    sim.frame(1_020.0);
    assert!(approx_eq_f32(sim.input().snapshot().dt, 0.02, 1e-6));
    assert_eq!(sim.frames(), 2);
}

#[test]
fn test_run_stops_when_cancelled() {
    let mut sim = Simulation::with_rng(&small_config(), &mut seeded_rng(2)).unwrap();
    let mut clock = ScriptedClock::steady(16.0, 100);
    let cancel = AtomicBool::new(false);

    let mut presented = 0;
    let mut presenter = |pixels: &PixelBuffer, stats: FrameStats| {
        assert_eq!(pixels.as_bytes().len(), 64 * 48 * 4);
        assert_eq!(stats.painted + stats.skipped, 2_000);
        presented += 1;
        if presented == 10 {
            cancel.store(true, Ordering::Release);
        }
    };

    let rendered = sim.run(&mut clock, &mut presenter, &cancel);

    assert_eq!(rendered, 10);
    assert_eq!(presented, 10);
    assert_eq!(sim.frames(), 10);
}

#[test]
fn test_run_with_cancel_already_set_renders_nothing() {
    let mut sim = Simulation::with_rng(&small_config(), &mut seeded_rng(3)).unwrap();
    let mut clock = ScriptedClock::steady(16.0, 10);
    let cancel = AtomicBool::new(true);

    let rendered = sim.run(&mut clock, &mut |_: &PixelBuffer, _: FrameStats| {}, &cancel);
    assert_eq!(rendered, 0);
}

#[test]
fn test_resize_updates_buffer_and_input() {
    let mut sim = Simulation::with_rng(&small_config(), &mut seeded_rng(4)).unwrap();
    sim.resize(32, 16).unwrap();

    assert_eq!(sim.pixels().width(), 32);
    assert_eq!(sim.pixels().height(), 16);
    let input = sim.input().snapshot();
    assert_eq!(input.surface(), Vec2::new(32.0, 16.0));

    // Particles beyond the new surface are skipped, not written out of bounds
    let stats = sim.frame(0.0);
    assert_eq!(stats.painted + stats.skipped, 2_000);
    assert!(stats.skipped > 0);
}

#[test]
fn test_paced_clock_is_monotonic() {
    let mut clock = PacedClock::new(Some(1_000.0));
    let mut last = clock.wait_for_next_frame();
    for _ in 0..5 {
        let now = clock.wait_for_next_frame();
        assert!(now >= last);
        last = now;
    }
}

#[test]
fn test_invalid_timestep_ignored() {
    let mut store = ParticleStore::from_particles(
        vec![Particle::new(Vec2::new(5.0, 5.0), Vec2::new(1.0, 1.0))],
        10.0,
        10.0,
    )
    .unwrap();
    let mut pixels = PixelBuffer::new(10, 10).unwrap();
    store.frame_input().set_dt(f32::NAN);

    SimulationStep::new(false).update(&mut store, &mut pixels);

    assert_eq!(store.particles()[0].pos, Vec2::new(5.0, 5.0));
    assert_eq!(store.particles()[0].vel, Vec2::new(1.0, 1.0));
}

#[test]
fn test_serial_step_matches_parallel_step() {
    let config = SimulationConfig {
        parallel: false,
        ..small_config()
    };
    let mut serial = Simulation::with_rng(&config, &mut seeded_rng(8)).unwrap();
    let mut parallel = Simulation::with_rng(&small_config(), &mut seeded_rng(8)).unwrap();
    for sim in [&serial, &parallel] {
        let input = sim.input();
        input.set_pointer(20.0, 30.0);
        input.set_pressed(true);
    }

    for frame in 0..8 {
        let now = frame as f64 * 16.0;
        assert_eq!(serial.frame(now), parallel.frame(now));
    }

    assert_eq!(serial.store().particles(), parallel.store().particles());
    assert_eq!(serial.pixels().as_bytes(), parallel.pixels().as_bytes());
}
