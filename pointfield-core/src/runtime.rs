use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::config::SimulationConfig;
use crate::engine::ParticleStore;
use crate::error::{Result, SimError};
use crate::input::SharedFrameInput;
use crate::integrator::{self, StepParams};
use crate::raster::{FrameStats, PixelBuffer};

/// Largest timestep a single frame may advance, in seconds
pub const MAX_DT: f32 = 1.0;

/// How often the run loop reports frame statistics
const STATS_INTERVAL: u64 = 120;

/// Advances a particle store by one frame and paints the result.
#[derive(Debug, Clone, Copy)]
pub struct SimulationStep {
    pub parallel: bool,
}

impl Default for SimulationStep {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl SimulationStep {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    /// Physics and wall pass over every particle, then the compositing pass.
    /// With `parallel` unset nothing leaves the calling thread.
    ///
    /// The physics pass finishes for the whole buffer before any pixel is
    /// written, so compositing only ever sees this frame's positions.
    pub fn update(&self, store: &mut ParticleStore, pixels: &mut PixelBuffer) -> FrameStats {
        let mut input = store.frame_input().snapshot();
        if !input.dt.is_finite() || input.dt < 0.0 {
            log::warn!("ignoring invalid timestep {}", input.dt);
            input.dt = 0.0;
        }

        let params = StepParams::from_input(&input);
        integrator::step(store.particles_mut(), &params, self.parallel);

        pixels.composite_with(store.particles(), self.parallel)
    }
}

/// Turns monotonic frame timestamps into clamped timesteps.
#[derive(Debug, Default, Clone)]
pub struct DeltaTimer {
    last_ms: Option<f64>,
}

impl DeltaTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous timestamp, clamped to `[0, MAX_DT]`.
    ///
    /// The first call has nothing to compare against and yields 0.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0).clamp(0.0, MAX_DT as f64) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt
    }
}

/// Source of the display refresh signal.
pub trait FrameClock {
    /// Block until the next frame is due and return a monotonic timestamp in
    /// milliseconds.
    fn wait_for_next_frame(&mut self) -> f64;
}

/// Receives each finished frame.
pub trait Presenter {
    fn present(&mut self, pixels: &PixelBuffer, stats: FrameStats);
}

impl<F> Presenter for F
where
    F: FnMut(&PixelBuffer, FrameStats),
{
    fn present(&mut self, pixels: &PixelBuffer, stats: FrameStats) {
        self(pixels, stats)
    }
}

/// Wall-clock frame pacing on `Instant`.
///
/// With a target rate the clock sleeps until the next frame slot; without one
/// it returns immediately.
#[derive(Debug)]
pub struct PacedClock {
    origin: Instant,
    interval: Option<Duration>,
    next: Instant,
}

impl PacedClock {
    pub fn new(fps: Option<f32>) -> Self {
        let origin = Instant::now();
        let interval = fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            origin,
            interval,
            next: origin,
        }
    }

    pub fn unthrottled() -> Self {
        Self::new(None)
    }
}

impl FrameClock for PacedClock {
    fn wait_for_next_frame(&mut self) -> f64 {
        if let Some(interval) = self.interval {
            let now = Instant::now();
            if self.next > now {
                thread::sleep(self.next - now);
            }
            // Fall behind rather than burst to catch up
            self.next = self.next.max(now) + interval;
        }
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A running field: particle store, pixel buffer and frame timing.
#[derive(Debug)]
pub struct Simulation {
    store: ParticleStore,
    pixels: PixelBuffer,
    step: SimulationStep,
    timer: DeltaTimer,
    frames: u64,
}

impl Simulation {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        Self::with_rng(config, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng>(config: &SimulationConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let store = ParticleStore::initialize_with_rng(
            config.particle_count,
            config.width as f32,
            config.height as f32,
            rng,
        )?;
        let pixels = PixelBuffer::new(config.width, config.height)?;
        Self::from_parts(store, pixels, SimulationStep::new(config.parallel))
    }

    /// Assemble a simulation from existing buffers. The store's surface must
    /// match the pixel buffer.
    pub fn from_parts(
        store: ParticleStore,
        pixels: PixelBuffer,
        step: SimulationStep,
    ) -> Result<Self> {
        let input = store.frame_input().snapshot();
        if input.width != pixels.width() as f32 || input.height != pixels.height() as f32 {
            return Err(SimError::BufferMismatch {
                what: "pixel buffer",
                expected: (input.width * input.height) as usize,
                actual: pixels.width() * pixels.height(),
            });
        }
        Ok(Self {
            store,
            pixels,
            step,
            timer: DeltaTimer::new(),
            frames: 0,
        })
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Frame input handle for input collaborators.
    pub fn input(&self) -> Arc<SharedFrameInput> {
        self.store.input()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Reallocate the pixel buffer and publish the new surface size together.
    /// Particles keep their state and drift back inside on their own.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        self.pixels.resize(width, height)?;
        self.store
            .frame_input()
            .set_surface(width as f32, height as f32);
        Ok(())
    }

    /// Run one frame stamped `now_ms`.
    pub fn frame(&mut self, now_ms: f64) -> FrameStats {
        let dt = self.timer.tick(now_ms);
        self.store.frame_input().set_dt(dt);

        let stats = self.step.update(&mut self.store, &mut self.pixels);
        self.frames += 1;

        if self.frames % STATS_INTERVAL == 0 {
            log::debug!(
                "frame {}: dt {:.4}s, {} painted, {} off-surface",
                self.frames,
                dt,
                stats.painted,
                stats.skipped
            );
        }
        stats
    }

    /// Render frames until `cancel` is set. Returns the number of frames
    /// rendered by this call.
    pub fn run<C, P>(&mut self, clock: &mut C, presenter: &mut P, cancel: &AtomicBool) -> u64
    where
        C: FrameClock + ?Sized,
        P: Presenter + ?Sized,
    {
        log::info!(
            "frame loop started with {} particles on {}x{}",
            self.store.len(),
            self.pixels.width(),
            self.pixels.height()
        );

        let start = self.frames;
        loop {
            if cancel.load(Ordering::Acquire) {
                break;
            }
            let now = clock.wait_for_next_frame();
            if cancel.load(Ordering::Acquire) {
                break;
            }
            let stats = self.frame(now);
            presenter.present(&self.pixels, stats);
        }

        let rendered = self.frames - start;
        log::info!("frame loop stopped after {} frames", rendered);
        rendered
    }
}
