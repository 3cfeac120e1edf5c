use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use rand::Rng;

use crate::error::{Result, SimError};
use crate::input::SharedFrameInput;

/// Number of `f32` fields per particle record: `pos.x, pos.y, vel.x, vel.y`.
pub const PARTICLE_STRIDE: usize = 4;

/// Initial velocity components are drawn from `[-MAX_INITIAL_SPEED, MAX_INITIAL_SPEED]`.
pub const MAX_INITIAL_SPEED: f32 = 10.0;

/// A point particle in the field
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self { pos, vel }
    }

    /// Particle at rest at the given position
    pub fn at(x: f32, y: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::ZERO)
    }
}

/// Owns the particle buffer and the frame input record.
///
/// The buffer length is fixed at construction; particles are never created or
/// destroyed afterwards, so an index is a particle's permanent identity.
#[derive(Debug)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    input: Arc<SharedFrameInput>,
}

impl ParticleStore {
    /// Allocate `count` particles scattered uniformly over a `width` x `height`
    /// surface with random velocities.
    pub fn initialize(count: usize, width: f32, height: f32) -> Result<Self> {
        Self::initialize_with_rng(count, width, height, &mut rand::thread_rng())
    }

    /// Same as [`ParticleStore::initialize`] but draws from the supplied generator.
    pub fn initialize_with_rng<R: Rng>(
        count: usize,
        width: f32,
        height: f32,
        rng: &mut R,
    ) -> Result<Self> {
        if count == 0 {
            return Err(SimError::EmptyParticleSet);
        }
        validate_surface(width, height)?;

        let mut particles = Vec::new();
        particles
            .try_reserve_exact(count)
            .map_err(|source| SimError::Allocation {
                what: "particle buffer",
                bytes: count.saturating_mul(std::mem::size_of::<Particle>()),
                source,
            })?;

        particles.extend((0..count).map(|_| Particle {
            pos: Vec2::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height)),
            vel: Vec2::new(
                rng.gen_range(-MAX_INITIAL_SPEED..=MAX_INITIAL_SPEED),
                rng.gen_range(-MAX_INITIAL_SPEED..=MAX_INITIAL_SPEED),
            ),
        }));

        log::info!(
            "initialized {} particles over a {}x{} surface",
            count,
            width,
            height
        );

        let input = Arc::new(SharedFrameInput::new());
        input.set_surface(width, height);

        Ok(Self { particles, input })
    }

    /// Build a store from explicit particle records.
    pub fn from_particles(particles: Vec<Particle>, width: f32, height: f32) -> Result<Self> {
        if particles.is_empty() {
            return Err(SimError::EmptyParticleSet);
        }
        validate_surface(width, height)?;

        let input = Arc::new(SharedFrameInput::new());
        input.set_surface(width, height);

        Ok(Self { particles, input })
    }

    /// Overwrite the whole frame input record.
    pub fn update_frame_input(
        &self,
        dt: f32,
        pointer_x: f32,
        pointer_y: f32,
        pointer_pressed: bool,
        width: f32,
        height: f32,
    ) {
        self.input
            .update(dt, pointer_x, pointer_y, pointer_pressed, width, height);
    }

    /// Handle to the shared frame input, for collaborators on other threads.
    pub fn input(&self) -> Arc<SharedFrameInput> {
        Arc::clone(&self.input)
    }

    pub fn frame_input(&self) -> &SharedFrameInput {
        &self.input
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Flat view of the buffer, `PARTICLE_STRIDE` floats per particle.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.particles)
    }
}

pub(crate) fn validate_surface(width: f32, height: f32) -> Result<()> {
    if !(width.is_finite() && height.is_finite()) || width < 1.0 || height < 1.0 {
        return Err(SimError::InvalidSurface { width, height });
    }
    Ok(())
}
