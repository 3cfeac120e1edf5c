use glam::Vec2;
use rayon::prelude::*;

use crate::engine::Particle;
use crate::input::FrameInput;

/// Overall scale of the pointer attraction
pub const ATTRACTION_SCALE: f32 = 3.0;
/// Cap on the inverse-square term, reached at roughly 146.7 px from the pointer
pub const ATTRACTION_CAP: f32 = 1200.0;
/// Numerator of the inverse-square term
pub const ATTRACTION_STRENGTH: f32 = 25_830_000.0;
/// Velocity factor applied on a wall hit: reverse and halve
pub const WALL_RESTITUTION: f32 = -0.5;

/// Below this many particles per rayon task the split overhead dominates.
const MIN_PARTICLES_PER_TASK: usize = 8 * 1024;

/// Per-frame velocity attenuation `1 / (1 + dt)`
pub fn decay(dt: f32) -> f32 {
    1.0 / (1.0 + dt)
}

/// Magnitude of the pull toward the pointer at distance `dist`.
///
/// Never exceeds `ATTRACTION_SCALE * ATTRACTION_CAP`.
pub fn attraction_magnitude(dist: f32) -> f32 {
    ATTRACTION_SCALE * ATTRACTION_CAP.min(ATTRACTION_STRENGTH / (dist * dist))
}

/// Velocity change contributed by the pointer over one step of length `dt`.
///
/// A particle sitting exactly on the pointer has no direction to be pulled in
/// and receives no force.
pub fn attraction(pos: Vec2, pointer: Vec2, dt: f32) -> Vec2 {
    let to_pointer = pointer - pos;
    let dist = to_pointer.length();
    if dist == 0.0 {
        return Vec2::ZERO;
    }
    let dir = to_pointer / dist;
    dir * attraction_magnitude(dist) * dt
}

/// Inputs shared by every particle in one physics pass
#[derive(Debug, Clone, Copy)]
pub struct StepParams {
    pub dt: f32,
    pub decay: f32,
    pub pointer: Option<Vec2>,
    pub extent: Vec2,
}

impl StepParams {
    pub fn from_input(input: &FrameInput) -> Self {
        Self {
            dt: input.dt,
            decay: decay(input.dt),
            pointer: input.pointer_pressed.then_some(input.pointer),
            extent: input.surface(),
        }
    }
}

/// Advance one particle: decay, attraction, integration, then wall reflection.
#[inline]
pub fn step_particle(particle: &mut Particle, params: &StepParams) {
    let mut vel = particle.vel * params.decay;

    if let Some(pointer) = params.pointer {
        vel += attraction(particle.pos, pointer, params.dt);
    }

    particle.pos += vel * params.dt;
    particle.vel = vel;

    reflect(particle, params.extent);
}

/// Soft walls: only the velocity is corrected, the position may sit on or
/// past an edge until the particle drifts back.
#[inline]
pub fn reflect(particle: &mut Particle, extent: Vec2) {
    if particle.pos.x <= 0.0 || particle.pos.x >= extent.x {
        particle.vel.x *= WALL_RESTITUTION;
    }
    if particle.pos.y <= 0.0 || particle.pos.y >= extent.y {
        particle.vel.y *= WALL_RESTITUTION;
    }
}

/// Step every particle forward by `params.dt`.
///
/// With `parallel` set the buffer is split into contiguous index ranges over
/// the rayon pool. The call returns only once every range is done.
pub fn step(particles: &mut [Particle], params: &StepParams, parallel: bool) {
    if parallel {
        particles
            .par_iter_mut()
            .with_min_len(MIN_PARTICLES_PER_TASK)
            .for_each(|particle| step_particle(particle, params));
    } else {
        for particle in particles.iter_mut() {
            step_particle(particle, params);
        }
    }
}
