pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod integrator;
pub mod raster;
pub mod runtime;

pub use config::SimulationConfig;
pub use engine::{Particle, ParticleStore, PARTICLE_STRIDE};
pub use error::{Result, SimError};
pub use input::{FrameInput, SharedFrameInput};
pub use raster::{FrameStats, PixelBuffer};
pub use runtime::{
    DeltaTimer, FrameClock, PacedClock, Presenter, Simulation, SimulationStep, MAX_DT,
};
