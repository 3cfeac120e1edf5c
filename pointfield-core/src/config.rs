use crate::error::{Result, SimError};

/// Particle count the field is tuned for
pub const DEFAULT_PARTICLE_COUNT: usize = 1_000_000;
pub const DEFAULT_WIDTH: usize = 1280;
pub const DEFAULT_HEIGHT: usize = 720;

/// Parameters fixed for the lifetime of a simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub particle_count: usize,
    pub width: usize,
    pub height: usize,
    /// Run the physics pass on the rayon pool
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            parallel: true,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            return Err(SimError::InvalidConfig(
                "particle count must be at least 1".to_string(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(SimError::InvalidConfig(format!(
                "surface {}x{} has no pixels",
                self.width, self.height
            )));
        }
        Ok(())
    }
}
