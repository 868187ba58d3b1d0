//! User-adjustable session settings with slider bounds

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Inclusive, stepped range for a numeric setting
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
    pub step: T,
}

/// Response creativity passed to the completion endpoint
pub const TEMPERATURE_BOUNDS: Bounds<f32> = Bounds {
    min: 0.0,
    max: 1.0,
    step: 0.1,
};

/// Fragment window size in characters
pub const CHUNK_SIZE_BOUNDS: Bounds<usize> = Bounds {
    min: 500,
    max: 2000,
    step: 100,
};

/// Number of fragments sent as context
pub const TOP_K_BOUNDS: Bounds<usize> = Bounds {
    min: 2,
    max: 5,
    step: 1,
};

/// Session settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Sampling temperature (default: 0.3)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Target fragment size in characters (default: 1000)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Fragments retrieved per question (default: 3)
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_temperature() -> f32 {
    0.3
}

fn default_chunk_size() -> usize {
    1000
}

fn default_top_k() -> usize {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            chunk_size: default_chunk_size(),
            top_k: default_top_k(),
        }
    }
}

impl Settings {
    /// Reject values a slider could not produce
    pub fn validate(&self) -> Result<()> {
        let t = TEMPERATURE_BOUNDS;
        let steps = self.temperature / t.step;
        if !self.temperature.is_finite()
            || self.temperature < t.min
            || self.temperature > t.max
            || (steps - steps.round()).abs() > 1e-3
        {
            return Err(Error::validation(format!(
                "Response creativity must be between {:.1} and {:.1} in steps of {:.1}",
                t.min, t.max, t.step
            )));
        }

        check_stepped("Chunk size", self.chunk_size, CHUNK_SIZE_BOUNDS)?;
        check_stepped("Relevant chunks", self.top_k, TOP_K_BOUNDS)?;

        Ok(())
    }
}

fn check_stepped(name: &str, value: usize, bounds: Bounds<usize>) -> Result<()> {
    if value < bounds.min || value > bounds.max || (value - bounds.min) % bounds.step != 0 {
        return Err(Error::validation(format!(
            "{} must be between {} and {} in steps of {}",
            name, bounds.min, bounds.max, bounds.step
        )));
    }
    Ok(())
}
