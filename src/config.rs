use serde::{Deserialize, Serialize};

/// Scalar knobs that drive the stress solver and the physics relaxer.
///
/// Defaults mirror the original engine's hardcoded defaults; every field
/// can be overridden by a `key value`-style config line in the input
/// (see [`crate::parser`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// PRNG seed. Reused verbatim on every restart attempt (see
    /// [`crate::solver`]) rather than advanced between attempts.
    pub seed: u64,
    pub iterations: usize,
    pub viscous_iterations: usize,
    pub viscous_timestep: f64,
    pub viscous_damping: f64,
    /// `Some(exponent)` once an `inflate` line has been seen; its presence
    /// (not its value alone) switches the non-neighbor force model.
    pub inflate: Option<f64>,
    pub learning_rate: f64,
    pub separate: f64,
    pub ic_guess: bool,
    pub repulsion_radius: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            iterations: 500,
            viscous_iterations: 10,
            viscous_timestep: 0.1,
            viscous_damping: 1.0,
            inflate: None,
            learning_rate: 0.1,
            separate: 1.5,
            ic_guess: false,
            repulsion_radius: 1e100,
        }
    }
}

impl LayoutConfig {
    /// The inflation exponent to use, defaulting to 2.0 when `inflate` was
    /// mentioned in the input without switching it off (the presence of the
    /// key is what enables inflation; its value just shapes the falloff).
    pub fn inflate_exponent(&self) -> f64 {
        self.inflate.unwrap_or(2.0)
    }
}
