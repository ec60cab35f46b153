//! Search strategies and tuning knobs for the improvement procedures.

use serde::{Deserialize, Serialize};

/// How a procedure picks among improving candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImprovementStrategy {
    /// Make the first improving move found and return.
    #[default]
    FirstImprovement,
    /// Scan the whole neighbourhood, make the best move, and repeat until
    /// no move improves.
    SteepestDescent,
    /// Make one random move regardless of cost (perturbation).
    RandomMove,
}

/// Parameters shared by the improvement layer.
///
/// # Examples
///
/// ```
/// use u_arc_routing::improvement::{ImprovementConfig, ImprovementStrategy};
///
/// let config = ImprovementConfig::default()
///     .with_iterations(50)
///     .with_seed(7)
///     .with_strategy(ImprovementStrategy::SteepestDescent);
/// assert_eq!(config.iterations, 50);
/// assert_eq!(config.or_segment, 4);
/// assert_eq!(config.or_shift, 11);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementConfig {
    /// Strategy used by the configurable procedures.
    pub strategy: ImprovementStrategy,
    /// Outer iterations of the iterated local search.
    pub iterations: usize,
    /// Upper bound on improving passes inside one descent.
    pub max_passes: usize,
    /// Random seed for perturbations.
    pub seed: u64,
    /// Rotation applied to partition centres, in radians.
    pub rotation_angle: f64,
    /// Longest segment moved by the or-interchange.
    pub or_segment: usize,
    /// Largest shift applied to a segment by the or-interchange.
    pub or_shift: usize,
}

impl Default for ImprovementConfig {
    fn default() -> Self {
        Self {
            strategy: ImprovementStrategy::FirstImprovement,
            iterations: 20,
            max_passes: 1_000,
            seed: 42,
            rotation_angle: std::f64::consts::PI / 12.0,
            or_segment: 4,
            or_shift: 11,
        }
    }
}

impl ImprovementConfig {
    /// Sets the candidate selection strategy.
    pub fn with_strategy(mut self, strategy: ImprovementStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the iterated local search budget.
    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    /// Caps the number of improving passes per descent.
    pub fn with_max_passes(mut self, n: usize) -> Self {
        self.max_passes = n;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the centre rotation angle in radians.
    pub fn with_rotation_angle(mut self, angle: f64) -> Self {
        self.rotation_angle = angle;
        self
    }

    /// Sets the or-interchange segment length and shift limits.
    pub fn with_or_limits(mut self, segment: usize, shift: usize) -> Self {
        self.or_segment = segment;
        self.or_shift = shift;
        self
    }
}
