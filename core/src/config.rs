//! Orchestrator configuration — round caps, thresholds, and the weight
//! vector the stability tracker combines its signals with.

use serde::{Deserialize, Serialize};

/// Weights the stability tracker assigns to its four component signals.
/// Must sum to `1.00` — enforced by [`StabilityWeights::assert_valid`],
/// which the orchestrator calls once at construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StabilityWeights {
    pub contradiction_ratio: f64,
    pub decision_reuse_rate: f64,
    pub plan_similarity: f64,
    pub goal_convergence: f64,
}

impl Default for StabilityWeights {
    fn default() -> Self {
        Self {
            contradiction_ratio: 0.30,
            decision_reuse_rate: 0.25,
            plan_similarity: 0.25,
            goal_convergence: 0.20,
        }
    }
}

impl StabilityWeights {
    /// Panics if the weights do not sum to 1.00 within floating-point
    /// tolerance. A startup-time assertion, not a recoverable condition —
    /// a misconfigured weight vector is a programming error.
    pub fn assert_valid(&self) {
        let sum = self.contradiction_ratio
            + self.decision_reuse_rate
            + self.plan_similarity
            + self.goal_convergence;
        assert!(
            (sum - 1.0).abs() < 1e-9,
            "stability weights must sum to 1.00, got {sum}"
        );
    }
}

/// Configuration for the decision engine and orchestrator loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Hard upper bound on rounds.
    pub max_rounds: u32,
    /// Trigger threshold for `stabilityAchieved`.
    pub stability_threshold: f64,
    /// Consecutive-farther tail length that triggers `goalDiverging`.
    pub goal_divergence_limit: u32,
    /// Weights for the stability tracker's convex combination.
    pub stability_weights: StabilityWeights,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            stability_threshold: 0.85,
            goal_divergence_limit: 2,
            stability_weights: StabilityWeights::default(),
        }
    }
}

/// Status band a computed [`crate::model::StabilityMetrics`] falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityBand {
    Stable,
    Converging,
    Unstable,
}

impl OrchestratorConfig {
    /// Classify an `overall_stability` scalar against this config's
    /// threshold and the fixed `converging` cutoff of 0.70.
    pub fn band(&self, overall_stability: f64) -> StabilityBand {
        if overall_stability >= self.stability_threshold {
            StabilityBand::Stable
        } else if overall_stability >= 0.70 {
            StabilityBand::Converging
        } else {
            StabilityBand::Unstable
        }
    }
}
