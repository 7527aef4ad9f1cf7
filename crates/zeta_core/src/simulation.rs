//! Cosmetic "zero detection" run for the simulation panel.
//!
//! Estimates are the fixture ordinates perturbed by seeded uniform noise.
//! Progress is reported synchronously; the front end decides whether to
//! animate it.

use crate::fixtures::{KNOWN_ZERO_ORDINATES, WITTEN_INDEX};
use anyhow::{bail, Result};
use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Half-width of the noise added to the displayed Witten index.
const WITTEN_JITTER: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    pub zero_count: usize,
    /// Half-width of the uniform noise applied to each ordinate.
    pub precision: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            zero_count: KNOWN_ZERO_ORDINATES.len(),
            precision: 0.05,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.zero_count == 0 || self.zero_count > KNOWN_ZERO_ORDINATES.len() {
            bail!(
                "zero_count must be between 1 and {}.",
                KNOWN_ZERO_ORDINATES.len()
            );
        }
        if !self.precision.is_finite() || self.precision < 0.0 {
            bail!("precision must be finite and non-negative.");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutcome {
    pub estimated_zeros: Vec<f64>,
    pub witten_index: f64,
    /// Pearson correlation with the fixture ordinates; `None` for fewer than two zeros.
    pub correlation: Option<f64>,
    pub max_abs_error: f64,
}

/// Runs the simulation, calling `on_progress` with the completed fraction after each zero.
pub fn run_simulation(
    config: &SimulationConfig,
    mut on_progress: impl FnMut(f64),
) -> Result<SimulationOutcome> {
    config.validate()?;
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let reference = &KNOWN_ZERO_ORDINATES[..config.zero_count];

    let mut estimated_zeros = Vec::with_capacity(reference.len());
    for (i, &ordinate) in reference.iter().enumerate() {
        let noise = rng.gen_range(-config.precision..=config.precision);
        estimated_zeros.push(ordinate + noise);
        on_progress((i + 1) as f64 / reference.len() as f64);
    }
    let witten_index = WITTEN_INDEX + rng.gen_range(-WITTEN_JITTER..=WITTEN_JITTER);

    let max_abs_error = estimated_zeros
        .iter()
        .zip(reference)
        .map(|(estimate, known)| (estimate - known).abs())
        .fold(0.0, f64::max);
    let correlation = pearson_correlation(&estimated_zeros, reference);
    debug!(
        "simulated {} zeros (seed {}), max error {max_abs_error:.3e}",
        reference.len(),
        config.seed
    );

    Ok(SimulationOutcome {
        estimated_zeros,
        witten_index,
        correlation,
        max_abs_error,
    })
}

/// Sample Pearson correlation; `None` for mismatched or too-short input or zero variance.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some(cov / denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn same_seed_reproduces_outcome() {
        let config = SimulationConfig::default();
        let first = run_simulation(&config, |_| {}).expect("should run");
        let second = run_simulation(&config, |_| {}).expect("should run");
        assert_eq!(first, second);
    }

    #[test]
    fn estimates_stay_within_precision() {
        let config = SimulationConfig {
            precision: 0.2,
            ..SimulationConfig::default()
        };
        let outcome = run_simulation(&config, |_| {}).expect("should run");
        assert_eq!(outcome.estimated_zeros.len(), 10);
        assert!(outcome.max_abs_error <= 0.2);
        assert!(outcome.correlation.is_some_and(|rho| rho > 0.99));
        assert!((outcome.witten_index - WITTEN_INDEX).abs() <= WITTEN_JITTER);
    }

    #[test]
    fn progress_is_reported_per_zero() {
        let config = SimulationConfig {
            zero_count: 4,
            ..SimulationConfig::default()
        };
        let mut progress = Vec::new();
        run_simulation(&config, |fraction| progress.push(fraction)).expect("should run");
        assert_eq!(progress, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn zero_precision_reproduces_fixture() {
        let config = SimulationConfig {
            precision: 0.0,
            ..SimulationConfig::default()
        };
        let outcome = run_simulation(&config, |_| {}).expect("should run");
        assert_eq!(outcome.estimated_zeros, KNOWN_ZERO_ORDINATES.to_vec());
        assert_eq!(outcome.max_abs_error, 0.0);
        assert_relative_eq!(outcome.correlation.unwrap_or_default(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn single_zero_has_no_correlation() {
        let config = SimulationConfig {
            zero_count: 1,
            ..SimulationConfig::default()
        };
        let outcome = run_simulation(&config, |_| {}).expect("should run");
        assert_eq!(outcome.correlation, None);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let too_many = SimulationConfig {
            zero_count: 11,
            ..SimulationConfig::default()
        };
        assert!(run_simulation(&too_many, |_| {}).is_err());
        let negative = SimulationConfig {
            precision: -1.0,
            ..SimulationConfig::default()
        };
        assert!(run_simulation(&negative, |_| {}).is_err());
    }
}
