//! Closed-form contraction factor and parameter bounds for the convergence panel.
//!
//! The constants table is illustrative fixture data. Nothing here is derived
//! from a live computation; the panel recomputes the report on every slider
//! change.

use log::debug;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;

/// Number of spectral modes in the constants table.
pub const MODE_COUNT: usize = 4;

/// Prefactor of the per-mode overlap term.
pub const OVERLAP_PREFACTOR: f64 = 1.213;

pub const ALPHA_RANGE: RangeInclusive<f64> = 0.05..=0.5;
pub const BETA_RANGE: RangeInclusive<f64> = 1.0..=8.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvergenceError {
    #[error("{name} = {value} lies outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("constant {name} must be positive and finite, found {value}")]
    InvalidConstant { name: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConstantsTable {
    /// C_leak
    pub leakage: f64,
    /// Δ_k
    pub spectral_gaps: [f64; MODE_COUNT],
    /// C_node,k
    pub node_constants: [f64; MODE_COUNT],
    /// δ_min
    pub min_spacing: f64,
    /// η0; also the leakage target and the contraction margin.
    pub initial_overlap: f64,
}

impl Default for ConstantsTable {
    fn default() -> Self {
        Self {
            leakage: 4.0,
            spectral_gaps: [0.42, 0.67, 0.91, 1.18],
            node_constants: [0.86, 1.04, 1.22, 1.37],
            min_spacing: 2.0,
            initial_overlap: 0.1,
        }
    }
}

impl ConstantsTable {
    pub fn validate(&self) -> Result<(), ConvergenceError> {
        let positive = |name: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConvergenceError::InvalidConstant { name, value })
            }
        };
        positive("leakage", self.leakage)?;
        positive("min_spacing", self.min_spacing)?;
        positive("initial_overlap", self.initial_overlap)?;
        if self.initial_overlap >= 1.0 {
            return Err(ConvergenceError::InvalidConstant {
                name: "initial_overlap",
                value: self.initial_overlap,
            });
        }
        for &gap in &self.spectral_gaps {
            positive("spectral_gaps", gap)?;
        }
        for &node in &self.node_constants {
            positive("node_constants", node)?;
        }
        Ok(())
    }

    fn modes(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.spectral_gaps
            .iter()
            .copied()
            .zip(self.node_constants.iter().copied())
    }
}

/// Slider values (α, β).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceParameters {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for ConvergenceParameters {
    fn default() -> Self {
        Self {
            alpha: 0.2,
            beta: 3.0,
        }
    }
}

impl ConvergenceParameters {
    /// Accepts only values inside the slider ranges.
    pub fn new(alpha: f64, beta: f64) -> Result<Self, ConvergenceError> {
        check_range("alpha", alpha, &ALPHA_RANGE)?;
        check_range("beta", beta, &BETA_RANGE)?;
        Ok(Self { alpha, beta })
    }

    /// Snaps both values into the slider ranges; NaN snaps to the lower end.
    pub fn clamped(alpha: f64, beta: f64) -> Self {
        Self {
            alpha: clamp_to(alpha, &ALPHA_RANGE),
            beta: clamp_to(beta, &BETA_RANGE),
        }
    }
}

fn check_range(
    name: &'static str,
    value: f64,
    range: &RangeInclusive<f64>,
) -> Result<(), ConvergenceError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConvergenceError::OutOfRange {
            name,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

fn clamp_to(value: f64, range: &RangeInclusive<f64>) -> f64 {
    if value.is_nan() {
        *range.start()
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Λ(α, β) = max_k(α·1.213·C_node,k/Δ_k·√β) + C_leak·exp(−β·δ_min²/4).
///
/// `None` means undefined: negative β, non-finite input, or a zero gap.
pub fn contraction_factor(params: &ConvergenceParameters, table: &ConstantsTable) -> Option<f64> {
    let ConvergenceParameters { alpha, beta } = *params;
    if !alpha.is_finite() || !beta.is_finite() || beta < 0.0 {
        return None;
    }
    let root = beta.sqrt();
    let mut worst = f64::NEG_INFINITY;
    for (gap, node) in table.modes() {
        if gap == 0.0 {
            return None;
        }
        worst = worst.max(alpha * OVERLAP_PREFACTOR * node / gap * root);
    }
    let leak = table.leakage * (-beta * table.min_spacing.powi(2) / 4.0).exp();
    finite(worst + leak)
}

/// β ≥ (4/δ_min²)·ln(2·C_leak/η0) keeps the leakage term below η0/2.
pub fn beta_lower_bound(table: &ConstantsTable) -> Option<f64> {
    if table.min_spacing == 0.0 || table.initial_overlap <= 0.0 {
        return None;
    }
    let ratio = 2.0 * table.leakage / table.initial_overlap;
    if ratio <= 0.0 {
        return None;
    }
    finite(4.0 / table.min_spacing.powi(2) * ratio.ln())
}

/// Per-mode bounds (1−η0)·Δ_k/(1.213·C_node,k·√β). `None` when √β is zero or undefined.
pub fn alpha_upper_bounds(beta: f64, table: &ConstantsTable) -> Option<[f64; MODE_COUNT]> {
    if !beta.is_finite() || beta <= 0.0 {
        return None;
    }
    let root = beta.sqrt();
    let margin = 1.0 - table.initial_overlap;
    let mut bounds = [0.0; MODE_COUNT];
    for (bound, (gap, node)) in bounds.iter_mut().zip(table.modes()) {
        let denominator = OVERLAP_PREFACTOR * node * root;
        if denominator == 0.0 {
            return None;
        }
        *bound = finite(margin * gap / denominator)?;
    }
    Some(bounds)
}

pub fn alpha_upper_bound(beta: f64, table: &ConstantsTable) -> Option<f64> {
    alpha_upper_bounds(beta, table).map(|bounds| bounds.into_iter().fold(f64::INFINITY, f64::min))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvergenceReport {
    pub alpha: f64,
    pub beta: f64,
    pub contraction_factor: Option<f64>,
    pub beta_lower_bound: Option<f64>,
    pub alpha_upper_bound: Option<f64>,
    pub beta_satisfied: bool,
    pub alpha_satisfied: bool,
    pub convergence_guaranteed: bool,
}

impl ConvergenceReport {
    /// Display text for Λ, `"undefined"` when it could not be computed.
    pub fn contraction_label(&self) -> String {
        match self.contraction_factor {
            Some(lambda) => format!("{lambda:.6}"),
            None => "undefined".to_string(),
        }
    }
}

pub fn analyze_convergence(
    params: &ConvergenceParameters,
    table: &ConstantsTable,
) -> ConvergenceReport {
    let contraction = contraction_factor(params, table);
    let beta_bound = beta_lower_bound(table);
    let alpha_bound = alpha_upper_bound(params.beta, table);
    let beta_satisfied = beta_bound.is_some_and(|bound| params.beta >= bound);
    let alpha_satisfied = alpha_bound.is_some_and(|bound| params.alpha <= bound);
    if contraction.is_none() || alpha_bound.is_none() {
        debug!(
            "convergence report undefined for alpha={}, beta={}",
            params.alpha, params.beta
        );
    }
    ConvergenceReport {
        alpha: params.alpha,
        beta: params.beta,
        contraction_factor: contraction,
        beta_lower_bound: beta_bound,
        alpha_upper_bound: alpha_bound,
        beta_satisfied,
        alpha_satisfied,
        convergence_guaranteed: beta_satisfied && alpha_satisfied,
    }
}
