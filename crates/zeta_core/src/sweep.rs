//! One-parameter sweeps across the slider ranges.

use crate::convergence::{
    analyze_convergence, ConstantsTable, ConvergenceParameters, ALPHA_RANGE, BETA_RANGE,
};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepPoint {
    pub alpha: f64,
    pub beta: f64,
    pub contraction_factor: Option<f64>,
    pub convergence_guaranteed: bool,
}

/// Sweeps α over its slider range at fixed β.
pub fn sweep_alpha(beta: f64, steps: usize, table: &ConstantsTable) -> Result<Vec<SweepPoint>> {
    if !beta.is_finite() {
        bail!("Fixed beta must be finite.");
    }
    sweep(&ALPHA_RANGE, steps, table, |alpha| ConvergenceParameters {
        alpha,
        beta,
    })
}

/// Sweeps β over its slider range at fixed α.
pub fn sweep_beta(alpha: f64, steps: usize, table: &ConstantsTable) -> Result<Vec<SweepPoint>> {
    if !alpha.is_finite() {
        bail!("Fixed alpha must be finite.");
    }
    sweep(&BETA_RANGE, steps, table, |beta| ConvergenceParameters {
        alpha,
        beta,
    })
}

fn sweep(
    range: &RangeInclusive<f64>,
    steps: usize,
    table: &ConstantsTable,
    params_at: impl Fn(f64) -> ConvergenceParameters,
) -> Result<Vec<SweepPoint>> {
    if steps < 2 {
        bail!("A sweep needs at least 2 steps.");
    }
    let (start, end) = (*range.start(), *range.end());
    let step = (end - start) / (steps - 1) as f64;
    let points = (0..steps)
        .map(|i| {
            let value = if i + 1 == steps {
                end
            } else {
                start + step * i as f64
            };
            let params = params_at(value);
            let report = analyze_convergence(&params, table);
            SweepPoint {
                alpha: params.alpha,
                beta: params.beta,
                contraction_factor: report.contraction_factor,
                convergence_guaranteed: report.convergence_guaranteed,
            }
        })
        .collect();
    Ok(points)
}
