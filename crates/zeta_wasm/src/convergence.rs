//! Convergence panel bindings: contraction report and parameter sweeps.

use crate::workbench::{to_js, to_js_error, WasmWorkbench};
use wasm_bindgen::prelude::*;
use zeta_core::convergence::ConvergenceParameters;
use zeta_core::preferences::Preferences;
use zeta_core::sweep::{sweep_alpha, sweep_beta};

pub(crate) const ALPHA_SLIDER: &str = "alpha";
pub(crate) const BETA_SLIDER: &str = "beta";

/// Parameters from the stored slider positions, falling back to the defaults.
pub(crate) fn current_parameters(preferences: &Preferences) -> ConvergenceParameters {
    let defaults = ConvergenceParameters::default();
    ConvergenceParameters {
        alpha: preferences.slider(ALPHA_SLIDER).unwrap_or(defaults.alpha),
        beta: preferences.slider(BETA_SLIDER).unwrap_or(defaults.beta),
    }
}

pub(crate) fn remember_parameters(
    preferences: &mut Preferences,
    params: &ConvergenceParameters,
) -> anyhow::Result<()> {
    preferences.set_slider(ALPHA_SLIDER, params.alpha)?;
    preferences.set_slider(BETA_SLIDER, params.beta)?;
    Ok(())
}

#[wasm_bindgen]
impl WasmWorkbench {
    /// Recomputes the report for the given slider values and stores them.
    /// Degenerate values (β ≤ 0) yield `null` fields rather than an error.
    pub fn analyze_convergence(&mut self, alpha: f64, beta: f64) -> Result<JsValue, JsValue> {
        let params = ConvergenceParameters { alpha, beta };
        remember_parameters(self.inner.preferences_mut(), &params).map_err(to_js_error)?;
        to_js(&self.inner.analyze(&params))
    }

    pub fn sweep_alpha(&self, beta: f64, steps: u32) -> Result<JsValue, JsValue> {
        let points = sweep_alpha(beta, steps as usize, &self.inner.config().constants)
            .map_err(to_js_error)?;
        to_js(&points)
    }

    pub fn sweep_beta(&self, alpha: f64, steps: u32) -> Result<JsValue, JsValue> {
        let points = sweep_beta(alpha, steps as usize, &self.inner.config().constants)
            .map_err(to_js_error)?;
        to_js(&points)
    }
}
