//! Simulation panel bindings, verification fixtures and file exports.

use crate::convergence::current_parameters;
use crate::workbench::{to_js, to_js_error, WasmWorkbench};
use js_sys::{Float64Array, Function};
use log::warn;
use wasm_bindgen::prelude::*;
use zeta_core::export::{script_template, zeros_to_csv};
use zeta_core::fixtures::verification_summary as core_verification_summary;
use zeta_core::Workbench;

pub(crate) fn last_estimated_zeros(workbench: &Workbench) -> Vec<f64> {
    workbench
        .preferences()
        .last_simulation
        .as_ref()
        .map(|outcome| outcome.estimated_zeros.clone())
        .unwrap_or_default()
}

pub(crate) fn current_script(workbench: &Workbench) -> String {
    script_template(
        &workbench.config().simulation,
        &current_parameters(workbench.preferences()),
    )
}

#[wasm_bindgen]
impl WasmWorkbench {
    /// Runs the cosmetic simulation; `on_progress` receives the completed fraction.
    pub fn run_simulation(&mut self, on_progress: Option<Function>) -> Result<JsValue, JsValue> {
        let outcome = self
            .inner
            .simulate(|fraction| {
                if let Some(callback) = &on_progress {
                    if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_f64(fraction)) {
                        warn!("progress callback failed: {err:?}");
                    }
                }
            })
            .map_err(to_js_error)?;
        to_js(&outcome)
    }

    /// Estimated zeros of the last run; empty before the first run.
    pub fn estimated_zeros(&self) -> Float64Array {
        Float64Array::from(last_estimated_zeros(&self.inner).as_slice())
    }

    /// Contents of the zero-list download.
    pub fn export_zeros_csv(&self) -> String {
        zeros_to_csv(&last_estimated_zeros(&self.inner))
    }

    /// Contents of the script-template download.
    pub fn export_script(&self) -> String {
        current_script(&self.inner)
    }
}

/// Static demo numbers for the verification panel.
#[wasm_bindgen]
pub fn verification_summary() -> Result<JsValue, JsValue> {
    to_js(&core_verification_summary())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_follow_last_simulation() {
        let mut workbench = Workbench::default();
        assert!(last_estimated_zeros(&workbench).is_empty());

        let outcome = workbench.simulate(|_| {}).expect("should run");
        assert_eq!(last_estimated_zeros(&workbench), outcome.estimated_zeros);
        let csv = zeros_to_csv(&last_estimated_zeros(&workbench));
        assert_eq!(csv.lines().count(), outcome.estimated_zeros.len());
    }

    #[test]
    fn script_uses_stored_sliders() {
        let mut workbench = Workbench::default();
        workbench
            .preferences_mut()
            .set_slider("alpha", 0.35)
            .expect("finite slider");
        let script = current_script(&workbench);
        assert!(script.contains("ALPHA = 0.35"));
        assert!(script.contains("BETA = 3.0"));
    }

    #[test]
    fn wasm_workbench_exports_csv_after_simulation() {
        let mut workbench = WasmWorkbench::new(None, None).expect("workbench");
        assert_eq!(workbench.export_zeros_csv(), "");
        workbench.inner.simulate(|_| {}).expect("should run");
        assert_eq!(workbench.export_zeros_csv().lines().count(), 10);
        assert!(workbench.export_script().contains("ZERO_COUNT = 10"));
    }
}
