//! Core WASM workbench wrapper and low-level utilities.

use serde::Serialize;
use std::fmt::Display;
use wasm_bindgen::prelude::*;
use zeta_core::config::WorkbenchConfig;
use zeta_core::preferences::{Preferences, Section};
use zeta_core::sampler::{sample_expression, SamplerConfig};
use zeta_core::Workbench;

#[wasm_bindgen]
pub struct WasmWorkbench {
    pub(crate) inner: Workbench,
}

pub(crate) fn build_workbench(
    config_json: Option<&str>,
    preferences_json: Option<&str>,
) -> anyhow::Result<Workbench> {
    let config = match config_json {
        Some(json) => WorkbenchConfig::from_json(json)?,
        None => WorkbenchConfig::default(),
    };
    let preferences = Preferences::load_or_default(preferences_json);
    Ok(Workbench::new(config, preferences))
}

/// Caller-chosen domain on top of the configured ceiling.
pub(crate) fn range_config(
    base: &SamplerConfig,
    x_min: f64,
    x_max: f64,
    points: u32,
) -> SamplerConfig {
    SamplerConfig {
        x_min,
        x_max,
        points: points as usize,
        ..base.clone()
    }
}

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&format!("Failed to serialize result: {err}")))
}

pub(crate) fn to_js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
impl WasmWorkbench {
    /// Both arguments are JSON blobs; `None` selects the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: Option<String>,
        preferences_json: Option<String>,
    ) -> Result<WasmWorkbench, JsValue> {
        console_error_panic_hook::set_once();

        let inner = build_workbench(config_json.as_deref(), preferences_json.as_deref())
            .map_err(|err| JsValue::from_str(&format!("Invalid configuration: {err:#}")))?;
        Ok(WasmWorkbench { inner })
    }

    /// Returns an `EvaluationResult`; invalid input is reported in the result, never thrown.
    pub fn evaluate(&mut self, input: &str) -> Result<JsValue, JsValue> {
        to_js(&self.inner.evaluate(input))
    }

    pub fn history(&self) -> Result<JsValue, JsValue> {
        let entries: Vec<_> = self.inner.history().entries().collect();
        to_js(&entries)
    }

    pub fn clear_history(&mut self) {
        self.inner.clear_history();
    }

    /// Samples over the configured default domain.
    pub fn sample(&self, expression: &str) -> Result<JsValue, JsValue> {
        let samples = self.inner.sample(expression).map_err(to_js_error)?;
        to_js(&samples)
    }

    pub fn sample_range(
        &self,
        expression: &str,
        x_min: f64,
        x_max: f64,
        points: u32,
    ) -> Result<JsValue, JsValue> {
        let config = range_config(&self.inner.config().sampler, x_min, x_max, points);
        let samples = sample_expression(expression, &config).map_err(to_js_error)?;
        to_js(&samples)
    }

    pub fn active_section(&self) -> String {
        self.inner.preferences().active_section.id().to_string()
    }

    pub fn set_active_section(&mut self, id: &str) -> Result<(), JsValue> {
        let section = Section::from_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown section: {id}")))?;
        self.inner.preferences_mut().active_section = section;
        Ok(())
    }

    pub fn set_slider(&mut self, name: &str, value: f64) -> Result<(), JsValue> {
        self.inner
            .preferences_mut()
            .set_slider(name, value)
            .map_err(to_js_error)
    }

    pub fn slider(&self, name: &str) -> Option<f64> {
        self.inner.preferences().slider(name)
    }

    /// Serialized preferences for the browser's key-value storage.
    pub fn preferences_json(&self) -> Result<String, JsValue> {
        self.inner.preferences().to_json().map_err(to_js_error)
    }
}
