//! Grid sampling of one-variable expressions for the visualisation panel.

use crate::equation_engine::compile_expression;
use crate::traits::UnivariateFunction;
use anyhow::{bail, Result};
use log::debug;
use serde::{Deserialize, Serialize};

/// Name of the free variable plotted expressions are compiled against.
pub const PLOT_VARIABLE: &str = "x";

/// Ratio between grid spacing and the finite-difference step.
const DERIVATIVE_STEP_DIVISOR: f64 = 10.0;

/// Largest grid a single sampling request may ask for.
pub const MAX_SAMPLE_POINTS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SamplerConfig {
    pub x_min: f64,
    pub x_max: f64,
    pub points: usize,
    /// Samples and derivatives with a larger magnitude are dropped.
    pub magnitude_ceiling: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            x_min: -10.0,
            x_max: 10.0,
            points: 200,
            magnitude_ceiling: 1000.0,
        }
    }
}

impl SamplerConfig {
    pub fn with_domain(x_min: f64, x_max: f64, points: usize) -> Self {
        Self {
            x_min,
            x_max,
            points,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.x_min.is_finite() || !self.x_max.is_finite() || self.x_max <= self.x_min {
            bail!("Sampling domain must be finite with x_max > x_min.");
        }
        if !(self.x_max - self.x_min).is_finite() {
            bail!("Sampling domain width must be finite.");
        }
        if self.points < 2 {
            bail!("Sampling needs at least 2 points.");
        }
        if self.points > MAX_SAMPLE_POINTS {
            bail!("Sampling is limited to {MAX_SAMPLE_POINTS} points.");
        }
        let spacing = self.spacing();
        if !spacing.is_finite() || self.x_min + spacing <= self.x_min {
            bail!("Grid spacing is not resolvable for this domain.");
        }
        if !self.magnitude_ceiling.is_finite() || self.magnitude_ceiling <= 0.0 {
            bail!("Magnitude ceiling must be positive and finite.");
        }
        Ok(())
    }

    pub fn spacing(&self) -> f64 {
        (self.x_max - self.x_min) / (self.points - 1) as f64
    }

    /// The `index`-th grid abscissa; the last one is exactly `x_max`.
    pub fn grid_point(&self, index: usize) -> f64 {
        if index + 1 == self.points {
            self.x_max
        } else {
            self.x_min + self.spacing() * index as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotSample {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub derivative: Option<f64>,
}

/// Lazy walk over the sampling grid, skipping unplottable points.
pub struct Samples<'a, F: ?Sized> {
    function: &'a F,
    config: SamplerConfig,
    step: f64,
    index: usize,
}

impl<F: UnivariateFunction + ?Sized> Samples<'_, F> {
    fn bounded(&self, value: Option<f64>) -> Option<f64> {
        value.filter(|v| v.is_finite() && v.abs() <= self.config.magnitude_ceiling)
    }

    fn derivative_at(&self, x: f64) -> Option<f64> {
        let forward = self.function.value_at(x + self.step)?;
        let backward = self.function.value_at(x - self.step)?;
        self.bounded(Some((forward - backward) / (2.0 * self.step)))
    }
}

impl<F: UnivariateFunction + ?Sized> Iterator for Samples<'_, F> {
    type Item = PlotSample;

    fn next(&mut self) -> Option<PlotSample> {
        while self.index < self.config.points {
            let x = self.config.grid_point(self.index);
            self.index += 1;
            let Some(y) = self.bounded(self.function.value_at(x)) else {
                continue;
            };
            return Some(PlotSample {
                x,
                y,
                derivative: self.derivative_at(x),
            });
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.config.points - self.index))
    }
}

pub fn samples<'a, F: UnivariateFunction + ?Sized>(
    function: &'a F,
    config: &SamplerConfig,
) -> Result<Samples<'a, F>> {
    config.validate()?;
    Ok(Samples {
        function,
        config: config.clone(),
        step: config.spacing() / DERIVATIVE_STEP_DIVISOR,
        index: 0,
    })
}

pub fn sample_function<F: UnivariateFunction + ?Sized>(
    function: &F,
    config: &SamplerConfig,
) -> Result<Vec<PlotSample>> {
    Ok(samples(function, config)?.collect())
}

/// Compiles `expression` against `x` and samples it over `config`.
pub fn sample_expression(expression: &str, config: &SamplerConfig) -> Result<Vec<PlotSample>> {
    let compiled = compile_expression(expression, &[PLOT_VARIABLE.to_string()])?;
    let sampled = sample_function(&compiled, config)?;
    debug!(
        "sampled {:?}: {} of {} points kept",
        expression,
        sampled.len(),
        config.points
    );
    Ok(sampled)
}
