use crate::config::WorkbenchConfig;
use crate::convergence::{analyze_convergence, ConvergenceParameters, ConvergenceReport};
use crate::equation_engine::{evaluate, EvaluationResult};
use crate::history::EvaluationHistory;
use crate::preferences::Preferences;
use crate::sampler::{sample_expression, PlotSample};
use crate::simulation::{run_simulation, SimulationOutcome};
use anyhow::Result;

/// Application state shared by the panels: configuration, the calculator
/// history, and the persisted preferences.
#[derive(Debug, Clone)]
pub struct Workbench {
    config: WorkbenchConfig,
    history: EvaluationHistory,
    preferences: Preferences,
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new(WorkbenchConfig::default(), Preferences::default())
    }
}

impl Workbench {
    pub fn new(config: WorkbenchConfig, preferences: Preferences) -> Self {
        let history = EvaluationHistory::with_capacity(config.history_capacity);
        Self {
            config,
            history,
            preferences,
        }
    }

    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    pub fn history(&self) -> &EvaluationHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    /// Evaluates `input` and records the result, valid or not.
    pub fn evaluate(&mut self, input: &str) -> EvaluationResult {
        let result = evaluate(input);
        self.history.record(result.clone());
        result
    }

    pub fn sample(&self, expression: &str) -> Result<Vec<PlotSample>> {
        sample_expression(expression, &self.config.sampler)
    }

    pub fn analyze(&self, params: &ConvergenceParameters) -> ConvergenceReport {
        analyze_convergence(params, &self.config.constants)
    }

    /// Runs the configured simulation and keeps the outcome in the preferences.
    pub fn simulate(&mut self, on_progress: impl FnMut(f64)) -> Result<SimulationOutcome> {
        let outcome = run_simulation(&self.config.simulation, on_progress)?;
        self.preferences.last_simulation = Some(outcome.clone());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::SamplerConfig;

    #[test]
    fn evaluate_records_history_with_configured_capacity() {
        let config = WorkbenchConfig {
            history_capacity: 2,
            ..WorkbenchConfig::default()
        };
        let mut workbench = Workbench::new(config, Preferences::default());
        workbench.evaluate("1 + 1");
        workbench.evaluate("1/0");
        let latest = workbench.evaluate("2 * 3");
        assert_eq!(latest.value, 6.0);
        assert_eq!(workbench.history().len(), 2);
        let inputs: Vec<&str> = workbench
            .history()
            .entries()
            .map(|r| r.input_text.as_str())
            .collect();
        assert_eq!(inputs, vec!["2 * 3", "1/0"]);
    }

    #[test]
    fn sample_uses_configured_domain() {
        let config = WorkbenchConfig {
            sampler: SamplerConfig::with_domain(0.0, 4.0, 5),
            ..WorkbenchConfig::default()
        };
        let workbench = Workbench::new(config, Preferences::default());
        let sampled = workbench.sample("x + 1").expect("should sample");
        assert_eq!(sampled.iter().map(|s| s.y).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn simulate_stores_last_outcome() {
        let mut workbench = Workbench::default();
        let outcome = workbench.simulate(|_| {}).expect("should run");
        assert_eq!(workbench.preferences().last_simulation.as_ref(), Some(&outcome));
        let report = workbench.analyze(&ConvergenceParameters::default());
        assert_eq!(report.contraction_label(), "1.059549");
    }
}
