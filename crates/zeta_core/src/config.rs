use crate::convergence::ConstantsTable;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::sampler::SamplerConfig;
use crate::simulation::SimulationConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Workbench settings. Every field has a default, so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkbenchConfig {
    pub sampler: SamplerConfig,
    pub history_capacity: usize,
    pub constants: ConstantsTable,
    pub simulation: SimulationConfig,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            sampler: SamplerConfig::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            constants: ConstantsTable::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl WorkbenchConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Invalid workbench configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.sampler.validate()?;
        self.constants.validate()?;
        self.simulation.validate()?;
        Ok(())
    }
}
