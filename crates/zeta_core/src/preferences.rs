//! Persisted UI preferences.
//!
//! The browser keeps the JSON blob; this module owns the load/save boundary.

use crate::simulation::SimulationOutcome;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to decode preferences: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode preferences: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("slider `{name}` must be finite, found {value}")]
    NonFiniteSlider { name: String, value: f64 },
}

/// Navigation sections of the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    #[default]
    Overview,
    Theory,
    Simulation,
    Workbench,
    Convergence,
    Parameters,
    Visualization,
    Verification,
    References,
}

impl Section {
    pub const ALL: [Section; 9] = [
        Section::Overview,
        Section::Theory,
        Section::Simulation,
        Section::Workbench,
        Section::Convergence,
        Section::Parameters,
        Section::Visualization,
        Section::Verification,
        Section::References,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Section::Overview => "overview",
            Section::Theory => "theory",
            Section::Simulation => "simulation",
            Section::Workbench => "workbench",
            Section::Convergence => "convergence",
            Section::Parameters => "parameters",
            Section::Visualization => "visualization",
            Section::Verification => "verification",
            Section::References => "references",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.id() == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub active_section: Section,
    pub sliders: BTreeMap<String, f64>,
    pub last_simulation: Option<SimulationOutcome>,
}

impl Preferences {
    pub fn from_json(json: &str) -> Result<Self, PreferencesError> {
        serde_json::from_str(json).map_err(PreferencesError::Decode)
    }

    pub fn to_json(&self) -> Result<String, PreferencesError> {
        serde_json::to_string(self).map_err(PreferencesError::Encode)
    }

    /// Corrupt or missing data falls back to defaults.
    pub fn load_or_default(json: Option<&str>) -> Self {
        match json.map(Self::from_json) {
            Some(Ok(preferences)) => preferences,
            Some(Err(err)) => {
                warn!("discarding stored preferences: {err}");
                Self::default()
            }
            None => Self::default(),
        }
    }

    pub fn set_slider(&mut self, name: &str, value: f64) -> Result<(), PreferencesError> {
        if !value.is_finite() {
            return Err(PreferencesError::NonFiniteSlider {
                name: name.to_string(),
                value,
            });
        }
        self.sliders.insert(name.to_string(), value);
        Ok(())
    }

    pub fn slider(&self, name: &str) -> Option<f64> {
        self.sliders.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{run_simulation, SimulationConfig};

    #[test]
    fn preferences_survive_json_round_trip() {
        let mut preferences = Preferences {
            active_section: Section::Convergence,
            ..Preferences::default()
        };
        preferences.set_slider("alpha", 0.2).expect("finite");
        preferences.last_simulation =
            Some(run_simulation(&SimulationConfig::default(), |_| {}).expect("should run"));
        let json = preferences.to_json().expect("encodes");
        assert!(json.contains("\"activeSection\":\"convergence\""));
        assert_eq!(Preferences::from_json(&json).expect("decodes"), preferences);
    }

    #[test]
    fn missing_fields_default() {
        let preferences = Preferences::from_json(r#"{"sliders":{"beta":4.5}}"#).expect("decodes");
        assert_eq!(preferences.active_section, Section::Overview);
        assert_eq!(preferences.slider("beta"), Some(4.5));
        assert!(preferences.last_simulation.is_none());
    }

    #[test]
    fn corrupt_data_falls_back_to_defaults() {
        assert!(matches!(
            Preferences::from_json("{not json"),
            Err(PreferencesError::Decode(_))
        ));
        assert_eq!(Preferences::load_or_default(Some("{not json")), Preferences::default());
        assert_eq!(Preferences::load_or_default(None), Preferences::default());
    }

    #[test]
    fn non_finite_sliders_are_rejected() {
        let mut preferences = Preferences::default();
        assert!(preferences.set_slider("alpha", f64::NAN).is_err());
        assert_eq!(preferences.slider("alpha"), None);
    }

    #[test]
    fn section_ids_round_trip() {
        for section in Section::ALL {
            assert_eq!(Section::from_id(section.id()), Some(section));
        }
        assert_eq!(Section::from_id("nowhere"), None);
    }
}
