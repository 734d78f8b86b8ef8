// Filter catalog and randomization config (config/parameters.json)
//
// Read-only to this crate. Loaded fresh on every use so admin edits take
// effect without a restart; validation failures surface as CorruptData.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SPEED_OPTIONS;
use crate::error::{RemixError, Result};

/// One catalog entry: a named visual effect with numeric knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parameters: HashMap<String, f64>,
}

/// How the randomizer picks among enabled filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Proportional to the configured per-filter weight
    Weighted,
    /// Uniform over the enabled set
    Uniform,
}

impl Default for SelectionMode {
    fn default() -> Self {
        SelectionMode::Weighted
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedConfig {
    /// Chance that a job gets a non-default playback speed at all
    #[serde(default)]
    pub probability: f64,
    #[serde(default = "default_speed_options")]
    pub options: Vec<f64>,
}

fn default_speed_options() -> Vec<f64> {
    DEFAULT_SPEED_OPTIONS.to_vec()
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            probability: 0.0,
            options: default_speed_options(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RandomizationConfig {
    #[serde(default)]
    pub mode: SelectionMode,
    /// Per-filter weights for weighted mode; missing entries count as 0
    #[serde(default)]
    pub filter_weights: HashMap<String, f64>,
    #[serde(default)]
    pub speed: SpeedConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCatalog {
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub randomization: RandomizationConfig,
}

impl Default for FilterCatalog {
    fn default() -> Self {
        let mut warm = HashMap::new();
        warm.insert("colorTemperature".to_string(), 30.0);
        let mut cool = HashMap::new();
        cool.insert("colorTemperature".to_string(), -30.0);

        let mut weights = HashMap::new();
        weights.insert("colormix-warm".to_string(), 0.4);
        weights.insert("colormix-cool".to_string(), 0.4);
        weights.insert("none".to_string(), 0.2);

        Self {
            filters: vec![
                Filter {
                    id: "colormix-warm".to_string(),
                    name: "Warm color mix".to_string(),
                    parameters: warm,
                },
                Filter {
                    id: "colormix-cool".to_string(),
                    name: "Cool color mix".to_string(),
                    parameters: cool,
                },
                Filter {
                    id: "none".to_string(),
                    name: "No color change".to_string(),
                    parameters: HashMap::new(),
                },
            ],
            randomization: RandomizationConfig {
                mode: SelectionMode::Weighted,
                filter_weights: weights,
                speed: SpeedConfig::default(),
            },
        }
    }
}

impl FilterCatalog {
    /// Load and validate the catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                RemixError::NotFound(format!("filter catalog {}", path.display()))
            }
            _ => RemixError::Io(e),
        })?;

        let catalog: FilterCatalog = serde_json::from_str(&raw)
            .map_err(|e| RemixError::CorruptData(format!("filter catalog: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for f in &self.filters {
            if f.id.is_empty() {
                return Err(RemixError::CorruptData(
                    "filter catalog: empty filter id".to_string(),
                ));
            }
            if !seen.insert(f.id.as_str()) {
                return Err(RemixError::CorruptData(format!(
                    "filter catalog: duplicate filter id '{}'",
                    f.id
                )));
            }
        }

        for (id, w) in &self.randomization.filter_weights {
            if !w.is_finite() || *w < 0.0 {
                return Err(RemixError::CorruptData(format!(
                    "filter catalog: negative weight for '{}'",
                    id
                )));
            }
        }

        let speed = &self.randomization.speed;
        if !(0.0..=1.0).contains(&speed.probability) {
            return Err(RemixError::CorruptData(
                "filter catalog: speed probability outside [0,1]".to_string(),
            ));
        }
        if speed.options.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(RemixError::CorruptData(
                "filter catalog: speed options must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Look up a filter by id.
    pub fn get(&self, id: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.id == id)
    }
}
