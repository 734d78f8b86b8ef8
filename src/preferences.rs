// User-editable processing preferences (config/preferences.json)
//
// Loaded fresh on every job so edits between job creation and application
// are honored for enablement checks. No write path from this crate except
// the workspace bootstrap defaults.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RemixError, Result};

/// Clip length as fractions of the source duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipLengthRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Filter id -> enabled. Ids missing from the map count as disabled.
    #[serde(default)]
    pub filters: HashMap<String, bool>,
    pub clip_length: ClipLengthRange,
    pub randomize_clip: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        let mut filters = HashMap::new();
        filters.insert("colormix-warm".to_string(), true);
        filters.insert("colormix-cool".to_string(), true);
        filters.insert("none".to_string(), true);

        Self {
            filters,
            clip_length: ClipLengthRange { min: 0.3, max: 0.7 },
            randomize_clip: true,
        }
    }
}

impl Preferences {
    /// Load and validate the preferences file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                RemixError::NotFound(format!("preferences {}", path.display()))
            }
            _ => RemixError::Io(e),
        })?;

        let prefs: Preferences = serde_json::from_str(&raw)
            .map_err(|e| RemixError::CorruptData(format!("preferences: {}", e)))?;
        prefs.validate()?;
        Ok(prefs)
    }

    fn validate(&self) -> Result<()> {
        let r = &self.clip_length;
        let in_range = (0.0..=1.0).contains(&r.min) && (0.0..=1.0).contains(&r.max);
        if !in_range || r.min > r.max || !r.min.is_finite() || !r.max.is_finite() {
            return Err(RemixError::CorruptData(format!(
                "preferences: clipLength range [{}, {}] must satisfy 0 <= min <= max <= 1",
                r.min, r.max
            )));
        }
        Ok(())
    }

    /// Whether a filter id is currently enabled.
    pub fn filter_enabled(&self, id: &str) -> bool {
        self.filters.get(id).copied().unwrap_or(false)
    }
}
