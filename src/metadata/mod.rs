// Metadata extraction module

pub mod ffprobe;

use serde::{Deserialize, Serialize};

/// Source video metadata the randomizer cares about
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub duration_seconds: Option<f64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub codec: Option<String>,
}

impl MediaMetadata {
    /// Duration, failing when the probe could not determine one.
    pub fn require_duration(&self) -> crate::error::Result<f64> {
        match self.duration_seconds {
            Some(d) if d > 0.0 => Ok(d),
            _ => Err(crate::error::RemixError::FFprobe(
                "source has no usable duration".to_string(),
            )),
        }
    }
}
