// Job system module
//
// A job is one remix request: a descriptor is created and persisted once
// (randomized parameters fixed at creation time), then applied by invoking
// ffmpeg. Descriptors are never mutated.

pub mod apply;
pub mod randomizer;
pub mod store;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Filter, FilterCatalog};
use crate::error::{RemixError, Result};
use crate::logging::RunLog;
use crate::metadata::ffprobe;
use crate::preferences::Preferences;
use crate::workspace::Workspace;

/// Retained interval of the source, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipWindow {
    pub start: f64,
    pub end: f64,
}

impl ClipWindow {
    /// A window the applier will trim to: non-empty and non-negative.
    pub fn is_valid(&self) -> bool {
        self.start >= 0.0 && self.end > self.start
    }
}

fn default_speed() -> f64 {
    1.0
}

/// Persisted record of one remix request's chosen parameters and paths.
/// Created once by `create_job`, read by the applier, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptor {
    pub job_id: String,
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    #[serde(default)]
    pub filter: Option<Filter>,
    #[serde(default)]
    pub clip: Option<ClipWindow>,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

/// Result of a successful apply.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    pub status: String,
    pub job_id: String,
    pub output_file: PathBuf,
}

/// Job ids with an apply currently in flight in this process. A second
/// apply on the same id fails fast instead of racing on the output path.
static APPLYING: std::sync::LazyLock<Mutex<HashSet<String>>> =
    std::sync::LazyLock::new(|| Mutex::new(HashSet::new()));

pub(crate) struct ApplyGuard {
    job_id: String,
}

impl ApplyGuard {
    pub(crate) fn acquire(job_id: &str) -> Result<Self> {
        let mut applying = APPLYING.lock().unwrap();
        if !applying.insert(job_id.to_string()) {
            return Err(RemixError::JobBusy(job_id.to_string()));
        }
        Ok(Self {
            job_id: job_id.to_string(),
        })
    }
}

impl Drop for ApplyGuard {
    fn drop(&mut self) {
        let mut applying = APPLYING.lock().unwrap();
        applying.remove(&self.job_id);
    }
}

/// Create a remix job for a source video: probe its duration, draw the
/// randomized parameters, and persist the descriptor. Returns the job id.
pub fn create_job(workspace: &Workspace, input_file: &Path, run_log: &RunLog) -> Result<String> {
    let catalog = FilterCatalog::load(&workspace.catalog_path())?;
    let prefs = Preferences::load(&workspace.preferences_path())?;

    let meta = ffprobe::probe(input_file)?;
    let duration = meta.require_duration()?;

    let mut rng = rand::thread_rng();
    let params = randomizer::select_job_parameters(duration, &catalog, &prefs, &mut rng);

    let job_id = Uuid::new_v4().to_string();
    let descriptor = JobDescriptor {
        job_id: job_id.clone(),
        input_file: input_file.to_path_buf(),
        output_file: workspace.output_path(&job_id),
        filter: params.filter,
        clip: params.clip,
        speed: params.speed,
        generated_at: Some(Utc::now()),
    };

    store::create(workspace, &descriptor)?;
    run_log.note(&format!(
        "Created job {} for {} (duration {:.2}s, filter {:?}, speed {})",
        job_id,
        input_file.display(),
        duration,
        descriptor.filter.as_ref().map(|f| f.id.as_str()),
        descriptor.speed
    ));

    Ok(job_id)
}

/// Apply a previously created job by invoking ffmpeg with the descriptor's
/// directives. One invocation per call; no retry.
pub fn apply_job(workspace: &Workspace, job_id: &str, run_log: &RunLog) -> Result<ApplyOutcome> {
    apply::apply(workspace, job_id, run_log)
}

/// Read accessor for a descriptor by id.
pub fn read_descriptor(workspace: &Workspace, job_id: &str) -> Result<JobDescriptor> {
    store::read(workspace, job_id)
}
