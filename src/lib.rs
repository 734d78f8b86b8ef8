// Video Remixer - Library Entry Point
//
// Takes an uploaded short vertical video and produces a randomly remixed
// variant: a descriptor fixes the drawn parameters (filter, clip window,
// speed) at creation time, and applying the job shells out to ffmpeg with
// a discrete argument list.

pub mod catalog;
pub mod constants;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod metadata;
pub mod preferences;
pub mod tools;
pub mod workspace;

pub use catalog::{Filter, FilterCatalog};
pub use error::{RemixError, Result};
pub use jobs::{apply_job, create_job, read_descriptor, ApplyOutcome, ClipWindow, JobDescriptor};
pub use logging::RunLog;
pub use preferences::Preferences;
pub use workspace::Workspace;

/// Create and immediately apply a job for an uploaded source video.
/// This is the one-shot path the processing endpoint uses.
pub fn remix(workspace: &Workspace, input_file: &std::path::Path, run_log: &RunLog) -> Result<ApplyOutcome> {
    let job_id = create_job(workspace, input_file, run_log)?;
    apply_job(workspace, &job_id, run_log)
}
