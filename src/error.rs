// Video Remixer Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemixError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("Job already exists: {0}")]
    JobExists(String),

    #[error("Job busy: {0}")]
    JobBusy(String),

    #[error("FFprobe error: {0}")]
    FFprobe(String),

    #[error("FFmpeg exited with code {code}: {diagnostics}")]
    FFmpegFailure { code: i32, diagnostics: String },

    #[error("FFmpeg could not be started: {0}")]
    FFmpegUnavailable(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for RemixError {
    fn from(err: anyhow::Error) -> Self {
        RemixError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RemixError>;
