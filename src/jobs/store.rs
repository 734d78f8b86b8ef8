// Job descriptor store
//
// One pretty-printed JSON document per job under config/generated/, named
// by job id. Create-once semantics: ids are expected unique, so an existing
// file on create is fatal. No update or delete here; cleanup after download
// belongs to the delivery boundary.

use std::io::Write;

use crate::error::{RemixError, Result};
use crate::jobs::JobDescriptor;
use crate::workspace::Workspace;

/// Persist a new descriptor. Fails with `JobExists` if a descriptor with
/// this id is already on disk.
pub fn create(workspace: &Workspace, descriptor: &JobDescriptor) -> Result<()> {
    let path = workspace.descriptor_path(&descriptor.job_id);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // create_new gives the existence check and the write a single step
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => {
                RemixError::JobExists(descriptor.job_id.clone())
            }
            _ => RemixError::Io(e),
        })?;

    let json = serde_json::to_string_pretty(descriptor)
        .map_err(|e| RemixError::Other(format!("descriptor encode: {}", e)))?;
    file.write_all(json.as_bytes())?;

    Ok(())
}

/// Read a descriptor back by id.
pub fn read(workspace: &Workspace, job_id: &str) -> Result<JobDescriptor> {
    let path = workspace.descriptor_path(job_id);
    let raw = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => RemixError::NotFound(format!("job {}", job_id)),
        _ => RemixError::Io(e),
    })?;

    serde_json::from_str(&raw)
        .map_err(|e| RemixError::CorruptData(format!("job {}: {}", job_id, e)))
}

/// List all descriptors, newest first. Unreadable entries are skipped so
/// one corrupt file cannot hide the rest of the history.
pub fn list(workspace: &Workspace) -> Result<Vec<JobDescriptor>> {
    let dir = workspace.generated_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<(std::time::SystemTime, JobDescriptor)> = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let raw = match std::fs::read_to_string(&path) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("skipping unreadable descriptor {}: {}", path.display(), e);
                continue;
            }
        };
        let descriptor: JobDescriptor = match serde_json::from_str(&raw) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("skipping corrupt descriptor {}: {}", path.display(), e);
                continue;
            }
        };

        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
        entries.push((modified, descriptor));
    }

    entries.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(entries.into_iter().map(|(_, d)| d).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::ClipWindow;
    use chrono::Utc;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn test_workspace() -> (TempDir, Workspace) {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        std::fs::create_dir_all(ws.generated_dir()).unwrap();
        (tmp, ws)
    }

    fn sample_descriptor(job_id: &str) -> JobDescriptor {
        JobDescriptor {
            job_id: job_id.to_string(),
            input_file: PathBuf::from("/uploads/video_1.mp4"),
            output_file: PathBuf::from(format!("/outputs/output-{}.mp4", job_id)),
            filter: None,
            clip: Some(ClipWindow { start: 2.0, end: 11.5 }),
            speed: 1.25,
            generated_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_round_trip() {
        let (_tmp, ws) = test_workspace();
        let descriptor = sample_descriptor("rt-1");

        create(&ws, &descriptor).unwrap();
        let loaded = read(&ws, "rt-1").unwrap();
        assert_eq!(loaded, descriptor);
    }

    #[test]
    fn test_create_rejects_existing_id() {
        let (_tmp, ws) = test_workspace();
        let descriptor = sample_descriptor("dup-1");

        create(&ws, &descriptor).unwrap();
        let err = create(&ws, &descriptor).unwrap_err();
        assert!(matches!(err, RemixError::JobExists(_)));
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (_tmp, ws) = test_workspace();
        let err = read(&ws, "no-such-job").unwrap_err();
        assert!(matches!(err, RemixError::NotFound(_)));
    }

    #[test]
    fn test_read_corrupt_json() {
        let (_tmp, ws) = test_workspace();
        std::fs::write(ws.descriptor_path("bad"), "{broken").unwrap();
        let err = read(&ws, "bad").unwrap_err();
        assert!(matches!(err, RemixError::CorruptData(_)));
    }

    #[test]
    fn test_read_missing_required_field_is_corrupt() {
        let (_tmp, ws) = test_workspace();
        // No outputFile
        std::fs::write(
            ws.descriptor_path("partial"),
            r#"{"jobId": "partial", "inputFile": "/in.mp4"}"#,
        )
        .unwrap();
        let err = read(&ws, "partial").unwrap_err();
        assert!(matches!(err, RemixError::CorruptData(_)));
    }

    #[test]
    fn test_list_skips_corrupt_entries() {
        let (_tmp, ws) = test_workspace();
        create(&ws, &sample_descriptor("ok-1")).unwrap();
        create(&ws, &sample_descriptor("ok-2")).unwrap();
        std::fs::write(ws.descriptor_path("bad"), "not json").unwrap();
        std::fs::write(ws.generated_dir().join("notes.txt"), "ignored").unwrap();

        let all = list(&ws).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|d| d.job_id.starts_with("ok-")));
    }
}
