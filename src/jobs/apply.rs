// Edit applier
//
// Reads a descriptor, re-reads the preferences fresh (so enablement edits
// between creation and application are honored), derives the ffmpeg
// argument list, and runs one invocation. Arguments are always passed as a
// discrete list; no shell string is ever built from paths or parameters.

use std::path::Path;
use std::process::Command;

use crate::catalog::Filter;
use crate::constants::{
    COLOR_MIX_PREFIX, COLOR_TEMPERATURE_PARAM, FFMPEG_FILTER_THREADS, FFMPEG_THREADS, HUE_SHIFT,
    OUTPUT_CRF, OUTPUT_HEIGHT, OUTPUT_PRESET, OUTPUT_WIDTH, STDERR_TAIL_LINES,
};
use crate::error::{RemixError, Result};
use crate::jobs::{store, ApplyGuard, ApplyOutcome, JobDescriptor};
use crate::logging::RunLog;
use crate::preferences::Preferences;
use crate::workspace::Workspace;

/// Apply a job: invoke ffmpeg with the descriptor's directives and report
/// the outcome. One invocation per call, no retry, no internal timeout.
pub fn apply(workspace: &Workspace, job_id: &str, run_log: &RunLog) -> Result<ApplyOutcome> {
    let _guard = ApplyGuard::acquire(job_id)?;

    let descriptor = store::read(workspace, job_id)?;
    let prefs = Preferences::load(&workspace.preferences_path())?;

    // Render into a temp path so a failed run never leaves a partial file
    // that looks like a finished output.
    let tmp_output = descriptor.output_file.with_extension("tmp.mp4");
    let args = build_ffmpeg_args(&descriptor, &prefs, &tmp_output)?;

    run_log.note(&format!(
        "Applying job {}: ffmpeg {}",
        job_id,
        args.join(" ")
    ));

    if let Some(parent) = descriptor.output_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let result = invoke_ffmpeg(&crate::tools::ffmpeg_path(), &args);

    match result {
        Ok(()) => {
            std::fs::rename(&tmp_output, &descriptor.output_file)?;
            run_log.note(&format!(
                "Job {} succeeded: {}",
                job_id,
                descriptor.output_file.display()
            ));
            Ok(ApplyOutcome {
                status: "success".to_string(),
                job_id: job_id.to_string(),
                output_file: descriptor.output_file,
            })
        }
        Err(e) => {
            let _ = std::fs::remove_file(&tmp_output);
            run_log.note(&format!("Job {} failed: {}", job_id, e));
            Err(e)
        }
    }
}

/// Build the ordered ffmpeg argument list for a descriptor.
///
/// Directive order: resource caps, input, optional trim, video filter
/// chain (optional hue rotation, then the fixed downscale), fixed encode
/// settings with the audio stream copied verbatim, output path.
pub fn build_ffmpeg_args(
    descriptor: &JobDescriptor,
    prefs: &Preferences,
    output: &Path,
) -> Result<Vec<String>> {
    let mut args: Vec<String> = vec![
        "-threads".into(),
        FFMPEG_THREADS.to_string(),
        "-filter_threads".into(),
        FFMPEG_FILTER_THREADS.to_string(),
        "-y".into(),
        "-i".into(),
        path_str(&descriptor.input_file)?,
    ];

    // Trim only when clip randomization is currently enabled and the
    // descriptor carries a usable window; otherwise the full source runs.
    if prefs.randomize_clip {
        if let Some(clip) = descriptor.clip.filter(|c| c.is_valid()) {
            args.extend_from_slice(&[
                "-ss".into(),
                format!("{:.3}", clip.start),
                "-to".into(),
                format!("{:.3}", clip.end),
            ]);
        }
    }

    let mut vf: Vec<String> = Vec::new();
    if let Some(hue) = hue_directive(descriptor.filter.as_ref(), prefs) {
        vf.push(hue);
    }
    // Fixed downscale is always applied to bound output size and cost
    vf.push(format!("scale={}:{}", OUTPUT_WIDTH, OUTPUT_HEIGHT));
    args.extend_from_slice(&["-vf".into(), vf.join(",")]);

    args.extend_from_slice(&[
        "-crf".into(),
        OUTPUT_CRF.to_string(),
        "-preset".into(),
        OUTPUT_PRESET.into(),
        "-c:a".into(),
        "copy".into(),
    ]);
    args.push(path_str(output)?);

    Ok(args)
}

/// The two-valued hue rotation for color-mix filters: +0.02 for a positive
/// color temperature, -0.02 otherwise. Emitted only when the descriptor's
/// filter is still enabled in the current preferences and belongs to the
/// color-mix family.
fn hue_directive(filter: Option<&Filter>, prefs: &Preferences) -> Option<String> {
    let filter = filter?;
    if !prefs.filter_enabled(&filter.id) || !filter.id.starts_with(COLOR_MIX_PREFIX) {
        return None;
    }

    let temperature = filter
        .parameters
        .get(COLOR_TEMPERATURE_PARAM)
        .copied()
        .unwrap_or(0.0);
    let shift = if temperature > 0.0 { HUE_SHIFT } else { -HUE_SHIFT };
    Some(format!("hue=h={}", shift))
}

/// Run ffmpeg once with a discrete argument list, mapping the exit into
/// the error taxonomy.
fn invoke_ffmpeg(binary: &Path, args: &[String]) -> Result<()> {
    let output = Command::new(binary)
        .args(args)
        .output()
        .map_err(|e| RemixError::FFmpegUnavailable(format!("{}: {}", binary.display(), e)))?;

    if output.status.success() {
        return Ok(());
    }

    let code = output.status.code().unwrap_or(-1);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let tail: Vec<&str> = stderr
        .lines()
        .rev()
        .take(STDERR_TAIL_LINES)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    Err(RemixError::FFmpegFailure {
        code,
        diagnostics: tail.join("\n"),
    })
}

fn path_str(path: &Path) -> Result<String> {
    path.to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| RemixError::InvalidPath("Path contains non-UTF8 characters".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::ClipWindow;
    use crate::preferences::ClipLengthRange;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn descriptor(filter: Option<Filter>, clip: Option<ClipWindow>) -> JobDescriptor {
        JobDescriptor {
            job_id: "j1".to_string(),
            input_file: PathBuf::from("/uploads/in.mp4"),
            output_file: PathBuf::from("/outputs/output-j1.mp4"),
            filter,
            clip,
            speed: 1.0,
            generated_at: None,
        }
    }

    fn prefs(enabled: &[&str], randomize_clip: bool) -> Preferences {
        Preferences {
            filters: enabled.iter().map(|id| (id.to_string(), true)).collect(),
            clip_length: ClipLengthRange { min: 0.3, max: 0.7 },
            randomize_clip,
        }
    }

    fn color_filter(id: &str, temperature: f64) -> Filter {
        let mut parameters = HashMap::new();
        parameters.insert(COLOR_TEMPERATURE_PARAM.to_string(), temperature);
        Filter {
            id: id.to_string(),
            name: id.to_string(),
            parameters,
        }
    }

    #[test]
    fn test_bare_descriptor_gets_only_fixed_directives() {
        // filter=null, clip=null => scaling + encoding only, no trim, no hue
        let args =
            build_ffmpeg_args(&descriptor(None, None), &prefs(&[], true), Path::new("/t.mp4"))
                .unwrap();

        let expected = vec![
            "-threads", "1", "-filter_threads", "1", "-y", "-i", "/uploads/in.mp4",
            "-vf", "scale=320:568",
            "-crf", "30", "-preset", "medium", "-c:a", "copy", "/t.mp4",
        ];
        assert_eq!(args, expected);
    }

    #[test]
    fn test_trim_added_for_valid_window() {
        let d = descriptor(None, Some(ClipWindow { start: 2.5, end: 10.0 }));
        let args = build_ffmpeg_args(&d, &prefs(&[], true), Path::new("/t.mp4")).unwrap();

        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss + 1], "2.500");
        assert_eq!(args[ss + 2], "-to");
        assert_eq!(args[ss + 3], "10.000");
    }

    #[test]
    fn test_trim_skipped_when_preference_disabled() {
        let d = descriptor(None, Some(ClipWindow { start: 2.5, end: 10.0 }));
        let args = build_ffmpeg_args(&d, &prefs(&[], false), Path::new("/t.mp4")).unwrap();
        assert!(!args.contains(&"-ss".to_string()));
        assert!(!args.contains(&"-to".to_string()));
    }

    #[test]
    fn test_trim_skipped_for_invalid_window() {
        let d = descriptor(None, Some(ClipWindow { start: 5.0, end: 5.0 }));
        let args = build_ffmpeg_args(&d, &prefs(&[], true), Path::new("/t.mp4")).unwrap();
        assert!(!args.contains(&"-ss".to_string()));
    }

    #[test]
    fn test_hue_sign_follows_color_temperature() {
        let warm = descriptor(Some(color_filter("colormix-warm", 30.0)), None);
        let args =
            build_ffmpeg_args(&warm, &prefs(&["colormix-warm"], true), Path::new("/t.mp4"))
                .unwrap();
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[vf + 1], "hue=h=0.02,scale=320:568");

        let cool = descriptor(Some(color_filter("colormix-cool", -30.0)), None);
        let args =
            build_ffmpeg_args(&cool, &prefs(&["colormix-cool"], true), Path::new("/t.mp4"))
                .unwrap();
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[vf + 1], "hue=h=-0.02,scale=320:568");
    }

    #[test]
    fn test_zero_temperature_counts_as_negative_shift() {
        let flat = descriptor(Some(color_filter("colormix-flat", 0.0)), None);
        let args =
            build_ffmpeg_args(&flat, &prefs(&["colormix-flat"], true), Path::new("/t.mp4"))
                .unwrap();
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[vf + 1], "hue=h=-0.02,scale=320:568");
    }

    #[test]
    fn test_disabled_filter_emits_no_hue() {
        // Filter fixed at creation time, but disabled in current prefs
        let d = descriptor(Some(color_filter("colormix-warm", 30.0)), None);
        let args = build_ffmpeg_args(&d, &prefs(&[], true), Path::new("/t.mp4")).unwrap();
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[vf + 1], "scale=320:568");
    }

    #[test]
    fn test_non_color_family_emits_no_hue() {
        let d = descriptor(Some(color_filter("vignette", 30.0)), None);
        let args = build_ffmpeg_args(&d, &prefs(&["vignette"], true), Path::new("/t.mp4")).unwrap();
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[vf + 1], "scale=320:568");
    }

    #[test]
    fn test_invoke_maps_missing_binary_to_unavailable() {
        let err =
            invoke_ffmpeg(Path::new("/definitely/not/a/real/ffmpeg"), &[]).unwrap_err();
        assert!(matches!(err, RemixError::FFmpegUnavailable(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_invoke_maps_exit_code_137() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let stub = tmp.path().join("fake-ffmpeg");
        std::fs::write(&stub, "#!/bin/sh\necho 'out of memory' >&2\nexit 137\n").unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = invoke_ffmpeg(&stub, &["-y".to_string()]).unwrap_err();
        match err {
            RemixError::FFmpegFailure { code, diagnostics } => {
                assert_eq!(code, 137);
                assert!(diagnostics.contains("out of memory"));
            }
            other => panic!("expected FFmpegFailure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_apply_leaves_no_partial_output() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        ws.init().unwrap();

        // Stub ffmpeg that writes a partial output file, then fails
        let stub = tmp.path().join("fake-ffmpeg");
        let script = format!(
            "#!/bin/sh\necho partial > '{}'\nexit 1\n",
            ws.output_path("fail-1").with_extension("tmp.mp4").display()
        );
        std::fs::write(&stub, script).unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::env::set_var("REMIXER_FFMPEG_PATH", &stub);

        let descriptor = JobDescriptor {
            job_id: "fail-1".to_string(),
            input_file: tmp.path().join("in.mp4"),
            output_file: ws.output_path("fail-1"),
            filter: None,
            clip: None,
            speed: 1.0,
            generated_at: None,
        };
        store::create(&ws, &descriptor).unwrap();

        let run_log = RunLog::new(&ws.logs_dir());
        let err = apply(&ws, "fail-1", &run_log).unwrap_err();
        std::env::remove_var("REMIXER_FFMPEG_PATH");

        assert!(matches!(err, RemixError::FFmpegFailure { code: 1, .. }));
        assert!(!ws.output_path("fail-1").exists());
        assert!(!ws.output_path("fail-1").with_extension("tmp.mp4").exists());
    }

    #[test]
    fn test_apply_unknown_job_is_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        ws.init().unwrap();

        let run_log = RunLog::new(&ws.logs_dir());
        let err = apply(&ws, "missing-job", &run_log).unwrap_err();
        assert!(matches!(err, RemixError::NotFound(_)));
    }
}
