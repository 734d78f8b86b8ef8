// Video Remixer CLI binary

use std::path::PathBuf;
use clap::{Parser, Subcommand};
use anyhow::Result;

use video_remixer::jobs::store;
use video_remixer::{apply_job, create_job, remix, RunLog, Workspace};

#[derive(Parser)]
#[command(name = "remixer")]
#[command(about = "Randomized remixing of short vertical videos", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a workspace (folders plus default config files)
    Init {
        /// Workspace root (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Create a randomized job for a source video without applying it
    Randomize {
        /// Source video path
        input: PathBuf,
        /// Workspace root (defaults to current directory)
        #[arg(short, long)]
        work_dir: Option<PathBuf>,
    },

    /// Apply a previously created job
    Apply {
        /// Job id
        job_id: String,
        /// Workspace root (defaults to current directory)
        #[arg(short, long)]
        work_dir: Option<PathBuf>,
    },

    /// Create and apply a job in one step
    Remix {
        /// Source video path
        input: PathBuf,
        /// Workspace root (defaults to current directory)
        #[arg(short, long)]
        work_dir: Option<PathBuf>,
    },

    /// Show a job descriptor
    Show {
        /// Job id
        job_id: String,
        /// Workspace root (defaults to current directory)
        #[arg(short, long)]
        work_dir: Option<PathBuf>,
    },

    /// List job descriptors, newest first
    Jobs {
        /// Workspace root (defaults to current directory)
        #[arg(short, long)]
        work_dir: Option<PathBuf>,
        /// Maximum jobs to show
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Show the tail of the most recent run log
    Logs {
        /// Workspace root (defaults to current directory)
        #[arg(short, long)]
        work_dir: Option<PathBuf>,
        /// Lines to show
        #[arg(long, default_value = "100")]
        lines: usize,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => cmd_init(path),
        Commands::Randomize { input, work_dir } => cmd_randomize(input, work_dir),
        Commands::Apply { job_id, work_dir } => cmd_apply(job_id, work_dir),
        Commands::Remix { input, work_dir } => cmd_remix(input, work_dir),
        Commands::Show { job_id, work_dir } => cmd_show(job_id, work_dir),
        Commands::Jobs { work_dir, limit } => cmd_jobs(work_dir, limit),
        Commands::Logs { work_dir, lines } => cmd_logs(work_dir, lines),
    }
}

fn workspace_at(work_dir: Option<PathBuf>) -> Workspace {
    Workspace::new(work_dir.unwrap_or_else(|| PathBuf::from(".")))
}

fn cmd_init(path: Option<PathBuf>) -> Result<()> {
    let ws = workspace_at(path);
    ws.init()?;
    println!("Initialized workspace at {}", ws.root().display());
    Ok(())
}

fn cmd_randomize(input: PathBuf, work_dir: Option<PathBuf>) -> Result<()> {
    let ws = workspace_at(work_dir);
    let run_log = RunLog::new(&ws.logs_dir());
    let job_id = create_job(&ws, &input, &run_log)?;
    println!("{}", job_id);
    Ok(())
}

fn cmd_apply(job_id: String, work_dir: Option<PathBuf>) -> Result<()> {
    let ws = workspace_at(work_dir);
    let run_log = RunLog::new(&ws.logs_dir());
    let outcome = apply_job(&ws, &job_id, &run_log)?;
    println!("{}", outcome.output_file.display());
    Ok(())
}

fn cmd_remix(input: PathBuf, work_dir: Option<PathBuf>) -> Result<()> {
    let ws = workspace_at(work_dir);
    let run_log = RunLog::new(&ws.logs_dir());
    let outcome = remix(&ws, &input, &run_log)?;
    println!("Job {} -> {}", outcome.job_id, outcome.output_file.display());
    Ok(())
}

fn cmd_show(job_id: String, work_dir: Option<PathBuf>) -> Result<()> {
    let ws = workspace_at(work_dir);
    let descriptor = video_remixer::read_descriptor(&ws, &job_id)?;
    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(())
}

fn cmd_jobs(work_dir: Option<PathBuf>, limit: usize) -> Result<()> {
    let ws = workspace_at(work_dir);
    let all = store::list(&ws)?;

    if all.is_empty() {
        println!("No jobs found");
        return Ok(());
    }

    for descriptor in all.iter().take(limit) {
        let filter = descriptor
            .filter
            .as_ref()
            .map(|f| f.id.as_str())
            .unwrap_or("-");
        let clip = descriptor
            .clip
            .map(|c| format!("{:.2}-{:.2}s", c.start, c.end))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  filter={}  clip={}  speed={}  {}",
            descriptor.job_id,
            filter,
            clip,
            descriptor.speed,
            descriptor.input_file.display()
        );
    }
    Ok(())
}

fn cmd_logs(work_dir: Option<PathBuf>, lines: usize) -> Result<()> {
    let ws = workspace_at(work_dir);
    let logs_dir = ws.logs_dir();

    let mut log_files: Vec<PathBuf> = match std::fs::read_dir(&logs_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("log"))
            .collect(),
        Err(_) => Vec::new(),
    };

    if log_files.is_empty() {
        println!("No logs found");
        return Ok(());
    }

    // File names are timestamped; lexicographic order is chronological
    log_files.sort();
    let latest = log_files.last().unwrap();
    let contents = std::fs::read_to_string(latest)?;
    let all_lines: Vec<&str> = contents.lines().collect();
    let start = all_lines.len().saturating_sub(lines);

    println!("==> {} <==", latest.display());
    for line in &all_lines[start..] {
        println!("{}", line);
    }
    Ok(())
}
