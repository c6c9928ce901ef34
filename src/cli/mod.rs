//! Command-line interface for renderq.
//!
//! Provides commands for searching the audio library, cleaning and
//! advancing the job queue, planning render outputs, and inspecting
//! configuration.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config;
use crate::fsutil;
use crate::index::IndexCache;
use crate::jobs::{JobFailure, JobStore};
use crate::plan::{self, ChapterId, RenderRoots};

/// renderq - filesystem housekeeping for a personal video-rendering pipeline
#[derive(Parser, Debug)]
#[command(name = "renderq")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search a directory tree by fuzzy file name
    Search {
        /// Query (case- and accent-insensitive substring)
        query: String,

        /// Directory to search (defaults to the configured audio root)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Delete superseded job files, keeping the newest per title
    Clean {
        /// Job directory (defaults to the configured scripts root)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Mark every queued job file as processed
    Process {
        /// Job directory (defaults to the configured scripts root)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Show scripts still waiting to be rendered
    Pending {
        /// Show every pending script instead of only the newest
        #[arg(long)]
        all: bool,

        /// Job directory (defaults to the configured scripts root)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Plan output paths for a render run
    Plan {
        /// Source video paths
        videos: Vec<PathBuf>,

        /// Chapter id (defaults to a timestamp-derived id)
        #[arg(short, long)]
        chapter: Option<u64>,
    },

    /// Next sequential chapter number for a directory
    Chapter {
        /// Directory holding Cap<N> entries (defaults to the render root)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// List a folder's files, oldest first
    Ls {
        /// Directory to list
        dir: PathBuf,
    },

    /// Move a finished file into the clip staging directory
    Stage {
        /// File to move
        file: PathBuf,

        /// Name for the staged file
        #[arg(short, long)]
        name: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Search { query, dir } => search(&query, dir),
            Commands::Clean { dir } => clean(dir),
            Commands::Process { dir } => process(dir),
            Commands::Pending { all, dir } => pending(all, dir),
            Commands::Plan { videos, chapter } => plan_run(&videos, chapter),
            Commands::Chapter { dir } => chapter(dir),
            Commands::Ls { dir } => ls(&dir),
            Commands::Stage { file, name } => stage(&file, &name),
            Commands::Config => show_config(),
        }
    }
}

/// Search a directory tree by fuzzy file name
fn search(query: &str, dir: Option<PathBuf>) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => config::audio_dir()?,
    };

    let mut cache = IndexCache::new();
    let results = cache.search(&dir, query)?;

    if results.is_empty() {
        println!("No files matching '{}' under {}", query, dir.display());
        return Ok(());
    }
    for path in results {
        println!("{}", path.display());
    }
    Ok(())
}

/// Keep only the newest job file per title
fn clean(dir: Option<PathBuf>) -> Result<()> {
    let store = JobStore::new(job_dir(dir)?);
    let report = store.retain_latest()?;

    for name in &report.deleted {
        println!("Deleted: {}", name);
    }
    println!("Retained:");
    for name in &report.retained {
        println!("  {}", name);
    }
    print_failures(&report.failures);
    Ok(())
}

/// Flip every queued job file to its processed name
fn process(dir: Option<PathBuf>) -> Result<()> {
    let store = JobStore::new(job_dir(dir)?);
    let report = store.mark_processed()?;

    for (from, to) in &report.processed {
        println!("{} -> {}", from, to);
    }
    if report.processed.is_empty() {
        println!("No queued job files");
    }
    print_failures(&report.failures);
    Ok(())
}

/// Show scripts still waiting to be rendered
fn pending(all: bool, dir: Option<PathBuf>) -> Result<()> {
    let store = JobStore::new(job_dir(dir)?);
    let report = store.pending(!all)?;

    if report.scripts.is_empty() {
        println!("No pending scripts");
    }
    for script in &report.scripts {
        println!("{}", script);
    }
    print_failures(&report.failures);
    Ok(())
}

/// Plan output paths for a render run
fn plan_run(videos: &[PathBuf], chapter: Option<u64>) -> Result<()> {
    let roots = RenderRoots::from_config(config::config()?);
    let plan = plan::plan_outputs(&roots, videos, chapter.map(ChapterId));

    println!("Chapter: {}", plan.chapter);
    println!("Background audio: {}", plan.background_audio.display());
    for o in &plan.orientations {
        println!("{:?} ({} source(s)):", o.orientation, o.sources.len());
        println!("  render:  {}", o.render_path.display());
        println!("  staging: {}", o.staging_path.display());
        println!("  ending:  {}", o.ending_clip.display());
    }
    Ok(())
}

/// Next sequential chapter number for a directory
fn chapter(dir: Option<PathBuf>) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => config::render_dir()?,
    };

    println!("{}", plan::next_chapter_number(&dir)?);
    Ok(())
}

/// List a folder's files, oldest first
fn ls(dir: &Path) -> Result<()> {
    for path in fsutil::folder_contents(dir)? {
        println!("{}", path.display());
    }
    Ok(())
}

/// Move a finished file into the clip staging directory
fn stage(file: &Path, name: &str) -> Result<()> {
    let clips = config::clips_dir()?;
    fsutil::ensure_dir(&clips)?;

    let staged = fsutil::move_into(file, &clips, name)?;
    println!("Staged {}", staged.display());
    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("home:    {}", config.home.display());
    println!("audio:   {}", config.audio.display());
    println!("render:  {}", config.render.display());
    println!("clips:   {}", config.clips.display());
    println!("scripts: {}", config.scripts.display());
    match &config.config_file {
        Some(path) => println!("config:  {}", path.display()),
        None => println!("config:  (none found)"),
    }
    Ok(())
}

fn print_failures(failures: &[JobFailure]) {
    for failure in failures {
        println!("Skipped {}: {}", failure.file_name, failure.kind);
    }
}

fn job_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => config::scripts_dir(),
    }
}
