//! Output path planning for a render run.
//!
//! A run renders one chapter in both aspect ratios. Every artifact of the
//! run embeds the same chapter id so the pieces can be matched up later.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Local;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ResolvedConfig;

/// Relative path of the fixed background track under the audio root.
pub const BACKGROUND_AUDIO: &str = "Background/background.mp3";

/// Relative path of the horizontal ending clip under the audio root.
pub const ENDING_HORIZONTAL: &str = "Endings/END1.mp4";

/// Relative path of the vertical ending clip under the audio root.
pub const ENDING_VERTICAL: &str = "Endings/END1_V.mp4";

/// Identifier grouping all artifacts of one render run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterId(pub u64);

impl ChapterId {
    /// Generate an id from the current local time, `YYYYMMDDHHMMSS` read as
    /// a number, falling back to a random id if the formatted time does not
    /// parse. Two calls in the same second may collide; callers accept that.
    pub fn generate() -> Self {
        let stamp = Local::now().format("%Y%m%d%H%M%S").to_string();
        let id = stamp
            .parse()
            .unwrap_or_else(|_| rand::thread_rng().gen_range(1..=1_000_000));
        Self(id)
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Video orientation, detected from a path marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Both orientations, in planning order.
    pub const ALL: [Orientation; 2] = [Orientation::Horizontal, Orientation::Vertical];

    /// Path substring that tags a source clip with this orientation.
    pub fn marker(self) -> &'static str {
        match self {
            Orientation::Horizontal => "/BetaH/",
            Orientation::Vertical => "/BetaV/",
        }
    }

    /// Render output subdirectory name.
    pub fn output_dir(self) -> &'static str {
        match self {
            Orientation::Horizontal => "Horizontal",
            Orientation::Vertical => "Vertical",
        }
    }

    fn ending_clip(self) -> &'static str {
        match self {
            Orientation::Horizontal => ENDING_HORIZONTAL,
            Orientation::Vertical => ENDING_VERTICAL,
        }
    }

    fn staging_name(self, chapter: ChapterId) -> String {
        match self {
            Orientation::Horizontal => format!("Caps_{}.mp4", chapter),
            Orientation::Vertical => format!("Caps_{}_V.mp4", chapter),
        }
    }

    /// Orientation of a source path, if it carries either marker.
    pub fn detect(path: &Path) -> Option<Orientation> {
        let text = path.to_string_lossy();
        Self::ALL.into_iter().find(|o| text.contains(o.marker()))
    }
}

/// Filesystem roots anchoring a render plan.
///
/// Carried from configuration by the caller; planning itself never reads
/// global state.
#[derive(Debug, Clone)]
pub struct RenderRoots {
    /// Audio assets (background track, ending clips).
    pub audio: PathBuf,

    /// Final render outputs.
    pub render: PathBuf,

    /// Clip staging area.
    pub clips: PathBuf,
}

impl RenderRoots {
    /// Build roots from the resolved configuration.
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            audio: config.audio.clone(),
            render: config.render.clone(),
            clips: config.clips.clone(),
        }
    }
}

/// Everything one render run needs for a single orientation.
#[derive(Debug, Clone)]
pub struct OrientationPlan {
    pub orientation: Orientation,

    /// Source clips carrying this orientation's path marker.
    pub sources: Vec<PathBuf>,

    /// Final render output path.
    pub render_path: PathBuf,

    /// Staging path for the assembled start clip.
    pub staging_path: PathBuf,

    /// Ending clip appended to the render.
    pub ending_clip: PathBuf,
}

/// Output plan for one render run, keyed by a single chapter id.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub chapter: ChapterId,

    /// Fixed background track for the run.
    pub background_audio: PathBuf,

    /// One entry per orientation, horizontal first.
    pub orientations: Vec<OrientationPlan>,
}

impl RenderPlan {
    /// Render output paths, one per orientation.
    pub fn render_paths(&self) -> Vec<&Path> {
        self.orientations
            .iter()
            .map(|o| o.render_path.as_path())
            .collect()
    }

    /// Staging paths, one per orientation.
    pub fn staging_paths(&self) -> Vec<&Path> {
        self.orientations
            .iter()
            .map(|o| o.staging_path.as_path())
            .collect()
    }

    /// Ending clips, one per orientation.
    pub fn ending_clips(&self) -> Vec<&Path> {
        self.orientations
            .iter()
            .map(|o| o.ending_clip.as_path())
            .collect()
    }

    /// The plan for one orientation.
    pub fn orientation(&self, orientation: Orientation) -> Option<&OrientationPlan> {
        self.orientations.iter().find(|o| o.orientation == orientation)
    }
}

/// Plan the outputs for one render run.
///
/// Sources are split by orientation marker; paths matching neither marker
/// are dropped from the plan. Both orientations are always planned, even
/// with no sources, since the pipeline renders both aspect ratios per
/// chapter.
pub fn plan_outputs(
    roots: &RenderRoots,
    sources: &[PathBuf],
    chapter: Option<ChapterId>,
) -> RenderPlan {
    let chapter = chapter.unwrap_or_else(ChapterId::generate);

    let orientations = Orientation::ALL
        .into_iter()
        .map(|orientation| {
            let sources: Vec<PathBuf> = sources
                .iter()
                .filter(|p| Orientation::detect(p) == Some(orientation))
                .cloned()
                .collect();

            OrientationPlan {
                orientation,
                sources,
                render_path: roots
                    .render
                    .join(orientation.output_dir())
                    .join(format!("Caps_{}.mp4", chapter)),
                staging_path: roots.clips.join(orientation.staging_name(chapter)),
                ending_clip: roots.audio.join(orientation.ending_clip()),
            }
        })
        .collect();

    RenderPlan {
        chapter,
        background_audio: roots.audio.join(BACKGROUND_AUDIO),
        orientations,
    }
}
