//! renderq - filesystem housekeeping for a personal video-rendering pipeline
//!
//! Helpers for the recurring chores around a small rendering setup:
//! finding media assets by fuzzy name, caching directory indices so
//! repeated searches never re-walk the tree, advancing a JSON job queue
//! held in a directory of descriptor files, and computing the output paths
//! for a render run.
//!
//! # Modules
//!
//! - `config`: path roots from env vars, config file, or defaults
//! - `index`: normalized-name directory indices and the cache over them
//! - `jobs`: job descriptor files and their lifecycle
//! - `plan`: render output planning and chapter numbering
//! - `fsutil`: small filesystem helpers
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Find an audio asset, accents and case ignored
//! renderq search cancion
//!
//! # Keep only the newest job file per title
//! renderq clean
//!
//! # Show the newest pending script
//! renderq pending
//! ```

pub mod cli;
pub mod config;
pub mod fsutil;
pub mod index;
pub mod jobs;
pub mod plan;

// Re-export main types at crate root for convenience
pub use index::{normalize, IndexCache, NameIndex};
pub use jobs::{JobDescriptor, JobFileName, JobState, JobStore};
pub use plan::{plan_outputs, ChapterId, Orientation, RenderPlan, RenderRoots};
