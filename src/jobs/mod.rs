//! JSON job queue held in a directory of descriptor files.
//!
//! Jobs are created externally and consumed here: the store retains the
//! newest version per title, flips finished jobs to their processed name,
//! and surfaces the scripts still waiting to be rendered.

pub mod descriptor;
pub mod store;

pub use descriptor::{
    FileNameError, JobDescriptor, JobFileName, JobState, STATUS_DONE, STATUS_PENDING,
};
pub use store::{
    CleanupReport, FailureKind, JobFailure, JobStore, JobStoreError, PendingReport, ProcessReport,
};
