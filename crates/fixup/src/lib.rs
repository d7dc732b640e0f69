//! Repairs BrainVision file naming in a BIDS EEG dataset.
//!
//! Headers recorded at acquisition time still reference their companions by
//! the original study names (`COCOA_013_VO.eeg`), while the dataset stores
//! them under BIDS names. This crate sweeps stale copies, recreates the
//! legacy-named copies next to the BIDS files and audits the result.

pub mod audit;
pub mod cancel;
pub mod cleanup;
pub mod error;
pub mod fix;
pub mod fsops;
pub mod recreate;
pub mod report;
pub mod scan;

// Re-export commonly used types
pub use audit::audit;
pub use cancel::CancelFlag;
pub use cleanup::cleanup;
pub use error::*;
pub use fix::fix;
pub use recreate::{recreate, target_names, Targets};
pub use report::*;
pub use scan::{discover_subjects, find_source, SubjectDir};

/// Options shared by every mutating operation.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Log what would change without touching the filesystem
    pub dry_run: bool,
    /// Checked between subjects; set it to stop a run early
    pub cancel: CancelFlag,
}
