//! Cleanup followed by recreate, the usual way to repair a dataset.

use bids_types::FixupConfig;
use std::path::Path;
use tracing::info;

use crate::cleanup::cleanup;
use crate::error::FixupResult;
use crate::recreate::recreate;
use crate::report::FixReport;
use crate::RunOptions;

pub fn fix(root: &Path, config: &FixupConfig, opts: &RunOptions) -> FixupResult<FixReport> {
    config.validate()?;

    info!("Step 1: Cleaning up incorrect files...");
    let cleanup = cleanup(root, &config.effective_cleanup_patterns(), opts)?;

    info!("Step 2: Recreating files with correct names...");
    let recreate = recreate(root, config, opts)?;

    Ok(FixReport { cleanup, recreate })
}
