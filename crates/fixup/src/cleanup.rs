//! Deletes legacy-named copies anywhere under the dataset root.

use glob::{glob, Pattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{FixupError, FixupResult};
use crate::fsops;
use crate::report::{CleanupReport, FileFailure, RunWindow};
use crate::RunOptions;

/// Collects every file under `root` matching one of `patterns`, at any depth.
pub fn find_matches(root: &Path, patterns: &[String]) -> FixupResult<Vec<PathBuf>> {
    let root_text = root.to_string_lossy();
    let escaped_root = Pattern::escape(&root_text);

    let mut found = BTreeSet::new();
    for pattern in patterns {
        let full = format!("{}/**/{}", escaped_root.trim_end_matches('/'), pattern);
        let paths = glob(&full).map_err(|source| FixupError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => {
                    found.insert(path);
                }
                Ok(_) => {}
                Err(e) => warn!("Could not inspect {}: {}", e.path().display(), e.error()),
            }
        }
    }
    Ok(found.into_iter().collect())
}

/// Removes `paths` one by one. A failure is recorded and the sweep moves on
/// to the next path.
pub fn delete_matches(paths: &[PathBuf], dry_run: bool) -> (usize, Vec<FileFailure>) {
    let mut deleted = 0;
    let mut failures = Vec::new();
    for path in paths {
        if dry_run {
            info!("  Would delete: {}", path.display());
            continue;
        }
        match fsops::remove(path) {
            Ok(()) => {
                debug!("  Deleted: {}", path.display());
                deleted += 1;
            }
            Err(e) => {
                warn!("  Error deleting {}: {}", path.display(), e);
                failures.push(FileFailure {
                    path: path.clone(),
                    message: e.to_string(),
                });
            }
        }
    }
    (deleted, failures)
}

/// Deletes every match. Per-file failures are recorded and the sweep continues.
pub fn cleanup(root: &Path, patterns: &[String], opts: &RunOptions) -> FixupResult<CleanupReport> {
    let mut window = RunWindow::start();
    info!("Working in directory: {}", root.display());

    let matched = find_matches(root, patterns)?;
    info!("Found {} files to delete", matched.len());

    let (deleted, failures) = delete_matches(&matched, opts.dry_run);

    window.finish();
    Ok(CleanupReport {
        window,
        dry_run: opts.dry_run,
        patterns: patterns.to_vec(),
        matched,
        deleted,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    fn patterns() -> Vec<String> {
        vec!["COCOA_*_VO.*".to_string(), "SASA_*_VO.*".to_string()]
    }

    #[test]
    fn matches_at_any_depth() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("COCOA_001_VO.vmrk"));
        touch(&root.join("sub-001/eeg/COCOA_013_VO.eeg"));
        touch(&root.join("sub-111/eeg/SASA_015_VO.vmrk"));
        touch(&root.join("sub-001/eeg/sub-001_task-visualoddball_eeg.vmrk"));
        touch(&root.join("sub-100/eeg/SUBJECT_100_VO.eeg"));

        let found = find_matches(root, &patterns()).unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|p| p.starts_with(root)));
    }

    #[test]
    fn deletes_matches_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let stale = root.join("sub-001/eeg/COCOA_014_VO.vmrk");
        let keep = root.join("sub-001/eeg/sub-001_task-visualoddball_eeg.vmrk");
        touch(&stale);
        touch(&keep);

        let report = cleanup(root, &patterns(), &RunOptions::default()).unwrap();
        assert_eq!(report.deleted, 1);
        assert!(report.is_clean());
        assert!(!stale.exists());
        assert!(keep.exists());
    }

    #[test]
    fn dry_run_keeps_files() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("sub-002/eeg/COCOA_014_VO.eeg");
        touch(&stale);

        let opts = RunOptions {
            dry_run: true,
            ..RunOptions::default()
        };
        let report = cleanup(dir.path(), &patterns(), &opts).unwrap();
        assert_eq!(report.matched, vec![stale.clone()]);
        assert_eq!(report.deleted, 0);
        assert!(stale.exists());
    }

    #[test]
    fn failed_delete_is_recorded_and_sweep_continues() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("sub-001/eeg/COCOA_013_VO.vmrk");
        let stale = dir.path().join("sub-002/eeg/COCOA_014_VO.vmrk");
        touch(&stale);

        let (deleted, failures) = delete_matches(&[gone.clone(), stale.clone()], false);
        assert_eq!(deleted, 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, gone);
        assert!(!stale.exists());
    }

    #[test]
    fn bad_pattern_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_matches(dir.path(), &["COCOA_[_VO.*".to_string()]).unwrap_err();
        assert!(matches!(err, FixupError::Pattern { .. }));
    }
}
