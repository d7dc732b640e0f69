//! Dataset discovery: subject folders and their BIDS-named recordings.

use bids_types::{FileKind, SubjectId, SUBJECT_PREFIX};
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{FixupError, FixupResult};

/// A `sub-*` directory directly under the dataset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectDir {
    pub id: SubjectId,
    pub path: PathBuf,
}

impl SubjectDir {
    pub fn eeg_dir(&self) -> PathBuf {
        self.path.join("eeg")
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.id.label())
    }
}

/// Lists subject directories in numeric order.
pub fn discover_subjects(root: &Path) -> FixupResult<Vec<SubjectDir>> {
    let entries = fs::read_dir(root).map_err(|e| FixupError::io(root, e))?;

    let mut subjects = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FixupError::io(root, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(SUBJECT_PREFIX) {
            continue;
        }
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        match SubjectId::parse(name) {
            Some(id) => subjects.push(SubjectDir { id, path }),
            None => warn!("Skipping '{}': {}", name, label_problem(name)),
        }
    }

    subjects.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.path.cmp(&b.path)));
    debug!("Found {} subject directories under {}", subjects.len(), root.display());
    Ok(subjects)
}

fn label_problem(dir_name: &str) -> &'static str {
    let label = dir_name.strip_prefix(SUBJECT_PREFIX).unwrap_or(dir_name);
    if !label.is_empty() && label.bytes().all(|b| b.is_ascii_digit()) {
        "label is out of range"
    } else {
        "label is not numeric"
    }
}

/// Finds the BIDS source file of `kind` for `task` in `eeg_dir`.
///
/// When several files match, the lexicographically first one wins.
pub fn find_source(eeg_dir: &Path, task: &str, kind: FileKind) -> FixupResult<Option<PathBuf>> {
    let pattern_text = format!("*_task-{}_eeg.{}", task, kind.extension());
    let pattern = Pattern::new(&pattern_text).map_err(|source| FixupError::Pattern {
        pattern: pattern_text.clone(),
        source,
    })?;

    let entries = match fs::read_dir(eeg_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(FixupError::io(eeg_dir, e)),
    };

    let mut matches: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FixupError::io(eeg_dir, e))?;
        let path = entry.path();
        let is_match = entry
            .file_name()
            .to_str()
            .is_some_and(|name| pattern.matches(name));
        if is_match && path.is_file() {
            matches.push(path);
        }
    }
    matches.sort();

    if matches.len() > 1 {
        warn!(
            "{} files match {} in {}; using {}",
            matches.len(),
            pattern_text,
            eeg_dir.display(),
            matches[0].display()
        );
    }
    Ok(matches.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn discovers_and_sorts_subjects() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["sub-010", "sub-002", "sub-111", "sub-abc", "derivatives"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        touch(&dir.path().join("sub-003"));

        let subjects = discover_subjects(dir.path()).unwrap();
        let ids: Vec<u32> = subjects.iter().map(|s| s.id.number()).collect();
        assert_eq!(ids, vec![2, 10, 111]);
        assert_eq!(subjects[0].name(), "sub-002");
        assert_eq!(subjects[0].eeg_dir(), dir.path().join("sub-002").join("eeg"));
    }

    #[test]
    fn oversized_label_is_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub-99999999999")).unwrap();
        assert!(discover_subjects(dir.path()).unwrap().is_empty());

        assert_eq!(label_problem("sub-99999999999"), "label is out of range");
        assert_eq!(label_problem("sub-01a"), "label is not numeric");
        assert_eq!(label_problem("sub-"), "label is not numeric");
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_subjects(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn finds_source_by_task_and_kind() {
        let dir = tempfile::tempdir().unwrap();
        let eeg = dir.path().join("eeg");
        touch(&eeg.join("sub-001_task-visualoddball_eeg.vmrk"));
        touch(&eeg.join("sub-001_task-visualoddball_eeg.eeg"));
        touch(&eeg.join("sub-001_task-rest_eeg.vmrk"));
        touch(&eeg.join("COCOA_013_VO.vmrk"));

        let marker = find_source(&eeg, "visualoddball", FileKind::Marker).unwrap();
        assert_eq!(marker, Some(eeg.join("sub-001_task-visualoddball_eeg.vmrk")));
        let header = find_source(&eeg, "visualoddball", FileKind::Header).unwrap();
        assert_eq!(header, None);
    }

    #[test]
    fn first_match_wins_and_missing_dir_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let eeg = dir.path().join("eeg");
        touch(&eeg.join("sub-001_run-2_task-visualoddball_eeg.eeg"));
        touch(&eeg.join("sub-001_run-1_task-visualoddball_eeg.eeg"));

        let data = find_source(&eeg, "visualoddball", FileKind::Data).unwrap();
        assert_eq!(data, Some(eeg.join("sub-001_run-1_task-visualoddball_eeg.eeg")));
        assert_eq!(
            find_source(&dir.path().join("none"), "visualoddball", FileKind::Data).unwrap(),
            None
        );
    }
}
