//! Read-only check that each subject's header agrees with the naming scheme
//! and that the companions it names are present.

use bids_types::{read_header, FileKind, FixupConfig, HeaderInfo};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::FixupResult;
use crate::report::{AuditEntry, AuditReport, AuditStatus, RunWindow};
use crate::scan::{discover_subjects, find_source, SubjectDir};

pub fn audit(root: &Path, config: &FixupConfig) -> FixupResult<AuditReport> {
    config.validate()?;
    let mut window = RunWindow::start();
    let scheme = config.naming_scheme();
    let subjects = discover_subjects(root)?;
    info!("Auditing {} subject directories", subjects.len());

    let mut entries = Vec::with_capacity(subjects.len());
    for subject in &subjects {
        let expected = (
            scheme.legacy_file_name(subject.id, FileKind::Data),
            scheme.legacy_file_name(subject.id, FileKind::Marker),
        );
        let (Some(expected_data), Some(expected_marker)) = expected else {
            entries.push(entry(subject, None, AuditStatus::Unmapped));
            continue;
        };

        let header = match find_source(&subject.eeg_dir(), &config.task, FileKind::Header) {
            Ok(Some(path)) => path,
            Ok(None) => {
                entries.push(entry(subject, None, AuditStatus::NoHeader));
                continue;
            }
            Err(e) => {
                let status = AuditStatus::Unreadable {
                    message: e.to_string(),
                };
                entries.push(entry(subject, None, status));
                continue;
            }
        };

        let status = match read_header(&header) {
            Ok(info) => check(subject, &info, expected_data, expected_marker),
            Err(e) => AuditStatus::Unreadable {
                message: e.to_string(),
            },
        };
        if status.is_problem() {
            warn!("{}: {}", subject.name(), status);
        } else {
            debug!("{}: {}", subject.name(), status);
        }
        entries.push(entry(subject, Some(&header), status));
    }

    window.finish();
    Ok(AuditReport { window, entries })
}

fn check(
    subject: &SubjectDir,
    info: &HeaderInfo,
    expected_data: String,
    expected_marker: String,
) -> AuditStatus {
    let data_ok = info.data_file == expected_data;
    let marker_ok = info
        .marker_file
        .as_ref()
        .map_or(true, |declared| *declared == expected_marker);

    if !(data_ok && marker_ok) {
        let mut declared = vec![info.data_file.clone()];
        declared.extend(info.marker_file.clone());
        return AuditStatus::Mismatch {
            expected: vec![expected_data, expected_marker],
            declared,
        };
    }

    let eeg_dir = subject.eeg_dir();
    let missing: Vec<String> = [Some(&info.data_file), info.marker_file.as_ref()]
        .into_iter()
        .flatten()
        .filter(|name| !eeg_dir.join(name.as_str()).is_file())
        .cloned()
        .collect();

    if missing.is_empty() {
        AuditStatus::Consistent
    } else {
        AuditStatus::Unresolved { missing }
    }
}

fn entry(subject: &SubjectDir, header: Option<&Path>, status: AuditStatus) -> AuditEntry {
    AuditEntry {
        subject: subject.id,
        header: header.map(Path::to_path_buf),
        status,
    }
}
