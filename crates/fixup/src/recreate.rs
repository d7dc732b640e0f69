//! Recreates legacy-named marker and data copies next to each subject's BIDS
//! recording so that the acquisition-time headers resolve again.

use bids_types::{read_header, FileKind, FixupConfig, NameSource, NamingScheme};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{FixupError, FixupResult};
use crate::fsops;
use crate::report::{CreatedFile, RecreateReport, SubjectFailure, SubjectSkip};
use crate::scan::{discover_subjects, find_source, SubjectDir};
use crate::RunOptions;

pub use crate::report::SkipReason;

/// Target names for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    pub marker: String,
    pub data: String,
}

enum Resolution {
    Targets(Targets),
    Skip(SkipReason),
}

enum Outcome {
    Skipped(SkipReason),
    Failed(String),
}

impl From<FixupError> for Outcome {
    fn from(err: FixupError) -> Self {
        Outcome::Failed(err.to_string())
    }
}

pub fn recreate(root: &Path, config: &FixupConfig, opts: &RunOptions) -> FixupResult<RecreateReport> {
    config.validate()?;
    let scheme = config.naming_scheme();
    let subjects = discover_subjects(root)?;

    let mut report = RecreateReport::new(opts.dry_run);
    report.subjects_found = subjects.len();
    info!("Found {} subject directories", subjects.len());

    for subject in &subjects {
        if opts.cancel.is_cancelled() {
            warn!("Cancellation requested; stopping before {}", subject.name());
            report.cancelled = true;
            break;
        }
        info!("Processing {}...", subject.name());

        match process_subject(subject, config, &scheme, opts, &mut report) {
            Ok(()) => {}
            Err(Outcome::Skipped(reason)) => {
                warn!("  Warning: {} for {}", reason, subject.name());
                report.skipped.push(SubjectSkip {
                    subject: subject.id,
                    reason,
                });
            }
            Err(Outcome::Failed(message)) => {
                warn!("  Error creating files for {}: {}", subject.name(), message);
                report.failures.push(SubjectFailure {
                    subject: subject.id,
                    message,
                });
            }
        }
    }

    report.window.finish();
    Ok(report)
}

fn process_subject(
    subject: &SubjectDir,
    config: &FixupConfig,
    scheme: &NamingScheme,
    opts: &RunOptions,
    report: &mut RecreateReport,
) -> Result<(), Outcome> {
    let eeg_dir = subject.eeg_dir();
    if !eeg_dir.is_dir() {
        return Err(Outcome::Skipped(SkipReason::MissingEegDir));
    }

    let marker_src = find_source(&eeg_dir, &config.task, FileKind::Marker)?
        .ok_or(Outcome::Skipped(SkipReason::MissingMarker))?;
    let data_src = find_source(&eeg_dir, &config.task, FileKind::Data)?
        .ok_or(Outcome::Skipped(SkipReason::MissingData))?;

    let targets = match resolve_targets(subject, &eeg_dir, config, scheme)? {
        Resolution::Targets(targets) => targets,
        Resolution::Skip(reason) => return Err(Outcome::Skipped(reason)),
    };

    // Targets must never land on one of the subject's BIDS files.
    let header_src = find_source(&eeg_dir, &config.task, FileKind::Header)?;
    let mut sources = vec![marker_src.as_path(), data_src.as_path()];
    sources.extend(header_src.as_deref());

    let marker_dst = target_path(&eeg_dir, &targets.marker, &sources)?;
    let data_dst = target_path(&eeg_dir, &targets.data, &sources)?;
    if same_file_name(&marker_dst, &data_dst) {
        return Err(Outcome::Failed(format!(
            "marker and data targets are both '{}'",
            targets.data
        )));
    }

    copy_one(subject, &marker_src, &marker_dst, config, opts, report)?;
    report.markers_created += 1;
    copy_one(subject, &data_src, &data_dst, config, opts, report)?;
    report.data_created += 1;
    Ok(())
}

/// Works out the legacy names for a subject from the configured source.
pub fn target_names(
    subject: &SubjectDir,
    config: &FixupConfig,
    scheme: &NamingScheme,
) -> FixupResult<Option<Targets>> {
    match resolve_targets(subject, &subject.eeg_dir(), config, scheme)? {
        Resolution::Targets(targets) => Ok(Some(targets)),
        Resolution::Skip(_) => Ok(None),
    }
}

fn resolve_targets(
    subject: &SubjectDir,
    eeg_dir: &Path,
    config: &FixupConfig,
    scheme: &NamingScheme,
) -> FixupResult<Resolution> {
    match config.names {
        NameSource::Scheme => {
            let names = (
                scheme.legacy_file_name(subject.id, FileKind::Marker),
                scheme.legacy_file_name(subject.id, FileKind::Data),
            );
            Ok(match names {
                (Some(marker), Some(data)) => Resolution::Targets(Targets { marker, data }),
                _ => Resolution::Skip(SkipReason::Unmapped),
            })
        }
        NameSource::Header => {
            let Some(header_path) = find_source(eeg_dir, &config.task, FileKind::Header)? else {
                return Ok(Resolution::Skip(SkipReason::MissingHeader));
            };
            let info = read_header(&header_path)?;
            let marker = info
                .marker_file
                .clone()
                .unwrap_or_else(|| format!("{}.{}", info.data_stem(), FileKind::Marker.extension()));
            debug!(
                "  {} declares DataFile={} MarkerFile={}",
                header_path.display(),
                info.data_file,
                marker
            );
            Ok(Resolution::Targets(Targets {
                marker,
                data: info.data_file,
            }))
        }
    }
}

/// Joins a declared name onto the eeg directory, refusing anything that
/// would escape it or overwrite one of `sources`.
fn target_path(eeg_dir: &Path, name: &str, sources: &[&Path]) -> FixupResult<PathBuf> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().is_some();
    if !plain {
        return Err(FixupError::InvalidTarget {
            name: name.to_string(),
        });
    }
    let target = eeg_dir.join(name);
    if sources.iter().any(|source| same_file_name(&target, source)) {
        return Err(FixupError::InvalidTarget {
            name: name.to_string(),
        });
    }
    Ok(target)
}

/// Compared without case so that case-insensitive filesystems are covered.
fn same_file_name(a: &Path, b: &Path) -> bool {
    match (a.file_name(), b.file_name()) {
        (Some(a), Some(b)) => a.to_string_lossy().eq_ignore_ascii_case(&b.to_string_lossy()),
        _ => false,
    }
}

fn copy_one(
    subject: &SubjectDir,
    src: &Path,
    dst: &Path,
    config: &FixupConfig,
    opts: &RunOptions,
    report: &mut RecreateReport,
) -> Result<(), Outcome> {
    let label = |p: &Path| {
        p.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    if opts.dry_run {
        info!("  Would create: {} -> {}", label(src), label(dst));
    } else {
        fsops::copy_preserving(src, dst, config.preserve_times)?;
        info!("  Created: {} -> {}", label(src), label(dst));
    }
    report.created.push(CreatedFile {
        subject: subject.id,
        source: src.to_path_buf(),
        target: dst.to_path_buf(),
    });
    Ok(())
}
