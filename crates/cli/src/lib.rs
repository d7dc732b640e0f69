//! Command-line front end for the dataset fixup operations.

use anyhow::{Context, Result};
use bids_types::{FixupConfig, NameSource, SchemePreset, SchemeSetting, SubjectId};
use clap::{Parser, Subcommand, ValueEnum};
use fixup::{AuditReport, CancelFlag, CleanupReport, FixReport, RecreateReport, RunOptions};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default location of the config file, relative to the dataset root.
pub const DEFAULT_CONFIG_FILE: &str = "fixup.yaml";

#[derive(Debug, Parser)]
#[command(name = "bids_fixup", about = "Repair BrainVision file naming in a BIDS EEG dataset")]
pub struct Cli {
    /// Dataset root containing the sub-* directories
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// YAML config file (defaults to <root>/fixup.yaml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Naming scheme preset, overriding the config file
    #[arg(long, value_enum)]
    pub scheme: Option<PresetArg>,

    /// BIDS task label, overriding the config file
    #[arg(long)]
    pub task: Option<String>,

    /// Report what would change without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON instead of a text summary
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Delete legacy-named copies anywhere under the root
    Cleanup,
    /// Copy each subject's recording to its legacy names
    Recreate {
        #[arg(long, value_enum)]
        names: Option<NamesArg>,
    },
    /// Cleanup followed by recreate
    Fix {
        #[arg(long, value_enum)]
        names: Option<NamesArg>,
    },
    /// Compare each header with the naming scheme
    Audit,
    /// Print the legacy stem of every subject found
    Names,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    Corrected,
    Initial,
}

impl From<PresetArg> for SchemePreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Corrected => SchemePreset::Corrected,
            PresetArg::Initial => SchemePreset::Initial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NamesArg {
    Scheme,
    Header,
}

impl From<NamesArg> for NameSource {
    fn from(arg: NamesArg) -> Self {
        match arg {
            NamesArg::Scheme => NameSource::Scheme,
            NamesArg::Header => NameSource::Header,
        }
    }
}

/// One row of the `names` listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameRow {
    pub subject: SubjectId,
    pub legacy_stem: Option<String>,
}

/// Result of whichever command ran.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CommandReport {
    Cleanup(CleanupReport),
    Recreate(RecreateReport),
    Fix(FixReport),
    Audit(AuditReport),
    Names(Vec<NameRow>),
}

impl CommandReport {
    pub fn is_clean(&self) -> bool {
        match self {
            CommandReport::Cleanup(r) => r.is_clean(),
            CommandReport::Recreate(r) => r.is_clean(),
            CommandReport::Fix(r) => r.is_clean(),
            CommandReport::Audit(r) => r.is_consistent(),
            CommandReport::Names(_) => true,
        }
    }

    pub fn render(&self, json: bool) -> Result<String> {
        if json {
            serde_json::to_string_pretty(self).context("Failed to serialize report")
        } else {
            Ok(self.to_string())
        }
    }
}

impl fmt::Display for CommandReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandReport::Cleanup(r) => write!(f, "{}", r),
            CommandReport::Recreate(r) => write!(f, "{}", r),
            CommandReport::Fix(r) => write!(f, "{}", r),
            CommandReport::Audit(r) => write!(f, "{}", r),
            CommandReport::Names(rows) => {
                for row in rows {
                    writeln!(
                        f,
                        "{}\t{}",
                        row.subject,
                        row.legacy_stem.as_deref().unwrap_or("-")
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// Builds the effective config: file (explicit or `<root>/fixup.yaml`),
/// then command-line overrides.
pub fn resolve_config(cli: &Cli) -> Result<FixupConfig> {
    let implicit = cli.root.join(DEFAULT_CONFIG_FILE);
    let path: Option<&Path> = match &cli.config {
        Some(path) => Some(path.as_path()),
        None if implicit.is_file() => Some(implicit.as_path()),
        None => None,
    };

    let mut config = match path {
        Some(path) => FixupConfig::load(path)
            .with_context(|| format!("Could not load configuration file at '{}'", path.display()))?,
        None => FixupConfig::default(),
    };

    if let Some(preset) = cli.scheme {
        config.scheme = SchemeSetting::Preset(preset.into());
    }
    if let Some(task) = &cli.task {
        config.task = task.clone();
    }
    if let Command::Recreate { names: Some(names) } | Command::Fix { names: Some(names) } = cli.command {
        config.names = names.into();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Runs the selected command to completion on the calling thread.
pub fn run(cli: &Cli, config: &FixupConfig, cancel: CancelFlag) -> Result<CommandReport> {
    let root = cli.root.as_path();
    if !root.is_dir() {
        anyhow::bail!("Dataset root '{}' is not a directory", root.display());
    }
    let opts = RunOptions {
        dry_run: cli.dry_run,
        cancel,
    };

    let report = match cli.command {
        Command::Cleanup => CommandReport::Cleanup(fixup::cleanup(
            root,
            &config.effective_cleanup_patterns(),
            &opts,
        )?),
        Command::Recreate { .. } => CommandReport::Recreate(fixup::recreate(root, config, &opts)?),
        Command::Fix { .. } => CommandReport::Fix(fixup::fix(root, config, &opts)?),
        Command::Audit => CommandReport::Audit(fixup::audit(root, config)?),
        Command::Names => {
            let scheme = config.naming_scheme();
            let rows = fixup::discover_subjects(root)?
                .into_iter()
                .map(|s| NameRow {
                    subject: s.id,
                    legacy_stem: scheme.legacy_stem(s.id),
                })
                .collect();
            CommandReport::Names(rows)
        }
    };
    Ok(report)
}
