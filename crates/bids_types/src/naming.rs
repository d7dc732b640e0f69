//! Mapping from BIDS subjects to the acquisition-time recording names that
//! BrainVision headers still reference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::ConfigError;
use crate::subject::SubjectId;

/// The three files making up a BrainVision recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileKind {
    /// `.vhdr` text header
    Header,
    /// `.vmrk` marker file
    Marker,
    /// `.eeg` binary sample data
    Data,
}

impl FileKind {
    pub fn extension(self) -> &'static str {
        match self {
            FileKind::Header => "vhdr",
            FileKind::Marker => "vmrk",
            FileKind::Data => "eeg",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "vhdr" => Some(FileKind::Header),
            "vmrk" => Some(FileKind::Marker),
            "eeg" => Some(FileKind::Data),
            _ => None,
        }
    }
}

/// An inclusive range of subjects sharing one legacy prefix and offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingSegment {
    pub first: u32,
    pub last: u32,
    pub prefix: String,
    /// Added to the subject number to get the legacy recording number.
    pub offset: i64,
}

impl NamingSegment {
    pub fn new(first: u32, last: u32, prefix: &str, offset: i64) -> Self {
        Self {
            first,
            last,
            prefix: prefix.to_string(),
            offset,
        }
    }

    pub fn contains(&self, subject: SubjectId) -> bool {
        (self.first..=self.last).contains(&subject.number())
    }
}

/// Ordered list of segments plus the shared stem suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingScheme {
    pub segments: Vec<NamingSegment>,
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// Prefix used for subjects outside every segment. `None` leaves them unmapped.
    #[serde(default)]
    pub fallback_prefix: Option<String>,
}

fn default_suffix() -> String {
    "VO".to_string()
}

impl Default for NamingScheme {
    fn default() -> Self {
        Self::corrected()
    }
}

impl NamingScheme {
    /// Offsets read back from the recorded headers. The COCOA numbering skips
    /// two recordings, one after sub-056 and one after sub-077.
    pub fn corrected() -> Self {
        Self {
            segments: vec![
                NamingSegment::new(1, 56, "COCOA", 12),
                NamingSegment::new(57, 77, "COCOA", 13),
                NamingSegment::new(78, 96, "COCOA", 14),
                NamingSegment::new(111, 127, "SASA", -96),
            ],
            suffix: default_suffix(),
            fallback_prefix: None,
        }
    }

    /// The first-pass mapping with one COCOA offset for every subject and a
    /// catch-all `SUBJECT` prefix. Only useful for finding what it produced.
    pub fn initial() -> Self {
        Self {
            segments: vec![
                NamingSegment::new(1, 96, "COCOA", 13),
                NamingSegment::new(111, 127, "SASA", -96),
            ],
            suffix: default_suffix(),
            fallback_prefix: Some("SUBJECT".to_string()),
        }
    }

    /// Legacy stem such as `COCOA_013_VO`, or `None` if the subject is unmapped.
    pub fn legacy_stem(&self, subject: SubjectId) -> Option<String> {
        match self.segments.iter().find(|s| s.contains(subject)) {
            Some(segment) => {
                let number = i64::from(subject.number()).checked_add(segment.offset)?;
                if number < 0 {
                    return None;
                }
                Some(format!("{}_{:03}_{}", segment.prefix, number, self.suffix))
            }
            None => self
                .fallback_prefix
                .as_ref()
                .map(|prefix| format!("{}_{:03}_{}", prefix, subject.number(), self.suffix)),
        }
    }

    pub fn legacy_file_name(&self, subject: SubjectId, kind: FileKind) -> Option<String> {
        self.legacy_stem(subject)
            .map(|stem| format!("{}.{}", stem, kind.extension()))
    }

    /// Glob patterns matching every file this scheme's segments can produce.
    pub fn cleanup_patterns(&self) -> Vec<String> {
        let prefixes: BTreeSet<&str> = self.segments.iter().map(|s| s.prefix.as_str()).collect();
        prefixes
            .into_iter()
            .map(|prefix| format!("{}_*_{}.*", prefix, self.suffix))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segments.is_empty() && self.fallback_prefix.is_none() {
            return Err(invalid("scheme maps no subjects"));
        }
        check_name_part("suffix", &self.suffix)?;
        if let Some(fallback) = &self.fallback_prefix {
            check_name_part("fallback prefix", fallback)?;
        }

        for (i, segment) in self.segments.iter().enumerate() {
            check_name_part("prefix", &segment.prefix)?;
            if segment.offset.unsigned_abs() > u64::from(u32::MAX) {
                return Err(invalid(format!(
                    "segment {}..={} offset {} is out of range",
                    segment.first, segment.last, segment.offset
                )));
            }
            if segment.first > segment.last {
                return Err(invalid(format!(
                    "segment {}..={} has first > last",
                    segment.first, segment.last
                )));
            }
            for other in &self.segments[..i] {
                if segment.first <= other.last && other.first <= segment.last {
                    return Err(invalid(format!(
                        "segment {}..={} overlaps {}..={}",
                        segment.first, segment.last, other.first, other.last
                    )));
                }
            }
        }
        Ok(())
    }
}

fn check_name_part(what: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(invalid(format!("{} must not be empty", what)));
    }
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(invalid(format!("{} '{}' is not a plain file name", what, value)));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidScheme {
        message: message.into(),
    }
}
