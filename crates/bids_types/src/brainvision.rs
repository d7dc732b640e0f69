//! Minimal BrainVision `.vhdr` reader.
//!
//! Only the `[Common Infos]` section is interpreted; it is where a header
//! names its marker and data companions. Channel and amplifier sections are
//! skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::HeaderError;
use crate::naming::FileKind;

const MAGIC_RECORDER: &str = "Brain Vision Data Exchange Header File";
const MAGIC_CORE: &str = "BrainVision Data Exchange Header File";
const COMMON_INFOS: &str = "Common Infos";

/// Companion file names and the remaining `[Common Infos]` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub data_file: String,
    pub marker_file: Option<String>,
    pub common_infos: BTreeMap<String, String>,
}

impl HeaderInfo {
    /// Companion name declared for `kind`. A header never names itself.
    pub fn referenced(&self, kind: FileKind) -> Option<&str> {
        match kind {
            FileKind::Data => Some(&self.data_file),
            FileKind::Marker => self.marker_file.as_deref(),
            FileKind::Header => None,
        }
    }

    /// Stem of the declared data file (`COCOA_013_VO` for `COCOA_013_VO.eeg`).
    pub fn data_stem(&self) -> &str {
        Path::new(&self.data_file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.data_file)
    }
}

pub fn parse_header(text: &str) -> Result<HeaderInfo, HeaderError> {
    let mut lines = text.lines().map(|l| l.trim_start_matches('\u{feff}').trim());

    let first_line = lines.by_ref().find(|l| !l.is_empty()).unwrap_or_default();
    if !(first_line.starts_with(MAGIC_RECORDER) || first_line.starts_with(MAGIC_CORE)) {
        return Err(HeaderError::MissingMagic {
            first_line: first_line.to_string(),
        });
    }

    let mut in_common = false;
    let mut data_file = None;
    let mut marker_file = None;
    let mut common_infos = BTreeMap::new();

    for line in lines {
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_common = section.trim().eq_ignore_ascii_case(COMMON_INFOS);
            continue;
        }
        if !in_common {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        match key {
            "DataFile" => data_file = Some(value.to_string()),
            "MarkerFile" => marker_file = Some(value.to_string()),
            _ => {
                common_infos.insert(key.to_string(), value.to_string());
            }
        }
    }

    Ok(HeaderInfo {
        data_file: data_file
            .filter(|v| !v.is_empty())
            .ok_or(HeaderError::MissingDataFile)?,
        marker_file: marker_file.filter(|v| !v.is_empty()),
        common_infos,
    })
}

/// Reads and parses a header. Headers written by Recorder are often Latin-1,
/// so undecodable bytes are replaced rather than rejected.
pub fn read_header(path: &Path) -> Result<HeaderInfo, HeaderError> {
    let bytes = fs::read(path).map_err(|source| HeaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_header(&String::from_utf8_lossy(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Brain Vision Data Exchange Header File Version 1.0\r\n\
; Data created by the Vision Recorder\r\n\
\r\n\
[Common Infos]\r\n\
Codepage=UTF-8\r\n\
DataFile=COCOA_070_VO.eeg\r\n\
MarkerFile=COCOA_070_VO.vmrk\r\n\
DataFormat=BINARY\r\n\
; Data orientation: MULTIPLEXED=ch1,pt1, ch2,pt1 ...\r\n\
DataOrientation=MULTIPLEXED\r\n\
NumberOfChannels=32\r\n\
SamplingInterval=1000\r\n\
\r\n\
[Binary Infos]\r\n\
BinaryFormat=INT_16\r\n\
\r\n\
[Channel Infos]\r\n\
Ch1=Fp1,,0.1,µV\r\n";

    #[test]
    fn parses_recorder_header() {
        let info = parse_header(HEADER).unwrap();
        assert_eq!(info.data_file, "COCOA_070_VO.eeg");
        assert_eq!(info.marker_file.as_deref(), Some("COCOA_070_VO.vmrk"));
        assert_eq!(info.data_stem(), "COCOA_070_VO");
        assert_eq!(info.common_infos.get("NumberOfChannels").map(String::as_str), Some("32"));
        // Keys outside [Common Infos] are ignored.
        assert!(!info.common_infos.contains_key("BinaryFormat"));
    }

    #[test]
    fn referenced_by_kind() {
        let info = parse_header(HEADER).unwrap();
        assert_eq!(info.referenced(FileKind::Data), Some("COCOA_070_VO.eeg"));
        assert_eq!(info.referenced(FileKind::Marker), Some("COCOA_070_VO.vmrk"));
        assert_eq!(info.referenced(FileKind::Header), None);
    }

    #[test]
    fn accepts_core_magic_and_missing_marker() {
        let text = "BrainVision Data Exchange Header File Version 2.0\n[Common Infos]\nDataFile=a.eeg\n";
        let info = parse_header(text).unwrap();
        assert_eq!(info.data_file, "a.eeg");
        assert_eq!(info.marker_file, None);
    }

    #[test]
    fn rejects_other_files() {
        let err = parse_header("Brain Vision Data Exchange Marker File, Version 1.0\n").unwrap_err();
        assert!(matches!(err, HeaderError::MissingMagic { .. }));
        assert!(matches!(
            parse_header("").unwrap_err(),
            HeaderError::MissingMagic { .. }
        ));
    }

    #[test]
    fn data_file_outside_common_infos_does_not_count() {
        let text = "Brain Vision Data Exchange Header File Version 1.0\n[Other]\nDataFile=x.eeg\n";
        assert!(matches!(
            parse_header(text).unwrap_err(),
            HeaderError::MissingDataFile
        ));
    }

    #[test]
    fn reads_latin1_header_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Brain Vision Data Exchange Header File Version 1.0\n[Common Infos]\nDataFile=SASA_015_VO.eeg\nMarkerFile=SASA_015_VO.vmrk\n[Channel Infos]\nCh1=Fp1,,0.1,\xb5V\n")
            .unwrap();
        let info = read_header(file.path()).unwrap();
        assert_eq!(info.data_file, "SASA_015_VO.eeg");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_header(&dir.path().join("nope.vhdr")).unwrap_err();
        assert!(matches!(err, HeaderError::Io { .. }));
    }
}
