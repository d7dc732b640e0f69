//! BIDS participant labels (`sub-<digits>` folders).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directory prefix BIDS uses for participant folders.
pub const SUBJECT_PREFIX: &str = "sub-";

/// Numeric participant label taken from a `sub-<digits>` directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub u32);

impl SubjectId {
    /// Parses a directory name such as `sub-001`.
    ///
    /// Returns `None` for names without the `sub-` prefix or whose label is
    /// not made only of ASCII digits.
    pub fn parse(dir_name: &str) -> Option<Self> {
        let label = dir_name.strip_prefix(SUBJECT_PREFIX)?;
        if label.is_empty() || !label.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        label.parse().ok().map(SubjectId)
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// BIDS label, zero-padded to three digits.
    pub fn label(self) -> String {
        format!("{}{:03}", SUBJECT_PREFIX, self.0)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_padded_labels() {
        assert_eq!(SubjectId::parse("sub-001"), Some(SubjectId(1)));
        assert_eq!(SubjectId::parse("sub-127"), Some(SubjectId(127)));
        assert_eq!(SubjectId::parse("sub-1000"), Some(SubjectId(1000)));
    }

    #[test]
    fn rejects_non_subject_names() {
        assert_eq!(SubjectId::parse("derivatives"), None);
        assert_eq!(SubjectId::parse("sub-"), None);
        assert_eq!(SubjectId::parse("sub-01a"), None);
        assert_eq!(SubjectId::parse("sub-+12"), None);
        assert_eq!(SubjectId::parse("SUB-001"), None);
    }

    #[test]
    fn orders_numerically() {
        let mut ids: Vec<SubjectId> = ["sub-10", "sub-2", "sub-001"]
            .iter()
            .filter_map(|n| SubjectId::parse(n))
            .collect();
        ids.sort();
        assert_eq!(ids, vec![SubjectId(1), SubjectId(2), SubjectId(10)]);
    }

    #[test]
    fn label_pads_to_three_digits() {
        assert_eq!(SubjectId(7).label(), "sub-007");
        assert_eq!(SubjectId(1234).to_string(), "sub-1234");
    }

    proptest! {
        #[test]
        fn label_parses_back(n in 0u32..100_000) {
            prop_assert_eq!(SubjectId::parse(&SubjectId(n).label()), Some(SubjectId(n)));
        }
    }
}
