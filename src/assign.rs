//! Assignment files: which rectangle channel feeds which show channels.
//!
//! A file is a JSON array of records shaped like
//! `{"modelChannel": [27, 5], "childChannels": [[30, 1], [30, 2]]}`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::ChannelAddress;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentEntry {
    pub model_channel: ChannelAddress,
    pub child_channels: Vec<ChannelAddress>,
}

/// A record that did not match the assignment schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MalformedEntry {
    /// 0-based position of the record in the file.
    pub position: usize,
    pub message: String,
    pub raw: Value,
}

/// One assignment file, parsed record by record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentSet {
    pub entries: Vec<AssignmentEntry>,
    pub malformed: Vec<MalformedEntry>,
}

impl AssignmentSet {
    pub fn from_entries(entries: Vec<AssignmentEntry>) -> Self {
        Self {
            entries,
            malformed: Vec::new(),
        }
    }

    /// Parse a JSON document. Only a non-array top level fails the whole set;
    /// bad records are kept aside in `malformed`.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<Value> = serde_json::from_str(s)?;
        let mut set = Self::default();
        for (position, raw) in records.into_iter().enumerate() {
            match AssignmentEntry::deserialize(&raw) {
                Ok(entry) => set.entries.push(entry),
                Err(e) => set.malformed.push(MalformedEntry {
                    position,
                    message: e.to_string(),
                    raw,
                }),
            }
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.entries.len() + self.malformed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total child channels across all well-formed entries.
    pub fn child_count(&self) -> usize {
        self.entries.iter().map(|e| e.child_channels.len()).sum()
    }
}

// ── Error type ──────────────────────────────────────────────────────

#[derive(Debug)]
pub enum AssignmentFileError {
    Io { path: PathBuf, source: std::io::Error },
    Json { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for AssignmentFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentFileError::Io { path, source } => {
                write!(f, "cannot read assignment file {}: {source}", path.display())
            }
            AssignmentFileError::Json { path, source } => {
                write!(f, "assignment file {} is not a JSON array of records: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for AssignmentFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssignmentFileError::Io { source, .. } => Some(source),
            AssignmentFileError::Json { source, .. } => Some(source),
        }
    }
}

/// Read an assignment file in full.
pub fn load_assignments(path: &Path) -> Result<AssignmentSet, AssignmentFileError> {
    let data = fs::read_to_string(path).map_err(|source| AssignmentFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    AssignmentSet::from_json_str(&data).map_err(|source| AssignmentFileError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_in_order() {
        let set = AssignmentSet::from_json_str(
            r#"[
              {"modelChannel": [27, 5], "childChannels": [[30, 1], [30, 2]]},
              {"modelChannel": [28, 1], "childChannels": []}
            ]"#,
        )
        .unwrap();
        assert_eq!(set.entries.len(), 2);
        assert!(set.malformed.is_empty());
        assert_eq!(set.entries[0].model_channel, ChannelAddress::new(27, 5));
        assert_eq!(
            set.entries[0].child_channels,
            [ChannelAddress::new(30, 1), ChannelAddress::new(30, 2)]
        );
        assert_eq!(set.child_count(), 2);
    }

    #[test]
    fn bad_records_are_set_aside() {
        let set = AssignmentSet::from_json_str(
            r#"[
              {"modelChannel": [27], "childChannels": [[30, 1]]},
              {"modelChannel": [27, 6], "childChannels": [[30, 3]]},
              {"modelChannel": [27, -1], "childChannels": []},
              "nonsense"
            ]"#,
        )
        .unwrap();
        assert_eq!(set.entries.len(), 1);
        assert_eq!(set.entries[0].model_channel, ChannelAddress::new(27, 6));
        let positions: Vec<usize> = set.malformed.iter().map(|m| m.position).collect();
        assert_eq!(positions, [0, 2, 3]);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn non_array_file_is_rejected() {
        assert!(AssignmentSet::from_json_str(r#"{"modelChannel": [27, 5]}"#).is_err());
        assert!(AssignmentSet::from_json_str("not json").is_err());
    }

    #[test]
    fn entries_serialize_back_to_the_file_shape() {
        let entry = AssignmentEntry {
            model_channel: ChannelAddress::new(29, 12),
            child_channels: vec![ChannelAddress::new(70, 24)],
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            serde_json::json!({"modelChannel": [29, 12], "childChannels": [[70, 24]]})
        );
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = load_assignments(Path::new("/nonexistent/assign.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/assign.json"), "{err}");
    }
}
