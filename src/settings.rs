use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SpreadError;
use crate::paths;
use crate::spread::AssignmentKind;

/// Where sequences and assignment files live. Every field is optional in the
/// settings file; missing ones take the conventional defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadSettings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub assign_dir: PathBuf,
    pub assignment_files: AssignmentFiles,
}

/// Assignment file names, resolved against `assign_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentFiles {
    pub basic: String,
    pub trees: String,
    pub rgb: String,
    pub reindeer: String,
}

impl Default for AssignmentFiles {
    fn default() -> Self {
        Self {
            basic: paths::ASSIGN_BASIC_FILE.to_string(),
            trees: paths::ASSIGN_TREES_FILE.to_string(),
            rgb: paths::ASSIGN_RGB_FILE.to_string(),
            reindeer: paths::ASSIGN_REINDEER_FILE.to_string(),
        }
    }
}

impl Default for SpreadSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(paths::INPUT_DIR),
            output_dir: PathBuf::from(paths::OUTPUT_DIR),
            assign_dir: PathBuf::from(paths::ASSIGN_DIR),
            assignment_files: AssignmentFiles::default(),
        }
    }
}

impl SpreadSettings {
    pub fn assignment_path(&self, kind: AssignmentKind) -> PathBuf {
        let name = match kind {
            AssignmentKind::Basic => &self.assignment_files.basic,
            AssignmentKind::Trees => &self.assignment_files.trees,
            AssignmentKind::Rgb => &self.assignment_files.rgb,
            AssignmentKind::Reindeer => &self.assignment_files.reindeer,
        };
        paths::assignment_file(&self.assign_dir, name)
    }

    pub fn input_path(&self, file_name: &str) -> PathBuf {
        paths::input_sequence(&self.input_dir, file_name)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        paths::output_sequence(&self.output_dir, file_name)
    }
}

/// Load settings from `path`. A missing file yields the defaults; an
/// unreadable or malformed one is an error.
pub fn load_settings(path: &Path) -> Result<SpreadSettings, SpreadError> {
    if !path.exists() {
        return Ok(SpreadSettings::default());
    }
    let data = std::fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|e| SpreadError::Settings {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
