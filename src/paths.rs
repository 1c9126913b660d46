//! Directory and file-name conventions for a spreading run.
//!
//! Sequences are read from an input directory and written under the same file
//! name in an output directory; assignment files live in their own directory.

use std::path::{Path, PathBuf};

/// Settings file looked up in the working directory when `--config` is absent.
pub const SETTINGS_FILE: &str = "lms-spread.json";

// ── Directory names ──────────────────────────────────────────────

pub const INPUT_DIR: &str = "inputSequences";
pub const OUTPUT_DIR: &str = "outputSequences";
pub const ASSIGN_DIR: &str = "assignFiles";

// ── Assignment file names ────────────────────────────────────────

pub const ASSIGN_BASIC_FILE: &str = "assign.json";
pub const ASSIGN_TREES_FILE: &str = "assignTrees.json";
pub const ASSIGN_RGB_FILE: &str = "assignRGB.json";
pub const ASSIGN_REINDEER_FILE: &str = "assignReindeer.json";

// ── Path builders ────────────────────────────────────────────────

pub fn input_sequence(input_dir: &Path, file_name: &str) -> PathBuf {
    input_dir.join(file_name)
}

pub fn output_sequence(output_dir: &Path, file_name: &str) -> PathBuf {
    output_dir.join(file_name)
}

pub fn assignment_file(assign_dir: &Path, file_name: &str) -> PathBuf {
    assign_dir.join(file_name)
}
