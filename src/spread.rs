//! Runs the selected assignment passes over one sequence.
//!
//! The document is read once and all assignment files are loaded up front;
//! passes then run in a fixed order on the same in-memory document, and the
//! result is written once at the end.

use std::fmt;
use std::path::PathBuf;

use log::{info, warn};
use serde::Serialize;

use crate::assign::{load_assignments, AssignmentSet};
use crate::error::SpreadError;
use crate::extract::extract;
use crate::lms::SequenceDocument;
use crate::propagate::{propagate, PassReport};
use crate::settings::SpreadSettings;
use crate::storage::atomic_write;

/// One family of fixtures, each with its own assignment file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssignmentKind {
    Basic,
    Trees,
    Rgb,
    Reindeer,
}

impl AssignmentKind {
    pub const fn label(self) -> &'static str {
        match self {
            AssignmentKind::Basic => "basic",
            AssignmentKind::Trees => "trees",
            AssignmentKind::Rgb => "RGB",
            AssignmentKind::Reindeer => "reindeer",
        }
    }
}

impl fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which passes to run and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpreadOptions {
    pub basic: bool,
    pub trees: bool,
    pub rgb: bool,
    /// Run only the reindeer set; the three toggles above are ignored.
    pub reindeer_only: bool,
    pub overwrite: bool,
}

impl Default for SpreadOptions {
    fn default() -> Self {
        Self {
            basic: true,
            trees: true,
            rgb: true,
            reindeer_only: false,
            overwrite: false,
        }
    }
}

impl SpreadOptions {
    /// Passes in execution order: basic → trees → RGB, or reindeer alone.
    pub fn passes(&self) -> Vec<AssignmentKind> {
        if self.reindeer_only {
            return vec![AssignmentKind::Reindeer];
        }
        [
            (self.basic, AssignmentKind::Basic),
            (self.trees, AssignmentKind::Trees),
            (self.rgb, AssignmentKind::Rgb),
        ]
        .into_iter()
        .filter_map(|(enabled, kind)| enabled.then_some(kind))
        .collect()
    }
}

/// Extract once, then apply each set in order to the same document.
pub fn spread_document(
    document: &mut SequenceDocument,
    sets: &[(AssignmentKind, AssignmentSet)],
    overwrite: bool,
) -> Vec<PassReport> {
    let extraction = extract(document);
    if extraction.rectangle.is_empty() {
        warn!("no rectangle channels found; every assignment will be reported as missing");
    }

    sets.iter()
        .map(|(kind, set)| {
            let report = propagate(document, &extraction.rectangle, set, overwrite, kind.label());
            report.log();
            report
        })
        .collect()
}

/// What a file run produced.
#[derive(Debug, Clone, Serialize)]
pub struct SpreadOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub reports: Vec<PassReport>,
}

/// Spread `file_name` from the input directory into the output directory.
///
/// Fatal errors (unreadable sequence or assignment files, failed write) abort
/// before anything is written. Accumulated per-pass errors do not; the output
/// is written regardless.
pub fn spread_file(
    settings: &SpreadSettings,
    file_name: &str,
    options: &SpreadOptions,
) -> Result<SpreadOutcome, SpreadError> {
    let input = settings.input_path(file_name);
    let output = settings.output_path(file_name);

    let passes = options.passes();
    if passes.is_empty() {
        warn!("no assignment sets selected; the sequence is copied unchanged");
    }

    let sets = passes
        .iter()
        .map(|&kind| -> Result<_, SpreadError> {
            let path = settings.assignment_path(kind);
            let set = load_assignments(&path)?;
            info!(
                "loaded {} {kind} assignments ({} child channels) from {}",
                set.len(),
                set.child_count(),
                path.display()
            );
            Ok((kind, set))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut document = SequenceDocument::read(&input).map_err(|source| SpreadError::Document {
        path: input.clone(),
        source,
    })?;
    info!("read {}", input.display());

    let reports = spread_document(&mut document, &sets, options.overwrite);

    let bytes = document.to_bytes().map_err(|source| SpreadError::Document {
        path: output.clone(),
        source,
    })?;
    drop(document);
    atomic_write(&output, &bytes)?;
    info!("wrote {}", output.display());

    Ok(SpreadOutcome {
        input,
        output,
        reports,
    })
}
