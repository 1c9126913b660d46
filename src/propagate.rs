//! Copies rectangle effects onto the channels named in an assignment set.

use std::fmt;

use log::{debug, info, warn};
use serde::Serialize;

use crate::address::{self, AddressError, ChannelAddress};
use crate::assign::{AssignmentEntry, AssignmentSet, MalformedEntry};
use crate::extract::RectangleEffects;
use crate::lms::{ChannelLookupError, SequenceDocument, EFFECT_TAG};

// ── Error accumulator ───────────────────────────────────────────────

/// An assignment record that was skipped as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code")]
pub enum AssignmentError {
    /// The model channel is not part of the rectangle (or not in the document).
    ModelNotFound { entry: AssignmentEntry },
    /// The record did not match the assignment schema.
    Malformed(MalformedEntry),
}

impl fmt::Display for AssignmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentError::ModelNotFound { entry } => {
                write!(f, "model channel {}", entry.model_channel)?;
                match address::rectangle_cell(entry.model_channel) {
                    Some((row, column)) => write!(f, " (rect {row}-{column}) is not in the document")?,
                    None => write!(f, " is not part of the rectangle")?,
                }
                write!(f, " ({} children skipped)", entry.child_channels.len())
            }
            AssignmentError::Malformed(m) => {
                write!(f, "record #{} is malformed: {} ({})", m.position, m.message, m.raw)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "code")]
pub enum ChannelErrorKind {
    NotFound,
    NoChannelsSection,
    InvalidAddress { error: AddressError },
}

impl From<ChannelLookupError> for ChannelErrorKind {
    fn from(e: ChannelLookupError) -> Self {
        match e {
            ChannelLookupError::NotFound => ChannelErrorKind::NotFound,
            ChannelLookupError::NoChannelsSection => ChannelErrorKind::NoChannelsSection,
        }
    }
}

/// A single child channel that did not receive its copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelError {
    pub channel: ChannelAddress,
    pub model: ChannelAddress,
    pub reason: ChannelErrorKind,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel {} (from model {}", self.channel, self.model)?;
        if let Some((row, column)) = address::rectangle_cell(self.model) {
            write!(f, ", rect {row}-{column}")?;
        }
        write!(f, "): ")?;
        match self.reason {
            ChannelErrorKind::NotFound => write!(f, "not in the document"),
            ChannelErrorKind::NoChannelsSection => write!(f, "document has no channels section"),
            ChannelErrorKind::InvalidAddress { error } => write!(f, "{error}"),
        }
    }
}

/// Outcome of one propagation pass. Created per pass and never merged with
/// another pass's report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PassReport {
    pub pass: String,
    pub entries_applied: usize,
    pub channels_updated: usize,
    pub effects_copied: usize,
    pub assignment_errors: Vec<AssignmentError>,
    pub channel_errors: Vec<ChannelError>,
}

impl PassReport {
    pub fn new(pass: impl Into<String>) -> Self {
        Self {
            pass: pass.into(),
            ..Self::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.assignment_errors.is_empty() || !self.channel_errors.is_empty()
    }

    /// Log one summary line. The error lists themselves are left to the caller.
    pub fn log(&self) {
        info!(
            "[{}] {} assignments applied, {} channels updated, {} effects copied, \
             {} assignment errors, {} channel errors",
            self.pass,
            self.entries_applied,
            self.channels_updated,
            self.effects_copied,
            self.assignment_errors.len(),
            self.channel_errors.len()
        );
    }
}

// ── Propagation ─────────────────────────────────────────────────────

/// Apply every entry of `assignments` to `document`.
///
/// Each child is resolved against the live document, so channels changed by
/// earlier entries or earlier passes are seen as they are now. With
/// `overwrite` the child's existing effects are removed first; otherwise the
/// copies are appended after them. A missing model skips only its own entry
/// and a missing child skips only itself.
pub fn propagate(
    document: &mut SequenceDocument,
    rectangle: &RectangleEffects,
    assignments: &AssignmentSet,
    overwrite: bool,
    pass: &str,
) -> PassReport {
    let mut report = PassReport::new(pass);

    report.assignment_errors.extend(
        assignments
            .malformed
            .iter()
            .cloned()
            .map(AssignmentError::Malformed),
    );

    for entry in &assignments.entries {
        let Some(model_effects) = rectangle.get(entry.model_channel) else {
            report.assignment_errors.push(AssignmentError::ModelNotFound {
                entry: entry.clone(),
            });
            continue;
        };

        for &child in &entry.child_channels {
            let failure = |reason| ChannelError {
                channel: child,
                model: entry.model_channel,
                reason,
            };

            let target = match document.find_channel_mut(child) {
                Ok(target) => target,
                Err(e) => {
                    let reason = match address::to_index(child) {
                        Err(error) => ChannelErrorKind::InvalidAddress { error },
                        Ok(_) => e.into(),
                    };
                    report.channel_errors.push(failure(reason));
                    continue;
                }
            };
            if let Err(e) = address::to_index(child) {
                warn!("{child} has no channel index ({e}); copying anyway");
            }

            if overwrite {
                let removed = target.remove_children_named(EFFECT_TAG);
                debug!("{child}: cleared {removed} effects");
            }
            for effect in model_effects {
                target.push(effect.clone());
            }
            report.channels_updated += 1;
            report.effects_copied += model_effects.len();
        }
        report.entries_applied += 1;
    }

    report
}
