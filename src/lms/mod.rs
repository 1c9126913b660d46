//! Light-O-Rama musical sequence (`.lms`) documents.
//!
//! Only the structure the spreader touches is modelled explicitly: a
//! `channels` container of `channel` elements carrying `unit` / `circuit`
//! attributes and ordered `effect` children. Everything else is kept as an
//! opaque element tree and written back unchanged.

mod document;
pub mod xml;

pub use document::{channel_address, ChannelLookupError, SequenceDocument};
pub use xml::{Element, Node};

use std::fmt;

// ── LMS format constants ────────────────────────────────────────────

pub const CHANNELS_TAG: &str = "channels";
pub const CHANNEL_TAG: &str = "channel";
pub const EFFECT_TAG: &str = "effect";
pub const UNIT_ATTR: &str = "unit";
pub const CIRCUIT_ATTR: &str = "circuit";

// ── Error type ──────────────────────────────────────────────────────

#[derive(Debug)]
pub enum DocumentError {
    Io(std::io::Error),
    Xml(quick_xml::Error),
    Parse(String),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Io(e) => write!(f, "I/O error: {e}"),
            DocumentError::Xml(e) => write!(f, "XML error: {e}"),
            DocumentError::Parse(msg) => write!(f, "Parse error: {msg}"),
        }
    }
}

impl std::error::Error for DocumentError {}

impl From<std::io::Error> for DocumentError {
    fn from(e: std::io::Error) -> Self {
        DocumentError::Io(e)
    }
}

impl From<quick_xml::Error> for DocumentError {
    fn from(e: quick_xml::Error) -> Self {
        DocumentError::Xml(e)
    }
}
