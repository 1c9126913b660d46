//! Builds the lookups the propagator works from: the rectangle's template
//! effects and a flat-index map of every addressable channel.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::address::{self, ChannelAddress, ChannelIndex};
use crate::lms::{channel_address, Element, SequenceDocument, EFFECT_TAG};

/// Template effects of every rectangle channel, keyed by address.
///
/// Holds owned snapshots taken at extraction time, so the templates stay as
/// they were even after a pass writes into a rectangle channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RectangleEffects {
    effects: BTreeMap<ChannelAddress, Vec<Element>>,
}

impl RectangleEffects {
    pub fn get(&self, address: ChannelAddress) -> Option<&[Element]> {
        self.effects.get(&address).map(Vec::as_slice)
    }

    pub fn insert(&mut self, address: ChannelAddress, effects: Vec<Element>) {
        self.effects.insert(address, effects);
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChannelAddress, &[Element])> {
        self.effects.iter().map(|(a, e)| (*a, e.as_slice()))
    }
}

/// Result of scanning a document once.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub rectangle: RectangleEffects,
    /// Flat index → address of every channel node with a translatable address.
    pub channels: BTreeMap<ChannelIndex, ChannelAddress>,
}

/// Scan the `channels` section. Nodes without a usable unit/circuit are
/// skipped; the document is not modified.
pub fn extract(document: &SequenceDocument) -> Extraction {
    let mut extraction = Extraction::default();
    let mut skipped = 0usize;

    for node in document.channel_nodes() {
        let Some(address) = channel_address(node) else {
            skipped += 1;
            continue;
        };

        match address::to_index(address) {
            Ok(index) => {
                if extraction.channels.insert(index, address).is_some() {
                    debug!("duplicate channel {address} (index {index}); keeping the last one");
                }
            }
            Err(e) => warn!("channel {address} left out of the channel index: {e}"),
        }

        if address::in_rectangle(address) {
            let effects: Vec<Element> = node.children_named(EFFECT_TAG).cloned().collect();
            match address::rectangle_cell(address) {
                Some((row, column)) => {
                    debug!("rect {row}-{column} is {address} with {} effects", effects.len());
                }
                None => debug!("{address} is in the rectangle but has no cell"),
            }
            extraction.rectangle.insert(address, effects);
        }
    }

    debug!(
        "extracted {} channels ({} rectangle, {skipped} without unit/circuit)",
        extraction.channels.len(),
        extraction.rectangle.len()
    );
    extraction
}
