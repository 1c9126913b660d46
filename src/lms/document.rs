use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use quick_xml::Reader;
use serde::Serialize;

use super::xml::{Element, XmlTree};
use super::{DocumentError, CHANNELS_TAG, CHANNEL_TAG, CIRCUIT_ATTR, EFFECT_TAG, UNIT_ATTR};
use crate::address::ChannelAddress;

/// Why a channel could not be located in the live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "code")]
pub enum ChannelLookupError {
    NoChannelsSection,
    NotFound,
}

impl fmt::Display for ChannelLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelLookupError::NoChannelsSection => write!(f, "document has no channels section"),
            ChannelLookupError::NotFound => write!(f, "no channel with that unit/circuit"),
        }
    }
}

/// Parsed `unit` / `circuit` attributes of a channel node. `None` when either
/// is missing or not a non-negative integer.
pub fn channel_address(channel: &Element) -> Option<ChannelAddress> {
    let unit = channel.attr(UNIT_ATTR)?.trim().parse().ok()?;
    let circuit = channel.attr(CIRCUIT_ATTR)?.trim().parse().ok()?;
    Some(ChannelAddress::new(unit, circuit))
}

/// An in-memory sequence. Owns every channel and effect node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceDocument {
    tree: XmlTree,
}

impl SequenceDocument {
    /// Read and parse a sequence file in full.
    pub fn read(path: &Path) -> Result<Self, DocumentError> {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(64 * 1024, file);
        let tree = XmlTree::parse(Reader::from_reader(reader))?;
        Ok(Self { tree })
    }

    pub fn parse_str(s: &str) -> Result<Self, DocumentError> {
        Ok(Self {
            tree: XmlTree::parse_str(s)?,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        self.tree.to_bytes()
    }

    pub fn root(&self) -> &Element {
        &self.tree.root
    }

    pub fn channels(&self) -> Option<&Element> {
        self.tree.root.child(CHANNELS_TAG)
    }

    /// Every `channel` element of the `channels` section, in document order.
    pub fn channel_nodes(&self) -> impl Iterator<Item = &Element> {
        self.channels()
            .into_iter()
            .flat_map(|c| c.children_named(CHANNEL_TAG))
    }

    /// First channel node currently carrying `address`.
    pub fn find_channel(&self, address: ChannelAddress) -> Result<&Element, ChannelLookupError> {
        self.channels()
            .ok_or(ChannelLookupError::NoChannelsSection)?
            .children_named(CHANNEL_TAG)
            .find(|c| channel_address(c) == Some(address))
            .ok_or(ChannelLookupError::NotFound)
    }

    pub fn find_channel_mut(
        &mut self,
        address: ChannelAddress,
    ) -> Result<&mut Element, ChannelLookupError> {
        self.tree
            .root
            .child_mut(CHANNELS_TAG)
            .ok_or(ChannelLookupError::NoChannelsSection)?
            .elements_mut()
            .find(|c| c.name == CHANNEL_TAG && channel_address(c) == Some(address))
            .ok_or(ChannelLookupError::NotFound)
    }

    /// Effects of the channel at `address`, in timeline order.
    pub fn effects_of(&self, address: ChannelAddress) -> Result<Vec<&Element>, ChannelLookupError> {
        Ok(self.find_channel(address)?.children_named(EFFECT_TAG).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const DOC: &str = r#"<sequence>
      <channels>
        <channel name="a" unit="27" circuit="5"><effect type="intensity"/></channel>
        <channel name="b" unit="27" circuit="5"/>
        <channel name="no unit" circuit="3"/>
        <channel name="junk" unit="x" circuit="3"/>
        <rgbChannel name="rgb" unit="40" circuit="1"/>
      </channels>
      <tracks/>
    </sequence>"#;

    #[test]
    fn channel_nodes_only_lists_channel_elements() {
        let doc = SequenceDocument::parse_str(DOC).unwrap();
        let names: Vec<&str> = doc.channel_nodes().filter_map(|c| c.attr("name")).collect();
        assert_eq!(names, ["a", "b", "no unit", "junk"]);
    }

    #[test]
    fn channel_address_requires_both_numeric_attributes() {
        let doc = SequenceDocument::parse_str(DOC).unwrap();
        let addresses: Vec<Option<ChannelAddress>> = doc.channel_nodes().map(channel_address).collect();
        assert_eq!(
            addresses,
            [
                Some(ChannelAddress::new(27, 5)),
                Some(ChannelAddress::new(27, 5)),
                None,
                None
            ]
        );
    }

    #[test]
    fn find_channel_returns_first_match() {
        let doc = SequenceDocument::parse_str(DOC).unwrap();
        let channel = doc.find_channel(ChannelAddress::new(27, 5)).unwrap();
        assert_eq!(channel.attr("name"), Some("a"));
        assert_eq!(
            doc.find_channel(ChannelAddress::new(40, 1)),
            Err(ChannelLookupError::NotFound)
        );
    }

    #[test]
    fn missing_channels_section_is_reported() {
        let mut doc = SequenceDocument::parse_str("<sequence><tracks/></sequence>").unwrap();
        assert_eq!(doc.channel_nodes().count(), 0);
        assert_eq!(
            doc.find_channel_mut(ChannelAddress::new(1, 1)),
            Err(ChannelLookupError::NoChannelsSection)
        );
    }

    #[test]
    fn mutation_through_find_channel_mut_is_visible() {
        let mut doc = SequenceDocument::parse_str(DOC).unwrap();
        doc.find_channel_mut(ChannelAddress::new(27, 5))
            .unwrap()
            .push(Element::new(EFFECT_TAG).with_attr("type", "shimmer"));
        let types: Vec<&str> = doc
            .effects_of(ChannelAddress::new(27, 5))
            .unwrap()
            .into_iter()
            .filter_map(|e| e.attr("type"))
            .collect();
        assert_eq!(types, ["intensity", "shimmer"]);
    }
}
