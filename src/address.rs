//! Controller addressing for the show.
//!
//! Every physical output is named by a (unit, circuit) pair. Units are numbered
//! from 1 and circuits from 0. The show's controller
//! topology is fixed and non-uniform, so translating to a flat channel index
//! walks four contiguous bands, each with its own circuits-per-unit stride.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A (unit, circuit) pair identifying one physical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct ChannelAddress {
    pub unit: u32,
    pub circuit: u32,
}

impl ChannelAddress {
    pub const fn new(unit: u32, circuit: u32) -> Self {
        Self { unit, circuit }
    }
}

impl From<(u32, u32)> for ChannelAddress {
    fn from((unit, circuit): (u32, u32)) -> Self {
        Self { unit, circuit }
    }
}

impl From<ChannelAddress> for (u32, u32) {
    fn from(a: ChannelAddress) -> Self {
        (a.unit, a.circuit)
    }
}

impl fmt::Display for ChannelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.unit, self.circuit)
    }
}

/// Newtype for the flat, show-wide channel index (0-based, gap-free).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelIndex(pub u32);

impl fmt::Display for ChannelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Controller topology ─────────────────────────────────────────────

/// One contiguous run of units sharing a circuits-per-unit stride.
#[derive(Debug, Clone, Copy)]
struct Band {
    first_unit: u32,
    /// Inclusive. `None` for the open-ended last band.
    last_unit: Option<u32>,
    stride: u32,
}

impl Band {
    const fn unit_count(&self) -> Option<u32> {
        match self.last_unit {
            Some(last) => Some(last - self.first_unit + 1),
            None => None,
        }
    }

    const fn size(&self) -> Option<u32> {
        match self.unit_count() {
            Some(units) => Some(units * self.stride),
            None => None,
        }
    }

    fn contains_unit(&self, unit: u32) -> bool {
        unit >= self.first_unit && self.last_unit.is_none_or(|last| unit <= last)
    }
}

/// Units 1–50 have 16 circuits, 51–59 have 24, 60–64 have 16, 65+ have 24.
const BANDS: [Band; 4] = [
    Band { first_unit: 1, last_unit: Some(50), stride: 16 },
    Band { first_unit: 51, last_unit: Some(59), stride: 24 },
    Band { first_unit: 60, last_unit: Some(64), stride: 16 },
    Band { first_unit: 65, last_unit: None, stride: 24 },
];

/// Number of circuits exposed by `unit`, or `None` for unit 0.
pub fn circuits_per_unit(unit: u32) -> Option<u32> {
    BANDS.iter().find(|b| b.contains_unit(unit)).map(|b| b.stride)
}

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "code")]
pub enum AddressError {
    UnitOutOfRange { unit: u32 },
    CircuitOutOfRange { unit: u32, circuit: u32, circuits: u32 },
    Overflow,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::UnitOutOfRange { unit } => {
                write!(f, "unit {unit} is outside the controller topology (units start at 1)")
            }
            AddressError::CircuitOutOfRange { unit, circuit, circuits } => write!(
                f,
                "circuit {circuit} is invalid for unit {unit} (expected 0..{circuits})"
            ),
            AddressError::Overflow => write!(f, "channel index overflows the address space"),
        }
    }
}

impl std::error::Error for AddressError {}

// ── Translation ─────────────────────────────────────────────────────

/// Flat index of a (unit, circuit) address.
pub fn to_index(address: ChannelAddress) -> Result<ChannelIndex, AddressError> {
    let ChannelAddress { unit, circuit } = address;
    let mut base: u32 = 0;
    for band in &BANDS {
        if band.contains_unit(unit) {
            if circuit >= band.stride {
                return Err(AddressError::CircuitOutOfRange {
                    unit,
                    circuit,
                    circuits: band.stride,
                });
            }
            let index = (unit - band.first_unit)
                .checked_mul(band.stride)
                .and_then(|offset| offset.checked_add(base))
                .and_then(|i| i.checked_add(circuit))
                .ok_or(AddressError::Overflow)?;
            return Ok(ChannelIndex(index));
        }
        match band.size() {
            Some(size) => base += size,
            None => break,
        }
    }
    Err(AddressError::UnitOutOfRange { unit })
}

/// Inverse of [`to_index`].
pub fn to_address(index: ChannelIndex) -> Result<ChannelAddress, AddressError> {
    let mut remaining = index.0;
    for band in &BANDS {
        match band.size() {
            Some(size) if remaining >= size => remaining -= size,
            _ => {
                let unit = band
                    .first_unit
                    .checked_add(remaining / band.stride)
                    .ok_or(AddressError::Overflow)?;
                return Ok(ChannelAddress::new(unit, remaining % band.stride));
            }
        }
    }
    Err(AddressError::Overflow)
}

// ── Rectangle ───────────────────────────────────────────────────────

const RECTANGLE_COLUMNS: u32 = 8;

/// Whether a channel belongs to the reference rectangle: all of unit 28,
/// unit 27 from circuit 5, and unit 29 up to circuit 12.
pub fn in_rectangle(address: ChannelAddress) -> bool {
    match address.unit {
        27 => address.circuit >= 5,
        28 => true,
        29 => address.circuit <= 12,
        _ => false,
    }
}

/// 1-based (row, column) of a rectangle channel. (27, 5) is cell 1-1 and
/// (29, 12) is cell 5-8; cells run row-major through the three units.
pub fn rectangle_cell(address: ChannelAddress) -> Option<(u32, u32)> {
    if !in_rectangle(address) || address.circuit >= 16 {
        return None;
    }
    let position = match address.unit {
        27 => address.circuit - 5,
        28 => 11 + address.circuit,
        _ => 27 + address.circuit,
    };
    Some((
        position / RECTANGLE_COLUMNS + 1,
        position % RECTANGLE_COLUMNS + 1,
    ))
}
