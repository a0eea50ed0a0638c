use crate::ErrorKind;
#[cfg(feature = "with_serde")]
use serde::{Deserialize, Serialize};

/// Inclusive range of device addresses a register map applies to
///
/// Ordered by `low` first, so ranges can key a sorted container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "with_serde",
    derive(Deserialize, Serialize),
    serde(try_from = "(u8, u8)", into = "(u8, u8)")
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressRange {
    low: u8,
    high: u8,
}

impl AddressRange {
    pub fn new(low: u8, high: u8) -> Result<Self, ErrorKind> {
        if low > high {
            return Err(ErrorKind::Config(format!(
                "invalid address range {:#04x}-{:#04x}",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    /// Range covering a single address
    pub fn single(addr: u8) -> Self {
        Self {
            low: addr,
            high: addr,
        }
    }

    #[inline]
    pub fn low(&self) -> u8 {
        self.low
    }

    #[inline]
    pub fn high(&self) -> u8 {
        self.high
    }

    #[inline]
    pub fn contains(&self, addr: u8) -> bool {
        self.low <= addr && addr <= self.high
    }

    pub fn overlaps(&self, other: &AddressRange) -> bool {
        self.low <= other.high && other.low <= self.high
    }
}

impl TryFrom<(u8, u8)> for AddressRange {
    type Error = ErrorKind;
    fn try_from((low, high): (u8, u8)) -> Result<Self, Self::Error> {
        Self::new(low, high)
    }
}

impl From<AddressRange> for (u8, u8) {
    fn from(range: AddressRange) -> Self {
        (range.low, range.high)
    }
}

impl core::fmt::Display for AddressRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{:#04x}-{:#04x}]", self.low, self.high)
    }
}
