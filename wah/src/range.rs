use std::ops::{Bound, RangeBounds, RangeInclusive};

#[cfg(feature = "serde")]
use crate::error::FormatError;

/// The closed interval of bit positions between the lowest and highest set bit of a bitmap
///
/// # Examples
///
/// ```
/// use wah::BitRange;
///
/// let range = BitRange::new(10, 20);
/// assert!(range.contains(10));
/// assert!(range.contains(20));
/// assert!(!range.contains(21));
/// assert_eq!(range.len(), 11);
///
/// assert!(!BitRange::Empty.contains(0));
/// assert_eq!(BitRange::Empty.len(), 0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "UncheckedBitRange")
)]
pub enum BitRange {
    /// No bit is set
    #[default]
    Empty,
    /// At least one bit is set, `lowest <= highest`
    Bits { lowest: u32, highest: u32 },
}

impl BitRange {
    /// # Panics
    ///
    /// Panics if `lowest > highest`
    #[inline]
    pub fn new(lowest: u32, highest: u32) -> Self {
        assert!(lowest <= highest, "invalid bit range {lowest}..={highest}");
        BitRange::Bits { lowest, highest }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        matches!(self, BitRange::Empty)
    }

    #[inline]
    pub const fn lowest(&self) -> Option<u32> {
        match *self {
            BitRange::Empty => None,
            BitRange::Bits { lowest, .. } => Some(lowest),
        }
    }

    #[inline]
    pub const fn highest(&self) -> Option<u32> {
        match *self {
            BitRange::Empty => None,
            BitRange::Bits { highest, .. } => Some(highest),
        }
    }

    #[inline]
    pub const fn contains(&self, bit: u32) -> bool {
        match *self {
            BitRange::Empty => false,
            BitRange::Bits { lowest, highest } => lowest <= bit && bit <= highest,
        }
    }

    /// Number of bit positions in the interval
    #[inline]
    pub const fn len(&self) -> u64 {
        match *self {
            BitRange::Empty => 0,
            BitRange::Bits { lowest, highest } => highest as u64 - lowest as u64 + 1,
        }
    }

    #[inline]
    pub fn to_range_inclusive(&self) -> Option<RangeInclusive<u32>> {
        match *self {
            BitRange::Empty => None,
            BitRange::Bits { lowest, highest } => Some(lowest..=highest),
        }
    }
}

impl From<RangeInclusive<u32>> for BitRange {
    fn from(range: RangeInclusive<u32>) -> Self {
        let (lowest, highest) = range.into_inner();
        if lowest > highest {
            BitRange::Empty
        } else {
            BitRange::Bits { lowest, highest }
        }
    }
}

/// Deserialized shape of a [`BitRange`], before `lowest <= highest` is checked
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(rename = "BitRange")]
enum UncheckedBitRange {
    Empty,
    Bits { lowest: u32, highest: u32 },
}

#[cfg(feature = "serde")]
impl TryFrom<UncheckedBitRange> for BitRange {
    type Error = FormatError;

    fn try_from(range: UncheckedBitRange) -> Result<Self, Self::Error> {
        match range {
            UncheckedBitRange::Empty => Ok(BitRange::Empty),
            UncheckedBitRange::Bits { lowest, highest } if lowest <= highest => {
                Ok(BitRange::Bits { lowest, highest })
            }
            UncheckedBitRange::Bits { lowest, highest } => Err(FormatError::InconsistentBounds {
                lowest: Some(u64::from(lowest)),
                highest: Some(highest),
            }),
        }
    }
}

/// Resolve any range of bit positions to its inclusive bounds, `None` if the range is empty
pub(crate) fn range_to_inclusive<R: RangeBounds<u32>>(range: R, max: u32) -> Option<(u32, u32)> {
    let start = match range.start_bound() {
        Bound::Included(&i) => i,
        Bound::Excluded(&i) => i.checked_add(1)?,
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&i) => i,
        Bound::Excluded(&i) => i.checked_sub(1)?,
        Bound::Unbounded => max,
    };
    (start <= end).then_some((start, end))
}
