use byteorder::{ByteOrder, LittleEndian};

use crate::error::FormatError;
use crate::iter::WordIterator;
use crate::range::BitRange;
use crate::word::{Word, BITS_PER_WORD};

/// Header value of a word sequence that holds no set bit
///
/// Only ever written transiently: a finished bitmap without set bits is the empty buffer.
pub const NO_BITS: i32 = -1;

/// Highest bit position a bitmap can address, the header being a signed 32-bit integer
pub const MAX_BIT: u32 = i32::MAX as u32;

pub(crate) const HEADER_LEN: usize = 4;

/// Compute the bounds of a buffer
///
/// With `words == None`, `data` is a finished bitmap: the header is read as the highest set
/// bit and checked against the words that follow it.
///
/// With `words == Some(n)`, `data` is a word sequence still being built (there is no header)
/// spanning `n` 31-bit chunks. The highest bit is derived from `n` and the trailing word.
///
/// In both cases the lowest set bit is found by scanning from the first word.
///
/// # Examples
///
/// ```
/// use wah::{compute_bounds, BitRange};
///
/// // header = 92, followed by a fill of three chunks of ones
/// let finished = [92, 0, 0, 0, 0x03, 0, 0, 0xC0];
/// assert_eq!(compute_bounds(&finished, None).unwrap(), BitRange::new(0, 92));
///
/// // a zero fill of one chunk then a literal with bits 1 and 4
/// let in_progress = [0x01, 0, 0, 0x80, 0b10010, 0, 0, 0];
/// assert_eq!(compute_bounds(&in_progress, Some(2)).unwrap(), BitRange::new(32, 35));
///
/// assert_eq!(compute_bounds(&[], None).unwrap(), BitRange::Empty);
/// assert!(compute_bounds(&finished[..5], None).is_err());
/// ```
pub fn compute_bounds(data: &[u8], words: Option<u64>) -> Result<BitRange, FormatError> {
    match words {
        None => finished_bounds(data),
        Some(chunks) => in_progress_bounds(data, chunks),
    }
}

/// Reject buffers that are not a whole number of words, or too short to hold `min` bytes
pub(crate) fn check_shape(data: &[u8], min: usize) -> Result<(), FormatError> {
    let len = data.len();
    if len % 4 != 0 {
        return Err(FormatError::UnalignedLength { len });
    }
    if len != 0 && len < min {
        return Err(FormatError::TooShort { len, min });
    }
    Ok(())
}

fn finished_bounds(data: &[u8]) -> Result<BitRange, FormatError> {
    check_shape(data, HEADER_LEN + 4)?;
    if data.is_empty() {
        return Ok(BitRange::Empty);
    }

    let header = LittleEndian::read_i32(&data[..HEADER_LEN]);
    if header < 0 && header != NO_BITS {
        return Err(FormatError::CorruptHeader { header });
    }

    let extent = Extent::scan(WordIterator::over(&data[HEADER_LEN..]))?;
    let highest = u32::try_from(header).ok();
    if let Some(highest) = highest {
        if u64::from(highest) >= extent.span {
            return Err(FormatError::HeaderOutOfSpan {
                highest,
                span: extent.span,
            });
        }
    }

    match (highest, extent.lowest, extent.highest) {
        (None, None, None) => Ok(BitRange::Empty),
        (Some(highest), Some(lowest), Some(scanned)) if scanned == u64::from(highest) => {
            // lowest <= scanned == highest, so it fits
            Ok(BitRange::new(lowest as u32, highest))
        }
        (highest, lowest, _) => Err(FormatError::InconsistentBounds { lowest, highest }),
    }
}

fn in_progress_bounds(data: &[u8], chunks: u64) -> Result<BitRange, FormatError> {
    let words = WordIterator::new(data)?;
    if chunks == 0 || data.is_empty() {
        return Ok(BitRange::Empty);
    }

    let last = Word::decode(LittleEndian::read_u32(&data[data.len() - 4..]));
    let highest = match last.highest_set_bit() {
        Some(local) => chunks
            .checked_mul(u64::from(BITS_PER_WORD))
            .ok_or(FormatError::BoundsOverflow)?
            - 1
            - u64::from(BITS_PER_WORD - 1 - local),
        // non-canonical trailing zeroes, fall back to a full scan
        None => match Extent::scan(WordIterator::over(data))?.highest {
            Some(highest) => highest,
            None => return Ok(BitRange::Empty),
        },
    };
    let lowest = lowest_set_bit(words)?;

    match lowest {
        Some(lowest) if lowest <= highest => {
            if highest > u64::from(MAX_BIT) {
                return Err(FormatError::BoundsOverflow);
            }
            Ok(BitRange::new(lowest as u32, highest as u32))
        }
        lowest => Err(FormatError::InconsistentBounds {
            lowest,
            highest: u32::try_from(highest).ok(),
        }),
    }
}

/// Position of the first set bit, scanning from the first word
fn lowest_set_bit(words: WordIterator<'_>) -> Result<Option<u64>, FormatError> {
    let mut offset = 0u64;
    for word in words {
        if let Some(local) = word.lowest_set_bit() {
            return Ok(Some(offset + u64::from(local)));
        }
        offset = offset
            .checked_add(word.span())
            .ok_or(FormatError::BoundsOverflow)?;
    }
    Ok(None)
}

/// Set-bit extremes and total span of a whole word sequence
struct Extent {
    lowest: Option<u64>,
    highest: Option<u64>,
    span: u64,
}

impl Extent {
    fn scan(words: WordIterator<'_>) -> Result<Self, FormatError> {
        let mut extent = Extent {
            lowest: None,
            highest: None,
            span: 0,
        };
        for word in words {
            let end = extent
                .span
                .checked_add(word.span())
                .ok_or(FormatError::BoundsOverflow)?;
            if let Some(local) = word.lowest_set_bit() {
                extent.lowest.get_or_insert(extent.span + u64::from(local));
            }
            if let Some(local) = word.highest_set_bit() {
                extent.highest = Some(end - u64::from(BITS_PER_WORD) + u64::from(local));
            }
            extent.span = end;
        }
        Ok(extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(header: Option<i32>, words: &[Word]) -> Vec<u8> {
        let mut data = Vec::new();
        if let Some(header) = header {
            data.extend_from_slice(&header.to_le_bytes());
        }
        for word in words {
            data.extend_from_slice(&word.encode().to_le_bytes());
        }
        data
    }

    #[test]
    fn finished_single_literal() {
        let data = buffer(Some(4), &[Word::literal(0b10101)]);
        assert_eq!(compute_bounds(&data, None), Ok(BitRange::new(0, 4)));
    }

    #[test]
    fn finished_skips_leading_zeroes() {
        let data = buffer(
            Some(101),
            &[
                Word::fill(false, 2),
                Word::ZERO,
                Word::literal(1 << 7 | 1 << 8),
            ],
        );
        assert_eq!(compute_bounds(&data, None), Ok(BitRange::new(100, 101)));
    }

    #[test]
    fn finished_ones_fill() {
        let data = buffer(Some(92), &[Word::fill(true, 3)]);
        assert_eq!(compute_bounds(&data, None), Ok(BitRange::new(0, 92)));
    }

    #[test]
    fn finished_rejects_bad_shapes() {
        assert_eq!(
            compute_bounds(&[0; 5], None),
            Err(FormatError::UnalignedLength { len: 5 })
        );
        assert_eq!(
            compute_bounds(&[0; 4], None),
            Err(FormatError::TooShort { len: 4, min: 8 })
        );
    }

    #[test]
    fn finished_rejects_corrupt_header() {
        let data = buffer(Some(-7), &[Word::literal(1)]);
        assert_eq!(
            compute_bounds(&data, None),
            Err(FormatError::CorruptHeader { header: -7 })
        );
    }

    #[test]
    fn finished_rejects_header_past_words() {
        let data = buffer(Some(31), &[Word::literal(1)]);
        assert_eq!(
            compute_bounds(&data, None),
            Err(FormatError::HeaderOutOfSpan {
                highest: 31,
                span: 31
            })
        );
    }

    #[test]
    fn finished_rejects_header_mismatch() {
        let data = buffer(Some(3), &[Word::literal(0b10101)]);
        assert_eq!(
            compute_bounds(&data, None),
            Err(FormatError::InconsistentBounds {
                lowest: Some(0),
                highest: Some(3)
            })
        );

        let no_bits = buffer(Some(5), &[Word::ZERO]);
        assert!(compute_bounds(&no_bits, None).is_err());
    }

    #[test]
    fn finished_sentinel() {
        let data = buffer(Some(NO_BITS), &[Word::fill(false, 4)]);
        assert_eq!(compute_bounds(&data, None), Ok(BitRange::Empty));

        let lying = buffer(Some(NO_BITS), &[Word::literal(1)]);
        assert_eq!(
            compute_bounds(&lying, None),
            Err(FormatError::InconsistentBounds {
                lowest: Some(0),
                highest: None
            })
        );
    }

    #[test]
    fn in_progress_trailing_literal() {
        let data = buffer(None, &[Word::fill(true, 1), Word::literal(0b100)]);
        assert_eq!(compute_bounds(&data, Some(2)), Ok(BitRange::new(0, 33)));
    }

    #[test]
    fn in_progress_trailing_fill() {
        let data = buffer(None, &[Word::literal(1 << 30), Word::fill(true, 2)]);
        assert_eq!(compute_bounds(&data, Some(3)), Ok(BitRange::new(30, 92)));
    }

    #[test]
    fn in_progress_trailing_zeroes() {
        let data = buffer(None, &[Word::literal(0b110), Word::fill(false, 5)]);
        assert_eq!(compute_bounds(&data, Some(6)), Ok(BitRange::new(1, 2)));
    }

    #[test]
    fn in_progress_empty() {
        assert_eq!(compute_bounds(&[], Some(0)), Ok(BitRange::Empty));
        let zeroes = buffer(None, &[Word::fill(false, 3)]);
        assert_eq!(compute_bounds(&zeroes, Some(3)), Ok(BitRange::Empty));
    }

    #[test]
    fn in_progress_overflow() {
        let data = buffer(
            None,
            &[
                Word::fill(false, crate::MAX_FILL_COUNT),
                Word::fill(false, crate::MAX_FILL_COUNT),
                Word::literal(1),
            ],
        );
        let chunks = 2 * u64::from(crate::MAX_FILL_COUNT) + 1;
        assert_eq!(
            compute_bounds(&data, Some(chunks)),
            Err(FormatError::BoundsOverflow)
        );
    }
}
