use std::fmt;
use std::ops::RangeBounds;

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, trace};

use super::CompressedBitmap;
use crate::bounds::{check_shape, compute_bounds, HEADER_LEN, MAX_BIT};
use crate::builder::Builder;
use crate::error::FormatError;
use crate::iter::{test_bit, WordIterator};
use crate::merge::{merge, Op};
use crate::range::{range_to_inclusive, BitRange};
use crate::word::{Word, BITS_PER_WORD};
use crate::writer::Writer;

impl CompressedBitmap {
    /// The bitmap without any set bit, stored as the empty value
    pub const EMPTY: CompressedBitmap = CompressedBitmap {
        data: Vec::new(),
        bounds: BitRange::Empty,
    };

    /// Creates an empty bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap = CompressedBitmap::empty();
    ///
    /// assert!(bitmap.is_empty());
    /// assert_eq!(bitmap.to_slice(), &[] as &[u8]);
    /// ```
    #[inline]
    pub const fn empty() -> Self {
        Self::EMPTY
    }

    /// Decode a bitmap from its stored value
    ///
    /// The buffer must be empty, or hold a header followed by at least one word, and the
    /// header must match the highest set bit of the words.
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::{BitRange, CompressedBitmap, FormatError};
    ///
    /// // header = 4, one literal word with bits 0, 2 and 4
    /// let bitmap = CompressedBitmap::new(vec![4, 0, 0, 0, 0b10101, 0, 0, 0]).unwrap();
    /// assert_eq!(bitmap.bounds(), BitRange::new(0, 4));
    /// assert!(bitmap.test(0));
    /// assert!(!bitmap.test(1));
    /// assert!(bitmap.test(4));
    /// assert_eq!(bitmap.count_bits(), 3);
    ///
    /// assert_eq!(
    ///     CompressedBitmap::new(vec![0; 5]).unwrap_err(),
    ///     FormatError::UnalignedLength { len: 5 }
    /// );
    /// ```
    pub fn new(data: Vec<u8>) -> Result<Self, FormatError> {
        let bounds = match compute_bounds(&data, None) {
            Ok(bounds) => bounds,
            Err(err) => {
                debug!(len = data.len(), %err, "rejected compressed bitmap value");
                return Err(err);
            }
        };
        if bounds.is_empty() {
            // no set bit behind a NO_BITS header
            return Ok(Self::EMPTY);
        }
        Self::from_parts(data, bounds)
    }

    /// Wrap a buffer whose bounds are already known
    pub(crate) fn from_parts(data: Vec<u8>, bounds: BitRange) -> Result<Self, FormatError> {
        check_shape(&data, HEADER_LEN)?;
        debug_assert_eq!(data.is_empty(), bounds.is_empty());
        Ok(CompressedBitmap { data, bounds })
    }

    /// Write the header of a finished word sequence and take ownership of the buffer
    pub(crate) fn seal(mut data: Vec<u8>, chunks: u64) -> Self {
        let bounds = compute_bounds(&data[HEADER_LEN..], Some(chunks))
            .expect("canonical words within MAX_BIT always have valid bounds");
        let BitRange::Bits { highest, .. } = bounds else {
            return Self::EMPTY;
        };
        LittleEndian::write_i32(&mut data[..HEADER_LEN], highest as i32);
        trace!(
            words = data.len() / 4 - 1,
            ?bounds,
            "sealed compressed bitmap"
        );
        CompressedBitmap { data, bounds }
    }

    /// Creates a new bitmap from a slice of bit positions
    ///
    /// # Panics
    ///
    /// Panics if a position is larger than [`MAX_BIT`](crate::MAX_BIT)
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap = CompressedBitmap::of(&[5, 1, 2, 3, 1]);
    ///
    /// assert_eq!(bitmap.to_vec(), [1, 2, 3, 5]);
    /// ```
    pub fn of(bits: &[u32]) -> Self {
        let mut sorted = bits.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        Self::from_sorted_iter(sorted)
    }

    /// Bits must be ascending
    pub(crate) fn from_sorted_iter<I: IntoIterator<Item = u32>>(bits: I) -> Self {
        let mut out = Writer::new();
        for bit in bits {
            assert!(bit <= MAX_BIT, "bit {bit} is beyond MAX_BIT");
            out.push_bit(bit);
        }
        let (data, chunks) = out.finish();
        Self::seal(data, chunks)
    }

    /// Creates a bitmap with every bit of `range` set
    ///
    /// An unbounded end stops at [`MAX_BIT`](crate::MAX_BIT).
    ///
    /// # Panics
    ///
    /// Panics if the range ends beyond [`MAX_BIT`](crate::MAX_BIT)
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::{BitRange, CompressedBitmap};
    ///
    /// let bitmap = CompressedBitmap::from_range(10..100);
    /// assert_eq!(bitmap.bounds(), BitRange::new(10, 99));
    /// assert_eq!(bitmap.count_bits(), 90);
    ///
    /// assert!(CompressedBitmap::from_range(3..3).is_empty());
    /// ```
    pub fn from_range<R: RangeBounds<u32>>(range: R) -> Self {
        let Some((start, end)) = range_to_inclusive(range, MAX_BIT) else {
            return Self::EMPTY;
        };
        assert!(end <= MAX_BIT, "bit {end} is beyond MAX_BIT");
        let mut out = Writer::new();
        out.push_range(start, end);
        let (data, chunks) = out.finish();
        Self::seal(data, chunks)
    }

    /// The interval between the lowest and highest set bit
    #[inline]
    pub const fn bounds(&self) -> BitRange {
        self.bounds
    }

    /// The lowest set bit, `None` if the bitmap is empty
    #[inline]
    pub const fn lowest(&self) -> Option<u32> {
        self.bounds.lowest()
    }

    /// The highest set bit, `None` if the bitmap is empty
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap = CompressedBitmap::of(&[7, 300]);
    /// assert_eq!(bitmap.lowest(), Some(7));
    /// assert_eq!(bitmap.highest(), Some(300));
    /// assert_eq!(CompressedBitmap::EMPTY.highest(), None);
    /// ```
    #[inline]
    pub const fn highest(&self) -> Option<u32> {
        self.bounds.highest()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of data words, not counting the header
    #[inline]
    pub fn word_count(&self) -> usize {
        (self.data.len() / 4).saturating_sub(1)
    }

    /// The stored value bytes
    #[inline]
    pub fn to_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the bitmap, returning its value bytes
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Iterate the data words, skipping the header
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::{CompressedBitmap, Word};
    ///
    /// let bitmap = CompressedBitmap::from_range(31..=93);
    /// let words: Vec<Word> = bitmap.words().collect();
    /// assert_eq!(words, [Word::fill(false, 1), Word::fill(true, 2), Word::literal(1)]);
    /// ```
    #[inline]
    pub fn words(&self) -> WordIterator<'_> {
        WordIterator::over(self.data.get(HEADER_LEN..).unwrap_or_default())
    }

    /// Whether `bit` is set
    ///
    /// Positions outside of the bounds are rejected without decoding any word.
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap = CompressedBitmap::of(&[1, 1000]);
    ///
    /// assert!(bitmap.test(1));
    /// assert!(bitmap.test(1000));
    /// assert!(!bitmap.test(2));
    /// assert!(!bitmap.test(u32::MAX));
    /// ```
    #[inline]
    pub fn test(&self, bit: u32) -> bool {
        self.bounds.contains(bit) && test_bit(self.words(), u64::from(bit))
    }

    /// Number of set bits
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// assert_eq!(CompressedBitmap::from_range(0..=92).count_bits(), 93);
    /// assert_eq!(CompressedBitmap::EMPTY.count_bits(), 0);
    /// ```
    pub fn count_bits(&self) -> u64 {
        self.words().map(Word::count_bits).sum()
    }

    /// A builder seeded with the words of this bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap = CompressedBitmap::of(&[1, 2]);
    /// let mut builder = bitmap.to_builder();
    /// builder.clear(1);
    /// builder.set(40);
    /// let changed = builder.build();
    ///
    /// assert_eq!(bitmap.to_vec(), [1, 2]);
    /// assert_eq!(changed.to_vec(), [2, 40]);
    /// ```
    #[inline]
    pub fn to_builder(&self) -> Builder {
        Builder::from(self)
    }

    /// Computes the intersection between two bitmaps and returns the result as a new bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap1 = CompressedBitmap::of(&[1]);
    /// let bitmap2 = CompressedBitmap::of(&[1, 2]);
    ///
    /// let bitmap3 = bitmap1.and(&bitmap2);
    ///
    /// assert!(bitmap3.test(1));
    /// assert!(!bitmap3.test(2));
    /// ```
    #[inline]
    pub fn and(&self, other: &Self) -> Self {
        self.merge(Op::And, other)
    }

    /// Computes the union between two bitmaps and returns the result as a new bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap1 = CompressedBitmap::of(&[10]);
    /// let bitmap2 = CompressedBitmap::of(&[20]);
    ///
    /// let bitmap3 = bitmap1.or(&bitmap2);
    ///
    /// assert!(bitmap3.test(10));
    /// assert!(bitmap3.test(20));
    /// assert!(!bitmap3.test(15));
    /// assert_eq!(bitmap3.count_bits(), 2);
    /// ```
    #[inline]
    pub fn or(&self, other: &Self) -> Self {
        self.merge(Op::Or, other)
    }

    /// Computes the symmetric difference between two bitmaps and returns the result as a
    /// new bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap1 = CompressedBitmap::of(&[15]);
    /// let bitmap2 = CompressedBitmap::of(&[15, 25]);
    ///
    /// let bitmap3 = bitmap1.xor(&bitmap2);
    ///
    /// assert_eq!(bitmap3.to_vec(), [25]);
    /// ```
    #[inline]
    pub fn xor(&self, other: &Self) -> Self {
        self.merge(Op::Xor, other)
    }

    /// Computes the difference between two bitmaps and returns the result as a new bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap1 = CompressedBitmap::of(&[15, 25]);
    /// let bitmap2 = CompressedBitmap::of(&[25, 35]);
    ///
    /// let bitmap3 = bitmap1.and_not(&bitmap2);
    ///
    /// assert_eq!(bitmap3.to_vec(), [15]);
    /// ```
    #[inline]
    pub fn and_not(&self, other: &Self) -> Self {
        self.merge(Op::AndNot, other)
    }

    /// Negates the bits in the given range, returning a new bitmap
    ///
    /// # Panics
    ///
    /// Panics if the range ends beyond [`MAX_BIT`](crate::MAX_BIT)
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap1 = CompressedBitmap::of(&[4]);
    /// let bitmap2 = bitmap1.flip(1..5);
    ///
    /// assert_eq!(bitmap2.to_vec(), [1, 2, 3]);
    /// ```
    pub fn flip<R: RangeBounds<u32>>(&self, range: R) -> Self {
        self.merge(Op::Xor, &Self::from_range(range))
    }

    fn merge(&self, op: Op, other: &Self) -> Self {
        trace!(
            ?op,
            lhs_words = self.word_count(),
            rhs_words = other.word_count(),
            "merging compressed bitmaps"
        );
        let mut out = Writer::with_capacity(self.word_count() + other.word_count());
        merge(op, self.words(), other.words(), &mut out);
        let (data, chunks) = out.finish();
        Self::seal(data, chunks)
    }

    /// Whether the stored bytes are the canonical encoding of this bitmap
    ///
    /// Bitmaps produced by this crate are always canonical. Values written by other encoders
    /// may not be, and still decode to the same bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// // header = 0, a literal with bit 0, then a needless run of zeroes
    /// let verbose = CompressedBitmap::new(vec![0, 0, 0, 0, 1, 0, 0, 0, 3, 0, 0, 0x80]).unwrap();
    /// assert!(!verbose.is_canonical());
    /// assert!(verbose.to_builder().build().is_canonical());
    /// assert_eq!(verbose, CompressedBitmap::of(&[0]));
    /// ```
    pub fn is_canonical(&self) -> bool {
        self.to_builder().build().data == self.data
    }

    /// Human readable decoding of the header and every word, for diagnostics
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap = CompressedBitmap::from_range(0..=92);
    /// println!("{}", bitmap.dump());
    /// ```
    pub fn dump(&self) -> impl fmt::Display + '_ {
        Dump(self)
    }
}

impl Default for CompressedBitmap {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

struct Dump<'a>(&'a CompressedBitmap);

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bitmap = self.0;
        write!(
            f,
            "CompressedBitmap: {} words, {} bytes, ",
            bitmap.word_count(),
            bitmap.data.len()
        )?;
        match bitmap.bounds {
            BitRange::Empty => return writeln!(f, "empty"),
            BitRange::Bits { lowest, highest } => writeln!(f, "bits {lowest}..={highest}")?,
        }
        writeln!(
            f,
            "  header: {}",
            LittleEndian::read_i32(&bitmap.data[..HEADER_LEN])
        )?;

        let mut offset = 0u64;
        for (index, word) in bitmap.words().enumerate() {
            write!(f, "  #{index} @{offset}: {word:?}")?;
            if let Some(bits) = word.literal_bits() {
                write!(f, " {bits:0width$b}", width = BITS_PER_WORD as usize)?;
            }
            writeln!(f)?;
            offset += word.span();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(header: i32, words: &[Word]) -> Vec<u8> {
        let mut data = header.to_le_bytes().to_vec();
        for word in words {
            data.extend_from_slice(&word.encode().to_le_bytes());
        }
        data
    }

    #[test]
    fn single_literal() {
        let bitmap = CompressedBitmap::new(value(4, &[Word::literal(0b10101)])).unwrap();
        assert!(bitmap.test(0));
        assert!(!bitmap.test(1));
        assert!(bitmap.test(2));
        assert!(bitmap.test(4));
        assert!(!bitmap.test(5));
        assert_eq!(bitmap.count_bits(), 3);
        assert_eq!(bitmap.word_count(), 1);
        assert!(bitmap.is_canonical());
    }

    #[test]
    fn ones_fill() {
        let bitmap = CompressedBitmap::new(value(92, &[Word::fill(true, 3)])).unwrap();
        assert_eq!(bitmap.count_bits(), 93);
        assert!(bitmap.test(50));
        assert!(bitmap.test(92));
        assert!(!bitmap.test(93));
        assert_eq!(bitmap.bounds(), BitRange::new(0, 92));
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!(
            CompressedBitmap::new(vec![0; 5]).unwrap_err(),
            FormatError::UnalignedLength { len: 5 }
        );
        assert_eq!(
            CompressedBitmap::new(vec![0; 4]).unwrap_err(),
            FormatError::TooShort { len: 4, min: 8 }
        );
        assert_eq!(
            CompressedBitmap::new(value(-2, &[Word::literal(1)])).unwrap_err(),
            FormatError::CorruptHeader { header: -2 }
        );
    }

    #[test]
    fn sentinel_header_normalizes_to_empty() {
        let bitmap = CompressedBitmap::new(value(-1, &[Word::fill(false, 2)])).unwrap();
        assert!(bitmap.is_empty());
        assert_eq!(bitmap.to_slice(), &[] as &[u8]);
        assert_eq!(bitmap.bounds(), BitRange::Empty);
    }

    #[test]
    fn from_parts_checks_minimum_length() {
        assert_eq!(
            CompressedBitmap::from_parts(vec![0; 2], BitRange::new(0, 0)).unwrap_err(),
            FormatError::UnalignedLength { len: 2 }
        );
        assert!(CompressedBitmap::from_parts(Vec::new(), BitRange::Empty).is_ok());
    }

    #[test]
    fn empty_bitmap() {
        let bitmap = CompressedBitmap::new(Vec::new()).unwrap();
        assert!(bitmap.is_empty());
        assert_eq!(bitmap.bounds(), BitRange::Empty);
        assert_eq!(bitmap.count_bits(), 0);
        assert_eq!(bitmap.word_count(), 0);
        assert_eq!(bitmap.words().count(), 0);
        for bit in [0, 1, 31, MAX_BIT, u32::MAX] {
            assert!(!bitmap.test(bit));
        }
    }

    #[test]
    fn test_walks_past_fills() {
        let bitmap = CompressedBitmap::new(value(
            100,
            &[
                Word::fill(false, 2),
                Word::literal(0b1),
                Word::decode(0x8000_0000),
                Word::literal(1 << 7),
            ],
        ))
        .unwrap();
        assert!(bitmap.test(62));
        assert!(bitmap.test(100));
        assert!(!bitmap.test(99));
        assert!(!bitmap.test(63));
        assert_eq!(bitmap.to_vec(), [62, 100]);
        assert!(!bitmap.is_canonical());
    }

    #[test]
    fn dump_lists_every_word() {
        let bitmap = CompressedBitmap::of(&[0, 2, 4, 93]);
        let dump = bitmap.dump().to_string();
        assert!(dump.starts_with("CompressedBitmap: 3 words, 16 bytes, bits 0..=93\n"));
        assert!(dump.contains("  header: 93\n"));
        assert!(dump.contains("  #0 @0: Literal(0x00000015) 0000000000000000000000000010101\n"));
        assert!(dump.contains("  #1 @31: Fill(0 x 2)\n"));
        assert!(dump.contains("  #2 @93: Literal(0x00000001)"));

        assert_eq!(
            CompressedBitmap::EMPTY.dump().to_string(),
            "CompressedBitmap: 0 words, 0 bytes, empty\n"
        );
    }
}
