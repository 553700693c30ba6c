//! Mutable construction of compressed bitmaps
//!
//! A [`Builder`] holds the canonical word sequence of the bitmap being built. Setting bits at
//! or after the start of its trailing literal appends to the sequence directly, and clearing a
//! bit of that literal patches it in place. Every other change is a merge of the current words
//! against an operand, written out afresh.

use std::fmt;
use std::ops::RangeBounds;

use crate::bitmap::CompressedBitmap;
use crate::bounds::{HEADER_LEN, MAX_BIT};
use crate::iter::{test_bit, WordIterator};
use crate::merge::{merge, Op};
use crate::range::range_to_inclusive;
use crate::word::BITS_PER_WORD;
use crate::writer::{last_word, Writer};

/// Accumulates changes to a bitmap, then seals them into a [`CompressedBitmap`]
///
/// # Examples
///
/// ```
/// use wah::{BitRange, Builder};
///
/// let mut builder = Builder::new();
/// builder.set(0).set(2).set(4);
/// let bitmap = builder.build();
///
/// assert_eq!(bitmap.to_slice(), &[4, 0, 0, 0, 0b10101, 0, 0, 0]);
/// assert_eq!(bitmap.bounds(), BitRange::new(0, 4));
/// ```
#[derive(Clone)]
pub struct Builder {
    // header placeholder followed by canonical words
    buf: Vec<u8>,
    chunks: u64,
}

impl Builder {
    /// Creates a builder without any set bit
    pub fn new() -> Self {
        let (buf, chunks) = Writer::new().finish();
        Builder { buf, chunks }
    }

    fn words(&self) -> WordIterator<'_> {
        WordIterator::over(&self.buf[HEADER_LEN..])
    }

    /// Whether `bit` is currently set
    #[inline]
    pub fn test(&self, bit: u32) -> bool {
        test_bit(self.words(), u64::from(bit))
    }

    /// Whether no bit is currently set
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks == 0
    }

    /// Length of the bit space covered by the words, a multiple of 31
    ///
    /// The highest set bit always lies in the last 31 bits of this span.
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::Builder;
    ///
    /// let mut builder = Builder::new();
    /// assert_eq!(builder.bits_spanned(), 0);
    ///
    /// builder.set(40);
    /// assert_eq!(builder.bits_spanned(), 62);
    /// ```
    #[inline]
    pub fn bits_spanned(&self) -> u64 {
        self.chunks * u64::from(BITS_PER_WORD)
    }

    /// Set a single bit
    ///
    /// # Panics
    ///
    /// Panics if `bit` is larger than [`MAX_BIT`](crate::MAX_BIT)
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::Builder;
    ///
    /// let mut builder = Builder::new();
    /// builder.set(1000).set(3);
    ///
    /// assert!(builder.test(3));
    /// assert!(builder.test(1000));
    /// assert!(!builder.test(4));
    /// ```
    pub fn set(&mut self, bit: u32) -> &mut Self {
        assert!(bit <= MAX_BIT, "bit {bit} is beyond MAX_BIT");
        if self.appends_at(bit) {
            self.append(bit, bit);
        } else if !self.test(bit) {
            self.apply_range(Op::Or, bit, bit);
        }
        self
    }

    /// Clear a single bit. Bits past the highest set bit are already clear.
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::Builder;
    ///
    /// let mut builder = Builder::new();
    /// builder.set_range(0..10).clear(5);
    ///
    /// assert!(builder.test(4));
    /// assert!(!builder.test(5));
    /// assert!(builder.test(6));
    /// ```
    pub fn clear(&mut self, bit: u32) -> &mut Self {
        if self.appends_at(bit) {
            // only the trailing literal holds bits past the append start
            if !self.is_past_end(bit) {
                let mut out = Writer::resume(std::mem::take(&mut self.buf), self.chunks);
                out.clear_open_bit(bit);
                (self.buf, self.chunks) = out.finish();
            }
        } else if self.test(bit) {
            self.apply_range(Op::AndNot, bit, bit);
        }
        self
    }

    /// Set every bit of `range`
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
    /// use wah::Builder;
    ///
    /// let mut builder = Builder::new();
    /// builder.set_range(10..20).set_range(15..=40);
    /// let bitmap = builder.build();
    ///
    /// assert_eq!(bitmap.count_bits(), 31);
    /// assert_eq!(bitmap.lowest(), Some(10));
    /// assert_eq!(bitmap.highest(), Some(40));
    /// ```
    pub fn set_range<R: RangeBounds<u32>>(&mut self, range: R) -> &mut Self {
        let Some((start, end)) = range_to_inclusive(range, MAX_BIT) else {
            return self;
        };
        assert!(end <= MAX_BIT, "bit {end} is beyond MAX_BIT");
        if self.appends_at(start) {
            self.append(start, end);
        } else {
            self.apply_range(Op::Or, start, end);
        }
        self
    }

    /// Clear every bit of `range`
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::Builder;
    ///
    /// let mut builder = Builder::new();
    /// builder.set_range(0..100).clear_range(50..);
    ///
    /// assert_eq!(builder.build().highest(), Some(49));
    /// ```
    pub fn clear_range<R: RangeBounds<u32>>(&mut self, range: R) -> &mut Self {
        let Some((start, end)) = range_to_inclusive(range, MAX_BIT) else {
            return self;
        };
        if self.is_past_end(start) {
            return self;
        }
        let end = end.min(self.last_bit());
        if start <= end {
            self.apply_range(Op::AndNot, start, end);
        }
        self
    }

    /// Negate every bit of `range`
    ///
    /// # Panics
    ///
    /// Panics if the range ends beyond [`MAX_BIT`](crate::MAX_BIT)
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::Builder;
    ///
    /// let mut builder = Builder::new();
    /// builder.set_range(0..4).flip_range(2..6);
    ///
    /// assert_eq!(builder.build().to_vec(), [0, 1, 4, 5]);
    /// ```
    pub fn flip_range<R: RangeBounds<u32>>(&mut self, range: R) -> &mut Self {
        let Some((start, end)) = range_to_inclusive(range, MAX_BIT) else {
            return self;
        };
        assert!(end <= MAX_BIT, "bit {end} is beyond MAX_BIT");
        if self.is_past_end(start) {
            self.append(start, end);
        } else {
            self.apply_range(Op::Xor, start, end);
        }
        self
    }

    /// Keep only the bits also set in `other`
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::{Builder, CompressedBitmap};
    ///
    /// let mut builder = Builder::new();
    /// builder.set_range(0..100);
    /// builder.and(&CompressedBitmap::of(&[5, 99, 200]));
    ///
    /// assert_eq!(builder.build().to_vec(), [5, 99]);
    /// ```
    pub fn and(&mut self, other: &CompressedBitmap) -> &mut Self {
        self.apply(Op::And, other.words())
    }

    /// Set every bit set in `other`
    pub fn or(&mut self, other: &CompressedBitmap) -> &mut Self {
        self.apply(Op::Or, other.words())
    }

    /// Negate every bit set in `other`
    pub fn xor(&mut self, other: &CompressedBitmap) -> &mut Self {
        self.apply(Op::Xor, other.words())
    }

    /// Clear every bit set in `other`
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::{Builder, CompressedBitmap};
    ///
    /// let mut builder = Builder::new();
    /// builder.set_range(0..10);
    /// builder.and_not(&CompressedBitmap::from_range(2..9));
    ///
    /// assert_eq!(builder.build().to_vec(), [0, 1, 9]);
    /// ```
    pub fn and_not(&mut self, other: &CompressedBitmap) -> &mut Self {
        self.apply(Op::AndNot, other.words())
    }

    /// Seal the words into an immutable bitmap
    ///
    /// A builder without set bits yields [`CompressedBitmap::EMPTY`].
    pub fn build(self) -> CompressedBitmap {
        CompressedBitmap::seal(self.buf, self.chunks)
    }

    fn is_past_end(&self, bit: u32) -> bool {
        u64::from(bit) >= self.bits_spanned()
    }

    /// Whether setting `bit` can go through the writer without a merge
    ///
    /// That is the case past the end, and inside a trailing literal which the writer reopens.
    fn appends_at(&self, bit: u32) -> bool {
        let start = match last_word(&self.buf) {
            Some(word) if word.is_literal() => self.bits_spanned() - u64::from(BITS_PER_WORD),
            _ => self.bits_spanned(),
        };
        u64::from(bit) >= start
    }

    // only meaningful when the builder is not empty
    fn last_bit(&self) -> u32 {
        (self.bits_spanned() - 1).min(u64::from(MAX_BIT)) as u32
    }

    fn append(&mut self, start: u32, end: u32) {
        let mut out = Writer::resume(std::mem::take(&mut self.buf), self.chunks);
        out.push_range(start, end);
        (self.buf, self.chunks) = out.finish();
    }

    fn apply_range(&mut self, op: Op, start: u32, end: u32) {
        let mut operand = Writer::new();
        operand.push_range(start, end);
        let (operand, _) = operand.finish();
        self.apply(op, WordIterator::over(&operand[HEADER_LEN..]));
    }

    fn apply(&mut self, op: Op, operand: WordIterator<'_>) -> &mut Self {
        let mut out = Writer::with_capacity(self.words().len() + operand.len());
        merge(op, self.words(), operand, &mut out);
        (self.buf, self.chunks) = out.finish();
        self
    }
}

impl Default for Builder {
    #[inline]
    fn default() -> Self {
        Builder::new()
    }
}

impl From<&CompressedBitmap> for Builder {
    /// Seed a builder with the words of a bitmap, re-encoding them canonically
    fn from(bitmap: &CompressedBitmap) -> Self {
        let mut out = Writer::with_capacity(bitmap.word_count());
        for word in bitmap.words() {
            out.push_word(word);
        }
        let (buf, chunks) = out.finish();
        Builder { buf, chunks }
    }
}

impl Extend<u32> for Builder {
    /// Set every bit of the iterator
    ///
    /// # Panics
    ///
    /// Panics if a bit is larger than [`MAX_BIT`](crate::MAX_BIT)
    fn extend<T: IntoIterator<Item = u32>>(&mut self, iter: T) {
        for bit in iter {
            self.set(bit);
        }
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Builder<{} words spanning {} bits>",
            self.words().len(),
            self.bits_spanned()
        )
    }
}
