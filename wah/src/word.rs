use std::fmt;

/// Number of bits of logical bit space carried by one 31-bit chunk
pub const BITS_PER_WORD: u32 = 31;

/// Payload bits of a literal word
pub const LITERAL_MASK: u32 = 0x7FFF_FFFF;

/// Largest run length a single fill word can encode
pub const MAX_FILL_COUNT: u32 = (1 << 30) - 1;

const FILL_FLAG: u32 = 1 << 31;
const FILL_VALUE: u32 = 1 << 30;
const COUNT_MASK: u32 = FILL_VALUE - 1;

/// A single 32-bit word of a compressed bitmap
///
/// A word is either a *literal*, carrying 31 bits verbatim, or a *fill*, standing for
/// `fill_count` consecutive 31-bit chunks that are all zeroes or all ones.
///
/// ```text
/// literal: 0 | b30 .. b0                 (bit i is the bit at base + i)
/// fill:    1 | value | count (30 bits)   (count chunks of `value`)
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Word(u32);

impl Word {
    /// The all-zero literal
    pub const ZERO: Word = Word(0);

    /// Decode a raw word, as read from a buffer
    ///
    /// Every `u32` is a valid word, so decoding never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::Word;
    ///
    /// let word = Word::decode(0xC000_0003);
    /// assert!(!word.is_literal());
    /// assert!(word.fill_bit());
    /// assert_eq!(word.fill_count(), 3);
    /// assert_eq!(word.encode(), 0xC000_0003);
    /// ```
    #[inline]
    pub const fn decode(raw: u32) -> Self {
        Word(raw)
    }

    /// The raw 32-bit value of this word
    #[inline]
    pub const fn encode(self) -> u32 {
        self.0
    }

    /// Create a literal word. Bits above bit 30 are discarded.
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::Word;
    ///
    /// let word = Word::literal(0b10101);
    /// assert!(word.is_literal());
    /// assert_eq!(word.literal_bits(), Some(0b10101));
    /// assert_eq!(Word::literal(u32::MAX).literal_bits(), Some(0x7FFF_FFFF));
    /// ```
    #[inline]
    pub const fn literal(bits: u32) -> Self {
        Word(bits & LITERAL_MASK)
    }

    /// Create a fill word covering `count` chunks of `bit`
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero or larger than [`MAX_FILL_COUNT`](crate::MAX_FILL_COUNT)
    #[inline]
    pub fn fill(bit: bool, count: u32) -> Self {
        assert!(
            (1..=MAX_FILL_COUNT).contains(&count),
            "fill count {count} out of range"
        );
        let value = if bit { FILL_VALUE } else { 0 };
        Word(FILL_FLAG | value | count)
    }

    #[inline]
    pub const fn is_literal(self) -> bool {
        self.0 & FILL_FLAG == 0
    }

    /// The value of a fill word. Always `false` for literals.
    #[inline]
    pub const fn fill_bit(self) -> bool {
        !self.is_literal() && self.0 & FILL_VALUE != 0
    }

    /// Number of 31-bit chunks this word spans, `1` for a literal
    ///
    /// A fill read from an untrusted buffer may report `0`. Such a word spans no bits and is
    /// skipped by every reader.
    #[inline]
    pub const fn fill_count(self) -> u32 {
        if self.is_literal() {
            1
        } else {
            self.0 & COUNT_MASK
        }
    }

    /// The 31 payload bits of a literal word, `None` for a fill
    #[inline]
    pub const fn literal_bits(self) -> Option<u32> {
        if self.is_literal() {
            Some(self.0)
        } else {
            None
        }
    }

    /// The bit pattern of any single chunk covered by this word
    #[inline]
    pub const fn chunk_bits(self) -> u32 {
        if self.is_literal() {
            self.0
        } else if self.fill_bit() {
            LITERAL_MASK
        } else {
            0
        }
    }

    /// Number of bits of logical bit space covered by this word
    #[inline]
    pub const fn span(self) -> u64 {
        self.fill_count() as u64 * BITS_PER_WORD as u64
    }

    /// Number of set bits covered by this word
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::Word;
    ///
    /// assert_eq!(Word::literal(0b10101).count_bits(), 3);
    /// assert_eq!(Word::fill(true, 3).count_bits(), 93);
    /// assert_eq!(Word::fill(false, 3).count_bits(), 0);
    /// ```
    #[inline]
    pub const fn count_bits(self) -> u64 {
        if self.is_literal() {
            self.0.count_ones() as u64
        } else if self.fill_bit() {
            self.span()
        } else {
            0
        }
    }

    /// Whether this word covers at least one set bit
    #[inline]
    pub const fn has_set_bits(self) -> bool {
        if self.is_literal() {
            self.0 != 0
        } else {
            self.fill_bit() && self.fill_count() > 0
        }
    }

    /// Position (`0..=30`) of the lowest set bit inside the first chunk of this word
    ///
    /// `None` when the word covers no set bit.
    #[inline]
    pub const fn lowest_set_bit(self) -> Option<u32> {
        if !self.has_set_bits() {
            None
        } else if self.is_literal() {
            Some(self.0.trailing_zeros())
        } else {
            Some(0)
        }
    }

    /// Position (`0..=30`) of the highest set bit inside the last chunk of this word
    ///
    /// `None` when the word covers no set bit.
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::Word;
    ///
    /// assert_eq!(Word::literal(0b10101).highest_set_bit(), Some(4));
    /// assert_eq!(Word::fill(true, 2).highest_set_bit(), Some(30));
    /// assert_eq!(Word::ZERO.highest_set_bit(), None);
    /// ```
    #[inline]
    pub const fn highest_set_bit(self) -> Option<u32> {
        if !self.has_set_bits() {
            None
        } else if self.is_literal() {
            Some(31 - self.0.leading_zeros())
        } else {
            Some(BITS_PER_WORD - 1)
        }
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_literal() {
            write!(f, "Literal({:#010x})", self.0)
        } else {
            write!(f, "Fill({} x {})", u8::from(self.fill_bit()), self.fill_count())
        }
    }
}

impl From<u32> for Word {
    #[inline]
    fn from(raw: u32) -> Self {
        Word::decode(raw)
    }
}

impl From<Word> for u32 {
    #[inline]
    fn from(word: Word) -> Self {
        word.encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn literal_accessors() {
        let word = Word::literal(0b10101);
        assert!(word.is_literal());
        assert!(!word.fill_bit());
        assert_eq!(word.fill_count(), 1);
        assert_eq!(word.span(), 31);
        assert_eq!(word.lowest_set_bit(), Some(0));
        assert_eq!(word.highest_set_bit(), Some(4));

        let top = Word::literal(1 << 30);
        assert_eq!(top.lowest_set_bit(), Some(30));
        assert_eq!(top.highest_set_bit(), Some(30));
        assert_eq!(top.chunk_bits(), 1 << 30);
    }

    #[test]
    fn fill_accessors() {
        let ones = Word::fill(true, 3);
        assert_eq!(ones.encode(), 0xC000_0003);
        assert_eq!(ones.span(), 93);
        assert_eq!(ones.chunk_bits(), LITERAL_MASK);
        assert_eq!(ones.lowest_set_bit(), Some(0));
        assert_eq!(ones.literal_bits(), None);

        let zeroes = Word::fill(false, MAX_FILL_COUNT);
        assert_eq!(zeroes.encode(), 0xBFFF_FFFF);
        assert_eq!(zeroes.count_bits(), 0);
        assert_eq!(zeroes.lowest_set_bit(), None);
        assert_eq!(zeroes.highest_set_bit(), None);
        assert_eq!(zeroes.span(), u64::from(MAX_FILL_COUNT) * 31);
    }

    #[test]
    fn zero_count_fill_is_decodable() {
        let word = Word::decode(0xC000_0000);
        assert_eq!(word.fill_count(), 0);
        assert_eq!(word.count_bits(), 0);
        assert!(!word.has_set_bits());
    }

    #[test]
    #[should_panic]
    fn fill_rejects_zero_count() {
        Word::fill(true, 0);
    }

    #[test]
    fn debug_output() {
        assert_eq!(format!("{:?}", Word::literal(0x15)), "Literal(0x00000015)");
        assert_eq!(format!("{:?}", Word::fill(true, 3)), "Fill(1 x 3)");
    }

    proptest! {
        #[test]
        fn decode_encode_roundtrip(raw in proptest::num::u32::ANY) {
            let word = Word::decode(raw);
            prop_assert_eq!(Word::decode(word.encode()), word);
            prop_assert_eq!(word.encode(), raw);
        }

        #[test]
        fn literal_count_matches_popcount(bits in 0..=LITERAL_MASK) {
            let word = Word::literal(bits);
            prop_assert_eq!(word.count_bits(), u64::from(bits.count_ones()));
            prop_assert!(word.count_bits() <= word.span());
        }
    }
}
