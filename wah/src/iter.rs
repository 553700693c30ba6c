use std::iter::FusedIterator;
use std::ops::Range;
use std::slice::ChunksExact;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::FormatError;
use crate::word::Word;

/// Forward-only cursor decoding a byte buffer into [`Word`]s
///
/// The cursor cannot be rewound: once exhausted, decoding the same buffer again requires a
/// new iterator.
///
/// # Examples
///
/// ```
/// use wah::{Word, WordIterator};
///
/// let data = [0x15, 0, 0, 0, 0x03, 0, 0, 0xC0];
/// let mut words = WordIterator::new(&data).unwrap();
/// assert_eq!(words.next(), Some(Word::literal(0b10101)));
/// assert_eq!(words.next(), Some(Word::fill(true, 3)));
/// assert_eq!(words.next(), None);
///
/// assert!(WordIterator::new(&data[..5]).is_err());
/// ```
pub struct WordIterator<'a> {
    chunks: ChunksExact<'a, u8>,
}

impl<'a> WordIterator<'a> {
    /// Iterate a raw word sequence, starting at offset 0 (there is no header to skip)
    pub fn new(data: &'a [u8]) -> Result<Self, FormatError> {
        if data.len() % 4 != 0 {
            return Err(FormatError::UnalignedLength { len: data.len() });
        }
        Ok(Self::over(data))
    }

    /// Caller guarantees `data.len()` is a multiple of 4
    #[inline]
    pub(crate) fn over(data: &'a [u8]) -> Self {
        debug_assert_eq!(data.len() % 4, 0);
        WordIterator {
            chunks: data.chunks_exact(4),
        }
    }
}

impl<'a> Iterator for WordIterator<'a> {
    type Item = Word;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.chunks
            .next()
            .map(|raw| Word::decode(LittleEndian::read_u32(raw)))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for WordIterator<'_> {}

impl FusedIterator for WordIterator<'_> {}

/// Iterator over the positions of the set bits of a bitmap, in ascending order
///
/// Created by [`CompressedBitmap::iter`](crate::CompressedBitmap::iter).
pub struct BitIterator<'a> {
    words: WordIterator<'a>,
    // position of the first bit of the next word
    base: u64,
    literal_base: u64,
    literal: u32,
    run: Range<u64>,
    limit: u64,
}

impl<'a> BitIterator<'a> {
    /// Positions at or above `limit` are never produced
    pub(crate) fn new(words: WordIterator<'a>, limit: u64) -> Self {
        BitIterator {
            words,
            base: 0,
            literal_base: 0,
            literal: 0,
            run: 0..0,
            limit,
        }
    }
}

impl<'a> Iterator for BitIterator<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(position) = self.run.next() {
                return Some(position as u32);
            }
            if self.literal != 0 {
                let position = self.literal_base + u64::from(self.literal.trailing_zeros());
                self.literal &= self.literal - 1;
                if position >= self.limit {
                    self.literal = 0;
                    continue;
                }
                return Some(position as u32);
            }
            if self.base >= self.limit {
                return None;
            }

            let word = self.words.next()?;
            let span = word.span();
            if let Some(bits) = word.literal_bits() {
                self.literal_base = self.base;
                self.literal = bits;
            } else if word.fill_bit() {
                self.run = self.base..(self.base + span).min(self.limit);
            }
            self.base += span;
        }
    }
}

impl FusedIterator for BitIterator<'_> {}

/// Whether `bit` is set in a word sequence, reading past its end as zeroes
pub(crate) fn test_bit<I: IntoIterator<Item = Word>>(words: I, bit: u64) -> bool {
    let mut base = 0u64;
    for word in words {
        let end = base + word.span();
        if bit < end {
            return match word.literal_bits() {
                Some(bits) => (bits >> (bit - base)) & 1 != 0,
                None => word.fill_bit(),
            };
        }
        base = end;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(words: &[Word]) -> Vec<u8> {
        let mut data = vec![0; words.len() * 4];
        for (raw, word) in data.chunks_exact_mut(4).zip(words) {
            LittleEndian::write_u32(raw, word.encode());
        }
        data
    }

    #[test]
    fn decodes_little_endian_words() {
        let data = encode(&[Word::fill(false, 2), Word::literal(1), Word::fill(true, 1)]);
        let words: Vec<Word> = WordIterator::new(&data).unwrap().collect();
        assert_eq!(
            words,
            [Word::fill(false, 2), Word::literal(1), Word::fill(true, 1)]
        );
    }

    #[test]
    fn rejects_trailing_bytes() {
        assert_eq!(
            WordIterator::new(&[0; 7]).err(),
            Some(FormatError::UnalignedLength { len: 7 })
        );
        assert_eq!(WordIterator::new(&[]).unwrap().len(), 0);
    }

    #[test]
    fn is_not_restartable() {
        let data = encode(&[Word::literal(1)]);
        let mut words = WordIterator::new(&data).unwrap();
        assert_eq!(words.len(), 1);
        assert!(words.next().is_some());
        assert_eq!(words.next(), None);
        assert_eq!(words.next(), None);
    }

    #[test]
    fn enumerates_set_bits() {
        let data = encode(&[
            Word::literal(0b101),
            Word::fill(false, 1),
            Word::fill(true, 1),
            Word::literal(1 << 30),
        ]);
        let bits: Vec<u32> = BitIterator::new(WordIterator::over(&data), u64::MAX).collect();
        let mut expected = vec![0, 2];
        expected.extend(62..93);
        expected.push(123);
        assert_eq!(bits, expected);
    }

    #[test]
    fn tests_single_bits() {
        let words = [Word::fill(false, 2), Word::literal(0b10), Word::fill(true, 1)];
        assert!(!test_bit(words, 0));
        assert!(!test_bit(words, 62));
        assert!(test_bit(words, 63));
        assert!(test_bit(words, 93));
        assert!(test_bit(words, 123));
        assert!(!test_bit(words, 124));
        assert!(!test_bit(words, u64::MAX));
    }

    #[test]
    fn stops_at_limit() {
        let data = encode(&[Word::fill(true, 2), Word::literal(0b11)]);
        let bits: Vec<u32> = BitIterator::new(WordIterator::over(&data), 40).collect();
        assert_eq!(bits, (0..40).collect::<Vec<_>>());
    }
}
