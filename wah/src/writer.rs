use byteorder::{ByteOrder, LittleEndian};

use crate::bounds::HEADER_LEN;
use crate::word::{Word, BITS_PER_WORD, LITERAL_MASK, MAX_FILL_COUNT};

/// Append-only encoder producing the canonical word sequence of a bit vector
///
/// The buffer starts with a header placeholder, filled in when the words are sealed into a
/// bitmap. Uniform chunks are never written as literals: they accumulate in a pending run
/// which is flushed as fill words once a chunk of a different kind arrives. A pending run of
/// zeroes still open when the writer finishes is trailing and is dropped.
pub(crate) struct Writer {
    buf: Vec<u8>,
    // chunks covered by the words already in `buf`
    chunks: u64,
    run_bit: bool,
    run_len: u64,
    // chunk index and bits of the literal being assembled by `push_bit`
    open: Option<(u64, u32)>,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Self::with_capacity(0)
    }

    /// `words` is a capacity hint
    pub(crate) fn with_capacity(words: usize) -> Self {
        let mut buf = Vec::with_capacity(HEADER_LEN + words * 4);
        buf.resize(HEADER_LEN, 0);
        Writer {
            buf,
            chunks: 0,
            run_bit: false,
            run_len: 0,
            open: None,
        }
    }

    /// Continue writing after the canonical words of a previous [`Writer::finish`]
    ///
    /// A trailing literal is reopened as the chunk being assembled, and the run of fills in
    /// front of it becomes the pending run again, so that later chunks extend both in place.
    pub(crate) fn resume(mut buf: Vec<u8>, mut chunks: u64) -> Self {
        debug_assert!(buf.len() >= HEADER_LEN);
        let mut open = None;
        if let Some(bits) = last_word(&buf).and_then(Word::literal_bits) {
            buf.truncate(buf.len() - 4);
            chunks -= 1;
            open = Some((chunks, bits));
        }
        let mut run_bit = true;
        let mut run_len = 0;
        while let Some(last) = last_word(&buf) {
            if last.is_literal() || (run_len > 0 && last.fill_bit() != run_bit) {
                break;
            }
            run_bit = last.fill_bit();
            run_len += u64::from(last.fill_count());
            buf.truncate(buf.len() - 4);
        }
        Writer {
            buf,
            chunks: chunks - run_len,
            run_bit,
            run_len,
            open,
        }
    }

    /// Index of the next chunk to be written
    pub(crate) fn position(&self) -> u64 {
        match self.open {
            Some((index, _)) => index,
            None => self.chunks + self.run_len,
        }
    }

    pub(crate) fn push_word(&mut self, word: Word) {
        match word.literal_bits() {
            Some(bits) => self.push_chunk(bits),
            None => self.push_fill(word.fill_bit(), u64::from(word.fill_count())),
        }
    }

    pub(crate) fn push_chunk(&mut self, bits: u32) {
        self.close_open();
        self.put_chunk(bits);
    }

    pub(crate) fn push_fill(&mut self, bit: bool, len: u64) {
        self.close_open();
        self.extend_run(bit, len);
    }

    /// Set one bit. Positions must be pushed in ascending order.
    pub(crate) fn push_bit(&mut self, bit: u32) {
        let index = u64::from(bit / BITS_PER_WORD);
        let mask = 1 << (bit % BITS_PER_WORD);
        if let Some((open, bits)) = &mut self.open {
            if *open == index {
                *bits |= mask;
                return;
            }
        }
        self.close_open();
        debug_assert!(index >= self.position(), "bits must be pushed in ascending order");
        self.open = Some((index, mask));
    }

    /// Clear one bit of the chunk reopened by [`Writer::resume`]
    pub(crate) fn clear_open_bit(&mut self, bit: u32) {
        let index = u64::from(bit / BITS_PER_WORD);
        if let Some((open, bits)) = &mut self.open {
            if *open == index {
                *bits &= !(1 << (bit % BITS_PER_WORD));
            }
        }
    }

    /// Set every bit of `start..=end`, which must lie at or after the current position
    ///
    /// A range starting in the open chunk is merged into it.
    pub(crate) fn push_range(&mut self, start: u32, end: u32) {
        debug_assert!(start <= end);
        let first = u64::from(start / BITS_PER_WORD);
        let last = u64::from(end / BITS_PER_WORD);
        let low = start % BITS_PER_WORD;
        let high = end % BITS_PER_WORD;

        let mut head = if first == last {
            chunk_mask(low, high)
        } else {
            chunk_mask(low, BITS_PER_WORD - 1)
        };
        match self.open.take() {
            Some((index, bits)) if index == first => head |= bits,
            open => {
                self.open = open;
                self.close_open();
            }
        }
        debug_assert!(first >= self.position());

        self.extend_run(false, first - self.position());
        self.put_chunk(head);
        if first != last {
            self.extend_run(true, last - first - 1);
            self.put_chunk(chunk_mask(0, high));
        }
    }

    /// The buffer (header placeholder followed by the words) and the chunks it spans
    pub(crate) fn finish(mut self) -> (Vec<u8>, u64) {
        self.close_open();
        if self.run_bit {
            self.flush_run();
        }
        (self.buf, self.chunks)
    }

    fn close_open(&mut self) {
        if let Some((index, bits)) = self.open.take() {
            let gap = index - self.position();
            self.extend_run(false, gap);
            self.put_chunk(bits);
        }
    }

    fn put_chunk(&mut self, bits: u32) {
        debug_assert_eq!(bits & !LITERAL_MASK, 0);
        match bits {
            0 => self.extend_run(false, 1),
            LITERAL_MASK => self.extend_run(true, 1),
            _ => {
                self.flush_run();
                self.emit(Word::literal(bits));
                self.chunks += 1;
            }
        }
    }

    fn extend_run(&mut self, bit: bool, len: u64) {
        if len == 0 {
            return;
        }
        if self.run_len > 0 && self.run_bit != bit {
            self.flush_run();
        }
        self.run_bit = bit;
        self.run_len += len;
    }

    fn flush_run(&mut self) {
        while self.run_len > 0 {
            let count = self.run_len.min(u64::from(MAX_FILL_COUNT)) as u32;
            self.emit(Word::fill(self.run_bit, count));
            self.chunks += u64::from(count);
            self.run_len -= u64::from(count);
        }
    }

    fn emit(&mut self, word: Word) {
        let at = self.buf.len();
        self.buf.resize(at + 4, 0);
        LittleEndian::write_u32(&mut self.buf[at..], word.encode());
    }
}

/// The last word of a buffer starting with a header placeholder
pub(crate) fn last_word(buf: &[u8]) -> Option<Word> {
    let at = buf.len().checked_sub(4).filter(|&at| at >= HEADER_LEN)?;
    Some(Word::decode(LittleEndian::read_u32(&buf[at..])))
}

/// Literal bits `low..=high`
fn chunk_mask(low: u32, high: u32) -> u32 {
    let width = high - low + 1;
    (((1u64 << width) - 1) as u32) << low
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::WordIterator;

    fn words(writer: Writer) -> (Vec<Word>, u64) {
        let (buf, chunks) = writer.finish();
        (WordIterator::over(&buf[HEADER_LEN..]).collect(), chunks)
    }

    #[test]
    fn uniform_literals_become_fills() {
        let mut writer = Writer::new();
        writer.push_chunk(LITERAL_MASK);
        writer.push_chunk(LITERAL_MASK);
        writer.push_chunk(0);
        writer.push_chunk(0b11);
        assert_eq!(
            words(writer),
            (
                vec![Word::fill(true, 2), Word::fill(false, 1), Word::literal(0b11)],
                4
            )
        );
    }

    #[test]
    fn adjacent_fills_merge() {
        let mut writer = Writer::new();
        writer.push_word(Word::fill(true, 2));
        writer.push_word(Word::literal(LITERAL_MASK));
        writer.push_word(Word::fill(true, 3));
        assert_eq!(words(writer), (vec![Word::fill(true, 6)], 6));
    }

    #[test]
    fn trailing_zeroes_are_dropped() {
        let mut writer = Writer::new();
        writer.push_word(Word::literal(1));
        writer.push_word(Word::fill(false, 10));
        writer.push_word(Word::ZERO);
        assert_eq!(words(writer), (vec![Word::literal(1)], 1));

        let mut nothing = Writer::new();
        nothing.push_fill(false, 5);
        assert_eq!(words(nothing), (vec![], 0));
    }

    #[test]
    fn zero_length_fills_are_ignored() {
        let mut writer = Writer::new();
        writer.push_word(Word::decode(0xC000_0000));
        writer.push_word(Word::literal(4));
        assert_eq!(words(writer), (vec![Word::literal(4)], 1));
    }

    #[test]
    fn long_runs_split_at_max_fill_count() {
        let mut writer = Writer::new();
        writer.push_fill(true, u64::from(MAX_FILL_COUNT) + 5);
        assert_eq!(
            words(writer),
            (
                vec![Word::fill(true, MAX_FILL_COUNT), Word::fill(true, 5)],
                u64::from(MAX_FILL_COUNT) + 5
            )
        );
    }

    #[test]
    fn pushes_ascending_bits() {
        let mut writer = Writer::new();
        for bit in [1, 3, 100, 101] {
            writer.push_bit(bit);
        }
        assert_eq!(
            words(writer),
            (
                vec![
                    Word::literal(0b1010),
                    Word::fill(false, 2),
                    Word::literal(1 << 7 | 1 << 8)
                ],
                4
            )
        );
    }

    #[test]
    fn pushes_ranges() {
        let mut writer = Writer::new();
        writer.push_range(5, 9);
        writer.push_range(40, 130);
        assert_eq!(
            words(writer),
            (
                vec![
                    Word::literal(0b11111 << 5),
                    Word::literal(LITERAL_MASK << 9 & LITERAL_MASK),
                    Word::fill(true, 2),
                    Word::literal(0b111_1111)
                ],
                5
            )
        );
    }

    #[test]
    fn resume_extends_trailing_ones() {
        let mut writer = Writer::new();
        writer.push_range(0, 61);
        let (buf, chunks) = writer.finish();
        assert_eq!(chunks, 2);

        let mut writer = Writer::resume(buf, chunks);
        assert_eq!(writer.position(), 2);
        writer.push_range(62, 92);
        assert_eq!(words(writer), (vec![Word::fill(true, 3)], 3));
    }

    #[test]
    fn resume_reopens_a_trailing_literal() {
        let mut writer = Writer::new();
        writer.push_bit(1);
        writer.push_bit(40);
        let (buf, chunks) = writer.finish();

        let mut writer = Writer::resume(buf, chunks);
        assert_eq!(writer.position(), 1);
        writer.push_bit(41);
        writer.push_range(50, 70);
        assert_eq!(
            words(writer),
            (
                vec![
                    Word::literal(0b10),
                    Word::literal(1 << 9 | 1 << 10 | chunk_mask(19, 30)),
                    Word::literal(0x1FF)
                ],
                3
            )
        );
    }

    #[test]
    fn resumed_literal_that_fills_up_joins_the_run() {
        let mut writer = Writer::new();
        writer.push_range(0, 70);
        let (buf, chunks) = writer.finish();

        let mut writer = Writer::resume(buf, chunks);
        writer.push_range(71, 92);
        assert_eq!(words(writer), (vec![Word::fill(true, 3)], 3));
    }

    #[test]
    fn clearing_a_resumed_literal_drops_the_zeroes_before_it() {
        let mut writer = Writer::new();
        writer.push_bit(3);
        writer.push_bit(70);
        let (buf, chunks) = writer.finish();

        let mut writer = Writer::resume(buf, chunks);
        writer.clear_open_bit(70);
        assert_eq!(words(writer), (vec![Word::literal(1 << 3)], 1));
    }

    #[test]
    fn masks() {
        assert_eq!(chunk_mask(0, 30), LITERAL_MASK);
        assert_eq!(chunk_mask(0, 0), 1);
        assert_eq!(chunk_mask(30, 30), 1 << 30);
        assert_eq!(chunk_mask(2, 4), 0b11100);
    }
}
