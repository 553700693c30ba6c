use std::iter::Fuse;

use crate::word::{Word, LITERAL_MASK};
use crate::writer::Writer;

/// Boolean operator applied between two bitmaps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Op {
    And,
    Or,
    Xor,
    AndNot,
}

impl Op {
    #[inline]
    fn apply(self, lhs: u32, rhs: u32) -> u32 {
        let bits = match self {
            Op::And => lhs & rhs,
            Op::Or => lhs | rhs,
            Op::Xor => lhs ^ rhs,
            Op::AndNot => lhs & !rhs,
        };
        bits & LITERAL_MASK
    }

    #[inline]
    fn apply_bit(self, lhs: bool, rhs: bool) -> bool {
        match self {
            Op::And => lhs & rhs,
            Op::Or => lhs | rhs,
            Op::Xor => lhs ^ rhs,
            Op::AndNot => lhs & !rhs,
        }
    }
}

/// A stretch of bit space over which both operands are aligned
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Span {
    /// Both operands are uniform for `len` chunks
    Fill { lhs: bool, rhs: bool, len: u64 },
    /// A single chunk where at least one operand is a literal
    Chunk { lhs: u32, rhs: u32 },
}

/// Position inside one operand's word stream
struct Cursor<I> {
    words: Fuse<I>,
    word: Word,
    // chunks of `word` not consumed yet
    remaining: u64,
}

impl<I: Iterator<Item = Word>> Cursor<I> {
    fn new(words: I) -> Self {
        Cursor {
            words: words.fuse(),
            word: Word::ZERO,
            remaining: 0,
        }
    }

    /// The current word and its unconsumed chunks, `None` once the stream is exhausted
    fn peek(&mut self) -> Option<(Word, u64)> {
        // zero-length fills are skipped here
        while self.remaining == 0 {
            self.word = self.words.next()?;
            self.remaining = u64::from(self.word.fill_count());
        }
        Some((self.word, self.remaining))
    }

    fn consume(&mut self, len: u64) {
        self.remaining = self.remaining.saturating_sub(len);
    }
}

/// Walks two word streams in lock step, splitting fills against the other operand's shorter
/// words so that every yielded [`Span`] covers the same bits on both sides
///
/// An exhausted stream reads as zeroes. Iteration ends once both streams are exhausted.
pub(crate) struct Aligned<A, B> {
    lhs: Cursor<A>,
    rhs: Cursor<B>,
}

// stands in for an exhausted operand
const ZEROES: (Word, u64) = (Word::decode(0x8000_0001), u64::MAX);

impl<A, B> Aligned<A, B>
where
    A: Iterator<Item = Word>,
    B: Iterator<Item = Word>,
{
    pub(crate) fn new(lhs: A, rhs: B) -> Self {
        Aligned {
            lhs: Cursor::new(lhs),
            rhs: Cursor::new(rhs),
        }
    }

    pub(crate) fn lhs_exhausted(&mut self) -> bool {
        self.lhs.peek().is_none()
    }

    pub(crate) fn rhs_exhausted(&mut self) -> bool {
        self.rhs.peek().is_none()
    }
}

impl<A, B> Iterator for Aligned<A, B>
where
    A: Iterator<Item = Word>,
    B: Iterator<Item = Word>,
{
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        let ((lhs, lhs_len), (rhs, rhs_len)) = match (self.lhs.peek(), self.rhs.peek()) {
            (None, None) => return None,
            (lhs, rhs) => (lhs.unwrap_or(ZEROES), rhs.unwrap_or(ZEROES)),
        };

        if lhs.is_literal() || rhs.is_literal() {
            self.lhs.consume(1);
            self.rhs.consume(1);
            Some(Span::Chunk {
                lhs: lhs.chunk_bits(),
                rhs: rhs.chunk_bits(),
            })
        } else {
            let len = lhs_len.min(rhs_len);
            self.lhs.consume(len);
            self.rhs.consume(len);
            Some(Span::Fill {
                lhs: lhs.fill_bit(),
                rhs: rhs.fill_bit(),
                len,
            })
        }
    }
}

/// Apply `op` between two word streams, appending the canonical result to `out`
pub(crate) fn merge<A, B>(op: Op, lhs: A, rhs: B, out: &mut Writer)
where
    A: IntoIterator<Item = Word>,
    B: IntoIterator<Item = Word>,
{
    let mut spans = Aligned::new(lhs.into_iter(), rhs.into_iter());
    loop {
        // the rest of the result is zeroes
        let done = match op {
            Op::And => spans.lhs_exhausted() || spans.rhs_exhausted(),
            Op::AndNot => spans.lhs_exhausted(),
            Op::Or | Op::Xor => false,
        };
        if done {
            break;
        }
        match spans.next() {
            Some(Span::Fill { lhs, rhs, len }) => out.push_fill(op.apply_bit(lhs, rhs), len),
            Some(Span::Chunk { lhs, rhs }) => out.push_chunk(op.apply(lhs, rhs)),
            None => break,
        }
    }
}

/// Whether two word streams encode the same bit vector
pub(crate) fn equivalent<A, B>(lhs: A, rhs: B) -> bool
where
    A: IntoIterator<Item = Word>,
    B: IntoIterator<Item = Word>,
{
    Aligned::new(lhs.into_iter(), rhs.into_iter()).all(|span| match span {
        Span::Fill { lhs, rhs, .. } => lhs == rhs,
        Span::Chunk { lhs, rhs } => lhs == rhs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::HEADER_LEN;
    use crate::iter::WordIterator;

    fn run(op: Op, lhs: &[Word], rhs: &[Word]) -> Vec<Word> {
        let mut out = Writer::new();
        merge(op, lhs.iter().copied(), rhs.iter().copied(), &mut out);
        let (buf, _) = out.finish();
        WordIterator::over(&buf[HEADER_LEN..]).collect()
    }

    #[test]
    fn splits_fills_against_literals() {
        let spans: Vec<Span> = Aligned::new(
            [Word::fill(true, 3)].into_iter(),
            [Word::literal(0b1), Word::fill(false, 1)].into_iter(),
        )
        .collect();
        assert_eq!(
            spans,
            [
                Span::Chunk {
                    lhs: LITERAL_MASK,
                    rhs: 0b1
                },
                Span::Fill {
                    lhs: true,
                    rhs: false,
                    len: 1
                },
                Span::Fill {
                    lhs: true,
                    rhs: false,
                    len: 1
                },
            ]
        );
    }

    #[test]
    fn or_of_disjoint_literals() {
        let lhs = [Word::literal(1 << 10)];
        let rhs = [Word::literal(1 << 20)];
        assert_eq!(run(Op::Or, &lhs, &rhs), [Word::literal(1 << 10 | 1 << 20)]);
    }

    #[test]
    fn and_stops_at_shorter_operand() {
        let lhs = [Word::fill(true, 5)];
        let rhs = [Word::fill(false, 1), Word::literal(0b110)];
        assert_eq!(
            run(Op::And, &lhs, &rhs),
            [Word::fill(false, 1), Word::literal(0b110)]
        );
        assert_eq!(run(Op::And, &rhs, &lhs), run(Op::And, &lhs, &rhs));
    }

    #[test]
    fn xor_cancels_to_nothing() {
        let words = [Word::fill(false, 2), Word::literal(0b1011), Word::fill(true, 7)];
        assert!(run(Op::Xor, &words, &words).is_empty());
    }

    #[test]
    fn and_not_keeps_lhs_tail() {
        let lhs = [Word::literal(0b111), Word::fill(true, 2)];
        let rhs = [Word::literal(0b010)];
        assert_eq!(
            run(Op::AndNot, &lhs, &rhs),
            [Word::literal(0b101), Word::fill(true, 2)]
        );
        assert!(run(Op::AndNot, &rhs, &lhs).is_empty());
    }

    #[test]
    fn or_fills_into_a_single_run() {
        let lhs = [Word::fill(true, 2), Word::fill(false, 2), Word::literal(1)];
        let rhs = [Word::fill(false, 2), Word::fill(true, 2)];
        assert_eq!(
            run(Op::Or, &lhs, &rhs),
            [Word::fill(true, 4), Word::literal(1)]
        );
    }

    #[test]
    fn equivalence_ignores_encoding() {
        let canonical = [Word::fill(true, 2), Word::literal(1)];
        let verbose = [
            Word::literal(LITERAL_MASK),
            Word::fill(true, 1),
            Word::literal(1),
            Word::fill(false, 4),
        ];
        assert!(equivalent(canonical, verbose));
        assert!(!equivalent(canonical, [Word::fill(true, 2)]));
        assert!(equivalent(
            std::iter::empty::<Word>(),
            [Word::ZERO, Word::fill(false, 3)]
        ));
    }
}
