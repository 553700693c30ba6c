use libfuzzer_sys::arbitrary::{self, Arbitrary, Unstructured};
use std::ops::RangeInclusive;
use wah::{Builder, CompressedBitmap};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Num(pub u32);

// a whole number of chunks
pub const MAX_NUM: u32 = 31 * 0x2000;

impl<'a> Arbitrary<'a> for Num {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self(u.int_in_range(0..=(MAX_NUM - 1))?))
    }
}

#[derive(Arbitrary, Debug)]
pub enum MutableBitmapOperation {
    Set(Num),
    SetMany(Vec<Num>),
    SetRange(RangeInclusive<Num>),
    ClearRange(RangeInclusive<Num>),
    ClearAll,
    Clear(Num),
    FlipRange(RangeInclusive<Num>),
    Extend(Vec<Num>),
    // alternating bits, all literals
    MakeLiterals { chunk: u16 },
    // a long run of ones, a single fill
    MakeFill { chunk: u16 },
}

#[derive(Arbitrary, Debug)]
pub enum ReadBitmapOp {
    Test(Num),
    CountBits,
    Bounds,
    ToVec,
    IsEmpty,
    Flip(RangeInclusive<Num>),
    Rebuild,
    Reload,
    Clone,
    Debug,
    Dump,
}

#[derive(Arbitrary, Debug)]
pub enum BitmapCompOperation {
    Eq,
    And,
    Or,
    Xor,
    AndNot,
}

impl MutableBitmapOperation {
    pub fn on_builder(&self, b: &mut Builder) {
        match *self {
            MutableBitmapOperation::Set(i) => {
                b.set(i.0);
            }
            MutableBitmapOperation::SetMany(ref items) => {
                for i in items {
                    b.set(i.0);
                }
            }
            MutableBitmapOperation::SetRange(ref r) => {
                b.set_range(r.start().0..=r.end().0);
            }
            MutableBitmapOperation::ClearRange(ref r) => {
                b.clear_range(r.start().0..=r.end().0);
            }
            MutableBitmapOperation::ClearAll => {
                b.clear_range(..);
            }
            MutableBitmapOperation::Clear(i) => {
                b.clear(i.0);
            }
            MutableBitmapOperation::FlipRange(ref r) => {
                b.flip_range(r.start().0..=r.end().0);
            }
            MutableBitmapOperation::Extend(ref items) => {
                b.extend(items.iter().map(|i| i.0));
            }
            MutableBitmapOperation::MakeLiterals { chunk } => {
                let start = u32::from(chunk) * 31;
                let end = (start + 31 * 8).min(MAX_NUM);
                for i in (start..end).step_by(2) {
                    b.set(i);
                }
            }
            MutableBitmapOperation::MakeFill { chunk } => {
                let start = u32::from(chunk) * 31;
                if start < MAX_NUM {
                    let end = (start + 31 * 64).min(MAX_NUM - 1);
                    b.set_range(start..=end);
                }
            }
        }
    }
}

impl BitmapCompOperation {
    pub fn on_builder(&self, lhs: &mut Builder, rhs: &CompressedBitmap) {
        let current = lhs.clone().build();
        match *self {
            BitmapCompOperation::Eq => {
                drop(current == *rhs);
                assert_eq!(current, current);
            }
            BitmapCompOperation::And => {
                assert_eq!(current.and(&current), current);

                let res = current.and(rhs);
                assert_eq!(res, rhs.and(&current));
                lhs.and(rhs);
                assert_eq!(lhs.clone().build().to_slice(), res.to_slice());
            }
            BitmapCompOperation::Or => {
                assert_eq!(current.or(&current), current);

                let res = current.or(rhs);
                assert_eq!(res, rhs.or(&current));
                lhs.or(rhs);
                assert_eq!(lhs.clone().build().to_slice(), res.to_slice());
            }
            BitmapCompOperation::Xor => {
                assert!(current.xor(&current).is_empty());

                let res = current.xor(rhs);
                assert_eq!(res, rhs.xor(&current));
                lhs.xor(rhs);
                assert_eq!(lhs.clone().build().to_slice(), res.to_slice());
            }
            BitmapCompOperation::AndNot => {
                assert!(current.and_not(&current).is_empty());

                let res = current.and_not(rhs);
                assert_eq!(res.count_bits() + current.and(rhs).count_bits(), current.count_bits());
                lhs.and_not(rhs);
                assert_eq!(lhs.clone().build().to_slice(), res.to_slice());
            }
        }
    }
}
