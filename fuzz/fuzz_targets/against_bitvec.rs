#![no_main]

use crate::arbitrary_ops::*;
use bitvec::prelude::*;
use libfuzzer_sys::arbitrary;
use libfuzzer_sys::arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wah::{BitRange, Builder, CompressedBitmap};

mod arbitrary_ops;

fuzz_target!(|input: FuzzInput| {
    let mut lhs = Builder::new();
    let mut rhs = Builder::new();

    let mut lhs_check = bitvec![0; MAX_NUM as usize];
    let mut rhs_check = bitvec![0; MAX_NUM as usize];

    for op in input.lhs_ops {
        op.on_builder(&mut lhs);
        op.on_bitvec(&mut lhs_check);
        check_equal(&lhs.clone().build(), &lhs_check);
    }
    for op in input.rhs_ops {
        op.on_builder(&mut rhs);
        op.on_bitvec(&mut rhs_check);
        check_equal(&rhs.clone().build(), &rhs_check);
    }

    let rhs = rhs.build();
    for op in &input.comp_ops {
        op.on_builder(&mut lhs, &rhs);
        op.on_bitvec(&mut lhs_check, &rhs_check);
        check_equal(&lhs.clone().build(), &lhs_check);
    }

    let lhs = lhs.build();
    for op in &input.view_ops {
        op.on_both(&rhs, &rhs_check);
        op.on_both(&lhs, &lhs_check);
    }
});

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    lhs_ops: Vec<MutableBitmapOperation>,
    rhs_ops: Vec<MutableBitmapOperation>,
    comp_ops: Vec<BitmapCompOperation>,
    view_ops: Vec<ReadBitmapOp>,
}

impl ReadBitmapOp {
    fn on_both(&self, b: &CompressedBitmap, v: &BitSlice) {
        match *self {
            ReadBitmapOp::Test(i) => {
                assert_eq!(v[i.0 as usize], b.test(i.0));
            }
            ReadBitmapOp::CountBits => {
                assert_eq!(v.count_ones() as u64, b.count_bits());
            }
            ReadBitmapOp::Bounds => {
                let expected = match (v.first_one(), v.last_one()) {
                    (Some(lowest), Some(highest)) => BitRange::new(lowest as u32, highest as u32),
                    _ => BitRange::Empty,
                };
                assert_eq!(expected, b.bounds());
            }
            ReadBitmapOp::ToVec => {
                let vec_iter = b.to_vec();
                assert!(vec_iter.into_iter().eq(v.iter_ones().map(|i| i as u32)));
            }
            ReadBitmapOp::IsEmpty => {
                assert_eq!(v.not_any(), b.is_empty());
            }
            ReadBitmapOp::Flip(ref r) => {
                let flipped = b.flip(r.start().0..=r.end().0);
                let changed = v[r.start().0 as usize..=r.end().0 as usize].count_ones() as u64;
                let width = u64::from(r.end().0) + 1 - u64::from(r.start().0);
                assert_eq!(
                    flipped.count_bits(),
                    v.count_ones() as u64 - changed + (width - changed)
                );
            }
            ReadBitmapOp::Rebuild => {
                assert!(b.is_canonical());
                assert_eq!(b.to_builder().build().to_slice(), b.to_slice());
            }
            ReadBitmapOp::Reload => {
                let loaded = CompressedBitmap::new(b.to_slice().to_vec()).unwrap();
                assert_eq!(&loaded, b);
                assert_eq!(loaded.bounds(), b.bounds());
            }
            ReadBitmapOp::Clone => {
                drop(b.clone());
            }
            ReadBitmapOp::Debug => {
                use std::io::Write;
                write!(std::io::sink(), "{:?}", b).unwrap();
            }
            ReadBitmapOp::Dump => {
                use std::io::Write;
                write!(std::io::sink(), "{}", b.dump()).unwrap();
            }
        }
    }
}

impl MutableBitmapOperation {
    fn on_bitvec(&self, b: &mut BitSlice) {
        match *self {
            MutableBitmapOperation::Set(i) => {
                b.set(i.0 as usize, true);
            }
            MutableBitmapOperation::SetMany(ref items) | MutableBitmapOperation::Extend(ref items) => {
                for i in items {
                    b.set(i.0 as usize, true);
                }
            }
            MutableBitmapOperation::SetRange(ref r) => {
                if r.start() <= r.end() {
                    b[r.start().0 as usize..=r.end().0 as usize].fill(true);
                }
            }
            MutableBitmapOperation::ClearRange(ref r) => {
                if r.start() <= r.end() {
                    b[r.start().0 as usize..=r.end().0 as usize].fill(false);
                }
            }
            MutableBitmapOperation::ClearAll => {
                b.fill(false);
            }
            MutableBitmapOperation::Clear(i) => {
                b.set(i.0 as usize, false);
            }
            MutableBitmapOperation::FlipRange(ref r) => {
                if r.start() <= r.end() {
                    let _ = !&mut b[r.start().0 as usize..=r.end().0 as usize];
                }
            }
            MutableBitmapOperation::MakeLiterals { chunk } => {
                let start = usize::from(chunk) * 31;
                let end = (start + 31 * 8).min(MAX_NUM as usize);
                for i in (start..end).step_by(2) {
                    b.set(i, true);
                }
            }
            MutableBitmapOperation::MakeFill { chunk } => {
                let start = usize::from(chunk) * 31;
                if start < MAX_NUM as usize {
                    let end = (start + 31 * 64).min(MAX_NUM as usize - 1);
                    b[start..=end].fill(true);
                }
            }
        }
    }
}

impl BitmapCompOperation {
    fn on_bitvec(&self, lhs: &mut BitSlice, rhs: &BitSlice) {
        match *self {
            BitmapCompOperation::Eq => {}
            BitmapCompOperation::And => {
                *lhs &= rhs;
            }
            BitmapCompOperation::Or => {
                *lhs |= rhs;
            }
            BitmapCompOperation::Xor => {
                *lhs ^= rhs;
            }
            BitmapCompOperation::AndNot => {
                for i in rhs.iter_ones() {
                    lhs.set(i, false);
                }
            }
        }
    }
}

fn check_equal(b: &CompressedBitmap, v: &BitSlice) {
    let lhs = b.iter();
    let rhs = v.iter_ones().map(|i| i as u32);

    assert!(lhs.eq(rhs), "{b:?}")
}
