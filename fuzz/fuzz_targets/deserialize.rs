#![no_main]

use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use wah::{compute_bounds, BitRange, CompressedBitmap, WordIterator};

fn check_bitmap(input: &[u8]) {
    let Ok(bitmap) = CompressedBitmap::new(input.to_vec()) else {
        return;
    };

    let canonical = bitmap.to_builder().build();
    assert_eq!(canonical, bitmap, "canonical re-encoding changed the bits");
    assert_eq!(canonical.bounds(), bitmap.bounds());
    assert!(canonical.is_canonical());

    let start_count = bitmap.count_bits();
    let mut new_count = start_count;
    let mut builder = bitmap.to_builder();
    for i in 100..1000 {
        if !bitmap.test(i) {
            builder.set(i);
            new_count += 1;
        }
    }
    assert_eq!(new_count, builder.build().count_bits(), "count mismatch");
}

fn check_words(input: &[u8], chunks: u32) {
    let Ok(words) = WordIterator::new(input) else {
        return;
    };
    let spanned: u64 = words.map(|word| u64::from(word.fill_count())).sum();
    if let Ok(BitRange::Bits { lowest, highest }) = compute_bounds(input, Some(u64::from(chunks)))
    {
        assert!(lowest <= highest);
        if u64::from(chunks) == spanned {
            assert!(u64::from(highest) < spanned * 31);
        }
    }
}

#[derive(Arbitrary, Debug)]
enum BufferType {
    Stored,
    InProgress { chunks: u32 },
}

fuzz_target!(|input: (BufferType, &[u8])| {
    let (ty, input) = input;
    match ty {
        BufferType::Stored => check_bitmap(input),
        BufferType::InProgress { chunks } => check_words(input, chunks),
    }
});
