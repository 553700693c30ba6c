//! Word-aligned hybrid (WAH) compressed bitmaps
//!
//! A [`CompressedBitmap`] is an immutable set of bit positions encoded as a little-endian
//! `i32` header (the highest set bit) followed by 32-bit words. Each word is either a literal
//! carrying 31 bits, or a fill standing for a run of 31-bit chunks that are all zeroes or all
//! ones. The encoded bytes are meant to be stored as-is, as the value under a key.
//!
//! Changes go through a [`Builder`], which always produces the canonical encoding of its bits.
//!
//! ```rust
//! use wah::{Builder, CompressedBitmap};
//!
//! let mut builder = Builder::new();
//! builder.set_range(0..93).set(1000);
//! let bitmap = builder.build();
//!
//! assert_eq!(bitmap.count_bits(), 94);
//! assert!(bitmap.test(92));
//! assert!(!bitmap.test(93));
//!
//! let stored = bitmap.to_slice().to_vec();
//! assert_eq!(CompressedBitmap::new(stored).unwrap(), bitmap);
//! ```

mod bitmap;
mod bounds;
mod builder;
mod error;
mod iter;
mod merge;
mod range;
#[cfg(feature = "roaring")]
mod roaring;
mod word;
mod writer;

pub use bitmap::CompressedBitmap;
pub use bounds::{compute_bounds, MAX_BIT, NO_BITS};
pub use builder::Builder;
pub use error::FormatError;
pub use iter::{BitIterator, WordIterator};
pub use range::BitRange;
pub use word::{Word, BITS_PER_WORD, LITERAL_MASK, MAX_FILL_COUNT};
