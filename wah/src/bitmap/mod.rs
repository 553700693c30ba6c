//! Immutable compressed bitmaps, as stored under a key
//!
//! # Example
//!
//! ```rust
//! use wah::{BitRange, CompressedBitmap};
//!
//! let rb1 = CompressedBitmap::of(&[1, 2, 3, 4, 5, 100, 1000]);
//! let rb2 = CompressedBitmap::of(&[3, 4, 1000]);
//!
//! assert_eq!(rb1.count_bits(), 7);
//! assert!(rb1.test(3));
//! assert_eq!(rb1.bounds(), BitRange::new(1, 1000));
//!
//! let rb3 = rb1.and(&rb2);
//! assert_eq!(rb3.to_vec(), [3, 4, 1000]);
//!
//! // store the value bytes, read them back
//! let stored: Vec<u8> = rb3.to_slice().to_vec();
//! let loaded = CompressedBitmap::new(stored).unwrap();
//! assert_eq!(loaded, rb3);
//!
//! // changes go through a builder
//! let mut builder = loaded.to_builder();
//! builder.set(5);
//! builder.or(&rb1);
//! let rb4 = builder.build();
//! assert_eq!(rb4, rb1);
//! ```

use crate::range::BitRange;

/// An immutable word-aligned hybrid compressed bitmap
///
/// The value owns its encoded bytes: a little-endian `i32` header holding the highest set
/// bit, followed by the words. A bitmap without set bits is the empty buffer. The bounds are
/// computed once, on construction, and never change: every modification goes through a
/// [`Builder`](crate::Builder) and yields a new bitmap.
#[derive(Clone)]
pub struct CompressedBitmap {
    data: Vec<u8>,
    bounds: BitRange,
}

mod imp;
mod iter;
mod ops;
mod serialization;
