use thiserror::Error;

/// A byte buffer is not a valid compressed bitmap
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("buffer length {len} is not a multiple of 4")]
    UnalignedLength { len: usize },

    #[error("non-empty buffer of {len} bytes is shorter than the {min} byte minimum")]
    TooShort { len: usize, min: usize },

    #[error("corrupt header value {header}")]
    CorruptHeader { header: i32 },

    #[error("header claims bit {highest} but the words only cover {span} bits")]
    HeaderOutOfSpan { highest: u32, span: u64 },

    #[error("set bits overflow the addressable bit range")]
    BoundsOverflow,

    #[error("lowest set bit {lowest:?} is inconsistent with highest set bit {highest:?}")]
    InconsistentBounds {
        lowest: Option<u64>,
        highest: Option<u32>,
    },
}
