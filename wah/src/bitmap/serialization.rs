use super::CompressedBitmap;
use crate::error::FormatError;

impl TryFrom<Vec<u8>> for CompressedBitmap {
    type Error = FormatError;

    /// Takes ownership of a stored value, see [`CompressedBitmap::new`]
    #[inline]
    fn try_from(data: Vec<u8>) -> Result<Self, Self::Error> {
        CompressedBitmap::new(data)
    }
}

impl TryFrom<&[u8]> for CompressedBitmap {
    type Error = FormatError;

    /// Copies a stored value, see [`CompressedBitmap::new`]
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let original = CompressedBitmap::of(&[3, 1000, 1001]);
    /// let copy = CompressedBitmap::try_from(original.to_slice()).unwrap();
    ///
    /// assert_eq!(copy, original);
    /// assert!(CompressedBitmap::try_from(&original.to_slice()[1..]).is_err());
    /// ```
    #[inline]
    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        CompressedBitmap::new(data.to_vec())
    }
}

impl From<CompressedBitmap> for Vec<u8> {
    #[inline]
    fn from(bitmap: CompressedBitmap) -> Self {
        bitmap.into_bytes()
    }
}

impl AsRef<[u8]> for CompressedBitmap {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.to_slice()
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::fmt;

    use serde::de::{self, SeqAccess, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::CompressedBitmap;

    impl Serialize for CompressedBitmap {
        /// Serialized as the stored value bytes
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_bytes(self.to_slice())
        }
    }

    impl<'de> Deserialize<'de> for CompressedBitmap {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_byte_buf(BitmapVisitor)
        }
    }

    struct BitmapVisitor;

    impl<'de> Visitor<'de> for BitmapVisitor {
        type Value = CompressedBitmap;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("the bytes of a compressed bitmap")
        }

        fn visit_bytes<E>(self, v: &[u8]) -> Result<CompressedBitmap, E>
        where
            E: de::Error,
        {
            CompressedBitmap::new(v.to_vec()).map_err(E::custom)
        }

        fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<CompressedBitmap, E>
        where
            E: de::Error,
        {
            CompressedBitmap::new(v).map_err(E::custom)
        }

        // formats without a native byte type hand us a sequence
        fn visit_seq<A>(self, mut seq: A) -> Result<CompressedBitmap, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut data = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(byte) = seq.next_element::<u8>()? {
                data.push(byte);
            }
            CompressedBitmap::new(data).map_err(de::Error::custom)
        }
    }
}
