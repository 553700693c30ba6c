use super::CompressedBitmap;
use crate::iter::BitIterator;

impl CompressedBitmap {
    /// Returns an iterator over each set bit of the bitmap.
    /// Returned positions are ordered in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap = CompressedBitmap::of(&[4, 3, 2]);
    /// let mut iterator = bitmap.iter();
    ///
    /// assert_eq!(iterator.next(), Some(2));
    /// assert_eq!(iterator.next(), Some(3));
    /// assert_eq!(iterator.next(), Some(4));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> BitIterator<'_> {
        let limit = self.highest().map_or(0, |highest| u64::from(highest) + 1);
        BitIterator::new(self.words(), limit)
    }

    /// Returns a vector containing all of the set bits in ascending order
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap = CompressedBitmap::from_range(60..64);
    ///
    /// assert_eq!(bitmap.to_vec(), [60, 61, 62, 63]);
    /// ```
    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }
}

impl<'a> IntoIterator for &'a CompressedBitmap {
    type Item = u32;
    type IntoIter = BitIterator<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<u32> for CompressedBitmap {
    /// Convenience method for creating a bitmap from an iterator of bit positions,
    /// in any order.
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap: CompressedBitmap = (1..3).collect();
    ///
    /// assert!(!bitmap.is_empty());
    /// assert!(bitmap.test(1));
    /// assert!(bitmap.test(2));
    /// assert_eq!(bitmap.count_bits(), 2);
    /// ```
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        CompressedBitmap::of(&Vec::from_iter(iter))
    }
}
