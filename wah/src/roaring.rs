//! Conversions between compressed bitmaps and [`RoaringBitmap`]

use ::roaring::RoaringBitmap;

use crate::bitmap::CompressedBitmap;

impl From<&CompressedBitmap> for RoaringBitmap {
    /// # Examples
    ///
    /// ```
    /// use roaring::RoaringBitmap;
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap = CompressedBitmap::from_range(10..20);
    /// let roaring = RoaringBitmap::from(&bitmap);
    ///
    /// assert_eq!(roaring.len(), 10);
    /// assert!(roaring.contains(15));
    /// ```
    fn from(bitmap: &CompressedBitmap) -> Self {
        bitmap.iter().collect()
    }
}

impl From<&RoaringBitmap> for CompressedBitmap {
    /// # Panics
    ///
    /// Panics if the roaring bitmap holds a value larger than [`MAX_BIT`](crate::MAX_BIT)
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring::RoaringBitmap;
    /// use wah::CompressedBitmap;
    ///
    /// let roaring: RoaringBitmap = [1, 2, 3000].into_iter().collect();
    /// let bitmap = CompressedBitmap::from(&roaring);
    ///
    /// assert_eq!(bitmap.to_vec(), [1, 2, 3000]);
    /// ```
    fn from(roaring: &RoaringBitmap) -> Self {
        CompressedBitmap::from_sorted_iter(roaring.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_roaring() {
        let bitmap =
            CompressedBitmap::of(&[0, 30, 31, 5000]).or(&CompressedBitmap::from_range(100..400));
        let roaring = RoaringBitmap::from(&bitmap);
        assert_eq!(roaring.len(), bitmap.count_bits());
        assert_eq!(roaring.min(), bitmap.lowest());
        assert_eq!(roaring.max(), bitmap.highest());
        assert_eq!(CompressedBitmap::from(&roaring).to_slice(), bitmap.to_slice());
    }

    #[test]
    fn empty_converts_to_empty() {
        assert!(RoaringBitmap::from(&CompressedBitmap::EMPTY).is_empty());
        assert!(CompressedBitmap::from(&RoaringBitmap::new()).is_empty());
    }
}
