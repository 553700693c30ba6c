use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Sub, SubAssign};

use super::CompressedBitmap;
use crate::merge::equivalent;

impl fmt::Debug for CompressedBitmap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let count = self.count_bits();
        match (self.lowest(), self.highest()) {
            (Some(lowest), Some(highest)) if count >= 32 => write!(
                f,
                "CompressedBitmap<{count:?} values between {lowest:?} and {highest:?}>"
            ),
            _ => write!(f, "CompressedBitmap<{:?}>", self.to_vec()),
        }
    }
}

impl PartialEq for CompressedBitmap {
    /// Two bitmaps are equal when they hold the same set bits, however they are encoded
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// // a literal with bit 0, padded with a run of zeroes
    /// let padded = CompressedBitmap::new(vec![0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0x80]).unwrap();
    ///
    /// assert_eq!(padded, CompressedBitmap::of(&[0]));
    /// assert_ne!(padded.to_slice(), CompressedBitmap::of(&[0]).to_slice());
    /// ```
    #[inline]
    fn eq(&self, other: &CompressedBitmap) -> bool {
        if self.data == other.data {
            return true;
        }
        self.bounds == other.bounds && equivalent(self.words(), other.words())
    }
}

impl Eq for CompressedBitmap {}

impl BitAnd for CompressedBitmap {
    type Output = CompressedBitmap;

    /// Syntactic sugar for `.and`
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap1 = CompressedBitmap::of(&[1]);
    /// let bitmap2 = CompressedBitmap::of(&[1, 2]);
    ///
    /// let bitmap3 = bitmap1 & bitmap2;
    ///
    /// assert!(bitmap3.test(1));
    /// assert!(!bitmap3.test(2));
    /// ```
    #[inline]
    fn bitand(self, other: CompressedBitmap) -> CompressedBitmap {
        self.and(&other)
    }
}

impl<'a> BitAnd<&'a CompressedBitmap> for CompressedBitmap {
    type Output = CompressedBitmap;

    /// Syntactic sugar for `.and`
    #[inline]
    fn bitand(self, other: &'a CompressedBitmap) -> CompressedBitmap {
        self.and(other)
    }
}

impl<'a, 'b> BitAnd<&'a CompressedBitmap> for &'b CompressedBitmap {
    type Output = CompressedBitmap;

    /// Syntactic sugar for `.and`
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap1 = CompressedBitmap::of(&[1]);
    /// let bitmap2 = CompressedBitmap::of(&[1, 2]);
    ///
    /// let bitmap3 = &bitmap1 & &bitmap2;
    ///
    /// assert!(bitmap3.test(1));
    /// assert!(!bitmap3.test(2));
    /// ```
    #[inline]
    fn bitand(self, other: &'a CompressedBitmap) -> CompressedBitmap {
        self.and(other)
    }
}

impl BitAndAssign for CompressedBitmap {
    /// Syntactic sugar for `.and`, replacing `self` with the result
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let mut bitmap1 = CompressedBitmap::of(&[15]);
    /// let bitmap2 = CompressedBitmap::of(&[25]);
    /// let mut bitmap3 = CompressedBitmap::of(&[15]);
    /// let bitmap4 = CompressedBitmap::of(&[15, 25]);
    ///
    /// bitmap1 &= bitmap2;
    ///
    /// assert!(bitmap1.count_bits() == 0);
    /// assert!(!bitmap1.test(15));
    /// assert!(!bitmap1.test(25));
    ///
    /// bitmap3 &= bitmap4;
    ///
    /// assert!(bitmap3.count_bits() == 1);
    /// assert!(bitmap3.test(15));
    /// assert!(!bitmap3.test(25));
    /// ```
    #[inline]
    fn bitand_assign(&mut self, other: CompressedBitmap) {
        *self = self.and(&other);
    }
}

impl<'a> BitAndAssign<&'a CompressedBitmap> for CompressedBitmap {
    #[inline]
    fn bitand_assign(&mut self, other: &'a CompressedBitmap) {
        *self = self.and(other);
    }
}

impl BitOr for CompressedBitmap {
    type Output = CompressedBitmap;

    /// Syntactic sugar for `.or`
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap1 = CompressedBitmap::of(&[15]);
    /// let bitmap2 = CompressedBitmap::of(&[25]);
    ///
    /// let bitmap3 = bitmap1 | bitmap2;
    ///
    /// assert!(bitmap3.count_bits() == 2);
    /// assert!(bitmap3.test(15));
    /// assert!(bitmap3.test(25));
    /// ```
    #[inline]
    fn bitor(self, other: CompressedBitmap) -> CompressedBitmap {
        self.or(&other)
    }
}

impl<'a> BitOr<&'a CompressedBitmap> for CompressedBitmap {
    type Output = CompressedBitmap;

    /// Syntactic sugar for `.or`
    #[inline]
    fn bitor(self, other: &'a CompressedBitmap) -> CompressedBitmap {
        self.or(other)
    }
}

impl<'a, 'b> BitOr<&'a CompressedBitmap> for &'b CompressedBitmap {
    type Output = CompressedBitmap;

    /// Syntactic sugar for `.or`
    #[inline]
    fn bitor(self, other: &'a CompressedBitmap) -> CompressedBitmap {
        self.or(other)
    }
}

impl BitOrAssign for CompressedBitmap {
    /// Syntactic sugar for `.or`, replacing `self` with the result
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let mut bitmap1 = CompressedBitmap::of(&[15]);
    /// let bitmap2 = CompressedBitmap::of(&[25]);
    ///
    /// bitmap1 |= bitmap2;
    ///
    /// assert!(bitmap1.count_bits() == 2);
    /// assert!(bitmap1.test(15));
    /// assert!(bitmap1.test(25));
    /// ```
    #[inline]
    fn bitor_assign(&mut self, other: CompressedBitmap) {
        *self = self.or(&other);
    }
}

impl<'a> BitOrAssign<&'a CompressedBitmap> for CompressedBitmap {
    #[inline]
    fn bitor_assign(&mut self, other: &'a CompressedBitmap) {
        *self = self.or(other);
    }
}

impl BitXor for CompressedBitmap {
    type Output = CompressedBitmap;

    /// Syntactic sugar for `.xor`
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap1 = CompressedBitmap::of(&[15, 25]);
    /// let bitmap2 = CompressedBitmap::of(&[25, 35]);
    ///
    /// let bitmap3 = bitmap1 ^ bitmap2;
    ///
    /// assert!(bitmap3.count_bits() == 2);
    /// assert!(bitmap3.test(15));
    /// assert!(!bitmap3.test(25));
    /// assert!(bitmap3.test(35));
    /// ```
    #[inline]
    fn bitxor(self, other: CompressedBitmap) -> CompressedBitmap {
        self.xor(&other)
    }
}

impl<'a> BitXor<&'a CompressedBitmap> for CompressedBitmap {
    type Output = CompressedBitmap;

    /// Syntactic sugar for `.xor`
    #[inline]
    fn bitxor(self, other: &'a CompressedBitmap) -> CompressedBitmap {
        self.xor(other)
    }
}

impl<'a, 'b> BitXor<&'a CompressedBitmap> for &'b CompressedBitmap {
    type Output = CompressedBitmap;

    /// Syntactic sugar for `.xor`
    #[inline]
    fn bitxor(self, other: &'a CompressedBitmap) -> CompressedBitmap {
        self.xor(other)
    }
}

impl BitXorAssign for CompressedBitmap {
    /// Syntactic sugar for `.xor`, replacing `self` with the result
    #[inline]
    fn bitxor_assign(&mut self, other: CompressedBitmap) {
        *self = self.xor(&other);
    }
}

impl<'a> BitXorAssign<&'a CompressedBitmap> for CompressedBitmap {
    #[inline]
    fn bitxor_assign(&mut self, other: &'a CompressedBitmap) {
        *self = self.xor(other);
    }
}

impl Sub for CompressedBitmap {
    type Output = CompressedBitmap;

    /// Syntactic sugar for `.and_not`
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let bitmap1 = CompressedBitmap::of(&[15, 25]);
    /// let bitmap2 = CompressedBitmap::of(&[25, 35]);
    ///
    /// let bitmap3 = bitmap1 - bitmap2;
    ///
    /// assert_eq!(bitmap3.count_bits(), 1);
    /// assert!(bitmap3.test(15));
    /// assert!(!bitmap3.test(25));
    /// assert!(!bitmap3.test(35));
    /// ```
    #[inline]
    fn sub(self, other: CompressedBitmap) -> CompressedBitmap {
        self.and_not(&other)
    }
}

impl<'a> Sub<&'a CompressedBitmap> for CompressedBitmap {
    type Output = CompressedBitmap;

    /// Syntactic sugar for `.and_not`
    #[inline]
    fn sub(self, other: &'a CompressedBitmap) -> CompressedBitmap {
        self.and_not(other)
    }
}

impl<'a, 'b> Sub<&'a CompressedBitmap> for &'b CompressedBitmap {
    type Output = CompressedBitmap;

    /// Syntactic sugar for `.and_not`
    #[inline]
    fn sub(self, other: &'a CompressedBitmap) -> CompressedBitmap {
        self.and_not(other)
    }
}

impl SubAssign for CompressedBitmap {
    /// Syntactic sugar for `.and_not`, replacing `self` with the result
    ///
    /// # Examples
    ///
    /// ```
    /// use wah::CompressedBitmap;
    ///
    /// let mut bitmap1 = CompressedBitmap::of(&[15, 25]);
    /// let bitmap2 = CompressedBitmap::of(&[25, 35]);
    ///
    /// bitmap1 -= bitmap2;
    ///
    /// assert_eq!(bitmap1.count_bits(), 1);
    /// assert!(bitmap1.test(15));
    /// assert!(!bitmap1.test(25));
    /// assert!(!bitmap1.test(35));
    /// ```
    #[inline]
    fn sub_assign(&mut self, other: CompressedBitmap) {
        *self = self.and_not(&other);
    }
}

impl<'a> SubAssign<&'a CompressedBitmap> for CompressedBitmap {
    #[inline]
    fn sub_assign(&mut self, other: &'a CompressedBitmap) {
        *self = self.and_not(other);
    }
}
