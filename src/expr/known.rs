//! This module contains the definition of [`KnownWord`], the concrete words
//! that back constant terms in the expression algebra.

use std::fmt::{Display, Formatter};

use ethnum::U256;

/// A value that is concretely known during symbolic execution.
///
/// Words are stored as 256-bit unsigned integers; narrower terms keep their
/// width in the owning expression node and every arithmetic helper here masks
/// its result down to the width it is given. Signedness is not a property of
/// the word itself, so the signed operations reinterpret the low `width` bits
/// in two's complement.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct KnownWord {
    value: U256,
}

impl KnownWord {
    /// Creates a known word representing zero.
    #[must_use]
    pub fn zero() -> Self {
        Self { value: U256::ZERO }
    }

    /// Creates a known word representing one.
    #[must_use]
    pub fn one() -> Self {
        Self { value: U256::ONE }
    }

    /// Gets the value of the known word.
    #[must_use]
    pub fn value(&self) -> U256 {
        self.value
    }

    /// Checks whether the word is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.value == U256::ZERO
    }

    /// The bit mask selecting the low `width` bits of a word.
    fn mask(width: u16) -> U256 {
        if width >= 256 {
            U256::MAX
        } else {
            (U256::ONE << u32::from(width)) - U256::ONE
        }
    }

    /// Truncates the word to the low `width` bits.
    #[must_use]
    pub fn truncated(self, width: u16) -> Self {
        Self {
            value: self.value & Self::mask(width),
        }
    }

    /// The bit selecting the sign of a `width`-bit two's complement word.
    fn sign_bit(width: u16) -> U256 {
        U256::ONE << u32::from(width - 1)
    }

    /// Checks whether the word is negative when its low `width` bits are read
    /// as two's complement.
    #[must_use]
    pub fn is_negative(self, width: u16) -> bool {
        self.value & Self::sign_bit(width) != U256::ZERO
    }

    /// The two's complement magnitude of the word within `width` bits.
    fn magnitude(self, width: u16) -> U256 {
        if self.is_negative(width) {
            (!self.value).wrapping_add(U256::ONE) & Self::mask(width)
        } else {
            self.value
        }
    }

    /// Negates the word within `width` bits.
    fn negated(self, width: u16) -> Self {
        Self {
            value: (!self.value).wrapping_add(U256::ONE) & Self::mask(width),
        }
    }

    /// Computes `self + rhs` wrapping within `width` bits.
    #[must_use]
    pub fn add(self, rhs: Self, width: u16) -> Self {
        Self {
            value: self.value.wrapping_add(rhs.value) & Self::mask(width),
        }
    }

    /// Computes `self - rhs` wrapping within `width` bits.
    #[must_use]
    pub fn sub(self, rhs: Self, width: u16) -> Self {
        Self {
            value: self.value.wrapping_sub(rhs.value) & Self::mask(width),
        }
    }

    /// Computes `self * rhs` wrapping within `width` bits.
    #[must_use]
    pub fn mul(self, rhs: Self, width: u16) -> Self {
        Self {
            value: self.value.wrapping_mul(rhs.value) & Self::mask(width),
        }
    }

    /// Computes the unsigned quotient `self / rhs` within `width` bits.
    ///
    /// Returns [`None`] when `rhs` is zero, leaving the division symbolic for
    /// the algebra's consumer to deal with.
    #[must_use]
    pub fn udiv(self, rhs: Self, width: u16) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        Some(Self {
            value: (self.value / rhs.value) & Self::mask(width),
        })
    }

    /// Computes the unsigned remainder `self % rhs` within `width` bits.
    ///
    /// Returns [`None`] when `rhs` is zero.
    #[must_use]
    pub fn urem(self, rhs: Self, width: u16) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        Some(Self {
            value: (self.value % rhs.value) & Self::mask(width),
        })
    }

    /// Computes the signed quotient `self / rhs` within `width` bits,
    /// truncating towards zero.
    ///
    /// Returns [`None`] when `rhs` is zero.
    #[must_use]
    pub fn sdiv(self, rhs: Self, width: u16) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        let quotient = Self {
            value: self.magnitude(width) / rhs.magnitude(width),
        };
        if self.is_negative(width) != rhs.is_negative(width) {
            Some(quotient.negated(width))
        } else {
            Some(quotient.truncated(width))
        }
    }

    /// Computes the signed remainder `self % rhs` within `width` bits. The
    /// sign of the result follows the dividend.
    ///
    /// Returns [`None`] when `rhs` is zero.
    #[must_use]
    pub fn srem(self, rhs: Self, width: u16) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        let remainder = Self {
            value: self.magnitude(width) % rhs.magnitude(width),
        };
        if self.is_negative(width) {
            Some(remainder.negated(width))
        } else {
            Some(remainder.truncated(width))
        }
    }

    /// Computes the bitwise conjunction of the two words.
    #[must_use]
    pub fn bit_and(self, rhs: Self) -> Self {
        Self {
            value: self.value & rhs.value,
        }
    }

    /// Computes the bitwise disjunction of the two words.
    #[must_use]
    pub fn bit_or(self, rhs: Self) -> Self {
        Self {
            value: self.value | rhs.value,
        }
    }

    /// Computes the bitwise exclusive disjunction of the two words.
    #[must_use]
    pub fn bit_xor(self, rhs: Self) -> Self {
        Self {
            value: self.value ^ rhs.value,
        }
    }

    /// Computes the bitwise complement of the word within `width` bits.
    #[must_use]
    pub fn bit_not(self, width: u16) -> Self {
        Self {
            value: !self.value & Self::mask(width),
        }
    }

    /// Computes `self << rhs` within `width` bits. Shifts of `width` or more
    /// produce zero.
    #[must_use]
    pub fn shl(self, rhs: Self, width: u16) -> Self {
        if rhs.value >= U256::from(width) {
            return Self::zero();
        }
        Self {
            value: (self.value << rhs.value.as_u32()) & Self::mask(width),
        }
    }

    /// Computes the logical right shift `self >> rhs` within `width` bits.
    /// Shifts of `width` or more produce zero.
    #[must_use]
    pub fn lshr(self, rhs: Self, width: u16) -> Self {
        if rhs.value >= U256::from(width) {
            return Self::zero();
        }
        Self {
            value: (self.value & Self::mask(width)) >> rhs.value.as_u32(),
        }
    }

    /// Computes the arithmetic right shift `self >> rhs` within `width` bits,
    /// filling with the sign bit. Shifts of `width` or more produce all-ones
    /// for negative words and zero otherwise.
    #[must_use]
    pub fn ashr(self, rhs: Self, width: u16) -> Self {
        let negative = self.is_negative(width);
        if rhs.value >= U256::from(width) {
            return if negative {
                Self {
                    value: Self::mask(width),
                }
            } else {
                Self::zero()
            };
        }

        let shift = rhs.value.as_u32();
        let shifted = (self.value & Self::mask(width)) >> shift;
        if negative {
            let fill = Self::mask(width) & !(Self::mask(width) >> shift);
            Self {
                value: shifted | fill,
            }
        } else {
            Self { value: shifted }
        }
    }

    /// Compares the two words as unsigned `width`-bit integers.
    #[must_use]
    pub fn ult(self, rhs: Self) -> bool {
        self.value < rhs.value
    }

    /// Compares the two words as signed `width`-bit integers.
    ///
    /// The comparison flips the sign bit of both operands, which maps two's
    /// complement order onto unsigned order.
    #[must_use]
    pub fn slt(self, rhs: Self, width: u16) -> bool {
        let bias = Self::sign_bit(width);
        (self.value ^ bias) < (rhs.value ^ bias)
    }

    /// Extracts `width` bits of the word starting at bit `offset`.
    #[must_use]
    pub fn extract(self, offset: u16, width: u16) -> Self {
        Self {
            value: (self.value >> u32::from(offset)) & Self::mask(width),
        }
    }

    /// Concatenates the word (as the high bits) with `low`, which is
    /// `low_width` bits wide.
    #[must_use]
    pub fn concat(self, low: Self, low_width: u16) -> Self {
        Self {
            value: (self.value << u32::from(low_width)) | (low.value & Self::mask(low_width)),
        }
    }
}

/// Constructs a known word from an array of little-endian bytes.
impl From<Vec<u8>> for KnownWord {
    fn from(mut value: Vec<u8>) -> Self {
        value.resize(32, 0);
        let value: U256 = U256::from_le_bytes(value.as_slice().try_into().unwrap());
        Self { value }
    }
}

/// Constructs a known word from a [`u64`].
impl From<u64> for KnownWord {
    fn from(value: u64) -> Self {
        let value = U256::from(value);
        Self { value }
    }
}

/// Constructs a known word from a [`usize`].
impl From<usize> for KnownWord {
    fn from(value: usize) -> Self {
        let value = U256::from(value as u128);
        Self { value }
    }
}

/// Constructs a known word from a [`U256`].
impl From<U256> for KnownWord {
    fn from(value: U256) -> Self {
        Self { value }
    }
}

/// Obtains a [`U256`] from a known word.
impl From<KnownWord> for U256 {
    fn from(value: KnownWord) -> Self {
        value.value
    }
}

/// Obtains a [`u64`] from a known word.
impl From<KnownWord> for u64 {
    fn from(value: KnownWord) -> Self {
        value.value.as_u64()
    }
}

/// Obtains a [`usize`] from a known word.
impl From<KnownWord> for usize {
    fn from(value: KnownWord) -> Self {
        value.value.as_usize()
    }
}

/// Obtains a [`bool`] from a known word.
impl From<KnownWord> for bool {
    fn from(value: KnownWord) -> Self {
        value.value != U256::ZERO
    }
}

/// Obtains a [`bool`] from a known word.
impl From<&KnownWord> for bool {
    fn from(value: &KnownWord) -> Self {
        value.value != U256::ZERO
    }
}

/// Obtains a known word from a [`bool`].
impl From<bool> for KnownWord {
    fn from(value: bool) -> Self {
        if value {
            Self::one()
        } else {
            Self::zero()
        }
    }
}

/// Pretty-prints the known word as a hexadecimal-encoded number.
impl Display for KnownWord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = hex::encode(self.value.to_be_bytes());
        let str = str.trim_start_matches('0');
        let str = if str.is_empty() { "0" } else { str };
        write!(f, "0x{str}")
    }
}
