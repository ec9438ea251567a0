/*
    Arithmetic in the base field of secp256k1, the integers modulo
    p = 2^256 - 2^32 - 977.

    Elements are always kept fully reduced. Since 2^256 = 2^32 + 977 (mod p),
    a 512-bit product is folded back into 256 bits by multiplying its upper
    half by that small constant.
*/
use std::ops::{Add, Mul, Neg, Sub};

use super::uint::U256;

/// The field prime p.
pub const P: U256 = U256::from_limbs([
    0xFFFF_FFFE_FFFF_FC2F,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
]);

// 2^256 - p
const FOLD: u64 = 0x1_0000_03D1;

// (p + 1) / 4, the square root exponent. Valid because p = 3 (mod 4).
const SQRT_EXP: U256 = U256::from_limbs([
    0xFFFF_FFFF_BFFF_FF0C,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
    0x3FFF_FFFF_FFFF_FFFF,
]);

// p - 2
const INV_EXP: U256 = U256::from_limbs([
    0xFFFF_FFFE_FFFF_FC2D,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
]);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldElement(U256);

impl FieldElement {
    pub const ZERO: Self = Self(U256::ZERO);
    pub const ONE: Self = Self(U256::ONE);

    pub(crate) const fn from_limbs_unchecked(limbs: [u64; 4]) -> Self {
        Self(U256::from_limbs(limbs))
    }

    pub fn from_u64(value: u64) -> Self {
        Self(U256::from_u64(value))
    }

    /**
        Parses a big-endian coordinate. Returns None when the value is not below p,
        so every field element has exactly one encoding.
    */
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        let value = U256::from_be_bytes(bytes);
        if value >= P {
            return None;
        }
        Some(Self(value))
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_odd(&self) -> bool {
        self.0.is_odd()
    }

    pub fn square(&self) -> Self {
        *self * *self
    }

    pub fn double(&self) -> Self {
        *self + *self
    }

    /**
        Raises the element to `exp` with a left-to-right square and multiply
        over all 256 exponent bits.
    */
    pub fn pow(&self, exp: &U256) -> Self {
        let mut result = Self::ONE;
        for i in (0..256).rev() {
            result = result.square();
            if exp.bit(i) {
                result = result * *self;
            }
        }
        result
    }

    /**
        Multiplicative inverse via Fermat's little theorem. Zero has no inverse.
    */
    pub fn invert(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        Some(self.pow(&INV_EXP))
    }

    /**
        Returns a square root if one exists. The root returned is a^((p+1)/4),
        which may be either of the two roots.
    */
    pub fn sqrt(&self) -> Option<Self> {
        let root = self.pow(&SQRT_EXP);
        if root.square() == *self {
            Some(root)
        } else {
            None
        }
    }

    fn reduce_wide(wide: [u64; 8]) -> Self {
        // lo + hi * FOLD fits in five limbs
        let mut acc = [0u64; 5];
        let mut carry = 0u128;
        for i in 0..4 {
            let t = wide[i] as u128 + (wide[i + 4] as u128) * (FOLD as u128) + carry;
            acc[i] = t as u64;
            carry = t >> 64;
        }
        acc[4] = carry as u64;

        let mut out = [0u64; 4];
        let mut carry = (acc[4] as u128) * (FOLD as u128);
        for i in 0..4 {
            let t = acc[i] as u128 + carry;
            out[i] = t as u64;
            carry = t >> 64;
        }

        let mut value = U256::from_limbs(out);
        if carry != 0 {
            // the wrapped value is tiny here, so adding FOLD cannot overflow again
            value = value.overflowing_add(&U256::from_u64(FOLD)).0;
        }
        if value >= P {
            value = value.overflowing_sub(&P).0;
        }
        Self(value)
    }
}

impl Add for FieldElement {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let (sum, carry) = self.0.overflowing_add(&rhs.0);
        if carry || sum >= P {
            Self(sum.overflowing_sub(&P).0)
        } else {
            Self(sum)
        }
    }
}

impl Sub for FieldElement {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let (diff, borrow) = self.0.overflowing_sub(&rhs.0);
        if borrow {
            Self(diff.overflowing_add(&P).0)
        } else {
            Self(diff)
        }
    }
}

impl Mul for FieldElement {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::reduce_wide(self.0.widening_mul(&rhs.0))
    }
}

impl Neg for FieldElement {
    type Output = Self;

    fn neg(self) -> Self {
        Self::ZERO - self
    }
}
