/*
    Integers modulo the group order N of secp256k1.

    Private keys, nonces and signature components all live here.
*/
use std::ops::{Add, Mul, Neg, Sub};

use super::uint::U256;

/// The curve order N.
pub const N: U256 = U256::from_limbs([
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
]);

// 2^256 - N
const N_COMPLEMENT: [u64; 3] = [0x402D_A173_2FC9_BEBF, 0x4551_2319_50B7_5FC4, 0x1];

// N - 2
const INV_EXP: U256 = U256::from_limbs([
    0xBFD2_5E8C_D036_413F,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
]);

// floor(N / 2)
const HALF_N: U256 = U256::from_limbs([
    0xDFE9_2F46_681B_20A0,
    0x5D57_6E73_57A4_501D,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
]);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Scalar(U256);

impl Scalar {
    pub const ZERO: Self = Self(U256::ZERO);
    pub const ONE: Self = Self(U256::ONE);

    pub fn from_u64(value: u64) -> Self {
        Self(U256::from_u64(value))
    }

    /**
        Parses a big-endian integer, returning None unless it is below N.
        Zero is accepted; use `is_valid_scalar` when a key or nonce is expected.
    */
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        let value = U256::from_be_bytes(bytes);
        if value >= N {
            return None;
        }
        Some(Self(value))
    }

    /**
        Interprets 32 bytes as an integer and reduces it modulo N. Used for
        message digests and hash outputs, which may exceed the order.
    */
    pub fn from_bytes_reduced(bytes: &[u8; 32]) -> Self {
        let value = U256::from_be_bytes(bytes);
        if value >= N {
            Self(value.overflowing_sub(&N).0)
        } else {
            Self(value)
        }
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// True when the value is greater than N/2.
    pub fn is_high(&self) -> bool {
        self.0 > HALF_N
    }

    pub(crate) fn bit(&self, i: usize) -> bool {
        self.0.bit(i)
    }

    pub fn pow(&self, exp: &U256) -> Self {
        let mut result = Self::ONE;
        for i in (0..256).rev() {
            result = result * result;
            if exp.bit(i) {
                result = result * *self;
            }
        }
        result
    }

    pub fn invert(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        Some(self.pow(&INV_EXP))
    }

    fn reduce_wide(mut wide: [u64; 8]) -> Self {
        // Fold hi * 2^256 into hi * (2^256 - N) until the upper half is empty.
        // Each round strictly shrinks the value, so this terminates after a few rounds.
        while wide[4..].iter().any(|&limb| limb != 0) {
            let mut next = [0u64; 8];
            next[..4].copy_from_slice(&wide[..4]);
            for i in 0..4 {
                let mut carry = 0u128;
                for (j, c) in N_COMPLEMENT.iter().enumerate() {
                    let t = next[i + j] as u128 + (wide[i + 4] as u128) * (*c as u128) + carry;
                    next[i + j] = t as u64;
                    carry = t >> 64;
                }
                let mut k = i + N_COMPLEMENT.len();
                while carry != 0 && k < 8 {
                    let t = next[k] as u128 + carry;
                    next[k] = t as u64;
                    carry = t >> 64;
                    k += 1;
                }
            }
            wide = next;
        }

        let value = U256::from_limbs([wide[0], wide[1], wide[2], wide[3]]);
        if value >= N {
            Self(value.overflowing_sub(&N).0)
        } else {
            Self(value)
        }
    }
}

/**
    Reports whether the 32 bytes encode an integer in [1, N).
*/
pub fn is_valid_scalar(bytes: &[u8; 32]) -> bool {
    matches!(Scalar::from_bytes(bytes), Some(s) if !s.is_zero())
}

impl Add for Scalar {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let (sum, carry) = self.0.overflowing_add(&rhs.0);
        if carry || sum >= N {
            Self(sum.overflowing_sub(&N).0)
        } else {
            Self(sum)
        }
    }
}

impl Sub for Scalar {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let (diff, borrow) = self.0.overflowing_sub(&rhs.0);
        if borrow {
            Self(diff.overflowing_add(&N).0)
        } else {
            Self(diff)
        }
    }
}

impl Mul for Scalar {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::reduce_wide(self.0.widening_mul(&rhs.0))
    }
}

impl Neg for Scalar {
    type Output = Self;

    fn neg(self) -> Self {
        Self::ZERO - self
    }
}
