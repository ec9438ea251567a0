/*
    ECDSA over secp256k1 with RFC6979 nonces.

    Signatures are produced exactly as the algorithm gives them: s is not
    normalized to the low half of the order, and verification accepts both
    halves. Callers who need low-S output (for standardness) call
    `EcdsaSignature::normalize_s` themselves.
*/
use log::{debug, trace};

use super::{point::Point, rfc6979::NonceGenerator, scalar::Scalar};
use crate::{
    error::SignError,
    key::{PrivateKey, PublicKey},
};

/**
    An ECDSA signature as two raw 32 byte big-endian integers. Range checks
    happen in verification, so a decoded signature with out of range values
    can still be represented and rejected later.
*/
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EcdsaSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl EcdsaSignature {
    pub fn from_compact(bytes: &[u8; 64]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Self { r, s }
    }

    /// r || s
    pub fn to_compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    /**
        True when s is a valid scalar no greater than N/2.
    */
    pub fn is_low_s(&self) -> bool {
        matches!(Scalar::from_bytes(&self.s), Some(s) if !s.is_high())
    }

    /**
        Returns the equivalent signature with s replaced by N - s when s is
        in the upper half. Out of range values are left untouched.
    */
    pub fn normalize_s(&self) -> Self {
        match Scalar::from_bytes(&self.s) {
            Some(s) if s.is_high() => Self { r: self.r, s: (-s).to_bytes() },
            _ => *self,
        }
    }
}

/**
    Signs a 32 byte message hash. The nonce is derived from the key and the
    hash, so the same inputs always give the same signature.
*/
pub fn sign_ecdsa(key: &PrivateKey, hash: &[u8; 32]) -> Result<EcdsaSignature, SignError> {
    let d = key.scalar();
    let z = Scalar::from_bytes_reduced(hash);

    for (attempt, k) in NonceGenerator::new(d, hash).enumerate() {
        if attempt > 0 {
            trace!("ecdsa: nonce candidate {} rejected, drawing another", attempt);
        }
        if k.is_zero() {
            return Err(SignError::ZeroNonce);
        }

        let r = match Point::mul_generator(&k).x() {
            Some(x) => Scalar::from_bytes_reduced(&x.to_bytes()),
            None => continue,
        };
        if r.is_zero() {
            continue;
        }

        let k_inv = match k.invert() {
            Some(k_inv) => k_inv,
            None => return Err(SignError::ZeroNonce),
        };
        let s = k_inv * (z + r * *d);
        if s.is_zero() {
            continue;
        }

        return Ok(EcdsaSignature { r: r.to_bytes(), s: s.to_bytes() });
    }

    // the nonce iterator never ends
    Err(SignError::DegenerateSignature)
}

/**
    Verifies a signature against a serialized public key (33 or 65 bytes,
    or 32 byte x-only). Keys that fail to decode verify as false.
*/
pub fn verify_ecdsa(public_key: &[u8], hash: &[u8; 32], signature: &EcdsaSignature) -> bool {
    match PublicKey::from_slice(public_key) {
        Ok(public_key) => verify_ecdsa_point(&public_key, hash, signature),
        Err(err) => {
            debug!("ecdsa: rejecting signature, public key did not decode: {}", err);
            false
        }
    }
}

/**
    Verifies a signature against an already decoded public key.
    Both low and high s values are accepted.
*/
pub fn verify_ecdsa_point(public_key: &PublicKey, hash: &[u8; 32], signature: &EcdsaSignature) -> bool {
    let (r, s) = match (Scalar::from_bytes(&signature.r), Scalar::from_bytes(&signature.s)) {
        (Some(r), Some(s)) if !r.is_zero() && !s.is_zero() => (r, s),
        _ => {
            debug!("ecdsa: r or s outside [1, N)");
            return false;
        }
    };

    let z = Scalar::from_bytes_reduced(hash);
    let w = match s.invert() {
        Some(w) => w,
        None => return false,
    };
    let u1 = z * w;
    let u2 = r * w;

    match public_key.point().mul_add_generator(&u1, &u2).x() {
        Some(x) => Scalar::from_bytes_reduced(&x.to_bytes()) == r,
        None => false,
    }
}
