/*
    BIP340 Schnorr signatures over x-only public keys.
*/
use log::debug;

use super::{point::Point, scalar::Scalar};
use crate::{
    error::SignError,
    hash::{tagged_hashes, TaggedHash},
    key::PrivateKey,
    util::xor_32,
};

tagged_hashes!(Bip340Aux, "BIP0340/aux");
tagged_hashes!(Bip340Nonce, "BIP0340/nonce");
tagged_hashes!(Bip340Challenge, "BIP0340/challenge");

/// 64 bytes: the x coordinate of R followed by s.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchnorrSignature(pub [u8; 64]);

impl SchnorrSignature {
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    fn r_bytes(&self) -> [u8; 32] {
        let mut r = [0u8; 32];
        r.copy_from_slice(&self.0[..32]);
        r
    }

    fn s_bytes(&self) -> [u8; 32] {
        let mut s = [0u8; 32];
        s.copy_from_slice(&self.0[32..]);
        s
    }
}

/**
    Signs a 32 byte message following BIP340. `aux_rand` is mixed into the
    nonce; fresh randomness is recommended but any value is safe to use.

    The signature is verified before it is returned.
*/
pub fn sign_schnorr(
    key: &PrivateKey,
    message: &[u8; 32],
    aux_rand: &[u8; 32],
) -> Result<SchnorrSignature, SignError> {
    let public = key.public_key();
    let d = if public.has_even_y() { *key.scalar() } else { -*key.scalar() };
    let p_bytes = public.x_only_bytes();

    let t = xor_32(&d.to_bytes(), &Bip340Aux::hash(&[aux_rand]));
    let rand = Bip340Nonce::hash(&[&t, &p_bytes, message]);
    let k0 = Scalar::from_bytes_reduced(&rand);
    if k0.is_zero() {
        return Err(SignError::ZeroNonce);
    }

    let r_point = Point::mul_generator(&k0);
    let k = if r_point.has_even_y() { k0 } else { -k0 };
    let r_bytes = match r_point.x() {
        Some(x) => x.to_bytes(),
        None => return Err(SignError::ZeroNonce),
    };

    let e = challenge(&r_bytes, &p_bytes, message);
    let s = k + e * d;

    let mut sig = [0u8; 64];
    sig[..32].copy_from_slice(&r_bytes);
    sig[32..].copy_from_slice(&s.to_bytes());
    let sig = SchnorrSignature(sig);

    if !verify_schnorr(&p_bytes, message, &sig) {
        return Err(SignError::DegenerateSignature);
    }
    Ok(sig)
}

/**
    Verifies a BIP340 signature against an x-only public key.
*/
pub fn verify_schnorr(public_key: &[u8; 32], message: &[u8; 32], signature: &SchnorrSignature) -> bool {
    let p = match Point::lift_x(public_key) {
        Ok(p) => p,
        Err(err) => {
            debug!("schnorr: public key is not a curve point: {}", err);
            return false;
        }
    };

    let r_bytes = signature.r_bytes();
    // r must be a field element, s a scalar
    let r = match super::field::FieldElement::from_bytes(&r_bytes) {
        Some(r) => r,
        None => return false,
    };
    let s = match Scalar::from_bytes(&signature.s_bytes()) {
        Some(s) => s,
        None => return false,
    };

    let e = challenge(&r_bytes, public_key, message);
    // R = s * G - e * P
    let r_point = p.mul_add_generator(&s, &-e);

    match r_point {
        Point::Affine { x, y } => !y.is_odd() && x == r,
        Point::Infinity => false,
    }
}

fn challenge(r: &[u8; 32], p: &[u8; 32], message: &[u8; 32]) -> Scalar {
    Scalar::from_bytes_reduced(&Bip340Challenge::hash(&[r, p, message]))
}
