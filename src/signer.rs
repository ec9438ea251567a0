/*
    Signing front ends.

    `SignatureScheme` puts ECDSA and BIP340 Schnorr behind one interface so
    code that only moves digests and keys around does not need to care which
    one an output uses. `sign_sighash` produces the byte string that goes
    into a legacy script or a segwit v0 witness.
*/
use rand::{CryptoRng, RngCore};

use crate::{
    der::encode_signature,
    ecc::{
        ecdsa::{sign_ecdsa, verify_ecdsa, EcdsaSignature},
        schnorr::{sign_schnorr, verify_schnorr, SchnorrSignature},
    },
    error::{Error, SignError},
    key::PrivateKey,
    tx::SighashType,
};

pub trait SignatureScheme {
    type Signature;

    fn sign(&self, key: &PrivateKey, digest: &[u8; 32]) -> Result<Self::Signature, SignError>;

    /// False for keys the scheme cannot decode as well as for bad signatures.
    fn verify(&self, public_key: &[u8], digest: &[u8; 32], signature: &Self::Signature) -> bool;
}

/// RFC6979 deterministic ECDSA. Public keys are compressed or uncompressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ecdsa;

impl SignatureScheme for Ecdsa {
    type Signature = EcdsaSignature;

    fn sign(&self, key: &PrivateKey, digest: &[u8; 32]) -> Result<EcdsaSignature, SignError> {
        sign_ecdsa(key, digest)
    }

    fn verify(&self, public_key: &[u8], digest: &[u8; 32], signature: &EcdsaSignature) -> bool {
        verify_ecdsa(public_key, digest, signature)
    }
}

/// BIP340 Schnorr over 32 byte x-only public keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct Schnorr {
    aux_rand: [u8; 32],
}

impl Schnorr {
    pub fn with_aux_rand(aux_rand: [u8; 32]) -> Self {
        Self { aux_rand }
    }

    /// Draws the auxiliary randomness from `rng`.
    pub fn new_rand<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut aux_rand = [0u8; 32];
        rng.fill_bytes(&mut aux_rand);
        Self { aux_rand }
    }
}

impl SignatureScheme for Schnorr {
    type Signature = SchnorrSignature;

    fn sign(&self, key: &PrivateKey, digest: &[u8; 32]) -> Result<SchnorrSignature, SignError> {
        sign_schnorr(key, digest, &self.aux_rand)
    }

    fn verify(&self, public_key: &[u8], digest: &[u8; 32], signature: &SchnorrSignature) -> bool {
        match <&[u8; 32]>::try_from(public_key) {
            Ok(public_key) => verify_schnorr(public_key, digest, signature),
            Err(_) => false,
        }
    }
}

/**
    Signs a sighash digest with ECDSA and returns the DER signature with the
    sighash type byte appended, ready to be pushed in a script or witness.
*/
pub fn sign_sighash(digest: &[u8; 32], key: &PrivateKey, sighash_type: SighashType) -> Result<Vec<u8>, Error> {
    let signature = sign_ecdsa(key, digest)?;
    Ok(encode_signature(&signature, sighash_type.to_u32())?)
}
