/*
    Deterministic ECDSA nonces (RFC6979, section 3.2) with HMAC-SHA256.

    The curve order and the hash are both 256 bits wide, so bits2int is the
    plain big-endian reading of a 32 byte block and one HMAC output is one
    candidate. Candidates come out as an iterator; the signer keeps pulling
    until it gets a usable signature.
*/
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::scalar::Scalar;

type HmacSha256 = Hmac<Sha256>;

pub struct NonceGenerator {
    k: [u8; 32],
    v: [u8; 32],
    started: bool,
}

impl NonceGenerator {
    /**
        Seeds the generator with the private key `x` and message hash `h1`.
    */
    pub fn new(x: &Scalar, h1: &[u8; 32]) -> Self {
        let key = x.to_bytes();
        // bits2octets(h1) = int2octets(bits2int(h1) mod N)
        let msg = Scalar::from_bytes_reduced(h1).to_bytes();

        let mut k = [0u8; 32];
        let mut v = [1u8; 32];

        k = hmac(&k, &[&v, &[0x00], &key, &msg]);
        v = hmac(&k, &[&v]);
        k = hmac(&k, &[&v, &[0x01], &key, &msg]);
        v = hmac(&k, &[&v]);

        Self { k, v, started: false }
    }
}

impl Iterator for NonceGenerator {
    type Item = Scalar;

    fn next(&mut self) -> Option<Scalar> {
        loop {
            if self.started {
                self.k = hmac(&self.k, &[&self.v, &[0x00]]);
                self.v = hmac(&self.k, &[&self.v]);
            }
            self.started = true;

            self.v = hmac(&self.k, &[&self.v]);
            match Scalar::from_bytes(&self.v) {
                Some(candidate) if !candidate.is_zero() => return Some(candidate),
                _ => continue,
            }
        }
    }
}

fn hmac(key: &[u8; 32], chunks: &[&[u8]]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    for chunk in chunks {
        mac.update(chunk);
    }
    mac.finalize().into_bytes().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    #[test]
    fn satoshi_nakamoto_nonce() {
        let x = Scalar::ONE;
        let h1 = sha256(b"Satoshi Nakamoto");
        let k = NonceGenerator::new(&x, &h1).next().unwrap();
        assert_eq!(
            hex::encode(k.to_bytes()),
            "8f8a276c19f4149656b280621e358cce24f5f52542772691ee69063b74f15d15"
        );
    }

    #[test]
    fn nonces_depend_on_key_and_message() {
        let h1 = sha256(b"Satoshi Nakamoto");
        let h2 = sha256(b"Satoshi Nakamoto!");
        let k1 = NonceGenerator::new(&Scalar::ONE, &h1).next();
        let k2 = NonceGenerator::new(&Scalar::from_u64(2), &h1).next();
        let k3 = NonceGenerator::new(&Scalar::ONE, &h2).next();
        assert_ne!(k1, k2);
        assert_ne!(k1, k3);
        assert_eq!(k1, NonceGenerator::new(&Scalar::ONE, &h1).next());
    }

    #[test]
    fn retries_produce_fresh_candidates() {
        let h1 = sha256(b"Satoshi Nakamoto");
        let candidates: Vec<Scalar> = NonceGenerator::new(&Scalar::ONE, &h1).take(3).collect();
        assert_ne!(candidates[0], candidates[1]);
        assert_ne!(candidates[1], candidates[2]);
    }
}
