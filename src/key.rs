/*
    Private and public secp256k1 keys plus the helpers wallets need on top of them:
    format conversions, key aggregation and ECDH.

    A PrivateKey is always a scalar in [1, N) and a PublicKey is never the
    point at infinity.
*/
use rand::{CryptoRng, RngCore};

use crate::{
    ecc::{
        field::FieldElement,
        point::{Point, EVEN_PREFIX, ODD_PREFIX, UNCOMPRESSED_PREFIX},
        scalar::Scalar,
    },
    error::CurveError,
};

#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(Scalar);

impl PrivateKey {
    /**
        Generates a random private key from a cryptographically secure rng.
        Candidates outside [1, N) are discarded and drawn again.
    */
    pub fn new_rand<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        loop {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            if let Ok(key) = Self::from_bytes(&bytes) {
                return key;
            }
        }
    }

    /**
        Use a predefined byte array as a private key.
    */
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CurveError> {
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| CurveError::InvalidScalar)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CurveError> {
        match Scalar::from_bytes(bytes) {
            Some(scalar) if !scalar.is_zero() => Ok(Self(scalar)),
            _ => Err(CurveError::InvalidScalar),
        }
    }

    pub(crate) fn from_scalar(scalar: Scalar) -> Result<Self, CurveError> {
        if scalar.is_zero() {
            return Err(CurveError::InvalidScalar);
        }
        Ok(Self(scalar))
    }

    /**
        Serializes the private key into a 32 byte big-endian array.
    */
    pub fn as_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub(crate) fn scalar(&self) -> &Scalar {
        &self.0
    }

    /// N - d, the key for the negated public point.
    pub fn negate(&self) -> Self {
        Self(-self.0)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_private_key(self)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    x: FieldElement,
    y: FieldElement,
}

impl PublicKey {
    /**
        The point d * G for private key d.
    */
    pub fn from_private_key(key: &PrivateKey) -> Self {
        match Point::mul_generator(key.scalar()) {
            Point::Affine { x, y } => Self { x, y },
            // d is in [1, N), so d * G is never the identity
            Point::Infinity => unreachable!("non-zero multiple of the generator"),
        }
    }

    /**
        Decodes a public key from its uncompressed, compressed or x-only encoding.
    */
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CurveError> {
        Self::from_point(Point::deserialize(bytes)?)
    }

    pub fn from_point(point: Point) -> Result<Self, CurveError> {
        match point {
            Point::Affine { x, y } => Ok(Self { x, y }),
            Point::Infinity => Err(CurveError::PointAtInfinity),
        }
    }

    pub fn point(&self) -> Point {
        Point::Affine { x: self.x, y: self.y }
    }

    /**
        Returns the compressed public key as a byte array.
    */
    pub fn as_bytes(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out[0] = if self.y.is_odd() { ODD_PREFIX } else { EVEN_PREFIX };
        out[1..].copy_from_slice(&self.x.to_bytes());
        out
    }

    /**
        Returns the uncompressed public key, 0x04 followed by both coordinates.
    */
    pub fn decompressed_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[0] = UNCOMPRESSED_PREFIX;
        out[1..33].copy_from_slice(&self.x.to_bytes());
        out[33..].copy_from_slice(&self.y.to_bytes());
        out
    }

    /// The BIP340 x-only form.
    pub fn x_only_bytes(&self) -> [u8; 32] {
        self.x.to_bytes()
    }

    pub fn has_even_y(&self) -> bool {
        !self.y.is_odd()
    }
}

/**
    Derives the 33 byte compressed public key of a private key.
*/
pub fn compressed_public_key(key: &PrivateKey) -> [u8; 33] {
    key.public_key().as_bytes()
}

pub fn uncompressed_public_key(key: &PrivateKey) -> [u8; 65] {
    key.public_key().decompressed_bytes()
}

pub fn x_only_public_key(key: &PrivateKey) -> [u8; 32] {
    key.public_key().x_only_bytes()
}

/**
    Converts any public key encoding to the compressed form.
*/
pub fn compress_public_key(public_key: &[u8]) -> Result<[u8; 33], CurveError> {
    Ok(PublicKey::from_slice(public_key)?.as_bytes())
}

/**
    Converts any public key encoding to the uncompressed form. X-only input
    decodes to the even-y point.
*/
pub fn uncompress_public_key(public_key: &[u8]) -> Result<[u8; 65], CurveError> {
    Ok(PublicKey::from_slice(public_key)?.decompressed_bytes())
}

/**
    Reports whether the bytes are a valid 33 byte compressed public key.
*/
pub fn is_compressed_public_key(public_key: &[u8]) -> bool {
    public_key.len() == 33 && PublicKey::from_slice(public_key).is_ok()
}

/**
    Adds private keys modulo N. A sum of zero is not a key and fails.
*/
pub fn sum_private_keys(keys: &[PrivateKey]) -> Result<PrivateKey, CurveError> {
    let sum = keys.iter().fold(Scalar::ZERO, |acc, key| acc + *key.scalar());
    PrivateKey::from_scalar(sum)
}

/**
    Adds public keys given in any encoding and returns the x-only form of
    the sum. Summing to the point at infinity fails.
*/
pub fn sum_public_keys<T: AsRef<[u8]>>(keys: &[T]) -> Result<[u8; 32], CurveError> {
    let mut sum = Point::Infinity;
    for key in keys {
        sum = sum.add(&PublicKey::from_slice(key.as_ref())?.point());
    }
    Ok(PublicKey::from_point(sum)?.x_only_bytes())
}

/**
    ECDH shared secret (RFC5903 section 9): the x-coordinate of d * Q.
    Both parties derive the same value from their own private key and
    the counterparty's public key.
*/
pub fn shared_secret(key: &PrivateKey, public_key: &PublicKey) -> [u8; 32] {
    let shared = public_key.point().mul(key.scalar());
    match PublicKey::from_point(shared) {
        Ok(shared) => shared.x_only_bytes(),
        Err(_) => unreachable!("ECDH product of valid keys is never the identity"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;
    use secp256k1::Secp256k1;

    fn key_from_hex(s: &str) -> PrivateKey {
        PrivateKey::from_slice(&hex::decode(s).unwrap()).unwrap()
    }

    #[test]
    fn rejects_out_of_range_private_keys() {
        assert_eq!(PrivateKey::from_bytes(&[0u8; 32]), Err(CurveError::InvalidScalar));
        assert_eq!(PrivateKey::from_bytes(&[0xff; 32]), Err(CurveError::InvalidScalar));
        assert_eq!(PrivateKey::from_slice(&[1u8; 31]), Err(CurveError::InvalidScalar));
        let n = hex::decode("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141").unwrap();
        assert_eq!(PrivateKey::from_slice(&n), Err(CurveError::InvalidScalar));
    }

    #[test]
    fn public_keys_match_libsecp256k1() {
        let secp = Secp256k1::new();
        let mut rng = thread_rng();
        for _ in 0..16 {
            let key = PrivateKey::new_rand(&mut rng);
            let sk = secp256k1::SecretKey::from_slice(&key.as_bytes()).unwrap();
            let pk = secp256k1::PublicKey::from_secret_key(&secp, &sk);

            assert_eq!(compressed_public_key(&key), pk.serialize());
            assert_eq!(uncompressed_public_key(&key), pk.serialize_uncompressed());
            assert_eq!(x_only_public_key(&key), pk.x_only_public_key().0.serialize());
        }
    }

    #[test]
    fn format_conversions() {
        let key = key_from_hex("0000000000000000000000000000000000000000000000000000000000000003");
        let compressed = compressed_public_key(&key);
        let uncompressed = uncompressed_public_key(&key);

        assert_eq!(compress_public_key(&uncompressed).unwrap(), compressed);
        assert_eq!(uncompress_public_key(&compressed).unwrap(), uncompressed);
        assert!(is_compressed_public_key(&compressed));
        assert!(!is_compressed_public_key(&uncompressed));
        assert!(!is_compressed_public_key(&compressed[1..]));

        // x-only input always decompresses to the even point
        let x_only = x_only_public_key(&key);
        let lifted = compress_public_key(&x_only).unwrap();
        assert_eq!(lifted[0], 0x02);
        assert_eq!(&lifted[1..], &x_only[..]);
    }

    #[test]
    fn sum_of_keys_is_consistent() {
        let mut rng = thread_rng();
        let a = PrivateKey::new_rand(&mut rng);
        let b = PrivateKey::new_rand(&mut rng);
        let sum = sum_private_keys(&[a.clone(), b.clone()]).unwrap();

        let public_sum = sum_public_keys(&[compressed_public_key(&a), compressed_public_key(&b)]).unwrap();
        assert_eq!(public_sum, x_only_public_key(&sum));

        assert_eq!(
            sum_private_keys(&[a.clone(), a.negate()]),
            Err(CurveError::InvalidScalar)
        );
        assert_eq!(
            sum_public_keys(&[compressed_public_key(&a), compressed_public_key(&a.negate())]),
            Err(CurveError::PointAtInfinity)
        );
    }

    #[test]
    fn shared_secret_is_symmetric() {
        let mut rng = thread_rng();
        let alice = PrivateKey::new_rand(&mut rng);
        let bob = PrivateKey::new_rand(&mut rng);
        assert_eq!(
            shared_secret(&alice, &bob.public_key()),
            shared_secret(&bob, &alice.public_key())
        );

        let secp_alice = secp256k1::SecretKey::from_slice(&alice.as_bytes()).unwrap();
        let secp_bob = secp256k1::PublicKey::from_slice(&bob.public_key().as_bytes()).unwrap();
        let expected = secp256k1::ecdh::shared_secret_point(&secp_bob, &secp_alice);
        assert_eq!(&shared_secret(&alice, &bob.public_key())[..], &expected[..32]);
    }
}
