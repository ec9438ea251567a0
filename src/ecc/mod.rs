/*
    secp256k1 arithmetic and the two signature schemes built on it.

    Everything works on fixed 32 byte buffers and four-limb integers; no
    heap-allocated big integers are involved.
*/
pub mod ecdsa;
pub mod field;
pub mod point;
pub mod rfc6979;
pub mod scalar;
pub mod schnorr;
pub mod uint;

pub use ecdsa::{sign_ecdsa, verify_ecdsa, verify_ecdsa_point, EcdsaSignature};
pub use point::{Point, PointEncoding};
pub use scalar::{is_valid_scalar, Scalar};
pub use schnorr::{sign_schnorr, verify_schnorr, SchnorrSignature};
