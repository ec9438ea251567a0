/*
    Library implementing the pieces that authenticate a Bitcoin transaction:
    secp256k1 keys, deterministic ECDSA, BIP340 Schnorr signatures, BIP66
    DER signatures, BIP341 taproot tweaks and the legacy and BIP143
    signature hashes.

    Secret material is not zeroized and scalar arithmetic is not audited
    for constant time.

    References:
        - BIP66, BIP143, BIP144, BIP340, BIP341
        - RFC6979 (deterministic ECDSA nonces)
        - learn me a bitcoin (https://learnmeabitcoin.com/)
            for great visualisation of the sighash algorithms

        - The Rust-Bitcoin repository (https://github.com/rust-bitcoin/rust-bitcoin)
            for providing clear reference code to work against.
*/

//Outward facing modules
pub mod der;
pub mod ecc;
pub mod error;
pub mod key;
pub mod prelude;
pub mod script;
pub mod signer;
pub mod taproot;
pub mod tx;

//Modules for internal use
pub mod hash;
pub mod util;
mod impls;

pub use error::Error;
