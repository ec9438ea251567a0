/*
    This module contains the default imports for the library.

    Import the library using:
        use btc_txauth::prelude::*;
    to quickly import the essential parts of the library.
*/

pub use crate::{
    der::{decode_signature, encode_signature},

    ecc::{
        sign_ecdsa, sign_schnorr, verify_ecdsa, verify_schnorr,
        EcdsaSignature, SchnorrSignature,
    },

    error::Error,

    key::{PrivateKey, PublicKey},

    signer::{sign_sighash, Ecdsa, Schnorr, SignatureScheme},

    taproot::{tweak_private_key, tweak_public_key, TapNode},

    tx::{OutPoint, SighashType, Transaction, TxIn, TxOut, Witness},
};
