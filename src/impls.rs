/**
    This module combines all the boilerplate
    implementations of fmt::Display and fmt::Debug.
*/
use std::fmt;

use crate::{
    ecc::{ecdsa::EcdsaSignature, schnorr::SchnorrSignature},
    key::{PrivateKey, PublicKey},
    tx::{OutPoint, SighashType, Transaction},
    util::reversed,
};

/*
    key module impls
*/
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PrivateKey(<redacted>)")
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.as_bytes()))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

/*
    ecc module impls
*/
impl fmt::Display for EcdsaSignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_compact()))
    }
}

impl fmt::Debug for EcdsaSignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EcdsaSignature")
            .field("r", &hex::encode(self.r))
            .field("s", &hex::encode(self.s))
            .finish()
    }
}

impl fmt::Display for SchnorrSignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.as_bytes()))
    }
}

impl fmt::Debug for SchnorrSignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SchnorrSignature({})", self)
    }
}

/*
    tx module impls
*/

/// Txid in display order, then the output index.
impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", hex::encode(reversed(&self.hash)), self.index)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

impl fmt::Display for SighashType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let base = if self.is_none() {
            "NONE"
        } else if self.is_single() {
            "SINGLE"
        } else {
            "ALL"
        };
        if self.anyone_can_pay() {
            write!(f, "{}|ANYONECANPAY", base)
        } else {
            write!(f, "{}", base)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::tests::{tx_from_hex, BIP143_SIGNED_TX};

    #[test]
    fn private_keys_are_not_printed() {
        let key = PrivateKey::from_bytes(&[0x11; 32]).unwrap();
        let printed = format!("{:?}", key);
        assert_eq!(printed, "PrivateKey(<redacted>)");
        assert!(!printed.contains("1111"));
    }

    #[test]
    fn display_formats() {
        let key = PrivateKey::from_bytes(&{
            let mut one = [0u8; 32];
            one[31] = 1;
            one
        })
        .unwrap();
        assert_eq!(
            key.public_key().to_string(),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );

        let tx = tx_from_hex(BIP143_SIGNED_TX);
        assert_eq!(tx.to_string(), BIP143_SIGNED_TX);
        assert_eq!(
            tx.inputs[0].prev_out.to_string(),
            "9f96ade4b41d5433f4eda31e1738ec2b36f6e7d1420d94a6af99801a88f7f7ff:0"
        );

        assert_eq!(SighashType::ALL.to_string(), "ALL");
        assert_eq!(SighashType::SINGLE_ANYONECANPAY.to_string(), "SINGLE|ANYONECANPAY");
        assert_eq!(SighashType(0x04).to_string(), "ALL");
    }
}
