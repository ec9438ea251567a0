/*
    Strict DER encoding of ECDSA signatures as they appear in Bitcoin scripts
    (BIP66), with the one byte sighash type appended.

        0x30 [total-length] 0x02 [R-length] [R] 0x02 [S-length] [S] [sighash-type]

    Integers are minimal big-endian two's complement: a 0x00 byte is
    prepended only when the first byte would otherwise have its high bit set.
*/
use log::{debug, trace};

use crate::{ecc::ecdsa::EcdsaSignature, error::DerError};

/// Smallest valid encoding: one byte integers plus the sighash byte.
pub const MIN_SIGNATURE_LEN: usize = 9;
/// Largest valid encoding: two 33 byte integers plus the sighash byte.
pub const MAX_SIGNATURE_LEN: usize = 73;

const SEQUENCE_TAG: u8 = 0x30;
const INTEGER_TAG: u8 = 0x02;

/**
    Encodes an unsigned big-endian integer as a DER INTEGER (tag, length, value).
    Values wider than 256 bits are refused.
*/
pub fn encode_integer(value: &[u8]) -> Result<Vec<u8>, DerError> {
    let first = value.iter().position(|&b| b != 0).unwrap_or(value.len());
    let significant = &value[first..];
    if significant.len() > 32 {
        return Err(DerError::IntegerTooLarge);
    }

    let mut body = Vec::with_capacity(33);
    if significant.is_empty() || significant[0] & 0x80 != 0 {
        body.push(0x00);
    }
    body.extend_from_slice(significant);

    let mut out = Vec::with_capacity(body.len() + 2);
    out.push(INTEGER_TAG);
    out.push(body.len() as u8);
    out.extend(body);
    Ok(out)
}

/**
    Encodes a signature followed by its sighash type, which must fit in a byte.
*/
pub fn encode_signature(signature: &EcdsaSignature, sighash_type: u32) -> Result<Vec<u8>, DerError> {
    if sighash_type > 0xff {
        return Err(DerError::SighashTypeTooLarge(sighash_type));
    }

    let r = encode_integer(&signature.r)?;
    let s = encode_integer(&signature.s)?;

    let mut out = Vec::with_capacity(MAX_SIGNATURE_LEN);
    out.push(SEQUENCE_TAG);
    out.push((r.len() + s.len()) as u8);
    out.extend(r);
    out.extend(s);
    out.push(sighash_type as u8);
    Ok(out)
}

/**
    Decodes a signature with its trailing sighash byte, applying every
    BIP66 strictness rule. Anything non-canonical is rejected.
*/
pub fn decode_signature(der: &[u8]) -> Result<(EcdsaSignature, u32), DerError> {
    check_encoding(der).map_err(|err| {
        debug!("der: rejecting signature: {}", err);
        err
    })?;

    let r_len = der[3] as usize;
    let s_len = der[5 + r_len] as usize;
    let r = integer_bytes(&der[4..4 + r_len])?;
    let s = integer_bytes(&der[6 + r_len..6 + r_len + s_len])?;
    let sighash_type = der[der.len() - 1] as u32;

    Ok((EcdsaSignature { r, s }, sighash_type))
}

/**
    Reports whether the bytes are a strictly encoded signature.
*/
pub fn is_valid_encoding(der: &[u8]) -> bool {
    check_encoding(der).is_ok()
}

fn check_encoding(der: &[u8]) -> Result<(), DerError> {
    let len = der.len();
    if !(MIN_SIGNATURE_LEN..=MAX_SIGNATURE_LEN).contains(&len) {
        trace!("der: rejecting signature of length {}", len);
        return Err(DerError::InvalidLength(len));
    }
    if der[0] != SEQUENCE_TAG {
        return Err(DerError::InvalidHeader);
    }
    // the length covers everything but the header, itself and the sighash byte
    if der[1] as usize != len - 3 {
        return Err(DerError::LengthMismatch);
    }

    let r_len = der[3] as usize;
    if 5 + r_len >= len {
        return Err(DerError::InvalidIntegerLength);
    }
    let s_len = der[5 + r_len] as usize;
    if r_len + s_len + 7 != len {
        return Err(DerError::LengthMismatch);
    }

    if der[2] != INTEGER_TAG {
        return Err(DerError::InvalidIntegerTag);
    }
    check_integer(&der[4..4 + r_len])?;

    if der[4 + r_len] != INTEGER_TAG {
        return Err(DerError::InvalidIntegerTag);
    }
    check_integer(&der[6 + r_len..6 + r_len + s_len])
}

fn check_integer(value: &[u8]) -> Result<(), DerError> {
    if value.is_empty() {
        return Err(DerError::InvalidIntegerLength);
    }
    if value[0] & 0x80 != 0 {
        return Err(DerError::NegativeInteger);
    }
    if value.len() > 1 && value[0] == 0x00 && value[1] & 0x80 == 0 {
        return Err(DerError::ExcessivePadding);
    }
    Ok(())
}

fn integer_bytes(value: &[u8]) -> Result<[u8; 32], DerError> {
    let value = match value {
        [0x00, rest @ ..] if !rest.is_empty() => rest,
        _ => value,
    };
    if value.len() > 32 {
        return Err(DerError::IntegerTooLarge);
    }
    let mut out = [0u8; 32];
    out[32 - value.len()..].copy_from_slice(value);
    Ok(out)
}
