/*
    Error types for every fallible operation in the library.

    Verification routines do not use these: a signature either checks out
    or it does not, and they return a plain bool.
*/
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurveError {
    #[error("invalid point encoding length {0}, expected 32, 33 or 65 bytes")]
    InvalidLength(usize),
    #[error("invalid point encoding prefix 0x{0:02x}")]
    InvalidPrefix(u8),
    #[error("point is not on the secp256k1 curve")]
    NotOnCurve,
    #[error("point at infinity")]
    PointAtInfinity,
    #[error("scalar is zero or not below the curve order")]
    InvalidScalar,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignError {
    #[error("derived nonce is zero")]
    ZeroNonce,
    #[error("produced signature failed verification")]
    DegenerateSignature,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerError {
    #[error("DER signature length {0} outside 9..=73")]
    InvalidLength(usize),
    #[error("DER signature does not start with a compound header")]
    InvalidHeader,
    #[error("DER length byte does not match signature size")]
    LengthMismatch,
    #[error("expected an integer tag")]
    InvalidIntegerTag,
    #[error("integer has an invalid length")]
    InvalidIntegerLength,
    #[error("integer is negative")]
    NegativeInteger,
    #[error("integer has an unnecessary leading zero")]
    ExcessivePadding,
    #[error("integer does not fit in 256 bits")]
    IntegerTooLarge,
    #[error("sighash type {0:#x} does not fit in one byte")]
    SighashTypeTooLarge(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaprootError {
    #[error("taproot tweak is not a valid scalar")]
    InvalidTweak,
    #[error("tweaked private key is zero")]
    ZeroTweakedKey,
    #[error(transparent)]
    Curve(#[from] CurveError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SighashError {
    #[error("input index {index} out of range for transaction with {inputs} inputs")]
    InputOutOfRange { index: usize, inputs: usize },
}

#[derive(Debug, Error)]
pub enum TxError {
    #[error("transaction ended unexpectedly")]
    UnexpectedEof,
    #[error("too many inputs: {0}")]
    TooManyInputs(u64),
    #[error("too many outputs: {0}")]
    TooManyOutputs(u64),
    #[error("script of {0} bytes exceeds the maximum size")]
    ScriptTooLarge(u64),
    #[error("witness exceeds the maximum size")]
    WitnessTooLarge,
    #[error("invalid segwit flag 0x{0:02x}")]
    InvalidSegwitFlag(u8),
    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),
    #[error("compact size is not minimally encoded")]
    NonCanonicalCompactSize,
    #[error(transparent)]
    Io(std::io::Error),
}

impl From<std::io::Error> for TxError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => TxError::UnexpectedEof,
            _ => TxError::Io(err),
        }
    }
}

/// Umbrella error for callers that drive several stages at once.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Curve(#[from] CurveError),
    #[error(transparent)]
    Sign(#[from] SignError),
    #[error(transparent)]
    Der(#[from] DerError),
    #[error(transparent)]
    Taproot(#[from] TaprootError),
    #[error(transparent)]
    Sighash(#[from] SighashError),
    #[error(transparent)]
    Tx(#[from] TxError),
}
