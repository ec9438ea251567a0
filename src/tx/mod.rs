/*
    The transaction model consumed by the sighash engine, with consensus
    serialization (BIP144 when witness data is present) and txid/wtxid.

    Decoding bounds every count and length before allocating, and byte
    buffers only grow as data arrives, so a length prefix larger than the
    input fails with UnexpectedEof instead of reserving memory.
*/
pub mod encode;
pub mod sighash;

use std::io::{self, Read, Write};

use log::trace;

use self::encode::{
    read_bytes, read_compact_size, read_compact_size_after, read_hash, read_u32, read_u64, read_u8,
    read_var_bytes, write_compact_size, write_var_bytes, Decodable, Encodable,
};
use crate::{error::TxError, hash::double_sha256};

pub use sighash::SighashType;

/// Maximum block size not counting witness data.
pub const BLOCK_MAX_SIZE: u64 = 1_000_000;
/// Outpoint, empty script length and sequence.
pub const INPUT_MIN_SIZE: u64 = 32 + 4 + 1 + 4;
/// Value and empty script length.
pub const OUTPUT_MIN_SIZE: u64 = 8 + 1;
pub const INPUTS_MAX_COUNT: u64 = BLOCK_MAX_SIZE / INPUT_MIN_SIZE;
pub const OUTPUTS_MAX_COUNT: u64 = BLOCK_MAX_SIZE / OUTPUT_MIN_SIZE;
/// Upper bound on the total size of one input's witness.
pub const WITNESS_MAX_SIZE: u64 = 0x2000_0000;
pub const WITNESS_MAX_ITEMS: u64 = 10_000;
const WITNESS_PREALLOC_ITEMS: u64 = 64;

const SEGWIT_MARKER: u8 = 0x00;
const SEGWIT_FLAG: u8 = 0x01;

/// Reference to an output of a previous transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutPoint {
    /// Txid in internal byte order (the reverse of how it is displayed).
    pub hash: [u8; 32],
    pub index: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Witness(pub Vec<Vec<u8>>);

impl Witness {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxIn {
    pub prev_out: OutPoint,
    pub script: Vec<u8>,
    pub sequence: u32,
    pub witness: Witness,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxOut {
    pub value: u64,
    pub script: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub locktime: u32,
}

impl Encodable for OutPoint {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<usize> {
        writer.write_all(&self.hash)?;
        writer.write_all(&self.index.to_le_bytes())?;
        Ok(36)
    }
}

impl Decodable for OutPoint {
    fn consensus_decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self, TxError> {
        Ok(OutPoint {
            hash: read_hash(reader)?,
            index: read_u32(reader)?,
        })
    }
}

/// The witness is not part of an input's own encoding; see `Transaction`.
impl Encodable for TxIn {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<usize> {
        let mut len = self.prev_out.consensus_encode(writer)?;
        len += write_var_bytes(writer, &self.script)?;
        writer.write_all(&self.sequence.to_le_bytes())?;
        Ok(len + 4)
    }
}

impl Decodable for TxIn {
    fn consensus_decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self, TxError> {
        Ok(TxIn {
            prev_out: OutPoint::consensus_decode(reader)?,
            script: read_var_bytes(reader, BLOCK_MAX_SIZE)?,
            sequence: read_u32(reader)?,
            witness: Witness::default(),
        })
    }
}

impl Encodable for TxOut {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<usize> {
        writer.write_all(&self.value.to_le_bytes())?;
        Ok(8 + write_var_bytes(writer, &self.script)?)
    }
}

impl Decodable for TxOut {
    fn consensus_decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self, TxError> {
        Ok(TxOut {
            value: read_u64(reader)?,
            script: read_var_bytes(reader, BLOCK_MAX_SIZE)?,
        })
    }
}

impl Encodable for Witness {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<usize> {
        let mut len = write_compact_size(writer, self.0.len() as u64)?;
        for item in &self.0 {
            len += write_var_bytes(writer, item)?;
        }
        Ok(len)
    }
}

impl Decodable for Witness {
    fn consensus_decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self, TxError> {
        let count = read_compact_size(reader)?;
        if count > WITNESS_MAX_ITEMS {
            return Err(TxError::WitnessTooLarge);
        }

        let mut total = 0u64;
        let mut items = Vec::with_capacity(count.min(WITNESS_PREALLOC_ITEMS) as usize);
        for _ in 0..count {
            let len = read_compact_size(reader)?;
            total = total.saturating_add(len);
            if total > WITNESS_MAX_SIZE {
                return Err(TxError::WitnessTooLarge);
            }
            items.push(read_bytes(reader, len as usize)?);
        }
        Ok(Witness(items))
    }
}

impl Transaction {
    /**
        True when any input carries witness data, in which case the default
        serialization uses the BIP144 marker and flag.
    */
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|input| !input.witness.is_empty())
    }

    /**
        Serializes the transaction, with or without witness data.
    */
    pub fn encode_with<W: Write + ?Sized>(&self, writer: &mut W, include_witness: bool) -> io::Result<usize> {
        let segwit = include_witness && self.has_witness();

        writer.write_all(&self.version.to_le_bytes())?;
        let mut len = 4;
        if segwit {
            writer.write_all(&[SEGWIT_MARKER, SEGWIT_FLAG])?;
            len += 2;
        }

        len += write_compact_size(writer, self.inputs.len() as u64)?;
        for input in &self.inputs {
            len += input.consensus_encode(writer)?;
        }
        len += write_compact_size(writer, self.outputs.len() as u64)?;
        for output in &self.outputs {
            len += output.consensus_encode(writer)?;
        }
        if segwit {
            for input in &self.inputs {
                len += input.witness.consensus_encode(writer)?;
            }
        }

        writer.write_all(&self.locktime.to_le_bytes())?;
        Ok(len + 4)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_size());
        // writes into a Vec cannot fail
        let _ = self.encode_with(&mut out, true);
        out
    }

    pub fn to_bytes_no_witness(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let _ = self.encode_with(&mut out, false);
        out
    }

    /**
        Decodes a complete transaction, refusing trailing bytes.
    */
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TxError> {
        let mut reader = bytes;
        let tx = Transaction::consensus_decode(&mut reader)?;
        if !reader.is_empty() {
            return Err(TxError::TrailingBytes(reader.len()));
        }
        Ok(tx)
    }

    /**
        Double SHA256 of the serialization without witness data, in internal
        byte order. Reverse it for display.
    */
    pub fn txid(&self) -> [u8; 32] {
        double_sha256(self.to_bytes_no_witness())
    }

    /// Like `txid` but over the witness serialization.
    pub fn wtxid(&self) -> [u8; 32] {
        double_sha256(self.to_bytes())
    }
}

impl Encodable for Transaction {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<usize> {
        self.encode_with(writer, true)
    }
}

impl Decodable for Transaction {
    fn consensus_decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self, TxError> {
        let version = read_u32(reader)? as i32;

        let first = read_u8(reader)?;
        let (segwit, input_count) = if first == SEGWIT_MARKER {
            let flag = read_u8(reader)?;
            if flag != SEGWIT_FLAG {
                return Err(TxError::InvalidSegwitFlag(flag));
            }
            (true, read_compact_size(reader)?)
        } else {
            (false, read_compact_size_after(first, reader)?)
        };

        if input_count > INPUTS_MAX_COUNT {
            return Err(TxError::TooManyInputs(input_count));
        }
        let mut inputs = Vec::with_capacity(input_count as usize);
        for _ in 0..input_count {
            inputs.push(TxIn::consensus_decode(reader)?);
        }

        let output_count = read_compact_size(reader)?;
        if output_count > OUTPUTS_MAX_COUNT {
            return Err(TxError::TooManyOutputs(output_count));
        }
        let mut outputs = Vec::with_capacity(output_count as usize);
        for _ in 0..output_count {
            outputs.push(TxOut::consensus_decode(reader)?);
        }

        if segwit {
            for input in inputs.iter_mut() {
                input.witness = Witness::consensus_decode(reader)?;
            }
        }

        let locktime = read_u32(reader)?;
        trace!(
            "decoded transaction: {} inputs, {} outputs, segwit {}",
            inputs.len(),
            outputs.len(),
            segwit
        );

        Ok(Transaction {
            version,
            inputs,
            outputs,
            locktime,
        })
    }
}
