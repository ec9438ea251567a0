/*
    Signature hashes: the digests that ECDSA and Schnorr signatures commit to.

    Legacy (pre-segwit) hashing copies the transaction, edits the copy as
    the sighash type requires and hashes its serialization. BIP143 hashing
    for segwit v0 commits to precomputed hashes of the prevouts, sequences
    and outputs plus the value being spent.

    Neither algorithm touches the caller's transaction.
*/
use std::io::Write;

use log::debug;

use super::{encode::write_var_bytes, encode::Encodable, Transaction, TxOut};
use crate::{
    error::SighashError,
    hash::DoubleSha256,
    script::{strip_opcode, Opcode},
};

/**
    The digest returned by legacy hashing for an input index that does not
    exist, or for SIGHASH_SINGLE without a matching output: 31 zero bytes
    followed by 0x01. Signing it is valid under consensus rules, so it has
    to be reproduced exactly.
*/
pub const SIGHASH_ONE: [u8; 32] = {
    let mut one = [0u8; 32];
    one[31] = 1;
    one
};

const BASE_TYPE_MASK: u32 = 0x1f;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SighashType(pub u32);

impl SighashType {
    pub const ALL: SighashType = SighashType(0x01);
    pub const NONE: SighashType = SighashType(0x02);
    pub const SINGLE: SighashType = SighashType(0x03);
    pub const ANYONECANPAY: u32 = 0x80;
    pub const ALL_ANYONECANPAY: SighashType = SighashType(0x81);
    pub const NONE_ANYONECANPAY: SighashType = SighashType(0x82);
    pub const SINGLE_ANYONECANPAY: SighashType = SighashType(0x83);

    pub fn to_u32(self) -> u32 {
        self.0
    }

    /// Low five bits. Anything other than NONE or SINGLE hashes like ALL.
    pub fn base_type(self) -> u32 {
        self.0 & BASE_TYPE_MASK
    }

    pub fn is_none(self) -> bool {
        self.base_type() == Self::NONE.0
    }

    pub fn is_single(self) -> bool {
        self.base_type() == Self::SINGLE.0
    }

    pub fn anyone_can_pay(self) -> bool {
        self.0 & Self::ANYONECANPAY != 0
    }
}

impl From<u32> for SighashType {
    fn from(value: u32) -> Self {
        SighashType(value)
    }
}

impl Transaction {
    /**
        Legacy signature hash for input `input_index` spending an output
        locked by `prev_out_script`.

        Out of range indexes, and SIGHASH_SINGLE for an input without a
        matching output, return `SIGHASH_ONE` instead of failing.
    */
    pub fn signature_hash(&self, input_index: usize, prev_out_script: &[u8], sighash_type: SighashType) -> [u8; 32] {
        if input_index >= self.inputs.len() {
            debug!(
                "legacy sighash: input {} out of range ({} inputs), using SIGHASH_ONE",
                input_index,
                self.inputs.len()
            );
            return SIGHASH_ONE;
        }
        if sighash_type.is_single() && input_index >= self.outputs.len() {
            debug!(
                "legacy sighash: SIGHASH_SINGLE for input {} without matching output, using SIGHASH_ONE",
                input_index
            );
            return SIGHASH_ONE;
        }

        let mut tx = self.clone();
        for input in tx.inputs.iter_mut() {
            input.script.clear();
        }
        tx.inputs[input_index].script = strip_opcode(prev_out_script, Opcode::OP_CODESEPARATOR);

        if sighash_type.anyone_can_pay() {
            tx.inputs = vec![tx.inputs.swap_remove(input_index)];
        } else if sighash_type.is_none() || sighash_type.is_single() {
            for (i, input) in tx.inputs.iter_mut().enumerate() {
                if i != input_index {
                    input.sequence = 0;
                }
            }
        }

        if sighash_type.is_none() {
            tx.outputs.clear();
        } else if sighash_type.is_single() {
            tx.outputs.truncate(input_index + 1);
            for output in tx.outputs[..input_index].iter_mut() {
                *output = TxOut {
                    value: u64::MAX,
                    script: Vec::new(),
                };
            }
        }

        let mut engine = DoubleSha256::new();
        tx.encode_with(&mut engine, false).expect("hash engine writes are infallible");
        engine
            .write_all(&sighash_type.0.to_le_bytes())
            .expect("hash engine writes are infallible");
        engine.finalize()
    }

    /**
        BIP143 signature hash for a segwit v0 input spending `value` satoshis.
        `script_code` is the script being satisfied: the P2PKH-style script for
        P2WPKH, or the witness script for P2WSH.
    */
    pub fn witness_signature_hash(
        &self,
        input_index: usize,
        script_code: &[u8],
        sighash_type: SighashType,
        value: u64,
    ) -> Result<[u8; 32], SighashError> {
        let input = self.inputs.get(input_index).ok_or(SighashError::InputOutOfRange {
            index: input_index,
            inputs: self.inputs.len(),
        })?;

        let anyone_can_pay = sighash_type.anyone_can_pay();
        let none = sighash_type.is_none();
        let single = sighash_type.is_single();

        let hash_prevouts = if anyone_can_pay { [0u8; 32] } else { self.hash_prevouts() };
        let hash_sequence = if anyone_can_pay || none || single {
            [0u8; 32]
        } else {
            self.hash_sequence()
        };
        let hash_outputs = if !none && !single {
            self.hash_outputs()
        } else if single && input_index < self.outputs.len() {
            let mut engine = DoubleSha256::new();
            self.outputs[input_index]
                .consensus_encode(&mut engine)
                .expect("hash engine writes are infallible");
            engine.finalize()
        } else {
            if single {
                debug!("witness sighash: SIGHASH_SINGLE for input {} without matching output", input_index);
            }
            [0u8; 32]
        };

        let mut engine = DoubleSha256::new();
        let write = |engine: &mut DoubleSha256| -> std::io::Result<()> {
            engine.write_all(&self.version.to_le_bytes())?;
            engine.write_all(&hash_prevouts)?;
            engine.write_all(&hash_sequence)?;
            input.prev_out.consensus_encode(engine)?;
            write_var_bytes(engine, script_code)?;
            engine.write_all(&value.to_le_bytes())?;
            engine.write_all(&input.sequence.to_le_bytes())?;
            engine.write_all(&hash_outputs)?;
            engine.write_all(&self.locktime.to_le_bytes())?;
            engine.write_all(&sighash_type.0.to_le_bytes())
        };
        write(&mut engine).expect("hash engine writes are infallible");
        Ok(engine.finalize())
    }

    /// BIP143 hashPrevouts: double SHA256 of every input's outpoint.
    pub fn hash_prevouts(&self) -> [u8; 32] {
        let mut engine = DoubleSha256::new();
        for input in &self.inputs {
            input
                .prev_out
                .consensus_encode(&mut engine)
                .expect("hash engine writes are infallible");
        }
        engine.finalize()
    }

    /// BIP143 hashSequence: double SHA256 of every input's sequence number.
    pub fn hash_sequence(&self) -> [u8; 32] {
        let mut engine = DoubleSha256::new();
        for input in &self.inputs {
            engine
                .write_all(&input.sequence.to_le_bytes())
                .expect("hash engine writes are infallible");
        }
        engine.finalize()
    }

    /// BIP143 hashOutputs: double SHA256 of every serialized output.
    pub fn hash_outputs(&self) -> [u8; 32] {
        let mut engine = DoubleSha256::new();
        for output in &self.outputs {
            output
                .consensus_encode(&mut engine)
                .expect("hash engine writes are infallible");
        }
        engine.finalize()
    }
}
