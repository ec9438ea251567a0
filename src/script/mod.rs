/*
    Just enough Bitcoin script handling for signature hashing: opcode
    constants, instruction boundaries and OP_CODESEPARATOR removal.
    Scripts are never executed here.
*/
pub mod builder;

pub use builder::{Opcode, ScriptBuilder};

/**
    Length of the instruction starting at `pos`, including push data, or None
    when a push runs past the end of the script.
*/
fn instruction_len(script: &[u8], pos: usize) -> Option<usize> {
    let op = script[pos];
    let (header, data): (usize, usize) = match op {
        0x01..=0x4b => (1, op as usize),
        0x4c => (2, *script.get(pos + 1)? as usize),
        0x4d => {
            let len = script.get(pos + 1..pos + 3)?;
            (3, u16::from_le_bytes([len[0], len[1]]) as usize)
        }
        0x4e => {
            let len = script.get(pos + 1..pos + 5)?;
            (5, u32::from_le_bytes([len[0], len[1], len[2], len[3]]) as usize)
        }
        _ => (1, 0),
    };
    let total = header.checked_add(data)?;
    if pos.checked_add(total)? > script.len() {
        return None;
    }
    Some(total)
}

/**
    Removes every occurrence of a non-push opcode from a script. Push
    instructions, including their data, are copied through byte for byte
    in their original encoding. If a push runs past the end of the script
    the remaining bytes are copied unchanged.
*/
pub fn strip_opcode(script: &[u8], opcode: Opcode) -> Vec<u8> {
    let target = opcode.into_u8();
    let mut out = Vec::with_capacity(script.len());
    let mut pos = 0;

    while pos < script.len() {
        let len = match instruction_len(script, pos) {
            Some(len) => len,
            None => {
                out.extend_from_slice(&script[pos..]);
                break;
            }
        };
        let op = script[pos];
        let is_push = op <= Opcode::OP_PUSHDATA4.into_u8();
        if is_push || op != target {
            out.extend_from_slice(&script[pos..pos + len]);
        }
        pos += len;
    }
    out
}

/**
    The BIP143 scriptCode for a P2WPKH output with the given key hash:
    OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG.
*/
pub fn p2pkh_script_code(pubkey_hash: &[u8; 20]) -> Vec<u8> {
    ScriptBuilder::new()
        .push_opcode(Opcode::OP_DUP)
        .push_opcode(Opcode::OP_HASH160)
        .push_slice(pubkey_hash)
        .push_opcode(Opcode::OP_EQUALVERIFY)
        .push_opcode(Opcode::OP_CHECKSIG)
        .into_bytes()
}
