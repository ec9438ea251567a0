/*
    Opcodes and a small script builder.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    code: u8,
}

impl Opcode {
    pub fn into_u8(self) -> u8 {
        self.code
    }
}

impl From<u8> for Opcode {
    fn from(code: u8) -> Self {
        Self { code }
    }
}

impl Opcode {
    pub const OP_0: Opcode = Opcode { code: 0x00 };
    /// The next byte is the length of the data to push.
    pub const OP_PUSHDATA1: Opcode = Opcode { code: 0x4c };
    /// The next two bytes, little-endian, are the push length.
    pub const OP_PUSHDATA2: Opcode = Opcode { code: 0x4d };
    /// The next four bytes, little-endian, are the push length.
    pub const OP_PUSHDATA4: Opcode = Opcode { code: 0x4e };
    pub const OP_1: Opcode = Opcode { code: 0x51 };
    pub const OP_DUP: Opcode = Opcode { code: 0x76 };
    pub const OP_EQUAL: Opcode = Opcode { code: 0x87 };
    pub const OP_EQUALVERIFY: Opcode = Opcode { code: 0x88 };
    pub const OP_HASH160: Opcode = Opcode { code: 0xa9 };
    pub const OP_CODESEPARATOR: Opcode = Opcode { code: 0xab };
    pub const OP_CHECKSIG: Opcode = Opcode { code: 0xac };
    pub const OP_CHECKMULTISIG: Opcode = Opcode { code: 0xae };
}

#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_opcode(mut self, opcode: Opcode) -> Self {
        self.script.push(opcode.into_u8());
        self
    }

    /**
        Pushes data with the shortest push opcode for its length.
    */
    pub fn push_slice(mut self, slice: &[u8]) -> Self {
        self.script.extend(push_data(slice));
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.script
    }
}

/**
    Encodes a data push: a direct length byte up to 75 bytes, then
    OP_PUSHDATA1, OP_PUSHDATA2 or OP_PUSHDATA4 as the length requires.
*/
pub fn push_data(data: &[u8]) -> Vec<u8> {
    let len = data.len();
    let mut out = Vec::with_capacity(len + 5);
    if len <= 0x4b {
        out.push(len as u8);
    } else if len <= 0xff {
        out.push(Opcode::OP_PUSHDATA1.into_u8());
        out.push(len as u8);
    } else if len <= 0xffff {
        out.push(Opcode::OP_PUSHDATA2.into_u8());
        out.extend_from_slice(&(len as u16).to_le_bytes());
    } else {
        out.push(Opcode::OP_PUSHDATA4.into_u8());
        out.extend_from_slice(&(len as u32).to_le_bytes());
    }
    out.extend_from_slice(data);
    out
}
