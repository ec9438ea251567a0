/*
    Small byte helpers shared by the other modules.
*/

/**
    Byte-wise xor of two 32 byte arrays.
*/
pub fn xor_32(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
        *o = x ^ y;
    }
    out
}

/**
    Returns a reversed copy of a 32 byte hash. Txids are displayed in this
    order while they are hashed and serialized in the other.
*/
pub fn reversed(hash: &[u8; 32]) -> [u8; 32] {
    let mut out = *hash;
    out.reverse();
    out
}
