/*
    Hash functions used across signing and transaction digests.

    Tagged hashes are the BIP340 construction
        SHA256(SHA256(tag) || SHA256(tag) || data)
    and get a unit type per tag through the `tagged_hashes!` macro.
*/
use std::io;

use sha2::{Digest, Sha256};

/*
    Takes in a byte array and returns the sha256 hash of it
*/
pub fn sha256<T>(input: T) -> [u8; 32]
where
    T: AsRef<[u8]>,
{
    Sha256::digest(input).into()
}

/*
    SHA256(SHA256(input)), used for txids and signature hashes
*/
pub fn double_sha256<T>(input: T) -> [u8; 32]
where
    T: AsRef<[u8]>,
{
    sha256(sha256(input))
}

/**
    Hashes the concatenation of `chunks` under the given tag.
*/
pub fn tagged_hash(tag: &str, chunks: &[&[u8]]) -> [u8; 32] {
    let tag_hash = sha256(tag.as_bytes());
    let mut engine = Sha256::new();
    engine.update(tag_hash);
    engine.update(tag_hash);
    for chunk in chunks {
        engine.update(chunk);
    }
    engine.finalize().into()
}

pub trait TaggedHash {
    const TAG: &'static str;

    fn hash(chunks: &[&[u8]]) -> [u8; 32] {
        tagged_hash(Self::TAG, chunks)
    }
}

/// Creates a unit type implementing `TaggedHash` for a tag.
macro_rules! tagged_hashes {
    ($name: ident, $tag: expr) => {
        pub struct $name;

        impl $crate::hash::TaggedHash for $name {
            const TAG: &'static str = $tag;
        }
    };
}
pub(crate) use tagged_hashes;

/**
    Streaming double SHA256. Serializers write into it through `io::Write`
    so digests never need a separate preimage buffer.
*/
#[derive(Clone, Default)]
pub struct DoubleSha256 {
    engine: Sha256,
}

impl DoubleSha256 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finalize(self) -> [u8; 32] {
        sha256(self.engine.finalize())
    }
}

impl io::Write for DoubleSha256 {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.engine.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sha256_known_values() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hex::encode(sha256(b"Satoshi Nakamoto")),
            "a0dc65ffca799873cbea0ac274015b9526505daaaed385155425f7337704883e"
        );
        assert_eq!(
            hex::encode(double_sha256(b"hello")),
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        );
    }

    #[test]
    fn streaming_engine_matches_one_shot() {
        let mut engine = DoubleSha256::new();
        engine.write_all(b"hel").unwrap();
        engine.write_all(b"lo").unwrap();
        assert_eq!(engine.finalize(), double_sha256(b"hello"));
    }

    #[test]
    fn tagged_hash_chunks_are_concatenated() {
        tagged_hashes!(TestTag, "TestTag");
        let joined = tagged_hash("TestTag", &[&b"abcdef"[..]]);
        assert_eq!(TestTag::hash(&[&b"abc"[..], &b"def"[..]]), joined);
        assert_ne!(tagged_hash("OtherTag", &[&b"abcdef"[..]]), joined);

        let tag = sha256(b"TestTag");
        let mut preimage = tag.to_vec();
        preimage.extend_from_slice(&tag);
        preimage.extend_from_slice(b"abcdef");
        assert_eq!(joined, sha256(preimage));
    }
}
