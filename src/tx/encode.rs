/*
    Consensus serialization primitives: little-endian integers, compact size
    length prefixes and length-prefixed byte strings.

    Encoders write into any io::Write, which lets the sighash code stream
    straight into a hash engine.
*/
use std::io::{self, Read, Write};

use crate::error::TxError;

pub trait Encodable {
    /// Writes the consensus encoding and returns the number of bytes written.
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<usize>;

    fn serialized_size(&self) -> usize {
        let mut counter = ByteCounter(0);
        // counting never fails
        let _ = self.consensus_encode(&mut counter);
        counter.0
    }
}

pub trait Decodable: Sized {
    fn consensus_decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self, TxError>;
}

struct ByteCounter(usize);

impl Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/**
    Bitcoin's variable length integer:
        < 0xfd              1 byte
        <= 0xffff           0xfd + 2 bytes LE
        <= 0xffffffff       0xfe + 4 bytes LE
        otherwise           0xff + 8 bytes LE
*/
pub fn write_compact_size<W: Write + ?Sized>(writer: &mut W, n: u64) -> io::Result<usize> {
    match n {
        0..=0xfc => {
            writer.write_all(&[n as u8])?;
            Ok(1)
        }
        0xfd..=0xffff => {
            writer.write_all(&[0xfd])?;
            writer.write_all(&(n as u16).to_le_bytes())?;
            Ok(3)
        }
        0x1_0000..=0xffff_ffff => {
            writer.write_all(&[0xfe])?;
            writer.write_all(&(n as u32).to_le_bytes())?;
            Ok(5)
        }
        _ => {
            writer.write_all(&[0xff])?;
            writer.write_all(&n.to_le_bytes())?;
            Ok(9)
        }
    }
}

pub fn compact_size_len(n: u64) -> usize {
    match n {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

pub fn read_compact_size<R: Read + ?Sized>(reader: &mut R) -> Result<u64, TxError> {
    let first = read_u8(reader)?;
    read_compact_size_after(first, reader)
}

/**
    Finishes reading a compact size whose first byte was already consumed.
    Encodings that are longer than necessary are rejected.
*/
pub fn read_compact_size_after<R: Read + ?Sized>(first: u8, reader: &mut R) -> Result<u64, TxError> {
    let (value, min) = match first {
        0xfd => {
            let mut buf = [0u8; 2];
            reader.read_exact(&mut buf)?;
            (u16::from_le_bytes(buf) as u64, 0xfd)
        }
        0xfe => {
            let mut buf = [0u8; 4];
            reader.read_exact(&mut buf)?;
            (u32::from_le_bytes(buf) as u64, 0x1_0000)
        }
        0xff => {
            let mut buf = [0u8; 8];
            reader.read_exact(&mut buf)?;
            (u64::from_le_bytes(buf), 0x1_0000_0000)
        }
        n => return Ok(n as u64),
    };
    if value < min {
        return Err(TxError::NonCanonicalCompactSize);
    }
    Ok(value)
}

/// Compact size length followed by the bytes themselves.
pub fn write_var_bytes<W: Write + ?Sized>(writer: &mut W, bytes: &[u8]) -> io::Result<usize> {
    let len = write_compact_size(writer, bytes.len() as u64)?;
    writer.write_all(bytes)?;
    Ok(len + bytes.len())
}

/**
    Reads a length-prefixed byte string, refusing lengths above `max`
    before allocating anything.
*/
pub fn read_var_bytes<R: Read + ?Sized>(reader: &mut R, max: u64) -> Result<Vec<u8>, TxError> {
    let len = read_compact_size(reader)?;
    if len > max {
        return Err(TxError::ScriptTooLarge(len));
    }
    read_bytes(reader, len as usize)
}

/// Reads exactly `len` bytes. The buffer grows with the data actually read,
/// so a length prefix larger than the input allocates nothing up front.
pub fn read_bytes<R: Read + ?Sized>(reader: &mut R, len: usize) -> Result<Vec<u8>, TxError> {
    let mut out = Vec::new();
    (&mut *reader).take(len as u64).read_to_end(&mut out)?;
    if out.len() != len {
        return Err(TxError::UnexpectedEof);
    }
    Ok(out)
}

pub fn read_u8<R: Read + ?Sized>(reader: &mut R) -> Result<u8, TxError> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_u32<R: Read + ?Sized>(reader: &mut R) -> Result<u32, TxError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub fn read_u64<R: Read + ?Sized>(reader: &mut R) -> Result<u64, TxError> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

pub fn read_hash<R: Read + ?Sized>(reader: &mut R) -> Result<[u8; 32], TxError> {
    let mut buf = [0u8; 32];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(n: u64) -> Vec<u8> {
        let mut out = Vec::new();
        let written = write_compact_size(&mut out, n).unwrap();
        assert_eq!(written, out.len());
        assert_eq!(compact_size_len(n), out.len());
        out
    }

    #[test]
    fn compact_size_boundaries() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(0xfc), vec![0xfc]);
        assert_eq!(encode(0xfd), vec![0xfd, 0xfd, 0x00]);
        assert_eq!(encode(0xffff), vec![0xfd, 0xff, 0xff]);
        assert_eq!(encode(0x1_0000), vec![0xfe, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(encode(0x1_0000_0000), vec![0xff, 0, 0, 0, 0, 1, 0, 0, 0]);

        for n in [0u64, 0xfc, 0xfd, 0xffff, 0x1_0000, 0xffff_ffff, 0x1_0000_0000, u64::MAX] {
            assert_eq!(read_compact_size(&mut encode(n).as_slice()).unwrap(), n);
        }
    }

    #[test]
    fn rejects_non_canonical_compact_sizes() {
        let cases: [&[u8]; 3] = [
            &[0xfd, 0xfc, 0x00],
            &[0xfe, 0xff, 0xff, 0x00, 0x00],
            &[0xff, 0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0],
        ];
        for case in cases.iter() {
            let mut reader = *case;
            assert!(matches!(
                read_compact_size(&mut reader),
                Err(TxError::NonCanonicalCompactSize)
            ));
        }
    }

    #[test]
    fn truncated_input_is_eof() {
        let mut reader: &[u8] = &[0xfd, 0x01];
        assert!(matches!(read_compact_size(&mut reader), Err(TxError::UnexpectedEof)));

        let mut reader: &[u8] = &[0x05, 0x01, 0x02];
        assert!(matches!(read_var_bytes(&mut reader, 100), Err(TxError::UnexpectedEof)));
    }

    #[test]
    fn var_bytes_limits() {
        let mut encoded = Vec::new();
        write_var_bytes(&mut encoded, &[0xab; 10]).unwrap();
        assert_eq!(encoded.len(), 11);
        assert_eq!(read_var_bytes(&mut encoded.as_slice(), 10).unwrap(), vec![0xab; 10]);
        assert!(matches!(
            read_var_bytes(&mut encoded.as_slice(), 9),
            Err(TxError::ScriptTooLarge(10))
        ));
    }
}
