//! Big-endian primitive framing over `std::io`.

use std::io::{ErrorKind, Read, Write};

use crate::error::{CodecError, Result};

pub(crate) struct WireWriter<W: Write> {
    inner: W,
}

impl<W: Write> WireWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self { inner }
    }

    pub(crate) fn put_u8(&mut self, value: u8) -> Result<()> {
        self.inner.write_all(&[value])?;
        Ok(())
    }

    pub(crate) fn put_u32(&mut self, value: u32) -> Result<()> {
        self.inner.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    pub(crate) fn put_i32(&mut self, value: i32) -> Result<()> {
        self.inner.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    pub(crate) fn put_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        Ok(())
    }

    /// Length-prefixed byte block.
    pub(crate) fn put_block(&mut self, bytes: &[u8], what: &str) -> Result<()> {
        let len = u32::try_from(bytes.len())
            .map_err(|_| CodecError::malformed(format!("{what} longer than u32::MAX bytes")))?;
        self.put_u32(len)?;
        self.put_raw(bytes)
    }
}

/// Reader side. Every short read becomes [`CodecError::MalformedArtifact`]
/// naming the field that was cut off.
pub(crate) struct WireReader<R: Read> {
    inner: R,
    consumed: u64,
}

impl<R: Read> WireReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner, consumed: 0 }
    }

    pub(crate) fn consumed(&self) -> u64 {
        self.consumed
    }

    fn fill(&mut self, buf: &mut [u8], what: &str) -> Result<()> {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.consumed += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(CodecError::malformed(format!(
                "unexpected end of artifact while reading {what}"
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn u8(&mut self, what: &str) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf, what)?;
        Ok(buf[0])
    }

    pub(crate) fn u32(&mut self, what: &str) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf, what)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub(crate) fn i32(&mut self, what: &str) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf, what)?;
        Ok(i32::from_be_bytes(buf))
    }

    pub(crate) fn array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.fill(&mut buf, what)?;
        Ok(buf)
    }

    /// Read exactly `len` bytes without trusting `len` for the allocation.
    pub(crate) fn bytes(&mut self, len: usize, what: &str) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let read = self.inner.by_ref().take(len as u64).read_to_end(&mut buf)?;
        self.consumed += read as u64;
        if read != len {
            return Err(CodecError::malformed(format!(
                "{what} declares {len} bytes but only {read} remain"
            )));
        }
        Ok(buf)
    }

    /// Length-prefixed byte block.
    pub(crate) fn block(&mut self, what: &str) -> Result<Vec<u8>> {
        let len = self.u32(what)? as usize;
        self.bytes(len, what)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_layout() {
        let mut out = Vec::new();
        let mut writer = WireWriter::new(&mut out);
        writer.put_u32(0x0102_0304).unwrap();
        writer.put_i32(-1).unwrap();
        writer.put_block(b"ab", "test").unwrap();
        assert_eq!(
            out,
            vec![1, 2, 3, 4, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 2, b'a', b'b']
        );
    }

    #[test]
    fn test_reader_tracks_consumed() {
        let data = [0u8, 0, 0, 2, 9, 8, 7];
        let mut reader = WireReader::new(&data[..]);
        assert_eq!(reader.block("block").unwrap(), vec![9, 8]);
        assert_eq!(reader.consumed(), 6);
        assert_eq!(reader.u8("tail").unwrap(), 7);
    }

    #[test]
    fn test_short_read_is_malformed() {
        let mut reader = WireReader::new(&[0u8, 1][..]);
        let err = reader.u32("width").unwrap_err();
        assert!(matches!(err, CodecError::MalformedArtifact(ref m) if m.contains("width")));
    }

    #[test]
    fn test_oversized_block_length_is_malformed() {
        // Declares 4 GiB of payload; only one byte follows.
        let data = [0xFFu8, 0xFF, 0xFF, 0xFF, 0x00];
        let mut reader = WireReader::new(&data[..]);
        assert!(matches!(
            reader.block("bitstream"),
            Err(CodecError::MalformedArtifact(_))
        ));
    }
}
