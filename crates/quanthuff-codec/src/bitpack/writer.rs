//! MSB-first bit accumulation.

/// Packs bits into bytes, most significant bit first.
///
/// The last byte is zero-padded in its low-order bits when the bit count is
/// not a multiple of eight.
///
/// # Example
///
/// ```
/// use quanthuff_codec::bitpack::BitWriter;
///
/// let mut writer = BitWriter::new();
/// writer.write_bits(0b101, 3);
/// writer.write_bit(true);
/// assert_eq!(writer.bit_len(), 4);
/// assert_eq!(writer.finish(), vec![0b1011_0000]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    bytes: Vec<u8>,
    current: u8,
    filled: u8,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        self.current = (self.current << 1) | bit as u8;
        self.filled += 1;
        self.bit_len += 1;
        if self.filled == 8 {
            self.bytes.push(self.current);
            self.current = 0;
            self.filled = 0;
        }
    }

    /// Write the low `count` bits of `value`, high bit first.
    pub fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 32);
        for shift in (0..count).rev() {
            self.write_bit((value >> shift) & 1 == 1);
        }
    }

    /// Append one prefix code.
    #[inline]
    pub fn write_code(&mut self, code: &[bool]) {
        for &bit in code {
            self.write_bit(bit);
        }
    }

    /// Bits written so far, padding excluded.
    #[inline]
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Flush the partial byte (zero-padded) and return the buffer.
    pub fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.bytes.push(self.current << (8 - self.filled));
        }
        self.bytes
    }
}

/// Concatenate a sequence of codes into a packed byte array.
pub fn pack_codes<'a, I>(codes: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a [bool]>,
{
    let mut writer = BitWriter::new();
    for code in codes {
        writer.write_code(code);
    }
    writer.finish()
}
