//! Bit-level packing of prefix codes.
//!
//! Codes are concatenated into one logical bit sequence and packed eight
//! bits per byte, most significant bit first, with a zero-padded tail. No bit
//! count is stored alongside the bytes; decoders stop on a known symbol count.

mod reader;
mod writer;

pub use reader::BitReader;
pub use writer::{pack_codes, BitWriter};
