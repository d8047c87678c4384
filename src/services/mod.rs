pub mod compressor;

pub use compressor::CompressionService;
