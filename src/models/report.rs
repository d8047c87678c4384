use quanthuff_codec::ArtifactSummary;
use serde::Serialize;

/// Outcome of compressing one image.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CompressReport {
    pub strategy: String,
    pub width: usize,
    pub height: usize,
    /// Uncompressed RGB size
    pub raw_bytes: usize,
    pub artifact_bytes: usize,
    pub palette_size: Option<usize>,
}

impl CompressReport {
    /// Raw size divided by artifact size.
    pub fn ratio(&self) -> f64 {
        if self.artifact_bytes == 0 {
            0.0
        } else {
            self.raw_bytes as f64 / self.artifact_bytes as f64
        }
    }
}

/// Outcome of decompressing one artifact.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DecompressReport {
    pub strategy: String,
    pub width: usize,
    pub height: usize,
    pub decoded_symbols: usize,
    pub expected_symbols: usize,
}

impl DecompressReport {
    pub fn is_complete(&self) -> bool {
        self.decoded_symbols == self.expected_symbols
    }
}

/// Serializable view of an artifact for `inspect`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InspectReport {
    pub strategy: String,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub alphabet_size: usize,
    pub average_code_length: f64,
    pub code_lengths: Vec<CodeLength>,
    pub expected_symbols: usize,
    pub tree_bytes: usize,
    pub bitstream_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette_size: Option<usize>,
    pub total_bytes: usize,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct CodeLength {
    pub symbol: u32,
    pub bits: usize,
}

impl From<ArtifactSummary> for InspectReport {
    fn from(summary: ArtifactSummary) -> Self {
        Self {
            strategy: summary.strategy.to_string(),
            width: summary.width,
            height: summary.height,
            channels: summary.channels,
            alphabet_size: summary.alphabet_size,
            average_code_length: summary.average_code_length,
            code_lengths: summary
                .code_lengths
                .into_iter()
                .map(|(symbol, bits)| CodeLength { symbol, bits })
                .collect(),
            expected_symbols: summary.expected_symbols,
            tree_bytes: summary.tree_bytes,
            bitstream_bytes: summary.bitstream_bytes,
            palette_size: summary.palette_size,
            total_bytes: summary.total_bytes,
        }
    }
}
