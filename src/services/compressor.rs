use quanthuff_codec::{Artifact, Codec, CodecError};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::AppError;
use crate::models::{CodecConfig, CompressReport, DecompressReport, InspectReport};
use crate::rendering::{read_png, write_png};

/// File-level compress / decompress / inspect operations.
///
/// Every file handle is opened and released inside one call; writers are
/// flushed before returning.
pub struct CompressionService {
    codec: Codec,
}

impl CompressionService {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            codec: config.codec(),
        }
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Compress a PNG file into an artifact file.
    ///
    /// The output file is only created once the artifact has been built, so
    /// a rejected configuration leaves no file behind.
    pub fn compress_file(&self, input: &Path, output: &Path) -> Result<CompressReport, AppError> {
        let volume = read_png(BufReader::new(File::open(input)?))?;
        let artifact = self.codec.compress(&volume)?;

        let mut writer = BufWriter::new(File::create(output)?);
        artifact.write_to(&mut writer)?;
        writer.flush()?;

        let summary = artifact.summary();
        let report = CompressReport {
            strategy: self.codec.strategy().to_string(),
            width: volume.width(),
            height: volume.height(),
            raw_bytes: volume.samples().len(),
            artifact_bytes: summary.total_bytes,
            palette_size: summary.palette_size,
        };
        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            strategy = %report.strategy,
            width = report.width,
            height = report.height,
            raw_bytes = report.raw_bytes,
            artifact_bytes = report.artifact_bytes,
            ratio = report.ratio(),
            "Compressed image"
        );
        Ok(report)
    }

    /// Decompress an artifact file into a PNG.
    ///
    /// With `strict`, an artifact whose bitstream ends early is an error;
    /// otherwise the partial image is written and the report says so.
    pub fn decompress_file(
        input: &Path,
        output: &Path,
        strict: bool,
    ) -> Result<DecompressReport, AppError> {
        let artifact = read_artifact(input)?;
        let decoded = Codec::decompress(&artifact)?;

        let report = DecompressReport {
            strategy: artifact.strategy().to_string(),
            width: decoded.volume.width(),
            height: decoded.volume.height(),
            decoded_symbols: decoded.decoded_symbols,
            expected_symbols: decoded.expected_symbols,
        };
        let volume = if strict {
            decoded.into_complete()?
        } else {
            decoded.volume
        };

        let mut writer = BufWriter::new(File::create(output)?);
        write_png(&volume, &mut writer)?;
        writer.flush()?;

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            width = report.width,
            height = report.height,
            complete = report.is_complete(),
            "Decompressed artifact"
        );
        Ok(report)
    }

    /// Describe an artifact file without decoding its pixels.
    pub fn inspect_file(input: &Path) -> Result<InspectReport, AppError> {
        let artifact = read_artifact(input)?;
        Ok(artifact.summary().into())
    }
}

/// Read exactly one artifact from `path`; trailing bytes are an error.
fn read_artifact(path: &Path) -> Result<Artifact, AppError> {
    let mut reader = BufReader::new(File::open(path)?);
    let artifact = Artifact::read_from(&mut reader)?;
    if !reader.fill_buf()?.is_empty() {
        return Err(CodecError::MalformedArtifact("trailing bytes after artifact".to_string()).into());
    }
    Ok(artifact)
}
