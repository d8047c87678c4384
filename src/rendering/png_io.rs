//! PNG ↔ [`PixelVolume`] conversion.

use quanthuff_codec::PixelVolume;
use std::io::{BufRead, Seek, Write};

use crate::error::AppError;

/// Decode a PNG into a three-channel RGB volume.
///
/// Palette and low bit-depth images are expanded, 16-bit samples are
/// stripped to 8 bits, alpha is dropped and grayscale is replicated into
/// all three channels.
pub fn read_png<R: BufRead + Seek>(reader: R) -> Result<PixelVolume, AppError> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let (width, height) = (info.width as usize, info.height as usize);

    let samples = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        png::ColorType::Indexed => {
            return Err(AppError::UnsupportedImage(
                "indexed PNG was not expanded".to_string(),
            ))
        }
    };
    if info.bit_depth != png::BitDepth::Eight {
        return Err(AppError::UnsupportedImage(format!(
            "{:?} bit depth after expansion",
            info.bit_depth
        )));
    }

    let mut rgb = Vec::with_capacity(width * height * 3);
    for row in buf.chunks(info.line_size).take(height) {
        for pixel in row[..width * samples].chunks_exact(samples) {
            match samples {
                1 | 2 => rgb.extend_from_slice(&[pixel[0]; 3]),
                _ => rgb.extend_from_slice(&pixel[..3]),
            }
        }
    }

    tracing::debug!(width, height, ?info.color_type, "Decoded PNG");
    Ok(PixelVolume::from_interleaved(width, height, 3, &rgb)?)
}

/// Encode a volume as an 8-bit RGB PNG.
///
/// Volumes with fewer than three channels are written as gray; extra
/// channels beyond the third are ignored.
pub fn write_png<W: Write>(volume: &PixelVolume, writer: W) -> Result<(), AppError> {
    let width = u32::try_from(volume.width())
        .map_err(|_| AppError::UnsupportedImage(format!("width {}", volume.width())))?;
    let height = u32::try_from(volume.height())
        .map_err(|_| AppError::UnsupportedImage(format!("height {}", volume.height())))?;
    if width == 0 || height == 0 || volume.channels() == 0 {
        return Err(AppError::UnsupportedImage(format!(
            "cannot write empty {}x{}x{} image",
            width,
            height,
            volume.channels()
        )));
    }

    let mut data = Vec::with_capacity(volume.pixel_count() * 3);
    for y in 0..volume.height() {
        for x in 0..volume.width() {
            let pixel = volume.pixel(x, y);
            if pixel.len() >= 3 {
                data.extend_from_slice(&pixel[..3]);
            } else {
                data.extend_from_slice(&[pixel[0]; 3]);
            }
        }
    }

    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&data)?;
    writer.finish()?;
    Ok(())
}
