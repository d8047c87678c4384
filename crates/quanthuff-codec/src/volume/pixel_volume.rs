//! Owned `[x][y][channel]` pixel storage.

use crate::error::{CodecError, Result};

/// A width × height × channels volume of 8-bit samples.
///
/// Samples are addressed `[x][y][channel]` and stored column-major: all of
/// column `x = 0` first, then `x = 1`, and so on. This is also the order in
/// which the encoder walks the volume, so iterating [`PixelVolume::samples`]
/// visits pixels exactly as they are entropy coded.
///
/// # Example
///
/// ```
/// use quanthuff_codec::PixelVolume;
///
/// let mut volume = PixelVolume::new(2, 3, 3);
/// volume.set_pixel(1, 2, &[10, 20, 30]);
///
/// assert_eq!(volume.pixel(1, 2), &[10, 20, 30]);
/// assert_eq!(volume.get(1, 2, 1), 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelVolume {
    width: usize,
    height: usize,
    channels: usize,
    samples: Vec<u8>,
}

impl PixelVolume {
    /// Allocate a zero-filled volume.
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            samples: vec![0; width * height * channels],
        }
    }

    /// Wrap samples that are already in `[x][y][channel]` order.
    pub fn from_samples(
        width: usize,
        height: usize,
        channels: usize,
        samples: Vec<u8>,
    ) -> Result<Self> {
        check_shape(width, height, channels, samples.len())?;
        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// Build a volume from row-major interleaved samples (`[y][x][channel]`),
    /// the layout image decoders hand out.
    pub fn from_interleaved(
        width: usize,
        height: usize,
        channels: usize,
        interleaved: &[u8],
    ) -> Result<Self> {
        check_shape(width, height, channels, interleaved.len())?;
        let mut volume = Self::new(width, height, channels);
        for (row_index, row) in interleaved
            .chunks_exact((width * channels).max(1))
            .take(height)
            .enumerate()
        {
            for (x, pixel) in row.chunks_exact(channels).enumerate() {
                volume.set_pixel(x, row_index, pixel);
            }
        }
        Ok(volume)
    }

    /// Row-major interleaved copy of the samples (`[y][x][channel]`).
    pub fn to_interleaved(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.samples.len());
        for y in 0..self.height {
            for x in 0..self.width {
                out.extend_from_slice(self.pixel(x, y));
            }
        }
        out
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of pixels (`width * height`).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// All samples in `[x][y][channel]` order.
    #[inline]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (x * self.height + y) * self.channels
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, channel: usize) -> u8 {
        self.samples[self.offset(x, y) + channel]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, channel: usize, value: u8) {
        let offset = self.offset(x, y);
        self.samples[offset + channel] = value;
    }

    /// All channels of one pixel.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let offset = self.offset(x, y);
        &self.samples[offset..offset + self.channels]
    }

    /// Overwrite the leading channels of one pixel with `values`.
    ///
    /// Extra values beyond the channel depth are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, values: &[u8]) {
        let offset = self.offset(x, y);
        let n = values.len().min(self.channels);
        self.samples[offset..offset + n].copy_from_slice(&values[..n]);
    }

    /// Red, green and blue of a pixel with at least three channels.
    #[inline]
    pub(crate) fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        let offset = self.offset(x, y);
        [
            self.samples[offset],
            self.samples[offset + 1],
            self.samples[offset + 2],
        ]
    }
}

fn check_shape(width: usize, height: usize, channels: usize, len: usize) -> Result<()> {
    let invalid = |reason| CodecError::InvalidVolume {
        width,
        height,
        channels,
        reason,
    };
    if channels == 0 {
        return Err(invalid("a volume needs at least one channel"));
    }
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or_else(|| invalid("dimensions overflow"))?;
    if expected != len {
        return Err(invalid("sample count does not match dimensions"));
    }
    Ok(())
}
