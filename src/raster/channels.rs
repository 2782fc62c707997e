use crate::foundation::error::{SynthError, SynthResult};

/// A decoded image, always expanded to RGBA8, tightly packed and row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl RawImage {
    /// Wrap an RGBA8 buffer. `rgba.len()` must equal `width * height * 4`.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> SynthResult<Self> {
        let expected = pixel_count(width, height)? * 4;
        if rgba.len() != expected {
            return Err(SynthError::validation(format!(
                "rgba buffer holds {} bytes, a {width}x{height} image needs {expected}",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA8 bytes.
    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Classify the image with a single scan over all pixels.
    pub fn channel_count(&self) -> ChannelCount {
        let mut grayscale = true;
        let mut transparent = false;
        for px in self.rgba.chunks_exact(4) {
            if !(px[0] == px[1] && px[1] == px[2]) {
                grayscale = false;
            }
            if px[3] < 255 {
                transparent = true;
            }
            if !grayscale && transparent {
                break;
            }
        }
        ChannelCount::from_flags(grayscale, transparent)
    }

    /// Repack into the minimal layout reported by [`RawImage::channel_count`].
    pub fn to_compact(&self) -> CompactImage {
        repack(self, self.channel_count())
    }
}

/// Minimal semantic channel layout of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelCount {
    /// Luma only.
    Gray = 1,
    /// Luma plus alpha.
    GrayAlpha = 2,
    /// RGB.
    Color = 3,
    /// RGB plus alpha.
    ColorAlpha = 4,
}

impl ChannelCount {
    /// `(grayscale ? 1 : 3) + (transparent ? 1 : 0)`.
    pub fn from_flags(grayscale: bool, transparent: bool) -> Self {
        match (grayscale, transparent) {
            (true, false) => Self::Gray,
            (true, true) => Self::GrayAlpha,
            (false, false) => Self::Color,
            (false, true) => Self::ColorAlpha,
        }
    }

    /// Map a plain channel count back to a layout.
    pub fn from_count(n: usize) -> Option<Self> {
        match n {
            1 => Some(Self::Gray),
            2 => Some(Self::GrayAlpha),
            3 => Some(Self::Color),
            4 => Some(Self::ColorAlpha),
            _ => None,
        }
    }

    /// Number of bytes per pixel.
    pub fn get(self) -> usize {
        self as usize
    }
}

/// An image with an arbitrary number of 8-bit channels per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompactImage {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<u8>,
}

impl CompactImage {
    /// Wrap a channel-interleaved buffer. `data.len()` must equal `width * height * channels`.
    pub fn new(width: u32, height: u32, channels: usize, data: Vec<u8>) -> SynthResult<Self> {
        if channels == 0 {
            return Err(SynthError::validation("an image needs at least one channel"));
        }
        let expected = pixel_count(width, height)? * channels;
        if data.len() != expected {
            return Err(SynthError::validation(format!(
                "buffer holds {} bytes, a {width}x{height}x{channels} image needs {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub(crate) fn from_parts(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * channels);
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// An image with every byte set to `value`.
    pub fn filled(width: u32, height: u32, channels: usize, value: u8) -> SynthResult<Self> {
        let len = pixel_count(width, height)? * channels;
        Self::new(width, height, channels, vec![value; len])
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes per pixel.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Channel-interleaved bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Per-byte complement (`255 - v`).
    pub fn inverted(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: self.data.iter().map(|&v| 255 - v).collect(),
        }
    }

    /// Expand back to RGBA8. Gray is replicated into R, G and B; missing alpha becomes opaque.
    pub fn to_raw(&self) -> SynthResult<RawImage> {
        let layout = ChannelCount::from_count(self.channels).ok_or_else(|| {
            SynthError::validation(format!(
                "cannot expand a {}-channel image to rgba",
                self.channels
            ))
        })?;
        let mut rgba = Vec::with_capacity(self.data.len() / self.channels * 4);
        for px in self.data.chunks_exact(self.channels) {
            let out = match layout {
                ChannelCount::Gray => [px[0], px[0], px[0], 255],
                ChannelCount::GrayAlpha => [px[0], px[0], px[0], px[1]],
                ChannelCount::Color => [px[0], px[1], px[2], 255],
                ChannelCount::ColorAlpha => [px[0], px[1], px[2], px[3]],
            };
            rgba.extend_from_slice(&out);
        }
        RawImage::new(self.width, self.height, rgba)
    }
}

/// Lossless re-indexing of RGBA pixels into `count` channels.
///
/// The two-channel layout keeps channel 0 and the **alpha** channel.
pub fn repack(raw: &RawImage, count: ChannelCount) -> CompactImage {
    let channels = count.get();
    let mut data = Vec::with_capacity(raw.rgba.len() / 4 * channels);
    for px in raw.rgba.chunks_exact(4) {
        match count {
            ChannelCount::Gray => data.push(px[0]),
            ChannelCount::GrayAlpha => data.extend_from_slice(&[px[0], px[3]]),
            ChannelCount::Color => data.extend_from_slice(&px[..3]),
            ChannelCount::ColorAlpha => data.extend_from_slice(px),
        }
    }
    CompactImage {
        width: raw.width,
        height: raw.height,
        channels,
        data,
    }
}

fn pixel_count(width: u32, height: u32) -> SynthResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| SynthError::validation(format!("image size {width}x{height} overflows")))
}

#[cfg(test)]
#[path = "../../tests/unit/raster/channels.rs"]
mod tests;
