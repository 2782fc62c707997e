use crate::raster::channels::CompactImage;

/// Resize with box (area) averaging. Upscaling degenerates to nearest-neighbor.
///
/// Target dimensions are clamped to at least one pixel.
pub fn resample_area(img: &CompactImage, width: u32, height: u32) -> CompactImage {
    let (sw, sh) = img.dimensions();
    let (width, height) = (width.max(1), height.max(1));
    if (sw, sh) == (width, height) {
        return img.clone();
    }

    let c = img.channels();
    let src = img.as_bytes();
    let mut out = Vec::with_capacity(width as usize * height as usize * c);
    let mut acc = vec![0u32; c];

    for y in 0..height {
        let (y0, y1) = span(y, height, sh);
        for x in 0..width {
            let (x0, x1) = span(x, width, sw);
            acc.fill(0);
            for sy in y0..y1 {
                let row = sy as usize * sw as usize;
                for sx in x0..x1 {
                    let i = (row + sx as usize) * c;
                    for (a, v) in acc.iter_mut().zip(&src[i..i + c]) {
                        *a += u32::from(*v);
                    }
                }
            }
            let n = (y1 - y0) * (x1 - x0);
            out.extend(acc.iter().map(|&a| ((a + n / 2) / n) as u8));
        }
    }

    CompactImage::from_parts(width, height, c, out)
}

/// Source interval `[lo, hi)` covered by destination index `i`; never empty.
fn span(i: u32, dst: u32, src: u32) -> (u32, u32) {
    let lo = (u64::from(i) * u64::from(src) / u64::from(dst)) as u32;
    let hi = (u64::from(i + 1) * u64::from(src) / u64::from(dst)) as u32;
    let lo = lo.min(src.saturating_sub(1));
    (lo, hi.max(lo + 1).min(src.max(1)))
}
