use crate::foundation::rng::Rng64;

/// Nearest-neighbor field: for every target pixel, the center of its matched source patch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nnf {
    width: u32,
    height: u32,
    field: Vec<[i32; 2]>,
}

impl Nnf {
    pub(crate) fn from_field(width: u32, height: u32, field: Vec<[i32; 2]>) -> Self {
        debug_assert_eq!(field.len(), width as usize * height as usize);
        Self {
            width,
            height,
            field,
        }
    }

    /// Target width covered by the field.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Target height covered by the field.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `[x, y]` source coordinates, row-major over the target.
    pub fn as_slice(&self) -> &[[i32; 2]] {
        &self.field
    }

    /// Source match for the target pixel `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> [i32; 2] {
        self.field[y as usize * self.width as usize + x as usize]
    }

    /// Uniformly random matches inside `bounds`.
    pub(crate) fn random(width: u32, height: u32, bounds: CenterBounds, seed: u64) -> Self {
        let mut field = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let mut rng = Rng64::for_pixel(seed, 0, x, y);
                field.push([
                    rng.range_i32(bounds.x0, bounds.x1),
                    rng.range_i32(bounds.y0, bounds.y1),
                ]);
            }
        }
        Self::from_field(width, height, field)
    }

    /// Carry a coarser field to a finer level: coordinates are scaled by the size ratio and
    /// clamped into the new source bounds.
    pub(crate) fn upscale(
        &self,
        width: u32,
        height: u32,
        prev_source: (u32, u32),
        source: (u32, u32),
        bounds: CenterBounds,
    ) -> Self {
        let sx = source.0 as f32 / prev_source.0.max(1) as f32;
        let sy = source.1 as f32 / prev_source.1.max(1) as f32;
        let mut field = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            let py = (u64::from(y) * u64::from(self.height) / u64::from(height.max(1))) as u32;
            for x in 0..width {
                let px = (u64::from(x) * u64::from(self.width) / u64::from(width.max(1))) as u32;
                let [mx, my] = self.get(px.min(self.width - 1), py.min(self.height - 1));
                // Offset within the 2x2 block keeps neighboring pixels on neighboring matches.
                let fx = (mx as f32 * sx) as i32 + (x & 1) as i32;
                let fy = (my as f32 * sy) as i32 + (y & 1) as i32;
                field.push(bounds.clamp([fx, fy]));
            }
        }
        Self::from_field(width, height, field)
    }
}

/// Inclusive range of source patch centers that keep the whole patch inside the image.
///
/// Falls back to the full image when the image is smaller than one patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CenterBounds {
    pub(crate) x0: i32,
    pub(crate) y0: i32,
    pub(crate) x1: i32,
    pub(crate) y1: i32,
}

impl CenterBounds {
    pub(crate) fn new(source: (u32, u32), patch_size: u32) -> Self {
        let r = i64::from(patch_size / 2);
        let axis = |len: u32| {
            let len = i64::from(len.max(1));
            let (lo, hi) = if len > 2 * r { (r, len - 1 - r) } else { (0, len - 1) };
            (lo as i32, hi as i32)
        };
        let (x0, x1) = axis(source.0);
        let (y0, y1) = axis(source.1);
        Self { x0, y0, x1, y1 }
    }

    pub(crate) fn clamp(&self, [x, y]: [i32; 2]) -> [i32; 2] {
        [x.clamp(self.x0, self.x1), y.clamp(self.y0, self.y1)]
    }
}
