/// Small deterministic generator used by the patch search.
///
/// Each pixel derives its own stream from `(seed, level, iteration, x, y)`, so results do not depend
/// on how rows are scheduled across worker threads.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub(crate) fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub(crate) fn for_pixel(seed: u64, stream: u64, x: u32, y: u32) -> Self {
        let mut key = seed ^ stream.wrapping_mul(0xD6E8_FEB8_6659_FD93);
        key ^= ((u64::from(y) << 32) | u64::from(x)).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let mut rng = Self::new(key);
        rng.next_u64();
        rng
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform integer in `lo..=hi`. Returns `lo` when the range is empty.
    pub(crate) fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = (i64::from(hi) - i64::from(lo) + 1) as u64;
        lo + (self.next_u64() % span) as i32
    }
}
