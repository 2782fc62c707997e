use crate::foundation::error::{SynthError, SynthResult};

/// Per-channel weights of one image role (style or guide).
#[derive(Clone, Debug, PartialEq)]
pub struct WeightVector {
    weights: Vec<f32>,
}

impl WeightVector {
    /// Split `total` evenly across `channels`.
    pub fn uniform(total: f32, channels: usize) -> Self {
        let share = if channels == 0 {
            0.0
        } else {
            total / channels as f32
        };
        Self {
            weights: vec![share; channels],
        }
    }

    /// Replace the weight of one channel, leaving the others untouched.
    pub fn with_override(mut self, channel: usize, value: f32) -> SynthResult<Self> {
        let len = self.weights.len();
        let slot = self.weights.get_mut(channel).ok_or_else(|| {
            SynthError::validation(format!(
                "weight override for channel {channel}, but the role has {len} channels"
            ))
        })?;
        *slot = value;
        Ok(self)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum over all channels.
    pub fn total(&self) -> f32 {
        self.weights.iter().sum()
    }
}
