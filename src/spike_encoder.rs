use rand::{distributions::Uniform, prelude::Distribution, Rng};

use crate::{params::EncodingMode, types::SpikeTrain};

#[derive(Debug, Clone)]
pub struct SpikeEncoder {
    num_steps: usize,
    mode: EncodingMode,
}

impl SpikeEncoder {
    pub fn new(num_steps: usize, mode: EncodingMode) -> Self {
        Self { num_steps, mode }
    }

    /// Turns values in [0, 1] (clipped otherwise) into a `num_steps` x `values.len()` raster.
    pub fn encode<R: Rng>(&self, values: &[f32], rng: &mut R) -> SpikeTrain {
        let values: Vec<f32> = values.iter().map(|value| value.clamp(0.0, 1.0)).collect();

        match self.mode {
            EncodingMode::Rate => {
                let threshold_dist = Uniform::new(0.0f32, 1.0);
                (0..self.num_steps)
                    .map(|_| {
                        values
                            .iter()
                            .map(|&value| value > threshold_dist.sample(rng))
                            .collect()
                    })
                    .collect()
            }
            EncodingMode::Temporal => {
                let mut result = vec![vec![false; values.len()]; self.num_steps];

                if self.num_steps > 0 {
                    let last_step = (self.num_steps - 1) as f32;
                    for (channel, value) in values.iter().enumerate() {
                        let spike_step = ((1.0 - value) * last_step).round() as usize;
                        result[spike_step][channel] = true;
                    }
                }

                result
            }
        }
    }
}

/// Per-channel spike rate of a raster.
pub fn decode(spike_train: &[Vec<bool>]) -> Vec<f32> {
    let num_channels = spike_train.first().map_or(0, |step| step.len());
    let mut spike_counts = vec![0usize; num_channels];

    for step in spike_train {
        for (count, &spiked) in spike_counts.iter_mut().zip(step) {
            if spiked {
                *count += 1;
            }
        }
    }

    spike_counts
        .into_iter()
        .map(|count| count as f32 / spike_train.len() as f32)
        .collect()
}
