use rand::{distributions::Uniform, prelude::Distribution, rngs::StdRng};

use crate::{params::SynapseParams, util};

/// Dense pre -> post weight matrix, stored row-major by pre-synaptic channel.
#[derive(Debug, Clone)]
pub struct SynapseLayer {
    num_pre: usize,
    num_post: usize,
    weights: Vec<f32>,
    last_pre_spike_ts: Vec<Option<usize>>,
    last_post_spike_ts: Vec<Option<usize>>,
    syn_params: SynapseParams,
}

impl SynapseLayer {
    pub fn new(
        num_pre: usize,
        num_post: usize,
        syn_params: SynapseParams,
        rng: &mut StdRng,
    ) -> Self {
        let init_weight_dist = Uniform::new_inclusive(
            syn_params.initial_weight_min,
            syn_params.initial_weight_max,
        );

        let weights = (0..num_pre * num_post)
            .map(|_| init_weight_dist.sample(rng))
            .collect();

        Self::from_weights(num_pre, num_post, weights, syn_params)
    }

    pub fn from_weights(
        num_pre: usize,
        num_post: usize,
        weights: Vec<f32>,
        syn_params: SynapseParams,
    ) -> Self {
        assert_eq!(weights.len(), num_pre * num_post);

        Self {
            num_pre,
            num_post,
            weights,
            last_pre_spike_ts: vec![None; num_pre],
            last_post_spike_ts: vec![None; num_post],
            syn_params,
        }
    }

    pub fn get_num_pre(&self) -> usize {
        self.num_pre
    }

    pub fn get_num_post(&self) -> usize {
        self.num_post
    }

    pub fn get_weight(&self, pre_idx: usize, post_idx: usize) -> f32 {
        self.weights[self.index(pre_idx, post_idx)]
    }

    pub fn get_column(&self, post_idx: usize) -> Vec<f32> {
        (0..self.num_pre)
            .map(|pre_idx| self.get_weight(pre_idx, post_idx))
            .collect()
    }

    /// Overwrites a post unit's input weights with `column * factor`, clipped.
    pub fn set_column(&mut self, post_idx: usize, column: &[f32], factor: f32) {
        assert_eq!(column.len(), self.num_pre);

        for (pre_idx, weight) in column.iter().enumerate() {
            let idx = self.index(pre_idx, post_idx);
            self.weights[idx] = util::clip_weight(weight * factor);
        }
    }

    pub fn scale_column(&mut self, post_idx: usize, factor: f32) {
        for pre_idx in 0..self.num_pre {
            let idx = self.index(pre_idx, post_idx);
            self.weights[idx] = util::clip_weight(self.weights[idx] * factor);
        }
    }

    /// Adds `column * fraction` onto a post unit's input weights, clipped.
    pub fn add_to_column(&mut self, post_idx: usize, column: &[f32], fraction: f32) {
        assert_eq!(column.len(), self.num_pre);

        for (pre_idx, weight) in column.iter().enumerate() {
            let idx = self.index(pre_idx, post_idx);
            self.weights[idx] = util::clip_weight(self.weights[idx] + weight * fraction);
        }
    }

    pub fn forward(&self, pre_spikes: &[bool]) -> Vec<f32> {
        let mut result = vec![0.0; self.num_post];

        for pre_idx in spiking_indices(pre_spikes) {
            let row = &self.weights[pre_idx * self.num_post..(pre_idx + 1) * self.num_post];

            for (post_input, weight) in result.iter_mut().zip(row) {
                *post_input += weight;
            }
        }

        result
    }

    pub fn update_stdp(&mut self, pre_spikes: &[bool], post_spikes: &[bool], t: usize) {
        let pre_indices: Vec<usize> = spiking_indices(pre_spikes).collect();
        let post_indices: Vec<usize> = spiking_indices(post_spikes).collect();

        // spike times are updated before pairing, so same-tick pairs cancel out
        for &pre_idx in &pre_indices {
            self.last_pre_spike_ts[pre_idx] = Some(t);
        }

        for &post_idx in &post_indices {
            self.last_post_spike_ts[post_idx] = Some(t);
        }

        // pre before post: potentiation
        for &post_idx in &post_indices {
            for pre_idx in 0..self.num_pre {
                if let Some(dw) = self.get_stdp_value(self.last_pre_spike_ts[pre_idx], t) {
                    let idx = self.index(pre_idx, post_idx);
                    self.weights[idx] += dw;
                }
            }
        }

        // post before pre: depression
        for &pre_idx in &pre_indices {
            for post_idx in 0..self.num_post {
                if let Some(dw) = self.get_stdp_value(self.last_post_spike_ts[post_idx], t) {
                    let idx = self.index(pre_idx, post_idx);
                    self.weights[idx] -= dw;
                }
            }
        }

        for weight in self.weights.iter_mut() {
            *weight = util::clip_weight(*weight);
        }
    }

    fn get_stdp_value(&self, last_spike_t: Option<usize>, t: usize) -> Option<f32> {
        last_spike_t
            .filter(|&last_spike_t| last_spike_t <= t)
            .and_then(|last_spike_t| util::compute_stdp(t - last_spike_t, &self.syn_params))
    }

    fn index(&self, pre_idx: usize, post_idx: usize) -> usize {
        pre_idx * self.num_post + post_idx
    }
}

fn spiking_indices(spikes: &[bool]) -> impl Iterator<Item = usize> + '_ {
    spikes
        .iter()
        .enumerate()
        .filter_map(|(idx, &spiked)| if spiked { Some(idx) } else { None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_util::assert_approx_eq_slice;
    use float_cmp::assert_approx_eq;
    use rand::SeedableRng;

    fn syn_params() -> SynapseParams {
        SynapseParams {
            learning_rate: 0.1,
            tau: 10.0,
            window_taus: 4.0,
            initial_weight_min: 0.1,
            initial_weight_max: 0.5,
        }
    }

    fn make_layer(num_pre: usize, num_post: usize, weight: f32) -> SynapseLayer {
        SynapseLayer::from_weights(
            num_pre,
            num_post,
            vec![weight; num_pre * num_post],
            syn_params(),
        )
    }

    #[test]
    fn randomized_initial_weights() {
        let mut rng = StdRng::seed_from_u64(0);
        let sut = SynapseLayer::new(20, 30, syn_params(), &mut rng);

        for pre_idx in 0..20 {
            for post_idx in 0..30 {
                let weight = sut.get_weight(pre_idx, post_idx);
                assert!((0.1..=0.5).contains(&weight));
            }
        }
    }

    #[test]
    fn forward_projection() {
        let sut = SynapseLayer::from_weights(
            3,
            2,
            vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
            syn_params(),
        );

        assert_approx_eq_slice(&sut.forward(&[true, false, true]), &[0.6, 0.8]);
        assert_approx_eq_slice(&sut.forward(&[false, false, false]), &[0.0, 0.0]);
    }

    #[test]
    fn potentiation() {
        let mut sut = make_layer(2, 1, 0.5);

        sut.update_stdp(&[true, false], &[false], 0);
        sut.update_stdp(&[false, false], &[true], 5);

        assert_approx_eq!(f32, sut.get_weight(0, 0), 0.5 + 0.1 * (-0.5f32).exp());
        assert_approx_eq!(f32, sut.get_weight(1, 0), 0.5);
    }

    #[test]
    fn depression() {
        let mut sut = make_layer(1, 2, 0.5);

        sut.update_stdp(&[false], &[false, true], 0);
        sut.update_stdp(&[true], &[false, false], 10);

        assert_approx_eq!(f32, sut.get_weight(0, 0), 0.5);
        assert_approx_eq!(f32, sut.get_weight(0, 1), 0.5 - 0.1 * (-1.0f32).exp());
    }

    #[test]
    fn same_tick_spikes_do_not_pair() {
        let mut sut = make_layer(1, 1, 0.5);

        sut.update_stdp(&[true], &[true], 3);

        assert_approx_eq!(f32, sut.get_weight(0, 0), 0.5);
    }

    #[test]
    fn earlier_pairing_partner_survives_same_tick_update() {
        let mut sut = make_layer(1, 1, 0.5);

        sut.update_stdp(&[false], &[true], 0);
        // pre and post both spike at 4: post's own spike time is moved to 4 first,
        // so no depression from the post spike at 0
        sut.update_stdp(&[true], &[true], 4);

        assert_approx_eq!(f32, sut.get_weight(0, 0), 0.5);
    }

    #[test]
    fn outside_window() {
        let mut sut = make_layer(1, 1, 0.5);

        sut.update_stdp(&[true], &[false], 0);
        sut.update_stdp(&[false], &[true], 40);

        assert_approx_eq!(f32, sut.get_weight(0, 0), 0.5);
    }

    #[test]
    fn weights_are_clipped() {
        let mut sut = make_layer(1, 2, 0.0);
        sut.set_column(0, &[0.99], 1.0);

        sut.update_stdp(&[true], &[false, false], 0);
        sut.update_stdp(&[false], &[true, false], 1);
        assert_approx_eq!(f32, sut.get_weight(0, 0), 1.0);

        sut.update_stdp(&[false], &[false, true], 2);
        sut.update_stdp(&[true], &[false, false], 3);
        assert_approx_eq!(f32, sut.get_weight(0, 1), 0.0);
    }

    #[test]
    fn column_operations() {
        let mut sut = SynapseLayer::from_weights(
            2,
            2,
            vec![0.2, 0.4, 0.3, 0.5],
            syn_params(),
        );

        assert_approx_eq_slice(&sut.get_column(1), &[0.4, 0.5]);

        sut.set_column(0, &[0.4, 0.5], 1.2);
        assert_approx_eq_slice(&sut.get_column(0), &[0.48, 0.6]);

        sut.scale_column(1, 2.5);
        assert_approx_eq_slice(&sut.get_column(1), &[1.0, 1.0]);

        sut.add_to_column(0, &[1.0, 2.0], 0.1);
        assert_approx_eq_slice(&sut.get_column(0), &[0.58, 0.8]);
    }
}
