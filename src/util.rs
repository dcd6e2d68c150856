use crate::params::SynapseParams;

pub fn get_decay_factor(t_diff: usize, tau: f32) -> f32 {
    (-(t_diff as f32) / tau).exp()
}

/// Magnitude of the weight change for a spike pair `t_diff` ticks apart, or `None` if the pair
/// falls outside the plasticity window. Same-tick pairs never count.
pub fn compute_stdp(t_diff: usize, syn_params: &SynapseParams) -> Option<f32> {
    let window = syn_params.window_taus * syn_params.tau;

    if t_diff == 0 || t_diff as f32 >= window {
        None
    } else {
        Some(syn_params.learning_rate * get_decay_factor(t_diff, syn_params.tau))
    }
}

pub fn clip_weight(weight: f32) -> f32 {
    weight.clamp(0.0, 1.0)
}
