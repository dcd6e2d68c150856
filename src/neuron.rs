use crate::{fault_detector::FaultType, params::NeuronParams};

pub const SILENT_THRESHOLD: f32 = 999.0;
pub const HYPERACTIVE_THRESHOLD: f32 = 0.01;

/// Leaky integrate-and-fire unit.
#[derive(Debug, Clone)]
pub struct Neuron {
    nid: usize,
    potential: f32,
    threshold: f32,
    original_threshold: f32,
    decay: f32,
    reset_potential: f32,
    is_active: bool,
    spike_ts: Vec<usize>,
}

impl Neuron {
    pub fn new(nid: usize, neuron_params: &NeuronParams) -> Self {
        Self {
            nid,
            potential: 0.0,
            threshold: neuron_params.threshold,
            original_threshold: neuron_params.threshold,
            decay: neuron_params.decay,
            reset_potential: neuron_params.reset_potential,
            is_active: true,
            spike_ts: Vec::new(),
        }
    }

    pub fn get_nid(&self) -> usize {
        self.nid
    }

    pub fn get_potential(&self) -> f32 {
        self.potential
    }

    pub fn get_threshold(&self) -> f32 {
        self.threshold
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_spike_ts(&self) -> &[usize] {
        &self.spike_ts
    }

    pub fn step(&mut self, weighted_input: f32, t: usize) -> bool {
        if !self.is_active {
            return false;
        }

        self.potential = self.potential * self.decay + weighted_input;

        if self.potential >= self.threshold {
            self.potential = self.reset_potential;
            self.spike_ts.push(t);
            true
        } else {
            false
        }
    }

    /// Fraction of the `window` ticks up to the most recent spike in which the unit fired.
    pub fn get_spike_rate(&self, window: usize) -> f32 {
        if window == 0 {
            return 0.0;
        }

        match self.spike_ts.last() {
            Some(&last_spike_t) => {
                let window_start = last_spike_t.saturating_sub(window);
                let recent_spike_count = self
                    .spike_ts
                    .iter()
                    .rev()
                    .take_while(|&&spike_t| spike_t >= window_start)
                    .count();
                recent_spike_count as f32 / window as f32
            }
            None => 0.0,
        }
    }

    pub fn inject_fault(&mut self, fault_type: FaultType) {
        match fault_type {
            FaultType::Silent => self.threshold = SILENT_THRESHOLD,
            FaultType::Hyperactive => self.threshold = HYPERACTIVE_THRESHOLD,
            FaultType::Dead => self.is_active = false,
            FaultType::Healthy => {}
        }
    }

    pub fn repair(&mut self) {
        self.threshold = self.original_threshold;
        self.potential = 0.0;
        self.is_active = true;
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    pub fn scale_threshold(&mut self, factor: f32) {
        self.threshold *= factor;
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}
