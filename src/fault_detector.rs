use std::{collections::VecDeque, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use simple_error::SimpleError;

use crate::{neuron::Neuron, params::FaultDetectionParams, types::HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultType {
    Healthy,
    Silent,
    Hyperactive,
    Dead,
}

impl FaultType {
    pub fn is_fault(&self) -> bool {
        *self != FaultType::Healthy
    }
}

impl fmt::Display for FaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FaultType::Healthy => "Healthy",
            FaultType::Silent => "Silent",
            FaultType::Hyperactive => "Hyperactive",
            FaultType::Dead => "Dead",
        };
        f.write_str(name)
    }
}

impl FromStr for FaultType {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            FaultType::Healthy,
            FaultType::Silent,
            FaultType::Hyperactive,
            FaultType::Dead,
        ]
        .into_iter()
        .find(|fault_type| fault_type.to_string().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| SimpleError::new(format!("unknown fault type: {}", s)))
    }
}

/// Classifies units from a sliding window of their recent spiking behavior.
#[derive(Debug, Clone)]
pub struct FaultDetector {
    spike_windows: HashMap<usize, VecDeque<bool>>,
    params: FaultDetectionParams,
}

impl FaultDetector {
    pub fn new(params: FaultDetectionParams) -> Self {
        Self {
            spike_windows: HashMap::default(),
            params,
        }
    }

    pub fn record_spike(&mut self, nid: usize, spiked: bool) {
        let window_size = self.params.window_size;
        let window = self
            .spike_windows
            .entry(nid)
            .or_insert_with(|| VecDeque::with_capacity(window_size));

        window.push_front(spiked);
        window.truncate(window_size);
    }

    pub fn clear_history(&mut self, nid: usize) {
        self.spike_windows.remove(&nid);
    }

    pub fn get_num_observations(&self, nid: usize) -> usize {
        self.spike_windows.get(&nid).map_or(0, |window| window.len())
    }

    pub fn get_spike_rate(&self, nid: usize) -> Option<f64> {
        self.spike_windows
            .get(&nid)
            .filter(|window| !window.is_empty())
            .map(|window| {
                window.iter().filter(|&&spiked| spiked).count() as f64 / window.len() as f64
            })
    }

    pub fn detect_fault(&self, neuron: &Neuron) -> FaultType {
        if !neuron.is_active() {
            return FaultType::Dead;
        }

        // grace period until the window has filled
        if self.get_num_observations(neuron.get_nid()) < self.params.window_size {
            return FaultType::Healthy;
        }

        match self.get_spike_rate(neuron.get_nid()) {
            Some(rate) if rate < self.params.silent_rate => FaultType::Silent,
            Some(rate) if rate > self.params.hyperactive_rate => FaultType::Hyperactive,
            _ => FaultType::Healthy,
        }
    }
}
