use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub t: usize,
    pub neuron_states: Vec<NeuronState>,
    pub synapse_states: Vec<SynapseState>,
    pub active_nids: Vec<usize>,
    pub spare_nids: Vec<usize>,
    pub recent_log: Vec<String>,
    pub energy: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuronState {
    pub nid: usize,
    pub potential: f32,
    pub threshold: f32,
    pub is_active: bool,
    pub is_backup: bool,
    pub health: f64,
    pub healing_progress: f64,
    pub is_healing: bool,
    pub scar_tissue: usize,
    pub status: UnitStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynapseState {
    pub in_channel_id: usize,
    pub post_syn_nid: usize,
    pub weight: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitStatus {
    Dead,
    #[serde(rename = "Healing...")]
    Healing,
    Degraded,
    Healthy,
}

impl UnitStatus {
    pub fn derive(is_active: bool, is_healing: bool, health: f64) -> Self {
        if !is_active {
            UnitStatus::Dead
        } else if is_healing {
            UnitStatus::Healing
        } else if health < 1.0 {
            UnitStatus::Degraded
        } else {
            UnitStatus::Healthy
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UnitStatus::Dead => "Dead",
            UnitStatus::Healing => "Healing...",
            UnitStatus::Degraded => "Degraded",
            UnitStatus::Healthy => "Healthy",
        };
        f.write_str(label)
    }
}
