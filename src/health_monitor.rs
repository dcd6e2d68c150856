use crate::{fault_detector::FaultType, params::HealthParams};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HealthState {
    Nominal,
    /// The score is frozen while healing.
    Healing { progress: f64 },
}

#[derive(Debug, Clone)]
struct UnitHealth {
    score: f64,
    state: HealthState,
}

impl UnitHealth {
    fn nominal() -> Self {
        Self {
            score: 1.0,
            state: HealthState::Nominal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthMonitor {
    units: Vec<UnitHealth>,
    params: HealthParams,
}

impl HealthMonitor {
    pub fn new(num_units: usize, params: HealthParams) -> Self {
        Self {
            units: vec![UnitHealth::nominal(); num_units],
            params,
        }
    }

    pub fn get_score(&self, nid: usize) -> f64 {
        self.units[nid].score
    }

    pub fn get_healing_progress(&self, nid: usize) -> Option<f64> {
        match self.units[nid].state {
            HealthState::Healing { progress } => Some(progress),
            HealthState::Nominal => None,
        }
    }

    pub fn is_healing(&self, nid: usize) -> bool {
        matches!(self.units[nid].state, HealthState::Healing { .. })
    }

    pub fn needs_healing(&self, nid: usize) -> bool {
        let unit = &self.units[nid];
        unit.state == HealthState::Nominal && unit.score < self.params.healing_threshold
    }

    pub fn update_health(&mut self, nid: usize, fault_type: FaultType) {
        let params = &self.params;
        let unit = &mut self.units[nid];

        if let HealthState::Nominal = unit.state {
            unit.score = match fault_type {
                FaultType::Healthy => (unit.score + params.recovery_increment).min(1.0),
                FaultType::Silent | FaultType::Hyperactive => {
                    (unit.score - params.fault_penalty).max(0.0)
                }
                FaultType::Dead => (unit.score - params.dead_penalty).max(0.0),
            };
        }
    }

    pub fn start_healing(&mut self, nid: usize) {
        self.units[nid].state = HealthState::Healing { progress: 0.0 };
    }

    /// Advances healing by one tick. Returns true once healing is complete.
    pub fn tick_healing(&mut self, nid: usize) -> bool {
        match &mut self.units[nid].state {
            HealthState::Healing { progress } => {
                *progress += self.params.healing_rate;
                *progress >= 1.0
            }
            HealthState::Nominal => false,
        }
    }

    /// Retired dead units keep their degraded score.
    pub fn complete_healing(&mut self, nid: usize, fault_type: FaultType) {
        let unit = &mut self.units[nid];
        unit.state = HealthState::Nominal;

        if fault_type != FaultType::Dead {
            unit.score = 1.0;
        }
    }

    pub fn reset_health(&mut self, nid: usize) {
        self.units[nid] = UnitHealth::nominal();
    }
}
