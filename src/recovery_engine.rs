use std::fmt;

use rand::{distributions::Uniform, prelude::Distribution, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    fault_detector::{FaultDetector, FaultType},
    health_monitor::HealthMonitor,
    neuron::Neuron,
    params::RecoveryParams,
    roster::Roster,
    synapse::SynapseLayer,
    types::HashMap,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecoveryAction {
    ReplacedWithBackup {
        nid: usize,
        backup_nid: usize,
    },
    Redistributed {
        nid: usize,
        num_recipients: usize,
    },
    Tuned {
        nid: usize,
        attempt: usize,
        weight_factor: f32,
    },
    TuningExhausted {
        nid: usize,
    },
    ThresholdRaised {
        nid: usize,
    },
    NoAction {
        nid: usize,
    },
}

impl RecoveryAction {
    pub fn get_nid(&self) -> usize {
        match *self {
            RecoveryAction::ReplacedWithBackup { nid, .. }
            | RecoveryAction::Redistributed { nid, .. }
            | RecoveryAction::Tuned { nid, .. }
            | RecoveryAction::TuningExhausted { nid }
            | RecoveryAction::ThresholdRaised { nid }
            | RecoveryAction::NoAction { nid } => nid,
        }
    }

    /// Whether the unit was retired from service.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            RecoveryAction::ReplacedWithBackup { .. } | RecoveryAction::Redistributed { .. }
        )
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryAction::ReplacedWithBackup { nid, backup_nid } => {
                write!(f, "Replaced dead neuron {} with backup {}", nid, backup_nid)
            }
            RecoveryAction::Redistributed {
                nid,
                num_recipients,
            } => write!(
                f,
                "No backups available. Redistributed weights of neuron {} to {} neighbors",
                nid, num_recipients
            ),
            RecoveryAction::Tuned {
                nid,
                attempt,
                weight_factor,
            } => write!(
                f,
                "Boosted weights ({:.2}x) and lowered threshold for neuron {} (attempt {})",
                weight_factor, nid, attempt
            ),
            RecoveryAction::TuningExhausted { nid } => {
                write!(f, "Max tuning reached for neuron {}. Ignoring.", nid)
            }
            RecoveryAction::ThresholdRaised { nid } => {
                write!(f, "Raised threshold for hyperactive neuron {}", nid)
            }
            RecoveryAction::NoAction { nid } => write!(f, "No action taken for neuron {}", nid),
        }
    }
}

/// Mutable view of everything a recovery action may touch.
pub(crate) struct RecoveryTarget<'a> {
    pub neurons: &'a mut [Neuron],
    pub synapses: &'a mut SynapseLayer,
    pub roster: &'a mut Roster,
    pub health_monitor: &'a mut HealthMonitor,
    pub fault_detector: &'a mut FaultDetector,
    pub rng: &'a mut StdRng,
}

#[derive(Debug, Clone)]
pub(crate) struct RecoveryEngine {
    log: Vec<String>,
    tuning_attempts: HashMap<usize, usize>,
    params: RecoveryParams,
}

impl RecoveryEngine {
    pub fn new(params: RecoveryParams) -> Self {
        Self {
            log: Vec::new(),
            tuning_attempts: HashMap::default(),
            params,
        }
    }

    pub fn get_log(&self) -> &[String] {
        &self.log
    }

    pub fn get_recent_log(&self, num_entries: usize) -> &[String] {
        &self.log[self.log.len().saturating_sub(num_entries)..]
    }

    pub fn get_tuning_attempts(&self, nid: usize) -> usize {
        self.tuning_attempts.get(&nid).copied().unwrap_or(0)
    }

    pub fn heal_neuron(
        &mut self,
        target: &mut RecoveryTarget<'_>,
        nid: usize,
        fault_type: FaultType,
    ) -> RecoveryAction {
        let action = match fault_type {
            FaultType::Dead => self.replace_dead(target, nid),
            FaultType::Silent => self.tune_silent(target, nid),
            FaultType::Hyperactive => {
                target.neurons[nid].scale_threshold(self.params.hyperactive_threshold_factor);
                RecoveryAction::ThresholdRaised { nid }
            }
            FaultType::Healthy => RecoveryAction::NoAction { nid },
        };

        if fault_type != FaultType::Dead {
            target.health_monitor.reset_health(nid);
        }

        target.fault_detector.clear_history(nid);

        self.log.push(action.to_string());
        action
    }

    fn replace_dead(&self, target: &mut RecoveryTarget<'_>, nid: usize) -> RecoveryAction {
        let neurons = &*target.neurons;
        let backup_nid = target
            .roster
            .find_spare(|spare_nid| spare_nid != nid && !neurons[spare_nid].is_active());

        match backup_nid {
            Some(backup_nid) => {
                self.activate_backup(target, nid, backup_nid);
                RecoveryAction::ReplacedWithBackup { nid, backup_nid }
            }
            None => {
                let num_recipients = self.redistribute_weights(target, nid);
                RecoveryAction::Redistributed {
                    nid,
                    num_recipients,
                }
            }
        }
    }

    fn activate_backup(&self, target: &mut RecoveryTarget<'_>, nid: usize, backup_nid: usize) {
        let column = target.synapses.get_column(nid);
        let threshold = target.neurons[nid].get_threshold();

        target
            .synapses
            .set_column(backup_nid, &column, self.params.backup_weight_boost);

        let backup = &mut target.neurons[backup_nid];
        backup.set_threshold(threshold);
        backup.activate();

        target.neurons[nid].deactivate();
        target.roster.promote_backup(nid, backup_nid);
        target.health_monitor.reset_health(backup_nid);
        target.fault_detector.clear_history(backup_nid);
    }

    fn redistribute_weights(&self, target: &mut RecoveryTarget<'_>, nid: usize) -> usize {
        let column = target.synapses.get_column(nid);
        let recipients: Vec<usize> = target
            .roster
            .get_active_nids()
            .iter()
            .copied()
            .filter(|&active_nid| active_nid != nid)
            .collect();

        for &recipient in &recipients {
            target.synapses.add_to_column(
                recipient,
                &column,
                self.params.redistribution_fraction,
            );
            target.roster.record_absorption(recipient);
        }

        target.neurons[nid].deactivate();
        target.roster.retire(nid);

        recipients.len()
    }

    fn tune_silent(&mut self, target: &mut RecoveryTarget<'_>, nid: usize) -> RecoveryAction {
        let attempts = self.tuning_attempts.entry(nid).or_insert(0);

        if *attempts >= self.params.max_tuning_attempts {
            return RecoveryAction::TuningExhausted { nid };
        }

        *attempts += 1;

        let jitter = Uniform::new_inclusive(
            1.0 - self.params.weight_jitter,
            1.0 + self.params.weight_jitter,
        )
        .sample(&mut *target.rng);
        let weight_factor = self.params.silent_weight_boost * jitter;

        target.synapses.scale_column(nid, weight_factor);
        target.neurons[nid].scale_threshold(self.params.silent_threshold_factor);

        RecoveryAction::Tuned {
            nid,
            attempt: *attempts,
            weight_factor,
        }
    }
}
