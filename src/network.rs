use crate::fault_detector::{FaultDetector, FaultType};
use crate::health_monitor::HealthMonitor;
use crate::neuron::Neuron;
use crate::params;
use crate::params::NetworkParams;
use crate::recovery_engine::{RecoveryAction, RecoveryEngine, RecoveryTarget};
use crate::roster::Roster;
use crate::spike_encoder::SpikeEncoder;
use crate::state_snapshot::{NeuronState, StateSnapshot, SynapseState, UnitStatus};
use crate::synapse::SynapseLayer;
use crate::types::SpikeTrain;
use itertools::Itertools;
use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};
use simple_error::SimpleResult;
use simple_error::{try_with, SimpleError};

pub fn create_network(params: NetworkParams) -> Result<Network, SimpleError> {
    try_with!(
        params::validate_network_params(&params),
        "invalid network parameters"
    );

    let mut rng = match params.technical_params.seed_override {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let num_units = params.get_num_units();

    let mut neurons: Vec<Neuron> = (0..num_units)
        .map(|nid| Neuron::new(nid, &params.neuron_params))
        .collect();

    for backup in &mut neurons[params.num_hidden..] {
        backup.deactivate();
    }

    let synapses = SynapseLayer::new(
        params.num_in,
        num_units,
        params.synapse_params.clone(),
        &mut rng,
    );

    Ok(Network {
        neurons,
        synapses,
        roster: Roster::new(params.num_hidden, params.num_backup),
        fault_detector: FaultDetector::new(params.detection_params.clone()),
        health_monitor: HealthMonitor::new(num_units, params.health_params.clone()),
        recovery_engine: RecoveryEngine::new(params.recovery_params.clone()),
        pending_fault_injections: Vec::new(),
        rng,
        tick_period: 0,
        energy: 0,
        params,
    })
}

/// Self-healing spiking network. All mutation, including fault injection, goes through
/// `&mut self`, so a timestep always runs to completion before anything else can observe or
/// change the network.
///
/// Per-unit getters index by `nid` and panic if it is not below `get_num_units()`. Operations
/// that mutate the network validate `nid` and return an error instead.
pub struct Network {
    neurons: Vec<Neuron>,
    synapses: SynapseLayer,
    roster: Roster,
    fault_detector: FaultDetector,
    health_monitor: HealthMonitor,
    recovery_engine: RecoveryEngine,
    pending_fault_injections: Vec<(usize, FaultType)>,
    rng: StdRng,
    tick_period: usize,
    energy: usize,
    params: NetworkParams,
}

impl Network {
    pub fn with_dimensions(
        num_in: usize,
        num_hidden: usize,
        num_out: usize,
        num_backup: usize,
    ) -> SimpleResult<Self> {
        create_network(NetworkParams::with_dimensions(
            num_in, num_hidden, num_out, num_backup,
        ))
    }

    pub fn get_params(&self) -> &NetworkParams {
        &self.params
    }

    pub fn get_num_units(&self) -> usize {
        self.neurons.len()
    }

    pub fn get_num_in_channels(&self) -> usize {
        self.params.num_in
    }

    pub fn get_num_out_channels(&self) -> usize {
        self.params.num_out
    }

    pub fn get_tick_period(&self) -> usize {
        self.tick_period
    }

    pub fn get_energy(&self) -> usize {
        self.energy
    }

    pub fn get_active_nids(&self) -> &[usize] {
        self.roster.get_active_nids()
    }

    pub fn get_spare_nids(&self) -> &[usize] {
        self.roster.get_spare_nids()
    }

    pub fn is_active(&self, nid: usize) -> bool {
        self.neurons[nid].is_active()
    }

    pub fn get_threshold(&self, nid: usize) -> f32 {
        self.neurons[nid].get_threshold()
    }

    pub fn get_potential(&self, nid: usize) -> f32 {
        self.neurons[nid].get_potential()
    }

    pub fn get_spike_ts(&self, nid: usize) -> &[usize] {
        self.neurons[nid].get_spike_ts()
    }

    pub fn get_spike_rate(&self, nid: usize, window: usize) -> f32 {
        self.neurons[nid].get_spike_rate(window)
    }

    pub fn get_health_score(&self, nid: usize) -> f64 {
        self.health_monitor.get_score(nid)
    }

    pub fn get_healing_progress(&self, nid: usize) -> Option<f64> {
        self.health_monitor.get_healing_progress(nid)
    }

    pub fn get_scar_tissue(&self, nid: usize) -> usize {
        self.roster.get_scar_tissue(nid)
    }

    pub fn get_tuning_attempts(&self, nid: usize) -> usize {
        self.recovery_engine.get_tuning_attempts(nid)
    }

    pub fn get_input_weights(&self, nid: usize) -> Vec<f32> {
        self.synapses.get_column(nid)
    }

    pub fn get_recovery_log(&self) -> &[String] {
        self.recovery_engine.get_log()
    }

    pub fn detect_fault(&self, nid: usize) -> FaultType {
        self.fault_detector.detect_fault(&self.neurons[nid])
    }

    /// Encodes `input` into `time_steps` ticks of spikes and runs them. Returns the spike raster
    /// of all units, one row per tick.
    pub fn forward(
        &mut self,
        input: &[f32],
        time_steps: usize,
        learn: bool,
    ) -> SimpleResult<SpikeTrain> {
        self.validate_input_len(input.len())?;

        let encoder = SpikeEncoder::new(time_steps, self.params.encoding);
        let in_spike_train = encoder.encode(input, &mut self.rng);

        Ok(in_spike_train
            .iter()
            .map(|in_spikes| self.process_tick(in_spikes, learn))
            .collect())
    }

    /// Runs a single tick on already encoded input spikes.
    pub fn tick(&mut self, in_spikes: &[bool], learn: bool) -> SimpleResult<Vec<bool>> {
        self.validate_input_len(in_spikes.len())?;
        Ok(self.process_tick(in_spikes, learn))
    }

    /// Applies a fault right away. With `reevaluate`, the unit's health is updated immediately,
    /// so a paused simulation reflects the fault in its next snapshot.
    pub fn inject_fault(
        &mut self,
        nid: usize,
        fault_type: FaultType,
        reevaluate: bool,
    ) -> SimpleResult<()> {
        self.validate_fault_injection(nid, fault_type)?;

        info!("Injecting {} fault into neuron {}", fault_type, nid);
        self.neurons[nid].inject_fault(fault_type);

        if reevaluate {
            self.evaluate_health(nid)?;
        }

        Ok(())
    }

    /// Restores a unit in service to its constructed threshold and reactivates it. Retired units
    /// and spare backups are rejected.
    pub fn repair(&mut self, nid: usize) -> SimpleResult<()> {
        self.validate_nid(nid)?;

        if !self.roster.is_registered(nid) {
            return Err(SimpleError::new(format!(
                "Neuron {} is not in service and cannot be repaired",
                nid
            )));
        }

        self.neurons[nid].repair();
        self.fault_detector.clear_history(nid);
        self.health_monitor.reset_health(nid);

        info!("Repaired neuron {}", nid);
        Ok(())
    }

    /// Defers a fault to the start of the next tick.
    pub fn queue_fault_injection(&mut self, nid: usize, fault_type: FaultType) -> SimpleResult<()> {
        self.validate_fault_injection(nid, fault_type)?;
        self.pending_fault_injections.push((nid, fault_type));
        Ok(())
    }

    pub fn evaluate_health(&mut self, nid: usize) -> SimpleResult<FaultType> {
        self.validate_nid(nid)?;

        let fault_type = self.fault_detector.detect_fault(&self.neurons[nid]);
        self.health_monitor.update_health(nid, fault_type);

        Ok(fault_type)
    }

    pub fn reset(&mut self) -> SimpleResult<()> {
        *self = create_network(self.params.clone())?;
        info!("Network reset");
        Ok(())
    }

    pub fn get_state(&self) -> StateSnapshot {
        let neuron_states = self
            .neurons
            .iter()
            .map(|neuron| {
                let nid = neuron.get_nid();
                let health = self.health_monitor.get_score(nid);
                let healing_progress = self.health_monitor.get_healing_progress(nid);
                let is_healing = healing_progress.is_some();

                NeuronState {
                    nid,
                    potential: neuron.get_potential(),
                    threshold: neuron.get_threshold(),
                    is_active: neuron.is_active(),
                    is_backup: self.roster.is_backup(nid),
                    health,
                    healing_progress: healing_progress.unwrap_or(0.0),
                    is_healing,
                    scar_tissue: self.roster.get_scar_tissue(nid),
                    status: UnitStatus::derive(neuron.is_active(), is_healing, health),
                }
            })
            .collect();

        let cutoff = self.params.snapshot_params.weight_visibility_cutoff;

        let synapse_states = (0..self.synapses.get_num_pre())
            .cartesian_product(0..self.synapses.get_num_post())
            .map(|(in_channel_id, post_syn_nid)| SynapseState {
                in_channel_id,
                post_syn_nid,
                weight: self.synapses.get_weight(in_channel_id, post_syn_nid),
            })
            .filter(|synapse_state| synapse_state.weight > cutoff)
            .collect();

        StateSnapshot {
            t: self.tick_period,
            neuron_states,
            synapse_states,
            active_nids: self.roster.get_active_nids().to_vec(),
            spare_nids: self.roster.get_spare_nids().to_vec(),
            recent_log: self
                .recovery_engine
                .get_recent_log(self.params.snapshot_params.num_log_entries)
                .to_vec(),
            energy: self.energy,
        }
    }

    fn process_tick(&mut self, in_spikes: &[bool], learn: bool) -> Vec<bool> {
        self.apply_pending_fault_injections();

        let t = self.tick_period;
        let hidden_input = self.synapses.forward(in_spikes);
        let mut spikes = vec![false; self.neurons.len()];

        for &nid in self.roster.get_active_nids() {
            let spiked = self.neurons[nid].step(hidden_input[nid], t);
            self.fault_detector.record_spike(nid, spiked);
            spikes[nid] = spiked;
        }

        if learn {
            self.synapses.update_stdp(in_spikes, &spikes, t);
        }

        self.check_and_heal();

        self.energy = spikes.iter().filter(|&&spiked| spiked).count();
        self.tick_period += 1;

        spikes
    }

    fn check_and_heal(&mut self) {
        // recovery may rewrite the registry while we walk it
        let nids = self.roster.get_active_nids().to_vec();

        for nid in nids {
            if !self.roster.is_registered(nid) {
                continue;
            }

            let fault_type = self.fault_detector.detect_fault(&self.neurons[nid]);
            self.health_monitor.update_health(nid, fault_type);

            if self.health_monitor.is_healing(nid) {
                if self.health_monitor.tick_healing(nid) {
                    // inactive units are classified as dead by the detector
                    let fault_type = self.fault_detector.detect_fault(&self.neurons[nid]);
                    let action = self.heal(nid, fault_type);
                    self.health_monitor.complete_healing(nid, fault_type);

                    match action {
                        RecoveryAction::TuningExhausted { .. } => {
                            debug!("Tuning exhausted for neuron {}", nid)
                        }
                        action if action.is_critical() => {
                            info!("Critical recovery complete: {}", action)
                        }
                        action => debug!("Auto-tuned neuron {}: {}", nid, action),
                    }
                }
            } else if self.health_monitor.needs_healing(nid) {
                if fault_type == FaultType::Dead {
                    warn!(
                        "Critical failure detected: neuron {} is dead, initiating recovery",
                        nid
                    );
                } else {
                    debug!("Starting maintenance of {} neuron {}", fault_type, nid);
                }

                self.health_monitor.start_healing(nid);
            }
        }
    }

    fn heal(&mut self, nid: usize, fault_type: FaultType) -> RecoveryAction {
        let mut target = RecoveryTarget {
            neurons: &mut self.neurons,
            synapses: &mut self.synapses,
            roster: &mut self.roster,
            health_monitor: &mut self.health_monitor,
            fault_detector: &mut self.fault_detector,
            rng: &mut self.rng,
        };

        self.recovery_engine.heal_neuron(&mut target, nid, fault_type)
    }

    fn apply_pending_fault_injections(&mut self) {
        for (nid, fault_type) in std::mem::take(&mut self.pending_fault_injections) {
            info!("Applying queued {} fault to neuron {}", fault_type, nid);
            self.neurons[nid].inject_fault(fault_type);
        }
    }

    fn validate_input_len(&self, input_len: usize) -> SimpleResult<()> {
        if input_len != self.params.num_in {
            return Err(SimpleError::new(format!(
                "Invalid input length: {} (expected {})",
                input_len, self.params.num_in
            )));
        }

        Ok(())
    }

    fn validate_nid(&self, nid: usize) -> SimpleResult<()> {
        if nid >= self.neurons.len() {
            return Err(SimpleError::new(format!("Invalid neuron id: {}", nid)));
        }

        Ok(())
    }

    fn validate_fault_injection(&self, nid: usize, fault_type: FaultType) -> SimpleResult<()> {
        self.validate_nid(nid)?;

        if !fault_type.is_fault() {
            return Err(SimpleError::new(format!(
                "Invalid fault type for injection: {}",
                fault_type
            )));
        }

        Ok(())
    }
}
