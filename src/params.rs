use serde::{Deserialize, Serialize};
use simple_error::SimpleError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    pub num_in: usize,
    pub num_hidden: usize,
    pub num_out: usize,
    pub num_backup: usize,
    pub neuron_params: NeuronParams,
    pub synapse_params: SynapseParams,
    pub encoding: EncodingMode,
    pub detection_params: FaultDetectionParams,
    pub health_params: HealthParams,
    pub recovery_params: RecoveryParams,
    pub snapshot_params: SnapshotParams,
    pub technical_params: TechnicalParams,
}

impl NetworkParams {
    pub fn with_dimensions(
        num_in: usize,
        num_hidden: usize,
        num_out: usize,
        num_backup: usize,
    ) -> Self {
        Self {
            num_in,
            num_hidden,
            num_out,
            num_backup,
            ..Self::default()
        }
    }

    pub fn get_num_units(&self) -> usize {
        self.num_hidden + self.num_backup
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuronParams {
    pub threshold: f32,
    pub decay: f32,
    pub reset_potential: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynapseParams {
    pub learning_rate: f32,
    pub tau: f32,
    pub window_taus: f32,
    pub initial_weight_min: f32,
    pub initial_weight_max: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncodingMode {
    Rate,
    Temporal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultDetectionParams {
    pub window_size: usize,
    pub silent_rate: f64,
    pub hyperactive_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthParams {
    pub healing_threshold: f64,
    pub recovery_increment: f64,
    pub fault_penalty: f64,
    pub dead_penalty: f64,
    pub healing_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryParams {
    pub backup_weight_boost: f32,
    pub redistribution_fraction: f32,
    pub max_tuning_attempts: usize,
    pub silent_weight_boost: f32,
    pub weight_jitter: f32,
    pub silent_threshold_factor: f32,
    pub hyperactive_threshold_factor: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotParams {
    pub weight_visibility_cutoff: f32,
    pub num_log_entries: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalParams {
    pub seed_override: Option<u64>,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            num_in: 10,
            num_hidden: 5,
            num_out: 2,
            num_backup: 2,
            neuron_params: NeuronParams::default(),
            synapse_params: SynapseParams::default(),
            encoding: EncodingMode::default(),
            detection_params: FaultDetectionParams::default(),
            health_params: HealthParams::default(),
            recovery_params: RecoveryParams::default(),
            snapshot_params: SnapshotParams::default(),
            technical_params: TechnicalParams::default(),
        }
    }
}

impl Default for NeuronParams {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            decay: 0.9,
            reset_potential: 0.0,
        }
    }
}

impl Default for SynapseParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            tau: 20.0,
            window_taus: 4.0,
            initial_weight_min: 0.1,
            initial_weight_max: 0.5,
        }
    }
}

impl Default for EncodingMode {
    fn default() -> Self {
        EncodingMode::Rate
    }
}

impl Default for FaultDetectionParams {
    fn default() -> Self {
        Self {
            window_size: 150,
            silent_rate: 0.005,
            hyperactive_rate: 0.2,
        }
    }
}

impl Default for HealthParams {
    fn default() -> Self {
        Self {
            healing_threshold: 0.8,
            recovery_increment: 0.05,
            fault_penalty: 0.1,
            dead_penalty: 1.0,
            healing_rate: 0.05,
        }
    }
}

impl Default for RecoveryParams {
    fn default() -> Self {
        Self {
            backup_weight_boost: 1.2,
            redistribution_fraction: 0.1,
            max_tuning_attempts: 5,
            silent_weight_boost: 1.5,
            weight_jitter: 0.1,
            silent_threshold_factor: 0.8,
            hyperactive_threshold_factor: 1.5,
        }
    }
}

impl Default for SnapshotParams {
    fn default() -> Self {
        Self {
            weight_visibility_cutoff: 0.05,
            num_log_entries: 5,
        }
    }
}

pub fn validate_network_params(network_params: &NetworkParams) -> Result<(), SimpleError> {
    if network_params.num_in == 0 {
        return Err(SimpleError::new("num_in must be strictly positive"));
    }

    if network_params.num_hidden == 0 {
        return Err(SimpleError::new("num_hidden must be strictly positive"));
    }

    validate_neuron_params(&network_params.neuron_params)?;
    validate_synapse_params(&network_params.synapse_params)?;
    validate_detection_params(&network_params.detection_params)?;
    validate_health_params(&network_params.health_params)?;
    validate_recovery_params(&network_params.recovery_params)?;

    let cutoff = network_params.snapshot_params.weight_visibility_cutoff;
    validate_finite(&[("weight_visibility_cutoff", cutoff.into())])?;

    if cutoff < 0.0 {
        return Err(SimpleError::new(
            "weight_visibility_cutoff must not be negative",
        ));
    }

    Ok(())
}

fn validate_finite(named_values: &[(&str, f64)]) -> Result<(), SimpleError> {
    for &(name, value) in named_values {
        if !value.is_finite() {
            return Err(SimpleError::new(format!("{} must be finite", name)));
        }
    }

    Ok(())
}

fn validate_neuron_params(neuron_params: &NeuronParams) -> Result<(), SimpleError> {
    validate_finite(&[
        ("threshold", neuron_params.threshold.into()),
        ("decay", neuron_params.decay.into()),
        ("reset_potential", neuron_params.reset_potential.into()),
    ])?;

    if neuron_params.decay <= 0.0 || neuron_params.decay > 1.0 {
        return Err(SimpleError::new("decay must be in (0, 1]"));
    }

    if neuron_params.reset_potential >= neuron_params.threshold {
        return Err(SimpleError::new(
            "reset_potential must be less than threshold",
        ));
    }

    Ok(())
}

fn validate_synapse_params(synapse_params: &SynapseParams) -> Result<(), SimpleError> {
    validate_finite(&[
        ("learning_rate", synapse_params.learning_rate.into()),
        ("tau", synapse_params.tau.into()),
        ("window_taus", synapse_params.window_taus.into()),
        ("initial_weight_min", synapse_params.initial_weight_min.into()),
        ("initial_weight_max", synapse_params.initial_weight_max.into()),
    ])?;

    if synapse_params.learning_rate <= 0.0 {
        return Err(SimpleError::new("learning_rate must be strictly positive"));
    }

    if synapse_params.tau <= 0.0 {
        return Err(SimpleError::new("tau must be strictly positive"));
    }

    if synapse_params.window_taus <= 0.0 {
        return Err(SimpleError::new("window_taus must be strictly positive"));
    }

    if synapse_params.initial_weight_min < 0.0 || synapse_params.initial_weight_max > 1.0 {
        return Err(SimpleError::new("initial weights must be in [0, 1]"));
    }

    if synapse_params.initial_weight_min > synapse_params.initial_weight_max {
        return Err(SimpleError::new(
            "initial_weight_min must not be greater than initial_weight_max",
        ));
    }

    Ok(())
}

fn validate_detection_params(detection_params: &FaultDetectionParams) -> Result<(), SimpleError> {
    if detection_params.window_size == 0 {
        return Err(SimpleError::new("window_size must be strictly positive"));
    }

    validate_finite(&[
        ("silent_rate", detection_params.silent_rate),
        ("hyperactive_rate", detection_params.hyperactive_rate),
    ])?;

    if detection_params.silent_rate >= detection_params.hyperactive_rate {
        return Err(SimpleError::new(
            "silent_rate must be less than hyperactive_rate",
        ));
    }

    Ok(())
}

fn validate_health_params(health_params: &HealthParams) -> Result<(), SimpleError> {
    let unit_interval_params = [
        ("healing_threshold", health_params.healing_threshold),
        ("recovery_increment", health_params.recovery_increment),
        ("fault_penalty", health_params.fault_penalty),
        ("dead_penalty", health_params.dead_penalty),
        ("healing_rate", health_params.healing_rate),
    ];

    validate_finite(&unit_interval_params)?;

    for (name, value) in unit_interval_params {
        if value <= 0.0 || value > 1.0 {
            return Err(SimpleError::new(format!("{} must be in (0, 1]", name)));
        }
    }

    Ok(())
}

fn validate_recovery_params(recovery_params: &RecoveryParams) -> Result<(), SimpleError> {
    let positive_params = [
        ("backup_weight_boost", recovery_params.backup_weight_boost),
        (
            "redistribution_fraction",
            recovery_params.redistribution_fraction,
        ),
        ("silent_weight_boost", recovery_params.silent_weight_boost),
        (
            "silent_threshold_factor",
            recovery_params.silent_threshold_factor,
        ),
        (
            "hyperactive_threshold_factor",
            recovery_params.hyperactive_threshold_factor,
        ),
    ];

    for (name, value) in positive_params {
        validate_finite(&[(name, value.into())])?;

        if value <= 0.0 {
            return Err(SimpleError::new(format!(
                "{} must be strictly positive",
                name
            )));
        }
    }

    validate_finite(&[("weight_jitter", recovery_params.weight_jitter.into())])?;

    if recovery_params.weight_jitter < 0.0 || recovery_params.weight_jitter >= 1.0 {
        return Err(SimpleError::new("weight_jitter must be in [0, 1)"));
    }

    Ok(())
}
