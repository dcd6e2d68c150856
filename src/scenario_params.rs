use homeostat::params::NetworkParams;

pub fn get_scenario_params() -> NetworkParams {
    let params_yaml_str = r#"
num_in: 10
num_hidden: 5
num_out: 2
num_backup: 2
neuron_params:
  threshold: 1.0
  decay: 0.9
  reset_potential: 0.0
synapse_params:
  learning_rate: 0.01
  tau: 20.0
  window_taus: 4.0
  initial_weight_min: 0.1
  initial_weight_max: 0.5
encoding: Rate
detection_params:
  window_size: 150
  silent_rate: 0.005
  hyperactive_rate: 0.2
health_params:
  healing_threshold: 0.8
  recovery_increment: 0.05
  fault_penalty: 0.1
  dead_penalty: 1.0
  healing_rate: 0.05
recovery_params:
  backup_weight_boost: 1.2
  redistribution_fraction: 0.1
  max_tuning_attempts: 5
  silent_weight_boost: 1.5
  weight_jitter: 0.1
  silent_threshold_factor: 0.8
  hyperactive_threshold_factor: 1.5
snapshot_params:
  weight_visibility_cutoff: 0.05
  num_log_entries: 5
technical_params:
  seed_override: 0
"#;

    serde_yaml::from_str(params_yaml_str).unwrap()
}
