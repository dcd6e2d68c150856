use float_cmp::assert_approx_eq;
use homeostat::{
    fault_detector::FaultType,
    network::{create_network, Network},
    params::{EncodingMode, NetworkParams},
    spike_encoder::SpikeEncoder,
    state_snapshot::UnitStatus,
};
use rand::{rngs::StdRng, SeedableRng};
use itertools::{assert_equal, Itertools};

const NUM_IN: usize = 10;

fn make_network(num_hidden: usize, num_backup: usize) -> Network {
    let mut params = NetworkParams::with_dimensions(NUM_IN, num_hidden, 2, num_backup);
    params.technical_params.seed_override = Some(0);
    create_network(params).unwrap()
}

fn run_quiet(network: &mut Network, num_ticks: usize) {
    network.forward(&[0.0; NUM_IN], num_ticks, false).unwrap();
}

/// Runs until the unit has been through detection and a full healing countdown.
fn heal_dead(network: &mut Network, nid: usize) {
    network.inject_fault(nid, FaultType::Dead, true).unwrap();
    run_quiet(network, 21);
    assert_eq!(network.get_healing_progress(nid), None);
}

fn assert_weights_in_unit_interval(network: &Network) {
    for nid in 0..network.get_num_units() {
        for weight in network.get_input_weights(nid) {
            assert!((0.0..=1.0).contains(&weight), "weight out of range: {}", weight);
        }
    }
}

#[test]
fn dead_unit_replaced_by_backup() {
    let mut network = make_network(5, 2);
    network.forward(&[0.4; NUM_IN], 30, false).unwrap();

    let weights_before = network.get_input_weights(0);

    heal_dead(&mut network, 0);

    assert!(!network.is_active(0));
    assert!(!network.get_active_nids().contains(&0));

    let active_backups = [5, 6]
        .into_iter()
        .filter(|&nid| network.is_active(nid))
        .collect_vec();
    assert_eq!(active_backups.len(), 1);

    let backup_nid = active_backups[0];
    assert!(network.get_active_nids().contains(&backup_nid));

    for (backup_weight, weight_before) in network
        .get_input_weights(backup_nid)
        .iter()
        .zip(&weights_before)
    {
        assert_approx_eq!(f32, *backup_weight, weight_before * 1.2);
    }

    assert_eq!(network.get_recovery_log().len(), 1);
}

#[test]
fn dead_unit_redistributed_when_backups_exhausted() {
    let mut network = make_network(5, 2);

    heal_dead(&mut network, 1);
    heal_dead(&mut network, 2);

    assert!(network.is_active(5));
    assert!(network.is_active(6));
    assert!(network.get_spare_nids().is_empty());

    let others = network
        .get_active_nids()
        .iter()
        .copied()
        .filter(|&nid| nid != 3)
        .collect_vec();
    let scar_tissue_before = others
        .iter()
        .map(|&nid| network.get_scar_tissue(nid))
        .collect_vec();
    let dead_weights = network.get_input_weights(3);
    let recipient_weights_before = network.get_input_weights(0);

    heal_dead(&mut network, 3);

    assert!(!network.get_active_nids().contains(&3));
    assert!(!network.is_active(3));
    assert_equal(others.iter().copied(), network.get_active_nids().iter().copied());

    for (nid, scar_tissue) in others.iter().zip(scar_tissue_before) {
        assert_eq!(network.get_scar_tissue(*nid), scar_tissue + 1);
    }

    assert_eq!(network.get_scar_tissue(3), 0);

    for ((weight, weight_before), dead_weight) in network
        .get_input_weights(0)
        .iter()
        .zip(&recipient_weights_before)
        .zip(&dead_weights)
    {
        assert_approx_eq!(f32, *weight, (weight_before + 0.1 * dead_weight).min(1.0));
    }

    assert_weights_in_unit_interval(&network);
    assert!(network
        .get_recovery_log()
        .last()
        .unwrap()
        .starts_with("No backups available"));
}

#[test]
fn dead_unit_without_any_backups() {
    let mut network = make_network(3, 0);

    heal_dead(&mut network, 0);

    assert_equal(network.get_active_nids().iter().copied(), [1, 2]);
    assert_eq!(network.get_scar_tissue(1), 1);
    assert_eq!(network.get_scar_tissue(2), 1);
}

#[test]
fn silent_unit_detected_and_tuned() {
    let mut network = make_network(5, 2);
    network.inject_fault(2, FaultType::Silent, false).unwrap();

    run_quiet(&mut network, 149);
    assert_eq!(network.detect_fault(2), FaultType::Healthy);

    run_quiet(&mut network, 1);
    assert_eq!(network.detect_fault(2), FaultType::Silent);

    let threshold_before = network.get_threshold(2);
    let weights_before = network.get_input_weights(2);

    run_quiet(&mut network, 25);

    assert!(network.get_threshold(2) < threshold_before);
    assert_approx_eq!(f32, network.get_threshold(2), threshold_before * 0.8);

    for (weight, weight_before) in network.get_input_weights(2).iter().zip(&weights_before) {
        assert!(weight > weight_before);
    }

    assert_eq!(network.get_tuning_attempts(2), 1);
    assert_approx_eq!(f64, network.get_health_score(2), 1.0);
    assert!(network.is_active(2));
    assert!(network.get_active_nids().contains(&2));
}

#[test]
fn silent_tuning_circuit_breaker() {
    let mut network = make_network(5, 2);

    // one detection and healing cycle takes 172 ticks without input
    run_quiet(&mut network, 1100);

    assert_eq!(network.get_tuning_attempts(0), 5);
    assert_approx_eq!(
        f32,
        network.get_threshold(0),
        0.8f32.powi(5),
        epsilon = 1e-6
    );

    let exhausted_entries = network
        .get_recovery_log()
        .iter()
        .filter(|entry| entry.as_str() == "Max tuning reached for neuron 0. Ignoring.")
        .count();
    assert_eq!(exhausted_entries, 1);
}

#[test]
fn hyperactive_unit_threshold_raised() {
    let mut network = make_network(5, 2);
    network.inject_fault(4, FaultType::Hyperactive, false).unwrap();

    network.forward(&[0.5; NUM_IN], 150, false).unwrap();
    assert_eq!(network.detect_fault(4), FaultType::Hyperactive);

    network.forward(&[0.5; NUM_IN], 25, false).unwrap();

    assert_approx_eq!(f32, network.get_threshold(4), 0.01 * 1.5);
    assert!(network
        .get_recovery_log()
        .contains(&"Raised threshold for hyperactive neuron 4".to_string()));
}

#[test]
fn score_frozen_while_healing() {
    let mut network = make_network(5, 2);
    network.inject_fault(1, FaultType::Silent, false).unwrap();

    let mut frozen_score = None;

    for _ in 0..175 {
        run_quiet(&mut network, 1);

        if network.get_healing_progress(1).is_some() {
            let score = network.get_health_score(1);
            // healing starts on the first tick the score drops below the threshold
            assert!(score < 0.8);
            assert!(score > 0.6);

            match frozen_score {
                Some(frozen_score) => assert_eq!(score, frozen_score),
                None => frozen_score = Some(score),
            }
        }
    }

    assert!(frozen_score.is_some());
}

#[test]
fn inactive_unit_is_frozen() {
    let mut network = make_network(5, 2);
    network.forward(&[0.3; NUM_IN], 7, false).unwrap();

    network.inject_fault(0, FaultType::Dead, false).unwrap();
    let potential = network.get_potential(0);
    let threshold = network.get_threshold(0);

    let spike_train = network.forward(&[1.0; NUM_IN], 40, true).unwrap();

    assert!(spike_train.iter().all(|step| !step[0]));
    assert_eq!(network.get_potential(0), potential);
    assert_eq!(network.get_threshold(0), threshold);
}

#[test]
fn weights_stay_in_unit_interval_under_learning() {
    let mut network = make_network(5, 2);

    for value in [1.0, 0.2, 0.8, 0.0, 0.6] {
        network.forward(&[value; NUM_IN], 100, true).unwrap();
        assert_weights_in_unit_interval(&network);
    }
}

#[test]
fn snapshot_reports_healing() {
    let mut network = make_network(5, 2);
    network.inject_fault(3, FaultType::Dead, true).unwrap();
    run_quiet(&mut network, 5);

    let snapshot = network.get_state();
    let neuron_state = &snapshot.neuron_states[3];

    assert!(neuron_state.is_healing);
    assert!(!neuron_state.is_active);
    assert_eq!(neuron_state.status, UnitStatus::Dead);
    assert_approx_eq!(f64, neuron_state.healing_progress, 0.2, epsilon = 1e-9);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["neuron_states"][3]["status"], "Dead");
    assert_eq!(json["neuron_states"][0]["status"], "Healthy");
    assert_eq!(json["active_nids"].as_array().unwrap().len(), 5);
    assert_eq!(json["t"], 5);
}

#[test]
fn reset_rebuilds_with_same_dimensions() {
    let mut network = make_network(5, 2);
    heal_dead(&mut network, 0);

    network.reset().unwrap();

    assert_eq!(network.get_num_units(), 7);
    assert_equal(network.get_active_nids().iter().copied(), 0..5);
    assert_equal(network.get_spare_nids().iter().copied(), [5, 6]);
    assert!(network.get_recovery_log().is_empty());
}

#[test]
fn fault_type_from_transport_name() {
    let mut network = make_network(5, 2);

    let fault_type = "Hyperactive".parse::<FaultType>().unwrap();
    network.inject_fault(0, fault_type, true).unwrap();
    assert_approx_eq!(f32, network.get_threshold(0), 0.01);

    assert!("Broken".parse::<FaultType>().is_err());
}

#[test]
fn repair_restores_unit_in_service() {
    let mut network = make_network(5, 2);
    network.forward(&[0.4; NUM_IN], 10, false).unwrap();

    network.inject_fault(2, FaultType::Silent, true).unwrap();
    assert_eq!(network.get_threshold(2), 999.0);

    network.repair(2).unwrap();

    assert_eq!(network.get_threshold(2), 1.0);
    assert!(network.is_active(2));
    assert!(network.get_active_nids().contains(&2));
    assert_approx_eq!(f64, network.get_health_score(2), 1.0);
}

#[test]
fn repair_of_retired_unit_rejected() {
    let mut network = make_network(5, 2);
    heal_dead(&mut network, 0);

    let active_nids = network.get_active_nids().to_vec();
    let threshold = network.get_threshold(0);

    assert!(network.repair(0).is_err());

    assert!(!network.is_active(0));
    assert_eq!(network.get_threshold(0), threshold);
    assert_equal(network.get_active_nids().iter(), active_nids.iter());
}

#[test]
fn temporal_forward_fires_each_channel_once() {
    let mut params = NetworkParams::with_dimensions(NUM_IN, 5, 2, 2);
    params.encoding = EncodingMode::Temporal;
    params.technical_params.seed_override = Some(0);
    let mut network = create_network(params).unwrap();

    let time_steps = 20;
    let input: Vec<f32> = (0..NUM_IN).map(|idx| idx as f32 / NUM_IN as f32).collect();

    let encoder = SpikeEncoder::new(time_steps, EncodingMode::Temporal);
    let in_spike_train = encoder.encode(&input, &mut StdRng::seed_from_u64(0));
    assert_eq!(in_spike_train.len(), time_steps);
    for channel in 0..NUM_IN {
        assert_eq!(in_spike_train.iter().filter(|step| step[channel]).count(), 1);
    }

    // all channels fire together on the first tick and drive every unit over threshold
    let spike_train = network.forward(&[1.0; NUM_IN], time_steps, false).unwrap();
    assert_eq!(spike_train.len(), time_steps);

    for &nid in network.get_active_nids() {
        assert!(spike_train[0][nid]);
        assert!(spike_train[1..].iter().all(|step| !step[nid]));
    }

    // with zero input all channels fire on the last tick
    let spike_train = network.forward(&[0.0; NUM_IN], time_steps, false).unwrap();

    for &nid in network.get_active_nids() {
        assert!(spike_train[..time_steps - 1].iter().all(|step| !step[nid]));
        assert!(spike_train[time_steps - 1][nid]);
    }
}
