use std::time::Instant;

use homeostat::{fault_detector::FaultType, network};
use rand::{
    distributions::Uniform, prelude::Distribution, rngs::StdRng, seq::SliceRandom, SeedableRng,
};
use statrs::distribution::Exp;

#[path = "../scenario_params.rs"]
mod scenario_params;

const FAULT_TYPES: [FaultType; 3] = [FaultType::Dead, FaultType::Silent, FaultType::Hyperactive];

fn main() {
    env_logger::init();

    let mut params = scenario_params::get_scenario_params();
    params.num_in = 100;
    params.num_hidden = 200;
    params.num_backup = 20;

    let mut network = network::create_network(params).unwrap();

    let mut rng = StdRng::seed_from_u64(0);
    let input_dist = Uniform::new(0.0, 0.3);
    let fault_interval_dist = Exp::new(1.0 / 250.0).unwrap();

    let mut next_fault_t = fault_interval_dist.sample(&mut rng) as usize;
    let mut injected_count = 0usize;
    let mut spike_count = 0usize;
    let t_stop = 20000;
    let batch_size = 50;

    let wall_start = Instant::now();

    while network.get_tick_period() < t_stop {
        while next_fault_t <= network.get_tick_period() {
            if let Some(&nid) = network.get_active_nids().choose(&mut rng) {
                let fault_type = *FAULT_TYPES.choose(&mut rng).unwrap();
                network.queue_fault_injection(nid, fault_type).unwrap();
                injected_count += 1;
            }
            next_fault_t += 1 + fault_interval_dist.sample(&mut rng) as usize;
        }

        let input: Vec<f32> = (0..network.get_num_in_channels())
            .map(|_| input_dist.sample(&mut rng))
            .collect();

        let spike_train = network.forward(&input, batch_size, true).unwrap();

        spike_count += spike_train
            .iter()
            .map(|step| step.iter().filter(|&&spiked| spiked).count())
            .sum::<usize>();
    }

    let wall_time = wall_start.elapsed();
    let snapshot = network.get_state();
    let log = network.get_recovery_log();

    let count_actions = |prefix: &str| log.iter().filter(|entry| entry.starts_with(prefix)).count();

    eprintln!("Ticks: {}", network.get_tick_period());
    eprintln!("Faults injected: {}", injected_count);
    eprintln!("Backup replacements: {}", count_actions("Replaced"));
    eprintln!("Redistributions: {}", count_actions("No backups"));
    eprintln!("Tunings: {}", count_actions("Boosted"));
    eprintln!("Exhausted tunings: {}", count_actions("Max tuning"));
    eprintln!("Active units: {}", snapshot.active_nids.len());
    eprintln!(
        "Max scar tissue: {}",
        snapshot
            .neuron_states
            .iter()
            .map(|neuron_state| neuron_state.scar_tissue)
            .max()
            .unwrap_or(0)
    );
    eprintln!("Spikes per tick: {}", spike_count as f64 / t_stop as f64);
    eprintln!(
        "Throughput: {:.3e} ticks per second",
        network.get_tick_period() as f64 / wall_time.as_secs_f64()
    );
}
