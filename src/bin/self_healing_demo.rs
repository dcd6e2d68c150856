use homeostat::{fault_detector::FaultType, network};
use rand::{distributions::Uniform, prelude::Distribution, rngs::StdRng, SeedableRng};

#[path = "../scenario_params.rs"]
mod scenario_params;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let params = scenario_params::get_scenario_params();
    let num_hidden = params.num_hidden;
    let num_backup = params.num_backup;

    println!(
        "Initializing network: inputs={}, hidden={} (+{} backups)",
        params.num_in, num_hidden, num_backup
    );

    let mut network = network::create_network(params).unwrap();

    let mut rng = StdRng::seed_from_u64(0);
    let input_dist = Uniform::new(0.0, 0.8);
    let input: Vec<f32> = (0..network.get_num_in_channels())
        .map(|_| input_dist.sample(&mut rng))
        .collect();

    println!("Step 1: normal operation");
    network.forward(&input, 20, true).unwrap();
    println!("...active neurons: {:?}", network.get_active_nids());

    let target_nid = match network.get_active_nids().first() {
        Some(&nid) => nid,
        None => {
            eprintln!("No active neurons to inject a fault into");
            return;
        }
    };

    println!("Step 2: injecting dead fault into neuron {}", target_nid);
    network
        .inject_fault(target_nid, FaultType::Dead, true)
        .unwrap();

    for batch in 1..=5 {
        println!("...batch {}", batch);
        network.forward(&input, 20, false).unwrap();

        if !network.get_active_nids().contains(&target_nid) {
            println!("...neuron {} is no longer active", target_nid);
            break;
        }
    }

    println!("Post-healing status:");
    println!("...active neurons: {:?}", network.get_active_nids());
    println!("...recovery log: {:?}", network.get_recovery_log());

    let activated_backups: Vec<usize> = network
        .get_active_nids()
        .iter()
        .copied()
        .filter(|nid| (num_hidden..num_hidden + num_backup).contains(nid))
        .collect();

    if activated_backups.is_empty() {
        println!("No backup activated (redistribution used or detection still pending)");
    } else {
        println!("Backup neuron(s) {:?} activated", activated_backups);
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&network.get_state()).unwrap()
    );
}
