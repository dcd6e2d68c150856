pub mod fault_detector;
pub mod network;
pub mod params;
pub mod recovery_engine;
pub mod spike_encoder;
pub mod state_snapshot;
pub mod types;

mod health_monitor;
mod neuron;
mod roster;
mod synapse;
mod util;
