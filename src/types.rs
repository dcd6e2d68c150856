use rustc_hash::FxHashMap;

pub type HashMap<K, V> = FxHashMap<K, V>;

/// Spike raster, indexed `[timestep][channel or nid]`.
pub type SpikeTrain = Vec<Vec<bool>>;
