use std::ops::Range;

/// Registry of which units take part in the simulation.
#[derive(Debug, Clone)]
pub struct Roster {
    active_nids: Vec<usize>,
    spare_nids: Vec<usize>,
    scar_tissue: Vec<usize>,
    backup_range: Range<usize>,
}

impl Roster {
    pub fn new(num_hidden: usize, num_backup: usize) -> Self {
        let backup_range = num_hidden..num_hidden + num_backup;

        Self {
            active_nids: (0..num_hidden).collect(),
            spare_nids: backup_range.clone().collect(),
            scar_tissue: vec![0; num_hidden + num_backup],
            backup_range,
        }
    }

    pub fn get_active_nids(&self) -> &[usize] {
        &self.active_nids
    }

    pub fn get_spare_nids(&self) -> &[usize] {
        &self.spare_nids
    }

    pub fn is_registered(&self, nid: usize) -> bool {
        self.active_nids.contains(&nid)
    }

    pub fn is_backup(&self, nid: usize) -> bool {
        self.backup_range.contains(&nid)
    }

    pub fn get_scar_tissue(&self, nid: usize) -> usize {
        self.scar_tissue[nid]
    }

    /// First spare satisfying `is_available`, without drawing it yet.
    pub fn find_spare(&self, mut is_available: impl FnMut(usize) -> bool) -> Option<usize> {
        self.spare_nids
            .iter()
            .copied()
            .find(|&nid| is_available(nid))
    }

    pub fn promote_backup(&mut self, retired_nid: usize, backup_nid: usize) {
        self.spare_nids.retain(|&nid| nid != backup_nid);
        self.retire(retired_nid);

        if !self.active_nids.contains(&backup_nid) {
            self.active_nids.push(backup_nid);
        }
    }

    pub fn retire(&mut self, nid: usize) {
        self.active_nids.retain(|&active_nid| active_nid != nid);
    }

    pub fn record_absorption(&mut self, nid: usize) {
        self.scar_tissue[nid] += 1;
    }
}
