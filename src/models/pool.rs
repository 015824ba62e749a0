/// Capacity of one side (data or metadata) of a storage pool, in KiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub total_kb: u64,
    pub free_kb:  u64,
}

impl Capacity {
    pub fn used_kb(&self) -> u64 { self.total_kb.saturating_sub(self.free_kb) }

    pub fn use_pct(&self) -> f64 {
        if self.total_kb == 0 { return 0.0; }
        self.used_kb() as f64 / self.total_kb as f64 * 100.0
    }
}

/// One storage pool from `mmlspool`. `data` is set for data pools, `meta`
/// for metadata pools; a pool may be both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    pub name: String,
    pub id:   u64,
    pub data: Option<Capacity>,
    pub meta: Option<Capacity>,
}

impl Pool {
    pub fn is_data_pool(&self) -> bool { self.data.is_some() }
    pub fn is_meta_pool(&self) -> bool { self.meta.is_some() }
}
