use crate::error::CheckError;
use crate::report::Severity;

/// Absolute free-space floor for `percent` % usage of `total`.
///
/// `((100 - percent) * total) / 100`, so a 90 % threshold on 1000 units
/// leaves a floor of 100 free units.
pub fn threshold_value(percent: f64, total: f64) -> f64 {
    ((100.0 - percent) * total) / 100.0
}

/// Usage ceiling for `percent` % of `quota`.
pub fn usage_limit(percent: f64, quota: f64) -> f64 {
    quota - threshold_value(percent, quota)
}

/// Warning / critical percentages, each within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub warning:  f64,
    pub critical: f64,
}

/// Independently computed warning and critical flags for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    pub warning:  bool,
    pub critical: bool,
}

impl Flags {
    pub fn severity(&self) -> Severity {
        if self.critical { Severity::Critical }
        else if self.warning { Severity::Warning }
        else { Severity::Ok }
    }

    pub fn any(&self) -> bool { self.warning || self.critical }
}

impl Thresholds {
    pub fn new(warning: f64, critical: f64) -> Result<Self, CheckError> {
        for pct in [warning, critical] {
            if !(0.0..=100.0).contains(&pct) {
                return Err(CheckError::InvalidThreshold(pct));
            }
        }
        if warning >= critical {
            tracing::warn!(warning, critical, "warning threshold is not below critical threshold");
        }
        Ok(Self { warning, critical })
    }

    /// (warning floor, critical floor) for a free-space metric.
    pub fn free_floors(&self, total: u64) -> (f64, f64) {
        (threshold_value(self.warning, total as f64), threshold_value(self.critical, total as f64))
    }

    /// (warning ceiling, critical ceiling) for a usage metric.
    pub fn usage_ceilings(&self, quota: u64) -> (f64, f64) {
        (usage_limit(self.warning, quota as f64), usage_limit(self.critical, quota as f64))
    }

    /// Flags free space that dropped below the floors.
    pub fn check_free(&self, free: u64, total: u64) -> Flags {
        let (warn, crit) = self.free_floors(total);
        let free = free as f64;
        Flags { warning: free < warn, critical: free < crit }
    }

    /// Flags usage above the ceilings. A quota of 0 means unlimited and never flags.
    pub fn check_usage(&self, usage: u64, quota: u64) -> Flags {
        if quota == 0 { return Flags::default(); }
        let (warn, crit) = self.usage_ceilings(quota);
        let usage = usage as f64;
        Flags { warning: usage > warn, critical: usage > crit }
    }
}
