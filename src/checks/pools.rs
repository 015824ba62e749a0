use crate::checks::list_line;
use crate::collectors::command::Toolbox;
use crate::collectors::mmlspool::read_pools;
use crate::error::CheckError;
use crate::models::pool::{Capacity, Pool};
use crate::report::{CheckResult, PerfData, Severity};
use crate::threshold::{Flags, Thresholds};
use crate::util::human::{fmt_kb, fmt_pct};

/// Which side of a pool is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolKind {
    #[default]
    Any,
    DataOnly,
    MetaOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolFilter {
    /// Empty = every pool.
    pub names: Vec<String>,
    pub kind:  PoolKind,
}

impl PoolFilter {
    fn matches(&self, pool: &Pool) -> bool {
        let named = self.names.is_empty() || self.names.iter().any(|n| n == &pool.name);
        let kind = match self.kind {
            PoolKind::Any      => true,
            PoolKind::DataOnly => pool.is_data_pool(),
            PoolKind::MetaOnly => pool.is_meta_pool(),
        };
        named && kind
    }
}

pub fn run(
    toolbox: &Toolbox,
    device:  &str,
    filter:  &PoolFilter,
    thr:     &Thresholds,
    long:    bool,
) -> Result<CheckResult, CheckError> {
    let pools = read_pools(toolbox, device)?;
    Ok(evaluate(&pools, filter, thr, long))
}

#[derive(Default)]
struct Offenders {
    critical_data: Vec<String>,
    warning_data:  Vec<String>,
    critical_meta: Vec<String>,
    warning_meta:  Vec<String>,
}

pub fn evaluate(pools: &[Pool], filter: &PoolFilter, thr: &Thresholds, long: bool) -> CheckResult {
    for name in &filter.names {
        if !pools.iter().any(|p| &p.name == name) {
            tracing::warn!(pool = %name, "requested pool not found");
        }
    }

    let selected: Vec<&Pool> = pools.iter().filter(|p| filter.matches(p)).collect();
    if selected.is_empty() {
        return CheckResult::new(Severity::Unknown, "No storage pool matches the given filter");
    }

    let mut offenders = Offenders::default();
    let mut perfdata  = Vec::new();
    let mut critical  = 0;
    let mut warning   = 0;

    for pool in &selected {
        let mut severities = Vec::with_capacity(2);

        if filter.kind != PoolKind::MetaOnly {
            if let Some(cap) = pool.data {
                let flags = assess(pool, "data", &cap, thr, &mut perfdata);
                record(&flags, describe(pool, &cap), &mut offenders.critical_data, &mut offenders.warning_data);
                severities.push(flags.severity());
            }
        }
        if filter.kind != PoolKind::DataOnly {
            if let Some(cap) = pool.meta {
                let flags = assess(pool, "meta", &cap, thr, &mut perfdata);
                record(&flags, describe(pool, &cap), &mut offenders.critical_meta, &mut offenders.warning_meta);
                severities.push(flags.severity());
            }
        }

        match Severity::aggregate(severities) {
            Severity::Critical => critical += 1,
            Severity::Warning  => warning += 1,
            _ => {}
        }
    }

    let total = selected.len();
    let (severity, summary) = if critical > 0 {
        (Severity::Critical, format!("{} critical, {} warning of {} pools low on free space", critical, warning, total))
    } else if warning > 0 {
        (Severity::Warning, format!("{} of {} pools low on free space", warning, total))
    } else {
        (Severity::Ok, format!("{} pools have enough free space", total))
    };

    let mut result = CheckResult::new(severity, summary).with_perfdata(perfdata);
    if long {
        let lines = [
            list_line("Critical data", &offenders.critical_data),
            list_line("Warning data", &offenders.warning_data),
            list_line("Critical meta", &offenders.critical_meta),
            list_line("Warning meta", &offenders.warning_meta),
        ];
        result = result.with_long_output(lines.into_iter().flatten().collect());
    }
    result
}

fn assess(pool: &Pool, side: &str, cap: &Capacity, thr: &Thresholds, perfdata: &mut Vec<PerfData>) -> Flags {
    let (warn_floor, crit_floor) = thr.free_floors(cap.total_kb);
    perfdata.push(
        PerfData::new(format!("{}_{}_free", pool.name, side), cap.free_kb as f64)
            .thresholds(warn_floor, crit_floor)
            .range(0.0, cap.total_kb as f64),
    );
    thr.check_free(cap.free_kb, cap.total_kb)
}

fn record(flags: &Flags, entry: String, critical: &mut Vec<String>, warning: &mut Vec<String>) {
    if flags.critical { critical.push(entry); }
    else if flags.warning { warning.push(entry); }
}

fn describe(pool: &Pool, cap: &Capacity) -> String {
    format!("{} ({} used, {} free of {})", pool.name, fmt_pct(cap.use_pct()), fmt_kb(cap.free_kb), fmt_kb(cap.total_kb))
}
