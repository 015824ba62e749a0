use crate::checks::list_line;
use crate::collectors::command::Toolbox;
use crate::collectors::mmrepquota::read_quotas;
use crate::error::CheckError;
use crate::models::quota::{PrincipalType, QuotaEntry};
use crate::report::{CheckResult, PerfData, Severity};
use crate::threshold::{Flags, Thresholds};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaFilter {
    pub name: Option<String>,
    pub kind: Option<PrincipalType>,
}

impl QuotaFilter {
    fn matches(&self, entry: &QuotaEntry) -> bool {
        self.name.as_deref().map_or(true, |n| n == entry.name)
            && self.kind.map_or(true, |k| k == entry.kind)
    }
}

pub fn run(
    toolbox: &Toolbox,
    device:  &str,
    filter:  &QuotaFilter,
    thr:     &Thresholds,
    long:    bool,
) -> Result<CheckResult, CheckError> {
    let entries = read_quotas(toolbox, device)?;
    Ok(evaluate(&entries, filter, thr, long))
}

/// A quota entry with its block and file flags.
struct Violation<'a> {
    entry:  &'a QuotaEntry,
    blocks: Flags,
    files:  Flags,
}

pub fn evaluate(entries: &[QuotaEntry], filter: &QuotaFilter, thr: &Thresholds, long: bool) -> CheckResult {
    let violations: Vec<Violation<'_>> = entries.iter()
        .filter(|e| filter.matches(e))
        .map(|entry| Violation {
            entry,
            blocks: thr.check_usage(entry.block_usage, entry.block_quota),
            files:  thr.check_usage(entry.files_usage, entry.files_quota),
        })
        .filter(|v| v.blocks.any() || v.files.any())
        .collect();

    let block_warn = violations.iter().filter(|v| v.blocks.warning && !v.blocks.critical).count();
    let files_warn = violations.iter().filter(|v| v.files.warning && !v.files.critical).count();
    let block_crit = violations.iter().filter(|v| v.blocks.critical).count();
    let files_crit = violations.iter().filter(|v| v.files.critical).count();

    let severity = if block_crit + files_crit > 0 {
        Severity::Critical
    } else if block_warn + files_warn > 0 {
        Severity::Warning
    } else {
        Severity::Ok
    };
    let summary = match (severity, filter.name.as_deref()) {
        (Severity::Ok, Some(name)) => format!("No quota violations for {}", name),
        (Severity::Ok, None)       => "No quota violations".to_string(),
        _ => format!(
            "Quota critical: {} block, {} file; warning: {} block, {} file",
            block_crit, files_crit, block_warn, files_warn
        ),
    };

    let mut perfdata = vec![
        PerfData::new("block_critical", block_crit as f64),
        PerfData::new("file_critical", files_crit as f64),
        PerfData::new("block_warning", block_warn as f64),
        PerfData::new("file_warning", files_warn as f64),
    ];
    for v in &violations {
        let e = v.entry;
        let prefix = format!("{}_{}", e.kind.label().to_lowercase(), e.qualified_name());
        for (metric, usage, quota) in [("blocks", e.block_usage, e.block_quota), ("files", e.files_usage, e.files_quota)] {
            if quota == 0 { continue; }
            let (warn, crit) = thr.usage_ceilings(quota);
            perfdata.push(
                PerfData::new(format!("{}_{}", prefix, metric), usage as f64)
                    .thresholds(warn, crit)
                    .range(0.0, quota as f64),
            );
        }
    }

    let mut result = CheckResult::new(severity, summary).with_perfdata(perfdata);
    if long {
        result = result.with_long_output(detail_lines(&violations));
    }
    result
}

/// One line per (principal type, metric, level) that has offenders.
fn detail_lines(violations: &[Violation<'_>]) -> Vec<String> {
    let mut lines = Vec::new();
    for kind in [PrincipalType::User, PrincipalType::Group] {
        let of_kind: Vec<&Violation<'_>> = violations.iter().filter(|v| v.entry.kind == kind).collect();
        let groups = [
            ("block critical", names_where(&of_kind, |v| v.blocks.critical)),
            ("file critical",  names_where(&of_kind, |v| v.files.critical)),
            ("block warning",  names_where(&of_kind, |v| v.blocks.warning && !v.blocks.critical)),
            ("file warning",   names_where(&of_kind, |v| v.files.warning && !v.files.critical)),
        ];
        for (label, who) in groups {
            lines.extend(list_line(&format!("{} {}", kind.label(), label), &who));
        }
    }
    lines
}

fn names_where<'a>(violations: &[&Violation<'a>], pick: fn(&Violation<'a>) -> bool) -> Vec<String> {
    violations.iter().filter(|v| pick(v)).map(|v| v.entry.qualified_name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::mmrepquota::parse_quotas;

    fn fixture() -> Vec<QuotaEntry> {
        parse_quotas(include_str!("../collectors/fixtures/mmrepquota.txt")).unwrap()
    }

    fn thr() -> Thresholds {
        Thresholds::new(90.0, 96.0).unwrap()
    }

    #[test]
    fn fixture_counts() {
        let r = evaluate(&fixture(), &QuotaFilter::default(), &thr(), true);
        assert_eq!(r.severity, Severity::Critical);
        assert_eq!(r.summary, "Quota critical: 1 block, 1 file; warning: 1 block, 1 file");
        assert_eq!(r.long_output, vec![
            "USR block critical: bob".to_string(),
            "USR file critical: bob".to_string(),
            "USR block warning: alice".to_string(),
            "GRP file warning: staff".to_string(),
        ]);
        assert!(r.perfdata.iter().any(|p| p.to_string() == "usr_alice_blocks=950;900;960;0;1000"));
    }

    #[test]
    fn unlimited_quota_is_never_a_violation() {
        let filter = QuotaFilter { name: Some("nobody".into()), kind: None };
        let r = evaluate(&fixture(), &filter, &thr(), false);
        assert_eq!(r.render(), "OK - No quota violations for nobody|block_critical=0 file_critical=0 block_warning=0 file_warning=0");
    }

    #[test]
    fn filter_by_principal() {
        let filter = QuotaFilter { name: Some("alice".into()), kind: None };
        assert_eq!(evaluate(&fixture(), &filter, &thr(), false).severity, Severity::Warning);

        let filter = QuotaFilter { name: None, kind: Some(PrincipalType::Group) };
        let r = evaluate(&fixture(), &filter, &thr(), false);
        assert_eq!(r.severity, Severity::Warning);
        assert_eq!(r.summary, "Quota critical: 0 block, 0 file; warning: 0 block, 1 file");
    }

    #[test]
    fn one_critical_principal_forces_critical() {
        let ok = |name: &str| QuotaEntry {
            name: name.into(), kind: PrincipalType::User, fileset: None,
            block_usage: 1, block_quota: 1000, files_usage: 1, files_quota: 1000,
        };
        let mut entries: Vec<QuotaEntry> = (0..10).map(|i| ok(&format!("u{i}"))).collect();
        assert_eq!(evaluate(&entries, &QuotaFilter::default(), &thr(), false).severity, Severity::Ok);
        entries.push(QuotaEntry { block_usage: 999, ..ok("full") });
        assert_eq!(evaluate(&entries, &QuotaFilter::default(), &thr(), false).severity, Severity::Critical);
    }

    #[test]
    fn per_fileset_quotas_stay_distinct() {
        let alice = |fileset: &str, block_usage: u64| QuotaEntry {
            name: "alice".into(), kind: PrincipalType::User, fileset: Some(fileset.into()),
            block_usage, block_quota: 1000, files_usage: 1, files_quota: 100,
        };
        let entries = vec![alice("projects", 950), alice("scratch", 990)];
        let r = evaluate(&entries, &QuotaFilter::default(), &thr(), true);
        assert_eq!(r.severity, Severity::Critical);
        let labels: Vec<&str> = r.perfdata.iter()
            .map(|p| p.label.as_str())
            .filter(|l| l.ends_with("_blocks"))
            .collect();
        assert_eq!(labels, ["usr_alice@projects_blocks", "usr_alice@scratch_blocks"]);
        assert_eq!(r.long_output, vec![
            "USR block critical: alice@scratch".to_string(),
            "USR block warning: alice@projects".to_string(),
        ]);

        let filter = QuotaFilter { name: Some("alice".into()), kind: None };
        assert_eq!(evaluate(&entries, &filter, &thr(), false).severity, Severity::Critical);
    }

    #[test]
    fn runs_mmrepquota_for_device() {
        use crate::checks::stand_in;

        let (_dir, toolbox) = stand_in::install("mmrepquota", &[
            ("-Y fs1", include_str!("../collectors/fixtures/mmrepquota.txt")),
        ]);
        let filter = QuotaFilter { name: None, kind: Some(PrincipalType::User) };
        let r = run(&toolbox, "fs1", &filter, &thr(), false).unwrap();
        assert_eq!(r.severity, Severity::Critical);
        assert_eq!(r.summary, "Quota critical: 1 block, 1 file; warning: 1 block, 0 file");
    }
}
