use crate::checks::list_line;
use crate::collectors::command::Toolbox;
use crate::collectors::mmlsfileset::read_filesets;
use crate::error::CheckError;
use crate::models::fileset::{Fileset, LinkStatus};
use crate::report::{CheckResult, PerfData, Severity};
use crate::threshold::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilesetMode {
    /// Unlinked filesets against plain counts.
    Link { warning: u32, critical: u32 },
    /// Free inodes of every fileset with its own inode space.
    Inodes(Thresholds),
}

pub fn run(
    toolbox: &Toolbox,
    device:  &str,
    fileset: Option<&str>,
    mode:    FilesetMode,
    long:    bool,
) -> Result<CheckResult, CheckError> {
    let filesets = read_filesets(toolbox, device, fileset)?;
    Ok(match mode {
        FilesetMode::Link { warning, critical } => evaluate_links(&filesets, warning, critical, long),
        FilesetMode::Inodes(thr)                => evaluate_inodes(&filesets, &thr, long),
    })
}

pub fn evaluate_links(filesets: &[Fileset], warning: u32, critical: u32, long: bool) -> CheckResult {
    let names = |status: LinkStatus| -> Vec<&str> {
        filesets.iter().filter(|f| f.status == status).map(|f| f.name.as_str()).collect()
    };
    let linked   = names(LinkStatus::Linked);
    let unlinked = names(LinkStatus::Unlinked);
    let deleted  = names(LinkStatus::Deleted);
    let total    = filesets.len();

    let (severity, summary) = if unlinked.len() > critical as usize {
        (Severity::Critical, format!("{} of {} filesets unlinked (critical above {})", unlinked.len(), total, critical))
    } else if unlinked.len() > warning as usize {
        (Severity::Warning, format!("{} of {} filesets unlinked (warning above {})", unlinked.len(), total, warning))
    } else {
        (Severity::Ok, format!("{}/{} filesets linked", linked.len(), total))
    };

    let max = total as f64;
    let perfdata = vec![
        PerfData::new("linked", linked.len() as f64).range(0.0, max),
        PerfData::new("unlinked", unlinked.len() as f64).thresholds(warning as f64, critical as f64).range(0.0, max),
        PerfData::new("deleted", deleted.len() as f64).range(0.0, max),
    ];

    let mut result = CheckResult::new(severity, summary).with_perfdata(perfdata);
    if long {
        result = result.with_long_output(
            [list_line("Unlinked", &unlinked), list_line("Deleted", &deleted)].into_iter().flatten().collect(),
        );
    }
    result
}

pub fn evaluate_inodes(filesets: &[Fileset], thr: &Thresholds, long: bool) -> CheckResult {
    let mut critical = Vec::new();
    let mut warning  = Vec::new();
    let mut perfdata = Vec::new();
    let mut checked  = 0;

    for fs in filesets.iter().filter(|f| f.owns_inode_space()) {
        checked += 1;
        let flags = thr.check_free(fs.free_inodes(), fs.max_inodes);
        match flags.severity() {
            Severity::Critical => critical.push(fs.name.as_str()),
            Severity::Warning  => warning.push(fs.name.as_str()),
            _ => {}
        }
        let (warn_floor, crit_floor) = thr.free_floors(fs.max_inodes);
        perfdata.push(
            PerfData::new(format!("{}_free_inodes", fs.name), fs.free_inodes() as f64)
                .thresholds(warn_floor, crit_floor)
                .range(0.0, fs.max_inodes as f64),
        );
    }

    let severity = if !critical.is_empty() {
        Severity::Critical
    } else if !warning.is_empty() {
        Severity::Warning
    } else {
        Severity::Ok
    };
    let summary = match severity {
        Severity::Critical => format!(
            "{} critical, {} warning of {} filesets low on free inodes",
            critical.len(), warning.len(), checked
        ),
        Severity::Warning => format!("{} of {} filesets low on free inodes", warning.len(), checked),
        _ => format!("{} filesets have enough free inodes", checked),
    };

    let mut result = CheckResult::new(severity, summary).with_perfdata(perfdata);
    if long {
        result = result.with_long_output(
            [list_line("Critical", &critical), list_line("Warning", &warning)].into_iter().flatten().collect(),
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::mmlsfileset::parse_filesets;

    fn fileset(name: &str, status: LinkStatus, max_inodes: u64, alloc_inodes: u64) -> Fileset {
        Fileset { filesystem: "fs1".into(), name: name.into(), id: 0, status, max_inodes, alloc_inodes }
    }

    #[test]
    fn three_unlinked_above_critical() {
        let mut filesets: Vec<Fileset> = (0..7)
            .map(|i| fileset(&format!("ok{i}"), LinkStatus::Linked, 0, 0))
            .collect();
        filesets.extend((0..3).map(|i| fileset(&format!("gone{i}"), LinkStatus::Unlinked, 0, 0)));

        let r = evaluate_links(&filesets, 1, 2, true);
        assert_eq!(r.severity, Severity::Critical);
        assert_eq!(r.summary, "3 of 10 filesets unlinked (critical above 2)");
        assert_eq!(r.long_output, vec!["Unlinked: gone0, gone1, gone2".to_string()]);
    }

    #[test]
    fn links_from_fixture() {
        let filesets = parse_filesets(include_str!("../collectors/fixtures/mmlsfileset.txt")).unwrap();

        let r = evaluate_links(&filesets, 0, 1, false);
        assert_eq!(r.severity, Severity::Warning);
        assert!(r.long_output.is_empty());

        let r = evaluate_links(&filesets, 1, 2, true);
        assert_eq!(r.render(), "OK - 4/6 filesets linked|linked=4;;;0;6 unlinked=1;1;2;0;6 deleted=1;;;0;6\n\
                                Unlinked: archive\n\
                                Deleted: old");
    }

    #[test]
    fn inodes_from_fixture() {
        let filesets = parse_filesets(include_str!("../collectors/fixtures/mmlsfileset.txt")).unwrap();
        let thr = Thresholds::new(90.0, 96.0).unwrap();

        let r = evaluate_inodes(&filesets, &thr, true);
        assert_eq!(r.severity, Severity::Critical);
        assert_eq!(r.summary, "1 critical, 1 warning of 4 filesets low on free inodes");
        assert_eq!(r.long_output, vec!["Critical: scratch".to_string(), "Warning: projects".to_string()]);
        assert_eq!(r.perfdata.len(), 4);
        assert_eq!(r.perfdata[1].to_string(), "projects_free_inodes=15000;20000;8000;0;200000");
    }

    #[test]
    fn single_critical_fileset_forces_critical() {
        let thr = Thresholds::new(80.0, 90.0).unwrap();
        let mut filesets: Vec<Fileset> = (0..20)
            .map(|i| fileset(&format!("fs{i}"), LinkStatus::Linked, 1000, 10))
            .collect();
        assert_eq!(evaluate_inodes(&filesets, &thr, false).severity, Severity::Ok);
        filesets.push(fileset("full", LinkStatus::Linked, 1000, 999));
        assert_eq!(evaluate_inodes(&filesets, &thr, false).severity, Severity::Critical);
    }

    #[test]
    fn dependent_filesets_are_not_checked() {
        let thr = Thresholds::new(90.0, 96.0).unwrap();
        let filesets = vec![fileset("dep", LinkStatus::Linked, 0, 0)];
        let r = evaluate_inodes(&filesets, &thr, false);
        assert_eq!(r.render(), "OK - 0 filesets have enough free inodes");
    }

    #[test]
    fn runs_mmlsfileset_for_device_and_fileset() {
        use crate::checks::stand_in;

        let listing = include_str!("../collectors/fixtures/mmlsfileset.txt");
        let header  = listing.lines().next().unwrap();
        let scratch = listing.lines().find(|l| l.contains(":scratch:")).unwrap();
        let single  = format!("{}\n{}\n", header, scratch);
        let (_dir, toolbox) = stand_in::install("mmlsfileset", &[
            ("fs1 -L -Y", listing),
            ("fs1 scratch -L -Y", single.as_str()),
        ]);

        let r = run(&toolbox, "fs1", None, FilesetMode::Link { warning: 0, critical: 1 }, true).unwrap();
        assert_eq!(r.severity, Severity::Warning);
        assert_eq!(r.summary, "1 of 6 filesets unlinked (warning above 0)");

        let thr = Thresholds::new(90.0, 96.0).unwrap();
        let r = run(&toolbox, "fs1", Some("scratch"), FilesetMode::Inodes(thr), true).unwrap();
        assert_eq!(r.severity, Severity::Critical);
        assert_eq!(r.summary, "1 critical, 0 warning of 1 filesets low on free inodes");
        assert_eq!(r.long_output, vec!["Critical: scratch".to_string()]);
    }
}
