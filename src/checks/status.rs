use crate::collectors::command::Toolbox;
use crate::collectors::mmgetstate::{read_state, Scope};
use crate::error::CheckError;
use crate::models::node::NodeSnapshot;
use crate::report::{CheckResult, PerfData, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMode {
    /// Enough quorum nodes are active.
    Quorum,
    /// Number of nodes up against plain counts.
    NodeCount { warning: u32, critical: u32 },
    /// The node's GPFS daemon is `active`.
    NodeState,
}

pub fn run(toolbox: &Toolbox, mode: StatusMode, node: Option<&str>) -> Result<CheckResult, CheckError> {
    let scope = node.map_or(Scope::Local, Scope::Node);
    Ok(match mode {
        StatusMode::Quorum => evaluate_quorum(&read_state(toolbox, Scope::All)?),
        StatusMode::NodeCount { warning, critical } => {
            evaluate_node_count(&read_state(toolbox, scope)?, warning, critical)
        }
        StatusMode::NodeState => evaluate_node_state(&read_state(toolbox, scope)?),
    })
}

pub fn evaluate_quorum(snap: &NodeSnapshot) -> CheckResult {
    let (severity, verdict) = if snap.has_quorum() {
        (Severity::Ok, "Quorum reached")
    } else {
        (Severity::Critical, "Quorum not reached")
    };
    let quorum = PerfData { crit: Some(snap.quorum_needed as f64), ..PerfData::new("quorum_up", snap.quorum_up as f64) };
    CheckResult::new(
        severity,
        format!("{}: {} quorum nodes active, {} required", verdict, snap.quorum_up, snap.quorum_needed),
    )
    .with_perfdata(vec![quorum, nodes_up(snap)])
}

pub fn evaluate_node_count(snap: &NodeSnapshot, warning: u32, critical: u32) -> CheckResult {
    let (severity, suffix) = if snap.nodes_up < critical {
        (Severity::Critical, format!(" (critical below {})", critical))
    } else if snap.nodes_up < warning {
        (Severity::Warning, format!(" (warning below {})", warning))
    } else {
        (Severity::Ok, String::new())
    };
    CheckResult::new(severity, format!("{} of {} nodes up{}", snap.nodes_up, snap.total_nodes, suffix))
        .with_perfdata(vec![nodes_up(snap).thresholds(warning as f64, critical as f64)])
}

pub fn evaluate_node_state(snap: &NodeSnapshot) -> CheckResult {
    let severity = if snap.is_active() { Severity::Ok } else { Severity::Critical };
    CheckResult::new(severity, format!("Node {} is {}", snap.name, snap.state))
}

fn nodes_up(snap: &NodeSnapshot) -> PerfData {
    PerfData::new("nodes_up", snap.nodes_up as f64).range(0.0, snap.total_nodes as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(quorum_up: u32, quorum_needed: u32, nodes_up: u32, state: &str) -> NodeSnapshot {
        NodeSnapshot {
            name: "gpfs01".into(),
            state: state.into(),
            quorum_up,
            quorum_needed,
            nodes_up,
            total_nodes: 10,
        }
    }

    #[test]
    fn quorum_below_required_is_critical() {
        let r = evaluate_quorum(&snapshot(2, 3, 8, "active"));
        assert_eq!(r.severity, Severity::Critical);
        assert_eq!(r.summary, "Quorum not reached: 2 quorum nodes active, 3 required");
    }

    #[test]
    fn quorum_equal_to_required_is_ok() {
        let r = evaluate_quorum(&snapshot(3, 3, 8, "active"));
        assert_eq!(r.severity, Severity::Ok);
        assert_eq!(r.render(), "OK - Quorum reached: 3 quorum nodes active, 3 required|quorum_up=3;;3 nodes_up=8;;;0;10");
    }

    #[test]
    fn quorum_ignores_node_thresholds() {
        // 1 of 10 nodes up but quorum of 1 is met
        assert_eq!(evaluate_quorum(&snapshot(1, 1, 1, "active")).severity, Severity::Ok);
    }

    #[test]
    fn node_count_checks_critical_first() {
        assert_eq!(evaluate_node_count(&snapshot(3, 2, 2, "active"), 5, 3).severity, Severity::Critical);
        assert_eq!(evaluate_node_count(&snapshot(3, 2, 4, "active"), 5, 3).severity, Severity::Warning);
        assert_eq!(evaluate_node_count(&snapshot(3, 2, 5, "active"), 5, 3).severity, Severity::Ok);
        let r = evaluate_node_count(&snapshot(3, 2, 2, "active"), 5, 3);
        assert_eq!(r.render(), "CRITICAL - 2 of 10 nodes up (critical below 3)|nodes_up=2;5;3;0;10");
    }

    #[test]
    fn node_state() {
        assert_eq!(evaluate_node_state(&snapshot(3, 2, 8, "active")).severity, Severity::Ok);
        let r = evaluate_node_state(&snapshot(3, 2, 8, "arbitrating"));
        assert_eq!(r.severity, Severity::Critical);
        assert_eq!(r.summary, "Node gpfs01 is arbitrating");
    }

    #[test]
    fn runs_mmgetstate_with_each_scope() {
        use crate::checks::stand_in;

        let all   = include_str!("../collectors/fixtures/mmgetstate_all.txt");
        let local = include_str!("../collectors/fixtures/mmgetstate_local.txt");
        let down  = "mmgetstate::HEADER:version:reserved:reserved:nodeName:nodeNumber:state:quorum:nodesUp:totalNodes:remarks:cnfsState:\n\
                     mmgetstate::0:1:::gpfs03:3:down:0:0:4:quorum node:(undefined):\n";
        let (_dir, toolbox) = stand_in::install("mmgetstate", &[
            ("-a -L -Y", all),
            ("-L -Y", local),
            ("-N gpfs03 -L -Y", down),
        ]);

        let r = run(&toolbox, StatusMode::Quorum, None).unwrap();
        assert_eq!(r.severity, Severity::Ok);
        assert_eq!(r.summary, "Quorum reached: 2 quorum nodes active, 2 required");

        let r = run(&toolbox, StatusMode::NodeCount { warning: 4, critical: 2 }, None).unwrap();
        assert_eq!(r.severity, Severity::Warning);
        assert_eq!(r.summary, "3 of 4 nodes up (warning below 4)");

        let r = run(&toolbox, StatusMode::NodeState, None).unwrap();
        assert_eq!(r.render(), "OK - Node gpfs01 is active");

        let r = run(&toolbox, StatusMode::NodeState, Some("gpfs03")).unwrap();
        assert_eq!(r.render(), "CRITICAL - Node gpfs03 is down");
    }
}
