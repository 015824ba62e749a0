use crate::collectors::command::Toolbox;
use crate::collectors::table::{Delimiter, Row, Table};
use crate::error::CheckError;
use crate::models::node::NodeSnapshot;

/// Which nodes `mmgetstate` reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    Local,
    Node(&'a str),
    All,
}

/// Run `mmgetstate [-a | -N node] -L -Y` and summarise it.
pub fn read_state(toolbox: &Toolbox, scope: Scope<'_>) -> Result<NodeSnapshot, CheckError> {
    let mut args: Vec<&str> = Vec::new();
    match scope {
        Scope::Local      => {}
        Scope::Node(node) => args.extend(["-N", node]),
        Scope::All        => args.push("-a"),
    }
    args.extend(["-L", "-Y"]);
    parse_state(&toolbox.run("mmgetstate", &args)?)
}

/// Name and state come from the first row. Quorum and node counts come from
/// the first active row, since down nodes report zeros there. Active quorum
/// nodes are counted over all rows.
pub fn parse_state(text: &str) -> Result<NodeSnapshot, CheckError> {
    let table = Table::parse(text, Delimiter::Colon);
    tracing::debug!(rows = table.len(), "parsed mmgetstate");
    let first = table.rows().next().ok_or_else(|| CheckError::CommandFailed {
        command: "mmgetstate".into(),
        reason:  "no node rows in output".into(),
    })?;

    let mut counts: Option<Row<'_>> = None;
    let mut quorum_up = 0;
    for row in table.rows() {
        if row.get("state")? != "active" { continue; }
        if row.get("remarks")?.contains("quorum") { quorum_up += 1; }
        counts.get_or_insert(row);
    }
    let counts = counts.unwrap_or(first);

    Ok(NodeSnapshot {
        name:          first.get("nodeName")?.to_string(),
        state:         first.get("state")?.to_string(),
        quorum_up,
        quorum_needed: counts.parse("quorum")?,
        nodes_up:      counts.parse("nodesUp")?,
        total_nodes:   counts.parse("totalNodes")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_nodes() {
        let snap = parse_state(include_str!("fixtures/mmgetstate_all.txt")).unwrap();
        assert_eq!(snap, NodeSnapshot {
            name:          "gpfs01".into(),
            state:         "active".into(),
            quorum_up:     2,
            quorum_needed: 2,
            nodes_up:      3,
            total_nodes:   4,
        });
        assert!(snap.has_quorum());
    }

    #[test]
    fn local_node() {
        let snap = parse_state(include_str!("fixtures/mmgetstate_local.txt")).unwrap();
        assert_eq!(snap.name, "gpfs01");
        assert!(snap.is_active());
        assert_eq!(snap.nodes_up, 3);
    }

    #[test]
    fn down_node_keeps_its_own_counts() {
        let text = "mmgetstate::HEADER:version:reserved:reserved:nodeName:nodeNumber:state:quorum:nodesUp:totalNodes:remarks:cnfsState:\n\
                    mmgetstate::0:1:::gpfs03:3:down:0:0:4:quorum node:(undefined):\n";
        let snap = parse_state(text).unwrap();
        assert_eq!(snap.state, "down");
        assert_eq!(snap.quorum_up, 0);
        assert!(!snap.has_quorum());
    }

    #[test]
    fn empty_output_is_a_command_failure() {
        let header = "mmgetstate::HEADER:version:reserved:reserved:nodeName:state:\n";
        assert!(matches!(parse_state(header), Err(CheckError::CommandFailed { .. })));
    }

    #[test]
    fn schema_change_is_detected() {
        let text = "mmgetstate::HEADER:version:reserved:reserved:nodeName:nodeNumber:status:\n\
                    mmgetstate::0:1:::gpfs01:1:active:\n";
        assert!(matches!(parse_state(text), Err(CheckError::FieldNotFound(f)) if f == "state"));
    }
}
