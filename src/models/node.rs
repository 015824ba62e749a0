/// One `mmgetstate` view of the cluster from a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSnapshot {
    pub name:          String,
    pub state:         String,   // "active", "arbitrating", "down", ...
    pub quorum_up:     u32,      // active quorum nodes among the listed rows
    pub quorum_needed: u32,
    pub nodes_up:      u32,
    pub total_nodes:   u32,
}

impl NodeSnapshot {
    pub fn is_active(&self) -> bool { self.state == "active" }

    pub fn has_quorum(&self) -> bool {
        self.quorum_up > 0 && self.quorum_up >= self.quorum_needed
    }
}
