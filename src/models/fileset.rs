use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkStatus {
    Linked,
    Unlinked,
    Deleted,
}

impl LinkStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LinkStatus::Linked   => "Linked",
            LinkStatus::Unlinked => "Unlinked",
            LinkStatus::Deleted  => "Deleted",
        }
    }
}

impl FromStr for LinkStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Linked"   => Ok(LinkStatus::Linked),
            "Unlinked" => Ok(LinkStatus::Unlinked),
            "Deleted"  => Ok(LinkStatus::Deleted),
            _          => Err(()),
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One fileset row of `mmlsfileset -L`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fileset {
    pub filesystem:   String,
    pub name:         String,
    pub id:           u32,
    pub status:       LinkStatus,
    pub max_inodes:   u64,   // 0 for dependent filesets sharing their parent's inode space
    pub alloc_inodes: u64,
}

impl Fileset {
    pub fn free_inodes(&self) -> u64 { self.max_inodes.saturating_sub(self.alloc_inodes) }

    pub fn owns_inode_space(&self) -> bool { self.max_inodes > 0 }
}
