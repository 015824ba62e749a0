use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrincipalType {
    User,
    Group,
}

impl PrincipalType {
    /// Parse the `quotaType` column; FILESET and unknown kinds yield None.
    pub fn from_quota_type(s: &str) -> Option<Self> {
        match s {
            "USR" => Some(PrincipalType::User),
            "GRP" => Some(PrincipalType::Group),
            _     => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrincipalType::User  => "USR",
            PrincipalType::Group => "GRP",
        }
    }
}

impl fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One user or group row of `mmrepquota`. A quota of 0 means unlimited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaEntry {
    pub name:        String,
    pub kind:        PrincipalType,
    /// Set for per-fileset quotas, where a principal has one row per fileset
    pub fileset:     Option<String>,
    pub block_usage: u64,
    pub block_quota: u64,
    pub files_usage: u64,
    pub files_quota: u64,
}

impl QuotaEntry {
    /// `name`, or `name@fileset` for a per-fileset quota.
    pub fn qualified_name(&self) -> String {
        match &self.fileset {
            Some(fileset) => format!("{}@{}", self.name, fileset),
            None          => self.name.clone(),
        }
    }
}
