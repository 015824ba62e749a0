use crate::collectors::command::Toolbox;
use crate::collectors::table::{Delimiter, Table};
use crate::error::CheckError;
use crate::models::quota::{PrincipalType, QuotaEntry};

/// Run `mmrepquota -Y <device>`.
pub fn read_quotas(toolbox: &Toolbox, device: &str) -> Result<Vec<QuotaEntry>, CheckError> {
    parse_quotas(&toolbox.run("mmrepquota", &["-Y", device])?)
}

/// User and group rows only; fileset quotas have no principal.
pub fn parse_quotas(text: &str) -> Result<Vec<QuotaEntry>, CheckError> {
    let table = Table::parse(text, Delimiter::Colon);
    let mut entries = Vec::with_capacity(table.len());
    // Absent before per-fileset quotas existed.
    let fileset_column = table.column("filesetname").ok();

    for row in table.rows() {
        let Some(kind) = PrincipalType::from_quota_type(row.get("quotaType")?) else { continue };
        entries.push(QuotaEntry {
            name:        row.get("name")?.to_string(),
            kind,
            fileset:     match fileset_column {
                Some(index) => Some(row.at(index)?).filter(|f| !f.is_empty()).map(str::to_string),
                None        => None,
            },
            block_usage: row.parse("blockUsage")?,
            block_quota: row.parse("blockQuota")?,
            files_usage: row.parse("filesUsage")?,
            files_quota: row.parse("filesQuota")?,
        });
    }

    tracing::debug!(count = entries.len(), "parsed quota entries");
    Ok(entries)
}
