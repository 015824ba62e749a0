//! `mmlspool` has no machine-readable mode worth using, so its human output
//! is read by position:
//!
//! ```text
//! Name  Id  BlkSize  Data Meta  TotalData FreeData (pct)  TotalMeta FreeMeta (pct)
//! ```

use crate::collectors::command::Toolbox;
use crate::collectors::table::{Delimiter, Table};
use crate::error::CheckError;
use crate::models::pool::{Capacity, Pool};

const NAME:       usize = 0;
const ID:         usize = 1;
// 2 and 3 are the block size and its unit, e.g. "4 MB"
const HAS_DATA:   usize = 4;
const HAS_META:   usize = 5;
const DATA_TOTAL: usize = 6;
const DATA_FREE:  usize = 7;
const META_TOTAL: usize = 8;
const META_FREE:  usize = 9;

/// Run `mmlspool <device>`.
pub fn read_pools(toolbox: &Toolbox, device: &str) -> Result<Vec<Pool>, CheckError> {
    parse_pools(&toolbox.run("mmlspool", &[device])?)
}

pub fn parse_pools(text: &str) -> Result<Vec<Pool>, CheckError> {
    // Skip the "Storage pools in file system at ..." banner.
    let start = text.lines()
        .position(|l| l.trim_start().starts_with("Name"))
        .ok_or_else(|| CheckError::FieldNotFound("Name".into()))?;
    let body = text.lines().skip(start).collect::<Vec<_>>().join("\n");
    let table = Table::parse(&body, Delimiter::Whitespace);

    let mut pools = Vec::with_capacity(table.len());
    for (n, row) in table.rows().enumerate() {
        // "(  5%)" splits into "(" and "5%)"; "(100%)" stays whole.
        let tokens: Vec<&str> = row.fields().iter()
            .map(String::as_str)
            .filter(|t| !t.starts_with('(') && !t.ends_with("%)"))
            .collect();
        let col = |index: usize| tokens.get(index).copied()
            .ok_or(CheckError::MissingColumn { row: n + 1, index });
        let num = |index: usize, field: &str| -> Result<u64, CheckError> {
            let raw = col(index)?;
            raw.parse().map_err(|_| CheckError::invalid(field, raw))
        };

        let data = if yes_no(col(HAS_DATA)?, "Data")? {
            Some(Capacity { total_kb: num(DATA_TOTAL, "Total Data")?, free_kb: num(DATA_FREE, "Free Data")? })
        } else {
            None
        };
        let meta = if yes_no(col(HAS_META)?, "Meta")? {
            Some(Capacity { total_kb: num(META_TOTAL, "Total Meta")?, free_kb: num(META_FREE, "Free Meta")? })
        } else {
            None
        };

        let pool = Pool { name: col(NAME)?.to_string(), id: num(ID, "Id")?, data, meta };
        tracing::trace!(pool = %pool.name, id = pool.id, data = pool.is_data_pool(), meta = pool.is_meta_pool(), "storage pool");
        pools.push(pool);
    }

    tracing::debug!(count = pools.len(), "parsed pools");
    Ok(pools)
}

fn yes_no(value: &str, field: &str) -> Result<bool, CheckError> {
    match value {
        "yes" => Ok(true),
        "no"  => Ok(false),
        _     => Err(CheckError::invalid(field, value)),
    }
}
