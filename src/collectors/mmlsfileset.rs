use crate::collectors::command::Toolbox;
use crate::collectors::table::{Delimiter, Table};
use crate::error::CheckError;
use crate::models::fileset::{Fileset, LinkStatus};

/// Run `mmlsfileset <device> [<fileset>] -L -Y`.
pub fn read_filesets(toolbox: &Toolbox, device: &str, fileset: Option<&str>) -> Result<Vec<Fileset>, CheckError> {
    let mut args = vec![device];
    args.extend(fileset);
    args.extend(["-L", "-Y"]);
    parse_filesets(&toolbox.run("mmlsfileset", &args)?)
}

pub fn parse_filesets(text: &str) -> Result<Vec<Fileset>, CheckError> {
    let table = Table::parse(text, Delimiter::Colon);
    let mut filesets = Vec::with_capacity(table.len());

    for row in table.rows() {
        let status = row.get("status")?;
        filesets.push(Fileset {
            filesystem:   row.get("filesystemName")?.to_string(),
            name:         row.get("filesetName")?.to_string(),
            id:           row.parse("id")?,
            status:       status.parse().map_err(|_| CheckError::invalid("status", status))?,
            max_inodes:   row.parse("maxInodes")?,
            alloc_inodes: row.parse("allocInodes")?,
        });
    }

    for f in &filesets {
        tracing::trace!(filesystem = %f.filesystem, fileset = %f.name, id = f.id, status = %f.status, "fileset");
    }
    tracing::debug!(count = filesets.len(), "parsed filesets");
    Ok(filesets)
}
