//! One module per subcommand. Each turns collector output into a single
//! immutable `CheckResult`; `evaluate*` functions are pure, `run` adds the
//! command invocation.

pub mod filesets;
pub mod pools;
pub mod quota;
pub mod status;

/// `"Label: a, b, c"`, or nothing when the list is empty.
fn list_line<S: AsRef<str>>(label: &str, names: &[S]) -> Option<String> {
    if names.is_empty() { return None; }
    let joined: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
    Some(format!("{}: {}", label, joined.join(", ")))
}

/// Fake `mm*` tools for exercising `run` end to end.
#[cfg(test)]
pub(crate) mod stand_in {
    use crate::collectors::command::Toolbox;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Install `tool` into a fresh bin dir. It prints the output paired with
    /// its exact argument list and exits 64 on any other arguments.
    pub fn install(tool: &str, cases: &[(&str, &str)]) -> (TempDir, Toolbox) {
        let dir = tempfile::tempdir().unwrap();
        let mut script = String::from("#!/bin/sh\ncase \"$*\" in\n");
        for (args, output) in cases {
            script.push_str(&format!("  '{}')\n    cat <<'OUT'\n", args));
            script.push_str(output);
            if !output.ends_with('\n') { script.push('\n'); }
            script.push_str("OUT\n    ;;\n");
        }
        script.push_str("  *) echo \"unexpected arguments: $*\" >&2; exit 64 ;;\nesac\n");

        let path = dir.path().join(tool);
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        let toolbox = Toolbox::new(dir.path(), Duration::from_secs(10));
        (dir, toolbox)
    }
}
