use crate::error::CheckError;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
/// Time a child gets between SIGTERM and SIGKILL.
const KILL_GRACE: Duration = Duration::from_secs(1);

/// Runs the cluster administration commands from one directory with a deadline.
#[derive(Debug, Clone)]
pub struct Toolbox {
    bin_dir: PathBuf,
    timeout: Duration,
}

impl Toolbox {
    pub fn new(bin_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { bin_dir: bin_dir.into(), timeout }
    }

    /// Fails with `ToolMissing` before anything is spawned.
    pub fn ensure_installed(&self, tool: &str) -> Result<PathBuf, CheckError> {
        let path = self.bin_dir.join(tool);
        if path.is_file() { Ok(path) } else { Err(CheckError::ToolMissing(path)) }
    }

    /// Run `tool args...` and return its stdout.
    pub fn run(&self, tool: &str, args: &[&str]) -> Result<String, CheckError> {
        let path = self.ensure_installed(tool)?;
        let cmdline = std::iter::once(tool).chain(args.iter().copied()).collect::<Vec<_>>().join(" ");
        let failed = |reason: String| CheckError::CommandFailed { command: cmdline.clone(), reason };

        debug!(command = %cmdline, timeout_secs = self.timeout.as_secs(), "running");
        let started = Instant::now();

        let mut child = Command::new(&path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(e.to_string()))?;

        // Drained on their own threads so a full pipe cannot stall the child.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        // A timeout too large for the clock means no deadline at all.
        let deadline = started.checked_add(self.timeout);
        let status = match wait_until(&mut child, deadline).map_err(|e| failed(e.to_string()))? {
            Some(status) => status,
            None => {
                warn!(command = %cmdline, "timed out, terminating");
                terminate(&mut child);
                return Err(CheckError::CommandTimedOut { command: cmdline.clone(), timeout: self.timeout });
            }
        };

        let out = collect(stdout).map_err(|e| failed(e.to_string()))?;
        let err = collect(stderr).unwrap_or_default();
        debug!(command = %cmdline, %status, bytes = out.len(), elapsed_ms = started.elapsed().as_millis() as u64, "finished");

        if !status.success() {
            let detail = String::from_utf8_lossy(&err);
            let detail = detail.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
            let reason = match status.code() {
                Some(code) if detail.is_empty() => format!("exit status {}", code),
                Some(code) => format!("exit status {}: {}", code, detail),
                None => "terminated by signal".to_string(),
            };
            return Err(failed(reason));
        }

        String::from_utf8(out).map_err(|_| failed("output is not valid UTF-8".to_string()))
    }
}

type Drain = Option<JoinHandle<std::io::Result<Vec<u8>>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    pipe.map(|mut p| thread::spawn(move || {
        let mut buf = Vec::new();
        p.read_to_end(&mut buf).map(|_| buf)
    }))
}

fn collect(handle: Drain) -> std::io::Result<Vec<u8>> {
    match handle {
        Some(h) => h.join().unwrap_or_else(|_| Err(std::io::Error::other("pipe reader panicked"))),
        None    => Ok(Vec::new()),
    }
}

/// `Ok(None)` if the deadline passed first.
fn wait_until(child: &mut Child, deadline: Option<Instant>) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? { return Ok(Some(status)); }
        if deadline.is_some_and(|d| Instant::now() >= d) { return Ok(None); }
        thread::sleep(POLL_INTERVAL);
    }
}

fn terminate(child: &mut Child) {
    let pid = Pid::from_raw(child.id() as i32);
    if kill(pid, Signal::SIGTERM).is_ok() {
        if let Ok(Some(_)) = wait_until(child, Instant::now().checked_add(KILL_GRACE)) { return; }
    }
    let _ = child.kill();
    let _ = child.wait();
}
