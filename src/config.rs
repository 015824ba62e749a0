use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SYSTEM_CONFIG: &str = "/etc/check_spectrum_scale/config.toml";

/// Upper bound for any command timeout, from the CLI or the file.
pub const MAX_COMMAND_TIMEOUT_SEC: u64 = 86_400;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub thresholds: ThresholdConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding mmgetstate, mmlsfileset, mmlspool and mmrepquota
    pub bin_dir: PathBuf,
    /// Seconds before a hanging command is killed
    pub command_timeout_sec: u64,
}

/// Defaults used when `--warning` / `--critical` are not given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub inode_warn_pct: f64,
    pub inode_crit_pct: f64,
    pub pool_warn_pct:  f64,
    pub pool_crit_pct:  f64,
    pub quota_warn_pct: f64,
    pub quota_crit_pct: f64,
    /// Unlinked filesets tolerated before warning
    pub unlinked_warn:  u32,
    /// Unlinked filesets tolerated before going critical
    pub unlinked_crit:  u32,
    /// Node count thresholds have no sensible default; unset = must be passed on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_warn:     Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_crit:     Option<u32>,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { bin_dir: PathBuf::from("/usr/lpp/mmfs/bin"), command_timeout_sec: 30 }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            inode_warn_pct: 90.0,
            inode_crit_pct: 96.0,
            pool_warn_pct:  90.0,
            pool_crit_pct:  96.0,
            quota_warn_pct: 90.0,
            quota_crit_pct: 96.0,
            unlinked_warn:  0,
            unlinked_crit:  1,
            nodes_warn:     None,
            nodes_crit:     None,
        }
    }
}

// ── Load ──────────────────────────────────────────────────────────────

impl Config {
    /// An explicit path must load. Otherwise the first existing file of the
    /// per-user and system locations is used, falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }
        for path in Self::search_paths() {
            if path.is_file() {
                return Ok((Self::from_file(&path)?, Some(path)));
            }
        }
        Ok((Config::default(), None))
    }

    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(2);
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("check_spectrum_scale").join("config.toml"));
        }
        paths.push(PathBuf::from(SYSTEM_CONFIG));
        paths
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.general.command_timeout_sec.clamp(1, MAX_COMMAND_TIMEOUT_SEC))
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
