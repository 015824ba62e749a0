mod checks;
mod collectors;
mod config;
mod error;
mod models;
mod report;
mod threshold;
mod util;

use anyhow::Result;
use checks::{filesets, pools, quota, status};
use clap::{error::ErrorKind, ArgGroup, Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use collectors::command::Toolbox;
use config::Config;
use error::CheckError;
use models::quota::PrincipalType;
use report::{CheckResult, Severity};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use threshold::Thresholds;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "check_spectrum_scale",
    about = "Nagios/Icinga plugin for IBM Spectrum Scale (GPFS) clusters",
    version
)]
struct Cli {
    /// Configuration file (default: per-user, then /etc/check_spectrum_scale/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seconds before an external command is killed
    #[arg(long, global = true, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=config::MAX_COMMAND_TIMEOUT_SEC))]
    timeout: Option<u64>,

    /// Log more to stderr (-v info, -vv debug, -vvv trace); RUST_LOG wins if set
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Daemon state, node count or cluster quorum (mmgetstate)
    Status(StatusArgs),
    /// Fileset link state or free inodes (mmlsfileset)
    Filesets(FilesetArgs),
    /// Free data and metadata space per storage pool (mmlspool)
    Pools(PoolArgs),
    /// User and group quota violations (mmrepquota)
    Quota(QuotaArgs),
    /// Print the effective configuration and where it was loaded from
    Config,
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("mode").args(["quorum", "nodes", "node_state"])))]
struct StatusArgs {
    /// CRITICAL unless enough quorum nodes are active
    #[arg(long)]
    quorum: bool,

    /// Compare the number of nodes up against -w / -c
    #[arg(long)]
    nodes: bool,

    /// CRITICAL unless the GPFS daemon is active
    #[arg(long)]
    node_state: bool,

    /// WARNING when fewer nodes are up
    #[arg(short, long, value_name = "COUNT", requires = "nodes")]
    warning: Option<u32>,

    /// CRITICAL when fewer nodes are up
    #[arg(short, long, value_name = "COUNT", requires = "nodes")]
    critical: Option<u32>,

    /// Ask about this node instead of the local one
    #[arg(short = 'N', long, value_name = "NODE", conflicts_with = "quorum")]
    node: Option<String>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("mode").args(["link", "inodes"])))]
struct FilesetArgs {
    /// File system device name
    #[arg(short, long)]
    device: String,

    /// Count unlinked filesets
    #[arg(long)]
    link: bool,

    /// Check free inodes of every independent fileset
    #[arg(long)]
    inodes: bool,

    /// Warning threshold (percent for --inodes, unlinked count for --link)
    #[arg(short, long)]
    warning: Option<f64>,

    /// Critical threshold (percent for --inodes, unlinked count for --link)
    #[arg(short, long)]
    critical: Option<f64>,

    /// Only this fileset
    #[arg(long, value_name = "NAME")]
    fileset: Option<String>,

    /// List offending filesets
    #[arg(short = 'L', long)]
    long: bool,
}

#[derive(Args, Debug)]
struct PoolArgs {
    /// File system device name
    #[arg(short, long)]
    device: String,

    /// Warning threshold in percent used
    #[arg(short, long)]
    warning: Option<f64>,

    /// Critical threshold in percent used
    #[arg(short, long)]
    critical: Option<f64>,

    /// Only these pools (comma separated)
    #[arg(long, value_delimiter = ',', value_name = "POOL,...")]
    pools: Vec<String>,

    /// Only metadata pools, metadata capacity only
    #[arg(long, conflicts_with = "data_only")]
    meta_only: bool,

    /// Only data pools, data capacity only
    #[arg(long)]
    data_only: bool,

    /// List offending pools
    #[arg(short = 'L', long)]
    long: bool,
}

#[derive(Args, Debug)]
struct QuotaArgs {
    /// File system device name
    #[arg(short, long)]
    device: String,

    /// Warning threshold in percent of the quota
    #[arg(short, long)]
    warning: Option<f64>,

    /// Critical threshold in percent of the quota
    #[arg(short, long)]
    critical: Option<f64>,

    /// Only this user or group
    #[arg(long, value_name = "PRINCIPAL")]
    name: Option<String>,

    /// Only users or only groups
    #[arg(long = "type", value_enum, value_name = "TYPE")]
    kind: Option<QuotaType>,

    /// List offending users and groups
    #[arg(short = 'L', long)]
    long: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum QuotaType {
    Usr,
    Grp,
}

impl From<QuotaType> for PrincipalType {
    fn from(t: QuotaType) -> Self {
        match t {
            QuotaType::Usr => PrincipalType::User,
            QuotaType::Grp => PrincipalType::Group,
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => CheckResult::new(Severity::Unknown, usage_error(&e)).print_and_exit(),
    };
    init_logging(cli.verbose);

    let Cli { config, timeout, command, .. } = cli;
    match command {
        Commands::Config => {
            if let Err(e) = run_print_config(config.as_deref()) {
                eprintln!("error: {:#}", e);
                std::process::exit(Severity::Unknown.exit_code());
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "check_spectrum_scale", &mut io::stdout());
        }
        check => {
            run_check(config.as_deref(), timeout, check)
                .unwrap_or_else(|e| CheckResult::from_error(&e))
                .print_and_exit();
        }
    }
}

/// First paragraph of a clap error on one line, without its `error: ` prefix.
fn usage_error(e: &clap::Error) -> String {
    let text = e.to_string();
    let joined = text.lines()
        .take_while(|l| !l.trim().is_empty())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ");
    match joined.strip_prefix("error: ") {
        Some(rest) => rest.to_string(),
        None if joined.is_empty() => "invalid arguments".to_string(),
        None => joined,
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run_check(config_path: Option<&Path>, timeout: Option<u64>, command: Commands) -> Result<CheckResult, CheckError> {
    let (cfg, loaded_from) = Config::load(config_path).map_err(CheckError::Config)?;
    match &loaded_from {
        Some(path) => tracing::debug!(path = %path.display(), "configuration loaded"),
        None       => tracing::debug!("no configuration file, using defaults"),
    }
    let timeout = timeout.map(Duration::from_secs).unwrap_or_else(|| cfg.command_timeout());
    let toolbox = Toolbox::new(cfg.general.bin_dir.clone(), timeout);
    let t = &cfg.thresholds;

    match command {
        Commands::Status(args) => {
            let mode = if args.quorum {
                status::StatusMode::Quorum
            } else if args.nodes {
                let warning = args.warning.or(t.nodes_warn);
                let critical = args.critical.or(t.nodes_crit);
                match (warning, critical) {
                    (Some(warning), Some(critical)) => status::StatusMode::NodeCount { warning, critical },
                    _ => return Err(CheckError::NoParameters("--nodes needs -w and -c".into())),
                }
            } else if args.node_state {
                status::StatusMode::NodeState
            } else {
                return Err(CheckError::NoParameters("status needs --quorum, --nodes or --node-state".into()));
            };
            status::run(&toolbox, mode, args.node.as_deref())
        }
        Commands::Filesets(args) => {
            let mode = if args.link {
                filesets::FilesetMode::Link {
                    warning:  count_threshold("warning", args.warning, t.unlinked_warn)?,
                    critical: count_threshold("critical", args.critical, t.unlinked_crit)?,
                }
            } else if args.inodes {
                filesets::FilesetMode::Inodes(Thresholds::new(
                    args.warning.unwrap_or(t.inode_warn_pct),
                    args.critical.unwrap_or(t.inode_crit_pct),
                )?)
            } else {
                return Err(CheckError::NoParameters("filesets needs --link or --inodes".into()));
            };
            filesets::run(&toolbox, &args.device, args.fileset.as_deref(), mode, args.long)
        }
        Commands::Pools(args) => {
            let thr = Thresholds::new(
                args.warning.unwrap_or(t.pool_warn_pct),
                args.critical.unwrap_or(t.pool_crit_pct),
            )?;
            let kind = match (args.meta_only, args.data_only) {
                (true, _) => pools::PoolKind::MetaOnly,
                (_, true) => pools::PoolKind::DataOnly,
                _         => pools::PoolKind::Any,
            };
            let filter = pools::PoolFilter { names: args.pools, kind };
            pools::run(&toolbox, &args.device, &filter, &thr, args.long)
        }
        Commands::Quota(args) => {
            let thr = Thresholds::new(
                args.warning.unwrap_or(t.quota_warn_pct),
                args.critical.unwrap_or(t.quota_crit_pct),
            )?;
            let filter = quota::QuotaFilter { name: args.name, kind: args.kind.map(PrincipalType::from) };
            quota::run(&toolbox, &args.device, &filter, &thr, args.long)
        }
        Commands::Config | Commands::Completions { .. } => {
            Err(CheckError::NoParameters("not a check".into()))
        }
    }
}

/// Count thresholds share `-w`/`-c` with the percent modes, so they arrive as
/// floats and must be whole and non-negative.
fn count_threshold(field: &str, value: Option<f64>, default: u32) -> Result<u32, CheckError> {
    match value {
        None => Ok(default),
        Some(v) if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => Ok(v as u32),
        Some(v) => Err(CheckError::invalid(field, &v.to_string())),
    }
}

fn run_print_config(explicit: Option<&Path>) -> Result<()> {
    let (cfg, path) = Config::load(explicit)?;
    let source = path
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(none, built-in defaults)".to_string());
    println!("# Config: {}", source);
    println!("# Searched: {}", Config::search_paths()
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(", "));
    println!();
    print!("{}", cfg.to_toml()?);
    Ok(())
}
