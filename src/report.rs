use crate::error::CheckError;
use std::fmt;

/// Plugin status. `Ok < Warning < Critical` for aggregation; `Unknown` sits
/// outside that order and only comes from errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Ok       => "OK",
            Severity::Warning  => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown  => "UNKNOWN",
        }
    }

    /// Process exit status consumed by the monitoring host.
    pub fn exit_code(&self) -> i32 {
        match self {
            Severity::Ok       => 0,
            Severity::Warning  => 1,
            Severity::Critical => 2,
            Severity::Unknown  => 3,
        }
    }

    /// Critical if any is critical, else warning if any is warning, else ok.
    pub fn aggregate<I: IntoIterator<Item = Severity>>(items: I) -> Severity {
        let mut worst = Severity::Ok;
        for sev in items {
            match sev {
                Severity::Critical => return Severity::Critical,
                Severity::Warning  => worst = Severity::Warning,
                Severity::Ok | Severity::Unknown => {}
            }
        }
        worst
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Performance data ─────────────────────────────────────────────────

/// One `label=value;warn;crit;min;max` token.
#[derive(Debug, Clone, PartialEq)]
pub struct PerfData {
    pub label: String,
    pub value: f64,
    pub warn:  Option<f64>,
    pub crit:  Option<f64>,
    pub min:   Option<f64>,
    pub max:   Option<f64>,
}

impl PerfData {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self { label: label.into(), value, warn: None, crit: None, min: None, max: None }
    }

    pub fn thresholds(mut self, warn: f64, crit: f64) -> Self {
        self.warn = Some(warn);
        self.crit = Some(crit);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

impl fmt::Display for PerfData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.contains([' ', '=', '\'']) {
            write!(f, "'{}'", self.label.replace('\'', "''"))?;
        } else {
            f.write_str(&self.label)?;
        }
        write!(f, "={}", fmt_num(self.value))?;
        let opt = |v: Option<f64>| v.map(fmt_num).unwrap_or_default();
        let tail = format!(";{};{};{};{}", opt(self.warn), opt(self.crit), opt(self.min), opt(self.max));
        f.write_str(tail.trim_end_matches(';'))
    }
}

/// Integers print bare, fractions with at most two decimals.
fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.2}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

// ── Check result ─────────────────────────────────────────────────────

/// The single verdict of one plugin run.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub severity:    Severity,
    pub summary:     String,
    pub perfdata:    Vec<PerfData>,
    pub long_output: Vec<String>,
}

impl CheckResult {
    pub fn new(severity: Severity, summary: impl Into<String>) -> Self {
        Self { severity, summary: summary.into(), perfdata: Vec::new(), long_output: Vec::new() }
    }

    pub fn with_perfdata(mut self, perfdata: Vec<PerfData>) -> Self {
        self.perfdata = perfdata;
        self
    }

    pub fn with_long_output(mut self, lines: Vec<String>) -> Self {
        self.long_output = lines;
        self
    }

    pub fn from_error(err: &CheckError) -> Self {
        Self::new(err.severity(), err.to_string())
    }

    /// `LABEL - summary|perfdata` followed by the detail lines, if any.
    pub fn render(&self) -> String {
        let mut out = format!("{} - {}", self.severity.label(), self.summary);
        if !self.perfdata.is_empty() {
            let perf: Vec<String> = self.perfdata.iter().map(|p| p.to_string()).collect();
            out.push('|');
            out.push_str(&perf.join(" "));
        }
        for line in &self.long_output {
            out.push('\n');
            out.push_str(line);
        }
        out
    }

    pub fn print_and_exit(&self) -> ! {
        println!("{}", self.render());
        std::process::exit(self.severity.exit_code())
    }
}
