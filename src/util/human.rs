/// Format a KiB count as reported by `mmlspool`: "1.5 TB"
pub fn fmt_kb(kib: u64) -> String {
    fmt_bytes_f(kib as f64 * 1024.0)
}

fn fmt_bytes_f(b: f64) -> String {
    const PB: f64 = 1_125_899_906_842_624.0;
    const TB: f64 = 1_099_511_627_776.0;
    const GB: f64 = 1_073_741_824.0;
    const MB: f64 = 1_048_576.0;
    const KB: f64 = 1_024.0;
    if b >= PB      { format!("{:.1} PB", b / PB) }
    else if b >= TB { format!("{:.1} TB", b / TB) }
    else if b >= GB { format!("{:.1} GB", b / GB) }
    else if b >= MB { format!("{:.1} MB", b / MB) }
    else if b >= KB { format!("{:.1} KB", b / KB) }
    else            { format!("{:.0} B",  b) }
}

/// Percentage with no decimals: "84%"
pub fn fmt_pct(pct: f64) -> String {
    format!("{:.0}%", pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kib_scaling() {
        assert_eq!(fmt_kb(0), "0 B");
        assert_eq!(fmt_kb(50), "50.0 KB");
        assert_eq!(fmt_kb(1024), "1.0 MB");
        assert_eq!(fmt_kb(162_531_639_296), "151.4 TB");
    }

    #[test]
    fn pct() {
        assert_eq!(fmt_pct(95.4), "95%");
    }
}
