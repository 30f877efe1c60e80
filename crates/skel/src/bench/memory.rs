//! Process memory from `/proc/self/status` (Linux only; zeros elsewhere)

/// Snapshot of process memory, in KB
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    /// Current resident set size
    pub rss_kb: u64,
    /// Peak resident set size
    pub peak_rss_kb: u64,
    /// Thread count
    pub threads: u64,
}

impl MemorySnapshot {
    pub fn capture() -> Self {
        match std::fs::read_to_string("/proc/self/status") {
            Ok(status) => Self::parse(&status),
            Err(_) => Self::default(),
        }
    }

    pub(crate) fn parse(status: &str) -> Self {
        let mut snapshot = Self::default();
        for line in status.lines() {
            if line.starts_with("VmRSS:") {
                snapshot.rss_kb = field(line);
            } else if line.starts_with("VmHWM:") {
                snapshot.peak_rss_kb = field(line);
            } else if line.starts_with("Threads:") {
                snapshot.threads = field(line);
            }
        }
        snapshot
    }

    pub fn rss_mb(&self) -> f64 {
        self.rss_kb as f64 / 1024.0
    }

    pub fn peak_rss_mb(&self) -> f64 {
        self.peak_rss_kb as f64 / 1024.0
    }
}

fn field(line: &str) -> u64 {
    line.split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}
