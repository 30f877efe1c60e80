//! Throughput harness.
//!
//! Each run drives an [`EventLoop`] on the current task; callbacks count
//! completions and remember the first error.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde_json::json;
use skel_runtime::{EventLoop, Outcome, RuntimeError};
use skel_types::{CallError, Value};
use thiserror::Error;

use crate::args::Args;
use crate::bench::memory::MemorySnapshot;
use crate::objects::{HelloObjectAsync, HelloWorld};

/// Sample memory every this many completions when tracking
const MEM_SAMPLE_EVERY: usize = 1000;

/// Benchmark errors
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Invalid mode '{mode}'. Must be one of the async methods on HelloWorld: {valid}")]
    InvalidMode { mode: String, valid: String },

    #[error("{0}")]
    Call(#[from] CallError),

    #[error("Failed to start event loop: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("did not run as expected: {actual} of {expected} runs completed")]
    RunMismatch { expected: usize, actual: usize },

    #[error("speed not at least {min}/second ( rate was {rate:.0} runs/s )")]
    BelowMinRate { rate: f64, min: f64 },
}

// ─────────────────────────────────────────────────────────────────────────────
// Batch Mode
// ─────────────────────────────────────────────────────────────────────────────

/// `HelloWorld` method exercised by a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    Shout,
    BusyThreads,
    SleepyThreads,
    ContentiousThreads,
}

impl BatchMode {
    pub const ALL: [BatchMode; 4] = [
        BatchMode::Shout,
        BatchMode::BusyThreads,
        BatchMode::SleepyThreads,
        BatchMode::ContentiousThreads,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BatchMode::Shout => "shout",
            BatchMode::BusyThreads => "busy_threads",
            BatchMode::SleepyThreads => "sleepy_threads",
            BatchMode::ContentiousThreads => "contentious_threads",
        }
    }
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchMode {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shout" => Ok(BatchMode::Shout),
            "busy_threads" | "busyThreads" => Ok(BatchMode::BusyThreads),
            "sleepy_threads" | "sleepyThreads" => Ok(BatchMode::SleepyThreads),
            "contentious_threads" | "contentiousThreads" => Ok(BatchMode::ContentiousThreads),
            _ => Err(BenchError::InvalidMode {
                mode: s.to_string(),
                valid: BatchMode::ALL
                    .iter()
                    .map(|m| format!("'{}'", m))
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

/// Parameters of a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub mode: BatchMode,
    pub iterations: usize,
    /// Maximum calls in flight
    pub concurrency: usize,
    /// `sleep` option for `sleepy_threads`, in ms
    pub sleep: Option<u64>,
    pub phrase: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Reports
// ─────────────────────────────────────────────────────────────────────────────

/// Result of a throughput run
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub runs: usize,
    pub iterations: usize,
    pub concurrency: usize,
    pub elapsed: Duration,
    pub mode: Option<BatchMode>,
    /// Peak memory, when tracked
    pub memory: Option<MemorySnapshot>,
}

impl BenchReport {
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Runs per second; `None` when the run was too quick to time in ms
    pub fn rate(&self) -> Option<f64> {
        match self.elapsed_ms() {
            0 => None,
            ms => Some(self.runs as f64 / (ms as f64 / 1000.0)),
        }
    }

    /// Machine-readable form of the report
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "runs": self.runs,
            "iterations": self.iterations,
            "concurrency": self.concurrency,
            "elapsed_ms": self.elapsed_ms() as u64,
            "rate": self.rate(),
            "mode": self.mode.map(|m| m.as_str()),
            "rss_kb": self.memory.map(|m| m.rss_kb),
            "peak_rss_kb": self.memory.map(|m| m.peak_rss_kb),
        })
    }

    pub fn check_min_rate(&self, min: f64) -> Result<(), BenchError> {
        match self.rate() {
            Some(rate) if rate < min => Err(BenchError::BelowMinRate { rate, min }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rate() {
            Some(rate) => writeln!(
                f,
                "Benchmark speed: {:.0} runs/s (runs:{} ms:{} )",
                rate,
                self.runs,
                self.elapsed_ms()
            )?,
            None => writeln!(
                f,
                "Warning: ms timer not high enough resolution to reliably track rate. Try more iterations"
            )?,
        }

        match (&self.memory, self.mode) {
            (Some(mem), _) => writeln!(
                f,
                "Benchmark peak mem (max_rss, current_rss): {:.1} MB {:.1} MB",
                mem.peak_rss_mb(),
                mem.rss_mb()
            )?,
            (None, None) => writeln!(f, "Note: pass --mem to track memory usage")?,
            (None, Some(_)) => {}
        }

        write!(
            f,
            "Benchmark iterations: {} concurrency: {}",
            self.iterations, self.concurrency
        )?;
        if let Some(mode) = self.mode {
            write!(f, " mode: {}", mode)?;
        }
        Ok(())
    }
}

/// Result of timing one construction and one call
#[derive(Debug, Clone)]
pub struct SingleReport {
    pub constructor: Duration,
    pub shout: Duration,
    pub result: Value,
    pub rss_delta_kb: i64,
}

impl SingleReport {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "constructor_ms": self.constructor.as_secs_f64() * 1000.0,
            "shout_ms": self.shout.as_secs_f64() * 1000.0,
            "result": self.result.as_str(),
            "rss_delta_kb": self.rss_delta_kb,
        })
    }
}

impl fmt::Display for SingleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "constructor: {:.3}ms", self.constructor.as_secs_f64() * 1000.0)?;
        writeln!(f, "shout: {:.3}ms", self.shout.as_secs_f64() * 1000.0)?;
        write!(f, "total memory used: {:.2} MB", self.rss_delta_kb as f64 / 1024.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Completion Tally
// ─────────────────────────────────────────────────────────────────────────────

/// Counts successful completions and keeps the first failure
#[derive(Clone, Default)]
struct Tally {
    runs: Rc<Cell<usize>>,
    error: Rc<RefCell<Option<CallError>>>,
    peak: Option<Rc<Cell<MemorySnapshot>>>,
}

impl Tally {
    fn tracking_memory(track: bool) -> Self {
        Self {
            peak: track.then(|| Rc::new(Cell::new(MemorySnapshot::capture()))),
            ..Self::default()
        }
    }

    fn record(&self, outcome: Outcome) {
        match outcome {
            Ok(_) => {
                let runs = self.runs.get() + 1;
                self.runs.set(runs);
                if let Some(peak) = &self.peak {
                    if runs % MEM_SAMPLE_EVERY == 0 {
                        let now = MemorySnapshot::capture();
                        if now.rss_kb > peak.get().rss_kb {
                            peak.set(now);
                        }
                    }
                }
            }
            Err(e) => {
                let mut first = self.error.borrow_mut();
                if first.is_none() {
                    *first = Some(e);
                }
            }
        }
    }

    fn callback(&self) -> impl FnOnce(Outcome) + 'static {
        let tally = self.clone();
        move |outcome| tally.record(outcome)
    }

    /// Final count, or the first error seen
    fn finish(self, expected: usize) -> Result<(usize, Option<MemorySnapshot>), BenchError> {
        if let Some(e) = self.error.borrow_mut().take() {
            return Err(e.into());
        }
        let runs = self.runs.get();
        if runs != expected {
            return Err(BenchError::RunMismatch {
                expected,
                actual: runs,
            });
        }
        let memory = self.peak.map(|peak| {
            let last = MemorySnapshot::capture();
            let peak = peak.get();
            MemorySnapshot {
                peak_rss_kb: last.peak_rss_kb.max(peak.rss_kb),
                ..last
            }
        });
        Ok((runs, memory))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Runs
// ─────────────────────────────────────────────────────────────────────────────

/// Queue every `helloAsync({louder: false})` call up front, then drain.
pub async fn object_async(
    lp: &EventLoop,
    object: &HelloObjectAsync,
    iterations: usize,
    track_mem: bool,
) -> Result<BenchReport, BenchError> {
    let tally = Tally::tracking_memory(track_mem);
    tracing::info!(iterations, workers = lp.config().size(), "object-async benchmark starting");

    let start = Instant::now();
    for _ in 0..iterations {
        let args = Args::new()
            .with(Value::object_from_pairs([("louder", false)]))
            .with_callback(tally.callback());
        object.hello_async(lp, args)?;
    }
    lp.run().await;
    let elapsed = start.elapsed();

    let (runs, memory) = tally.finish(iterations)?;
    Ok(BenchReport {
        runs,
        iterations,
        concurrency: lp.config().size(),
        elapsed,
        mode: None,
        memory,
    })
}

/// Keep at most `concurrency` calls of one method in flight until
/// `iterations` have completed.
pub async fn batch(
    lp: &EventLoop,
    hello_world: &HelloWorld,
    options: &BatchOptions,
) -> Result<BenchReport, BenchError> {
    let tally = Tally::default();
    let window = options.concurrency.max(1);
    tracing::info!(
        mode = %options.mode,
        iterations = options.iterations,
        concurrency = window,
        "batch benchmark starting"
    );

    let start = Instant::now();
    let mut submitted = 0;
    loop {
        while submitted < options.iterations && lp.pending() < window {
            let args = batch_args(options, tally.callback());
            submit(lp, hello_world, options.mode, args)?;
            submitted += 1;
        }
        if !lp.run_once().await {
            break;
        }
    }
    let elapsed = start.elapsed();

    let (runs, memory) = tally.finish(options.iterations)?;
    Ok(BenchReport {
        runs,
        iterations: options.iterations,
        concurrency: options.concurrency,
        elapsed,
        mode: Some(options.mode),
        memory,
    })
}

fn batch_args(options: &BatchOptions, callback: impl FnOnce(Outcome) + 'static) -> Args {
    let args = Args::new().with(options.phrase.as_str());
    let args = match options.mode {
        BatchMode::Shout => args.with(Value::object_from_pairs([("louder", false)])),
        BatchMode::SleepyThreads => match options.sleep {
            Some(ms) => args.with(Value::object_from_pairs([("sleep", ms)])),
            None => args.with(Value::empty_object()),
        },
        BatchMode::BusyThreads | BatchMode::ContentiousThreads => args,
    };
    args.with_callback(callback)
}

fn submit(lp: &EventLoop, hello_world: &HelloWorld, mode: BatchMode, args: Args) -> Result<(), CallError> {
    match mode {
        BatchMode::Shout => hello_world.shout(lp, args),
        BatchMode::BusyThreads => hello_world.busy_threads(lp, args),
        BatchMode::SleepyThreads => hello_world.sleepy_threads(lp, args),
        BatchMode::ContentiousThreads => hello_world.contentious_threads(lp, args),
    }
    .map(|_| ())
}

/// Time constructing `HelloWorld` and one `shout`.
pub async fn single(lp: &EventLoop, phrase: &str) -> Result<SingleReport, BenchError> {
    let before = MemorySnapshot::capture();

    let start = Instant::now();
    let hello_world = HelloWorld::new();
    let constructor = start.elapsed();

    let result = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&result);
    let args = Args::new()
        .with(phrase)
        .with(Value::empty_object())
        .with_callback(move |outcome| *slot.borrow_mut() = Some(outcome));

    let start = Instant::now();
    hello_world.shout(lp, args)?;
    lp.run().await;
    let shout = start.elapsed();

    let after = MemorySnapshot::capture();
    let outcome = result.borrow_mut().take();
    let value = match outcome {
        Some(outcome) => outcome?,
        None => return Err(BenchError::RunMismatch { expected: 1, actual: 0 }),
    };

    Ok(SingleReport {
        constructor,
        shout,
        result: value,
        rss_delta_kb: after.rss_kb as i64 - before.rss_kb as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use skel_runtime::PoolConfig;

    fn event_loop(size: usize) -> EventLoop {
        EventLoop::new(PoolConfig::new(size).unwrap()).unwrap()
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("shout".parse::<BatchMode>().unwrap(), BatchMode::Shout);
        assert_eq!("sleepyThreads".parse::<BatchMode>().unwrap(), BatchMode::SleepyThreads);
        assert_eq!(
            "contentious_threads".parse::<BatchMode>().unwrap(),
            BatchMode::ContentiousThreads
        );

        let err = "sleep".parse::<BatchMode>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Invalid mode 'sleep'"));
        assert!(message.contains("'busy_threads'"));
    }

    #[test]
    fn test_report_display() {
        let report = BenchReport {
            runs: 50,
            iterations: 50,
            concurrency: 10,
            elapsed: Duration::from_millis(250),
            mode: Some(BatchMode::Shout),
            memory: None,
        };
        assert_eq!(report.rate(), Some(200.0));
        assert_eq!(
            report.to_string(),
            "Benchmark speed: 200 runs/s (runs:50 ms:250 )\nBenchmark iterations: 50 concurrency: 10 mode: shout"
        );
        assert!(report.check_min_rate(100.0).is_ok());
        assert!(matches!(
            report.check_min_rate(1000.0),
            Err(BenchError::BelowMinRate { .. })
        ));
    }

    #[test]
    fn test_report_json() {
        let report = BenchReport {
            runs: 50,
            iterations: 50,
            concurrency: 10,
            elapsed: Duration::from_millis(250),
            mode: Some(BatchMode::BusyThreads),
            memory: None,
        };
        let json = report.to_json();
        assert_eq!(json["runs"], 50);
        assert_eq!(json["elapsed_ms"], 250);
        assert_eq!(json["rate"], 200.0);
        assert_eq!(json["mode"], "busy_threads");
        assert!(json["peak_rss_kb"].is_null());
    }

    #[test]
    fn test_report_zero_elapsed() {
        let report = BenchReport {
            runs: 1,
            iterations: 1,
            concurrency: 1,
            elapsed: Duration::from_micros(10),
            mode: None,
            memory: None,
        };
        assert_eq!(report.rate(), None);
        let text = report.to_string();
        assert!(text.starts_with("Warning: ms timer"));
        assert!(text.contains("Note: pass --mem"));
        assert!(report.check_min_rate(1e9).is_ok());
    }

    #[tokio::test]
    async fn test_batch_runs_every_iteration() {
        let lp = event_loop(4);
        let options = BatchOptions {
            mode: BatchMode::SleepyThreads,
            iterations: 12,
            concurrency: 4,
            sleep: Some(5),
            phrase: "rawr".to_string(),
        };
        let report = batch(&lp, &HelloWorld::new(), &options).await.unwrap();
        assert_eq!(report.runs, 12);
        assert_eq!(report.mode, Some(BatchMode::SleepyThreads));
        assert_eq!(lp.pending(), 0);
    }

    #[tokio::test]
    async fn test_batch_surfaces_domain_error() {
        let lp = event_loop(2);
        let options = BatchOptions {
            mode: BatchMode::Shout,
            iterations: 3,
            concurrency: 2,
            sleep: None,
            phrase: "meow".to_string(),
        };
        let err = batch(&lp, &HelloWorld::new(), &options).await.unwrap_err();
        assert!(matches!(err, BenchError::Call(_)));
    }

    #[tokio::test]
    async fn test_object_async_counts_runs() {
        let lp = event_loop(2);
        let object = HelloObjectAsync::named("park bench").unwrap().with_work(10);
        let report = object_async(&lp, &object, 20, true).await.unwrap();
        assert_eq!(report.runs, 20);
        assert_eq!(report.concurrency, 2);
        assert!(report.memory.is_some());
    }

    #[tokio::test]
    async fn test_single() {
        let lp = event_loop(1);
        let report = single(&lp, "rawr").await.unwrap();
        assert_eq!(report.result, Value::from("rawr!"));
        assert!(report.to_string().contains("total memory used"));
        assert_eq!(report.to_json()["result"], "rawr!");
    }
}
