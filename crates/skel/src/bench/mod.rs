//! Throughput benchmarks driven by the `skel-bench` binary.

mod harness;
pub mod memory;

pub use harness::{batch, object_async, single, BatchMode, BatchOptions, BenchError, BenchReport, SingleReport};
pub use memory::MemorySnapshot;
