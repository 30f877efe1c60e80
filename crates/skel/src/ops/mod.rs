//! Operation catalog.

mod hello;
mod promise;
mod shout;
mod sleepy;
mod threads;
pub mod work;

pub use hello::{Hello, HelloAsync, Wave};
pub use promise::HelloPromise;
pub use shout::{shout, Shout};
pub use sleepy::{SleepyThreads, DEFAULT_SLEEP_MS};
pub use threads::{BusyThreads, ContentiousThreads};

/// Exclamation suffixes, by operation
pub mod louder {
    pub use super::hello::LOUD as HELLO_ASYNC;
    pub use super::shout::{LOUD as SHOUT, QUIET as SHOUT_QUIET};
}
