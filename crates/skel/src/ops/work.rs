//! Work bodies shared by the operation catalog.
//!
//! Everything here runs on a worker thread (or inline for sync calls) and
//! only touches data captured at prepare time.

use std::collections::BTreeMap;
use std::time::Duration;

use parking_lot::Mutex;
use skel_types::CallError;

/// Entries built by [`expensive_work`]
pub const WORK_TO_DO: usize = 100_000;

/// Phrases must contain this at least once
pub const REQUIRED_WORD: &str = "rawr";

/// Single process-wide lock that `contentious_threads` bodies fight over
static CONTENDED: Mutex<()> = parking_lot::const_mutex(());

/// Fill an ordered map with `n` stringified integers, then read every entry back.
pub fn expensive_work(n: usize) -> Result<(), CallError> {
    let container: BTreeMap<usize, String> = (0..n).map(|i| (i, i.to_string())).collect();

    for i in 0..n {
        if container.get(&i).map(String::as_str) != Some(i.to_string().as_str()) {
            return Err(CallError::runtime("Uh oh, this should never happen"));
        }
    }
    Ok(())
}

/// [`expensive_work`] while holding the process-wide lock.
pub fn contended_work(n: usize) -> Result<(), CallError> {
    let _guard = CONTENDED.lock();
    expensive_work(n)
}

pub fn sleep_ms(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}

/// Domain rule for phrase operations.
pub fn require_rawr(phrase: &str) -> Result<(), CallError> {
    if phrase.contains(REQUIRED_WORD) {
        Ok(())
    } else {
        Err(CallError::domain("we really would prefer rawr all the time"))
    }
}
