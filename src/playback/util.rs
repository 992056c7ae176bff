use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const SLICE: Duration = Duration::from_millis(50);

/// Sleeps for `total`, waking every 50ms to check `stop`.
///
/// Returns `false` if `stop` was raised before the full duration elapsed.
pub(crate) fn sleep_interruptible(stop: &AtomicBool, total: Duration) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let slice = remaining.min(SLICE);
        std::thread::sleep(slice);
        remaining -= slice;
    }
    !stop.load(Ordering::SeqCst)
}
