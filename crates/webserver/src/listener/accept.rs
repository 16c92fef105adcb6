// Copyright (c) 2025 Zensical and contributors

// SPDX-License-Identifier: MIT
// Third-party contributions licensed under DCO

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NON-INFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.

// ----------------------------------------------------------------------------

//! Pending accept bookkeeping.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::warn;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Number of outstanding accept registrations.
///
/// Every accept that is armed on the listening socket is counted here, and
/// released exactly once, either when it completes or when it's cancelled on
/// shutdown. The count never goes negative, and waiters are notified once it
/// drops to zero, which is how the drain after stopping a listener is
/// observed.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use webserver::listener::PendingAccepts;
///
/// // Arm and release an accept
/// let pending = PendingAccepts::new();
/// pending.issue();
/// assert_eq!(pending.get(), 1);
/// pending.complete();
/// assert!(pending.wait(Duration::ZERO));
/// ```
#[derive(Debug, Default)]
pub struct PendingAccepts {
    /// Number of pending accepts.
    count: Mutex<usize>,
    /// Notified when the count reaches zero.
    drained: Condvar,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl PendingAccepts {
    /// Creates a counter without pending accepts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an outstanding accept.
    pub fn issue(&self) {
        *self.lock() += 1;
    }

    /// Releases an outstanding accept.
    pub fn complete(&self) {
        let mut count = self.lock();
        if *count == 0 {
            warn!("Released accept that was never issued");
            return;
        }
        *count -= 1;
        if *count == 0 {
            self.drained.notify_all();
        }
    }

    /// Returns the number of outstanding accepts.
    #[must_use]
    pub fn get(&self) -> usize {
        *self.lock()
    }

    /// Waits until no accepts are outstanding, returning whether that
    /// happened within the given timeout.
    #[must_use]
    pub fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.lock();
        while *count > 0 {
            let Some(remaining) =
                deadline.checked_duration_since(Instant::now())
            else {
                return false;
            };
            count = self
                .drained
                .wait_timeout(count, remaining)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|err| err.into_inner().0);
        }
        true
    }

    /// Locks the counter, recovering from poisoning, as the count itself
    /// can't be left in an inconsistent state.
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_complete_never_goes_negative() {
        let pending = PendingAccepts::new();
        pending.complete();
        assert_eq!(pending.get(), 0);
        pending.issue();
        pending.complete();
        pending.complete();
        assert_eq!(pending.get(), 0);
    }

    #[test]
    fn test_wait_times_out() {
        let pending = PendingAccepts::new();
        pending.issue();
        assert!(!pending.wait(Duration::from_millis(10)));
    }

    #[test]
    fn test_wait_is_notified() {
        let pending = Arc::new(PendingAccepts::new());
        pending.issue();
        let handle = thread::spawn({
            let pending = Arc::clone(&pending);
            move || pending.wait(Duration::from_secs(5))
        });
        thread::sleep(Duration::from_millis(20));
        pending.complete();
        assert!(handle.join().unwrap());
    }
}
