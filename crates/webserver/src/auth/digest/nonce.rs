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

//! Nonce store.

use rand::RngCore;
use std::collections::{HashMap, VecDeque};
use std::fmt::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Default time to live of nonces.
pub const DEFAULT_NONCE_TTL: Duration = Duration::from_secs(300);

/// Default maximum number of tracked nonces.
pub const DEFAULT_NONCE_CAPACITY: usize = 4096;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Nonce store.
///
/// Tracks the nonces handed out with Digest challenges, together with the
/// highest nonce count a client used with each of them. Clients omitting
/// the nonce count may use a nonce only once. Nonces older than
/// the time to live are stale, so clients are asked to retry with a fresh
/// one. They're forgotten entirely after twice the time to live, or when
/// the store is full, in which case the oldest nonce is evicted first.
#[derive(Debug)]
pub struct NonceStore {
    /// Time to live.
    ttl: Duration,
    /// Maximum number of nonces.
    capacity: usize,
    /// Tracked nonces.
    inner: Mutex<Inner>,
}

/// Tracked nonces, in order of issuance.
#[derive(Debug, Default)]
struct Inner {
    /// Nonce entries.
    entries: HashMap<String, Entry>,
    /// Nonces in order of issuance.
    order: VecDeque<String>,
}

/// Nonce entry.
#[derive(Clone, Copy, Debug)]
struct Entry {
    /// Issue time.
    issued: Instant,
    /// Highest nonce count seen.
    count: u32,
    /// Whether the nonce was used without a nonce count.
    used: bool,
}

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Validity of a nonce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Validity {
    /// Nonce is fresh and the count was not used before.
    Valid,
    /// Nonce expired.
    Stale,
    /// Nonce count was already used.
    Replayed,
    /// Nonce was never issued, or was forgotten.
    Unknown,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl NonceStore {
    /// Creates a nonce store.
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Issues a fresh nonce.
    ///
    /// Nonces consist of 16 random bytes, hex encoded.
    pub fn issue(&self) -> String {
        let nonce = random_hex();
        self.register(nonce.clone());
        nonce
    }

    /// Registers a nonce as issued now.
    pub(crate) fn register(&self, nonce: String) {
        let now = Instant::now();
        let mut inner = self.lock();
        inner.purge(now, self.ttl * 2);
        while inner.entries.len() >= self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
        }
        inner.order.push_back(nonce.clone());
        let entry = Entry { issued: now, count: 0, used: false };
        inner.entries.insert(nonce, entry);
    }

    /// Checks a nonce and nonce count without recording the count.
    pub fn check(&self, nonce: &str, count: Option<u32>) -> Validity {
        let now = Instant::now();
        let mut inner = self.lock();
        let validity = match inner.entries.get(nonce) {
            None => Validity::Unknown,
            Some(entry) if now.duration_since(entry.issued) >= self.ttl => {
                Validity::Stale
            }
            Some(entry) => match count {
                Some(count) if count <= entry.count => Validity::Replayed,
                None if entry.used => Validity::Replayed,
                _ => Validity::Valid,
            },
        };
        inner.purge(now, self.ttl * 2);
        validity
    }

    /// Records the nonce count of a successful authentication.
    ///
    /// Without a nonce count, the nonce is marked as used. Returns `false`,
    /// if the count or nonce was used in the meantime.
    pub fn commit(&self, nonce: &str, count: Option<u32>) -> bool {
        let mut inner = self.lock();
        let Some(entry) = inner.entries.get_mut(nonce) else {
            return false;
        };
        match count {
            Some(count) if count <= entry.count => false,
            Some(count) => {
                entry.count = count;
                true
            }
            None if entry.used => false,
            None => {
                entry.used = true;
                true
            }
        }
    }

    /// Locks the store, recovering from poisoning.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[allow(clippy::must_use_candidate)]
impl NonceStore {
    /// Returns the number of tracked nonces.
    #[inline]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns whether no nonces are tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}

impl Inner {
    /// Forgets nonces older than the given age.
    fn purge(&mut self, now: Instant, age: Duration) {
        while let Some(nonce) = self.order.front() {
            let expired = self
                .entries
                .get(nonce)
                .is_none_or(|entry| now.duration_since(entry.issued) >= age);
            if !expired {
                break;
            }
            if let Some(nonce) = self.order.pop_front() {
                self.entries.remove(&nonce);
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for NonceStore {
    /// Creates a nonce store with default settings.
    fn default() -> Self {
        Self::new(DEFAULT_NONCE_TTL, DEFAULT_NONCE_CAPACITY)
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Returns 16 random bytes, hex encoded.
pub(crate) fn random_hex() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().fold(String::with_capacity(32), |mut acc, byte| {
        let _ = write!(acc, "{byte:02x}");
        acc
    })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue() {
        let store = NonceStore::default();
        let a = store.issue();
        let b = store.issue();
        assert_eq!(a.len(), 32);
        assert!(a.bytes().all(|byte| byte.is_ascii_hexdigit()));
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_count_must_increase() {
        let store = NonceStore::default();
        let nonce = store.issue();
        assert_eq!(store.check(&nonce, Some(1)), Validity::Valid);
        assert!(store.commit(&nonce, Some(1)));
        assert_eq!(store.check(&nonce, Some(1)), Validity::Replayed);
        assert!(!store.commit(&nonce, Some(1)));
        assert_eq!(store.check(&nonce, Some(2)), Validity::Valid);
    }

    #[test]
    fn test_single_use_without_count() {
        let store = NonceStore::default();
        let nonce = store.issue();
        assert_eq!(store.check(&nonce, None), Validity::Valid);
        assert!(store.commit(&nonce, None));
        assert_eq!(store.check(&nonce, None), Validity::Replayed);
        assert!(!store.commit(&nonce, None));
    }

    #[test]
    fn test_random_hex_is_not_tracked() {
        let store = NonceStore::default();
        let value = random_hex();
        assert_eq!(value.len(), 32);
        assert_eq!(store.check(&value, None), Validity::Unknown);
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown() {
        let store = NonceStore::default();
        assert_eq!(store.check("deadbeef", Some(1)), Validity::Unknown);
        assert!(!store.commit("deadbeef", Some(1)));
    }

    #[test]
    fn test_stale_then_forgotten() {
        let store = NonceStore::new(Duration::ZERO, 8);
        let nonce = store.issue();
        assert_eq!(store.check(&nonce, None), Validity::Stale);
        assert!(store.is_empty());
        assert_eq!(store.check(&nonce, None), Validity::Unknown);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = NonceStore::new(DEFAULT_NONCE_TTL, 2);
        let first = store.issue();
        let second = store.issue();
        let third = store.issue();
        assert_eq!(store.len(), 2);
        assert_eq!(store.check(&first, None), Validity::Unknown);
        assert_eq!(store.check(&second, None), Validity::Valid);
        assert_eq!(store.check(&third, None), Validity::Valid);
    }
}
