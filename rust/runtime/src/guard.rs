// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reset reentrancy guard.
//!
//! While a reset sequence is in flight, registry mutation must be
//! suppressed so event handlers never race against partially-cleared
//! state. The guard is owned per coordinator instance and shared with
//! the registry by clone, never held in a static.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flag suppressing registry mutation while a reset is in flight.
#[derive(Clone, Debug, Default)]
pub struct ResetGuard {
    raised: Arc<AtomicBool>,
}

impl ResetGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a reset is currently in flight.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Raise the guard for the duration of a reset sequence.
    ///
    /// Returns `None` if the guard is already raised (a reset is in
    /// flight). The returned token lowers the guard when dropped, so
    /// every exit path of the reset sequence releases it.
    pub(crate) fn raise(&self) -> Option<RaisedGuard> {
        self.raised
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RaisedGuard {
                raised: Arc::clone(&self.raised),
            })
    }
}

/// Token proving the guard is raised; lowers it on drop.
pub(crate) struct RaisedGuard {
    raised: Arc<AtomicBool>,
}

impl Drop for RaisedGuard {
    fn drop(&mut self) {
        self.raised.store(false, Ordering::Release);
    }
}
