// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mirror of the live resource's auxiliary context.
//!
//! Consumers outside the coordinator read the converter's component
//! registry through this slot. The reset sequence clears it *before*
//! disposing the resource, so an observer can never read a context
//! whose resource is mid-disposal.

use std::sync::{Arc, Mutex};

use crate::resource::ComponentsHandle;

/// Shared slot holding the auxiliary context of the live resource.
#[derive(Clone, Default)]
pub struct ComponentsMirror {
    slot: Arc<Mutex<Option<ComponentsHandle>>>,
}

impl ComponentsMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&self, handle: ComponentsHandle) {
        *self.slot.lock().expect("components mirror lock poisoned") = Some(handle);
    }

    pub(crate) fn clear(&self) {
        *self.slot.lock().expect("components mirror lock poisoned") = None;
    }

    /// Current auxiliary context, `None` while no resource is alive.
    pub fn get(&self) -> Option<ComponentsHandle> {
        self.slot
            .lock()
            .expect("components mirror lock poisoned")
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.slot
            .lock()
            .expect("components mirror lock poisoned")
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_clear_roundtrip() {
        let mirror = ComponentsMirror::new();
        assert!(mirror.get().is_none());

        mirror.set(ComponentsHandle::new(41u64));
        let handle = mirror.get().unwrap();
        assert_eq!(handle.downcast_ref::<u64>(), Some(&41));
        assert!(mirror.is_set());

        mirror.clear();
        assert!(mirror.get().is_none());
    }

    #[test]
    fn clones_observe_the_same_slot() {
        let mirror = ComponentsMirror::new();
        let observer = mirror.clone();
        mirror.set(ComponentsHandle::new(()));
        assert!(observer.is_set());
        mirror.clear();
        assert!(!observer.is_set());
    }
}
