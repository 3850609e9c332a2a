// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-slot owner of the live viewer resource.
//!
//! At most one resource handle exists per coordinator. The holder has
//! one responsibility: owning that handle (and the surface it was
//! bound to) between `set` and `clear`, and disposing it on `clear`.

use crate::error::{Error, Result};
use crate::resource::{Surface, ViewerResource};

struct Held {
    resource: Box<dyn ViewerResource>,
    surface: Surface,
}

/// Holds at most one live resource handle plus its mount surface.
#[derive(Default)]
pub struct HandleHolder {
    slot: Option<Held>,
}

impl HandleHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a freshly created resource.
    ///
    /// Setting while a handle is already held is a usage error: the old
    /// handle would leak its subscriptions. Callers must `clear` first.
    pub fn set(&mut self, resource: Box<dyn ViewerResource>, surface: Surface) -> Result<()> {
        if self.slot.is_some() {
            return Err(Error::HandleOccupied);
        }
        self.slot = Some(Held { resource, surface });
        Ok(())
    }

    pub fn get(&self) -> Option<&dyn ViewerResource> {
        self.slot.as_ref().map(|held| &*held.resource)
    }

    pub fn get_mut(&mut self) -> Option<&mut (dyn ViewerResource + '_)> {
        match self.slot.as_mut() {
            Some(held) => Some(&mut *held.resource),
            None => None,
        }
    }

    /// Surface the current resource was bound to.
    pub fn surface(&self) -> Option<&Surface> {
        self.slot.as_ref().map(|held| &held.surface)
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Dispose and drop the held resource. No-op when empty.
    pub fn clear(&mut self) {
        if let Some(mut held) = self.slot.take() {
            held.resource.dispose();
        }
    }
}

impl Drop for HandleHolder {
    fn drop(&mut self) {
        self.clear();
    }
}
