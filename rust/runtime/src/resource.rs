// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Contracts for the external viewer/converter resource.
//!
//! The runtime never touches scene graphs, IFC parsing or the fragment
//! codec itself; it sequences calls into an implementation of
//! [`ViewerResource`] produced by a [`ResourceFactory`]. Host surfaces
//! and auxiliary contexts are opaque tokens passed through unchanged.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::events::EventBus;

/// Opaque mount target a resource is bound to (a DOM container, a
/// window handle, a test token). The coordinator clones it for
/// reinitialization after a reset but never inspects its contents.
#[derive(Clone)]
pub struct Surface(Arc<dyn Any + Send + Sync>);

impl Surface {
    pub fn new(target: impl Any + Send + Sync) -> Self {
        Self(Arc::new(target))
    }

    /// Typed access for resource implementations that know what they
    /// were mounted on.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Surface(..)")
    }
}

/// Opaque auxiliary context exposed by a live resource (the converter
/// library's component registry in the original viewer). Mirrored for
/// other consumers while the resource is alive.
#[derive(Clone)]
pub struct ComponentsHandle(Arc<dyn Any + Send + Sync>);

impl ComponentsHandle {
    pub fn new(context: impl Any + Send + Sync) -> Self {
        Self(Arc::new(context))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl std::fmt::Debug for ComponentsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ComponentsHandle(..)")
    }
}

/// Derived UI tree handle attached to a loaded model record.
pub trait ModelTree: Send + Sync {
    /// Detach from any external parent this tree is mounted in.
    ///
    /// Called best-effort when the owning record is removed; errors are
    /// logged and swallowed by the registry, never propagated.
    fn detach(&self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Notifications emitted by a resource as models are loaded, consumed
/// by the coordinator to populate the model registry.
#[derive(Clone)]
pub enum ModelEvent {
    /// A model finished loading and should be tracked.
    Loaded { id: String, name: String },
    /// A derived UI tree became available for a tracked model.
    TreeReady {
        id: String,
        tree: Arc<dyn ModelTree>,
    },
}

impl std::fmt::Debug for ModelEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelEvent::Loaded { id, name } => f
                .debug_struct("Loaded")
                .field("id", id)
                .field("name", name)
                .finish(),
            ModelEvent::TreeReady { id, .. } => {
                f.debug_struct("TreeReady").field("id", id).finish()
            }
        }
    }
}

/// The external stateful viewer/converter object.
///
/// Exactly one instance is alive per coordinator at a time; the
/// coordinator owns it through the handle holder and is the only caller
/// of `dispose`.
#[async_trait]
pub trait ViewerResource: Send {
    /// Asynchronous setup phase (scene wiring, WASM runtime, workers).
    /// May fail with arbitrary external latency; the coordinator
    /// propagates the failure and leaves itself retryable.
    async fn setup(&mut self) -> Result<()>;

    /// Auxiliary context mirrored for other consumers while this
    /// resource is alive.
    fn components(&self) -> ComponentsHandle;

    /// Load one model from raw bytes, converting it to fragments.
    /// Announces progress through the model event bus handed to the
    /// factory at creation.
    async fn load(&mut self, name: &str, data: Vec<u8>) -> Result<()>;

    /// Current fragment binary, if a conversion has completed.
    fn fragment(&self) -> Option<Vec<u8>>;

    /// Release subscriptions, detach host elements, drop internal
    /// state. Must be idempotent.
    fn dispose(&mut self);
}

/// Builds viewer resources bound to a host surface.
pub trait ResourceFactory: Send + Sync {
    /// Create a resource bound to `surface`. The factory receives a
    /// clone of the coordinator's model event bus so the resource can
    /// announce loads.
    fn create(
        &self,
        surface: &Surface,
        model_events: EventBus<ModelEvent>,
    ) -> Result<Box<dyn ViewerResource>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_roundtrips_typed_target() {
        let surface = Surface::new("canvas-main".to_string());
        assert_eq!(
            surface.downcast_ref::<String>().map(String::as_str),
            Some("canvas-main")
        );
        assert!(surface.downcast_ref::<u32>().is_none());
    }

    #[test]
    fn surface_clone_shares_target() {
        let surface = Surface::new(42u32);
        let clone = surface.clone();
        assert_eq!(clone.downcast_ref::<u32>(), Some(&42));
    }
}
