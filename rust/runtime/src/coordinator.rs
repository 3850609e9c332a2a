// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lifecycle coordinator for the viewer resource.
//!
//! Sequences creation, disposal and atomic replacement of the external
//! converter resource while keeping the model registry and the
//! components mirror consistent with the resource's actual lifetime.
//!
//! Reset sequence: raise guard → clear registry → clear components
//! mirror → dispose resource → settle delay → reinitialize against the
//! remembered surface. The guard is lowered through a drop token, so a
//! failed reinitialize never leaves registry mutation locked out.

use std::time::Duration;

use crate::components::ComponentsMirror;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{Error, Result};
use crate::events::{EventBus, Subscription};
use crate::guard::ResetGuard;
use crate::holder::HandleHolder;
use crate::registry::ModelRegistry;
use crate::resource::{ModelEvent, ResourceFactory, Surface, ViewerResource};

/// Delay between disposal and reinitialization, letting background
/// worker shutdown and pending frame callbacks drain.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Coordinator lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No resource held; `initialize` may be called.
    Uninitialized,
    /// A resource is alive and usable.
    Ready,
    /// A reset sequence is in flight.
    Resetting,
    /// Terminal; the coordinator must not be reused.
    Disposed,
}

/// Coordinates the lifetime of one viewer resource and its dependent
/// state.
pub struct ViewerCoordinator {
    factory: Box<dyn ResourceFactory>,
    holder: HandleHolder,
    registry: ModelRegistry,
    guard: ResetGuard,
    components: ComponentsMirror,
    model_events: EventBus<ModelEvent>,
    diagnostics: Diagnostics,
    surface: Option<Surface>,
    settle_delay: Duration,
    state: LifecycleState,
    loading: bool,
    has_fragments: bool,
    // Keeps the registry wired to model events for the coordinator's
    // whole life; dropping it with the coordinator unsubscribes.
    _registry_wiring: Subscription,
}

impl ViewerCoordinator {
    pub fn new(factory: Box<dyn ResourceFactory>) -> Self {
        Self::with_settle_delay(factory, DEFAULT_SETTLE_DELAY)
    }

    pub fn with_settle_delay(factory: Box<dyn ResourceFactory>, settle_delay: Duration) -> Self {
        let guard = ResetGuard::new();
        let diagnostics = Diagnostics::new();
        let registry = ModelRegistry::new(guard.clone(), diagnostics.clone());
        let model_events = EventBus::new();

        let wiring = {
            let registry = registry.clone();
            model_events.subscribe(move |event: &ModelEvent| match event {
                ModelEvent::Loaded { id, name } => {
                    registry.add(id.clone(), name.clone());
                }
                ModelEvent::TreeReady { id, tree } => {
                    registry.attach_tree(id, tree.clone());
                }
            })
        };

        Self {
            factory,
            holder: HandleHolder::new(),
            registry,
            guard,
            components: ComponentsMirror::new(),
            model_events,
            diagnostics,
            surface: None,
            settle_delay,
            state: LifecycleState::Uninitialized,
            loading: false,
            has_fragments: false,
            _registry_wiring: wiring,
        }
    }

    /// Create a resource bound to `surface` and wait for its setup.
    ///
    /// Fails with [`Error::AlreadyInitialized`] while a resource is
    /// held; setup failure leaves the holder cleared so the call can be
    /// retried.
    pub async fn initialize(&mut self, surface: Surface) -> Result<()> {
        if self.state == LifecycleState::Disposed {
            return Err(Error::Disposed);
        }
        if !self.holder.is_empty() {
            return Err(Error::AlreadyInitialized);
        }

        self.diagnostics.emit(Diagnostic::InitializeStarted);
        match self.create_and_setup(&surface).await {
            Ok(()) => {
                self.surface = Some(surface);
                self.state = LifecycleState::Ready;
                self.diagnostics.emit(Diagnostic::InitializeCompleted);
                Ok(())
            }
            Err(err) => {
                self.diagnostics.emit(Diagnostic::InitializeFailed {
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Tear down the current resource and dependent state, then bring
    /// up a replacement bound to the remembered surface.
    ///
    /// Registry mutation arriving while the reset is in flight is
    /// suppressed by the guard. A second overlapping `reset` is
    /// rejected with [`Error::ResetInProgress`]. The guard is lowered
    /// on every exit path; a failed reinitialize returns the error and
    /// leaves the coordinator recoverable through a manual
    /// `initialize`.
    pub async fn reset(&mut self) -> Result<()> {
        if self.state == LifecycleState::Disposed {
            return Err(Error::Disposed);
        }
        if self.holder.is_empty() {
            tracing::warn!("reset requested but no resource is initialized");
            return Ok(());
        }

        let raised = self.guard.raise().ok_or(Error::ResetInProgress)?;
        self.state = LifecycleState::Resetting;
        self.diagnostics.emit(Diagnostic::ResetStarted);

        self.registry.reset();
        // Dependent observers must stop seeing the context before the
        // resource behind it starts tearing down.
        self.components.clear();
        self.holder.clear();
        self.loading = false;
        self.has_fragments = false;

        tokio::time::sleep(self.settle_delay).await;

        let result = match self.surface.clone() {
            Some(surface) => match self.create_and_setup(&surface).await {
                Ok(()) => {
                    self.state = LifecycleState::Ready;
                    Ok(())
                }
                Err(err) => {
                    self.state = LifecycleState::Uninitialized;
                    self.diagnostics.emit(Diagnostic::ReinitializeFailed {
                        reason: err.to_string(),
                    });
                    Err(err)
                }
            },
            None => {
                self.state = LifecycleState::Uninitialized;
                Ok(())
            }
        };

        drop(raised);
        if result.is_ok() {
            self.diagnostics.emit(Diagnostic::ResetCompleted);
        }
        result
    }

    /// Dispose the held resource unconditionally. Terminal; the
    /// coordinator rejects further lifecycle calls.
    pub fn dispose(&mut self) {
        self.holder.clear();
        self.components.clear();
        self.state = LifecycleState::Disposed;
        self.diagnostics.emit(Diagnostic::Disposed);
    }

    /// Load one model through the live resource.
    ///
    /// The loading flag is cleared on every exit path, so a failed load
    /// never leaves a stuck loading indicator.
    pub async fn load_model(&mut self, name: &str, data: Vec<u8>) -> Result<()> {
        let resource = self.holder.get_mut().ok_or(Error::NotInitialized)?;
        self.loading = true;
        let result = resource.load(name, data).await;
        self.loading = false;
        if result.is_ok() {
            self.has_fragments = true;
        }
        result
    }

    /// Current fragment binary from the live resource.
    pub fn export_fragment(&self) -> Result<Vec<u8>> {
        let resource = self.holder.get().ok_or(Error::NotInitialized)?;
        resource.fragment().ok_or(Error::NoFragments)
    }

    async fn create_and_setup(&mut self, surface: &Surface) -> Result<()> {
        let resource = self.factory.create(surface, self.model_events.clone())?;
        self.holder.set(resource, surface.clone())?;
        let setup = match self.holder.get_mut() {
            Some(resource) => resource.setup().await,
            None => return Err(Error::NotInitialized),
        };
        match setup {
            Ok(()) => {
                if let Some(resource) = self.holder.get() {
                    self.components.set(resource.components());
                }
                Ok(())
            }
            Err(err) => {
                self.holder.clear();
                Err(err)
            }
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Shared handle to the model registry; clones observe and mutate
    /// the same records.
    pub fn registry(&self) -> ModelRegistry {
        self.registry.clone()
    }

    /// Shared mirror of the live resource's auxiliary context.
    pub fn components(&self) -> ComponentsMirror {
        self.components.clone()
    }

    /// Bus the live resource announces model loads on.
    pub fn model_events(&self) -> EventBus<ModelEvent> {
        self.model_events.clone()
    }

    /// Lifecycle diagnostics emitter for external collectors.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Read access to the live resource, if any.
    pub fn resource(&self) -> Option<&dyn ViewerResource> {
        self.holder.get()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_fragments(&self) -> bool {
        self.has_fragments
    }

    /// Whether a reset is currently in flight.
    pub fn is_resetting(&self) -> bool {
        self.guard.is_raised()
    }
}
