// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Fragview Runtime
//!
//! Lifecycle runtime for IFC-to-fragment viewer resources. The heavy
//! machinery (scene graph, IFC parsing, fragment encoding) lives in an
//! external converter library; this crate owns the part that has to be
//! right: creating a converter bound to a host surface, tearing it
//! down, and atomically swapping it for a fresh one while the model
//! registry and the mirrored component context stay consistent with
//! the resource's actual lifetime.
//!
//! ## Overview
//!
//! - [`ViewerCoordinator`]: the lifecycle state machine
//!   (initialize → ready → resetting → ready).
//! - [`ModelRegistry`]: ordered loaded-model records with an active
//!   selection, suppressed while a reset is in flight.
//! - [`HandleHolder`]: sole owner of the live resource handle.
//! - [`EventBus`] / [`Subscription`]: explicit, drop-safe
//!   subscriptions for model-load events and diagnostics.
//! - [`Diagnostics`]: structured lifecycle events, mirrored into
//!   `tracing`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fragview_runtime::{Surface, ViewerCoordinator};
//!
//! let mut coordinator = ViewerCoordinator::new(Box::new(my_factory));
//! coordinator.initialize(Surface::new(canvas)).await?;
//! coordinator.load_model("school", ifc_bytes).await?;
//! let fragment = coordinator.export_fragment()?;
//! coordinator.reset().await?; // fresh resource, same surface
//! ```

pub mod components;
pub mod coordinator;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod guard;
pub mod holder;
pub mod monitor;
pub mod registry;
pub mod resource;
pub mod settings;

pub use components::ComponentsMirror;
pub use coordinator::{LifecycleState, ViewerCoordinator, DEFAULT_SETTLE_DELAY};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{Error, Result};
pub use events::{EventBus, Subscription};
pub use guard::ResetGuard;
pub use holder::HandleHolder;
pub use monitor::{FrameMonitor, FrameStats};
pub use registry::{ModelInfo, ModelRegistry, RegistryOutcome};
pub use resource::{
    ComponentsHandle, ModelEvent, ModelTree, ResourceFactory, Surface, ViewerResource,
};
pub use settings::{SettingsStore, ViewerSettings, ViewerSettingsPatch};
