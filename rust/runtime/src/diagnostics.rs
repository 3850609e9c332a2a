// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structured lifecycle diagnostics.
//!
//! Each lifecycle transition emits one [`Diagnostic`] event. Events go
//! out on a subscription bus for external collectors and are mirrored
//! into `tracing` so the runtime stays observable without a collector
//! attached.

use serde::Serialize;

use crate::events::{EventBus, Subscription};

/// One lifecycle transition or notable condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Diagnostic {
    InitializeStarted,
    InitializeCompleted,
    InitializeFailed { reason: String },
    ResetStarted,
    ResetCompleted,
    ReinitializeFailed { reason: String },
    RecordNotFound { id: String },
    Disposed,
}

/// Emitter for lifecycle diagnostics.
#[derive(Clone, Default)]
pub struct Diagnostics {
    bus: EventBus<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collector. Dropping the token unsubscribes it.
    pub fn subscribe(&self, handler: impl Fn(&Diagnostic) + Send + Sync + 'static) -> Subscription {
        self.bus.subscribe(handler)
    }

    pub(crate) fn emit(&self, event: Diagnostic) {
        match &event {
            Diagnostic::InitializeStarted => tracing::info!("initializing viewer resource"),
            Diagnostic::InitializeCompleted => tracing::info!("viewer resource ready"),
            Diagnostic::InitializeFailed { reason } => {
                tracing::error!(%reason, "viewer resource setup failed")
            }
            Diagnostic::ResetStarted => tracing::info!("resetting viewer"),
            Diagnostic::ResetCompleted => tracing::info!("viewer reset complete"),
            Diagnostic::ReinitializeFailed { reason } => {
                tracing::error!(%reason, "reinitialize after reset failed")
            }
            Diagnostic::RecordNotFound { id } => {
                tracing::warn!(model_id = %id, "model record not found")
            }
            Diagnostic::Disposed => tracing::info!("coordinator disposed"),
        }
        self.bus.emit(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn events_reach_subscribers() {
        let diagnostics = Diagnostics::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sub = {
            let seen = Arc::clone(&seen);
            diagnostics.subscribe(move |event| seen.lock().unwrap().push(event.clone()))
        };

        diagnostics.emit(Diagnostic::ResetStarted);
        diagnostics.emit(Diagnostic::RecordNotFound { id: "m1".into() });

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Diagnostic::ResetStarted,
                Diagnostic::RecordNotFound { id: "m1".into() },
            ]
        );
        drop(sub);
    }

    #[test]
    fn serializes_with_event_tag() {
        let json = serde_json::to_value(Diagnostic::InitializeFailed {
            reason: "worker died".into(),
        })
        .unwrap();
        assert_eq!(json["event"], "initialize_failed");
        assert_eq!(json["reason"], "worker died");
    }
}
