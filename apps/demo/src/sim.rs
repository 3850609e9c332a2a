// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simulated converter resource.
//!
//! Stands in for the real IFC/fragment conversion library: setup takes
//! configurable latency, a load "renders" a few frames through the
//! frame monitor and produces a fake fragment binary, and model-load
//! events go out on the coordinator's event bus.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fragview_runtime::{
    ComponentsHandle, Error, EventBus, FrameMonitor, ModelEvent, ModelTree, ResourceFactory,
    Result, Surface, ViewerResource,
};

/// Auxiliary context the simulated converter exposes to consumers.
#[derive(Debug)]
pub struct SimComponents {
    pub instance: u64,
}

struct SimTree {
    model_id: String,
}

impl ModelTree for SimTree {
    fn detach(&self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::debug!(model_id = %self.model_id, "tree detached");
        Ok(())
    }
}

pub struct SimConverter {
    instance: u64,
    surface_label: String,
    setup_latency: Duration,
    frames_per_load: u32,
    events: EventBus<ModelEvent>,
    monitor: FrameMonitor,
    fragment: Option<Vec<u8>>,
    disposed: bool,
}

#[async_trait]
impl ViewerResource for SimConverter {
    async fn setup(&mut self) -> Result<()> {
        tracing::debug!(
            instance = self.instance,
            surface = %self.surface_label,
            "setting up simulated converter"
        );
        tokio::time::sleep(self.setup_latency).await;
        Ok(())
    }

    fn components(&self) -> ComponentsHandle {
        ComponentsHandle::new(SimComponents {
            instance: self.instance,
        })
    }

    async fn load(&mut self, name: &str, data: Vec<u8>) -> Result<()> {
        if data.is_empty() {
            return Err(Error::external("empty model data"));
        }

        for _ in 0..self.frames_per_load {
            self.monitor.begin();
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.monitor.end();
        }
        let stats = self.monitor.stats();
        tracing::info!(
            model = %name,
            frames = stats.frames,
            fps = stats.fps,
            average_frame_ms = stats.average_frame_ms,
            "conversion frames rendered"
        );

        // Fake fragment binary: magic, instance tag, then the payload.
        let mut fragment = b"FRAG".to_vec();
        fragment.extend_from_slice(&self.instance.to_le_bytes());
        fragment.extend_from_slice(&data);
        self.fragment = Some(fragment);

        let id = format!("model-{}", name);
        self.events.emit(&ModelEvent::Loaded {
            id: id.clone(),
            name: name.to_string(),
        });
        self.events.emit(&ModelEvent::TreeReady {
            id: id.clone(),
            tree: Arc::new(SimTree { model_id: id }),
        });
        Ok(())
    }

    fn fragment(&self) -> Option<Vec<u8>> {
        self.fragment.clone()
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.monitor.reset();
        tracing::debug!(instance = self.instance, "simulated converter disposed");
    }
}

/// Builds simulated converters with monotonically numbered instances.
pub struct SimFactory {
    setup_latency: Duration,
    frames_per_load: u32,
    next_instance: AtomicU64,
}

impl SimFactory {
    pub fn new(setup_latency: Duration, frames_per_load: u32) -> Self {
        Self {
            setup_latency,
            frames_per_load,
            next_instance: AtomicU64::new(1),
        }
    }
}

impl ResourceFactory for SimFactory {
    fn create(
        &self,
        surface: &Surface,
        model_events: EventBus<ModelEvent>,
    ) -> Result<Box<dyn ViewerResource>> {
        let instance = self.next_instance.fetch_add(1, Ordering::SeqCst);
        let surface_label = surface
            .downcast_ref::<String>()
            .cloned()
            .unwrap_or_else(|| "unknown".into());
        Ok(Box::new(SimConverter {
            instance,
            surface_label,
            setup_latency: self.setup_latency,
            frames_per_load: self.frames_per_load,
            events: model_events,
            monitor: FrameMonitor::new(),
            fragment: None,
            disposed: false,
        }))
    }
}
