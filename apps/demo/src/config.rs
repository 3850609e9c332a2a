// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Demo configuration loaded from environment variables.

use std::time::Duration;

/// Demo configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Delay between disposal and reinitialization during reset.
    pub settle_delay: Duration,
    /// Simulated setup latency of the fake converter.
    pub setup_latency: Duration,
    /// Frames the fake converter renders per load.
    pub frames_per_load: u32,
    /// Display name of the demo model.
    pub model_name: String,
    /// Where the exported fragment is written.
    pub fragment_path: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            settle_delay: Duration::from_millis(
                std::env::var("SETTLE_DELAY_MS")
                    .unwrap_or_else(|_| "200".into())
                    .parse()
                    .unwrap_or(200),
            ),
            setup_latency: Duration::from_millis(
                std::env::var("SETUP_LATENCY_MS")
                    .unwrap_or_else(|_| "50".into())
                    .parse()
                    .unwrap_or(50),
            ),
            frames_per_load: std::env::var("FRAMES_PER_LOAD")
                .unwrap_or_else(|_| "60".into())
                .parse()
                .unwrap_or(60),
            model_name: std::env::var("MODEL_NAME").unwrap_or_else(|_| "school_str".into()),
            fragment_path: std::env::var("FRAGMENT_PATH")
                .unwrap_or_else(|_| "fragments.frag".into()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
