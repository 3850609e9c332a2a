// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frame timing monitor.
//!
//! Resource implementations bracket each rendered frame with
//! `begin`/`end`; the monitor keeps a rolling window of frame
//! durations and exposes aggregate statistics.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

const WINDOW: usize = 120;

/// Aggregate frame statistics over the rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameStats {
    /// Frames measured since creation or the last reset.
    pub frames: u64,
    /// Mean frame time over the window, in milliseconds.
    pub average_frame_ms: f64,
    /// Worst frame time over the window, in milliseconds.
    pub worst_frame_ms: f64,
    /// Frames per second implied by the window mean.
    pub fps: f64,
}

/// Rolling-window frame timer.
#[derive(Debug, Default)]
pub struct FrameMonitor {
    frame_started: Option<Instant>,
    samples: VecDeque<Duration>,
    frames: u64,
}

impl FrameMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of a frame. Calling `begin` twice restarts the
    /// measurement; the half-open frame is discarded.
    pub fn begin(&mut self) {
        self.frame_started = Some(Instant::now());
    }

    /// Mark the end of a frame. Without a matching `begin` this is a
    /// no-op.
    pub fn end(&mut self) {
        let Some(started) = self.frame_started.take() else {
            return;
        };
        if self.samples.len() == WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(started.elapsed());
        self.frames += 1;
    }

    /// Drop all samples and the frame counter.
    pub fn reset(&mut self) {
        self.frame_started = None;
        self.samples.clear();
        self.frames = 0;
    }

    pub fn stats(&self) -> FrameStats {
        if self.samples.is_empty() {
            return FrameStats {
                frames: self.frames,
                average_frame_ms: 0.0,
                worst_frame_ms: 0.0,
                fps: 0.0,
            };
        }
        let total: Duration = self.samples.iter().sum();
        let average = total.as_secs_f64() * 1000.0 / self.samples.len() as f64;
        let worst = self
            .samples
            .iter()
            .max()
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        let fps = if average > 0.0 { 1000.0 / average } else { 0.0 };
        FrameStats {
            frames: self.frames,
            average_frame_ms: average,
            worst_frame_ms: worst,
            fps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_completed_frames() {
        let mut monitor = FrameMonitor::new();
        for _ in 0..3 {
            monitor.begin();
            monitor.end();
        }
        let stats = monitor.stats();
        assert_eq!(stats.frames, 3);
        assert!(stats.worst_frame_ms >= stats.average_frame_ms);
    }

    #[test]
    fn end_without_begin_is_a_noop() {
        let mut monitor = FrameMonitor::new();
        monitor.end();
        assert_eq!(monitor.stats().frames, 0);
    }

    #[test]
    fn window_is_bounded() {
        let mut monitor = FrameMonitor::new();
        for _ in 0..(WINDOW + 30) {
            monitor.begin();
            monitor.end();
        }
        assert_eq!(monitor.stats().frames, (WINDOW + 30) as u64);
        assert_eq!(monitor.samples.len(), WINDOW);
    }

    #[test]
    fn reset_clears_samples() {
        let mut monitor = FrameMonitor::new();
        monitor.begin();
        monitor.end();
        monitor.reset();
        let stats = monitor.stats();
        assert_eq!(stats.frames, 0);
        assert_eq!(stats.average_frame_ms, 0.0);
    }
}
