//! Velocity tracking for drag gestures
//!
//! Velocity is the least-squares slope of position over the recent sample
//! history rather than the slope between the last two samples, which jitters
//! badly when touch events arrive unevenly.

use std::collections::VecDeque;

use torque_core::{Point, Vec2};

/// Maximum number of samples kept
const HISTORY_SIZE: usize = 20;

/// Only samples within the last 100ms contribute
const HORIZON_MS: f64 = 100.0;

/// A gap longer than this means the pointer stopped; older samples are ignored
const ASSUME_STOPPED_MS: f64 = 40.0;

#[derive(Clone, Copy, Debug)]
struct Sample {
    time_ms: f64,
    position: Point,
}

/// 2D velocity tracker over a short sample history
#[derive(Clone, Debug, Default)]
pub struct VelocityTracker {
    samples: VecDeque<Sample>,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_SIZE),
        }
    }

    /// Record a position. Timestamps earlier than the newest sample are
    /// clamped to it.
    pub fn add(&mut self, time_ms: f64, position: Point) {
        if !time_ms.is_finite() || !position.is_finite() {
            return;
        }
        let time_ms = match self.samples.back() {
            Some(last) if time_ms < last.time_ms => last.time_ms,
            _ => time_ms,
        };
        if self.samples.len() == HISTORY_SIZE {
            self.samples.pop_front();
        }
        self.samples.push_back(Sample { time_ms, position });
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Velocity in pixels/second; zero with fewer than two usable samples
    pub fn velocity(&self) -> Vec2 {
        let Some(newest) = self.samples.back() else {
            return Vec2::ZERO;
        };

        // Walk back from the newest sample until the horizon or a stop gap
        let mut count = 0;
        let mut previous_time = newest.time_ms;
        for sample in self.samples.iter().rev() {
            if newest.time_ms - sample.time_ms > HORIZON_MS
                || previous_time - sample.time_ms > ASSUME_STOPPED_MS
            {
                break;
            }
            previous_time = sample.time_ms;
            count += 1;
        }
        if count < 2 {
            return Vec2::ZERO;
        }

        let window = self.samples.iter().skip(self.samples.len() - count);
        let n = count as f64;
        let (mut sum_t, mut sum_x, mut sum_y) = (0.0, 0.0, 0.0);
        for s in window.clone() {
            // Seconds relative to the newest sample keeps magnitudes small
            sum_t += (s.time_ms - newest.time_ms) / 1000.0;
            sum_x += f64::from(s.position.x);
            sum_y += f64::from(s.position.y);
        }
        let (mean_t, mean_x, mean_y) = (sum_t / n, sum_x / n, sum_y / n);

        let (mut var_t, mut cov_x, mut cov_y) = (0.0, 0.0, 0.0);
        for s in window {
            let dt = (s.time_ms - newest.time_ms) / 1000.0 - mean_t;
            var_t += dt * dt;
            cov_x += dt * (f64::from(s.position.x) - mean_x);
            cov_y += dt * (f64::from(s.position.y) - mean_y);
        }
        if var_t < 1e-12 {
            return Vec2::ZERO;
        }

        Vec2::new((cov_x / var_t) as f32, (cov_y / var_t) as f32)
    }
}
