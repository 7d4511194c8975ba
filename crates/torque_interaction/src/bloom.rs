//! Touch-anchored bloom feedback
//!
//! A press starts a radial bloom at the touch point. The bloom is timed, not
//! spring-driven: it expands to its peak over the first half of the duration
//! and fades out over the second half, whatever the finger does meanwhile.

use torque_animation::{Keyframe, KeyframeAnimation};
use torque_core::{HapticPulse, HapticTrigger, Point};

use crate::config::BloomConfig;

/// Time of the peak, as a fraction of the duration
const PEAK: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BloomPhase {
    #[default]
    Idle,
    Expanding,
    Fading,
}

/// Renderer-facing bloom state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSnapshot {
    pub origin: Point,
    /// Intensity in [0, 1]
    pub progress: f32,
    pub radius: f32,
    pub opacity: f32,
}

/// Runs at most one bloom at a time for a surface
#[derive(Debug, Clone)]
pub struct BloomFeedbackEngine {
    config: BloomConfig,
    enabled: bool,
    animation: KeyframeAnimation,
    origin: Option<Point>,
}

impl BloomFeedbackEngine {
    pub fn new(config: BloomConfig, enabled: bool) -> Self {
        let config = config.sanitized();
        let animation = KeyframeAnimation::new(
            config.duration_ms,
            vec![
                Keyframe::new(0.0, 0.0, config.expand_easing),
                Keyframe::new(PEAK, 1.0, config.expand_easing),
                Keyframe::new(1.0, 0.0, config.fade_easing),
            ],
        );
        Self {
            config,
            enabled,
            animation,
            origin: None,
        }
    }

    pub fn config(&self) -> &BloomConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start a bloom at `origin`, replacing any running one. Returns the
    /// haptic to fire, if blooms are enabled.
    pub fn press_in(&mut self, origin: Point) -> Option<HapticPulse> {
        if !self.enabled {
            return None;
        }
        if self.is_active() {
            tracing::trace!("Restarting bloom at ({:.1}, {:.1})", origin.x, origin.y);
        }
        self.origin = Some(origin);
        self.animation.start();
        Some(HapticPulse {
            style: self.config.haptic,
            trigger: HapticTrigger::Press,
        })
    }

    /// Advance by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if !self.is_active() {
            return;
        }
        self.animation.tick(dt * 1000.0);
        if !self.animation.is_playing() {
            tracing::trace!("Bloom finished after {:.1}ms", self.animation.elapsed_ms());
            self.origin = None;
        }
    }

    pub fn is_active(&self) -> bool {
        self.origin.is_some() && self.animation.is_playing()
    }

    pub fn phase(&self) -> BloomPhase {
        if !self.is_active() {
            BloomPhase::Idle
        } else if self.animation.progress() < PEAK {
            BloomPhase::Expanding
        } else {
            BloomPhase::Fading
        }
    }

    pub fn origin(&self) -> Option<Point> {
        self.origin
    }

    /// Intensity in [0, 1]: 0 at start, 1 at the peak, 0 at the end
    pub fn progress(&self) -> f32 {
        if self.is_active() {
            self.animation.value().clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn elapsed_ms(&self) -> f32 {
        if self.is_active() {
            self.animation.elapsed_ms()
        } else {
            0.0
        }
    }

    pub fn remaining_ms(&self) -> f32 {
        if self.is_active() {
            self.animation.duration_ms() - self.animation.elapsed_ms()
        } else {
            0.0
        }
    }

    /// Radius grows with the expansion and holds while fading
    pub fn radius(&self) -> f32 {
        if !self.is_active() {
            return 0.0;
        }
        let grown = (self.animation.progress() / PEAK).min(1.0);
        self.config.max_radius * self.config.expand_easing.apply(grown)
    }

    pub fn opacity(&self) -> f32 {
        self.config.peak_opacity * self.progress()
    }

    /// Drop a running bloom
    pub fn cancel(&mut self) {
        self.animation.stop();
        self.origin = None;
    }

    pub fn snapshot(&self) -> Option<BloomSnapshot> {
        let origin = self.origin.filter(|_| self.is_active())?;
        Some(BloomSnapshot {
            origin,
            progress: self.progress(),
            radius: self.radius(),
            opacity: self.opacity(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use torque_core::HapticStyle;

    const FRAME: f32 = 1.0 / 60.0;

    fn engine() -> BloomFeedbackEngine {
        BloomFeedbackEngine::new(BloomConfig::default(), true)
    }

    #[test]
    fn test_press_records_origin_and_fires_haptic() {
        let mut bloom = engine();
        let pulse = bloom.press_in(Point::new(50.0, 50.0)).unwrap();
        assert_eq!(pulse.style, HapticStyle::Light);
        assert_eq!(pulse.trigger, HapticTrigger::Press);
        assert_eq!(bloom.origin(), Some(Point::new(50.0, 50.0)));
        assert_eq!(bloom.phase(), BloomPhase::Expanding);
        assert_eq!(bloom.progress(), 0.0);
    }

    #[test]
    fn test_progress_rises_then_falls() {
        let mut bloom = engine();
        bloom.press_in(Point::ZERO);

        let mut last = bloom.progress();
        let mut last_phase = bloom.phase();
        let mut peaked = false;
        while bloom.is_active() {
            bloom.tick(FRAME);
            let progress = bloom.progress();
            let phase = bloom.phase();
            match (last_phase, phase) {
                (BloomPhase::Expanding, BloomPhase::Expanding) => {
                    assert!(progress >= last, "{} < {}", progress, last)
                }
                (BloomPhase::Fading, BloomPhase::Fading) => {
                    peaked = true;
                    assert!(progress <= last, "{} > {}", progress, last);
                }
                _ => {}
            }
            last = progress;
            last_phase = phase;
        }
        assert!(peaked);
        assert_eq!(bloom.progress(), 0.0);
    }

    #[test]
    fn test_duration_within_one_frame() {
        let mut bloom = engine();
        bloom.press_in(Point::ZERO);
        let mut elapsed = 0.0;
        while bloom.is_active() {
            bloom.tick(FRAME);
            elapsed += FRAME * 1000.0;
        }
        assert!((elapsed - 600.0).abs() <= FRAME * 1000.0, "elapsed {}", elapsed);
    }

    #[test]
    fn test_remaining_counts_down_with_ticks() {
        let mut bloom = engine();
        bloom.press_in(Point::new(50.0, 50.0));
        bloom.tick(0.1);
        let remaining = bloom.remaining_ms();
        assert!((remaining - 500.0).abs() < 1e-3);
        bloom.tick(0.1);
        assert!((bloom.remaining_ms() - 400.0).abs() < 1e-3);
        assert_eq!(bloom.origin(), Some(Point::new(50.0, 50.0)));
    }

    #[test]
    fn test_new_press_restarts_at_new_origin() {
        let mut bloom = engine();
        bloom.press_in(Point::new(10.0, 10.0));
        bloom.tick(0.4);
        bloom.press_in(Point::new(80.0, 20.0));
        assert_eq!(bloom.origin(), Some(Point::new(80.0, 20.0)));
        assert!((bloom.remaining_ms() - 600.0).abs() < 1e-3);
    }

    #[test]
    fn test_disabled_bloom_is_silent() {
        let mut bloom = BloomFeedbackEngine::new(BloomConfig::default(), false);
        assert!(bloom.press_in(Point::ZERO).is_none());
        assert!(!bloom.is_active());
        assert!(bloom.snapshot().is_none());
    }

    #[test]
    fn test_visuals_follow_progress() {
        let mut bloom = engine();
        bloom.press_in(Point::ZERO);
        bloom.tick(0.3);
        let snapshot = bloom.snapshot().unwrap();
        assert!((snapshot.progress - 1.0).abs() < 1e-4);
        assert!((snapshot.radius - 120.0).abs() < 1e-3);
        assert!((snapshot.opacity - 0.35).abs() < 1e-4);

        bloom.cancel();
        assert_eq!(bloom.phase(), BloomPhase::Idle);
        assert_eq!(bloom.radius(), 0.0);
    }
}
