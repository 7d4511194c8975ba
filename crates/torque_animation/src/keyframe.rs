//! Keyframe animations
//!
//! Fixed-duration, single-value animations advanced by the frame clock.
//! Unlike springs they end exactly when their duration has elapsed.

use crate::easing::Easing;

/// A single keyframe
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    /// Time position (0.0 to 1.0)
    pub time: f32,
    /// Value at this keyframe
    pub value: f32,
    /// Easing function to use when transitioning TO this keyframe
    pub easing: Easing,
}

impl Keyframe {
    pub const fn new(time: f32, value: f32, easing: Easing) -> Self {
        Self {
            time,
            value,
            easing,
        }
    }
}

/// A keyframe-based animation (single value)
#[derive(Clone, Debug)]
pub struct KeyframeAnimation {
    duration_ms: f32,
    keyframes: Vec<Keyframe>,
    current_time: f32,
    playing: bool,
}

impl KeyframeAnimation {
    /// Keyframes are sorted by time; a non-positive duration completes on the
    /// first tick.
    pub fn new(duration_ms: f32, mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            duration_ms: if duration_ms.is_finite() {
                duration_ms.max(0.0)
            } else {
                0.0
            },
            keyframes,
            current_time: 0.0,
            playing: false,
        }
    }

    pub fn start(&mut self) {
        self.current_time = 0.0;
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.current_time
    }

    /// Whether the animation ran to its full duration
    pub fn is_finished(&self) -> bool {
        !self.playing && self.current_time >= self.duration_ms
    }

    /// Normalized time (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return if self.current_time > 0.0 || !self.playing {
                1.0
            } else {
                0.0
            };
        }
        (self.current_time / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Get the current interpolated value
    pub fn value(&self) -> f32 {
        self.value_at(self.progress())
    }

    /// Interpolated value at a normalized time
    pub fn value_at(&self, progress: f32) -> f32 {
        let Some(first) = self.keyframes.first() else {
            return 0.0;
        };

        let mut prev = first;
        let mut next = first;
        for kf in &self.keyframes {
            if kf.time <= progress {
                prev = kf;
            }
            if kf.time >= progress {
                next = kf;
                break;
            }
        }

        if (next.time - prev.time).abs() < f32::EPSILON {
            return if progress >= next.time {
                next.value
            } else {
                prev.value
            };
        }

        let local = (progress - prev.time) / (next.time - prev.time);
        prev.value + (next.value - prev.value) * next.easing.apply(local)
    }

    /// Advance the animation by delta time (in milliseconds). The last tick
    /// lands exactly on the duration.
    pub fn tick(&mut self, dt_ms: f32) {
        if !self.playing || !dt_ms.is_finite() || dt_ms < 0.0 {
            return;
        }

        self.current_time += dt_ms;
        if self.current_time >= self.duration_ms {
            self.current_time = self.duration_ms;
            self.playing = false;
        }
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rise_and_fall() -> KeyframeAnimation {
        KeyframeAnimation::new(
            400.0,
            vec![
                Keyframe::new(0.0, 0.0, Easing::Linear),
                Keyframe::new(0.5, 1.0, Easing::Linear),
                Keyframe::new(1.0, 0.0, Easing::Linear),
            ],
        )
    }

    #[test]
    fn test_interpolates_between_keyframes() {
        let mut anim = rise_and_fall();
        anim.start();

        anim.tick(100.0);
        assert!((anim.value() - 0.5).abs() < 1e-6);

        anim.tick(100.0);
        assert!((anim.value() - 1.0).abs() < 1e-6);

        anim.tick(100.0);
        assert!((anim.value() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_lands_exactly_on_duration() {
        let mut anim = rise_and_fall();
        anim.start();
        for _ in 0..30 {
            anim.tick(16.0);
        }
        assert!(!anim.is_playing());
        assert!(anim.is_finished());
        assert_eq!(anim.elapsed_ms(), 400.0);
        assert_eq!(anim.value(), 0.0);
    }

    #[test]
    fn test_not_started_does_not_advance() {
        let mut anim = rise_and_fall();
        anim.tick(100.0);
        assert_eq!(anim.elapsed_ms(), 0.0);
        assert!(!anim.is_finished());
    }

    #[test]
    fn test_unsorted_keyframes_are_sorted() {
        let anim = KeyframeAnimation::new(
            100.0,
            vec![
                Keyframe::new(1.0, 10.0, Easing::Linear),
                Keyframe::new(0.0, 0.0, Easing::Linear),
            ],
        );
        assert_eq!(anim.keyframes()[0].time, 0.0);
        assert!((anim.value_at(0.25) - 2.5).abs() < 1e-5);
    }
}
