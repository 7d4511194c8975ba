//! Gesture recognition
//!
//! Turns raw pointer input into press and drag events:
//!
//! ```text
//! Down ─► PressIn
//! Move past touch slop ─► DragStart, DragUpdate
//! Move while dragging ─► DragUpdate
//! Up ─► [DragEnd] PressOut
//! Cancel ─► [DragEnd (cancelled, zero velocity)] PressOut (cancelled)
//! ```
//!
//! Input that arrives out of order (a `Move`, `Up`, or `Cancel` with no
//! preceding `Down`) is dropped with a warning. A second `Down` while a press
//! is still tracked cancels the stale gesture before starting the new one.

use smallvec::SmallVec;
use torque_core::{Point, Vec2};

use crate::config::GestureConfig;
use crate::velocity::VelocityTracker;

/// Raw pointer phase reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// System interrupted the touch (focus loss, incoming call)
    Cancel,
}

/// A raw pointer sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub phase: PointerPhase,
    pub position: Point,
    /// Milliseconds on any monotonic clock
    pub timestamp_ms: f64,
}

impl PointerInput {
    pub fn new(phase: PointerPhase, x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self {
            phase,
            position: Point::new(x, y),
            timestamp_ms,
        }
    }

    pub fn down(x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self::new(PointerPhase::Down, x, y, timestamp_ms)
    }

    pub fn moved(x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self::new(PointerPhase::Move, x, y, timestamp_ms)
    }

    pub fn up(x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self::new(PointerPhase::Up, x, y, timestamp_ms)
    }

    pub fn cancel(timestamp_ms: f64) -> Self {
        Self::new(PointerPhase::Cancel, 0.0, 0.0, timestamp_ms)
    }
}

/// Drag state at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub timestamp_ms: f64,
    /// Cumulative translation from the press origin
    pub translation: Vec2,
    /// Pixels/second from recent history
    pub velocity: Vec2,
}

/// Classified gesture event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    PressIn { position: Point },
    DragStart { origin: Point },
    DragUpdate(GestureSample),
    /// `cancelled` ends carry zero velocity and must never dismiss
    DragEnd { sample: GestureSample, cancelled: bool },
    PressOut { position: Point, cancelled: bool },
}

pub type GestureEvents = SmallVec<[GestureEvent; 4]>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum GesturePhase {
    Idle,
    Pressed { origin: Point, last: Point },
    Dragging { origin: Point, last: Point },
}

/// Classifies pointer input for one surface
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: GestureConfig,
    drag_enabled: bool,
    phase: GesturePhase,
    tracker: VelocityTracker,
    last_timestamp: f64,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig, drag_enabled: bool) -> Self {
        Self {
            config: config.sanitized(),
            drag_enabled,
            phase: GesturePhase::Idle,
            tracker: VelocityTracker::new(),
            last_timestamp: 0.0,
        }
    }

    pub fn is_tracking(&self) -> bool {
        !matches!(self.phase, GesturePhase::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, GesturePhase::Dragging { .. })
    }

    /// Forget any tracked press without emitting events
    pub fn reset(&mut self) {
        self.phase = GesturePhase::Idle;
        self.tracker.reset();
    }

    pub fn handle(&mut self, input: PointerInput) -> GestureEvents {
        let mut events = GestureEvents::new();

        if input.phase != PointerPhase::Cancel && !input.position.is_finite() {
            tracing::warn!("Dropping pointer {:?} with non-finite position", input.phase);
            return events;
        }
        let timestamp = if input.timestamp_ms.is_finite() && input.timestamp_ms >= self.last_timestamp
        {
            input.timestamp_ms
        } else {
            tracing::debug!(
                "Pointer timestamp {} behind {}, clamping",
                input.timestamp_ms,
                self.last_timestamp
            );
            self.last_timestamp
        };
        self.last_timestamp = timestamp;

        match (self.phase, input.phase) {
            (GesturePhase::Idle, PointerPhase::Down) => {
                self.begin_press(input.position, timestamp, &mut events);
            }

            (_, PointerPhase::Down) => {
                tracing::warn!("Pointer down while a press is tracked; cancelling stale gesture");
                self.cancel_into(timestamp, &mut events);
                self.begin_press(input.position, timestamp, &mut events);
            }

            (GesturePhase::Idle, phase) => {
                tracing::warn!("Ignoring pointer {:?} with no preceding down", phase);
            }

            (GesturePhase::Pressed { origin, .. }, PointerPhase::Move) => {
                self.tracker.add(timestamp, input.position);
                let translation = input.position.offset_from(origin);
                if self.drag_enabled && translation.length() > self.config.touch_slop {
                    self.phase = GesturePhase::Dragging {
                        origin,
                        last: input.position,
                    };
                    events.push(GestureEvent::DragStart { origin });
                    events.push(GestureEvent::DragUpdate(self.sample(timestamp, translation)));
                } else {
                    self.phase = GesturePhase::Pressed {
                        origin,
                        last: input.position,
                    };
                }
            }

            (GesturePhase::Dragging { origin, .. }, PointerPhase::Move) => {
                self.tracker.add(timestamp, input.position);
                self.phase = GesturePhase::Dragging {
                    origin,
                    last: input.position,
                };
                let translation = input.position.offset_from(origin);
                events.push(GestureEvent::DragUpdate(self.sample(timestamp, translation)));
            }

            (GesturePhase::Pressed { .. }, PointerPhase::Up) => {
                self.reset();
                events.push(GestureEvent::PressOut {
                    position: input.position,
                    cancelled: false,
                });
            }

            (GesturePhase::Dragging { origin, .. }, PointerPhase::Up) => {
                self.tracker.add(timestamp, input.position);
                let sample = self.sample(timestamp, input.position.offset_from(origin));
                self.reset();
                events.push(GestureEvent::DragEnd {
                    sample,
                    cancelled: false,
                });
                events.push(GestureEvent::PressOut {
                    position: input.position,
                    cancelled: false,
                });
            }

            (_, PointerPhase::Cancel) => {
                self.cancel_into(timestamp, &mut events);
            }
        }

        events
    }

    /// System interruption: end the tracked gesture with zero residual intent
    pub fn cancel(&mut self) -> GestureEvents {
        let mut events = GestureEvents::new();
        self.cancel_into(self.last_timestamp, &mut events);
        events
    }

    fn begin_press(&mut self, position: Point, timestamp: f64, events: &mut GestureEvents) {
        self.tracker.reset();
        self.tracker.add(timestamp, position);
        self.phase = GesturePhase::Pressed {
            origin: position,
            last: position,
        };
        events.push(GestureEvent::PressIn { position });
    }

    fn cancel_into(&mut self, timestamp: f64, events: &mut GestureEvents) {
        match self.phase {
            GesturePhase::Idle => {}
            GesturePhase::Pressed { last, .. } => {
                events.push(GestureEvent::PressOut {
                    position: last,
                    cancelled: true,
                });
            }
            GesturePhase::Dragging { origin, last } => {
                events.push(GestureEvent::DragEnd {
                    sample: GestureSample {
                        timestamp_ms: timestamp,
                        translation: last.offset_from(origin),
                        velocity: Vec2::ZERO,
                    },
                    cancelled: true,
                });
                events.push(GestureEvent::PressOut {
                    position: last,
                    cancelled: true,
                });
            }
        }
        self.reset();
    }

    fn sample(&self, timestamp_ms: f64, translation: Vec2) -> GestureSample {
        GestureSample {
            timestamp_ms,
            translation,
            velocity: self
                .tracker
                .velocity()
                .clamp_components(self.config.max_velocity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognizer() -> GestureRecognizer {
        GestureRecognizer::new(GestureConfig::default(), true)
    }

    #[test]
    fn test_tap_emits_press_in_and_out() {
        let mut g = recognizer();
        let events = g.handle(PointerInput::down(50.0, 50.0, 0.0));
        assert_eq!(
            events.as_slice(),
            &[GestureEvent::PressIn {
                position: Point::new(50.0, 50.0)
            }]
        );

        // Within slop: no drag
        assert!(g.handle(PointerInput::moved(53.0, 52.0, 16.0)).is_empty());

        let events = g.handle(PointerInput::up(53.0, 52.0, 32.0));
        assert_eq!(
            events.as_slice(),
            &[GestureEvent::PressOut {
                position: Point::new(53.0, 52.0),
                cancelled: false
            }]
        );
        assert!(!g.is_tracking());
    }

    #[test]
    fn test_drag_start_update_end() {
        let mut g = recognizer();
        g.handle(PointerInput::down(0.0, 0.0, 0.0));

        let events = g.handle(PointerInput::moved(0.0, 20.0, 16.0));
        assert!(matches!(events[0], GestureEvent::DragStart { .. }));
        let GestureEvent::DragUpdate(sample) = events[1] else {
            panic!("expected update, got {:?}", events[1]);
        };
        assert_eq!(sample.translation, Vec2::new(0.0, 20.0));

        for i in 2..6 {
            g.handle(PointerInput::moved(0.0, 20.0 * i as f32, 16.0 * i as f64));
        }

        let events = g.handle(PointerInput::up(0.0, 120.0, 96.0));
        let GestureEvent::DragEnd { sample, cancelled } = events[0] else {
            panic!("expected drag end, got {:?}", events[0]);
        };
        assert!(!cancelled);
        assert_eq!(sample.translation, Vec2::new(0.0, 120.0));
        assert!(sample.velocity.y > 1000.0, "velocity {}", sample.velocity.y);
        assert!(matches!(
            events[1],
            GestureEvent::PressOut {
                cancelled: false,
                ..
            }
        ));
    }

    #[test]
    fn test_cancel_mid_drag_is_benign() {
        let mut g = recognizer();
        g.handle(PointerInput::down(0.0, 0.0, 0.0));
        g.handle(PointerInput::moved(40.0, 0.0, 16.0));
        g.handle(PointerInput::moved(80.0, 0.0, 32.0));

        let events = g.handle(PointerInput::cancel(40.0));
        assert_eq!(events.len(), 2);
        let GestureEvent::DragEnd { sample, cancelled } = events[0] else {
            panic!("expected drag end");
        };
        assert!(cancelled);
        assert_eq!(sample.velocity, Vec2::ZERO);
        assert_eq!(sample.translation, Vec2::new(80.0, 0.0));
        assert!(matches!(
            events[1],
            GestureEvent::PressOut {
                cancelled: true,
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_order_events_ignored() {
        let mut g = recognizer();
        assert!(g.handle(PointerInput::up(0.0, 0.0, 0.0)).is_empty());
        assert!(g.handle(PointerInput::moved(10.0, 0.0, 5.0)).is_empty());
        assert!(g.handle(PointerInput::cancel(6.0)).is_empty());
        assert!(g.cancel().is_empty());
        assert!(!g.is_tracking());
    }

    #[test]
    fn test_second_down_cancels_stale_press() {
        let mut g = recognizer();
        g.handle(PointerInput::down(0.0, 0.0, 0.0));
        g.handle(PointerInput::moved(0.0, 30.0, 16.0));

        let events = g.handle(PointerInput::down(100.0, 100.0, 200.0));
        assert!(matches!(
            events[0],
            GestureEvent::DragEnd {
                cancelled: true,
                ..
            }
        ));
        assert!(matches!(
            events[1],
            GestureEvent::PressOut {
                cancelled: true,
                ..
            }
        ));
        assert_eq!(
            events[2],
            GestureEvent::PressIn {
                position: Point::new(100.0, 100.0)
            }
        );
        assert!(g.is_tracking());
        assert!(!g.is_dragging());
    }

    #[test]
    fn test_drag_disabled_only_presses() {
        let mut g = GestureRecognizer::new(GestureConfig::default(), false);
        g.handle(PointerInput::down(0.0, 0.0, 0.0));
        assert!(g.handle(PointerInput::moved(0.0, 200.0, 16.0)).is_empty());
        let events = g.handle(PointerInput::up(0.0, 200.0, 32.0));
        assert!(matches!(events[0], GestureEvent::PressOut { .. }));
    }

    #[test]
    fn test_velocity_capped() {
        let mut g = recognizer();
        g.handle(PointerInput::down(0.0, 0.0, 0.0));
        g.handle(PointerInput::moved(0.0, 500.0, 1.0));
        let events = g.handle(PointerInput::up(0.0, 1000.0, 2.0));
        let GestureEvent::DragEnd { sample, .. } = events[0] else {
            panic!("expected drag end");
        };
        assert_eq!(sample.velocity.y, 8000.0);
    }
}
