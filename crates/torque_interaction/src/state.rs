//! Combined interaction state
//!
//! `InteractionPhase` is the surface-level state machine:
//!
//! ```text
//! Idle ─PressIn─► Pressed ─DragBegan─► DraggingInBounds ◄──┐
//!  ▲                 │                   │   EnteredOverscroll│ReturnedInBounds
//!  │                 │                   ▼                    │
//!  │                 │                 DraggingOverscrolled ──┘
//!  │                 │ PressOut/Cancel   │ PressOut/Cancel
//!  │                 ▼                   ▼
//!  └────Settled─── Released ◄────────────┘
//!                    │ PressIn (interrupts the settle)
//!                    └──────────► Pressed
//! ```

use torque_core::{Point, StateTransitions, Vec2};

use crate::bloom::BloomSnapshot;
use crate::overscroll::OverscrollZone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionPhase {
    #[default]
    Idle,
    Pressed,
    DraggingInBounds,
    DraggingOverscrolled,
    /// Finger lifted, animations settling
    Released,
}

impl InteractionPhase {
    pub fn is_dragging(&self) -> bool {
        matches!(
            self,
            InteractionPhase::DraggingInBounds | InteractionPhase::DraggingOverscrolled
        )
    }

    /// Finger down, dragging or not
    pub fn is_pressed(&self) -> bool {
        matches!(self, InteractionPhase::Pressed) || self.is_dragging()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseEvent {
    PressIn,
    DragBegan,
    EnteredOverscroll,
    ReturnedInBounds,
    PressOut,
    Cancel,
    /// Every animation came to rest
    Settled,
}

impl StateTransitions for InteractionPhase {
    type Event = PhaseEvent;

    fn on_event(&self, event: PhaseEvent) -> Option<Self> {
        use InteractionPhase::*;
        use PhaseEvent as E;

        match (self, event) {
            (Idle | Released, E::PressIn) => Some(Pressed),
            (Pressed, E::DragBegan) => Some(DraggingInBounds),
            (DraggingInBounds, E::EnteredOverscroll) => Some(DraggingOverscrolled),
            (DraggingOverscrolled, E::ReturnedInBounds) => Some(DraggingInBounds),
            (Pressed | DraggingInBounds | DraggingOverscrolled, E::PressOut | E::Cancel) => {
                Some(Released)
            }
            (Released, E::Settled) => Some(Idle),
            _ => None,
        }
    }
}

/// Per-surface values a renderer draws from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionState {
    pub offset: Vec2,
    /// Zero whenever nothing is moving
    pub velocity: Vec2,
    pub scale: f32,
    pub opacity: f32,
    /// Degrees
    pub rotation: f32,
    pub is_pressed: bool,
    pub is_dragging: bool,
    pub has_overscrolled: bool,
    pub bloom_origin: Option<Point>,
    /// In [0, 1]
    pub bloom_progress: f32,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            velocity: Vec2::ZERO,
            scale: 1.0,
            opacity: 1.0,
            rotation: 0.0,
            is_pressed: false,
            is_dragging: false,
            has_overscrolled: false,
            bloom_origin: None,
            bloom_progress: 0.0,
        }
    }
}

/// Immutable copy of a surface, published after each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSnapshot {
    pub phase: InteractionPhase,
    pub state: InteractionState,
    pub zone: OverscrollZone,
    pub dismissed: bool,
    /// Renderer hint carried from config
    pub adaptive_glass: bool,
    pub bloom: Option<BloomSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use torque_core::StateMachine;

    #[test]
    fn test_drag_cycle() {
        let mut fsm = StateMachine::new(InteractionPhase::Idle);
        fsm.send(PhaseEvent::PressIn);
        fsm.send(PhaseEvent::DragBegan);
        assert_eq!(fsm.send(PhaseEvent::EnteredOverscroll), InteractionPhase::DraggingOverscrolled);
        assert_eq!(fsm.send(PhaseEvent::ReturnedInBounds), InteractionPhase::DraggingInBounds);
        assert_eq!(fsm.send(PhaseEvent::PressOut), InteractionPhase::Released);
        assert_eq!(fsm.send(PhaseEvent::Settled), InteractionPhase::Idle);
    }

    #[test]
    fn test_press_interrupts_settle() {
        let mut fsm = StateMachine::new(InteractionPhase::Released);
        assert_eq!(fsm.send(PhaseEvent::PressIn), InteractionPhase::Pressed);
    }

    #[test]
    fn test_unhandled_events_leave_phase() {
        let all = [
            PhaseEvent::PressIn,
            PhaseEvent::DragBegan,
            PhaseEvent::EnteredOverscroll,
            PhaseEvent::ReturnedInBounds,
            PhaseEvent::PressOut,
            PhaseEvent::Cancel,
            PhaseEvent::Settled,
        ];
        let mut fsm = StateMachine::new(InteractionPhase::Idle);
        for event in all {
            if event != PhaseEvent::PressIn {
                assert_eq!(fsm.send(event), InteractionPhase::Idle);
            }
        }
        // Overscroll events only matter while dragging
        fsm.send(PhaseEvent::PressIn);
        assert_eq!(fsm.send(PhaseEvent::EnteredOverscroll), InteractionPhase::Pressed);
        assert_eq!(fsm.send(PhaseEvent::Cancel), InteractionPhase::Released);
    }

    #[test]
    fn test_phase_flags() {
        assert!(InteractionPhase::DraggingOverscrolled.is_pressed());
        assert!(InteractionPhase::Pressed.is_pressed());
        assert!(!InteractionPhase::Pressed.is_dragging());
        assert!(!InteractionPhase::Released.is_pressed());
    }
}
