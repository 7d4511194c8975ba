//! Integration tests for state machines + spring animation
//!
//! These tests verify that:
//! - FSM state transitions can drive spring targets
//! - Interrupting a settle keeps the spring's velocity
//! - Callbacks produced by transitions dispatch in order

use std::sync::{Arc, Mutex};

use torque_animation::{Spring, SpringConfig};
use torque_core::fsm::{StateMachine, StateTransitions};
use torque_core::{CallbackDispatcher, CallbackKind, InteractionCallback, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressState {
    Idle,
    Pressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressEvent {
    Down,
    Up,
}

impl StateTransitions for PressState {
    type Event = PressEvent;

    fn on_event(&self, event: PressEvent) -> Option<Self> {
        match (self, event) {
            (PressState::Idle, PressEvent::Down) => Some(PressState::Pressed),
            (PressState::Pressed, PressEvent::Up) => Some(PressState::Idle),
            _ => None,
        }
    }
}

fn scale_for(state: PressState) -> f32 {
    match state {
        PressState::Idle => 1.0,
        PressState::Pressed => 0.95,
    }
}

/// Test that FSM transitions drive spring targets
#[test]
fn test_fsm_drives_spring_target() {
    let mut fsm = StateMachine::new(PressState::Idle);
    let mut scale = Spring::new(SpringConfig::snappy(), 1.0).with_rest_thresholds(1e-4, 1e-3);

    let state = fsm.send(PressEvent::Down);
    scale.set_target(scale_for(state));

    for _ in 0..120 {
        scale.step(1.0 / 60.0);
    }
    assert!(scale.is_settled());
    assert_eq!(scale.value(), 0.95);

    let state = fsm.send(PressEvent::Up);
    scale.set_target(scale_for(state));
    for _ in 0..120 {
        scale.step(1.0 / 60.0);
    }
    assert_eq!(scale.value(), 1.0);
}

/// Test that a quick press-release keeps the spring velocity continuous
#[test]
fn test_interrupted_press_keeps_velocity() {
    let mut fsm = StateMachine::new(PressState::Idle);
    let mut scale = Spring::new(SpringConfig::default(), 1.0);

    scale.set_target(scale_for(fsm.send(PressEvent::Down)));
    for _ in 0..3 {
        scale.step(1.0 / 60.0);
    }
    let velocity = scale.velocity();
    assert!(velocity < 0.0);

    scale.set_target(scale_for(fsm.send(PressEvent::Up)));
    assert_eq!(scale.velocity(), velocity);
    assert!(!scale.is_settled());
}

/// Test that callbacks derived from transitions reach handlers in order
#[test]
fn test_transition_callbacks_dispatch() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut dispatcher = CallbackDispatcher::new();
    let log_clone = log.clone();
    dispatcher.register(CallbackKind::Press, move |cb| {
        if let InteractionCallback::Press { position } = cb {
            log_clone.lock().unwrap().push(*position);
        }
    });

    let mut fsm = StateMachine::new(PressState::Idle);
    for x in [10.0, 20.0] {
        fsm.send(PressEvent::Down);
        if fsm.send(PressEvent::Up) == PressState::Idle {
            dispatcher.dispatch(&InteractionCallback::Press {
                position: Point::new(x, 0.0),
            });
        }
    }

    assert_eq!(
        *log.lock().unwrap(),
        vec![Point::new(10.0, 0.0), Point::new(20.0, 0.0)]
    );
    assert_eq!(fsm.history().count(), 4);
}
