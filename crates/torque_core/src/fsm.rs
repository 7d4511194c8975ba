//! State Machine Runtime
//!
//! Flat, enum-based state machines for interaction states. A state type
//! describes its own transitions with [`StateTransitions`]; [`StateMachine`]
//! holds the current state and a bounded transition history for debugging.

use std::collections::VecDeque;
use std::fmt::Debug;

/// Maximum number of transitions kept in history
const HISTORY_LIMIT: usize = 32;

/// Trait for state types that react to events
///
/// `on_event` returns `None` when the state does not react to the event, so
/// the machine's transition function stays total: every `(state, event)` pair
/// has an outcome.
///
/// # Example
///
/// ```
/// use torque_core::fsm::{StateMachine, StateTransitions};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Button {
///     Idle,
///     Pressed,
/// }
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Input {
///     Down,
///     Up,
/// }
///
/// impl StateTransitions for Button {
///     type Event = Input;
///
///     fn on_event(&self, event: Input) -> Option<Self> {
///         match (self, event) {
///             (Button::Idle, Input::Down) => Some(Button::Pressed),
///             (Button::Pressed, Input::Up) => Some(Button::Idle),
///             _ => None,
///         }
///     }
/// }
///
/// let mut fsm = StateMachine::new(Button::Idle);
/// assert_eq!(fsm.send(Input::Down), Button::Pressed);
/// assert_eq!(fsm.send(Input::Down), Button::Pressed);
/// assert_eq!(fsm.send(Input::Up), Button::Idle);
/// ```
pub trait StateTransitions: Copy + PartialEq + Debug + Send + 'static {
    type Event: Copy + Debug + Send + 'static;

    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: Self::Event) -> Option<Self>;
}

/// A state machine instance
#[derive(Debug, Clone)]
pub struct StateMachine<S: StateTransitions> {
    current_state: S,
    /// History of state transitions (for debugging)
    history: VecDeque<(S, S::Event, S)>,
}

impl<S: StateTransitions> StateMachine<S> {
    pub fn new(initial_state: S) -> Self {
        Self {
            current_state: initial_state,
            history: VecDeque::new(),
        }
    }

    /// Get the current state
    pub fn current_state(&self) -> S {
        self.current_state
    }

    /// Check if we're in a specific state
    pub fn is_in(&self, state: S) -> bool {
        self.current_state == state
    }

    /// Get transition history, oldest first
    pub fn history(&self) -> impl Iterator<Item = &(S, S::Event, S)> {
        self.history.iter()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Check if an event would trigger a transition from the current state
    pub fn can_send(&self, event: S::Event) -> bool {
        self.current_state.on_event(event).is_some()
    }

    /// Send an event, potentially triggering a transition. Returns the
    /// resulting state.
    pub fn send(&mut self, event: S::Event) -> S {
        let current = self.current_state;
        let Some(next) = current.on_event(event) else {
            return current;
        };

        if next != current {
            tracing::debug!("{:?} --{:?}--> {:?}", current, event, next);
        }

        self.current_state = next;
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back((current, event, next));
        next
    }

    /// Force a state without an event (unmount, hard reset)
    pub fn reset(&mut self, state: S) {
        self.current_state = state;
        self.history.clear();
    }
}
