//! Torque Core
//!
//! Foundational primitives shared by the Torque interaction layer:
//!
//! - **Geometry**: points and vectors in logical pixels
//! - **Callbacks**: discrete interaction events handed to the host
//! - **State Machines**: enum-based, total transition functions
//!
//! # Example
//!
//! ```rust
//! use torque_core::{CallbackDispatcher, CallbackKind, InteractionCallback, Point};
//!
//! let mut dispatcher = CallbackDispatcher::new();
//! dispatcher.register(CallbackKind::Press, |cb| {
//!     println!("tapped: {:?}", cb);
//! });
//!
//! dispatcher.dispatch(&InteractionCallback::Press {
//!     position: Point::new(50.0, 50.0),
//! });
//! ```

pub mod events;
pub mod fsm;
pub mod geometry;

pub use events::{
    CallbackDispatcher, CallbackKind, Callbacks, HapticPulse, HapticStyle, HapticTrigger,
    InteractionCallback,
};
pub use fsm::{StateMachine, StateTransitions};
pub use geometry::{Axis, Point, Vec2};
