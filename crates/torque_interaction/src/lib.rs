//! Torque Interaction
//!
//! Touch-interaction physics for interactive surfaces: cards, scroll
//! containers and modal sheets.
//!
//! - **Gestures**: pointer input classified into press and drag events
//! - **Overscroll**: rubberband resistance with edge-triggered zone callbacks
//! - **Dismissal**: swipe-to-dismiss by velocity or distance
//! - **Bloom**: timed, touch-anchored radial feedback with a haptic pulse
//! - **Surfaces**: all of the above composed and driven by springs
//! - **Runtime**: a single physics task behind a channel boundary
//!
//! Physics never fails. Degenerate configuration is replaced by defaults,
//! out-of-order input is dropped, and interrupted animations go to rest.
//!
//! # Example
//!
//! ```rust
//! use torque_interaction::{InteractionCallback, InteractionConfig, PointerInput, Surface};
//!
//! let mut card = Surface::new(InteractionConfig::card());
//!
//! card.handle_pointer(PointerInput::down(50.0, 50.0, 0.0));
//! let fired = card.handle_pointer(PointerInput::up(50.0, 50.0, 40.0));
//! assert!(matches!(fired[0], InteractionCallback::Press { .. }));
//!
//! // Step with the host frame clock
//! while card.is_animating() {
//!     card.tick(1.0 / 60.0);
//! }
//! assert_eq!(card.state().scale, 1.0);
//! ```

pub mod bloom;
pub mod config;
pub mod dismissal;
pub mod error;
pub mod gesture;
pub mod overscroll;
pub mod runtime;
pub mod state;
pub mod surface;
pub mod velocity;

pub use bloom::{BloomFeedbackEngine, BloomPhase, BloomSnapshot};
pub use config::{
    BloomConfig, DismissDirection, DismissalConfig, FeatureFlags, GestureConfig,
    InteractionConfig, MomentumConfig, OverscrollConfig,
};
pub use dismissal::{DismissDecision, DismissalController};
pub use error::{ConfigError, PhysicsError, Result};
pub use gesture::{
    GestureEvent, GestureEvents, GestureRecognizer, GestureSample, PointerInput, PointerPhase,
};
pub use overscroll::{OverscrollController, OverscrollUpdate, OverscrollZone, SettleRequest, ZoneChange};
pub use runtime::{PhysicsCommand, PhysicsHandle, PhysicsOutput, PhysicsTask, SurfaceId};
pub use state::{InteractionPhase, InteractionState, PhaseEvent, SurfaceSnapshot};
pub use surface::Surface;
pub use velocity::VelocityTracker;

pub use torque_animation::{Easing, Spring, Spring2D, SpringConfig};
pub use torque_core::{
    Axis, CallbackDispatcher, CallbackKind, Callbacks, HapticPulse, HapticStyle, HapticTrigger,
    InteractionCallback, Point, Vec2,
};
