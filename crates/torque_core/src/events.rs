//! Interaction callbacks
//!
//! Discrete events the physics layer hands to its host. They are plain values
//! so they can cross from the physics loop to the callback-consuming context
//! by message passing.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::geometry::{Point, Vec2};

/// Kind of an outbound callback, used as the registration key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    Press,
    LongPress,
    Dismiss,
    OverscrollTop,
    OverscrollBottom,
    MomentumBegin,
    MomentumEnd,
    Haptic,
}

/// Haptic feedback intensity, chosen by the caller per surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticStyle {
    #[default]
    Light,
    Medium,
    Heavy,
    Soft,
    /// Selection-change tick
    Selection,
}

/// What caused a haptic pulse
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HapticTrigger {
    /// Bloom start on press-in
    Press,
    /// Entry into an overscroll zone
    Overscroll,
}

/// A single haptic pulse request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HapticPulse {
    pub style: HapticStyle,
    pub trigger: HapticTrigger,
}

/// An outbound interaction event
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InteractionCallback {
    /// Tap completed (press-out without drag or long press)
    Press { position: Point },
    /// Press held past the long-press duration without dragging
    LongPress { position: Point },
    /// Surface is leaving the screen; `direction` is a unit vector
    Dismiss { direction: Vec2 },
    OverscrollTop,
    OverscrollBottom,
    /// Released velocity carried into a settle, decay, or dismiss animation
    MomentumBegin { velocity: Vec2 },
    MomentumEnd,
    Haptic(HapticPulse),
}

impl InteractionCallback {
    pub fn kind(&self) -> CallbackKind {
        match self {
            InteractionCallback::Press { .. } => CallbackKind::Press,
            InteractionCallback::LongPress { .. } => CallbackKind::LongPress,
            InteractionCallback::Dismiss { .. } => CallbackKind::Dismiss,
            InteractionCallback::OverscrollTop => CallbackKind::OverscrollTop,
            InteractionCallback::OverscrollBottom => CallbackKind::OverscrollBottom,
            InteractionCallback::MomentumBegin { .. } => CallbackKind::MomentumBegin,
            InteractionCallback::MomentumEnd => CallbackKind::MomentumEnd,
            InteractionCallback::Haptic(_) => CallbackKind::Haptic,
        }
    }
}

/// Callbacks produced by one input or frame step, in firing order
pub type Callbacks = SmallVec<[InteractionCallback; 4]>;

/// Callback handler function type
pub type CallbackHandler = Box<dyn Fn(&InteractionCallback) + Send + Sync>;

/// Routes callbacks to handlers registered by kind
pub struct CallbackDispatcher {
    handlers: FxHashMap<CallbackKind, SmallVec<[CallbackHandler; 1]>>,
}

impl CallbackDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    /// Register a handler for a callback kind
    pub fn register<F>(&mut self, kind: CallbackKind, handler: F)
    where
        F: Fn(&InteractionCallback) + Send + Sync + 'static,
    {
        self.handlers
            .entry(kind)
            .or_default()
            .push(Box::new(handler));
    }

    pub fn has_handler(&self, kind: CallbackKind) -> bool {
        self.handlers.get(&kind).is_some_and(|h| !h.is_empty())
    }

    /// Dispatch a callback to every handler of its kind, returning how many ran
    pub fn dispatch(&self, callback: &InteractionCallback) -> usize {
        let Some(handlers) = self.handlers.get(&callback.kind()) else {
            tracing::trace!("No handler for {:?}", callback.kind());
            return 0;
        };
        for handler in handlers {
            handler(callback);
        }
        handlers.len()
    }

    /// Dispatch a batch in order
    pub fn dispatch_all<'a>(&self, callbacks: impl IntoIterator<Item = &'a InteractionCallback>) {
        for callback in callbacks {
            self.dispatch(callback);
        }
    }
}

impl Default for CallbackDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_dispatch_by_kind() {
        let presses = Arc::new(AtomicUsize::new(0));
        let presses_clone = presses.clone();

        let mut dispatcher = CallbackDispatcher::new();
        dispatcher.register(CallbackKind::Press, move |_| {
            presses_clone.fetch_add(1, Ordering::SeqCst);
        });

        let ran = dispatcher.dispatch(&InteractionCallback::Press {
            position: Point::new(1.0, 2.0),
        });
        assert_eq!(ran, 1);
        assert_eq!(dispatcher.dispatch(&InteractionCallback::MomentumEnd), 0);
        assert_eq!(presses.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_all_preserves_order() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut dispatcher = CallbackDispatcher::new();
        for kind in [CallbackKind::OverscrollTop, CallbackKind::Haptic] {
            let log = log.clone();
            dispatcher.register(kind, move |cb| log.lock().unwrap().push(cb.kind()));
        }

        let batch = [
            InteractionCallback::OverscrollTop,
            InteractionCallback::Haptic(HapticPulse {
                style: HapticStyle::Light,
                trigger: HapticTrigger::Overscroll,
            }),
        ];
        dispatcher.dispatch_all(batch.iter());

        assert_eq!(
            *log.lock().unwrap(),
            vec![CallbackKind::OverscrollTop, CallbackKind::Haptic]
        );
        assert!(dispatcher.has_handler(CallbackKind::Haptic));
        assert!(!dispatcher.has_handler(CallbackKind::Dismiss));
    }
}
