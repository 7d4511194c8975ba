//! Interactive surfaces
//!
//! A [`Surface`] wires one gesture recognizer into its overscroll and/or
//! dismissal controller and drives the resulting targets with springs. The
//! bloom engine hangs off press-in and runs on its own clock.
//!
//! The finger-driven ("raw") offset only moves along axes that a controller
//! owns: the scroll axis of an overscroll controller and the swipe axis of a
//! dismissal controller. A surface with neither still reports presses, long
//! presses and bloom, but never moves.
//!
//! Drag samples coalesce: only the latest sample per frame is applied, on the
//! next [`tick`](Surface::tick). A drag end always applies its final sample
//! before deciding the release.

use torque_animation::{Spring, Spring2D};
use torque_core::{
    Axis, Callbacks, HapticPulse, HapticTrigger, InteractionCallback, Point, StateMachine, Vec2,
};

use crate::bloom::BloomFeedbackEngine;
use crate::config::InteractionConfig;
use crate::dismissal::{DismissDecision, DismissalController};
use crate::gesture::{GestureEvent, GestureRecognizer, GestureSample, PointerInput};
use crate::overscroll::{OverscrollController, OverscrollZone, ZoneChange};
use crate::state::{InteractionPhase, InteractionState, PhaseEvent, SurfaceSnapshot};

/// Scale is a unit-range value, so it needs tighter rest thresholds
const SCALE_REST_THRESHOLD: f32 = 1e-3;

/// What currently moves the offset
#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    Rest,
    /// Finger down without dragging; a caught settle keeps decaying in place
    Held,
    /// Offset follows the finger
    Dragging,
    /// Spring toward a rest target
    Settle,
    /// Friction decay along the scroll axis
    Decay { velocity: f32 },
    /// Spring toward the off-screen target; a new press catches it
    Dismissing,
}

/// One interactive surface (card, scroll container, sheet)
#[derive(Debug, Clone)]
pub struct Surface {
    config: InteractionConfig,
    fsm: StateMachine<InteractionPhase>,
    recognizer: GestureRecognizer,
    overscroll: Option<OverscrollController>,
    dismissal: Option<DismissalController>,
    bloom: BloomFeedbackEngine,
    offset: Spring2D,
    scale: Spring,
    motion: Motion,
    /// Raw offset at drag start
    drag_base: Vec2,
    pending: Option<GestureSample>,
    drag_velocity: Vec2,
    press_position: Option<Point>,
    press_elapsed_ms: f32,
    long_press_fired: bool,
    dragged: bool,
    momentum_active: bool,
    dismissed: bool,
}

impl Surface {
    pub fn new(config: InteractionConfig) -> Self {
        let config = config.sanitized();
        let overscroll = config.overscroll.map(OverscrollController::new);
        let dismissal = match (config.dismissal, config.overscroll) {
            (Some(d), Some(o)) if d.axis == o.axis => {
                tracing::warn!(
                    "Dismissal and overscroll share the {:?} axis; dismissal disabled",
                    d.axis
                );
                None
            }
            (dismissal, _) => dismissal.map(DismissalController::new),
        };

        Self {
            fsm: StateMachine::new(InteractionPhase::Idle),
            recognizer: GestureRecognizer::new(config.gesture, config.features.gesture_enabled),
            overscroll,
            dismissal,
            bloom: BloomFeedbackEngine::new(config.bloom, config.features.bloom_enabled),
            offset: Spring2D::new(config.spring, Vec2::ZERO),
            scale: Spring::new(config.press_spring, 1.0)
                .with_rest_thresholds(SCALE_REST_THRESHOLD, SCALE_REST_THRESHOLD),
            motion: Motion::Rest,
            drag_base: Vec2::ZERO,
            pending: None,
            drag_velocity: Vec2::ZERO,
            press_position: None,
            press_elapsed_ms: 0.0,
            long_press_fired: false,
            dragged: false,
            momentum_active: false,
            dismissed: false,
            config,
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn phase(&self) -> InteractionPhase {
        self.fsm.current_state()
    }

    pub fn phase_machine(&self) -> &StateMachine<InteractionPhase> {
        &self.fsm
    }

    pub fn overscroll(&self) -> Option<&OverscrollController> {
        self.overscroll.as_ref()
    }

    pub fn dismissal(&self) -> Option<&DismissalController> {
        self.dismissal.as_ref()
    }

    pub fn bloom(&self) -> &BloomFeedbackEngine {
        &self.bloom
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Whether the next tick can change anything
    pub fn is_animating(&self) -> bool {
        !matches!(self.motion, Motion::Rest | Motion::Dragging)
            || self.pending.is_some()
            || !self.scale.is_settled()
            || self.bloom.is_active()
            || self.fsm.is_in(InteractionPhase::Released)
    }

    // ------------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------------

    /// In-bounds range of the scroll offset
    pub fn set_bounds(&mut self, min: f32, max: f32) {
        let Some(overscroll) = self.overscroll.as_mut() else {
            tracing::debug!("set_bounds on a surface without overscroll");
            return;
        };
        overscroll.set_bounds(min, max);
        self.settle_into_bounds();
    }

    pub fn set_content_extent(&mut self, content: f32, viewport: f32) {
        let Some(overscroll) = self.overscroll.as_mut() else {
            tracing::debug!("set_content_extent on a surface without overscroll");
            return;
        };
        overscroll.set_content_extent(content, viewport);
        self.settle_into_bounds();
    }

    pub fn set_axis_length(&mut self, length: f32) {
        match self.dismissal.as_mut() {
            Some(dismissal) => dismissal.set_axis_length(length),
            None => tracing::debug!("set_axis_length on a surface without dismissal"),
        }
    }

    /// Content that shrank under a resting offset springs back in bounds
    fn settle_into_bounds(&mut self) {
        if self.motion != Motion::Rest {
            return;
        }
        let (Some(axis), Some(overscroll)) = (self.scroll_axis(), self.overscroll.as_ref()) else {
            return;
        };
        let current = self.offset.value();
        let boundary = overscroll.boundary_for(current.along(axis));
        if boundary != current.along(axis) {
            let settle = overscroll.config().settle_spring;
            self.offset.animate_to(current.with(axis, boundary), settle);
            self.motion = Motion::Settle;
        }
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Feed one pointer sample; returns the callbacks it fires, in order
    pub fn handle_pointer(&mut self, input: PointerInput) -> Callbacks {
        let mut callbacks = Callbacks::new();
        if self.dismissed {
            tracing::trace!("Surface dismissed, ignoring {:?}", input.phase);
            return callbacks;
        }

        for event in self.recognizer.handle(input) {
            self.apply_gesture(event, &mut callbacks);
        }
        callbacks
    }

    fn apply_gesture(&mut self, event: GestureEvent, callbacks: &mut Callbacks) {
        match event {
            GestureEvent::PressIn { position } => self.press_in(position, callbacks),

            GestureEvent::DragStart { origin } => {
                tracing::trace!("Drag from ({:.1}, {:.1})", origin.x, origin.y);
                let visible = self.offset.value();
                self.drag_base = self.unresist(visible);
                self.offset.snap_to(visible);
                self.drag_velocity = Vec2::ZERO;
                self.dragged = true;
                self.motion = Motion::Dragging;
                self.fsm.send(PhaseEvent::DragBegan);
            }

            GestureEvent::DragUpdate(sample) => {
                self.pending = Some(sample);
            }

            GestureEvent::DragEnd { sample, cancelled } => {
                self.pending = None;
                self.apply_sample(sample, callbacks);
                self.release(sample, cancelled, callbacks);
            }

            GestureEvent::PressOut { position, cancelled } => {
                self.press_out(position, cancelled, callbacks)
            }
        }
    }

    fn press_in(&mut self, position: Point, callbacks: &mut Callbacks) {
        self.end_momentum(callbacks);

        match self.motion {
            Motion::Settle | Motion::Dismissing => {
                // Catch the surface where it is; velocity carries over
                self.offset.set_target(self.offset.value());
            }
            Motion::Decay { .. } => self.offset.snap_to(self.offset.value()),
            _ => {}
        }
        self.motion = Motion::Held;

        self.press_position = Some(position);
        self.press_elapsed_ms = 0.0;
        self.long_press_fired = false;
        self.dragged = false;
        self.fsm.send(PhaseEvent::PressIn);
        self.scale
            .animate_to(self.config.press_scale, self.config.press_spring);

        if let Some(pulse) = self.bloom.press_in(position) {
            callbacks.push(InteractionCallback::Haptic(pulse));
        }
    }

    fn press_out(&mut self, position: Point, cancelled: bool, callbacks: &mut Callbacks) {
        if !cancelled && !self.dragged && !self.long_press_fired {
            callbacks.push(InteractionCallback::Press { position });
        }
        self.press_position = None;
        self.scale.animate_to(1.0, self.config.press_spring);

        if self.motion == Motion::Held {
            let target = self.rest_target(self.offset.value());
            self.offset.set_target(target);
            self.motion = if self.offset.is_settled() {
                Motion::Rest
            } else {
                Motion::Settle
            };
        }

        self.fsm.send(if cancelled {
            PhaseEvent::Cancel
        } else {
            PhaseEvent::PressOut
        });
    }

    /// Move the offset to the finger position of `sample`
    fn apply_sample(&mut self, sample: GestureSample, callbacks: &mut Callbacks) {
        if self.motion != Motion::Dragging {
            return;
        }
        let raw = self.drag_base + self.mask(sample.translation);
        let mut visible = raw;
        let mut velocity = self.mask(sample.velocity);

        if let (Some(axis), Some(overscroll)) = (self.scroll_axis(), self.overscroll.as_mut()) {
            let update = overscroll.update(raw.along(axis));
            for change in &update.changes {
                if let ZoneChange::Entered(zone) = change {
                    callbacks.push(match zone {
                        OverscrollZone::OverscrollBottom => InteractionCallback::OverscrollBottom,
                        _ => InteractionCallback::OverscrollTop,
                    });
                    callbacks.push(InteractionCallback::Haptic(HapticPulse {
                        style: overscroll.config().haptic,
                        trigger: HapticTrigger::Overscroll,
                    }));
                }
            }
            visible = visible.with(axis, update.visible);
            velocity = velocity.with(
                axis,
                overscroll.resist_velocity(raw.along(axis), velocity.along(axis)),
            );
            self.fsm.send(if update.zone.is_overscrolled() {
                PhaseEvent::EnteredOverscroll
            } else {
                PhaseEvent::ReturnedInBounds
            });
        }

        if let (Some(axis), Some(dismissal)) = (self.swipe_axis(), self.dismissal.as_ref()) {
            visible = visible.with(axis, dismissal.resist(raw.along(axis)));
            velocity = velocity.with(
                axis,
                dismissal.resist_velocity(raw.along(axis), velocity.along(axis)),
            );
        }

        tracing::trace!(
            "Drag raw ({:.1}, {:.1}) visible ({:.1}, {:.1})",
            raw.x,
            raw.y,
            visible.x,
            visible.y
        );
        self.offset.snap_to(visible);
        self.drag_velocity = velocity;
    }

    /// Hand the released drag to a settle, decay, or dismiss animation
    fn release(&mut self, sample: GestureSample, cancelled: bool, callbacks: &mut Callbacks) {
        if self.motion != Motion::Dragging {
            return;
        }
        let visible = self.offset.value();
        let raw = self.drag_base + self.mask(sample.translation);
        let raw_velocity = if cancelled {
            Vec2::ZERO
        } else {
            self.mask(sample.velocity)
        };
        let carry = self.config.features.momentum_enabled && !cancelled;
        let mut seed = if carry { self.drag_velocity } else { Vec2::ZERO };

        let mut target = Vec2::ZERO;
        let mut spring = self.config.spring;
        let mut dismissing = false;
        let mut decay = None;

        if let (Some(axis), Some(overscroll)) = (self.scroll_axis(), self.overscroll.as_mut()) {
            let along = visible.along(axis);
            match overscroll.release(along, self.drag_velocity.along(axis), carry) {
                Some(settle) => {
                    target = target.with(axis, settle.target);
                    seed = seed.with(axis, settle.velocity);
                    spring = overscroll.config().settle_spring;
                }
                None => {
                    target = target.with(axis, along);
                    let velocity = raw_velocity.along(axis);
                    if carry && velocity.abs() > self.config.momentum.min_velocity {
                        decay = Some(velocity);
                    }
                }
            }
        }

        if let (Some(axis), Some(dismissal)) = (self.swipe_axis(), self.dismissal.as_ref()) {
            let decision = if cancelled {
                DismissDecision::SpringBack
            } else {
                // The swipe axis always carries its velocity, momentum or not
                seed = seed.with(axis, self.drag_velocity.along(axis));
                dismissal.evaluate(raw.along(axis), raw_velocity.along(axis))
            };
            if let DismissDecision::Dismiss { sign } = decision {
                target = target.with(axis, dismissal.off_screen_target(sign));
                spring = dismissal.config().dismiss_spring;
                dismissing = true;
                callbacks.push(InteractionCallback::Dismiss {
                    direction: Vec2::on_axis(axis, sign),
                });
            }
        }

        self.offset.snap_to(visible);
        self.drag_velocity = Vec2::ZERO;

        self.motion = if dismissing {
            self.offset.add_velocity(seed);
            self.offset.animate_to(target, spring);
            Motion::Dismissing
        } else if let Some(velocity) = decay {
            Motion::Decay { velocity }
        } else {
            self.offset.add_velocity(seed);
            self.offset.animate_to(target, spring);
            if self.offset.is_settled() {
                Motion::Rest
            } else {
                Motion::Settle
            }
        };

        tracing::debug!(
            "Released at ({:.1}, {:.1}) v=({:.0}, {:.0}) -> {:?}",
            visible.x,
            visible.y,
            raw_velocity.x,
            raw_velocity.y,
            self.motion
        );

        if carry
            && self.motion != Motion::Rest
            && raw_velocity.length() > self.config.momentum.min_velocity
        {
            self.momentum_active = true;
            callbacks.push(InteractionCallback::MomentumBegin {
                velocity: raw_velocity,
            });
        }
    }

    // ------------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------------

    /// Advance every animation by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> Callbacks {
        let mut callbacks = Callbacks::new();
        if !dt.is_finite() || dt <= 0.0 {
            tracing::trace!("Skipping tick with dt {}", dt);
            return callbacks;
        }

        if let Some(sample) = self.pending.take() {
            self.apply_sample(sample, &mut callbacks);
        }

        if let Some(position) = self.press_position {
            if !self.dragged && !self.long_press_fired {
                self.press_elapsed_ms += dt * 1000.0;
                if self.press_elapsed_ms >= self.config.gesture.long_press_ms {
                    self.long_press_fired = true;
                    callbacks.push(InteractionCallback::LongPress { position });
                }
            }
        }

        self.bloom.tick(dt);
        self.scale.step(dt);

        match self.motion {
            Motion::Held => self.offset.step(dt),
            Motion::Settle => {
                self.offset.step(dt);
                if self.offset.is_settled() {
                    self.motion = Motion::Rest;
                    self.end_momentum(&mut callbacks);
                }
            }
            Motion::Dismissing => {
                self.offset.step(dt);
                if self.offset.is_settled() {
                    tracing::debug!("Dismiss complete");
                    self.motion = Motion::Rest;
                    self.dismissed = true;
                    self.end_momentum(&mut callbacks);
                }
            }
            Motion::Decay { velocity } => self.step_decay(velocity, dt, &mut callbacks),
            Motion::Rest | Motion::Dragging => {}
        }

        if self.motion == Motion::Rest && self.scale.is_settled() {
            self.fsm.send(PhaseEvent::Settled);
        }
        callbacks
    }

    fn step_decay(&mut self, velocity: f32, dt: f32, callbacks: &mut Callbacks) {
        let (Some(axis), Some(overscroll)) = (self.scroll_axis(), self.overscroll.as_ref()) else {
            self.motion = Motion::Rest;
            self.end_momentum(callbacks);
            return;
        };

        let momentum = self.config.momentum;
        let mut next = velocity - velocity.signum() * momentum.deceleration * dt;
        if next.signum() != velocity.signum() {
            next = 0.0;
        }
        let current = self.offset.value();
        let position = current.along(axis) + (velocity + next) * 0.5 * dt;
        let moved = current.with(axis, position);

        if overscroll.is_outside(position) {
            // Content edge: bounce back with what is left of the fling
            let boundary = overscroll.boundary_for(position);
            let bounce = next * overscroll.config().resistance_factor;
            let spring = overscroll.config().settle_spring;
            tracing::trace!("Decay hit edge at {:.1}, bouncing with {:.0}", boundary, bounce);
            self.offset.snap_to(moved);
            self.offset.add_velocity(Vec2::on_axis(axis, bounce));
            self.offset.animate_to(moved.with(axis, boundary), spring);
            self.motion = Motion::Settle;
        } else if next.abs() < momentum.rest_velocity {
            self.offset.snap_to(moved);
            self.motion = Motion::Rest;
            self.end_momentum(callbacks);
        } else {
            self.offset.snap_to(moved);
            self.motion = Motion::Decay { velocity: next };
        }
    }

    fn end_momentum(&mut self, callbacks: &mut Callbacks) {
        if self.momentum_active {
            self.momentum_active = false;
            callbacks.push(InteractionCallback::MomentumEnd);
        }
    }

    // ------------------------------------------------------------------------
    // Interruption
    // ------------------------------------------------------------------------

    /// App lost focus: end the gesture benignly and put everything at rest
    pub fn suspend(&mut self) -> Callbacks {
        let mut callbacks = Callbacks::new();
        for event in self.recognizer.cancel() {
            self.apply_gesture(event, &mut callbacks);
        }
        self.pending = None;
        self.press_position = None;
        self.bloom.cancel();
        self.end_momentum(&mut callbacks);

        let rest = match self.motion {
            Motion::Dismissing => {
                self.dismissed = true;
                self.offset.target()
            }
            Motion::Settle => self.offset.target(),
            _ => self.rest_target(self.offset.value()),
        };
        self.offset.snap_to(rest);
        self.scale.snap_to(1.0);
        self.drag_velocity = Vec2::ZERO;
        if let Some(overscroll) = self.overscroll.as_mut() {
            overscroll.reset();
        }
        self.motion = Motion::Rest;
        self.fsm.send(PhaseEvent::Settled);

        tracing::debug!("Surface suspended at ({:.1}, {:.1})", rest.x, rest.y);
        callbacks
    }

    /// Back to the mounted state, including after a dismiss
    pub fn reset(&mut self) -> Callbacks {
        let mut callbacks = Callbacks::new();
        self.end_momentum(&mut callbacks);
        self.recognizer.reset();
        self.bloom.cancel();
        if let Some(overscroll) = self.overscroll.as_mut() {
            overscroll.reset();
        }
        self.offset.snap_to(Vec2::ZERO);
        self.scale.snap_to(1.0);
        self.motion = Motion::Rest;
        self.pending = None;
        self.drag_base = Vec2::ZERO;
        self.drag_velocity = Vec2::ZERO;
        self.press_position = None;
        self.long_press_fired = false;
        self.dragged = false;
        self.dismissed = false;
        self.fsm.reset(InteractionPhase::Idle);
        callbacks
    }

    // ------------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------------

    pub fn state(&self) -> InteractionState {
        let offset = self.offset.value();
        let velocity = match self.motion {
            Motion::Rest => Vec2::ZERO,
            Motion::Dragging => self.drag_velocity,
            Motion::Decay { velocity } => self
                .scroll_axis()
                .map_or(Vec2::ZERO, |axis| Vec2::on_axis(axis, velocity)),
            Motion::Held | Motion::Settle | Motion::Dismissing => self.offset.velocity(),
        };

        let (opacity, rotation) = match (self.swipe_axis(), self.dismissal.as_ref()) {
            (Some(axis), Some(dismissal)) => {
                let along = offset.along(axis);
                (dismissal.opacity_for(along), dismissal.rotation_for(along))
            }
            _ => (1.0, 0.0),
        };

        let has_overscrolled = match (self.scroll_axis(), self.overscroll.as_ref()) {
            (Some(axis), Some(overscroll)) => {
                overscroll.zone().is_overscrolled() || overscroll.is_outside(offset.along(axis))
            }
            _ => false,
        };

        let phase = self.fsm.current_state();
        InteractionState {
            offset,
            velocity,
            scale: self.scale.value(),
            opacity,
            rotation,
            is_pressed: phase.is_pressed(),
            is_dragging: phase.is_dragging(),
            has_overscrolled,
            bloom_origin: self.bloom.origin(),
            bloom_progress: self.bloom.progress(),
        }
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            phase: self.fsm.current_state(),
            state: self.state(),
            zone: self
                .overscroll
                .as_ref()
                .map_or(OverscrollZone::InBounds, OverscrollController::zone),
            dismissed: self.dismissed,
            adaptive_glass: self.config.features.adaptive_glass,
            bloom: self.bloom.snapshot(),
        }
    }

    // ------------------------------------------------------------------------
    // Axes
    // ------------------------------------------------------------------------

    fn scroll_axis(&self) -> Option<Axis> {
        self.overscroll.as_ref().map(|o| o.config().axis)
    }

    fn swipe_axis(&self) -> Option<Axis> {
        self.dismissal.as_ref().map(|d| d.config().axis)
    }

    /// Keep only the components of `v` along owned axes
    fn mask(&self, v: Vec2) -> Vec2 {
        [self.scroll_axis(), self.swipe_axis()]
            .into_iter()
            .flatten()
            .fold(Vec2::ZERO, |out, axis| out.with(axis, v.along(axis)))
    }

    /// Raw offset that displays at `visible`
    fn unresist(&self, visible: Vec2) -> Vec2 {
        let mut raw = self.mask(visible);
        if let (Some(axis), Some(overscroll)) = (self.scroll_axis(), self.overscroll.as_ref()) {
            raw = raw.with(axis, overscroll.unresist(visible.along(axis)));
        }
        if let (Some(axis), Some(dismissal)) = (self.swipe_axis(), self.dismissal.as_ref()) {
            raw = raw.with(axis, dismissal.unresist(visible.along(axis)));
        }
        raw
    }

    /// Where the offset rests when nothing holds it
    fn rest_target(&self, from: Vec2) -> Vec2 {
        match (self.scroll_axis(), self.overscroll.as_ref()) {
            (Some(axis), Some(overscroll)) => {
                Vec2::on_axis(axis, overscroll.boundary_for(from.along(axis)))
            }
            _ => Vec2::ZERO,
        }
    }
}
