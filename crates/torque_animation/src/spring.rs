//! Spring physics
//!
//! Damped harmonic oscillator `m·x'' + c·x' + k·(x − target) = 0`, advanced
//! with its closed-form solution from the current state over each frame.
//! The exact solution is stable for any positive constants and any frame
//! length, so stiff springs never explode on a long frame.
//!
//! Springs are interruptible: [`Spring::set_target`] changes only the rest
//! point, so position and velocity carry over unchanged into the new motion.

use serde::{Deserialize, Serialize};
use torque_core::Vec2;

/// Springs that haven't come to rest after this much simulated time since
/// their last retarget snap to the target.
pub const MAX_SETTLE_SECS: f32 = 10.0;

/// Default rest thresholds (logical pixels and pixels/second)
pub const DEFAULT_REST_DISPLACEMENT: f32 = 0.01;
pub const DEFAULT_REST_VELOCITY: f32 = 0.01;

/// Damping ratios within this distance of 1.0 use the critically damped branch
const CRITICAL_EPSILON: f64 = 1e-4;

/// Configuration for a spring animation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    /// Spring constant (k)
    pub stiffness: f32,
    /// Damping coefficient (c)
    pub damping: f32,
    /// Mass of the animated value (m)
    pub mass: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 180.0,
            damping: 24.0,
            mass: 1.0,
        }
    }
}

impl SpringConfig {
    pub const fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Quick, barely overshooting
    pub const fn stiff() -> Self {
        Self::new(400.0, 30.0, 1.0)
    }

    /// Fast response for press feedback
    pub const fn snappy() -> Self {
        Self::new(500.0, 36.0, 1.0)
    }

    /// Slow and soft
    pub const fn gentle() -> Self {
        Self::new(120.0, 14.0, 1.0)
    }

    /// Visible overshoot
    pub const fn wobbly() -> Self {
        Self::new(180.0, 12.0, 1.0)
    }

    /// Fastest non-oscillating spring for a stiffness and mass
    pub fn critically_damped(stiffness: f32, mass: f32) -> Self {
        Self::new(stiffness, 2.0 * (stiffness * mass).sqrt(), mass).sanitized()
    }

    pub fn is_valid(&self) -> bool {
        [self.stiffness, self.damping, self.mass]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }

    /// Replace each non-positive or non-finite constant with the default's
    pub fn sanitized(self) -> Self {
        if self.is_valid() {
            return self;
        }

        tracing::warn!(
            "Degenerate spring config (stiffness={}, damping={}, mass={}), substituting defaults",
            self.stiffness,
            self.damping,
            self.mass
        );

        let fallback = SpringConfig::default();
        let pick = |v: f32, d: f32| if v.is_finite() && v > 0.0 { v } else { d };
        Self {
            stiffness: pick(self.stiffness, fallback.stiffness),
            damping: pick(self.damping, fallback.damping),
            mass: pick(self.mass, fallback.mass),
        }
    }

    /// ζ = c / (2·√(k·m)); below 1 oscillates, 1 is critical, above 1 creeps
    pub fn damping_ratio(&self) -> f32 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

/// A single animated value driven by a spring
#[derive(Clone, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
    settled: bool,
    /// Simulated seconds since the last retarget
    elapsed: f32,
    rest_displacement: f32,
    rest_velocity: f32,
}

impl Spring {
    /// Create a spring resting at `value`
    pub fn new(config: SpringConfig, value: f32) -> Self {
        Self {
            config: config.sanitized(),
            value,
            velocity: 0.0,
            target: value,
            settled: true,
            elapsed: 0.0,
            rest_displacement: DEFAULT_REST_DISPLACEMENT,
            rest_velocity: DEFAULT_REST_VELOCITY,
        }
    }

    /// Create a spring at `value` already moving with `velocity`
    pub fn with_velocity(config: SpringConfig, value: f32, velocity: f32) -> Self {
        let mut spring = Self::new(config, value);
        spring.velocity = if velocity.is_finite() { velocity } else { 0.0 };
        spring.settled = spring.velocity == 0.0;
        spring
    }

    /// Override rest thresholds (use small values for unit-range values like scale)
    pub fn with_rest_thresholds(mut self, displacement: f32, velocity: f32) -> Self {
        self.rest_displacement = displacement.abs().max(f32::EPSILON);
        self.rest_velocity = velocity.abs().max(f32::EPSILON);
        self
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Retarget without touching position or velocity
    pub fn set_target(&mut self, target: f32) {
        if !target.is_finite() {
            tracing::warn!("Ignoring non-finite spring target {}", target);
            return;
        }
        if target == self.target && self.settled {
            return;
        }
        self.target = target;
        self.elapsed = 0.0;
        self.settled = false;
    }

    /// Retarget with a new spring config for this request
    pub fn animate_to(&mut self, target: f32, config: SpringConfig) {
        self.config = config.sanitized();
        self.set_target(target);
    }

    /// Add velocity to the current motion (momentum hand-off)
    pub fn add_velocity(&mut self, velocity: f32) {
        if velocity.is_finite() && velocity != 0.0 {
            self.velocity += velocity;
            self.elapsed = 0.0;
            self.settled = false;
        }
    }

    /// Jump to `value` and rest there
    pub fn snap_to(&mut self, value: f32) {
        let value = if value.is_finite() { value } else { self.target };
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
        self.elapsed = 0.0;
        self.settled = true;
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if self.settled || !dt.is_finite() || dt <= 0.0 {
            return;
        }

        let (x, v) = propagate(
            &self.config,
            f64::from(self.value - self.target),
            f64::from(self.velocity),
            f64::from(dt),
        );
        let value = self.target + x as f32;
        let velocity = v as f32;

        if !value.is_finite() || !velocity.is_finite() {
            tracing::warn!("Spring produced non-finite state, snapping to target");
            self.snap_to(self.target);
            return;
        }

        self.value = value;
        self.velocity = velocity;
        self.elapsed += dt;

        let at_rest = (self.value - self.target).abs() < self.rest_displacement
            && self.velocity.abs() < self.rest_velocity;
        if at_rest {
            self.snap_to(self.target);
        } else if self.elapsed >= MAX_SETTLE_SECS {
            tracing::debug!(
                "Spring did not settle within {}s (zeta={:.4}), snapping",
                MAX_SETTLE_SECS,
                self.config.damping_ratio()
            );
            self.snap_to(self.target);
        }
    }
}

/// Exact state of the oscillator after `t` seconds, from displacement `x0`
/// and velocity `v0` relative to the rest point.
fn propagate(config: &SpringConfig, x0: f64, v0: f64, t: f64) -> (f64, f64) {
    let k = f64::from(config.stiffness);
    let c = f64::from(config.damping);
    let m = f64::from(config.mass);

    let omega0 = (k / m).sqrt();
    let zeta = c / (2.0 * (k * m).sqrt());

    if (zeta - 1.0).abs() < CRITICAL_EPSILON {
        let b = v0 + omega0 * x0;
        let decay = (-omega0 * t).exp();
        let x = decay * (x0 + b * t);
        let v = decay * (v0 - omega0 * b * t);
        (x, v)
    } else if zeta < 1.0 {
        let a = zeta * omega0;
        let omega_d = omega0 * (1.0 - zeta * zeta).sqrt();
        let decay = (-a * t).exp();
        let (sin, cos) = (omega_d * t).sin_cos();
        let x = decay * (x0 * cos + (v0 + a * x0) / omega_d * sin);
        let v = decay * (v0 * cos - (a * v0 + omega0 * omega0 * x0) / omega_d * sin);
        (x, v)
    } else {
        let root = (zeta * zeta - 1.0).sqrt();
        // Slow root written without the ζ − √(ζ²−1) cancellation
        let r1 = -omega0 / (zeta + root);
        let r2 = -omega0 * (zeta + root);
        let c2 = (v0 - r1 * x0) / (r2 - r1);
        let c1 = x0 - c2;
        let e1 = (r1 * t).exp();
        let e2 = (r2 * t).exp();
        (c1 * e1 + c2 * e2, r1 * c1 * e1 + r2 * c2 * e2)
    }
}

/// A 2D value driven by two springs sharing one config
#[derive(Clone, Debug)]
pub struct Spring2D {
    x: Spring,
    y: Spring,
}

impl Spring2D {
    pub fn new(config: SpringConfig, value: Vec2) -> Self {
        Self {
            x: Spring::new(config, value.x),
            y: Spring::new(config, value.y),
        }
    }

    pub fn with_velocity(config: SpringConfig, value: Vec2, velocity: Vec2) -> Self {
        Self {
            x: Spring::with_velocity(config, value.x, velocity.x),
            y: Spring::with_velocity(config, value.y, velocity.y),
        }
    }

    pub fn value(&self) -> Vec2 {
        Vec2::new(self.x.value(), self.y.value())
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.x.velocity(), self.y.velocity())
    }

    pub fn target(&self) -> Vec2 {
        Vec2::new(self.x.target(), self.y.target())
    }

    pub fn config(&self) -> SpringConfig {
        self.x.config()
    }

    pub fn is_settled(&self) -> bool {
        self.x.is_settled() && self.y.is_settled()
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.x.set_target(target.x);
        self.y.set_target(target.y);
    }

    pub fn animate_to(&mut self, target: Vec2, config: SpringConfig) {
        self.x.animate_to(target.x, config);
        self.y.animate_to(target.y, config);
    }

    pub fn add_velocity(&mut self, velocity: Vec2) {
        self.x.add_velocity(velocity.x);
        self.y.add_velocity(velocity.y);
    }

    pub fn snap_to(&mut self, value: Vec2) {
        self.x.snap_to(value.x);
        self.y.snap_to(value.y);
    }

    pub fn step(&mut self, dt: f32) {
        self.x.step(dt);
        self.y.step(dt);
    }
}
