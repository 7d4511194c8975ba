//! Swipe-to-dismiss decisions
//!
//! A released surface dismisses when it was flung fast enough or dragged far
//! enough along its axis, in a direction its config allows. The decision is a
//! pure function of the final sample, so repeated gestures never influence
//! each other.

use crate::config::DismissalConfig;

/// Outcome of a released drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DismissDecision {
    /// Leave the screen; `sign` is +1.0 or -1.0 along the axis
    Dismiss { sign: f32 },
    SpringBack,
}

/// Pure dismissal rule
///
/// `displacement` and `velocity` are raw (unresisted) values along the axis.
pub fn evaluate(config: &DismissalConfig, displacement: f32, velocity: f32) -> DismissDecision {
    let displacement = if displacement.is_finite() { displacement } else { 0.0 };
    let velocity = if velocity.is_finite() { velocity } else { 0.0 };

    if velocity.abs() > config.velocity_threshold {
        let sign = velocity.signum();
        // An explicit fling the other way means "keep it"
        return if config.direction.allows(sign) {
            DismissDecision::Dismiss { sign }
        } else {
            DismissDecision::SpringBack
        };
    }

    let ratio = displacement.abs() / config.axis_length;
    if ratio > config.distance_threshold && config.direction.allows(displacement.signum()) {
        return DismissDecision::Dismiss {
            sign: displacement.signum(),
        };
    }

    DismissDecision::SpringBack
}

/// Dismissal logic for one surface
#[derive(Debug, Clone)]
pub struct DismissalController {
    config: DismissalConfig,
}

impl DismissalController {
    pub fn new(config: DismissalConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &DismissalConfig {
        &self.config
    }

    /// Update the surface extent from layout
    pub fn set_axis_length(&mut self, length: f32) {
        if length.is_finite() && length > 0.0 {
            self.config.axis_length = length;
        } else {
            tracing::warn!("Ignoring axis length {}", length);
        }
    }

    pub fn evaluate(&self, displacement: f32, velocity: f32) -> DismissDecision {
        let decision = evaluate(&self.config, displacement, velocity);
        tracing::debug!(
            "Dismissal: displacement={:.1} ratio={:.2} velocity={:.0} -> {:?}",
            displacement,
            self.distance_ratio(displacement),
            velocity,
            decision
        );
        decision
    }

    pub fn distance_ratio(&self, displacement: f32) -> f32 {
        displacement.abs() / self.config.axis_length
    }

    /// Visible displacement for a raw one: full tracking toward a dismissable
    /// direction, resisted the other way
    pub fn resist(&self, raw: f32) -> f32 {
        if raw == 0.0 || self.config.direction.allows(raw.signum()) {
            raw
        } else {
            raw * self.config.counter_resistance
        }
    }

    /// Inverse of [`resist`](Self::resist)
    pub fn unresist(&self, visible: f32) -> f32 {
        if visible == 0.0 || self.config.direction.allows(visible.signum()) {
            visible
        } else if self.config.counter_resistance <= f32::EPSILON {
            0.0
        } else {
            visible / self.config.counter_resistance
        }
    }

    pub fn resist_velocity(&self, raw: f32, velocity: f32) -> f32 {
        if raw == 0.0 || self.config.direction.allows(raw.signum()) {
            velocity
        } else {
            velocity * self.config.counter_resistance
        }
    }

    /// Where a dismissed surface comes to rest
    pub fn off_screen_target(&self, sign: f32) -> f32 {
        sign.signum() * (self.config.axis_length + self.config.exit_margin)
    }

    /// Tilt in degrees for a visible displacement
    pub fn rotation_for(&self, displacement: f32) -> f32 {
        (displacement / self.config.axis_length).clamp(-1.0, 1.0) * self.config.max_rotation_deg
    }

    /// Opacity for a visible displacement
    pub fn opacity_for(&self, displacement: f32) -> f32 {
        1.0 - self.distance_ratio(displacement).min(1.0) * self.config.drag_fade
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DismissDirection;

    fn controller() -> DismissalController {
        DismissalController::new(DismissalConfig {
            axis_length: 1000.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_distance_past_threshold_dismisses() {
        let c = controller();
        assert_eq!(c.evaluate(350.0, 0.0), DismissDecision::Dismiss { sign: 1.0 });
        assert_eq!(c.evaluate(-350.0, 0.0), DismissDecision::Dismiss { sign: -1.0 });
    }

    #[test]
    fn test_fast_fling_dismisses() {
        let c = controller();
        assert_eq!(c.evaluate(100.0, 600.0), DismissDecision::Dismiss { sign: 1.0 });
    }

    #[test]
    fn test_short_slow_drag_springs_back() {
        let c = controller();
        assert_eq!(c.evaluate(100.0, 100.0), DismissDecision::SpringBack);
        assert_eq!(c.evaluate(300.0, 500.0), DismissDecision::SpringBack);
    }

    #[test]
    fn test_no_hysteresis_across_gestures() {
        let c = controller();
        let first = c.evaluate(350.0, 0.0);
        let second = c.evaluate(100.0, 100.0);
        let third = c.evaluate(350.0, 0.0);
        assert_eq!(first, third);
        assert_eq!(second, DismissDecision::SpringBack);
    }

    #[test]
    fn test_direction_constraint() {
        let c = DismissalController::new(DismissalConfig {
            axis_length: 1000.0,
            direction: DismissDirection::Positive,
            ..Default::default()
        });
        assert_eq!(c.evaluate(-500.0, 0.0), DismissDecision::SpringBack);
        assert_eq!(c.evaluate(-10.0, -900.0), DismissDecision::SpringBack);
        // Dragged far down, then flicked back up: keep it
        assert_eq!(c.evaluate(400.0, -900.0), DismissDecision::SpringBack);
        assert_eq!(c.evaluate(20.0, 900.0), DismissDecision::Dismiss { sign: 1.0 });

        assert_eq!(c.resist(-100.0), -25.0);
        assert_eq!(c.resist(100.0), 100.0);
        assert_eq!(c.unresist(-25.0), -100.0);
    }

    #[test]
    fn test_visuals() {
        let c = DismissalController::new(DismissalConfig {
            axis_length: 200.0,
            max_rotation_deg: 10.0,
            drag_fade: 0.5,
            exit_margin: 50.0,
            ..Default::default()
        });
        assert_eq!(c.rotation_for(100.0), 5.0);
        assert_eq!(c.rotation_for(-400.0), -10.0);
        assert_eq!(c.opacity_for(100.0), 0.75);
        assert_eq!(c.opacity_for(1000.0), 0.5);
        assert_eq!(c.off_screen_target(-1.0), -250.0);
    }

    #[test]
    fn test_non_finite_inputs_spring_back() {
        let c = controller();
        assert_eq!(c.evaluate(f32::NAN, f32::INFINITY), DismissDecision::SpringBack);
    }
}
