//! Interaction configuration
//!
//! One typed struct per subsystem, grouped into [`InteractionConfig`]. All
//! values arrive from the host's screen/theme layer as plain numbers; the
//! physics layer never validates them as errors. Degenerate values are
//! replaced by defaults in [`InteractionConfig::sanitized`].
//!
//! # Example
//!
//! ```rust
//! use torque_interaction::InteractionConfig;
//!
//! let config = InteractionConfig::from_toml_str(
//!     r#"
//!     press_scale = 0.95
//!
//!     [features]
//!     bloom_enabled = false
//!
//!     [overscroll]
//!     resistance_factor = 0.4
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.press_scale, 0.95);
//! assert!(!config.features.bloom_enabled);
//! assert_eq!(config.overscroll.unwrap().resistance_factor, 0.4);
//! ```

use serde::{Deserialize, Serialize};
use torque_animation::{Easing, SpringConfig};
use torque_core::{Axis, HapticStyle};

use crate::error::ConfigError;

// ============================================================================
// Gesture
// ============================================================================

/// Gesture classification thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Distance in logical pixels before a press becomes a drag
    pub touch_slop: f32,
    /// Per-axis cap on reported velocity (pixels/second)
    pub max_velocity: f32,
    /// Hold time before a stationary press fires `on_long_press`
    pub long_press_ms: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            touch_slop: 8.0,
            max_velocity: 8000.0,
            long_press_ms: 500.0,
        }
    }
}

// ============================================================================
// Overscroll
// ============================================================================

/// Rubberband behaviour past content bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverscrollConfig {
    /// Axis the content scrolls along
    pub axis: Axis,
    /// Visible displacement per pixel of boundary excess
    pub resistance_factor: f32,
    /// Optional cap on visible excess in pixels
    pub max_overscroll: Option<f32>,
    /// Haptic fired on entry into an overscroll zone
    pub haptic: HapticStyle,
    /// Spring that returns the content to its boundary
    pub settle_spring: SpringConfig,
}

impl Default for OverscrollConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Y,
            resistance_factor: 0.25,
            max_overscroll: None,
            haptic: HapticStyle::Light,
            // Stiff, slightly overdamped snap-back with no rebound
            settle_spring: SpringConfig::new(3000.0, 110.0, 1.0),
        }
    }
}

// ============================================================================
// Dismissal
// ============================================================================

/// Which drag directions may dismiss a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissDirection {
    #[default]
    Both,
    /// Increasing coordinate only (right, or down)
    Positive,
    /// Decreasing coordinate only (left, or up)
    Negative,
}

impl DismissDirection {
    pub fn allows(&self, sign: f32) -> bool {
        match self {
            DismissDirection::Both => sign != 0.0,
            DismissDirection::Positive => sign > 0.0,
            DismissDirection::Negative => sign < 0.0,
        }
    }
}

/// Swipe-to-dismiss thresholds and visuals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DismissalConfig {
    pub axis: Axis,
    pub direction: DismissDirection,
    /// Release speed above which the surface dismisses (pixels/second)
    pub velocity_threshold: f32,
    /// Fraction of `axis_length` past which the surface dismisses
    pub distance_threshold: f32,
    /// Surface extent along `axis`, normally updated from layout
    pub axis_length: f32,
    /// Resistance when dragging in a direction that cannot dismiss
    pub counter_resistance: f32,
    /// Tilt at a displacement of one full `axis_length`
    pub max_rotation_deg: f32,
    /// Opacity lost at a displacement of one full `axis_length`
    pub drag_fade: f32,
    /// Extra distance past `axis_length` for the off-screen target
    pub exit_margin: f32,
    pub dismiss_spring: SpringConfig,
}

impl Default for DismissalConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Y,
            direction: DismissDirection::Both,
            velocity_threshold: 500.0,
            distance_threshold: 0.3,
            axis_length: 400.0,
            counter_resistance: 0.25,
            max_rotation_deg: 0.0,
            drag_fade: 0.0,
            exit_margin: 48.0,
            dismiss_spring: SpringConfig::stiff(),
        }
    }
}

// ============================================================================
// Bloom
// ============================================================================

/// Touch-anchored radial feedback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    /// Total lifetime; expand takes the first half, fade the second
    pub duration_ms: f32,
    pub max_radius: f32,
    pub peak_opacity: f32,
    pub expand_easing: Easing,
    pub fade_easing: Easing,
    /// Haptic fired once when the bloom starts
    pub haptic: HapticStyle,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            duration_ms: 600.0,
            max_radius: 120.0,
            peak_opacity: 0.35,
            expand_easing: Easing::EaseOutCubic,
            fade_easing: Easing::EaseInQuad,
            haptic: HapticStyle::Light,
        }
    }
}

// ============================================================================
// Momentum
// ============================================================================

/// Release momentum for scroll content
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Release speed needed to start momentum (pixels/second)
    pub min_velocity: f32,
    /// Speed below which a decay stops (pixels/second)
    pub rest_velocity: f32,
    /// Friction while decaying (pixels/second²)
    pub deceleration: f32,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            min_velocity: 50.0,
            rest_velocity: 10.0,
            deceleration: 1500.0,
        }
    }
}

// ============================================================================
// Feature Flags
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub bloom_enabled: bool,
    pub momentum_enabled: bool,
    pub gesture_enabled: bool,
    /// Passed through to snapshots for the renderer
    pub adaptive_glass: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            bloom_enabled: true,
            momentum_enabled: true,
            gesture_enabled: true,
            adaptive_glass: false,
        }
    }
}

// ============================================================================
// Interaction Config
// ============================================================================

/// Complete configuration for one interactive surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Spring that settles the surface offset after release
    pub spring: SpringConfig,
    /// Scale while pressed
    pub press_scale: f32,
    pub press_spring: SpringConfig,
    pub gesture: GestureConfig,
    pub overscroll: Option<OverscrollConfig>,
    pub dismissal: Option<DismissalConfig>,
    pub bloom: BloomConfig,
    pub momentum: MomentumConfig,
    pub features: FeatureFlags,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            spring: SpringConfig::default(),
            press_scale: 0.97,
            press_spring: SpringConfig::snappy(),
            gesture: GestureConfig::default(),
            overscroll: None,
            dismissal: None,
            bloom: BloomConfig::default(),
            momentum: MomentumConfig::default(),
            features: FeatureFlags::default(),
        }
    }
}

impl InteractionConfig {
    /// Marketplace listing card: press feedback, bloom, horizontal swipe-away
    pub fn card() -> Self {
        Self {
            dismissal: Some(DismissalConfig {
                axis: Axis::X,
                direction: DismissDirection::Both,
                axis_length: 360.0,
                max_rotation_deg: 8.0,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Scrollable list: rubberband edges and momentum, no press scaling
    pub fn scroll_container() -> Self {
        Self {
            press_scale: 1.0,
            overscroll: Some(OverscrollConfig::default()),
            features: FeatureFlags {
                bloom_enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Bottom sheet: drag down to dismiss, resisted upward pull
    pub fn modal_sheet() -> Self {
        Self {
            press_scale: 1.0,
            dismissal: Some(DismissalConfig {
                axis: Axis::Y,
                direction: DismissDirection::Positive,
                axis_length: 640.0,
                drag_fade: 0.4,
                ..Default::default()
            }),
            features: FeatureFlags {
                bloom_enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Parse a host-supplied TOML table; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: InteractionConfig = toml::from_str(source)?;
        Ok(config.sanitized())
    }

    /// Replace degenerate values with defaults so physics never diverges
    pub fn sanitized(self) -> Self {
        let defaults = InteractionConfig::default();
        Self {
            spring: self.spring.sanitized(),
            press_scale: positive_or(self.press_scale, defaults.press_scale, "press_scale"),
            press_spring: self.press_spring.sanitized(),
            gesture: self.gesture.sanitized(),
            overscroll: self.overscroll.map(OverscrollConfig::sanitized),
            dismissal: self.dismissal.map(DismissalConfig::sanitized),
            bloom: self.bloom.sanitized(),
            momentum: self.momentum.sanitized(),
            features: self.features,
        }
    }
}

impl GestureConfig {
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        Self {
            touch_slop: non_negative_or(self.touch_slop, d.touch_slop, "touch_slop"),
            max_velocity: positive_or(self.max_velocity, d.max_velocity, "max_velocity"),
            long_press_ms: positive_or(self.long_press_ms, d.long_press_ms, "long_press_ms"),
        }
    }
}

impl OverscrollConfig {
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let resistance_factor = if (0.0..=1.0).contains(&self.resistance_factor) {
            self.resistance_factor
        } else {
            tracing::warn!(
                "resistance_factor {} outside [0, 1], using {}",
                self.resistance_factor,
                d.resistance_factor
            );
            d.resistance_factor
        };
        Self {
            resistance_factor,
            max_overscroll: self
                .max_overscroll
                .filter(|max| max.is_finite() && *max >= 0.0),
            settle_spring: self.settle_spring.sanitized(),
            ..self
        }
    }
}

impl DismissalConfig {
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        Self {
            velocity_threshold: positive_or(
                self.velocity_threshold,
                d.velocity_threshold,
                "velocity_threshold",
            ),
            distance_threshold: positive_or(
                self.distance_threshold,
                d.distance_threshold,
                "distance_threshold",
            ),
            axis_length: positive_or(self.axis_length, d.axis_length, "axis_length"),
            counter_resistance: unit_or(
                self.counter_resistance,
                d.counter_resistance,
                "counter_resistance",
            ),
            max_rotation_deg: finite_or(self.max_rotation_deg, d.max_rotation_deg),
            drag_fade: unit_or(self.drag_fade, d.drag_fade, "drag_fade"),
            exit_margin: non_negative_or(self.exit_margin, d.exit_margin, "exit_margin"),
            dismiss_spring: self.dismiss_spring.sanitized(),
            ..self
        }
    }
}

impl BloomConfig {
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        Self {
            duration_ms: positive_or(self.duration_ms, d.duration_ms, "bloom duration_ms"),
            max_radius: non_negative_or(self.max_radius, d.max_radius, "max_radius"),
            peak_opacity: unit_or(self.peak_opacity, d.peak_opacity, "peak_opacity"),
            ..self
        }
    }
}

impl MomentumConfig {
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        Self {
            min_velocity: non_negative_or(self.min_velocity, d.min_velocity, "min_velocity"),
            rest_velocity: positive_or(self.rest_velocity, d.rest_velocity, "rest_velocity"),
            deceleration: positive_or(self.deceleration, d.deceleration, "deceleration"),
        }
    }
}

fn positive_or(value: f32, default: f32, name: &str) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        tracing::warn!("{} = {} is not positive, using {}", name, value, default);
        default
    }
}

fn non_negative_or(value: f32, default: f32, name: &str) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        tracing::warn!("{} = {} is negative, using {}", name, value, default);
        default
    }
}

fn unit_or(value: f32, default: f32, name: &str) -> f32 {
    if (0.0..=1.0).contains(&value) {
        value
    } else {
        tracing::warn!("{} = {} outside [0, 1], using {}", name, value, default);
        default
    }
}

fn finite_or(value: f32, default: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        default
    }
}
