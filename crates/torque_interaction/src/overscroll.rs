//! Overscroll (rubberband) controller
//!
//! Tracks where the finger-driven ("raw") offset sits relative to the content
//! bounds along one axis and turns it into the visible offset:
//!
//! ```text
//!            OverscrollBottom │      InBounds      │ OverscrollTop
//!   ─────────────────────────min──────────────────max───────────────► raw
//!   visible = min + excess·r  │  visible = raw     │  visible = max + excess·r
//! ```
//!
//! Offsets follow the scroll convention: 0 is the top edge and scrolling down
//! makes the offset negative, so pulling content down past the top is
//! `OverscrollTop` and pushing past the end is `OverscrollBottom`.
//!
//! Zone changes are edge-triggered: entering a zone is reported once, and
//! staying past the boundary reports nothing until the zone changes again.

use smallvec::SmallVec;

use crate::config::OverscrollConfig;

/// Where the raw offset sits relative to the content bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverscrollZone {
    #[default]
    InBounds,
    OverscrollTop,
    OverscrollBottom,
}

impl OverscrollZone {
    pub fn is_overscrolled(&self) -> bool {
        !matches!(self, OverscrollZone::InBounds)
    }
}

/// A zone transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneChange {
    Entered(OverscrollZone),
    Exited(OverscrollZone),
}

/// Result of feeding one raw offset
#[derive(Debug, Clone, PartialEq)]
pub struct OverscrollUpdate {
    /// Offset to display
    pub visible: f32,
    pub zone: OverscrollZone,
    /// Transitions caused by this update, exits before entries
    pub changes: SmallVec<[ZoneChange; 2]>,
}

/// Spring hand-off request for a release
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleRequest {
    /// Boundary to return to
    pub target: f32,
    /// Visible velocity to seed the spring with
    pub velocity: f32,
}

/// Rubberband state machine for one axis
#[derive(Debug, Clone)]
pub struct OverscrollController {
    config: OverscrollConfig,
    min: f32,
    max: f32,
    zone: OverscrollZone,
    crossings: u32,
}

impl OverscrollController {
    pub fn new(config: OverscrollConfig) -> Self {
        Self {
            config: config.sanitized(),
            min: 0.0,
            max: 0.0,
            zone: OverscrollZone::InBounds,
            crossings: 0,
        }
    }

    pub fn config(&self) -> &OverscrollConfig {
        &self.config
    }

    pub fn zone(&self) -> OverscrollZone {
        self.zone
    }

    /// Number of entries into an overscroll zone so far
    pub fn crossings(&self) -> u32 {
        self.crossings
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Set the in-bounds range of the raw offset
    pub fn set_bounds(&mut self, min: f32, max: f32) {
        if !min.is_finite() || !max.is_finite() {
            tracing::warn!("Ignoring non-finite overscroll bounds ({}, {})", min, max);
            return;
        }
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.min = min;
        self.max = max;
    }

    /// Bounds for content of `content` extent in a `viewport`
    pub fn set_content_extent(&mut self, content: f32, viewport: f32) {
        let scrollable = (content - viewport).max(0.0);
        self.set_bounds(-scrollable, 0.0);
    }

    pub fn zone_for(&self, raw: f32) -> OverscrollZone {
        if raw > self.max {
            OverscrollZone::OverscrollTop
        } else if raw < self.min {
            OverscrollZone::OverscrollBottom
        } else {
            OverscrollZone::InBounds
        }
    }

    /// Nearest in-bounds offset
    pub fn boundary_for(&self, offset: f32) -> f32 {
        offset.clamp(self.min, self.max)
    }

    /// Whether a visible offset lies outside the bounds
    pub fn is_outside(&self, offset: f32) -> bool {
        offset > self.max || offset < self.min
    }

    /// Visible offset for a raw offset
    pub fn resist(&self, raw: f32) -> f32 {
        let boundary = self.boundary_for(raw);
        let mut excess = (raw - boundary) * self.config.resistance_factor;
        if let Some(max) = self.config.max_overscroll {
            excess = excess.clamp(-max, max);
        }
        boundary + excess
    }

    /// Raw offset that would display at `visible`, so a surface caught
    /// mid-bounce continues under the finger without a jump
    pub fn unresist(&self, visible: f32) -> f32 {
        let boundary = self.boundary_for(visible);
        if self.config.resistance_factor <= f32::EPSILON {
            return boundary;
        }
        boundary + (visible - boundary) / self.config.resistance_factor
    }

    /// Visible velocity for a raw velocity at `raw`
    pub fn resist_velocity(&self, raw: f32, velocity: f32) -> f32 {
        if self.zone_for(raw).is_overscrolled() {
            velocity * self.config.resistance_factor
        } else {
            velocity
        }
    }

    /// Feed the raw offset of the current drag frame
    pub fn update(&mut self, raw: f32) -> OverscrollUpdate {
        let zone = self.zone_for(raw);
        let mut changes = SmallVec::new();

        if zone != self.zone {
            if self.zone.is_overscrolled() {
                changes.push(ZoneChange::Exited(self.zone));
            }
            if zone.is_overscrolled() {
                self.crossings += 1;
                changes.push(ZoneChange::Entered(zone));
            }
            tracing::debug!("Overscroll {:?} -> {:?} at raw {:.1}", self.zone, zone, raw);
            self.zone = zone;
        }

        OverscrollUpdate {
            visible: self.resist(raw),
            zone,
            changes,
        }
    }

    /// End of drag. Returns a spring hand-off when the visible offset is past
    /// a boundary, and re-arms the edge trigger.
    pub fn release(&mut self, visible: f32, visible_velocity: f32, momentum: bool) -> Option<SettleRequest> {
        if self.zone.is_overscrolled() {
            tracing::debug!("Overscroll {:?} released", self.zone);
        }
        self.zone = OverscrollZone::InBounds;

        if !self.is_outside(visible) {
            return None;
        }
        Some(SettleRequest {
            target: self.boundary_for(visible),
            velocity: if momentum { visible_velocity } else { 0.0 },
        })
    }

    /// Drop excursion state without a release (unmount, suspend)
    pub fn reset(&mut self) {
        self.zone = OverscrollZone::InBounds;
    }
}
