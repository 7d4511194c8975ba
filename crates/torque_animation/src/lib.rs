//! Torque Animation System
//!
//! Spring physics and timed keyframe animations.
//!
//! # Features
//!
//! - **Spring Physics**: closed-form damped harmonic oscillator with stiffness, damping, mass
//! - **Interruptible**: retargeting keeps position and velocity
//! - **Self-correcting**: degenerate configs fall back to defaults, stuck springs snap to rest
//! - **Keyframe Animations**: fixed-duration sequences with easing functions

pub mod easing;
pub mod keyframe;
pub mod spring;

pub use easing::Easing;
pub use keyframe::{Keyframe, KeyframeAnimation};
pub use spring::{Spring, Spring2D, SpringConfig};
