//! Core engine types and utilities for Island Flight.
//!
//! This crate provides the foundational types used across all engine systems:
//! - Transform and body-axis helpers for the aircraft
//! - Frame timing with a clamped simulation step

pub mod time;
pub mod transform;

pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
