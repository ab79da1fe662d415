//! Transform component and utilities for spatial positioning.
//!
//! Body axes follow the aircraft convention used throughout the workspace:
//! the nose points along local `+Z`, the canopy along local `+Y`, and the
//! right wing along local `-X`. All three frames are right-handed.

use glam::{Quat, Vec3};

/// Local axis the nose points along.
pub const BODY_FORWARD: Vec3 = Vec3::Z;
/// Local axis out of the canopy.
pub const BODY_UP: Vec3 = Vec3::Y;
/// Local axis along the right wing.
pub const BODY_RIGHT: Vec3 = Vec3::NEG_X;

/// A rigid transform: position and rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Pitch and roll of a body measured against its own axes, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Attitude {
    /// Nose elevation above the horizon, in `[-pi/2, pi/2]`. Positive is nose up.
    pub pitch: f32,
    /// Bank angle, in `[-pi, pi]`. Positive is right wing down.
    pub roll: f32,
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Get the forward (nose) direction.
    pub fn forward(&self) -> Vec3 {
        self.rotation * BODY_FORWARD
    }

    /// Get the right-wing direction.
    pub fn right(&self) -> Vec3 {
        self.rotation * BODY_RIGHT
    }

    /// Get the up direction.
    pub fn up(&self) -> Vec3 {
        self.rotation * BODY_UP
    }

    /// Rotate about an axis expressed in the body's own frame.
    pub fn rotate_local(&mut self, axis: Vec3, angle: f32) {
        self.rotation = (self.rotation * Quat::from_axis_angle(axis, angle)).normalize();
    }

    /// Pitch about the right-wing axis. Positive raises the nose.
    pub fn pitch_local(&mut self, angle: f32) {
        self.rotate_local(BODY_RIGHT, angle);
    }

    /// Yaw about the body's down axis. Positive swings the nose right.
    pub fn yaw_local(&mut self, angle: f32) {
        self.rotate_local(-BODY_UP, angle);
    }

    /// Roll about the nose axis. Positive drops the right wing.
    pub fn roll_local(&mut self, angle: f32) {
        self.rotate_local(BODY_FORWARD, angle);
    }

    /// Pitch and roll measured from the body axes rather than a generic Euler
    /// decomposition, so the result stays finite and bounded at any attitude
    /// including a vertical nose.
    pub fn attitude(&self) -> Attitude {
        let forward = self.forward();
        let pitch = forward.y.clamp(-1.0, 1.0).asin();
        let right_y = self.right().y;
        let up_y = self.up().y;
        let roll = if right_y.abs() < 1e-6 && up_y.abs() < 1e-6 {
            0.0
        } else {
            (-right_y).atan2(up_y)
        };
        Attitude { pitch, roll }
    }
}
