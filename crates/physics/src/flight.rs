//! Force-based flight model: throttle spool, control authority, lift, drag and
//! ground contact integrated once per tick.
//!
//! The controller owns the aircraft transform and velocity outright. Callers are
//! expected to clamp `dt` (see `engine_core::MAX_SIM_STEP`) before calling
//! [`FlightController::update`]; the integrator is explicit Euler and large steps
//! will overshoot.

use engine_core::{Transform, BODY_FORWARD};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Altitude tolerance for the grounded check.
const GROUND_EPSILON: f32 = 0.01;
/// Band above the floor where the ground pushes back against gravity.
const GROUND_SUPPORT_BAND: f32 = 1.5;
/// Stick deflection below which auto-level takes over an axis.
const AUTO_LEVEL_DEADZONE: f32 = 0.01;

/// Resolved pilot input for one tick. Axes are in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlInput {
    /// Positive raises the nose.
    pub pitch: f32,
    /// Positive drops the right wing.
    pub roll: f32,
    /// Positive swings the nose right.
    pub yaw: f32,
    pub throttle_up: bool,
    pub throttle_down: bool,
}

impl ControlInput {
    /// Sum of stick deflections, used for manoeuvring drag.
    pub fn turn_intensity(&self) -> f32 {
        self.pitch.abs() + self.roll.abs() + self.yaw.abs()
    }
}

/// Aircraft constants. Fixed once the controller is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightTuning {
    pub max_thrust: f32,
    pub drag_coeff: f32,
    pub turn_drag: f32,
    pub lift_coeff: f32,
    pub gravity: f32,
    /// Body rates at full deflection (rad/s).
    pub pitch_rate: f32,
    pub roll_rate: f32,
    pub yaw_rate: f32,
    /// How quickly angular velocity chases its target (1/s).
    pub angular_damping: f32,
    pub auto_level_strength: f32,
    pub stall_speed: f32,
    pub takeoff_speed: f32,
    /// Throttle change per second while a throttle key is held.
    pub throttle_rate: f32,
    pub max_speed: f32,
    pub min_altitude: f32,
    /// Half-extent of the flyable square on X and Z.
    pub world_limit: f32,
    /// Speed along the nose at construction.
    pub initial_speed: f32,
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self {
            max_thrust: 40.0,
            drag_coeff: 0.05,
            turn_drag: 0.08,
            lift_coeff: 0.02,
            gravity: 9.8,
            pitch_rate: 1.6,
            roll_rate: 2.2,
            yaw_rate: 1.0,
            angular_damping: 6.0,
            auto_level_strength: 0.8,
            stall_speed: 12.0,
            takeoff_speed: 22.0,
            throttle_rate: 0.6,
            max_speed: 120.0,
            min_altitude: 2.0,
            world_limit: 950.0,
            initial_speed: 20.0,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlightTuningError {
    #[error("flight tuning `{field}` must be finite (got {value})")]
    NonFinite { field: &'static str, value: f32 },
    #[error("flight tuning `{field}` must be greater than zero (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("flight tuning `{field}` must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("takeoff speed {takeoff} is below stall speed {stall}")]
    TakeoffBelowStall { takeoff: f32, stall: f32 },
}

impl FlightTuning {
    /// Reject values that would make the integrator produce NaN or run backwards.
    pub fn validate(&self) -> Result<(), FlightTuningError> {
        let fields = [
            ("max_thrust", self.max_thrust),
            ("drag_coeff", self.drag_coeff),
            ("turn_drag", self.turn_drag),
            ("lift_coeff", self.lift_coeff),
            ("gravity", self.gravity),
            ("pitch_rate", self.pitch_rate),
            ("roll_rate", self.roll_rate),
            ("yaw_rate", self.yaw_rate),
            ("angular_damping", self.angular_damping),
            ("auto_level_strength", self.auto_level_strength),
            ("stall_speed", self.stall_speed),
            ("takeoff_speed", self.takeoff_speed),
            ("throttle_rate", self.throttle_rate),
            ("max_speed", self.max_speed),
            ("min_altitude", self.min_altitude),
            ("world_limit", self.world_limit),
            ("initial_speed", self.initial_speed),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(FlightTuningError::NonFinite { field, value });
            }
        }
        for (field, value) in [
            ("stall_speed", self.stall_speed),
            ("max_speed", self.max_speed),
            ("world_limit", self.world_limit),
        ] {
            if value <= 0.0 {
                return Err(FlightTuningError::NonPositive { field, value });
            }
        }
        // min_altitude may sit anywhere; every other constant is a magnitude.
        for (field, value) in fields.iter().copied().filter(|(f, _)| *f != "min_altitude") {
            if value < 0.0 {
                return Err(FlightTuningError::Negative { field, value });
            }
        }
        if self.takeoff_speed < self.stall_speed {
            return Err(FlightTuningError::TakeoffBelowStall {
                takeoff: self.takeoff_speed,
                stall: self.stall_speed,
            });
        }
        Ok(())
    }
}

/// Owns one aircraft's kinematic state and advances it each tick.
#[derive(Debug, Clone)]
pub struct FlightController {
    tuning: FlightTuning,
    transform: Transform,
    velocity: Vec3,
    /// Body rates: x = pitch, y = yaw, z = roll (rad/s).
    angular_velocity: Vec3,
    throttle: f32,
    min_altitude: f32,
    spawn_position: Vec3,
    spawn_rotation: Quat,
    grounded: bool,
}

impl FlightController {
    /// Build a controller at `spawn_position`, level, nose along `+Z`, already
    /// moving at `initial_speed`.
    pub fn new(tuning: FlightTuning, spawn_position: Vec3) -> Result<Self, FlightTuningError> {
        tuning.validate()?;
        let min_altitude = tuning.min_altitude;
        let velocity = BODY_FORWARD * tuning.initial_speed;
        Ok(Self {
            transform: Transform::from_position(spawn_position),
            velocity,
            angular_velocity: Vec3::ZERO,
            throttle: 0.0,
            min_altitude,
            spawn_position,
            spawn_rotation: Quat::IDENTITY,
            grounded: spawn_position.y <= min_altitude + GROUND_EPSILON,
            tuning,
        })
    }

    /// Make `rotation` part of the spawn pose (e.g. a carrier launch heading).
    /// The current attitude and velocity are turned to match.
    pub fn with_spawn_rotation(mut self, rotation: Quat) -> Self {
        let rotation = rotation.normalize();
        self.spawn_rotation = rotation;
        self.transform.rotation = rotation;
        self.velocity = rotation * BODY_FORWARD * self.tuning.initial_speed;
        self
    }

    /// Back to the spawn pose with everything at rest.
    pub fn reset(&mut self) {
        self.transform.position = self.spawn_position;
        self.transform.rotation = self.spawn_rotation;
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.throttle = 0.0;
        self.grounded = self.is_grounded();
    }

    /// Advance one tick. `dt` must already be clamped by the caller.
    pub fn update(&mut self, dt: f32, input: &ControlInput, brake_engaged: bool, auto_level: bool) {
        let t = &self.tuning;
        let is_grounded = self.is_grounded();

        if !brake_engaged || !is_grounded {
            let delta = f32::from(u8::from(input.throttle_up)) - f32::from(u8::from(input.throttle_down));
            self.throttle = (self.throttle + delta * t.throttle_rate * dt).clamp(0.0, 1.0);
        } else {
            self.throttle = 0.0;
        }

        let speed = self.speed();
        let control_scale = (speed / t.stall_speed).clamp(0.0, 1.0);

        let (mut auto_pitch, mut auto_roll) = (0.0, 0.0);
        if auto_level {
            let attitude = self.transform.attitude();
            if input.pitch.abs() < AUTO_LEVEL_DEADZONE {
                auto_pitch = -attitude.pitch;
            }
            if input.roll.abs() < AUTO_LEVEL_DEADZONE {
                auto_roll = -attitude.roll;
            }
        }

        let target = Vec3::new(
            input.pitch * control_scale * t.pitch_rate + auto_pitch * t.auto_level_strength,
            input.yaw * control_scale * t.yaw_rate,
            input.roll * control_scale * t.roll_rate + auto_roll * t.auto_level_strength,
        );
        let blend = 1.0 - (-t.angular_damping * dt).exp();
        self.angular_velocity = self.angular_velocity.lerp(target, blend);

        // Successive local rotations, not one combined quaternion.
        self.transform.pitch_local(self.angular_velocity.x * dt);
        self.transform.yaw_local(self.angular_velocity.y * dt);
        self.transform.roll_local(self.angular_velocity.z * dt);

        let forward = self.transform.forward().normalize_or_zero();
        let up = self.transform.up().normalize_or_zero();

        let thrust = forward * t.max_thrust * self.throttle;
        let drag = self.velocity * (-t.drag_coeff * speed);
        let turn_drag = self.velocity * (-t.turn_drag * input.turn_intensity() * speed);

        let lift_scale = if speed < t.takeoff_speed {
            0.0
        } else if is_grounded {
            input.pitch.max(0.0) * control_scale
        } else {
            control_scale
        };
        let lift = up * t.lift_coeff * speed * speed * lift_scale;

        let gravity = Vec3::new(0.0, -t.gravity, 0.0);
        let ground_support = if self.transform.position.y <= self.min_altitude + GROUND_SUPPORT_BAND {
            Vec3::new(0.0, t.gravity, 0.0)
        } else {
            Vec3::ZERO
        };

        let acceleration = thrust + lift + drag + turn_drag + gravity + ground_support;
        self.velocity += acceleration * dt;
        self.velocity = self.velocity.clamp_length_max(t.max_speed);
        self.transform.position += self.velocity * dt;

        if self.transform.position.y < self.min_altitude {
            self.transform.position.y = self.min_altitude;
            self.velocity.y = self.velocity.y.max(0.0);
        }

        if brake_engaged && is_grounded {
            self.velocity.x = 0.0;
            self.velocity.z = 0.0;
        }

        let limit = t.world_limit;
        if self.transform.position.x.abs() > limit {
            self.transform.position.x = self.transform.position.x.clamp(-limit, limit);
            self.velocity.x = 0.0;
            log::debug!("Aircraft hit the world edge at x = {}", self.transform.position.x);
        }
        if self.transform.position.z.abs() > limit {
            self.transform.position.z = self.transform.position.z.clamp(-limit, limit);
            self.velocity.z = 0.0;
            log::debug!("Aircraft hit the world edge at z = {}", self.transform.position.z);
        }

        let now_grounded = self.is_grounded();
        if now_grounded != self.grounded {
            if now_grounded {
                log::debug!("Touch-down at {:.1} m/s", self.speed());
            } else {
                log::debug!("Lift-off at {:.1} m/s", self.speed());
            }
            self.grounded = now_grounded;
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Body rates (pitch, yaw, roll).
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    pub fn tuning(&self) -> &FlightTuning {
        &self.tuning
    }

    pub fn spawn_position(&self) -> Vec3 {
        self.spawn_position
    }

    pub fn spawn_rotation(&self) -> Quat {
        self.spawn_rotation
    }

    pub fn min_altitude(&self) -> f32 {
        self.min_altitude
    }

    /// Move the hard floor. Takes effect on the next tick.
    pub fn set_min_altitude(&mut self, min_altitude: f32) {
        self.min_altitude = min_altitude;
    }

    /// Raise the floor to at least `floor` and lift the aircraft onto it if it
    /// is below, dropping any sink rate.
    pub fn raise_floor_to(&mut self, floor: f32) {
        self.min_altitude = self.min_altitude.max(floor);
        if self.transform.position.y < floor {
            self.transform.position.y = floor;
            self.velocity.y = self.velocity.y.max(0.0);
        }
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation.normalize();
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    pub fn is_grounded(&self) -> bool {
        self.transform.position.y <= self.min_altitude + GROUND_EPSILON
    }
}
