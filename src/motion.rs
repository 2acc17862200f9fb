// SPDX-License-Identifier: GPL-3.0-only

//! Device motion tracking relative to a reference attitude
//!
//! The motion subsystem pushes discrete readings into a [`MotionTracker`].
//! The first reading after creation (or after [`MotionTracker::reset`])
//! becomes the reference attitude; every snapshot is expressed relative to
//! it, so the first capture of an object is at roll = pitch = yaw = 0.

use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Absolute device attitude as Euler angles in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attitude {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Attitude {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    fn to_quaternion(self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(self.roll, self.pitch, self.yaw)
    }

    fn from_quaternion(q: &UnitQuaternion<f64>) -> Self {
        let (roll, pitch, yaw) = q.euler_angles();
        Self { roll, pitch, yaw }
    }
}

/// User acceleration in g, gravity removed
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Acceleration {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Acceleration {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Motion snapshot attached to one capture
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionSample {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub acceleration_x: f64,
    pub acceleration_y: f64,
    pub acceleration_z: f64,
}

impl MotionSample {
    pub fn new(orientation: Attitude, acceleration: Acceleration) -> Self {
        Self {
            roll: orientation.roll,
            pitch: orientation.pitch,
            yaw: orientation.yaw,
            acceleration_x: acceleration.x,
            acceleration_y: acceleration.y,
            acceleration_z: acceleration.z,
        }
    }

    pub fn orientation(&self) -> Attitude {
        Attitude::new(self.roll, self.pitch, self.yaw)
    }

    pub fn acceleration(&self) -> Acceleration {
        Acceleration::new(self.acceleration_x, self.acceleration_y, self.acceleration_z)
    }
}

/// Accumulates motion readings between captures
#[derive(Debug, Clone, Default)]
pub struct MotionTracker {
    reference: Option<UnitQuaternion<f64>>,
    latest: Option<UnitQuaternion<f64>>,
    acceleration: Option<Acceleration>,
}

impl MotionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reading from the motion subsystem
    pub fn push_sample(&mut self, attitude: Attitude, user_acceleration: Acceleration) {
        let q = attitude.to_quaternion();
        if self.reference.is_none() {
            debug!(
                roll = attitude.roll,
                pitch = attitude.pitch,
                yaw = attitude.yaw,
                "Reference attitude captured"
            );
            self.reference = Some(q);
        }
        self.latest = Some(q);
        self.acceleration = Some(user_acceleration);
    }

    /// Whether a reference attitude has been captured
    pub fn is_tracking(&self) -> bool {
        self.reference.is_some()
    }

    /// Latest attitude relative to the reference, if any reading arrived
    pub fn relative_orientation(&self) -> Option<Attitude> {
        let reference = self.reference?;
        let latest = self.latest?;
        Some(Attitude::from_quaternion(&(reference.inverse() * latest)))
    }

    /// Snapshot for a capture; `None` until the first reading
    pub fn current_sample(&self) -> Option<MotionSample> {
        let orientation = self.relative_orientation()?;
        let acceleration = self.acceleration.unwrap_or_default();
        Some(MotionSample::new(orientation, acceleration))
    }

    /// Forget the reference; the next reading becomes the new one
    pub fn reset(&mut self) {
        self.reference = None;
        self.latest = None;
        self.acceleration = None;
    }
}
