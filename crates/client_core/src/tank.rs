use std::sync::Arc;

use shared::{
    domain::SewCarInfo,
    protocol::{DcMotorPayload, Device},
};
use tracing::debug;

use crate::{
    commands::{motor_device, CommandQueue, Dispatched},
    ActionSender,
};

pub const TANK_RANGE: i32 = 255;
pub const NO_CONFIGURATION_MESSAGE: &str =
    "No configuration found!, please go to SewCar to configure it!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    Left,
    Right,
}

/// Signed slider value to motor drive: the sign picks the direction, zero
/// disables the motor.
pub fn track_payload(value: i32) -> DcMotorPayload {
    if value == 0 {
        return DcMotorPayload::STOPPED;
    }
    DcMotorPayload::driving(value < 0, value.unsigned_abs())
}

/// Two vertical sliders, one per track, each sending the full motor pair on
/// every change.
pub struct TankControl {
    car: SewCarInfo,
    queue: CommandQueue,
    left: i32,
    right: i32,
}

impl TankControl {
    /// Spawns the car's send queue; needs a running Tokio runtime.
    pub fn new(car: SewCarInfo, sender: Arc<dyn ActionSender>) -> Self {
        Self {
            car,
            queue: CommandQueue::spawn(sender),
            left: 0,
            right: 0,
        }
    }

    pub fn powers(&self) -> (i32, i32) {
        (self.left, self.right)
    }

    pub fn device(&self) -> Device {
        motor_device(
            &self.car,
            track_payload(self.left),
            track_payload(self.right),
        )
    }

    pub fn slide(&mut self, track: Track, value: i32) -> Dispatched {
        let value = value.clamp(-TANK_RANGE, TANK_RANGE);
        match track {
            Track::Left => self.left = value,
            Track::Right => self.right = value,
        }
        debug!(?track, left = self.left, right = self.right, "tank slider moved");
        self.queue.push(self.device())
    }
}

#[cfg(test)]
#[path = "tests/tank_tests.rs"]
mod tests;
