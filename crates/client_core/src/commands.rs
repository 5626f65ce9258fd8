use std::sync::Arc;

use shared::{
    domain::SewCarInfo,
    protocol::{Action, DcMotorPayload, Device},
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::ActionSender;

/// High-level motion intent for a differential-drive car. Every variant but
/// `Stop` carries the power magnitude of the faster motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionCommand {
    Stop,
    Forward(u32),
    Backward(u32),
    Left(u32),
    Right(u32),
    LeftForward(u32),
    RightForward(u32),
    LeftBackward(u32),
    RightBackward(u32),
}

impl MotionCommand {
    pub fn name(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Forward(_) => "forward",
            Self::Backward(_) => "backward",
            Self::Left(_) => "left",
            Self::Right(_) => "right",
            Self::LeftForward(_) => "left_forward",
            Self::RightForward(_) => "right_forward",
            Self::LeftBackward(_) => "left_backward",
            Self::RightBackward(_) => "right_backward",
        }
    }

    /// `(left, right)` motor payloads.
    pub fn motor_payloads(self) -> (DcMotorPayload, DcMotorPayload) {
        use DcMotorPayload as Motor;

        match self {
            Self::Stop => (Motor::STOPPED, Motor::STOPPED),
            Self::Forward(p) => (Motor::driving(false, p), Motor::driving(false, p)),
            Self::Backward(p) => (Motor::driving(true, p), Motor::driving(true, p)),
            Self::Left(p) => (Motor::driving(false, 0), Motor::driving(false, p)),
            Self::Right(p) => (Motor::driving(false, p), Motor::driving(false, 0)),
            Self::LeftForward(p) => (
                Motor::driving(false, turn_power(p)),
                Motor::driving(false, p),
            ),
            Self::RightForward(p) => (
                Motor::driving(false, p),
                Motor::driving(false, turn_power(p)),
            ),
            Self::LeftBackward(p) => (
                Motor::driving(true, turn_power(p)),
                Motor::driving(true, p),
            ),
            Self::RightBackward(p) => (
                Motor::driving(true, p),
                Motor::driving(true, turn_power(p)),
            ),
        }
    }

    /// The request body for `car`: its two motors, left first.
    pub fn device(self, car: &SewCarInfo) -> Device {
        let (left, right) = self.motor_payloads();
        motor_device(car, left, right)
    }
}

/// `round(power * 2 / 3)`, rounding half up. The fraction is always a
/// multiple of 1/3 so adding one before the integer division is exact.
pub fn turn_power(power: u32) -> u32 {
    ((u64::from(power) * 2 + 1) / 3) as u32
}

pub(crate) fn motor_device(car: &SewCarInfo, left: DcMotorPayload, right: DcMotorPayload) -> Device {
    Device::new(
        car.device_id.clone(),
        vec![
            Action::dc_motor(car.motor_left.clone(), left),
            Action::dc_motor(car.motor_right.clone(), right),
        ],
    )
}

/// Resolves once the command has been handed to the actionizer, whatever
/// the outcome. Dropping it does not cancel the send.
pub type Dispatched = oneshot::Receiver<()>;

type QueuedDevice = (Device, oneshot::Sender<()>);

/// Sends devices one at a time in submission order on a background task.
/// The outcome is only logged and a failed send is never retried.
#[derive(Clone)]
pub struct CommandQueue {
    tx: mpsc::UnboundedSender<QueuedDevice>,
}

impl CommandQueue {
    /// Must be called inside a Tokio runtime. The worker exits once every
    /// clone of the queue is dropped.
    pub fn spawn(sender: Arc<dyn ActionSender>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<QueuedDevice>();
        tokio::spawn(async move {
            while let Some((device, done)) = rx.recv().await {
                let device_id = device.device_id.clone();
                match sender.send_actions(device.into()).await {
                    Ok(response) => debug!(device_id = %device_id, ?response, "motion command sent"),
                    Err(err) => warn!(device_id = %device_id, error = %err, "motion command failed"),
                }
                let _ = done.send(());
            }
        });
        Self { tx }
    }

    pub fn push(&self, device: Device) -> Dispatched {
        let (done, dispatched) = oneshot::channel();
        if let Err(mpsc::error::SendError((device, _))) = self.tx.send((device, done)) {
            warn!(device_id = %device.device_id, "command queue closed, dropping motion command");
        }
        dispatched
    }
}

/// Fire-and-forget motion commands for one car.
#[derive(Clone)]
pub struct MotionCommands {
    car: SewCarInfo,
    queue: CommandQueue,
}

impl MotionCommands {
    /// Spawns the car's send queue; needs a running Tokio runtime.
    pub fn new(car: SewCarInfo, sender: Arc<dyn ActionSender>) -> Self {
        Self {
            car,
            queue: CommandQueue::spawn(sender),
        }
    }

    pub fn car(&self) -> &SewCarInfo {
        &self.car
    }

    /// Queues `command` behind every earlier one for this car.
    pub fn dispatch(&self, command: MotionCommand) -> Dispatched {
        debug!(device_id = %self.car.device_id, command = command.name(), "dispatching motion command");
        self.queue.push(command.device(&self.car))
    }

    pub fn stop(&self) -> Dispatched {
        self.dispatch(MotionCommand::Stop)
    }

    pub fn forward(&self, power: u32) -> Dispatched {
        self.dispatch(MotionCommand::Forward(power))
    }

    pub fn backward(&self, power: u32) -> Dispatched {
        self.dispatch(MotionCommand::Backward(power))
    }

    pub fn left(&self, power: u32) -> Dispatched {
        self.dispatch(MotionCommand::Left(power))
    }

    pub fn right(&self, power: u32) -> Dispatched {
        self.dispatch(MotionCommand::Right(power))
    }

    pub fn left_forward(&self, power: u32) -> Dispatched {
        self.dispatch(MotionCommand::LeftForward(power))
    }

    pub fn right_forward(&self, power: u32) -> Dispatched {
        self.dispatch(MotionCommand::RightForward(power))
    }

    pub fn left_backward(&self, power: u32) -> Dispatched {
        self.dispatch(MotionCommand::LeftBackward(power))
    }

    pub fn right_backward(&self, power: u32) -> Dispatched {
        self.dispatch(MotionCommand::RightBackward(power))
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
