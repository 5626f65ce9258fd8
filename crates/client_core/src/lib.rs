//! Action dispatch for actionizer-backed devices: switch controls with
//! optimistic reconciliation, car motion commands, and the pad and tank
//! front-ends that drive them.

use async_trait::async_trait;
use shared::protocol::{ActionizerResponse, DeviceBatch};

pub mod actionizer;
pub mod commands;
pub mod forms;
pub mod pad;
pub mod switch;
pub mod tank;

#[cfg(test)]
mod test_support;

pub use actionizer::{ActionizerClient, ClientError};
pub use commands::{MotionCommand, MotionCommands};
pub use pad::{Direction, InputSource, PadController, PadEvent};
pub use switch::{SwitchBoard, SwitchControl, SwitchPayload, SwitchState};
pub use tank::{TankControl, Track};

/// Submits device batches to an actionizer. Implemented by the HTTP client
/// and by in-memory fakes in tests.
#[async_trait]
pub trait ActionSender: Send + Sync {
    async fn send_actions(&self, devices: DeviceBatch) -> Result<ActionizerResponse, ClientError>;
}
