use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::{
    domain::{DeviceId, SensorId, SensorInfo, SensorType, SewCarInfo},
    protocol::{ActionResult, ActionizerResponse, Device, DeviceBatch},
};
use tokio::sync::Notify;

use crate::{ActionSender, ClientError};

type Responder = dyn Fn(&[Device]) -> Result<ActionizerResponse, ClientError> + Send + Sync;

/// In-memory actionizer that records every batch it receives.
pub(crate) struct RecordingSender {
    requests: Mutex<Vec<Vec<Device>>>,
    respond: Box<Responder>,
    gate: Option<Arc<Notify>>,
    pub(crate) started: Notify,
}

impl RecordingSender {
    /// Answers every action with a 200 entry at its position in the request.
    pub(crate) fn accepting() -> Self {
        Self::responding(|devices| {
            let count = devices.iter().map(|device| device.actions.len()).sum();
            Ok(ActionizerResponse::Success(
                (0..count).map(ActionResult::ok).collect(),
            ))
        })
    }

    pub(crate) fn responding(
        respond: impl Fn(&[Device]) -> Result<ActionizerResponse, ClientError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            respond: Box::new(respond),
            gate: None,
            started: Notify::new(),
        }
    }

    pub(crate) fn failing() -> Self {
        Self::responding(|_| {
            Err(ClientError::InvalidEndpoint {
                url: "unreachable".to_string(),
                source: url::ParseError::EmptyHost,
            })
        })
    }

    /// Holds every response until `gate` is notified.
    pub(crate) fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn requests(&self) -> Vec<Vec<Device>> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl ActionSender for RecordingSender {
    async fn send_actions(&self, devices: DeviceBatch) -> Result<ActionizerResponse, ClientError> {
        let devices = devices.into_inner();
        self.requests
            .lock()
            .expect("requests lock")
            .push(devices.clone());
        self.started.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        (self.respond)(&devices)
    }
}

pub(crate) fn switch_sensor(device_id: &str, sensor_id: &str, name: &str) -> SensorInfo {
    SensorInfo {
        device_id: DeviceId::from(device_id),
        sensor_id: SensorId::from(sensor_id),
        sensor_type: SensorType::Switch,
        name: name.to_string(),
        color: None,
    }
}

pub(crate) fn test_car() -> SewCarInfo {
    SewCarInfo {
        device_id: DeviceId::from("car-0001"),
        motor_left: SensorId::from("motor-left-1"),
        motor_right: SensorId::from("motor-right-1"),
    }
}
