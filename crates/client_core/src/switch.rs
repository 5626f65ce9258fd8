//! Optimistic switch controls reconciled against actionizer responses.
//!
//! A control is `{ payload, loading }`. Mounting forces the device OFF,
//! clicks flip the displayed payload, and every request is one full round
//! trip. While a request is outstanding the control ignores input, which is
//! what keeps requests for one sensor strictly sequential.

use std::sync::Arc;

use futures::future::join_all;
use shared::{
    domain::{DeviceId, SensorId, SensorInfo, SensorType},
    protocol::{is_action_error, Action, ActionizerResponse, Device, SwitchValue},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{ActionSender, ClientError};

pub const NO_SENSORS_MESSAGE: &str = "No Sensors found!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchPayload {
    Off,
    On,
    Unknown,
}

impl SwitchPayload {
    /// Wire-compatible code: 0, 1, or -1 for unknown.
    pub fn code(self) -> i8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
            Self::Unknown => -1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
            Self::Unknown => "??",
        }
    }
}

impl From<SwitchValue> for SwitchPayload {
    fn from(value: SwitchValue) -> Self {
        match value {
            SwitchValue::Off => Self::Off,
            SwitchValue::On => Self::On,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchState {
    pub payload: SwitchPayload,
    pub loading: bool,
}

impl Default for SwitchState {
    fn default() -> Self {
        Self {
            payload: SwitchPayload::Off,
            loading: false,
        }
    }
}

impl SwitchState {
    /// Mount always forces OFF, whatever the current state.
    pub fn mount(&mut self) -> SwitchValue {
        self.loading = true;
        SwitchValue::Off
    }

    /// Starts a request for `value` unless one is already outstanding.
    pub fn request(&mut self, value: SwitchValue) -> Option<SwitchValue> {
        if self.loading {
            return None;
        }
        self.loading = true;
        Some(value)
    }

    /// OFF requests ON; ON and unknown both request OFF.
    pub fn click(&mut self) -> Option<SwitchValue> {
        let next = match self.payload {
            SwitchPayload::Off => SwitchValue::On,
            SwitchPayload::On | SwitchPayload::Unknown => SwitchValue::Off,
        };
        self.request(next)
    }

    pub fn settle(&mut self, payload: SwitchPayload) {
        self.payload = payload;
        self.loading = false;
    }

    pub fn label(&self) -> &'static str {
        if self.loading {
            "Loading"
        } else {
            self.payload.label()
        }
    }
}

/// Resolves the displayed payload for the action at `action_index` after a
/// request for `requested` settled. Anything short of a matching 200 entry
/// is unknown.
pub fn reconcile(
    requested: SwitchValue,
    action_index: usize,
    sensor_id: &SensorId,
    outcome: &Result<ActionizerResponse, ClientError>,
) -> SwitchPayload {
    match outcome {
        Err(err) => {
            warn!(sensor_id = %sensor_id, error = %err, "switch request failed");
            SwitchPayload::Unknown
        }
        Ok(response) if is_action_error(response) => SwitchPayload::Unknown,
        Ok(response) => match response.success_for(action_index, sensor_id) {
            Some(_) => requested.into(),
            None => {
                debug!(sensor_id = %sensor_id, action_index, "no successful entry for switch action");
                SwitchPayload::Unknown
            }
        },
    }
}

/// One switch button bound to a sensor.
#[derive(Clone)]
pub struct SwitchControl {
    sensor: SensorInfo,
    state: Arc<Mutex<SwitchState>>,
    sender: Arc<dyn ActionSender>,
}

impl SwitchControl {
    pub fn new(sensor: SensorInfo, sender: Arc<dyn ActionSender>) -> Self {
        Self {
            sensor,
            state: Arc::new(Mutex::new(SwitchState::default())),
            sender,
        }
    }

    pub fn sensor(&self) -> &SensorInfo {
        &self.sensor
    }

    pub fn sensor_id(&self) -> &SensorId {
        &self.sensor.sensor_id
    }

    pub async fn state(&self) -> SwitchState {
        *self.state.lock().await
    }

    pub async fn mount(&self) -> SwitchState {
        let requested = self.state.lock().await.mount();
        self.run(requested).await
    }

    /// Returns `None` when the click was ignored because a request is in
    /// flight.
    pub async fn click(&self) -> Option<SwitchState> {
        let requested = self.state.lock().await.click()?;
        Some(self.run(requested).await)
    }

    async fn run(&self, requested: SwitchValue) -> SwitchState {
        let device = Device::new(
            self.sensor.device_id.clone(),
            vec![Action::switch(self.sensor.sensor_id.clone(), requested)],
        );
        let outcome = self.sender.send_actions(device.into()).await;
        let payload = reconcile(requested, 0, &self.sensor.sensor_id, &outcome);

        let mut state = self.state.lock().await;
        state.settle(payload);
        info!(
            sensor_id = %self.sensor.sensor_id,
            payload = payload.code(),
            "switch settled"
        );
        *state
    }
}

/// The switch buttons rendered for the stored sensor list.
pub struct SwitchBoard {
    controls: Vec<SwitchControl>,
    sender: Arc<dyn ActionSender>,
}

impl SwitchBoard {
    /// Only `SWITCH` sensors get a control.
    pub fn new(sensors: &[SensorInfo], sender: Arc<dyn ActionSender>) -> Self {
        let controls = sensors
            .iter()
            .filter(|sensor| sensor.sensor_type == SensorType::Switch)
            .map(|sensor| SwitchControl::new(sensor.clone(), sender.clone()))
            .collect();
        Self { controls, sender }
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn controls(&self) -> &[SwitchControl] {
        &self.controls
    }

    pub fn control(&self, sensor_id: &SensorId) -> Option<&SwitchControl> {
        self.controls
            .iter()
            .find(|control| control.sensor_id() == sensor_id)
    }

    /// Mounts every control concurrently, one request each.
    pub async fn mount_all(&self) -> Vec<SwitchState> {
        join_all(self.controls.iter().map(|control| control.mount())).await
    }

    /// Sets every idle switch of `device_id` to `value` in a single request.
    /// Busy controls are left out of the batch. Returns the controls that took
    /// part, with their settled state.
    pub async fn sync_device(
        &self,
        device_id: &DeviceId,
        value: SwitchValue,
    ) -> Vec<(SensorId, SwitchState)> {
        let mut batch = Vec::new();
        for control in self
            .controls
            .iter()
            .filter(|control| &control.sensor.device_id == device_id)
        {
            if control.state.lock().await.request(value).is_some() {
                batch.push(control);
            }
        }
        if batch.is_empty() {
            return Vec::new();
        }

        let actions = batch
            .iter()
            .map(|control| Action::switch(control.sensor_id().clone(), value))
            .collect();
        let outcome = self
            .sender
            .send_actions(Device::new(device_id.clone(), actions).into())
            .await;

        let mut settled = Vec::with_capacity(batch.len());
        for (index, control) in batch.into_iter().enumerate() {
            let payload = reconcile(value, index, control.sensor_id(), &outcome);
            let mut state = control.state.lock().await;
            state.settle(payload);
            settled.push((control.sensor_id().clone(), *state));
        }
        settled
    }

    /// One line per control: `name: LABEL`.
    pub async fn render(&self) -> Vec<String> {
        if self.controls.is_empty() {
            return vec![NO_SENSORS_MESSAGE.to_string()];
        }

        let mut lines = Vec::with_capacity(self.controls.len());
        for control in &self.controls {
            let state = control.state().await;
            lines.push(format!(
                "{} [{}]: {}",
                control.sensor.name,
                control.sensor_id(),
                state.label()
            ));
        }
        lines
    }
}

#[cfg(test)]
#[path = "tests/switch_tests.rs"]
mod tests;
