use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{DeviceId, SensorId, SensorType},
    error::ValidationError,
};

/// Per-action status the actionizer reports for an applied action.
pub const ACTION_STATUS_OK: u16 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SwitchValue {
    Off,
    On,
}

impl TryFrom<u8> for SwitchValue {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Off),
            1 => Ok(Self::On),
            other => Err(ValidationError::InvalidSwitchValue(other)),
        }
    }
}

impl From<SwitchValue> for u8 {
    fn from(value: SwitchValue) -> Self {
        match value {
            SwitchValue::Off => 0,
            SwitchValue::On => 1,
        }
    }
}

/// Drive state for one DC motor. `power` is nominally 0..=255 and is sent
/// unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcMotorPayload {
    pub enabled: bool,
    pub reverse: bool,
    pub power: u32,
}

impl DcMotorPayload {
    pub const STOPPED: Self = Self {
        enabled: false,
        reverse: false,
        power: 0,
    };

    pub fn driving(reverse: bool, power: u32) -> Self {
        Self {
            enabled: true,
            reverse,
            power,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionPayload {
    Switch(SwitchValue),
    Distance,
    Dcmotor(DcMotorPayload),
}

impl ActionPayload {
    pub fn sensor_type(&self) -> SensorType {
        match self {
            Self::Switch(_) => SensorType::Switch,
            Self::Distance => SensorType::Distance,
            Self::Dcmotor(_) => SensorType::Dcmotor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub sensor_id: SensorId,
    #[serde(flatten)]
    pub payload: ActionPayload,
}

impl Action {
    pub fn switch(sensor_id: SensorId, value: SwitchValue) -> Self {
        Self {
            sensor_id,
            payload: ActionPayload::Switch(value),
        }
    }

    pub fn dc_motor(sensor_id: SensorId, payload: DcMotorPayload) -> Self {
        Self {
            sensor_id,
            payload: ActionPayload::Dcmotor(payload),
        }
    }

    pub fn sensor_type(&self) -> SensorType {
        self.payload.sensor_type()
    }
}

/// One request unit addressed to a physical device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: DeviceId,
    pub actions: Vec<Action>,
}

impl Device {
    pub fn new(device_id: DeviceId, actions: Vec<Action>) -> Self {
        Self { device_id, actions }
    }
}

/// One or many devices submitted in a single actionizer request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceBatch(pub Vec<Device>);

impl DeviceBatch {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<Device> {
        self.0
    }
}

impl From<Device> for DeviceBatch {
    fn from(value: Device) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<Device>> for DeviceBatch {
    fn from(value: Vec<Device>) -> Self {
        Self(value)
    }
}

/// Request body shape understood by the actionizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireProtocol {
    /// `[{ deviceId, actions: [...] }, ...]`
    #[default]
    Devices,
    /// `[{ sensorId, type, payload }, ...]`, the pre-device endpoint.
    Legacy,
}

impl fmt::Display for WireProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Devices => f.write_str("devices"),
            Self::Legacy => f.write_str("legacy"),
        }
    }
}

impl FromStr for WireProtocol {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "devices" | "device" => Ok(Self::Devices),
            "legacy" | "actions" => Ok(Self::Legacy),
            other => Err(format!("unknown wire protocol `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ActionizerRequest {
    Devices(Vec<Device>),
    Actions(Vec<Action>),
}

impl ActionizerRequest {
    pub fn encode(protocol: WireProtocol, devices: Vec<Device>) -> Self {
        match protocol {
            WireProtocol::Devices => Self::Devices(devices),
            WireProtocol::Legacy => Self::Actions(
                devices
                    .into_iter()
                    .flat_map(|device| device.actions)
                    .collect(),
            ),
        }
    }
}

/// The subset of a submitted action the actionizer echoes back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoedAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<SensorId>,
}

/// Outcome of a single submitted action. Servers may omit entries for
/// actions that failed, so a batch response can be shorter than the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<EchoedAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionResult {
    pub fn ok(action_index: usize) -> Self {
        Self {
            action_index: Some(action_index),
            status: Some(ACTION_STATUS_OK),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(ACTION_STATUS_OK)
    }

    /// An echoed sensor id wins over the positional index.
    pub fn refers_to(&self, action_index: usize, sensor_id: &SensorId) -> bool {
        match self.action.as_ref().and_then(|echo| echo.sensor_id.as_ref()) {
            Some(echoed) => echoed == sensor_id,
            None => self.action_index == Some(action_index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionizerError {
    pub error_code: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionizerResponse {
    Success(Vec<ActionResult>),
    Error(ActionizerError),
}

impl ActionizerResponse {
    pub fn empty() -> Self {
        Self::Success(Vec::new())
    }

    pub fn error(error_code: u16) -> Self {
        Self::Error(ActionizerError { error_code })
    }

    pub fn results(&self) -> &[ActionResult] {
        match self {
            Self::Success(results) => results,
            Self::Error(_) => &[],
        }
    }

    /// Successful entry for the action at `action_index`, if the server
    /// reported one.
    pub fn success_for(&self, action_index: usize, sensor_id: &SensorId) -> Option<&ActionResult> {
        self.results()
            .iter()
            .find(|result| result.refers_to(action_index, sensor_id) && result.is_success())
    }
}

/// True for the synthesized `{ errorCode }` shape with a non-zero code. Any
/// result list, including an empty one, is not an error.
pub fn is_action_error(response: &ActionizerResponse) -> bool {
    matches!(response, ActionizerResponse::Error(ActionizerError { error_code }) if *error_code != 0)
}
