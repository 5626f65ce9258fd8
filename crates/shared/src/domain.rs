use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(SensorId);
id_newtype!(DeviceId);

/// Display colour given to new sensors when the operator does not pick one.
pub const DEFAULT_SENSOR_COLOR: &str = "#BA000D";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorType {
    #[default]
    Switch,
    Distance,
    Dcmotor,
}

impl SensorType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Switch => "SWITCH",
            Self::Distance => "DISTANCE",
            Self::Dcmotor => "DCMOTOR",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SensorType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SWITCH" => Ok(Self::Switch),
            "DISTANCE" => Ok(Self::Distance),
            "DCMOTOR" => Ok(Self::Dcmotor),
            _ => Err(ValidationError::UnknownSensorType(value.to_string())),
        }
    }
}

/// Operator-configured metadata for one sensor or actuator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorInfo {
    pub device_id: DeviceId,
    pub sensor_id: SensorId,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SensorInfo {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.device_id.is_empty() {
            return Err(ValidationError::MissingField("deviceId"));
        }
        if self.sensor_id.is_empty() {
            return Err(ValidationError::MissingField("sensorId"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        Ok(())
    }
}

/// The pair of DC motors that make up a differential-drive car.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SewCarInfo {
    pub device_id: DeviceId,
    pub motor_left: SensorId,
    pub motor_right: SensorId,
}

impl SewCarInfo {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.device_id.is_empty() {
            return Err(ValidationError::MissingField("deviceId"));
        }
        if self.motor_left.is_empty() {
            return Err(ValidationError::MissingField("motorLeft"));
        }
        if self.motor_right.is_empty() {
            return Err(ValidationError::MissingField("motorRight"));
        }
        Ok(())
    }
}
