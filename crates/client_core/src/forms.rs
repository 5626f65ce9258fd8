//! Edit forms for sensor and car metadata. A form only yields a record once
//! every field passes its local rule; until then submitting is disabled.

use shared::{
    domain::{DeviceId, SensorId, SensorInfo, SensorType, SewCarInfo, DEFAULT_SENSOR_COLOR},
    error::ValidationError,
};

pub const MIN_SENSOR_ID_LEN: usize = 8;
pub const MIN_SENSOR_NAME_LEN: usize = 3;
pub const MIN_CAR_DEVICE_ID_LEN: usize = 6;
pub const MIN_MOTOR_ID_LEN: usize = 8;

fn require_len(field: &'static str, value: &str, min: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    if value.chars().count() < min {
        return Err(ValidationError::TooShort { field, min });
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct SensorInfoUpdate {
    pub device_id: Option<DeviceId>,
    pub sensor_id: Option<SensorId>,
    pub sensor_type: Option<SensorType>,
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SensorForm {
    sensor: SensorInfo,
}

impl Default for SensorForm {
    fn default() -> Self {
        Self {
            sensor: SensorInfo {
                device_id: DeviceId::default(),
                sensor_id: SensorId::default(),
                sensor_type: SensorType::Switch,
                name: String::new(),
                color: Some(DEFAULT_SENSOR_COLOR.to_string()),
            },
        }
    }
}

impl SensorForm {
    pub fn sensor(&self) -> &SensorInfo {
        &self.sensor
    }

    pub fn update(&mut self, patch: SensorInfoUpdate) {
        if let Some(device_id) = patch.device_id {
            self.sensor.device_id = device_id;
        }
        if let Some(sensor_id) = patch.sensor_id {
            self.sensor.sensor_id = sensor_id;
        }
        if let Some(sensor_type) = patch.sensor_type {
            self.sensor.sensor_type = sensor_type;
        }
        if let Some(name) = patch.name {
            self.sensor.name = name;
        }
        if let Some(color) = patch.color {
            self.sensor.color = Some(color);
        }
    }

    /// Besides the sensorId and name length rules, a blank deviceId fails.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sensor.device_id.is_empty() {
            return Err(ValidationError::MissingField("deviceId"));
        }
        require_len("sensorId", self.sensor.sensor_id.as_str(), MIN_SENSOR_ID_LEN)?;
        require_len("name", &self.sensor.name, MIN_SENSOR_NAME_LEN)
    }

    pub fn is_completed(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn submit(&self) -> Option<SensorInfo> {
        self.is_completed().then(|| self.sensor.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SewCarInfoUpdate {
    pub device_id: Option<DeviceId>,
    pub motor_left: Option<SensorId>,
    pub motor_right: Option<SensorId>,
}

#[derive(Debug, Clone, Default)]
pub struct SewCarForm {
    car: SewCarInfo,
}

impl SewCarForm {
    pub fn car(&self) -> &SewCarInfo {
        &self.car
    }

    pub fn update(&mut self, patch: SewCarInfoUpdate) {
        if let Some(device_id) = patch.device_id {
            self.car.device_id = device_id;
        }
        if let Some(motor_left) = patch.motor_left {
            self.car.motor_left = motor_left;
        }
        if let Some(motor_right) = patch.motor_right {
            self.car.motor_right = motor_right;
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_len("deviceId", self.car.device_id.as_str(), MIN_CAR_DEVICE_ID_LEN)?;
        require_len("motorLeft", self.car.motor_left.as_str(), MIN_MOTOR_ID_LEN)?;
        require_len("motorRight", self.car.motor_right.as_str(), MIN_MOTOR_ID_LEN)
    }

    pub fn is_completed(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn submit(&self) -> Option<SewCarInfo> {
        self.is_completed().then(|| self.car.clone())
    }
}

pub fn add_sensor(sensors: &[SensorInfo], sensor: SensorInfo) -> Vec<SensorInfo> {
    let mut next = sensors.to_vec();
    next.push(sensor);
    next
}

/// Out-of-range indexes leave the list unchanged.
pub fn delete_sensor(sensors: &[SensorInfo], index: usize) -> Vec<SensorInfo> {
    let mut next = sensors.to_vec();
    if index < next.len() {
        next.remove(index);
    }
    next
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
