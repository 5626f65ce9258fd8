//! Validated persistence for operator-configured sensor metadata.
//!
//! Malformed stored data never escapes as an error: it is logged and the
//! repositories fall back to their empty sentinels. Only store failures
//! (SQLite I/O) propagate.

use anyhow::{Context, Result};
use shared::domain::{SensorInfo, SewCarInfo};
use tracing::{debug, warn};

use crate::Storage;

pub const SENSOR_INFO_KEY: &str = "sensor-info";
pub const SEWCAR_INFO_KEY: &str = "sewcar-info";

#[derive(Clone)]
pub struct SensorInfoRepository {
    storage: Storage,
}

impl SensorInfoRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub async fn load(&self) -> Result<Vec<SensorInfo>> {
        let Some(raw) = self.storage.get_item(SENSOR_INFO_KEY).await? else {
            return Ok(Vec::new());
        };

        let sensors = match serde_json::from_str::<Vec<SensorInfo>>(&raw) {
            Ok(sensors) => sensors,
            Err(err) => {
                warn!(key = SENSOR_INFO_KEY, error = %err, "error parsing stored sensors");
                return Ok(Vec::new());
            }
        };

        Ok(sensors
            .into_iter()
            .filter(|sensor| match sensor.validate() {
                Ok(()) => true,
                Err(err) => {
                    warn!(sensor_id = %sensor.sensor_id, error = %err, "skipping invalid stored sensor");
                    false
                }
            })
            .collect())
    }

    /// Replaces the stored list. Returns `false` without writing when the list
    /// is empty or any record is invalid.
    pub async fn save(&self, sensors: &[SensorInfo]) -> Result<bool> {
        if sensors.is_empty() {
            debug!("refusing to save an empty sensor list");
            return Ok(false);
        }
        if let Some(err) = sensors.iter().find_map(|sensor| sensor.validate().err()) {
            debug!(error = %err, "refusing to save invalid sensor list");
            return Ok(false);
        }

        let raw = serde_json::to_string(sensors).context("failed to encode sensor list")?;
        self.storage.set_item(SENSOR_INFO_KEY, &raw).await?;
        Ok(true)
    }

    pub async fn clear(&self) -> Result<()> {
        self.storage.remove_item(SENSOR_INFO_KEY).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct SewCarInfoRepository {
    storage: Storage,
}

impl SewCarInfoRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub async fn load(&self) -> Result<Option<SewCarInfo>> {
        let Some(raw) = self.storage.get_item(SEWCAR_INFO_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<SewCarInfo>(&raw) {
            Ok(car) => match car.validate() {
                Ok(()) => Ok(Some(car)),
                Err(err) => {
                    warn!(key = SEWCAR_INFO_KEY, error = %err, "ignoring invalid stored car");
                    Ok(None)
                }
            },
            Err(err) => {
                warn!(key = SEWCAR_INFO_KEY, error = %err, "error parsing stored car");
                Ok(None)
            }
        }
    }

    pub async fn save(&self, car: &SewCarInfo) -> Result<bool> {
        if let Err(err) = car.validate() {
            debug!(error = %err, "refusing to save invalid car");
            return Ok(false);
        }

        let raw = serde_json::to_string(car).context("failed to encode car")?;
        self.storage.set_item(SEWCAR_INFO_KEY, &raw).await?;
        Ok(true)
    }
}
