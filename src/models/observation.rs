use serde::{Deserialize, Serialize};

use crate::models::Station;
use crate::utils::constants::{HUMIDITY_UNIT, PRESSURE_UNIT, TEMPERATURE_UNIT};

/// One 10-minute observation, shaped for the downstream sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub pressure: f64,
    pub temperature_2m: f64,
    pub temperature_5cm: f64,
    pub rel_humidity_2m: f64,
    pub dew_point_2m: f64,
    pub meta: ObservationMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationMeta {
    /// DWD quality level (QN) of the measurement
    pub quality_level: i32,
    pub name: String,
    pub id: String,
    pub lat: f64,
    pub long: f64,
    pub pressure_unit: String,
    pub temperature_2m_unit: String,
    pub temperature_5cm_unit: String,
    pub rel_humidity_2m_unit: String,
    pub dew_point_2m_unit: String,
}

impl ObservationRecord {
    /// Shape already-parsed values into a record and attach station identity
    /// and units. Does not validate anything.
    pub fn build(
        station: &Station,
        quality_level: i32,
        pressure: f64,
        temperature_2m: f64,
        temperature_5cm: f64,
        rel_humidity_2m: f64,
        dew_point_2m: f64,
    ) -> Self {
        Self {
            pressure,
            temperature_2m,
            temperature_5cm,
            rel_humidity_2m,
            dew_point_2m,
            meta: ObservationMeta {
                quality_level,
                name: station.name.clone(),
                id: station.station_id.clone(),
                lat: station.lat,
                long: station.long,
                pressure_unit: PRESSURE_UNIT.to_string(),
                temperature_2m_unit: TEMPERATURE_UNIT.to_string(),
                temperature_5cm_unit: TEMPERATURE_UNIT.to_string(),
                rel_humidity_2m_unit: HUMIDITY_UNIT.to_string(),
                dew_point_2m_unit: TEMPERATURE_UNIT.to_string(),
            },
        }
    }
}
