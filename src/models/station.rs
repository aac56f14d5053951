use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Station {
    #[validate(length(min = 1))]
    pub station_id: String,

    pub date_from: NaiveDate,

    pub date_to: NaiveDate,

    /// Meters above sea level
    pub height: i32,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub long: f64,

    #[validate(length(min = 1))]
    pub name: String,

    pub state: String,
}

impl Station {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        station_id: String,
        date_from: NaiveDate,
        date_to: NaiveDate,
        height: i32,
        lat: f64,
        long: f64,
        name: String,
        state: String,
    ) -> Self {
        Self {
            station_id,
            date_from,
            date_to,
            height,
            lat,
            long,
            name,
            state,
        }
    }
}

impl std::fmt::Display for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} ({}) {:.4}/{:.4} {}m {}..{}",
            self.station_id,
            self.name,
            self.state,
            self.lat,
            self.long,
            self.height,
            self.date_from.format("%Y-%m-%d"),
            self.date_to.format("%Y-%m-%d"),
        )
    }
}
