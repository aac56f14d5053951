use crate::models::{BoundingBox, Station};
use serde_json::Value;
use tracing::warn;

/// Selects stations lying inside any of a set of bounding boxes.
/// `None` means no geographic filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoFilter {
    boxes: Option<Vec<BoundingBox>>,
}

impl GeoFilter {
    pub fn new(boxes: Option<Vec<BoundingBox>>) -> Self {
        Self { boxes }
    }

    pub fn unfiltered() -> Self {
        Self { boxes: None }
    }

    /// Build from a raw BBOXES value. Anything that is not a list of numeric
    /// quadruples is reported and treated as "no filter".
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(value) = value else {
            return Self::unfiltered();
        };

        // Environment variables carry the list as a JSON string
        let parsed = match value {
            Value::String(text) => serde_json::from_str::<Vec<BoundingBox>>(text),
            Value::Null => return Self::unfiltered(),
            other => serde_json::from_value::<Vec<BoundingBox>>(other.clone()),
        };

        match parsed {
            Ok(boxes) => Self::new(Some(boxes)),
            Err(e) => {
                warn!("Invalid config for BBOXES will not be used: {}", e);
                Self::unfiltered()
            }
        }
    }

    pub fn boxes(&self) -> Option<&[BoundingBox]> {
        self.boxes.as_deref()
    }

    pub fn is_filtering(&self) -> bool {
        self.boxes.is_some()
    }

    pub fn contains(&self, lat: f64, long: f64) -> bool {
        match &self.boxes {
            None => true,
            Some(boxes) => boxes.iter().any(|bbox| bbox.contains(lat, long)),
        }
    }

    /// Keep the selected stations, preserving input order
    pub fn select(&self, stations: Vec<Station>) -> Vec<Station> {
        stations
            .into_iter()
            .filter(|station| self.contains(station.lat, station.long))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// Collects formatted log output for assertions
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture_logs<F: FnOnce()>(f: F) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, f);
        logs.contents()
    }

    fn station_at(id: &str, lat: f64, long: f64) -> Station {
        Station::new(
            id.to_string(),
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            100,
            lat,
            long,
            format!("Station {}", id),
            "NW".to_string(),
        )
    }

    fn ids(stations: &[Station]) -> Vec<&str> {
        stations.iter().map(|s| s.station_id.as_str()).collect()
    }

    #[test]
    fn test_unfiltered_selects_all_in_order() {
        let stations = vec![
            station_at("3", 10.0, 10.0),
            station_at("1", 52.0, 6.5),
            station_at("2", -40.0, 170.0),
        ];

        let selected = GeoFilter::unfiltered().select(stations.clone());
        assert_eq!(selected, stations);
    }

    #[test]
    fn test_single_box() {
        let filter = GeoFilter::new(Some(vec![BoundingBox::new(50.0, 6.0, 51.0, 7.0).unwrap()]));
        let stations = vec![station_at("out", 52.0, 6.5), station_at("in", 50.5, 6.5)];

        assert_eq!(ids(&filter.select(stations)), vec!["in"]);
    }

    #[test]
    fn test_boxes_are_ored() {
        let filter = GeoFilter::new(Some(vec![
            BoundingBox::new(50.0, 6.0, 51.0, 7.0).unwrap(),
            BoundingBox::new(53.0, 9.0, 54.0, 10.0).unwrap(),
        ]));
        let stations = vec![
            station_at("a", 53.5, 9.5),
            station_at("b", 52.0, 8.0),
            station_at("c", 50.5, 6.5),
        ];

        assert_eq!(ids(&filter.select(stations)), vec!["a", "c"]);
    }

    #[test]
    fn test_empty_box_list_selects_nothing() {
        let filter = GeoFilter::new(Some(Vec::new()));
        assert!(filter.select(vec![station_at("a", 50.5, 6.5)]).is_empty());
    }

    #[test]
    fn test_from_value() {
        let filter = GeoFilter::from_value(Some(&json!([[50.0, 6.0, 51.0, 7.0]])));
        assert_eq!(filter.boxes().map(|b| b.len()), Some(1));

        let filter = GeoFilter::from_value(Some(&json!("[[50.0, 6.0, 51.0, 7.0], [1, 2, 3, 4]]")));
        assert_eq!(filter.boxes().map(|b| b.len()), Some(2));

        assert!(!GeoFilter::from_value(None).is_filtering());
        assert!(!GeoFilter::from_value(Some(&Value::Null)).is_filtering());
    }

    #[test]
    fn test_malformed_value_falls_back_to_unfiltered() {
        for raw in [
            json!(42),
            json!({"lat": 50.0}),
            json!([50.0, 6.0, 51.0, 7.0]),
            json!([[50.0, 6.0, 51.0]]),
            json!([["50", 6.0, 51.0, 7.0]]),
            json!([[51.0, 6.0, 50.0, 7.0]]),
            json!("not json"),
        ] {
            let filter = GeoFilter::from_value(Some(&raw));
            assert!(!filter.is_filtering(), "{} should not filter", raw);
        }
    }

    #[test]
    fn test_malformed_value_is_reported() {
        let logs = capture_logs(|| {
            GeoFilter::from_value(Some(&json!([[51.0, 6.0, 50.0, 7.0]])));
        });

        assert!(logs.contains("WARN"), "{}", logs);
        assert!(logs.contains("Invalid config for BBOXES will not be used"));
    }

    #[test]
    fn test_valid_value_is_not_reported() {
        let logs = capture_logs(|| {
            GeoFilter::from_value(Some(&json!([[50.0, 6.0, 51.0, 7.0]])));
        });

        assert!(!logs.contains("WARN"), "{}", logs);
    }
}
