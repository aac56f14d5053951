use crate::error::DirectoryError;
use crate::models::Station;
use crate::processors::GeoFilter;
use crate::utils::constants::{STATION_FIELD_COUNT, STATION_HEADER_LINES};
use chrono::NaiveDate;
use std::borrow::Cow;
use std::path::Path;
use tracing::{error, info};
use validator::Validate;

type DirectoryResult<T> = std::result::Result<T, DirectoryError>;

pub struct StationReader;

impl StationReader {
    pub fn new() -> Self {
        Self
    }

    /// Read the station directory from a local copy of the upstream text
    pub fn read_stations(&self, path: &Path) -> DirectoryResult<Vec<Station>> {
        let bytes = std::fs::read(path).map_err(|source| DirectoryError::Fetch {
            path: path.to_path_buf(),
            source,
        })?;

        self.parse(&decode_text(&bytes))
    }

    /// Parse the whole directory. Any bad row fails the entire parse.
    pub fn parse(&self, raw: &str) -> DirectoryResult<Vec<Station>> {
        let mut stations = Vec::new();

        for (index, line) in raw.lines().enumerate().skip(STATION_HEADER_LINES) {
            if line.trim().is_empty() {
                continue;
            }

            let station = parse_station_line(line).map_err(|message| {
                error!("Could not parse station list: {}", message);
                DirectoryError::Parse {
                    line: index + 1,
                    message,
                }
            })?;
            stations.push(station);
        }

        if stations.is_empty() {
            return Err(DirectoryError::Empty);
        }

        info!("Parsed {} stations", stations.len());
        Ok(stations)
    }

    /// Read the directory and keep the stations selected by `filter`
    pub fn stations_in_bboxes(
        &self,
        path: &Path,
        filter: &GeoFilter,
    ) -> DirectoryResult<Vec<Station>> {
        let stations = self.read_stations(path)?;
        Ok(filter.select(stations))
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Upstream publishes the directory as Latin-1
fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text
        }
    }
}

/// Split a row into its fixed fields. The name is the only field that may
/// contain spaces: six fixed tokens sit left of it and the state right of it.
fn split_fields(line: &str) -> Result<[String; STATION_FIELD_COUNT], String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < STATION_FIELD_COUNT {
        return Err(format!(
            "expected at least {} fields, got {} in '{}'",
            STATION_FIELD_COUNT,
            tokens.len(),
            line.trim()
        ));
    }

    let name_start = STATION_FIELD_COUNT - 2;
    let (state, rest) = tokens
        .split_last()
        .ok_or_else(|| format!("empty row '{}'", line))?;
    let (fixed, name) = rest.split_at(name_start);

    Ok([
        fixed[0].to_string(),
        fixed[1].to_string(),
        fixed[2].to_string(),
        fixed[3].to_string(),
        fixed[4].to_string(),
        fixed[5].to_string(),
        name.join(" "),
        state.to_string(),
    ])
}

fn parse_station_line(line: &str) -> Result<Station, String> {
    let [station_id, date_from, date_to, height, lat, long, name, state] = split_fields(line)?;

    let date_from = parse_compact_date(&date_from)?;
    let date_to = parse_compact_date(&date_to)?;
    if date_from > date_to {
        return Err(format!(
            "station {} starts {} after it ends {}",
            station_id, date_from, date_to
        ));
    }

    let height = height
        .parse::<i32>()
        .map_err(|_| format!("invalid height '{}'", height))?;
    let lat = lat
        .parse::<f64>()
        .map_err(|_| format!("invalid latitude '{}'", lat))?;
    let long = long
        .parse::<f64>()
        .map_err(|_| format!("invalid longitude '{}'", long))?;

    let station = Station::new(station_id, date_from, date_to, height, lat, long, name, state);
    station
        .validate()
        .map_err(|e| format!("station {}: {}", station.station_id, e))?;

    Ok(station)
}

/// Decode a YYYYMMDD field by fixed offsets
fn parse_compact_date(value: &str) -> Result<NaiveDate, String> {
    let invalid = || format!("invalid date '{}'", value);

    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let year = value[0..4].parse::<i32>().map_err(|_| invalid())?;
    let month = value[4..6].parse::<u32>().map_err(|_| invalid())?;
    let day = value[6..8].parse::<u32>().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Stations_id von_datum bis_datum Stationshoehe geoBreite geoLaenge Stationsname Bundesland\n\
        ----------- --------- --------- ------------- --------- --------- ----------------------------------------- ----------\n";

    #[test]
    fn test_parse_station_line() {
        let line = "00003 19500101 20110331            202     50.7827    6.0941 Aachen                                   Nordrhein-Westfalen";
        let station = parse_station_line(line).unwrap();

        assert_eq!(station.station_id, "00003");
        assert_eq!(station.date_from, NaiveDate::from_ymd_opt(1950, 1, 1).unwrap());
        assert_eq!(station.date_to, NaiveDate::from_ymd_opt(2011, 3, 31).unwrap());
        assert_eq!(station.height, 202);
        assert_eq!(station.lat, 50.7827);
        assert_eq!(station.long, 6.0941);
        assert_eq!(station.name, "Aachen");
        assert_eq!(station.state, "Nordrhein-Westfalen");
    }

    #[test]
    fn test_multi_word_name_is_merged() {
        let line = "003 19500101 20110331 202 50.7827 6.0941 Aachen Orsbach NW";
        let station = parse_station_line(line).unwrap();
        assert_eq!(station.name, "Aachen Orsbach");
        assert_eq!(station.state, "NW");

        let line = "01048 19910101 20240101  112  51.1278  13.7543  Dresden-Klotzsche   am  Flughafen  Sachsen";
        let station = parse_station_line(line).unwrap();
        assert_eq!(station.name, "Dresden-Klotzsche am Flughafen");
        assert_eq!(station.state, "Sachsen");
    }

    #[test]
    fn test_parse_preserves_row_order() {
        let text = format!(
            "{}00003 19500101 20110331 202 50.7827 6.0941 Aachen Nordrhein-Westfalen\n\
             00044 20070209 20240101  44 52.9336 8.2370 Großenkneten Niedersachsen\n\
             00071 20091201 20191231 759 48.2156 8.9784 Albstadt-Badkap Baden-Württemberg\n\n",
            HEADER
        );

        let stations = StationReader::new().parse(&text).unwrap();
        let ids: Vec<&str> = stations.iter().map(|s| s.station_id.as_str()).collect();

        assert_eq!(ids, vec!["00003", "00044", "00071"]);
        assert_eq!(stations[1].name, "Großenkneten");
    }

    #[test]
    fn test_bad_row_fails_whole_parse() {
        let text = format!(
            "{}00003 19500101 20110331 202 50.7827 6.0941 Aachen Nordrhein-Westfalen\n\
             00044 20070209 20240101 high 52.9336 8.2370 Großenkneten Niedersachsen\n",
            HEADER
        );

        match StationReader::new().parse(&text) {
            Err(DirectoryError::Parse { line, .. }) => assert_eq!(line, 4),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_dates_fail_parse() {
        assert!(parse_station_line("1 1950010 20110331 202 50.7 6.0 A NW").is_err());
        assert!(parse_station_line("1 19501301 20110331 202 50.7 6.0 A NW").is_err());
        assert!(parse_station_line("1 2011033a 20110331 202 50.7 6.0 A NW").is_err());
        assert!(parse_station_line("1 20120101 20110331 202 50.7 6.0 A NW").is_err());
    }

    #[test]
    fn test_short_row_fails_parse() {
        assert!(parse_station_line("00003 19500101 20110331 202 50.7827 6.0941 Aachen").is_err());
    }

    #[test]
    fn test_out_of_range_coordinate_fails_parse() {
        assert!(parse_station_line("1 19500101 20110331 202 95.0 6.0 A NW").is_err());
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(matches!(
            StationReader::new().parse(HEADER),
            Err(DirectoryError::Empty)
        ));
    }

    #[test]
    fn test_read_missing_file_is_fetch_error() {
        let result = StationReader::new().read_stations(Path::new("/nonexistent/stations.txt"));
        assert!(matches!(result, Err(DirectoryError::Fetch { .. })));
    }

    #[test]
    fn test_read_latin1_file() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(HEADER.as_bytes())?;
        // "Großenkneten" with ß encoded as Latin-1 0xDF
        temp_file.write_all(b"00044 20070209 20240101 44 52.9336 8.2370 Gro\xdfenkneten Niedersachsen\n")?;

        let stations = StationReader::new().read_stations(temp_file.path())?;

        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].name, "Großenkneten");
        Ok(())
    }

    #[test]
    fn test_stations_in_bboxes() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut temp_file = NamedTempFile::new()?;
        write!(
            temp_file,
            "{}00003 19500101 20110331 202 50.7827 6.0941 Aachen Nordrhein-Westfalen\n\
             00044 20070209 20240101 44 52.9336 8.2370 Großenkneten Niedersachsen\n",
            HEADER
        )?;

        let filter = GeoFilter::new(Some(vec![BoundingBox::new(50.0, 6.0, 51.0, 7.0)?]));
        let stations = StationReader::new().stations_in_bboxes(temp_file.path(), &filter)?;

        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].station_id, "00003");
        Ok(())
    }
}
