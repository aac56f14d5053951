/// Header and separator line preceding the station rows
pub const STATION_HEADER_LINES: usize = 2;

/// id, date_from, date_to, height, lat, long, name, state
pub const STATION_FIELD_COUNT: usize = 8;

/// Observation column names
pub const QN: &str = "QN";
pub const MESS_DATUM: &str = "MESS_DATUM";
pub const PP_10: &str = "PP_10";
pub const TT_10: &str = "TT_10";
pub const TM5_10: &str = "TM5_10";
pub const RF_10: &str = "RF_10";
pub const TD_10: &str = "TD_10";

/// Observation timestamps, minute resolution
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

/// Product files are semicolon separated
pub const DEFAULT_DELIMITER: u8 = b';';

/// Rows kept per station when polling for the most recent data
pub const DEFAULT_LATEST_N: usize = 3;

/// Units attached to every observation
pub const PRESSURE_UNIT: &str = "hpa";
pub const TEMPERATURE_UNIT: &str = "°C";
pub const HUMIDITY_UNIT: &str = "%";

/// Archive layout of a local mirror
pub const NOW_DIR: &str = "now";
pub const RECENT_DIR: &str = "recent";
pub const HISTORICAL_DIR: &str = "historical";
pub const ARCHIVE_PREFIX: &str = "10minutenwerte_TU_";
pub const PRODUCT_PREFIX: &str = "produkt";

/// Configuration keys
pub const BBOXES_KEY: &str = "bboxes";
