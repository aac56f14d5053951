use crate::error::RecordError;
use crate::utils::constants::{
    DEFAULT_DELIMITER, MESS_DATUM, PP_10, QN, RF_10, TD_10, TIMESTAMP_FORMAT, TM5_10, TT_10,
};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;

/// A tabular chunk of observations for one station, addressed by header name
pub struct ObservationStream {
    label: String,
    reader: csv::Reader<Box<dyn Read>>,
}

/// Values of one row after conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub timestamp: NaiveDateTime,
    pub quality_level: i32,
    pub pressure: f64,
    pub temperature_2m: f64,
    pub temperature_5cm: f64,
    pub rel_humidity_2m: f64,
    pub dew_point_2m: f64,
}

/// Positions of the required columns within a stream
#[derive(Debug, Clone, Copy)]
pub struct ColumnIndex {
    qn: usize,
    mess_datum: usize,
    pp_10: usize,
    tt_10: usize,
    tm5_10: usize,
    rf_10: usize,
    td_10: usize,
}

impl ObservationStream {
    pub fn from_reader<R: Read + 'static>(label: impl Into<String>, reader: R) -> Self {
        Self::with_delimiter(label, reader, DEFAULT_DELIMITER)
    }

    pub fn with_delimiter<R: Read + 'static>(
        label: impl Into<String>,
        reader: R,
        delimiter: u8,
    ) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(Box::new(reader) as Box<dyn Read>);

        Self {
            label: label.into(),
            reader,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Resolve all required columns, or name the first one missing
    pub fn columns(&mut self) -> Result<ColumnIndex, RecordError> {
        let headers = self
            .reader
            .headers()
            .map_err(|e| RecordError::Unreadable(e.to_string()))?;
        ColumnIndex::resolve(headers)
    }

    /// Raw rows in upstream order
    pub fn records(&mut self) -> csv::StringRecordsIter<'_, Box<dyn Read>> {
        self.reader.records()
    }
}

impl std::fmt::Debug for ObservationStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservationStream")
            .field("label", &self.label)
            .finish()
    }
}

impl ColumnIndex {
    pub fn resolve(headers: &StringRecord) -> Result<Self, RecordError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(RecordError::MissingHeader(name))
        };

        Ok(Self {
            qn: find(QN)?,
            mess_datum: find(MESS_DATUM)?,
            pp_10: find(PP_10)?,
            tt_10: find(TT_10)?,
            tm5_10: find(TM5_10)?,
            rf_10: find(RF_10)?,
            td_10: find(TD_10)?,
        })
    }

    /// Convert one row. The timestamp is checked before any measurement.
    pub fn parse_row(&self, row: &StringRecord) -> Result<ParsedRow, RecordError> {
        let raw_timestamp = row.get(self.mess_datum).unwrap_or_default();
        let timestamp = NaiveDateTime::parse_from_str(raw_timestamp, TIMESTAMP_FORMAT).map_err(
            |_| RecordError::Timestamp {
                value: raw_timestamp.to_string(),
            },
        )?;

        let quality_level = {
            let value = row.get(self.qn).unwrap_or_default();
            value.parse::<i32>().map_err(|_| RecordError::Field {
                field: QN,
                value: value.to_string(),
            })?
        };

        Ok(ParsedRow {
            timestamp,
            quality_level,
            pressure: parse_float(row, self.pp_10, PP_10)?,
            temperature_2m: parse_float(row, self.tt_10, TT_10)?,
            temperature_5cm: parse_float(row, self.tm5_10, TM5_10)?,
            rel_humidity_2m: parse_float(row, self.rf_10, RF_10)?,
            dew_point_2m: parse_float(row, self.td_10, TD_10)?,
        })
    }
}

fn parse_float(
    row: &StringRecord,
    index: usize,
    field: &'static str,
) -> Result<f64, RecordError> {
    let value = row.get(index).unwrap_or_default();
    value.parse::<f64>().map_err(|_| RecordError::Field {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    const CSV: &str = "STATIONS_ID;MESS_DATUM;  QN;PP_10;TT_10;TM5_10;RF_10;TD_10;eor\n\
        3;202301010000;    3;  1013.2;  12.5;  11.0;  87.0;  10.4;eor\n\
        3;202301010010;    3;  1013.1;  12.4;  10.9;  88.0;  10.5;eor\n";

    fn stream(text: &str) -> ObservationStream {
        ObservationStream::from_reader("test", Cursor::new(text.to_string().into_bytes()))
    }

    #[test]
    fn test_parse_row() {
        let mut stream = stream(CSV);
        let columns = stream.columns().unwrap();
        let row = stream.records().next().unwrap().unwrap();

        let parsed = columns.parse_row(&row).unwrap();
        assert_eq!(
            parsed,
            ParsedRow {
                timestamp: NaiveDateTime::parse_from_str("202301010000", TIMESTAMP_FORMAT).unwrap(),
                quality_level: 3,
                pressure: 1013.2,
                temperature_2m: 12.5,
                temperature_5cm: 11.0,
                rel_humidity_2m: 87.0,
                dew_point_2m: 10.4,
            }
        );
    }

    #[test]
    fn test_missing_header() {
        let mut stream = stream("MESS_DATUM;QN;PP_10;TM5_10;RF_10;TD_10\n");
        assert_eq!(
            stream.columns().unwrap_err(),
            RecordError::MissingHeader(TT_10)
        );
    }

    #[test]
    fn test_bad_timestamp_and_field() {
        let mut stream = stream(
            "MESS_DATUM;QN;PP_10;TT_10;TM5_10;RF_10;TD_10\n\
             2023-01-01;3;1;2;3;4;5\n\
             202301010000;x;1;2;3;4;5\n\
             202301010000;3;1;2;;4;5\n",
        );
        let columns = stream.columns().unwrap();
        let rows: Vec<StringRecord> = stream.records().map(|r| r.unwrap()).collect();

        assert!(matches!(
            columns.parse_row(&rows[0]),
            Err(RecordError::Timestamp { .. })
        ));
        assert_eq!(
            columns.parse_row(&rows[1]).unwrap_err(),
            RecordError::Field {
                field: QN,
                value: "x".to_string()
            }
        );
        assert!(matches!(
            columns.parse_row(&rows[2]),
            Err(RecordError::Field { field: TM5_10, .. })
        ));
    }
}
