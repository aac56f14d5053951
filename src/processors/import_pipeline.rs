use crate::error::{RecordError, Result};
use crate::models::{ObservationRecord, Station};
use crate::readers::{ObservationSource, ObservationStream};
use crate::utils::constants::DEFAULT_LATEST_N;
use crate::utils::progress::ProgressReporter;
use crate::writers::ObservationSink;
use chrono::NaiveDateTime;
use tracing::{debug, error, info};

type StreamFetch<Src> = fn(&mut Src, &Station) -> Result<Option<Vec<ObservationStream>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Every row of the most recent data
    Today,
    /// Every row of the current year
    Recent,
    /// The last `n` rows of the most recent data per station
    MostRecent(usize),
    /// Every row of the full record
    Historical,
}

impl ImportMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            ImportMode::Today | ImportMode::MostRecent(_) => "most recent",
            ImportMode::Recent => "recent",
            ImportMode::Historical => "historical",
        }
    }
}

/// Imports station observations from a source into a sink.
///
/// Stations, their streams and the rows inside each stream are handled
/// strictly in order. A station whose data cannot be fetched, streams with
/// missing headers and rows that fail to parse are logged and skipped. Only
/// sink failures abort the call.
pub struct StationImport<Src, S> {
    source: Src,
    sink: S,
    progress: Option<ProgressReporter>,
}

impl<Src: ObservationSource, S: ObservationSink> StationImport<Src, S> {
    pub fn new(source: Src, sink: S) -> Self {
        Self {
            source,
            sink,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn run(&mut self, mode: ImportMode, stations: &[Station]) -> Result<usize> {
        match mode {
            ImportMode::Today => self.import_today(stations),
            ImportMode::Recent => self.import_recent(stations),
            ImportMode::MostRecent(n) => self.import_most_recent_n(stations, n),
            ImportMode::Historical => self.import_historical(stations),
        }
    }

    /// Import today's data for a list of stations
    pub fn import_today(&mut self, stations: &[Station]) -> Result<usize> {
        let count = self.import_with(stations, Src::most_recent, None)?;
        info!("Imported {} most recent data points", count);
        Ok(count)
    }

    /// Import the current year's data for a list of stations
    pub fn import_recent(&mut self, stations: &[Station]) -> Result<usize> {
        let count = self.import_with(stations, Src::recent, None)?;
        info!("Imported {} recent data points", count);
        Ok(count)
    }

    /// Import the last 3 values per station. New data is published every 30
    /// minutes at 10 minute resolution, so polling this every 30 minutes
    /// covers every observation.
    pub fn import_most_recent(&mut self, stations: &[Station]) -> Result<usize> {
        self.import_most_recent_n(stations, DEFAULT_LATEST_N)
    }

    pub fn import_most_recent_n(&mut self, stations: &[Station], latest_n: usize) -> Result<usize> {
        let count = self.import_with(stations, Src::most_recent, Some(latest_n))?;
        info!("Imported {} most recent data points", count);
        Ok(count)
    }

    /// Import the full record for a list of stations. This is the slowest
    /// mode and keeps no resume state: an interrupted run starts over.
    pub fn import_historical(&mut self, stations: &[Station]) -> Result<usize> {
        let count = self.import_with(stations, Src::historical, None)?;
        info!("Imported {} historical data points", count);
        Ok(count)
    }

    fn import_with(
        &mut self,
        stations: &[Station],
        fetch: StreamFetch<Src>,
        latest_n: Option<usize>,
    ) -> Result<usize> {
        if let Some(p) = &self.progress {
            p.set_message(&format!("Importing {} stations...", stations.len()));
        }

        let mut counter = 0;
        for station in stations {
            counter += self.import_station(station, fetch, latest_n)?;

            if let Some(p) = &self.progress {
                p.increment(1);
            }
        }

        if let Some(p) = &self.progress {
            p.finish_with_message(&format!("Imported {} data points", counter));
        }

        Ok(counter)
    }

    fn import_station(
        &mut self,
        station: &Station,
        fetch: StreamFetch<Src>,
        latest_n: Option<usize>,
    ) -> Result<usize> {
        let streams = match fetch(&mut self.source, station) {
            Ok(Some(streams)) => streams,
            Ok(None) => {
                debug!("No data for station {}", station.station_id);
                return Ok(0);
            }
            Err(e) => {
                error!(
                    "Could not fetch data for station {}: {}. Station will be skipped",
                    station.station_id, e
                );
                return Ok(0);
            }
        };

        match latest_n {
            None => {
                let sink = &mut self.sink;
                let mut counter = 0;
                for mut stream in streams {
                    counter += read_stream(station, &mut stream, |timestamp, point| {
                        forward(&mut *sink, timestamp, &point)
                    })?;
                }
                Ok(counter)
            }
            Some(n) => {
                let mut prepared = Vec::new();
                for mut stream in streams {
                    read_stream(station, &mut stream, |timestamp, point| {
                        prepared.push((timestamp, point));
                        Ok(())
                    })?;
                }

                // Upstream emits rows in order, so the tail is the newest
                let latest = latest_tail(prepared, n);
                for (timestamp, point) in &latest {
                    forward(&mut self.sink, *timestamp, point)?;
                }
                Ok(latest.len())
            }
        }
    }
}

fn forward<S: ObservationSink>(
    sink: &mut S,
    timestamp: NaiveDateTime,
    point: &ObservationRecord,
) -> Result<()> {
    debug!("{}: {:?}", timestamp, point);
    sink.put(timestamp, point)
}

/// Keep the last `n` items, preserving their order
pub fn latest_tail<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    let start = items.len().saturating_sub(n);
    items.split_off(start)
}

/// Parse every row of one stream and hand each observation to `emit`.
/// Returns the number of observations emitted. Only `emit` can fail the call.
fn read_stream<F>(station: &Station, stream: &mut ObservationStream, mut emit: F) -> Result<usize>
where
    F: FnMut(NaiveDateTime, ObservationRecord) -> Result<()>,
{
    let columns = match stream.columns() {
        Ok(columns) => columns,
        Err(e) => {
            error!("{} in {}, stream will be ignored", e, stream.label());
            return Ok(0);
        }
    };

    let mut counter = 0;
    for row in stream.records() {
        let parsed = row
            .map_err(|e| RecordError::Unreadable(e.to_string()))
            .and_then(|row| columns.parse_row(&row));

        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(e @ RecordError::Timestamp { .. }) => {
                error!("{}. Format changed? Ignoring row", e);
                continue;
            }
            Err(e) => {
                error!("Could not parse point from csv: {}. Ignoring row", e);
                continue;
            }
        };

        let point = ObservationRecord::build(
            station,
            parsed.quality_level,
            parsed.pressure,
            parsed.temperature_2m,
            parsed.temperature_5cm,
            parsed.rel_humidity_2m,
            parsed.dew_point_2m,
        );
        emit(parsed.timestamp, point)?;
        counter += 1;
    }

    Ok(counter)
}
