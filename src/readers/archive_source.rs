use crate::error::Result;
use crate::models::Station;
use crate::readers::ObservationStream;
use crate::utils::constants::{
    ARCHIVE_PREFIX, HISTORICAL_DIR, NOW_DIR, PRODUCT_PREFIX, RECENT_DIR,
};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use zip::ZipArchive;

/// Per-mode supplier of observation streams for a station.
/// `Ok(None)` means the station has no data for that mode.
pub trait ObservationSource {
    /// Data of the last day, refreshed every 30 minutes upstream
    fn most_recent(&mut self, station: &Station) -> Result<Option<Vec<ObservationStream>>>;

    /// Data of the current year
    fn recent(&mut self, station: &Station) -> Result<Option<Vec<ObservationStream>>>;

    /// Full record, usually split across several archives
    fn historical(&mut self, station: &Station) -> Result<Option<Vec<ObservationStream>>>;
}

/// Reads zipped product files from a local mirror of the upstream
/// `10_minutes/air_temperature` tree (`now/`, `recent/`, `historical/`).
pub struct ArchiveSource {
    root: PathBuf,
}

impl ArchiveSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Archives in `dir` for this station whose name ends in `suffix`,
    /// sorted by file name so historical chunks come out oldest first
    fn find_archives(&self, dir: &str, station: &Station, suffix: &str) -> Result<Vec<PathBuf>> {
        let dir = self.root.join(dir);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let prefix = format!("{}{}_", ARCHIVE_PREFIX, station.station_id);
        let mut archives = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            let matches = path
                .file_name()
                .and_then(|f| f.to_str())
                .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(suffix));
            if matches {
                archives.push(path);
            }
        }

        archives.sort();
        Ok(archives)
    }

    /// Broken archives are logged and skipped so the remaining chunks still
    /// reach the pipeline. `None` when no archive could be read.
    fn streams_from(&self, archives: Vec<PathBuf>) -> Option<Vec<ObservationStream>> {
        let mut streams = Vec::new();
        let mut readable = 0;
        for archive in &archives {
            match read_product_files(archive) {
                Ok(found) => {
                    streams.extend(found);
                    readable += 1;
                }
                Err(e) => error!(
                    "Could not read {}: {}. Archive will be ignored",
                    archive.display(),
                    e
                ),
            }
        }

        (readable > 0).then_some(streams)
    }

    fn load(
        &self,
        dir: &str,
        station: &Station,
        suffix: &str,
    ) -> Result<Option<Vec<ObservationStream>>> {
        let archives = self.find_archives(dir, station, suffix)?;
        debug!(
            "Found {} {} archives for station {}",
            archives.len(),
            dir,
            station.station_id
        );
        Ok(self.streams_from(archives))
    }
}

impl ObservationSource for ArchiveSource {
    fn most_recent(&mut self, station: &Station) -> Result<Option<Vec<ObservationStream>>> {
        self.load(NOW_DIR, station, "_now.zip")
    }

    fn recent(&mut self, station: &Station) -> Result<Option<Vec<ObservationStream>>> {
        self.load(RECENT_DIR, station, "_akt.zip")
    }

    fn historical(&mut self, station: &Station) -> Result<Option<Vec<ObservationStream>>> {
        self.load(HISTORICAL_DIR, station, "_hist.zip")
    }
}

/// Every `produkt*` member of the archive becomes one stream
fn read_product_files(zip_path: &Path) -> Result<Vec<ObservationStream>> {
    let file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(file)?;
    let mut streams = Vec::new();

    for i in 0..archive.len() {
        let mut zip_file = archive.by_index(i)?;
        let file_name = zip_file.name().to_string();
        if !file_name.starts_with(PRODUCT_PREFIX) {
            continue;
        }

        let mut content = Vec::new();
        zip_file.read_to_end(&mut content)?;
        streams.push(ObservationStream::from_reader(
            format!("{}:{}", zip_path.display(), file_name),
            Cursor::new(content),
        ));
    }

    Ok(streams)
}
