pub mod archive_source;
pub mod observation_reader;
pub mod station_reader;

pub use archive_source::{ArchiveSource, ObservationSource};
pub use observation_reader::{ColumnIndex, ObservationStream, ParsedRow};
pub use station_reader::StationReader;
