pub mod geo_filter;
pub mod import_pipeline;

pub use geo_filter::GeoFilter;
pub use import_pipeline::{latest_tail, ImportMode, StationImport};
