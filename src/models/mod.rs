pub mod bbox;
pub mod observation;
pub mod station;

pub use bbox::BoundingBox;
pub use observation::{ObservationMeta, ObservationRecord};
pub use station::Station;
