//! Table discovery inside a raw sheet grid.
pub mod header;
pub mod region;

pub use header::{HeaderLayout, YearColumn};
pub use region::{DetectorConfig, RegionRow, TableRegion};
