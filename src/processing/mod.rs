// src/processing/mod.rs
pub mod anomaly;
pub mod composite;
pub mod indices;
pub mod mask;
pub mod parallel;
pub mod series;
pub mod stats;

// Re-export main components
pub use anomaly::{detect_anomaly, AnomalyMask};
pub use composite::{composite, AnnualComposite};
pub use indices::{evaluate_index, IndexRaster, SensorCalibration, SpectralIndex};
pub use mask::{build_mask, EmptyCause, Mask, MaskConfig, MaskStrength};
pub use parallel::{CancelToken, YearPool};
pub use series::{build_series, SeriesPoint, SeriesRow, TimeSeries};
pub use stats::{summarize, StatsRecord, Summary};
