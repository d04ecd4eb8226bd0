pub mod admission;
pub mod checks;
pub mod config;
pub mod engine;
pub mod formulas;
mod types;

pub use config::{DerivationConfig, MeasurementLimits, Precision, Range};
pub use engine::{derive, derive_with, lap_times};
pub use types::{DerivationResult, LapTime, LapVelocity};
