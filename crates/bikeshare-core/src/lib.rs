pub mod app_config;
pub mod config;
pub mod geo;
pub mod station;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{GeoPoint, InvalidCoordinates, EARTH_RADIUS_MILES};
pub use station::{StationCounts, StationRecord, StationType};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
