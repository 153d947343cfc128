pub mod api;
pub mod config;
pub mod device;
pub mod error;
pub mod models;

pub use api::{FaceApp, FaceAppClient};
pub use config::{Config, ConfigError};
pub use device::{generate_device_id, DeviceIdGenerator, RandomDeviceId};
pub use error::FaceAppError;
pub use models::*;
