pub mod config;
pub mod db;
pub mod error;
pub mod telemetry;

pub use config::StoreConfig;
pub use db::Store;
pub use error::StoreError;
