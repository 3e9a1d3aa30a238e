pub mod config;

pub use config::{HostdirConfig, ServerConfig, StoreConfig, WebConfig};
