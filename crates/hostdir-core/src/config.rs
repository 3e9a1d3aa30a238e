//! hostdir.toml configuration parser.
//!
//! Every section and key is optional:
//!
//! ```toml
//! [server]
//! listen = "0.0.0.0:38080"
//!
//! [store]
//! file = "csv.db"
//! atomic_writes = false
//!
//! [web]
//! root = "/srv/hostdir"
//! upload_prefix = "temp-"
//! max_upload_bytes = 33554432
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostdirConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub web: WebConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 38080)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Record file. Relative paths are taken from the web root.
    pub file: PathBuf,
    /// Replace the record file via temp file + rename on every save.
    pub atomic_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("csv.db"),
            atomic_writes: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Directory holding static assets and uploads. Defaults to the
    /// directory of the running executable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    pub upload_prefix: String,
    pub max_upload_bytes: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            root: None,
            upload_prefix: "temp-".to_string(),
            max_upload_bytes: 32 * 1024 * 1024,
        }
    }
}

impl WebConfig {
    /// The configured root, else the executable's directory, else `.`.
    pub fn resolved_root(&self) -> PathBuf {
        if let Some(root) = &self.root {
            return root.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl HostdirConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Record file location, with relative paths joined onto the web root.
    pub fn store_path(&self) -> PathBuf {
        if self.store.file.is_absolute() {
            self.store.file.clone()
        } else {
            self.web.resolved_root().join(&self.store.file)
        }
    }
}
