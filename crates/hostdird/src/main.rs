//! hostdird — the hostdir daemon.
//!
//! Opens the record store and serves the alias API, clipboard, upload
//! endpoint and static files from one HTTP listener.
//!
//! # Usage
//!
//! ```text
//! hostdird serve --config /etc/hostdir.toml --listen 0.0.0.0:38080
//! hostdird check-config --config /etc/hostdir.toml
//! ```

mod server;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use hostdir_core::HostdirConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,hostdird=debug,hostdir_store=debug,hostdir_api=debug";

#[derive(Parser)]
#[command(name = "hostdird", about = "hostdir alias directory daemon")]
struct Cli {
    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Open the record store and serve HTTP.
    Serve(ConfigArgs),
    /// Print the resolved configuration and exit.
    CheckConfig(ConfigArgs),
}

#[derive(Args, Default)]
struct ConfigArgs {
    /// Path to hostdir.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Record file (relative paths resolve against the web root).
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Directory for static files and uploads.
    #[arg(long)]
    web_root: Option<PathBuf>,

    /// Replace the record file via temp file + rename on every save.
    #[arg(long)]
    atomic_writes: bool,
}

impl ConfigArgs {
    /// Defaults, then the config file, then command-line flags.
    fn resolve(&self) -> anyhow::Result<HostdirConfig> {
        let mut config = match &self.config {
            Some(path) => HostdirConfig::from_file(path)?,
            None => HostdirConfig::default(),
        };
        if let Some(listen) = self.listen {
            config.server.listen = listen;
        }
        if let Some(file) = &self.data_file {
            config.store.file = file.clone();
        }
        if let Some(root) = &self.web_root {
            config.web.root = Some(root.clone());
        }
        if self.atomic_writes {
            config.store.atomic_writes = true;
        }
        Ok(config)
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Serve(args) => server::run(args.resolve()?).await,
        Command::CheckConfig(args) => {
            let mut config = args.resolve()?;
            config.web.root = Some(config.web.resolved_root());
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_serve_flags() {
        let cli = Cli::try_parse_from([
            "hostdird",
            "serve",
            "--listen",
            "127.0.0.1:9000",
            "--data-file",
            "hosts.csv",
            "--atomic-writes",
        ])
        .unwrap();

        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.server.listen.port(), 9000);
        assert_eq!(config.store.file, PathBuf::from("hosts.csv"));
        assert!(config.store.atomic_writes);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hostdir.toml");
        std::fs::write(
            &path,
            "[server]\nlisten = \"127.0.0.1:7000\"\n\n[store]\nfile = \"from-file.csv\"\n",
        )
        .unwrap();

        let args = ConfigArgs {
            config: Some(path),
            data_file: Some(PathBuf::from("from-flag.csv")),
            ..ConfigArgs::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.server.listen.port(), 7000);
        assert_eq!(config.store.file, PathBuf::from("from-flag.csv"));
        assert!(!config.store.atomic_writes);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let args = ConfigArgs {
            config: Some(PathBuf::from("/nonexistent/hostdir.toml")),
            ..ConfigArgs::default()
        };
        assert!(args.resolve().is_err());
    }
}
