//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml`, then from `WALLETTRACK__*` environment variables,
//! then from the command line.
//!
//! ```toml
//! [app]
//! level = "debug"
//!
//! [server]
//! bind = "0.0.0.0"
//! port = 3000
//! database = { sqlite = "wallettrack.db" }   # or database = "memory"
//!
//! [auth]
//! jwt_secret = "change-me"
//! ```

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => "sqlite::memory:".to_string(),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

impl Default for Database {
    fn default() -> Self {
        Database::Sqlite("wallettrack.db".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            database: Database::default(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    /// HMAC secret the bearer tokens are signed with.
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub server: Server,
    pub auth: Auth,
}

#[derive(Debug, Parser)]
#[command(name = "wallettrack", version)]
struct Args {
    /// Settings file path, without or with the `.toml` extension.
    #[arg(long, env = "WALLETTRACK_CONFIG")]
    config: Option<String>,
    /// Override the listening port.
    #[arg(long)]
    port: Option<u16>,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        let mut settings = Self::from_sources(config_path, Environment::with_prefix("WALLETTRACK"))?;
        if let Some(port) = args.port {
            settings.server.port = port;
        }

        Ok(settings)
    }

    fn from_sources(config_path: &str, env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(
                env.prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}
