use std::{
    net::{AddrParseError, SocketAddr},
    path::PathBuf,
};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use wanderlist_core::{Priority, TripType, VisitStatus};

#[derive(Parser, Debug)]
#[command(name = "wanderlist", about = "Wanderlist - catalog of travel destinations")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, default_value = "wanderlist.toml")]
    pub config: String,

    /// Storage backend tag (overrides config file)
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Port to listen on when serving (overrides config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List destinations, optionally filtered
    List {
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        continent: Option<String>,
        #[arg(long)]
        trip_type: Option<TripType>,
        #[arg(long)]
        visit_status: Option<VisitStatus>,
    },
    /// Show one destination in full
    Show { id: i64 },
    /// Create a destination at the given coordinates
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        continent: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long = "trip-type")]
        trip_types: Vec<TripType>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Save one JSON record read from a file, or stdin when the path is `-`
    Save { file: String },
    /// Delete a destination by id
    Delete { id: i64 },
    /// Replace the whole collection with the JSON array in a file
    Import { file: PathBuf },
    /// Write the collection as JSON, by default to travel-wishlist-<date>.json
    Export { file: Option<PathBuf> },
    /// Convert legacy-shaped records in place
    Migrate,
    /// Serve the HTTP API
    Serve,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// When true, every route except /health and /metrics requires an API key.
    #[serde(default)]
    pub enabled: bool,

    /// Static API keys. Each key has a name (for audit) and a role.
    #[serde(default)]
    pub api_keys: Vec<ApiKeyEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiKeyEntry {
    pub name: String,
    pub key: String,
    #[serde(default = "default_role")]
    pub role: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Backend tag: `local`, `memory`, `sqlite` or `remote`. Anything else
    /// opens the local backend.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Directory for `local`, database file for `sqlite`.
    #[serde(default)]
    pub path: Option<String>,

    /// Document key within the key-value store.
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// Endpoint for the remote backend.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            backend: default_backend(),
            path: None,
            key: default_storage_key(),
            endpoint: None,
        }
    }
}

fn default_role() -> String {
    "reader".to_string()
}

fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        json: false,
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_backend() -> String {
    "local".to_string()
}

fn default_storage_key() -> String {
    wanderlist_local::DEFAULT_STORAGE_KEY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: default_server(),
            logging: default_logging(),
            auth: AuthConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    pub fn load(cli: &CliArgs) -> Self {
        let mut config = match std::fs::read_to_string(&cli.config) {
            Ok(contents) => Self::parse(&contents),
            Err(_) => Config::default(),
        };

        // CLI overrides
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }
        if let Some(ref backend) = cli.backend {
            config.storage.backend = backend.clone();
        }

        config
    }

    /// Parses a config file body; an unparsable body yields the defaults.
    pub fn parse(contents: &str) -> Self {
        toml::from_str(contents).unwrap_or_else(|e| {
            // logging is configured from this file, so it is not up yet
            eprintln!("Warning: Failed to parse config file: {}", e);
            Config::default()
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
