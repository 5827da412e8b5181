use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable prefix for layered settings (e.g. `DOCX_SERVER__PORT`).
pub const ENV_PREFIX: &str = "DOCX";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT", global = true)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Extraction gateway: auto, gemini, mistral or local
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Log output format: compact or json
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Extract text from local files and write the results
    Extract {
        /// Files or directories to process
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output directory for `*_extracted.txt` files
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Also write the aggregated corpus
        #[arg(long)]
        aggregate: bool,

        /// Copy the aggregated corpus to the clipboard
        #[arg(long)]
        copy: bool,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub gateway: GatewayConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Maximum size of a single file in bytes.
    pub max_file_size: usize,
    /// Maximum total size of one upload request in bytes.
    pub max_total_size: usize,
    /// Maximum number of files per upload request.
    pub max_files: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 20 * 1024 * 1024,
            max_total_size: 100 * 1024 * 1024,
            max_files: 20,
        }
    }
}

/// Settings for the extraction gateway.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GatewayConfig {
    /// "auto", "gemini", "mistral" or "local"
    pub provider: String,
    pub api_key: Option<String>,
    /// Model override (gateway default when unset)
    pub model: Option<String>,
    /// Base URL override (gateway default when unset)
    pub base_url: Option<String>,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            provider: "auto".to_string(),
            api_key: None,
            model: None,
            base_url: None,
            temperature: 0.1,
            top_p: 0.95,
            top_k: 64,
        }
    }
}

impl GatewayConfig {
    /// The API key, ignoring blank values.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Build the layered configuration.
    ///
    /// Priority: CLI flag > `DOCX_` env var > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let upload = UploadConfig::default();
        let gateway = GatewayConfig::default();

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.request_timeout_secs", 300)?
            .set_default("upload.max_file_size", upload.max_file_size as u64)?
            .set_default("upload.max_total_size", upload.max_total_size as u64)?
            .set_default("upload.max_files", upload.max_files as u64)?
            .set_default("gateway.provider", gateway.provider)?
            .set_default("gateway.temperature", f64::from(gateway.temperature))?
            .set_default("gateway.top_p", f64::from(gateway.top_p))?
            .set_default("gateway.top_k", i64::from(gateway.top_k))?
            .set_default("log.format", "compact")?;

        // Conventional key variables act as a default; explicit settings win.
        if let Some(key) = ["GEMINI_API_KEY", "API_KEY"]
            .iter()
            .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()))
        {
            builder = builder.set_default("gateway.api_key", key)?;
        }

        if let Some(path) = config_file_path(cli.config.as_deref()) {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(host) = &cli.host {
            builder = builder.set_override("server.host", host.as_str())?;
        }
        if let Some(provider) = &cli.provider {
            builder = builder.set_override("gateway.provider", provider.as_str())?;
        }
        if let Some(format) = &cli.log_format {
            builder = builder.set_override("log.format", format.as_str())?;
        }

        builder.build()?.try_deserialize()
    }
}

/// Explicit config path, or `./config.yaml` when present.
fn config_file_path(explicit: Option<&str>) -> Option<PathBuf> {
    match explicit {
        Some(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => {
            let fallback = Path::new("config.yaml");
            fallback.exists().then(|| fallback.to_path_buf())
        }
    }
}
