//! JSON configuration files for each subcommand, with CLI overrides applied on
//! top. Every field has a default, so a partial (or absent) file is fine.
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use iris_classifiers::{KernelType, TrainConfig};

/// Read and parse a JSON configuration file.
pub fn load_json_config<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
    let config: T = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
    Ok(config)
}

fn load_or_default<T: DeserializeOwned + Default>(config_path: Option<&PathBuf>) -> Result<T> {
    match config_path {
        Some(path) => load_json_config(path),
        None => {
            log::debug!("No config file provided; using defaults.");
            Ok(T::default())
        }
    }
}

fn default_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}

/// Configuration of the prediction service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Load (or train) the model at startup instead of on the first request.
    pub preload: bool,
    pub model: TrainConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: default_port(),
            preload: false,
            model: TrainConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config: ServiceConfig = load_or_default(config_path)?;

        if let Some(host) = matches.get_one::<String>("host") {
            config.host = host.clone();
        }
        if let Some(port) = matches.get_one::<u16>("port") {
            config.port = *port;
        }
        if let Some(model_path) = matches.get_one::<PathBuf>("model_path") {
            config.model.model_path = model_path.clone();
        }
        if let Some(data_path) = matches.get_one::<PathBuf>("data_path") {
            config.model.data_path = data_path.clone();
        }
        if matches.get_flag("preload") {
            config.preload = true;
        }

        Ok(config)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration of the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the prediction service.
    pub backend_url: String,
    /// Directory holding the species illustrations.
    pub assets_dir: PathBuf,
    /// Request timeout for backend calls. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    pub max_upload_bytes: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            backend_url: "http://localhost:8080".to_string(),
            assets_dir: PathBuf::from("assets"),
            timeout_secs: None,
            max_upload_bytes: 200 * 1024,
        }
    }
}

impl DashboardConfig {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config: DashboardConfig = load_or_default(config_path)?;

        if let Some(host) = matches.get_one::<String>("host") {
            config.host = host.clone();
        }
        if let Some(port) = matches.get_one::<u16>("port") {
            config.port = *port;
        }
        if let Some(url) = matches.get_one::<String>("backend_url") {
            config.backend_url = url.clone();
        }
        if let Some(assets) = matches.get_one::<PathBuf>("assets_dir") {
            config.assets_dir = assets.clone();
        }

        Ok(config)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Build the training configuration for `iris train`.
pub fn train_config_from_arguments(
    config_path: Option<&PathBuf>,
    matches: &ArgMatches,
) -> Result<TrainConfig> {
    let mut config: TrainConfig = load_or_default(config_path)?;

    if let Some(data_path) = matches.get_one::<PathBuf>("data_path") {
        config.data_path = data_path.clone();
    }
    if let Some(output) = matches.get_one::<PathBuf>("output_file") {
        config.model_path = output.clone();
    }
    if let Some(kernel) = matches.get_one::<String>("kernel") {
        config.svm.kernel = KernelType::from_str(kernel)?;
    }

    validate_csv_file(&config.data_path)?;
    Ok(config)
}

pub fn validate_csv_file(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("csv") => {}
        _ => anyhow::bail!("File must have a .csv extension: {}", path.display()),
    }

    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }

    Ok(())
}
