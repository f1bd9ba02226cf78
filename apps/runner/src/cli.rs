use bridge_core::RunnerConfig;
use bridge_core::config::CONFIG_FILE_NAME;
use bridge_core::error::ConfigError;

use std::env::temp_dir;
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

const APP_DIR_NAME: &str = "neurun";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, Parser)]
#[command(name = "neurun")]
#[command(version)]
#[command(about = "Launch a native window process and bridge to it over WebSocket")]
pub struct Cli {
    /// Runner config file (JSON)
    #[arg(long, short, env = "NEURUN_CONFIG", default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Directory for the log file
    #[arg(long, env = "NEURUN_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// off, error, warn, info, debug or trace
    #[arg(long, env = "NEURUN_LOG_LEVEL")]
    pub log_level: Option<LevelFilter>,

    /// Page to load, overriding the config file
    #[arg(long)]
    pub url: Option<String>,
}

impl Cli {
    /// Load the config file and apply command-line overrides.
    pub fn load_config(&self) -> Result<RunnerConfig, ConfigError> {
        let mut config = RunnerConfig::load(&self.config)?;
        if let Some(url) = &self.url {
            config.url = url.clone();
            config.validate()?;
        }
        Ok(config)
    }

    /// `--log-dir`, then the config's `logDir`, then the platform default.
    pub fn log_dir(&self, config: &RunnerConfig) -> PathBuf {
        self.log_dir
            .clone()
            .or_else(|| config.log_dir.clone())
            .unwrap_or_else(default_log_dir)
    }
}

pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(temp_dir)
        .join(APP_DIR_NAME)
        .join(LOG_DIR_NAME)
}
