use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub robot: RobotConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RobotConfig {
    /// IP address or hostname of the robot running the camera server.
    pub host: String,
    #[serde(default = "default_stream_port")]
    pub stream_port: u16,
    #[serde(default = "default_save_port")]
    pub save_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_save_dir")]
    pub save_dir: String,
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            filename_prefix: default_filename_prefix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }

    pub fn stream_addr(&self) -> String {
        format!("{}:{}", self.robot.host, self.robot.stream_port)
    }

    pub fn save_addr(&self) -> String {
        format!("{}:{}", self.robot.host, self.robot.save_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
}

// Default value functions
fn default_stream_port() -> u16 {
    8888
}
fn default_save_port() -> u16 {
    8889
}
fn default_save_dir() -> String {
    "ball_dataset_local".into()
}
fn default_filename_prefix() -> String {
    "ball_dataset".into()
}
fn default_log_level() -> String {
    "info".into()
}
