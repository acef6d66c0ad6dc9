//! Configuration management

use serde::{Deserialize, Serialize};
use anyhow::Result;
use step_timer::{Level, TracingSink};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Level timing lines are emitted at
    pub level: Level,
    /// `EnvFilter` directives used when `RUST_LOG` is unset; defaults to `level`
    pub log_filter: Option<String>,
    /// Colorize terminal output
    pub ansi: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            log_filter: None,
            ansi: true,
        }
    }
}

impl TimingConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TimingConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Filter directives for the subscriber when the environment sets none
    pub fn filter_directives(&self) -> String {
        self.log_filter
            .clone()
            .unwrap_or_else(|| self.level.as_str().to_string())
    }

    pub fn tracing_sink(&self) -> TracingSink {
        TracingSink::new(self.level)
    }
}
