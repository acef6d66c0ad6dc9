//! Tracing subscriber setup

use std::env::{self, VarError};

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::TimingConfig;

/// Build the filter: `RUST_LOG` when set, otherwise the configured directives.
///
/// A `RUST_LOG` that is set but malformed is an error, not a silent fallback.
pub fn env_filter(config: &TimingConfig) -> Result<EnvFilter> {
    match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => filter_from(Some(&directives), config),
        Err(VarError::NotPresent) => filter_from(None, config),
        Err(err @ VarError::NotUnicode(_)) => {
            Err(anyhow!("invalid {}: {}", EnvFilter::DEFAULT_ENV, err))
        }
    }
}

fn filter_from(env_directives: Option<&str>, config: &TimingConfig) -> Result<EnvFilter> {
    match env_directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {} directives: {:?}", EnvFilter::DEFAULT_ENV, directives)),
        None => {
            let directives = config.filter_directives();
            EnvFilter::try_new(&directives)
                .with_context(|| format!("invalid log_filter directives: {:?}", directives))
        }
    }
}

/// Install the global fmt subscriber. Fails if one is already installed.
pub fn init(config: &TimingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config)?)
        .with_ansi(config.ansi)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {}", err))
}
