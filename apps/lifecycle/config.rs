use once_cell::sync::OnceCell;
use proposalsapp_lifecycle::{DEFAULT_BLOCK_TIME_SECONDS, ProtocolVersion};
use serde::Deserialize;
use std::{env, fs};
use tracing::{info, warn};

pub static CONFIG: OnceCell<LifecycleConfig> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub protocol_version: ProtocolVersion,
    pub block_time_seconds: u64,
    pub metagov_enabled: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            protocol_version: ProtocolVersion::Current,
            block_time_seconds: DEFAULT_BLOCK_TIME_SECONDS,
            metagov_enabled: true,
        }
    }
}

pub fn load() -> &'static LifecycleConfig {
    CONFIG.get_or_init(load_config)
}

fn load_config() -> LifecycleConfig {
    let path = env::var("LIFECYCLE_CONFIG_PATH").unwrap_or_else(|_| "lifecycle.yaml".to_string());
    let mut config = match fs::read_to_string(&path) {
        Ok(contents) => match serde_yaml::from_str::<LifecycleConfig>(&contents) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    error = %err,
                    path = %path,
                    "Failed to parse lifecycle config, using defaults"
                );
                LifecycleConfig::default()
            }
        },
        Err(err) => {
            warn!(error = %err, path = %path, "Lifecycle config not found, using defaults");
            LifecycleConfig::default()
        }
    };

    apply_overrides(&mut config, |key| env::var(key).ok());
    validate(&mut config);

    info!(
        protocol_version = %config.protocol_version,
        block_time_seconds = config.block_time_seconds,
        metagov_enabled = config.metagov_enabled,
        "Lifecycle config loaded"
    );

    config
}

fn apply_overrides(config: &mut LifecycleConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(value) = lookup("LIFECYCLE_PROTOCOL_VERSION") {
        match value.parse::<ProtocolVersion>() {
            Ok(version) => config.protocol_version = version,
            Err(err) => warn!(error = %err, "Failed to parse LIFECYCLE_PROTOCOL_VERSION override"),
        }
    }

    if let Some(value) = lookup("LIFECYCLE_BLOCK_TIME_SECONDS") {
        match value.parse::<u64>() {
            Ok(seconds) if seconds > 0 => config.block_time_seconds = seconds,
            Ok(_) => warn!("LIFECYCLE_BLOCK_TIME_SECONDS must be positive, ignoring override"),
            Err(err) => warn!(
                error = %err,
                "Failed to parse LIFECYCLE_BLOCK_TIME_SECONDS override"
            ),
        }
    }

    if let Some(value) = lookup("LIFECYCLE_METAGOV_ENABLED") {
        match value.parse::<bool>() {
            Ok(enabled) => config.metagov_enabled = enabled,
            Err(err) => warn!(error = %err, "Failed to parse LIFECYCLE_METAGOV_ENABLED override"),
        }
    }
}

/// A zero block time would pin every estimate to the creation timestamp.
fn validate(config: &mut LifecycleConfig) {
    if config.block_time_seconds == 0 {
        warn!(
            default = DEFAULT_BLOCK_TIME_SECONDS,
            "block_time_seconds must be positive, using default"
        );
        config.block_time_seconds = DEFAULT_BLOCK_TIME_SECONDS;
    }
}
