use lazy_static::lazy_static;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use crate::Result;

lazy_static! {
    static ref CONFIG: RwLock<Config> = RwLock::new(Config::new());
}

/// Default ceiling for a single frame's accumulated bitstream (256 MiB).
pub const DEFAULT_MAX_BITSTREAM_SIZE: usize = 256 * 1024 * 1024;

const ENV_INITIAL_CAPACITY: &str = "AV1HW_INITIAL_BITSTREAM_CAPACITY";
const ENV_MAX_SIZE: &str = "AV1HW_MAX_BITSTREAM_SIZE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Bytes reserved for the bitstream buffer when a session is created.
    pub initial_bitstream_capacity: usize,
    /// Hard ceiling on the bitstream buffer; growth past it reports out-of-memory.
    pub max_bitstream_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_bitstream_capacity: 0,
            max_bitstream_size: DEFAULT_MAX_BITSTREAM_SIZE,
        }
    }
}

impl Config {
    fn new() -> Self {
        let mut config = Config::default();

        // Environment first, then the config file may override it
        if let Ok(value) = env::var(ENV_INITIAL_CAPACITY) {
            match value.trim().parse() {
                Ok(v) => config.initial_bitstream_capacity = v,
                Err(e) => log::warn!("ignoring {}={:?}: {}", ENV_INITIAL_CAPACITY, value, e),
            }
        }
        if let Ok(value) = env::var(ENV_MAX_SIZE) {
            match value.trim().parse() {
                Ok(v) => config.max_bitstream_size = v,
                Err(e) => log::warn!("ignoring {}={:?}: {}", ENV_MAX_SIZE, value, e),
            }
        }

        let config_paths = ["./av1hw.toml", "./av1hw_config.toml"];
        for path in &config_paths {
            if let Ok(content) = fs::read_to_string(path) {
                if let Err(e) = config.parse_str(&content) {
                    log::warn!("ignoring config file {}: {}", path, e);
                }
            }
        }

        config
    }

    /// Applies `key = value` lines on top of the current values.
    ///
    /// Unknown keys and comment lines are skipped. A malformed number fails the whole
    /// call and leaves `self` untouched.
    pub fn parse_str(&mut self, content: &str) -> Result<()> {
        let mut updated = self.clone();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').trim_matches('\'');
            match key.trim() {
                "initial_bitstream_capacity" => {
                    updated.initial_bitstream_capacity = value.parse()?;
                }
                "max_bitstream_size" => updated.max_bitstream_size = value.parse()?,
                _ => {}
            }
        }

        *self = updated;
        Ok(())
    }

    pub fn reload() {
        let new_config = Config::new();
        match CONFIG.write() {
            Ok(mut config) => *config = new_config,
            Err(poisoned) => *poisoned.into_inner() = new_config,
        }
    }
}

/// Returns a copy of the process-wide configuration.
pub fn current() -> Config {
    match CONFIG.read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Creates a default config template file if it doesn't exist
pub fn create_default_config_template<P: AsRef<Path>>(path: P) -> Result<()> {
    if !path.as_ref().exists() {
        let template = r#"# av1hw configuration
# Bytes reserved for the per-frame bitstream buffer when a decode session starts.
initial_bitstream_capacity = 0

# Largest accumulated frame accepted before appends fail with out-of-memory.
max_bitstream_size = 268435456
"#;
        fs::write(path, template)?;
    }
    Ok(())
}
