//! Configuration loading and typed config structures.
//!
//! The service reads `pokespawn-config.yaml` (if present) into
//! [`ServiceConfig`], then applies environment variable overrides for the
//! deployment-specific settings. Every field has a default, so an empty
//! file is a valid configuration.
//!
//! Game tuning lives in [`GameConfig`], expressed in metres for
//! readability. [`GameConfig::validate`] converts it into the
//! degree-based [`SpawnRules`] the engine runs on.

use std::path::Path;

use pokespawn_db::StoreConfig;
use pokespawn_types::PokemonKind;
use serde::Deserialize;

use crate::geometry::meters_to_degrees;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `pokespawn-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceConfig {
    /// Spawn and activation tuning.
    #[serde(default)]
    pub game: GameConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: HttpConfig,

    /// Storage backend selection and connection strings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// Recognised variables:
    /// - `HOST`, `PORT` -- HTTP listener
    /// - `STORE_BACKEND` -- `memory`, `dragonfly` or `postgres`
    /// - `DRAGONFLY_URL`, `DATABASE_URL` -- backend connection strings
    /// - `POKEMON_TABLE_NAME`, `USER_TABLE_NAME` -- Dragonfly key names
    /// - `LOG_LEVEL` -- default log filter
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if an override cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override cannot be parsed.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Override settings from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override cannot be parsed.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("PORT") {
            self.server.port = val
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("invalid PORT {val:?}: {e}")))?;
        }
        if let Some(val) = lookup("STORE_BACKEND") {
            self.store.backend = val
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("invalid STORE_BACKEND: {e}")))?;
        }
        if let Some(val) = lookup("DRAGONFLY_URL") {
            self.store.dragonfly_url = val;
        }
        if let Some(val) = lookup("DATABASE_URL") {
            self.store.postgres_url = val;
        }
        if let Some(val) = lookup("POKEMON_TABLE_NAME") {
            self.store.pokemon_key = val;
        }
        if let Some(val) = lookup("USER_TABLE_NAME") {
            self.store.user_key = val;
        }
        if let Some(val) = lookup("LOG_LEVEL") {
            self.logging.level = val;
        }
        Ok(())
    }
}

/// Upper bound on `min_nearby`; each query may spawn this many pokemon.
pub const MAX_MIN_NEARBY: u32 = 1_000;

/// Spawn and activation tuning, in metres.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameConfig {
    /// Kinds a new pokemon is drawn from, uniformly.
    #[serde(default = "default_kinds")]
    pub kinds: Vec<PokemonKind>,

    /// Minimum number of pokemon kept within the spawn radius of any
    /// queried point.
    #[serde(default = "default_min_nearby")]
    pub min_nearby: u32,

    /// A pokemon strictly closer than this is capturable.
    #[serde(default = "default_activate_radius_m")]
    pub activate_radius_m: f64,

    /// Density is enforced within this distance of the query point.
    #[serde(default = "default_spawn_radius_m")]
    pub spawn_radius_m: f64,

    /// Margin radius as a multiple of the activation radius. New pokemon
    /// never spawn inside the margin, and competing nearest candidates
    /// inside it are pruned.
    #[serde(default = "default_margin_multiplier")]
    pub margin_multiplier: f64,

    /// Seed for spawn placement and kind selection. Unset means seeded
    /// from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            kinds: default_kinds(),
            min_nearby: default_min_nearby(),
            activate_radius_m: default_activate_radius_m(),
            spawn_radius_m: default_spawn_radius_m(),
            margin_multiplier: default_margin_multiplier(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Check the tuning and convert it to degree-based [`SpawnRules`].
    ///
    /// Requires a non-empty kind list, `1 <= min_nearby <= MAX_MIN_NEARBY`,
    /// finite positive radii, and `activate < margin < spawn`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<SpawnRules, ConfigError> {
        if self.kinds.is_empty() {
            return Err(ConfigError::Invalid(String::from("game.kinds must not be empty")));
        }
        if self.min_nearby == 0 || self.min_nearby > MAX_MIN_NEARBY {
            return Err(ConfigError::Invalid(format!(
                "game.min_nearby must be between 1 and {MAX_MIN_NEARBY}, got {}",
                self.min_nearby
            )));
        }
        for (name, value) in [
            ("activate_radius_m", self.activate_radius_m),
            ("spawn_radius_m", self.spawn_radius_m),
            ("margin_multiplier", self.margin_multiplier),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "game.{name} must be a positive finite number, got {value}"
                )));
            }
        }
        if self.margin_multiplier <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "game.margin_multiplier must exceed 1, got {}",
                self.margin_multiplier
            )));
        }

        let margin_radius_m = self.activate_radius_m * self.margin_multiplier;
        if margin_radius_m >= self.spawn_radius_m {
            return Err(ConfigError::Invalid(format!(
                "margin radius ({margin_radius_m} m) must be smaller than spawn radius ({} m)",
                self.spawn_radius_m
            )));
        }

        Ok(SpawnRules {
            kinds: self.kinds.clone(),
            min_nearby: self.min_nearby,
            activate_radius: meters_to_degrees(self.activate_radius_m),
            margin_radius: meters_to_degrees(margin_radius_m),
            spawn_radius: meters_to_degrees(self.spawn_radius_m),
        })
    }
}

/// Validated tuning with every radius in degrees.
///
/// Only obtainable through [`GameConfig::validate`] or
/// [`SpawnRules::new`], both of which enforce
/// `activate_radius < margin_radius < spawn_radius`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRules {
    kinds: Vec<PokemonKind>,
    min_nearby: u32,
    activate_radius: f64,
    margin_radius: f64,
    spawn_radius: f64,
}

impl SpawnRules {
    /// Build rules directly from degree radii.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the kinds are empty,
    /// `min_nearby` is zero or above [`MAX_MIN_NEARBY`], or the radii are
    /// not strictly increasing positive finite numbers.
    pub fn new(
        kinds: Vec<PokemonKind>,
        min_nearby: u32,
        activate_radius: f64,
        margin_radius: f64,
        spawn_radius: f64,
    ) -> Result<Self, ConfigError> {
        if kinds.is_empty() || min_nearby == 0 || min_nearby > MAX_MIN_NEARBY {
            return Err(ConfigError::Invalid(format!(
                "spawn rules need at least one kind and 1 <= min_nearby <= {MAX_MIN_NEARBY}"
            )));
        }
        let ordered = activate_radius.is_finite()
            && spawn_radius.is_finite()
            && activate_radius > 0.0
            && activate_radius < margin_radius
            && margin_radius < spawn_radius;
        if !ordered {
            return Err(ConfigError::Invalid(format!(
                "radii must satisfy 0 < activate ({activate_radius}) < margin ({margin_radius}) < spawn ({spawn_radius})"
            )));
        }
        Ok(Self {
            kinds,
            min_nearby,
            activate_radius,
            margin_radius,
            spawn_radius,
        })
    }

    /// Kinds a new pokemon is drawn from. Never empty.
    pub fn kinds(&self) -> &[PokemonKind] {
        &self.kinds
    }

    /// Minimum population within [`Self::spawn_radius`].
    pub const fn min_nearby(&self) -> u32 {
        self.min_nearby
    }

    /// Capture threshold, in degrees.
    pub const fn activate_radius(&self) -> f64 {
        self.activate_radius
    }

    /// Duplicate-suppression threshold, in degrees.
    pub const fn margin_radius(&self) -> f64 {
        self.margin_radius
    }

    /// Density threshold, in degrees.
    pub const fn spawn_radius(&self) -> f64 {
        self.spawn_radius
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request deadline in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log filter used when `RUST_LOG` is unset (trace, debug, info, warn,
    /// error, or a full `EnvFilter` directive).
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

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_kinds() -> Vec<PokemonKind> {
    PokemonKind::ALL.to_vec()
}

const fn default_min_nearby() -> u32 {
    6
}

const fn default_activate_radius_m() -> f64 {
    10.0
}

const fn default_spawn_radius_m() -> f64 {
    100.0
}

const fn default_margin_multiplier() -> f64 {
    3.0
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    3000
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_log_level() -> String {
    String::from("info")
}
