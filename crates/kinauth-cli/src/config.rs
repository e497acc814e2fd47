//! Configuration vault – reads/writes `~/.kinauth/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use kinauth_runtime::AuthConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Invalid(#[from] kinauth_types::AuthError),
}

/// Persisted CLI settings.
///
/// ```toml
/// sensor_fps = 30
///
/// [auth]
/// num_gestures = 2
/// recording_seconds = 5
///
/// [auth.dtw]
/// recognition_threshold = 1.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Frame rate of the simulated sensor.
    #[serde(default = "default_sensor_fps")]
    pub sensor_fps: u32,

    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_sensor_fps() -> u32 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sensor_fps: default_sensor_fps(),
            auth: AuthConfig::default(),
        }
    }
}

/// Return the path to `~/.kinauth/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".kinauth").join("config.toml")
}

/// Load the config from disk and apply environment overrides. Returns
/// `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, VaultError> {
    let Some(mut cfg) = load_from(&config_path())? else {
        return Ok(None);
    };
    apply_env_overrides(&mut cfg);
    cfg.auth.validate()?;
    Ok(Some(cfg))
}

/// Read and validate one file, without environment overrides.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, VaultError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| VaultError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: Config = toml::from_str(&raw)?;
    cfg.auth.validate()?;
    Ok(Some(cfg))
}

/// The stored config, or defaults with environment overrides applied when
/// no file exists yet.
pub fn load_or_default() -> Result<Config, VaultError> {
    match load()? {
        Some(cfg) => Ok(cfg),
        None => {
            let mut cfg = Config::default();
            apply_env_overrides(&mut cfg);
            cfg.auth.validate()?;
            Ok(cfg)
        }
    }
}

/// Apply `KINAUTH_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `KINAUTH_NUM_GESTURES` | `auth.num_gestures` |
/// | `KINAUTH_RECORDING_SECONDS` | `auth.recording_seconds` |
/// | `KINAUTH_SENSOR_FPS` | `sensor_fps` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Some(n) = env_parse("KINAUTH_NUM_GESTURES") {
        cfg.auth.num_gestures = n;
    }
    if let Some(s) = env_parse("KINAUTH_RECORDING_SECONDS") {
        cfg.auth.recording_seconds = s;
    }
    if let Some(fps) = env_parse("KINAUTH_SENSOR_FPS") {
        cfg.sensor_fps = fps;
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.trim().parse().ok()
}

/// Save the config to disk, creating `~/.kinauth/` if necessary.
pub fn save(cfg: &Config) -> Result<(), VaultError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), VaultError> {
    let write_err = |source: std::io::Error| VaultError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700)).map_err(write_err)?;
        }
    }

    let raw = toml::to_string_pretty(cfg)?;

    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(write_err)?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(write_err)?;

    Ok(())
}
