//! Configuration loading and types
//!
//! The config directory holds `config.toml` and a `scripts/` subdirectory
//! with the scan scripts. It is created, with a default config file, the
//! first time invsync runs.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use invsync_inventory::ManagementCredentials;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "INVSYNC_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";
const SCRIPTS_DIR: &str = "scripts";
const PLACEHOLDER: &str = "change_me";

const DEFAULT_CONFIG: &str = r#"# invsync configuration

# Log at debug level
debug = false

# Where logs go: "stderr", "stdout" or a file path
log_output = "stderr"

# Per-request timeout for the inventory API, in seconds
client_timeout = 10

# How long a scan script may run, in seconds
scan_timeout = 300

ralph_api_url = "change_me"
ralph_api_key = "change_me"

# Credentials passed to scan scripts for the management controller
management_user_name = "change_me"
management_user_password = "change_me"
"#;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot determine the user config directory; set INVSYNC_CONFIG_DIR")]
    NoConfigDir,

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(
        "config file {} should only have read+write permissions for its owner (mode is {mode:o})",
        .path.display()
    )]
    Permissions { path: PathBuf, mode: u32 },

    #[error("invalid configuration:\n  {}", .0.join("\n  "))]
    Validation(Vec<String>),
}

/// Top-level configuration
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub debug: bool,
    /// `stderr`, `stdout` or a file path
    #[serde(default = "default_log_output")]
    pub log_output: String,
    /// Seconds
    #[serde(default = "default_client_timeout")]
    pub client_timeout: u64,
    /// Seconds
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout: u64,
    #[serde(default = "default_placeholder")]
    pub ralph_api_url: String,
    #[serde(default = "default_placeholder")]
    pub ralph_api_key: String,
    #[serde(default = "default_placeholder")]
    pub management_user_name: String,
    #[serde(default = "default_placeholder")]
    pub management_user_password: String,
}

fn default_log_output() -> String {
    "stderr".to_string()
}

fn default_client_timeout() -> u64 {
    10
}

fn default_scan_timeout() -> u64 {
    300
}

fn default_placeholder() -> String {
    PLACEHOLDER.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            log_output: default_log_output(),
            client_timeout: default_client_timeout(),
            scan_timeout: default_scan_timeout(),
            ralph_api_url: default_placeholder(),
            ralph_api_key: default_placeholder(),
            management_user_name: default_placeholder(),
            management_user_password: default_placeholder(),
        }
    }
}

/// Where the loaded settings came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    /// No file existed at the given path
    Defaults,
}

impl Config {
    /// Load and validate `path`; a missing file yields the defaults
    ///
    /// Loading happens before logging is set up, so the caller reports the
    /// returned [`ConfigSource`].
    ///
    /// # Errors
    /// Returns an error if the file is readable by anyone but its owner,
    /// cannot be read or parsed, or fails validation.
    pub fn load(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.validate()?;
            return Ok((config, ConfigSource::Defaults));
        }

        check_permissions(path)?;

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok((config, ConfigSource::File))
    }

    /// Check every setting, reporting all problems at once
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` listing each problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.ralph_api_url.trim().is_empty() {
            problems.push("Ralph API URL is missing".to_string());
        } else if self.ralph_api_url != PLACEHOLDER && url::Url::parse(&self.ralph_api_url).is_err() {
            problems.push(format!("Ralph API URL is invalid: {}", self.ralph_api_url));
        }
        if self.ralph_api_key.trim().is_empty() {
            problems.push("Ralph API key is missing".to_string());
        }
        if self.client_timeout == 0 {
            problems.push("client_timeout must be greater than zero".to_string());
        }
        if self.scan_timeout == 0 {
            problems.push("scan_timeout must be greater than zero".to_string());
        }
        if self.log_output.trim().is_empty() {
            problems.push("log_output must be \"stderr\", \"stdout\" or a file path".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems))
        }
    }

    /// Settings still holding the placeholder value
    #[must_use]
    pub fn unset_keys(&self) -> Vec<&'static str> {
        [
            ("ralph_api_url", &self.ralph_api_url),
            ("ralph_api_key", &self.ralph_api_key),
            ("management_user_name", &self.management_user_name),
            ("management_user_password", &self.management_user_password),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_str() == PLACEHOLDER)
        .map(|(key, _)| key)
        .collect()
    }

    #[must_use]
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout)
    }

    #[must_use]
    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout)
    }

    #[must_use]
    pub fn credentials(&self) -> ManagementCredentials {
        ManagementCredentials {
            user_name: self.management_user_name.clone(),
            password: self.management_user_password.clone(),
        }
    }
}

fn redact(secret: &str) -> &'static str {
    if secret == PLACEHOLDER { PLACEHOLDER } else { "********" }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("debug", &self.debug)
            .field("log_output", &self.log_output)
            .field("client_timeout", &self.client_timeout)
            .field("scan_timeout", &self.scan_timeout)
            .field("ralph_api_url", &self.ralph_api_url)
            .field("ralph_api_key", &redact(&self.ralph_api_key))
            .field("management_user_name", &self.management_user_name)
            .field("management_user_password", &redact(&self.management_user_password))
            .finish()
    }
}

/// Renders like the config file, secrets masked
impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "debug = {}", self.debug)?;
        writeln!(f, "log_output = {:?}", self.log_output)?;
        writeln!(f, "client_timeout = {}", self.client_timeout)?;
        writeln!(f, "scan_timeout = {}", self.scan_timeout)?;
        writeln!(f, "ralph_api_url = {:?}", self.ralph_api_url)?;
        writeln!(f, "ralph_api_key = {:?}", redact(&self.ralph_api_key))?;
        writeln!(f, "management_user_name = {:?}", self.management_user_name)?;
        write!(
            f,
            "management_user_password = {:?}",
            redact(&self.management_user_password)
        )
    }
}

/// The config directory: `$INVSYNC_CONFIG_DIR`, else `<user config>/invsync`
///
/// # Errors
/// Returns `ConfigError::NoConfigDir` if neither is available.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|dir| dir.join("invsync"))
        .ok_or(ConfigError::NoConfigDir)
}

/// The config file path and whether it was just written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    pub created: bool,
}

/// Make sure `dir`, its `scripts/` subdirectory and a config file exist
///
/// # Errors
/// Returns `ConfigError::Io` if anything cannot be created.
pub fn prepare_config_dir(dir: &Path) -> Result<ConfigLocation, ConfigError> {
    let scripts = dir.join(SCRIPTS_DIR);
    std::fs::create_dir_all(&scripts).map_err(|source| ConfigError::Io {
        path: scripts.clone(),
        source,
    })?;

    let path = dir.join(CONFIG_FILE);
    let created = !path.exists();
    if created {
        std::fs::write(&path, DEFAULT_CONFIG)
            .and_then(|()| restrict_to_owner(&path))
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
    }
    Ok(ConfigLocation { path, created })
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn check_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode() & 0o777;
    if mode & 0o077 != 0 {
        return Err(ConfigError::Permissions {
            path: path.to_path_buf(),
            mode,
        });
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}
