use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE_CANDIDATES: &[&str] = &["kenko.toml", "config/kenko.toml"];
const ENV_PREFIX: &str = "KENKO";
const CONFIG_PATH_VAR: &str = "KENKO_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

/// Settings for the backend REST API the client talks to.
///
/// ```
/// use kenko_config::ApiConfig;
///
/// let api = ApiConfig::default();
/// assert_eq!(api.base_url, "http://localhost:8081/api/v1");
/// assert_eq!(api.timeout_seconds, 15);
/// assert_eq!(api.patients_path, "/patients");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "ApiConfig::default_timeout")]
    pub timeout_seconds: u64,
    /// Older backends mount the patient resource under `/pacientes`.
    #[serde(default = "ApiConfig::default_patients_path")]
    pub patients_path: String,
}

impl ApiConfig {
    fn default_base_url() -> String {
        "http://localhost:8081/api/v1".to_string()
    }

    const fn default_timeout() -> u64 {
        15
    }

    fn default_patients_path() -> String {
        "/patients".to_string()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_seconds: Self::default_timeout(),
            patients_path: Self::default_patients_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub session_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            session_file: ".kenko/session.json".to_string(),
        }
    }
}

impl AppConfig {
    fn normalized(mut self) -> Self {
        if self.api.timeout_seconds == 0 {
            self.api.timeout_seconds = ApiConfig::default_timeout();
        }
        if !self.api.patients_path.starts_with('/') {
            self.api.patients_path.insert(0, '/');
        }
        self
    }
}

/// The file `load` reads: `KENKO_CONFIG` if set, else the first
/// `kenko.toml` found from the working directory.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_VAR) {
        return Some(PathBuf::from(path));
    }
    let cwd = std::env::current_dir().ok()?;
    CONFIG_FILE_CANDIDATES
        .iter()
        .map(|candidate| cwd.join(candidate))
        .find(|path| path.is_file())
}

/// Load the client configuration: defaults, then the config file, then
/// `KENKO__SECTION__KEY` environment overrides.
///
/// ```
/// use kenko_config::load;
///
/// std::env::remove_var("KENKO_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.api.base_url.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    load_from(config_path().as_deref(), None)
}

/// Like [`load`], with an explicit file and, when `overrides` is given, a
/// fixed set of variables in place of the process environment.
pub fn load_from(
    file: Option<&Path>,
    overrides: Option<config::Map<String, String>>,
) -> anyhow::Result<AppConfig> {
    let defaults = config::Config::try_from(&AppConfig::default())
        .context("unable to register configuration defaults")?;

    let mut builder = config::Config::builder().add_source(defaults);
    match file {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
        }
        None => debug!("no configuration file, using defaults and environment"),
    }

    let environment = config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .source(overrides);

    let config = builder
        .add_source(environment)
        .build()
        .context("unable to build configuration")?
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?
        .normalized();

    debug!(?config, "loaded client configuration");
    Ok(config)
}
