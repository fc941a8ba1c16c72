use std::path::PathBuf;

use crate::error::ScrapeError;

/// Credentials for the TigerTag API. The token is optional: the public
/// catalog endpoints answer without one, authenticated requests just get a
/// higher quota.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub tigertag_token: Option<String>,
}

/// Where the token value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// TOML config file format.
#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct ConfigFile {
    tigertag: Option<TigerTagConfig>,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct TigerTagConfig {
    token: Option<String>,
}

const TOKEN_ENV_VAR: &str = "FILADEX_TIGERTAG_TOKEN";

impl Credentials {
    /// Load credentials from environment variables or the config file.
    ///
    /// Priority: env vars > config file. A missing token is not an error.
    pub fn load() -> Result<Self, ScrapeError> {
        let config = load_config_file()?;

        let tigertag_token = std::env::var(TOKEN_ENV_VAR)
            .ok()
            .or_else(|| config.and_then(|c| c.tigertag.and_then(|t| t.token)));

        Ok(Self { tigertag_token })
    }

    /// Provenance of the token, for `--verbose`-style display.
    pub fn token_source() -> CredentialSource {
        if std::env::var(TOKEN_ENV_VAR).is_ok() {
            return CredentialSource::EnvVar(TOKEN_ENV_VAR);
        }
        let from_file = load_config_file()
            .ok()
            .flatten()
            .and_then(|c| c.tigertag.and_then(|t| t.token))
            .is_some();
        if from_file {
            CredentialSource::ConfigFile
        } else {
            CredentialSource::Missing
        }
    }
}

/// Path to the filadex config file, if a config directory exists.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("filadex").join("config.toml"))
}

fn load_config_file() -> Result<Option<ConfigFile>, ScrapeError> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)?;
    let config = toml::from_str(&contents)
        .map_err(|e| ScrapeError::Config(format!("Invalid config file {}: {e}", path.display())))?;
    Ok(Some(config))
}
