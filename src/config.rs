//! Configuration constants and connection profiles for weblioteca
//!
//! Profiles live in an INI file, one section per profile:
//!
//! ```ini
//! [default]
//! host = http://localhost:8080/
//! user = admin
//! password = admin
//! insecure = false
//! timeout = 30
//! @Accept-Language = pt-br
//! ```
//!
//! Keys starting with `@` become request headers.

use ini::Ini;
use reqwest::Url;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default profile file path for weblioteca
pub const DEFAULT_PROFILE_PATH: &str = "~/.weblioteca/profile";

/// Environment variable name for overriding the profile path
pub const PROFILE_PATH_ENV_VAR: &str = "WEBLIOTECA_PROFILE_PATH";

/// Environment variable name for the log level of the binary
pub const LOG_LEVEL_ENV_VAR: &str = "WEBLIOTECA_LOG_LEVEL";

/// Server used when no profile is configured
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/";

const HEADER_KEY_PREFIX: char = '@';

/// Get the profile file path, checking environment variable first, then falling back to default
pub fn get_profile_path() -> String {
    profile_path_from(std::env::var_os(PROFILE_PATH_ENV_VAR))
}

fn profile_path_from(env_value: Option<OsString>) -> String {
    env_value
        .and_then(|val| val.into_string().ok())
        .filter(|val| !val.is_empty())
        .unwrap_or_else(|| DEFAULT_PROFILE_PATH.to_string())
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read profile file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: ini::Error,
    },

    #[error("invalid server URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("invalid value '{value}' for '{key}' in profile '{profile}'")]
    InvalidValue {
        profile: String,
        key: String,
        value: String,
    },
}

/// Connection settings for one server
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionProfile {
    server: String,
    user: Option<String>,
    password: Option<String>,
    token: Option<String>,
    insecure: bool,
    timeout: Option<Duration>,
    headers: BTreeMap<String, String>,
}

impl ConnectionProfile {
    /// Create a profile for `server`; a trailing slash is added so resource paths join beneath it
    pub fn new(server: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            server: parse_server_url(server)?,
            user: None,
            password: None,
            token: None,
            insecure: false,
            timeout: None,
            headers: BTreeMap::new(),
        })
    }

    /// Profile pointing at the local development server
    pub fn blank() -> Self {
        Self {
            server: DEFAULT_SERVER_URL.to_string(),
            user: None,
            password: None,
            token: None,
            insecure: false,
            timeout: None,
            headers: BTreeMap::new(),
        }
    }

    /// Server root URL, always ending in `/`
    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Bearer token; takes precedence over user/password
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn insecure(&self) -> bool {
        self.insecure
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn with_credentials(
        mut self,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

fn parse_server_url(server: &str) -> Result<String, ConfigError> {
    let mut normalized = server.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized)
        .map(|url| url.to_string())
        .map_err(|e| ConfigError::InvalidUrl {
            url: server.to_string(),
            message: e.to_string(),
        })
}

/// Reads connection profiles from an INI file
pub struct IniProfileStore {
    path: String,
}

impl IniProfileStore {
    /// Create a store for `path`; `~` is expanded to the home directory
    pub fn new(path: &str) -> Self {
        Self {
            path: shellexpand::tilde(path).into_owned(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Load the named profile; a missing file or section yields `None`
    pub fn get_profile(&self, name: &str) -> Result<Option<ConnectionProfile>, ConfigError> {
        if !Path::new(&self.path).exists() {
            tracing::debug!("Profile file '{}' does not exist", self.path);
            return Ok(None);
        }

        let ini = Ini::load_from_file(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        profile_from_ini(&ini, name)
    }
}

/// Build the named profile from parsed INI content
pub fn profile_from_ini(ini: &Ini, name: &str) -> Result<Option<ConnectionProfile>, ConfigError> {
    let Some(section) = ini.section(Some(name)) else {
        return Ok(None);
    };

    let mut profile = match section.get("host") {
        Some(host) => ConnectionProfile::new(host)?,
        None => ConnectionProfile::blank(),
    };

    let invalid = |key: &str, value: &str| ConfigError::InvalidValue {
        profile: name.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    };

    for (key, value) in section.iter() {
        match key {
            "host" => {}
            "user" => profile.user = Some(value.to_string()),
            "password" => profile.password = Some(value.to_string()),
            "token" => profile.token = Some(value.to_string()),
            "insecure" => {
                profile.insecure = value
                    .trim()
                    .parse::<bool>()
                    .map_err(|_| invalid(key, value))?;
            }
            "timeout" => {
                let seconds = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| invalid(key, value))?;
                profile.timeout = Some(Duration::from_secs(seconds));
            }
            _ => match key.strip_prefix(HEADER_KEY_PREFIX) {
                Some(header) if !header.is_empty() => {
                    profile.headers.insert(header.to_string(), value.to_string());
                }
                _ => tracing::warn!("Ignoring unknown key '{}' in profile '{}'", key, name),
            },
        }
    }

    Ok(Some(profile))
}
