use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use std::fmt;

/// A named secret such as `publicKey` or `privateKey`
#[derive(Clone)]
pub struct Credential {
    name: String,
    value: Secret<String>,
}

impl Credential {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Secret::new(value.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the value (use carefully - exposes secret)
    pub fn value(&self) -> &str {
        self.value.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

// Custom Serialize implementation - never expose secrets in serialization
impl Serialize for Credential {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Credential", 2)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("value", "[REDACTED]")?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct CredentialHelper {
            name: String,
            value: String,
        }

        let helper = CredentialHelper::deserialize(deserializer)?;
        Ok(Self::new(helper.name, helper.value))
    }
}

/// The credentials supplied for one exchange, keyed by name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials {
    entries: Vec<Credential>,
}

impl Credentials {
    pub fn new(entries: Vec<Credential>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the single credential called `name`.
    ///
    /// A missing or duplicated name is a configuration error; there is no
    /// fallback.
    pub fn require(&self, name: &str) -> Result<Secret<String>, ConfigError> {
        let mut matches = self.entries.iter().filter(|c| c.name == name);
        let found = matches
            .next()
            .ok_or_else(|| ConfigError::MissingCredential(name.to_string()))?;
        if matches.next().is_some() {
            return Err(ConfigError::AmbiguousCredential(name.to_string()));
        }
        Ok(found.value.clone())
    }

    /// Create credentials from environment variables
    ///
    /// Each name is read from `{PREFIX}_{NAME}` where the name is converted
    /// to upper snake case, e.g. `publicKey` for prefix `bitbay` is read
    /// from `BITBAY_PUBLIC_KEY`. Names whose variable is unset are skipped;
    /// `require` reports them when an adapter needs them.
    pub fn from_env(exchange_prefix: &str, names: &[&str]) -> Self {
        let entries = names
            .iter()
            .filter_map(|name| {
                let var = env_var_name(exchange_prefix, name);
                env::var(&var).ok().map(|value| Credential::new(*name, value))
            })
            .collect();
        Self { entries }
    }

    /// Create credentials from a .env file and environment variables
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file(exchange_prefix: &str, names: &[&str]) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(exchange_prefix, names, ".env")
    }

    /// Create credentials from a specific .env file path
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(
        exchange_prefix: &str,
        names: &[&str],
        env_file_path: &str,
    ) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(()) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // No .env file, continue with system env vars
            }
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Ok(Self::from_env(exchange_prefix, names))
    }
}

impl FromIterator<Credential> for Credentials {
    fn from_iter<I: IntoIterator<Item = Credential>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn env_var_name(prefix: &str, name: &str) -> String {
    let mut var = prefix.to_uppercase();
    var.push('_');
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() && i > 0 {
            var.push('_');
        }
        var.push(ch.to_ascii_uppercase());
    }
    var
}

/// Decoding settings shared by every adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// `chrono` format used when an exchange reports a textual timestamp
    /// rather than epoch milliseconds. Parsed as UTC.
    pub date_format: String,
}

impl CodecConfig {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new("%Y-%m-%d %H:%M:%S")
    }
}

/// Log verbosity, passed explicitly to the transport and the subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verbosity {
    #[default]
    Normal,
    /// Log every request and response at debug level
    Debug,
}

impl Verbosity {
    /// Read `{VAR}`; any of `1`, `true`, `yes` selects `Debug`
    pub fn from_env(var: &str) -> Self {
        match env::var(var).map(|v| v.to_ascii_lowercase()) {
            Ok(v) if matches!(v.as_str(), "1" | "true" | "yes") => Self::Debug,
            _ => Self::Normal,
        }
    }

    pub fn is_debug(self) -> bool {
        self == Self::Debug
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Credential '{0}' is supplied more than once")]
    AmbiguousCredential(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
