use crate::core::types::ExchangeId;
use std::fmt;
use thiserror::Error;

/// One code reported by an exchange inside a failure envelope, paired with
/// the adapter's description for it when the code is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    pub code: String,
    pub description: Option<&'static str>,
}

impl ReportedError {
    /// Resolve `code` against a static code table. Unknown codes are kept
    /// as-is with no description.
    pub fn lookup(code: impl Into<String>, table: &[(&str, &'static str)]) -> Self {
        let code = code.into();
        let description = table
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, description)| *description);
        Self { code, description }
    }
}

impl fmt::Display for ReportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.description {
            Some(description) => write!(f, "{} ({})", self.code, description),
            None => write!(f, "{} (unrecognized error code)", self.code),
        }
    }
}

/// Broad classification of a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Decode,
    Business,
    Configuration,
}

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Transport error: {message} (status: {}, body: {})", display_status(.status), display_body(.body))]
    Transport {
        status: Option<u16>,
        body: Option<String>,
        message: String,
    },

    #[error("Malformed response: {diagnostic}; raw body: {body}")]
    Decode { body: String, diagnostic: String },

    #[error("{exchange} reported failure: {}", join_reported(.errors))]
    Business {
        exchange: ExchangeId,
        errors: Vec<ReportedError>,
    },

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),
}

impl ExchangeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. } | Self::AuthError(_) | Self::SerializationError(_) => {
                FailureKind::Transport
            }
            Self::Decode { .. } => FailureKind::Decode,
            Self::Business { .. } => FailureKind::Business,
            Self::ConfigError(_) => FailureKind::Configuration,
        }
    }

    /// Whether a retry of the same request could succeed: network failures,
    /// server errors and rate limiting.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { status: None, .. } => true,
            Self::Transport {
                status: Some(status),
                ..
            } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }

    pub(crate) fn network(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            body: None,
            message: message.into(),
        }
    }

    pub(crate) fn decode(body: &str, diagnostic: impl fmt::Display) -> Self {
        Self::Decode {
            body: body.to_string(),
            diagnostic: diagnostic.to_string(),
        }
    }
}

#[allow(clippy::ref_option)]
fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "<none>".to_string(), |s| s.to_string())
}

#[allow(clippy::ref_option)]
fn display_body(body: &Option<String>) -> &str {
    body.as_deref().unwrap_or("<none>")
}

fn join_reported(errors: &[ReportedError]) -> String {
    if errors.is_empty() {
        return "no error codes given".to_string();
    }
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
