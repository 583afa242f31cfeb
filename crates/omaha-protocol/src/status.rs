//! Status vocabularies used in responses.
//!
//! The protocol defines a handful of well-known tokens for both the per-app
//! `status` attribute and the `<updatecheck status="...">` attribute. Servers
//! and clients in the wild extend them, so each vocabulary keeps an `Other`
//! variant that carries unrecognised tokens verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of evaluating an application entry as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppStatus {
    /// The application is known and was processed.
    #[default]
    Ok,
    /// The application is restricted for this client.
    Restricted,
    /// The server does not know the application.
    UnknownApplication,
    /// The application identifier is malformed.
    InvalidAppId,
    /// The server failed while evaluating the application.
    InternalError,
    /// Any token not listed above.
    Other(String),
}

impl AppStatus {
    /// Returns the wire token for this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => "ok",
            Self::Restricted => "restricted",
            Self::UnknownApplication => "error-unknownApplication",
            Self::InvalidAppId => "error-invalidAppId",
            Self::InternalError => "error-internal",
            Self::Other(token) => token,
        }
    }

    /// Returns `true` for statuses that signal an error to the client.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.as_str().starts_with("error-")
    }
}

impl From<String> for AppStatus {
    fn from(token: String) -> Self {
        match token.as_str() {
            "ok" => Self::Ok,
            "restricted" => Self::Restricted,
            "error-unknownApplication" => Self::UnknownApplication,
            "error-invalidAppId" => Self::InvalidAppId,
            "error-internal" => Self::InternalError,
            _ => Self::Other(token),
        }
    }
}

impl From<AppStatus> for String {
    fn from(status: AppStatus) -> Self {
        match status {
            AppStatus::Other(token) => token,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for AppStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Outcome of an update check for one application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UpdateStatus {
    /// No update is available.
    #[default]
    NoUpdate,
    /// An update is available and described by the response.
    Ok,
    /// The client operating system is not supported.
    OsNotSupported,
    /// The client speaks an unsupported protocol.
    UnsupportedProtocol,
    /// The client host is not allowed to receive the update.
    PluginRestrictedHost,
    /// The payload hash did not match.
    HashMismatch,
    /// The server failed while evaluating the update check.
    InternalError,
    /// Any token not listed above.
    Other(String),
}

impl UpdateStatus {
    /// Returns the wire token for this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoUpdate => "noupdate",
            Self::Ok => "ok",
            Self::OsNotSupported => "error-osnotsupported",
            Self::UnsupportedProtocol => "error-unsupportedProtocol",
            Self::PluginRestrictedHost => "error-pluginRestrictedHost",
            Self::HashMismatch => "error-hashMismatch",
            Self::InternalError => "error-internal",
            Self::Other(token) => token,
        }
    }

    /// Returns `true` for statuses that signal an error to the client.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.as_str().starts_with("error-")
    }
}

impl From<String> for UpdateStatus {
    fn from(token: String) -> Self {
        match token.as_str() {
            "noupdate" => Self::NoUpdate,
            "ok" => Self::Ok,
            "error-osnotsupported" => Self::OsNotSupported,
            "error-unsupportedProtocol" => Self::UnsupportedProtocol,
            "error-pluginRestrictedHost" => Self::PluginRestrictedHost,
            "error-hashMismatch" => Self::HashMismatch,
            "error-internal" => Self::InternalError,
            _ => Self::Other(token),
        }
    }
}

impl From<UpdateStatus> for String {
    fn from(status: UpdateStatus) -> Self {
        match status {
            UpdateStatus::Other(token) => token,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
