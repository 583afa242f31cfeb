//! Response document returned by the server.
//!
//! Field order matters: clients expect `<urls>` before `<manifest>`, and
//! `<packages>` before `<actions>`, so the struct layouts below mirror the
//! element order on the wire.

use serde::{Deserialize, Serialize};

use crate::{AppStatus, PROTOCOL_VERSION, UpdateStatus};

/// Root `<response>` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Protocol revision of the response.
    #[serde(rename = "@protocol")]
    pub protocol: String,
    /// Name of the responding server implementation.
    #[serde(rename = "@server", default)]
    pub server: String,
    /// Server clock hint used by clients to align daily pings.
    #[serde(rename = "daystart", default)]
    pub day_start: DayStart,
    /// One entry per request entry, in request order.
    #[serde(rename = "app", default, skip_serializing_if = "Vec::is_empty")]
    pub apps: Vec<AppResponse>,
}

impl Response {
    /// Builds an empty protocol 3.0 response attributed to `server`.
    #[must_use]
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            protocol: PROTOCOL_VERSION.to_owned(),
            server: server.into(),
            day_start: DayStart::default(),
            apps: Vec::new(),
        }
    }
}

/// `<daystart>` element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStart {
    /// Seconds elapsed since midnight on the server clock.
    #[serde(rename = "@elapsed_seconds", default)]
    pub elapsed_seconds: u64,
}

/// One `<app>` entry in a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppResponse {
    /// Identifier echoed from the request entry.
    #[serde(rename = "@appid", default)]
    pub id: String,
    /// Outcome for the application as a whole.
    #[serde(rename = "@status", default)]
    pub status: AppStatus,
    /// Acknowledgement of the request ping.
    #[serde(rename = "ping", default, skip_serializing_if = "Option::is_none")]
    pub ping: Option<PingResponse>,
    /// Answer to the update check.
    #[serde(
        rename = "updatecheck",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub update_check: Option<UpdateResponse>,
    /// One acknowledgement per request event.
    #[serde(rename = "event", default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventResponse>,
}

impl AppResponse {
    /// Builds an entry for `id` with `status` and no children.
    #[must_use]
    pub fn new(id: impl Into<String>, status: AppStatus) -> Self {
        Self {
            id: id.into(),
            status,
            ..Self::default()
        }
    }

    /// Sets an update-check answer carrying only `status`.
    pub fn add_update_check(&mut self, status: UpdateStatus) -> &mut UpdateResponse {
        self.update_check.insert(UpdateResponse::with_status(status))
    }

    /// Acknowledges the request ping.
    pub fn add_ping(&mut self) {
        self.ping = Some(PingResponse::ok());
    }

    /// Acknowledges one request event.
    pub fn add_event(&mut self) {
        self.events.push(EventResponse::ok());
    }
}

/// `<ping>` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    /// Always `ok` from this server.
    #[serde(rename = "@status", default)]
    pub status: String,
}

impl PingResponse {
    /// Builds a successful acknowledgement.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_owned(),
        }
    }
}

/// `<event>` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResponse {
    /// Always `ok` from this server.
    #[serde(rename = "@status", default)]
    pub status: String,
}

impl EventResponse {
    /// Builds a successful acknowledgement.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_owned(),
        }
    }
}

/// `<updatecheck>` answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponse {
    /// Outcome of the check.
    #[serde(rename = "@status", default)]
    pub status: UpdateStatus,
    /// Base locations the client downloads packages from.
    #[serde(
        rename = "urls",
        with = "crate::lists::urls",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub urls: Vec<Url>,
    /// Description of the offered update.
    #[serde(rename = "manifest", default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<Manifest>,
}

impl UpdateResponse {
    /// Builds an answer carrying only `status`.
    #[must_use]
    pub const fn with_status(status: UpdateStatus) -> Self {
        Self {
            status,
            urls: Vec::new(),
            manifest: None,
        }
    }
}

impl From<Update> for UpdateResponse {
    fn from(update: Update) -> Self {
        Self {
            status: UpdateStatus::Ok,
            urls: update.urls,
            manifest: Some(update.manifest),
        }
    }
}

/// An update offered by the decision logic.
///
/// The dispatcher wraps it into an [`UpdateResponse`] with status `ok`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Update {
    /// Base locations for the packages.
    pub urls: Vec<Url>,
    /// Packages and post-install actions.
    pub manifest: Manifest,
}

impl Update {
    /// Builds an update of `version` downloadable from `codebase`.
    #[must_use]
    pub fn new(version: impl Into<String>, codebase: impl Into<String>) -> Self {
        Self {
            urls: vec![Url::new(codebase)],
            manifest: Manifest::new(version),
        }
    }

    /// Appends a package to the manifest.
    #[must_use]
    pub fn with_package(mut self, package: Package) -> Self {
        self.manifest.packages.push(package);
        self
    }

    /// Appends a post-install action to the manifest.
    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        self.manifest.actions.push(action);
        self
    }
}

/// `<url>` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Url {
    /// Base URL; package names are appended to it.
    #[serde(rename = "@codebase", default)]
    pub codebase: String,
}

impl Url {
    /// Builds a URL entry.
    #[must_use]
    pub fn new(codebase: impl Into<String>) -> Self {
        Self {
            codebase: codebase.into(),
        }
    }
}

/// `<manifest>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Version being offered.
    #[serde(rename = "@version", default)]
    pub version: String,
    /// Payload files.
    #[serde(
        rename = "packages",
        with = "crate::lists::packages",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub packages: Vec<Package>,
    /// Steps the client runs around installation.
    #[serde(
        rename = "actions",
        with = "crate::lists::actions",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub actions: Vec<Action>,
}

impl Manifest {
    /// Builds an empty manifest for `version`.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            packages: Vec::new(),
            actions: Vec::new(),
        }
    }
}

/// `<package>` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Base64 SHA-1 digest of the payload.
    #[serde(rename = "@hash", default)]
    pub sha1: String,
    /// File name relative to the codebase.
    #[serde(rename = "@name", default)]
    pub name: String,
    /// Payload size in bytes.
    #[serde(rename = "@size", default)]
    pub size: u64,
    /// Whether the client must install this package.
    #[serde(rename = "@required", default)]
    pub required: bool,
    /// Base64 SHA-256 digest of the payload.
    #[serde(
        rename = "@hash_sha256",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sha256: Option<String>,
}

impl Package {
    /// Builds a required package entry.
    #[must_use]
    pub fn new(name: impl Into<String>, sha1: impl Into<String>, size: u64) -> Self {
        Self {
            sha1: sha1.into(),
            name: name.into(),
            size,
            required: true,
            sha256: None,
        }
    }
}

/// `<action>` entry.
///
/// The capitalised attribute names are extensions understood by
/// `update_engine` clients and are reproduced as they appear on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Trigger, for example `postinstall`.
    #[serde(rename = "@event", default)]
    pub event: String,
    /// Human-readable version shown to users.
    #[serde(
        rename = "@DisplayVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_version: Option<String>,
    /// Base64 SHA-256 digest of the payload.
    #[serde(rename = "@sha256", default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Whether the action requires administrator rights.
    #[serde(rename = "@needsadmin", default)]
    pub needs_admin: bool,
    /// Whether the payload is a delta against the installed version.
    #[serde(rename = "@IsDeltaPayload", default)]
    pub is_delta_payload: bool,
    /// Disables client-side download backoff.
    #[serde(
        rename = "@DisablePayloadBackoff",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub disable_payload_backoff: Option<bool>,
    /// Failures tolerated per URL before the client moves on.
    #[serde(
        rename = "@MaxFailureCountPerUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_failure_count_per_url: Option<u32>,
    /// Signature over the payload metadata.
    #[serde(
        rename = "@MetadataSignatureRsa",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata_signature_rsa: Option<String>,
    /// Size of the payload metadata in bytes.
    #[serde(
        rename = "@MetadataSize",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata_size: Option<String>,
    /// Deadline after which the update is forced.
    #[serde(rename = "@deadline", default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    /// Link to release notes.
    #[serde(rename = "@MoreInfo", default, skip_serializing_if = "Option::is_none")]
    pub more_info: Option<String>,
    /// Whether the client should prompt before installing.
    #[serde(rename = "@Prompt", default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<bool>,
}

impl Action {
    /// Builds an action for `event` with every optional field unset.
    #[must_use]
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            ..Self::default()
        }
    }
}
