//! Request document sent by update clients.
//!
//! Attribute fields are prefixed with `@` in their serde names; everything else
//! maps to a child element. Optional attributes are `Option`s so that absence
//! survives a round trip and is not confused with an empty value.

use serde::{Deserialize, Serialize};

use crate::numbers::{int_or_default, optional_int};
use crate::{EventResult, EventType, PROTOCOL_VERSION};

/// Root `<request>` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Protocol revision spoken by the client.
    #[serde(rename = "@protocol")]
    pub protocol: String,
    /// Version of the client agent.
    #[serde(rename = "@version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// What triggered the request (for example `scheduler` or `ondemand`).
    #[serde(
        rename = "@installsource",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub install_source: Option<String>,
    /// Non-zero when the client runs with machine-wide privileges.
    #[serde(
        rename = "@ismachine",
        default,
        deserialize_with = "optional_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_machine: Option<i32>,
    /// Identifier unique to this request.
    #[serde(rename = "@requestid", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Identifier shared by requests of one update session.
    #[serde(rename = "@sessionid", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Marks traffic generated by test harnesses.
    #[serde(rename = "@testsource", default, skip_serializing_if = "Option::is_none")]
    pub test_source: Option<String>,
    /// Stable identifier of the client installation.
    #[serde(rename = "@userid", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Operating system description.
    #[serde(rename = "os", default, skip_serializing_if = "Option::is_none")]
    pub os: Option<Os>,
    /// Application entries, in client order.
    #[serde(rename = "app", default, skip_serializing_if = "Vec::is_empty")]
    pub apps: Vec<AppRequest>,
}

impl Request {
    /// Builds a protocol 3.0 request carrying `apps`.
    #[must_use]
    pub fn new(apps: Vec<AppRequest>) -> Self {
        Self {
            protocol: PROTOCOL_VERSION.to_owned(),
            version: None,
            install_source: None,
            is_machine: None,
            request_id: None,
            session_id: None,
            test_source: None,
            user_id: None,
            os: None,
            apps,
        }
    }
}

/// `<os>` element describing the client platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Os {
    /// Platform family, for example `CoreOS` or `win`.
    #[serde(rename = "@platform", default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Operating system version.
    #[serde(rename = "@version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Service pack or kernel release.
    #[serde(rename = "@sp", default, skip_serializing_if = "Option::is_none")]
    pub service_pack: Option<String>,
    /// CPU architecture.
    #[serde(rename = "@arch", default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

/// One `<app>` entry in a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRequest {
    /// Application identifier.
    #[serde(rename = "@appid")]
    pub id: String,
    /// Currently installed version.
    #[serde(rename = "@version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Version staged for installation, if any.
    #[serde(
        rename = "@nextversion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub next_version: Option<String>,
    /// Client language tag.
    #[serde(rename = "@lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Client brand or distribution tag.
    #[serde(rename = "@client", default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    /// Days since the application was installed.
    #[serde(
        rename = "@installage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub install_age: Option<String>,
    /// Release channel requested by the client.
    #[serde(rename = "@track", default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    /// Identifier of the current boot.
    #[serde(rename = "@bootid", default, skip_serializing_if = "Option::is_none")]
    pub boot_id: Option<String>,
    /// Stable machine identifier.
    #[serde(rename = "@machineid", default, skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<String>,
    /// OEM the image was built for.
    #[serde(rename = "@oem", default, skip_serializing_if = "Option::is_none")]
    pub oem: Option<String>,
    /// Version of the OEM customisations.
    #[serde(
        rename = "@oemversion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub oem_version: Option<String>,
    /// Version the machine was first installed with.
    #[serde(
        rename = "@alephversion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub aleph_version: Option<String>,
    /// Activity ping.
    #[serde(rename = "ping", default, skip_serializing_if = "Option::is_none")]
    pub ping: Option<PingRequest>,
    /// Update-check marker; present when the client wants an update decision.
    #[serde(
        rename = "updatecheck",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub update_check: Option<UpdateRequest>,
    /// Install and update outcomes reported since the last request.
    #[serde(rename = "event", default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventRequest>,
}

impl AppRequest {
    /// Builds an entry for application `id` at `version`.
    #[must_use]
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: Some(version.into()),
            ..Self::default()
        }
    }

    /// Adds an empty update-check marker.
    #[must_use]
    pub fn with_update_check(mut self) -> Self {
        self.update_check = Some(UpdateRequest::default());
        self
    }

    /// Adds an activity ping.
    #[must_use]
    pub const fn with_ping(mut self, ping: PingRequest) -> Self {
        self.ping = Some(ping);
        self
    }

    /// Appends an event record.
    #[must_use]
    pub fn with_event(mut self, event: EventRequest) -> Self {
        self.events.push(event);
        self
    }

    /// Returns `true` when the client asked for an update decision.
    #[must_use]
    pub const fn wants_update_check(&self) -> bool {
        self.update_check.is_some()
    }
}

/// `<updatecheck>` marker inside a request entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Restricts offered versions to those starting with this prefix.
    #[serde(
        rename = "@targetversionprefix",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_version_prefix: Option<String>,
}

/// `<ping>` element inside a request entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingRequest {
    /// Whether the application was used since the previous ping.
    #[serde(
        rename = "@active",
        default,
        deserialize_with = "optional_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub active: Option<i32>,
    /// Days since the previous active ping; `-1` when never reported.
    #[serde(
        rename = "@a",
        default,
        deserialize_with = "optional_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_active_days: Option<i32>,
    /// Days since the previous successful ping.
    #[serde(
        rename = "@r",
        default,
        deserialize_with = "optional_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_report_days: Option<i32>,
    /// Client-defined ping status.
    #[serde(
        rename = "@status",
        default,
        deserialize_with = "optional_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<i32>,
}

/// `<event>` record inside a request entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRequest {
    /// What happened.
    #[serde(rename = "@eventtype", default, deserialize_with = "int_or_default")]
    pub event_type: EventType,
    /// How it ended.
    #[serde(rename = "@eventresult", default, deserialize_with = "int_or_default")]
    pub result: EventResult,
    /// Version the client ran before the event.
    #[serde(
        rename = "@previousversion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub previous_version: Option<String>,
    /// Client-defined error code.
    #[serde(rename = "@errorcode", default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl EventRequest {
    /// Builds an event record.
    #[must_use]
    pub const fn new(event_type: EventType, result: EventResult) -> Self {
        Self {
            event_type,
            result,
            previous_version: None,
            error_code: None,
        }
    }
}
