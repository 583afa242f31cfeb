//! Numeric event codes reported by clients.
//!
//! Both codes are open sets: clients may send values this crate has no name
//! for, and those values must survive a decode/encode cycle untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of lifecycle event carried in an `<event eventtype="...">` record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(pub i32);

impl EventType {
    /// Unknown or unspecified event.
    pub const UNKNOWN: Self = Self(0);
    /// Payload download finished.
    pub const DOWNLOAD_COMPLETE: Self = Self(1);
    /// Fresh install finished.
    pub const INSTALL_COMPLETE: Self = Self(2);
    /// Update finished.
    pub const UPDATE_COMPLETE: Self = Self(3);
    /// Application was removed.
    pub const UNINSTALL: Self = Self(4);
    /// Payload download started.
    pub const DOWNLOAD_STARTED: Self = Self(5);
    /// Installer started.
    pub const INSTALL_STARTED: Self = Self(6);
    /// Update payload download started.
    pub const UPDATE_DOWNLOAD_STARTED: Self = Self(13);
    /// Update payload download finished.
    pub const UPDATE_DOWNLOAD_FINISHED: Self = Self(14);
    /// First boot after an update was applied.
    pub const REBOOTED_AFTER_UPDATE: Self = Self(54);
}

impl From<i32> for EventType {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Outcome carried in an `<event eventresult="...">` record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventResult(pub i32);

impl EventResult {
    /// The step failed.
    pub const ERROR: Self = Self(0);
    /// The step succeeded.
    pub const SUCCESS: Self = Self(1);
    /// The step succeeded and a reboot is pending.
    pub const SUCCESS_REBOOT: Self = Self(2);
    /// The step was cancelled.
    pub const CANCELLED: Self = Self(4);
    /// The installer failed with a platform-specific error.
    pub const ERROR_INSTALLER_OTHER: Self = Self(6);
    /// The client decided no update was needed.
    pub const NO_UPDATE: Self = Self(7);
    /// The update was deferred by policy.
    pub const UPDATE_DEFERRED: Self = Self(9);
}

impl From<i32> for EventResult {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for EventResult {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}
