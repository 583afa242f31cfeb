use crate::logging::LogFormat;

/// Default socket address the server listens on.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

/// Default path clients post update requests to.
pub const DEFAULT_UPDATE_PATH: &str = "/v1/update/";

/// Default ceiling on request body size, in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Default exchange timeout in milliseconds. Zero disables the timeout.
pub const DEFAULT_EXCHANGE_TIMEOUT_MS: u64 = 0;

/// Default server name reported in `<response server="...">`.
pub const DEFAULT_SERVER_NAME: &str = "omaha-rs";

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned bind address used where allocation is required (e.g. serde).
#[must_use]
pub fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_owned()
}

/// Owned update path used where allocation is required.
#[must_use]
pub fn default_update_path() -> String {
    DEFAULT_UPDATE_PATH.to_owned()
}

/// Default request body ceiling.
#[must_use]
pub const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default exchange timeout in milliseconds.
#[must_use]
pub const fn default_exchange_timeout_ms() -> u64 {
    DEFAULT_EXCHANGE_TIMEOUT_MS
}

/// Owned server name used where allocation is required.
#[must_use]
pub fn default_server_name() -> String {
    DEFAULT_SERVER_NAME.to_owned()
}

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}
