//! Wire types and XML codec for the Omaha v3 update-check protocol.
//!
//! Client agents describe their installed applications in a `<request>`
//! document; the server answers with a `<response>` that carries one `<app>`
//! entry per requested application, in the same order. This crate models both
//! documents and converts them to and from XML. It performs no I/O.
//!
//! Decoding is structural: only the elements and attributes the server
//! understands are asserted, and anything else is skipped so newer clients
//! can add fields without breaking older servers.
//!
//! ```rust
//! use omaha_protocol::{AppRequest, Request, codec};
//!
//! let request = Request::new(vec![AppRequest::new("foo", "1.0").with_update_check()]);
//! let xml = codec::encode_request(&request).expect("request encodes");
//! let decoded = codec::decode_request(xml.as_bytes()).expect("request decodes");
//! assert_eq!(decoded, request);
//! ```

pub mod codec;
mod event;
mod lists;
mod numbers;
mod request;
mod response;
mod status;

pub use self::codec::{DecodeError, EncodeError};
pub use self::event::{EventResult, EventType};
pub use self::request::{AppRequest, EventRequest, Os, PingRequest, Request, UpdateRequest};
pub use self::response::{
    Action, AppResponse, DayStart, EventResponse, Manifest, Package, PingResponse, Response,
    Update, UpdateResponse, Url,
};
pub use self::status::{AppStatus, UpdateStatus};

/// The only protocol revision the server speaks.
pub const PROTOCOL_VERSION: &str = "3.0";
