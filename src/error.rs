//! Error taxonomy for the panel protocol stacks
//!
//! Every protocol operation returns a typed result; no operation swallows a
//! transport error. String payloads follow the convention "context: details"
//! where *context* identifies the operation or step (e.g. "claim interface",
//! "read info response") and *details* describes what went wrong.

use thiserror::Error;

/// Errors surfaced by the StatusLink and TuringSmartScreen protocol layers.
///
/// The protocol layer performs zero automatic retries: a transport failure
/// is surfaced once, immediately, and retry policy is the caller's decision.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Protocol tag or message type validation failed on decode.
    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(String),

    /// Transport-level write error, timeout, or short write.
    #[error("transport write failed: {0}")]
    TransportWriteFailed(String),

    /// Transport-level read error, timeout, or short read.
    #[error("transport read failed: {0}")]
    TransportReadFailed(String),

    /// Response buffer too short or fields out of expected range.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A step of the serial session handshake failed; the session stays closed.
    #[error("handshake failed at {step}: {detail}")]
    HandshakeFailed {
        step: &'static str,
        detail: String,
    },

    /// Model code not present in the catalog.
    ///
    /// Non-fatal for info queries: `PanelInfo` degrades to an unknown model
    /// rather than failing the whole record.
    #[error("unsupported device: model code {0} not in catalog")]
    UnsupportedDevice(u8),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
