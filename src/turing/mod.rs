//! TuringSmartScreen Revision C serial protocol
//!
//! Command framing with deterministic 250-byte padding, the fixed session
//! handshake, and the dual bitmap paths: full-frame BGRA chunks and
//! incremental hex-encoded dirty-rectangle updates.

pub mod command;
pub mod encoder;
#[cfg(feature = "serial")]
pub mod serial;
pub mod session;

pub use command::{build as build_command, Command, COMMAND_BLOCK};
pub use encoder::{
    chunk_full_frame, convert_frame, encode_incremental, rgb565_to_bgra, UpdatePayload,
    FULL_FRAME_CHUNK, PANEL_HEIGHT, PANEL_WIDTH,
};
#[cfg(feature = "serial")]
pub use serial::{open_device, SerialPortLink, BAUD_RATE};
pub use session::{LinkSession, SerialLink, HELLO_RESPONSE_LEN};
