//! panel-link
//!
//! Protocol drivers for two families of small auxiliary LCD panels:
//!
//! - **StatusLink** (USB): fixed 20-byte frames with an Internet checksum,
//!   a cached GetPanelInfo query, and a static model catalog
//! - **TuringSmartScreen Revision C** (serial): a fixed handshake, padded
//!   command frames, and full-frame or dirty-rectangle bitmap pushes
//!
//! The crate is the bit-exact protocol layer only: it takes composited
//! pixel buffers and rectangles from upstream, speaks each device's wire
//! format, and reports typed success/failure plus device metadata
//! (resolution, model, brightness range). Rendering, device discovery,
//! and configuration persistence live with the caller.
//!
//! Both stacks are blocking: a call occupies the calling thread for one
//! device round trip, bounded by fixed timeouts. StatusLink info queries
//! are additionally serialized through one process-wide lock because the
//! USB transport does not tolerate concurrent claims. No operation
//! retries; a transport failure surfaces once, typed, and retry policy is
//! the caller's.
//!
//! # Example
//!
//! ```no_run
//! use panel_link::turing::{open_device, PANEL_HEIGHT, PANEL_WIDTH};
//!
//! # fn main() -> panel_link::Result<()> {
//! let mut session = open_device("/dev/ttyACM0")?;
//! session.set_brightness(128)?;
//! let frame = vec![0u16; PANEL_WIDTH as usize * PANEL_HEIGHT as usize];
//! session.display_bitmap(0, 0, PANEL_WIDTH, PANEL_HEIGHT, &frame)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod statuslink;
pub mod turing;

pub use error::{ProtocolError, Result};
