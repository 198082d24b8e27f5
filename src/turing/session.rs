//! Revision C serial session
//!
//! Owns the serial link exclusively and walks the device through its fixed
//! handshake: HELLO (drain 23 response bytes), STOP_VIDEO, STOP_MEDIA,
//! QUERY_STATUS. Any write/read failure during the handshake is fatal and
//! leaves no open session behind.
//!
//! Not designed for concurrent use; callers serialize their own access
//! (one writer thread per session). An in-flight transfer cannot be
//! aborted — callers needing cancellation close the session and treat the
//! resulting I/O error as expected.

use std::io;

use log::{debug, trace};

use crate::error::{ProtocolError, Result};
use crate::turing::command::{self, Command};
use crate::turing::encoder::{
    chunk_full_frame, convert_frame, encode_incremental, PANEL_HEIGHT, PANEL_WIDTH,
};

/// Exact length of the HELLO handshake response.
pub const HELLO_RESPONSE_LEN: usize = 23;

/// Scratch size for draining command acknowledgements.
const RESPONSE_BUF_LEN: usize = 1024;

/// Byte transport under a session.
///
/// The `serial` feature provides a serialport-backed implementation; tests
/// inject scripted links.
pub trait SerialLink {
    /// Write the whole buffer.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Single bounded read; may return fewer bytes than the buffer holds.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Drop any buffered input and output.
    fn discard_buffers(&mut self) -> io::Result<()>;
}

/// An open Revision C session.
///
/// `Closed -> open() -> Opened -> close() -> Closed`: a value of this type
/// only exists after a successful handshake, and [`close`](Self::close) is
/// idempotent.
#[derive(Debug)]
pub struct LinkSession<T: SerialLink> {
    link: Option<T>,
    update_sequence: u32,
    panel_width: u16,
    panel_height: u16,
}

impl<T: SerialLink> LinkSession<T> {
    /// Open a session on the observed 800x480 hardware.
    pub fn open(link: T) -> Result<Self> {
        Self::open_with_resolution(link, PANEL_WIDTH, PANEL_HEIGHT)
    }

    /// Open a session against a panel of the given native resolution.
    ///
    /// Performs the handshake in strict order; on any failure the link is
    /// dropped and the session never exists.
    pub fn open_with_resolution(mut link: T, width: u16, height: u16) -> Result<Self> {
        let hs = |step: &'static str| {
            move |e: io::Error| ProtocolError::HandshakeFailed {
                step,
                detail: e.to_string(),
            }
        };

        link.discard_buffers().map_err(hs("discard buffers"))?;

        debug!("handshake: HELLO");
        link.write_all(&command::build(Command::Hello, &[]))
            .map_err(hs("HELLO"))?;
        let mut hello = [0u8; HELLO_RESPONSE_LEN];
        read_exact(&mut link, &mut hello).map_err(hs("HELLO response"))?;

        debug!("handshake: STOP_VIDEO");
        link.write_all(&command::build(Command::StopVideo, &[]))
            .map_err(hs("STOP_VIDEO"))?;

        debug!("handshake: STOP_MEDIA");
        link.write_all(&command::build(Command::StopMedia, &[]))
            .map_err(hs("STOP_MEDIA"))?;
        drain_response(&mut link).map_err(hs("STOP_MEDIA response"))?;

        debug!("handshake: QUERY_STATUS");
        link.write_all(&command::build(Command::QueryStatus, &[]))
            .map_err(hs("QUERY_STATUS"))?;
        drain_response(&mut link).map_err(hs("QUERY_STATUS response"))?;

        debug!("session opened, panel {width}x{height}");
        Ok(Self {
            link: Some(link),
            update_sequence: 0,
            panel_width: width,
            panel_height: height,
        })
    }

    /// Whether the session still holds its link.
    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    /// Current incremental update counter.
    pub fn update_sequence(&self) -> u32 {
        self.update_sequence
    }

    /// Set the backlight level (0-255).
    pub fn set_brightness(&mut self, level: u8) -> Result<()> {
        self.send(Command::SetBrightness, &[level])
    }

    /// Restart the device.
    pub fn reset(&mut self) -> Result<()> {
        self.send(Command::Restart, &[])
    }

    /// Turn the screen on.
    pub fn screen_on(&mut self) -> Result<()> {
        self.send(Command::TurnOn, &[])
    }

    /// Turn the screen off.
    pub fn screen_off(&mut self) -> Result<()> {
        self.send(Command::TurnOff, &[])
    }

    /// Push an OPTIONS payload (orientation/configuration bytes supplied
    /// by the caller).
    pub fn send_options(&mut self, payload: &[u8]) -> Result<()> {
        self.send(Command::Options, payload)
    }

    /// Push a rectangle of RGB565 pixels.
    ///
    /// A rectangle covering the whole panel takes the full-frame path and
    /// resets the update counter; anything smaller is sent as an
    /// incremental update and increments it.
    pub fn display_bitmap(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels: &[u16],
    ) -> Result<()> {
        let full =
            x == 0 && y == 0 && width == self.panel_width && height == self.panel_height;
        if full {
            self.display_full_frame(pixels)
        } else {
            self.display_partial(x, y, width, height, pixels)
        }
    }

    fn display_full_frame(&mut self, pixels: &[u16]) -> Result<()> {
        trace!("full-frame update, {} pixels", pixels.len());
        let chunked = chunk_full_frame(&convert_frame(pixels));
        self.send(Command::DisplayBitmap, &[])?;
        self.write_payload(&chunked)?;
        self.read_ack("DISPLAY_BITMAP response")?;
        self.send(Command::QueryStatus, &[])?;
        self.read_ack("QUERY_STATUS response")?;
        self.update_sequence = 0;
        Ok(())
    }

    fn display_partial(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels: &[u16],
    ) -> Result<()> {
        trace!(
            "incremental update {width}x{height}+{x}+{y}, sequence {}",
            self.update_sequence
        );
        let payload = encode_incremental(
            x,
            y,
            width,
            height,
            pixels,
            self.panel_width,
            self.update_sequence,
        );
        self.send(Command::UpdateBitmap, &payload.header)?;
        self.write_payload(&payload.data)?;
        self.read_ack("UPDATE_BITMAP response")?;
        self.send(Command::QueryStatus, &[])?;
        self.read_ack("QUERY_STATUS response")?;
        self.update_sequence += 1;
        Ok(())
    }

    /// Close the serial link. Idempotent.
    pub fn close(&mut self) {
        if self.link.take().is_some() {
            debug!("session closed");
        }
    }

    fn send(&mut self, cmd: Command, payload: &[u8]) -> Result<()> {
        let frame = command::build(cmd, payload);
        self.link_mut()?
            .write_all(&frame)
            .map_err(|e| ProtocolError::TransportWriteFailed(format!("{cmd:?}: {e}")))
    }

    /// Raw write with no command prefix or padding.
    fn write_payload(&mut self, data: &[u8]) -> Result<()> {
        self.link_mut()?
            .write_all(data)
            .map_err(|e| ProtocolError::TransportWriteFailed(format!("bitmap payload: {e}")))
    }

    fn read_ack(&mut self, context: &str) -> Result<()> {
        let link = self.link_mut()?;
        drain_response(link)
            .map(|_| ())
            .map_err(|e| ProtocolError::TransportReadFailed(format!("{context}: {e}")))
    }

    fn link_mut(&mut self) -> Result<&mut T> {
        self.link
            .as_mut()
            .ok_or_else(|| ProtocolError::TransportWriteFailed("session closed".to_string()))
    }
}

/// Fill the buffer completely, failing on end-of-stream.
fn read_exact<T: SerialLink>(link: &mut T, buf: &mut [u8]) -> io::Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = link.read(&mut buf[filled..])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("device closed after {filled} of {} bytes", buf.len()),
            ));
        }
        filled += n;
    }
    Ok(())
}

/// Read one acknowledgement of unspecified length; zero bytes means the
/// device did not answer.
fn drain_response<T: SerialLink>(link: &mut T) -> io::Result<usize> {
    let mut buf = [0u8; RESPONSE_BUF_LEN];
    let n = link.read(&mut buf)?;
    if n == 0 {
        return Err(io::Error::new(io::ErrorKind::TimedOut, "no response"));
    }
    trace!("drained {n} response bytes");
    Ok(n)
}
