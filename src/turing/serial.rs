//! serialport-backed link for Revision C panels
//!
//! Opens the port at 115200-8-N-1 with DTR and RTS asserted, the settings
//! the Revision C controller requires before it will answer a HELLO.

use std::io::{Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::error::{ProtocolError, Result};
use crate::turing::session::{LinkSession, SerialLink};

/// Fixed link rate for the Revision C controller.
pub const BAUD_RATE: u32 = 115200;

/// Default bound on a single read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// A configured serial port usable as a session link.
pub struct SerialPortLink {
    port: Box<dyn SerialPort>,
}

impl SerialPortLink {
    /// Open and configure the port at `path`.
    pub fn open(path: &str, timeout: Duration) -> Result<Self> {
        let open_err = |detail: String| ProtocolError::HandshakeFailed {
            step: "open port",
            detail,
        };

        let mut port = serialport::new(path, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()
            .map_err(|e| open_err(format!("{path}: {e}")))?;

        port.write_data_terminal_ready(true)
            .map_err(|e| open_err(format!("set DTR: {e}")))?;
        port.write_request_to_send(true)
            .map_err(|e| open_err(format!("set RTS: {e}")))?;

        Ok(Self { port })
    }
}

impl SerialLink for SerialPortLink {
    fn write_all(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.port.write_all(data)?;
        self.port.flush()
    }

    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.port.read(buf)
    }

    fn discard_buffers(&mut self) -> std::io::Result<()> {
        self.port
            .clear(ClearBuffer::All)
            .map_err(std::io::Error::from)
    }
}

/// Open a device path and perform the session handshake in one step.
pub fn open_device(path: &str) -> Result<LinkSession<SerialPortLink>> {
    let link = SerialPortLink::open(path, DEFAULT_TIMEOUT)?;
    LinkSession::open(link)
}
