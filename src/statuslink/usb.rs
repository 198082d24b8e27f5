//! rusb-backed StatusLink transport
//!
//! Wraps an already-opened `rusb::DeviceHandle` as a [`UsbTransport`].
//! Device discovery and opening stay with the caller; this adapter only
//! maps claim + bulk transfers onto the injected handle.

use std::io;
use std::time::Duration;

use rusb::{DeviceHandle, GlobalContext};

use crate::statuslink::query::UsbTransport;

/// Bulk out endpoint used for command frames.
pub const ENDPOINT_OUT: u8 = 0x01;

/// Bulk in endpoint used for responses.
pub const ENDPOINT_IN: u8 = 0x81;

/// StatusLink device handle over libusb.
pub struct UsbPanelHandle {
    handle: DeviceHandle<GlobalContext>,
    path: String,
}

impl UsbPanelHandle {
    /// Wrap an opened handle. `path` should be a stable bus identifier
    /// (e.g. "usb:1-4"); it keys the info cache.
    pub fn new(handle: DeviceHandle<GlobalContext>, path: impl Into<String>) -> Self {
        Self {
            handle,
            path: path.into(),
        }
    }
}

fn usb_err(e: rusb::Error) -> io::Error {
    match e {
        rusb::Error::Timeout => io::Error::new(io::ErrorKind::TimedOut, e),
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}

impl UsbTransport for UsbPanelHandle {
    fn path(&self) -> &str {
        &self.path
    }

    fn claim(&mut self) -> io::Result<()> {
        self.handle.set_active_configuration(1).map_err(usb_err)?;
        self.handle.claim_interface(0).map_err(usb_err)
    }

    fn write(&mut self, data: &[u8], timeout: Duration) -> io::Result<usize> {
        self.handle
            .write_bulk(ENDPOINT_OUT, data, timeout)
            .map_err(usb_err)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        self.handle
            .read_bulk(ENDPOINT_IN, buf, timeout)
            .map_err(usb_err)
    }
}
