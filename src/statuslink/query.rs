//! Device info query with short-TTL caching
//!
//! Retrieves [`PanelInfo`] from an opened StatusLink device handle:
//! - claims configuration 1 / interface 0,
//! - writes a GetPanelInfo frame, reads exactly 100 response bytes,
//! - parses the response and caches it for 2 seconds keyed by device path.
//!
//! All claim/write/read sequences in the process are serialized through a
//! single shared lock: concurrent claims against the same class of device
//! are unsafe at the USB level. The cache lets most callers skip the lock
//! entirely.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::error::{ProtocolError, Result};
use crate::statuslink::frame::{self, MessageType};
use crate::statuslink::response::{parse_info_response, PanelInfo, INFO_RESPONSE_LEN};

/// How long a successful query result stays valid.
pub const CACHE_TTL: Duration = Duration::from_secs(2);

/// Bound on a single transport write.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Bound on a single transport read.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Process-wide gate: at most one USB claim/transfer sequence at a time,
/// however many `DeviceInfoQuery` values exist.
static USB_GATE: Mutex<()> = Mutex::new(());

/// Injected USB device handle.
///
/// Device discovery and opening are the caller's concern; the query layer
/// only needs claim + bulk write/read with bounded timeouts.
pub trait UsbTransport {
    /// Stable identifier for the device (bus path), used as the cache key.
    fn path(&self) -> &str;

    /// Claim configuration 1 / interface 0 ahead of any transfer.
    fn claim(&mut self) -> io::Result<()>;

    /// Write to the device's out endpoint, returning bytes written.
    fn write(&mut self, data: &[u8], timeout: Duration) -> io::Result<usize>;

    /// Read from the device's in endpoint, returning bytes read.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;
}

/// Time source for cache expiry, injectable so tests can use a fake clock.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock backed [`Clock`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    info: PanelInfo,
    stored_at: Instant,
}

/// Cached GetPanelInfo query against injected device handles.
pub struct DeviceInfoQuery<C: Clock = SystemClock> {
    clock: C,
    ttl: Duration,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl DeviceInfoQuery<SystemClock> {
    /// Query with the wall clock and the standard 2-second TTL.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for DeviceInfoQuery<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> DeviceInfoQuery<C> {
    /// Query with an injected clock (fake clocks in tests).
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            ttl: CACHE_TTL,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch panel info, preferring a fresh cache entry over the device.
    ///
    /// On a cache miss the process-wide USB gate is taken, the cache is
    /// re-checked (another caller may have just populated it), and only
    /// then does the claim/write/read sequence run. Failures are never
    /// cached; the next call re-queries.
    pub fn query<T: UsbTransport>(&self, device: &mut T) -> Result<PanelInfo> {
        let path = device.path().to_string();
        if let Some(info) = self.cache_get(&path) {
            trace!("panel info cache hit for {path}");
            return Ok(info);
        }

        let _gate = USB_GATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        // A queued caller may find the cache freshly populated by whoever
        // held the gate before it.
        if let Some(info) = self.cache_get(&path) {
            trace!("panel info cache hit for {path} after gate");
            return Ok(info);
        }

        debug!("querying panel info on {path}");
        let info = Self::query_device(device)?;
        self.cache_put(path, info.clone());
        Ok(info)
    }

    /// One claim/write/read round trip, no caching.
    fn query_device<T: UsbTransport>(device: &mut T) -> Result<PanelInfo> {
        device.claim().map_err(|e| {
            ProtocolError::TransportWriteFailed(format!("claim config 1/interface 0: {e}"))
        })?;

        let request = frame::encode(MessageType::GetPanelInfo, &[]);
        let written = device
            .write(&request, WRITE_TIMEOUT)
            .map_err(|e| ProtocolError::TransportWriteFailed(format!("GetPanelInfo: {e}")))?;
        if written != request.len() {
            return Err(ProtocolError::TransportWriteFailed(format!(
                "GetPanelInfo: short write, {written} of {} bytes",
                request.len()
            )));
        }

        let mut buf = [0u8; INFO_RESPONSE_LEN];
        let read = device
            .read(&mut buf, READ_TIMEOUT)
            .map_err(|e| ProtocolError::TransportReadFailed(format!("info response: {e}")))?;
        if read != INFO_RESPONSE_LEN {
            return Err(ProtocolError::TransportReadFailed(format!(
                "info response: short read, {read} of {INFO_RESPONSE_LEN} bytes"
            )));
        }

        parse_info_response(&buf)
    }

    fn cache_get(&self, path: &str) -> Option<PanelInfo> {
        let cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        let entry = cache.get(path)?;
        if self.clock.now().duration_since(entry.stored_at) < self.ttl {
            Some(entry.info.clone())
        } else {
            None
        }
    }

    fn cache_put(&self, path: String, info: PanelInfo) {
        let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        cache.insert(
            path,
            CacheEntry {
                info,
                stored_at: self.clock.now(),
            },
        );
    }
}
