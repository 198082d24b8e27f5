//! Framebuffer encoding for Revision C bitmap pushes
//!
//! Two hardware paths share the RGB565 source format:
//! - full-frame: every pixel converted to BGRA8888 and split into 249-byte
//!   chunks with a single 0x00 separator between chunks;
//! - incremental: a hex-text run of per-row (offset, width, BGR pixels)
//!   tuples for the dirty rectangle, terminated by `ef69`, re-segmented at
//!   498 hex chars, then decoded to bytes and prefixed with a
//!   size/sequence header.
//!
//! Chunk sizes and separator bytes come from the device's serial receive
//! buffer limits and must be reproduced exactly.

use std::fmt::Write as _;

/// Native panel width of the observed hardware.
pub const PANEL_WIDTH: u16 = 800;

/// Native panel height of the observed hardware.
pub const PANEL_HEIGHT: u16 = 480;

/// Full-frame payload chunk size in bytes.
pub const FULL_FRAME_CHUNK: usize = 249;

/// Hex-stream length beyond which the incremental payload is re-segmented.
const SEGMENT_THRESHOLD: usize = 500;

/// Maximum hex chars per incremental segment.
const SEGMENT_LEN: usize = 498;

/// Fixed incremental-stream trailer.
const STREAM_TRAILER: &str = "ef69";

/// Convert one RGB565 pixel to BGRA8888.
///
/// Each channel is scaled from its native bit depth to 8 bits with a
/// rounding scale-up; alpha is always fully opaque.
pub fn rgb565_to_bgra(pixel: u16) -> [u8; 4] {
    let r5 = (pixel >> 11) & 0x1f;
    let g6 = (pixel >> 5) & 0x3f;
    let b5 = pixel & 0x1f;
    [
        ((b5 as u32 * 255 + 15) / 31) as u8,
        ((g6 as u32 * 255 + 31) / 63) as u8,
        ((r5 as u32 * 255 + 15) / 31) as u8,
        0xff,
    ]
}

/// Convert a run of RGB565 pixels to a BGRA8888 byte stream.
pub fn convert_frame(pixels: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() * 4);
    for &p in pixels {
        out.extend_from_slice(&rgb565_to_bgra(p));
    }
    out
}

/// Split a full-frame payload into 249-byte chunks with a single 0x00
/// byte between consecutive chunks, never after the last.
pub fn chunk_full_frame(data: &[u8]) -> Vec<u8> {
    let chunk_count = data.len().div_ceil(FULL_FRAME_CHUNK);
    let mut out = Vec::with_capacity(data.len() + chunk_count.saturating_sub(1));
    for (i, chunk) in data.chunks(FULL_FRAME_CHUNK).enumerate() {
        if i > 0 {
            out.push(0x00);
        }
        out.extend_from_slice(chunk);
    }
    out
}

/// Encoded incremental ("dirty rectangle") update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePayload {
    /// Payload for the UPDATE_BITMAP command frame: 2-byte size header,
    /// three zero bytes, then the update sequence as 4 bytes big-endian.
    pub header: Vec<u8>,
    /// Decoded pixel stream, written after the command frame.
    pub data: Vec<u8>,
}

/// Encode a sub-rectangle update.
///
/// `pixels` holds the rectangle's RGB565 pixels row by row and must be
/// exactly `width * height` long. `sequence` is the session's current
/// update counter, embedded verbatim in the header.
pub fn encode_incremental(
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    pixels: &[u16],
    panel_width: u16,
    sequence: u32,
) -> UpdatePayload {
    debug_assert_eq!(pixels.len(), width as usize * height as usize);

    // 6 hex offset + 4 hex width + 6 hex per pixel, per row.
    let mut stream =
        String::with_capacity(height as usize * (10 + width as usize * 6) + STREAM_TRAILER.len());
    for row in 0..height {
        let offset = (y + row) as u32 * panel_width as u32 + x as u32;
        let _ = write!(stream, "{offset:06x}");
        let _ = write!(stream, "{width:04x}");
        let row_start = row as usize * width as usize;
        for &pixel in &pixels[row_start..row_start + width as usize] {
            let [b, g, r, _] = rgb565_to_bgra(pixel);
            let _ = write!(stream, "{b:02x}{g:02x}{r:02x}");
        }
    }
    stream.push_str(STREAM_TRAILER);

    let stream = segment_stream(&stream);
    let data = decode_hex(stream.as_bytes());

    let size = (data.len() / 2 + 2) as u16;
    let mut header = Vec::with_capacity(9);
    header.extend_from_slice(&size.to_be_bytes());
    header.extend_from_slice(&[0, 0, 0]);
    header.extend_from_slice(&sequence.to_be_bytes());

    UpdatePayload { header, data }
}

/// Re-chunk a hex stream that exceeds 500 chars into segments of at most
/// 498 chars joined by a literal "00" separator (never after the last).
fn segment_stream(stream: &str) -> String {
    if stream.len() <= SEGMENT_THRESHOLD {
        return stream.to_string();
    }
    let mut out = String::with_capacity(stream.len() + stream.len() / SEGMENT_LEN * 2);
    for (i, segment) in stream.as_bytes().chunks(SEGMENT_LEN).enumerate() {
        if i > 0 {
            out.push_str("00");
        }
        // Segments are slices of an ASCII hex string.
        out.push_str(std::str::from_utf8(segment).unwrap_or_default());
    }
    out
}

/// Decode an internally generated ASCII hex stream to bytes.
fn decode_hex(hex: &[u8]) -> Vec<u8> {
    fn nibble(b: u8) -> u8 {
        match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => 0,
        }
    }
    hex.chunks_exact(2)
        .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1]))
        .collect()
}
