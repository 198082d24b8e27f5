//! GetPanelInfo response parsing
//!
//! The device answers a GetPanelInfo frame with a 100-byte buffer: the
//! standard 20-byte header followed by an 80-byte payload of fixed-offset
//! fields, all little-endian:
//!
//! | Offset | Size | Field |
//! |--------|------|-------------------------|
//! | 0      | 2    | firmware version        |
//! | 2      | 1    | panel-link version      |
//! | 3      | 1    | status-link version     |
//! | 4      | 1    | platform id             |
//! | 5      | 1    | model code              |
//! | 6      | 64   | serial number (ASCII)   |
//! | 70     | 2    | resolution X            |
//! | 72     | 2    | resolution Y            |
//! | 74     | 4    | storage size (KB)       |
//! | 78     | 1    | max brightness          |
//! | 79     | 1    | current brightness      |

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;

use crate::error::{ProtocolError, Result};
use crate::statuslink::catalog::{self, PanelModel};
use crate::statuslink::frame::{MessageType, HEADER_LEN, PROTOCOL_TAG};

/// Exact size of a GetPanelInfo response on the wire.
pub const INFO_RESPONSE_LEN: usize = 100;

/// Size of the info payload following the header.
const INFO_PAYLOAD_LEN: usize = 80;

/// Width of the fixed serial-number field.
const SERIAL_FIELD_LEN: usize = 64;

/// Parsed device metadata from a GetPanelInfo response.
///
/// Constructed once per successful query and immutable afterwards; the
/// query layer caches it briefly keyed by device path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelInfo {
    pub firmware_version: u16,
    pub panel_link_version: u8,
    pub status_link_version: u8,
    pub platform: u8,
    /// Raw model code byte as reported by the device.
    pub model_code: u8,
    /// Catalog entry for the model code; `None` for codes outside the
    /// known range (the rest of the record is still valid).
    pub model: Option<&'static PanelModel>,
    /// Serial number, NUL- and whitespace-trimmed.
    pub serial_number: String,
    pub resolution_x: u16,
    pub resolution_y: u16,
    pub storage_kb: u32,
    pub max_brightness: u8,
    pub current_brightness: u8,
}

impl PanelInfo {
    /// Display name for the panel model, or a placeholder for codes the
    /// catalog does not know.
    pub fn model_name(&self) -> &'static str {
        self.model.map(|m| m.name).unwrap_or("model unknown")
    }
}

/// Parse a GetPanelInfo response buffer into a [`PanelInfo`].
///
/// Pure function: verifies the protocol tag and message type, then decodes
/// the fixed-offset payload fields. An unrecognized model code yields
/// `model: None` rather than a failure.
pub fn parse_info_response(buf: &[u8]) -> Result<PanelInfo> {
    if buf.len() < INFO_RESPONSE_LEN {
        return Err(ProtocolError::MalformedResponse(format!(
            "info response too short: {} bytes, need {INFO_RESPONSE_LEN}",
            buf.len()
        )));
    }
    if &buf[..PROTOCOL_TAG.len()] != PROTOCOL_TAG {
        return Err(ProtocolError::ProtocolMismatch(
            "info response missing protocol tag".to_string(),
        ));
    }
    if buf[12] != MessageType::GetPanelInfo as u8 {
        return Err(ProtocolError::ProtocolMismatch(format!(
            "info response has message type {}, expected {}",
            buf[12],
            MessageType::GetPanelInfo as u8
        )));
    }

    let payload = &buf[HEADER_LEN..HEADER_LEN + INFO_PAYLOAD_LEN];
    let mut cur = Cursor::new(payload);
    let truncated =
        |_| ProtocolError::MalformedResponse("info payload truncated".to_string());

    let firmware_version = cur.read_u16::<LittleEndian>().map_err(truncated)?;
    let panel_link_version = cur.read_u8().map_err(truncated)?;
    let status_link_version = cur.read_u8().map_err(truncated)?;
    let platform = cur.read_u8().map_err(truncated)?;
    let model_code = cur.read_u8().map_err(truncated)?;

    let mut serial_raw = [0u8; SERIAL_FIELD_LEN];
    cur.read_exact(&mut serial_raw).map_err(truncated)?;
    let serial_number = trim_serial(&serial_raw);

    let resolution_x = cur.read_u16::<LittleEndian>().map_err(truncated)?;
    let resolution_y = cur.read_u16::<LittleEndian>().map_err(truncated)?;
    let storage_kb = cur.read_u32::<LittleEndian>().map_err(truncated)?;
    let max_brightness = cur.read_u8().map_err(truncated)?;
    let current_brightness = cur.read_u8().map_err(truncated)?;

    Ok(PanelInfo {
        firmware_version,
        panel_link_version,
        status_link_version,
        platform,
        model_code,
        model: catalog::lookup(model_code),
        serial_number,
        resolution_x,
        resolution_y,
        storage_kb,
        max_brightness,
        current_brightness,
    })
}

/// Strip NUL padding and surrounding whitespace from the fixed serial field.
fn trim_serial(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a well-formed 100-byte info response for tests.
    fn sample_response(model_code: u8, serial: &[u8]) -> Vec<u8> {
        let mut payload = vec![0u8; INFO_PAYLOAD_LEN];
        payload[0..2].copy_from_slice(&0x0203u16.to_le_bytes()); // firmware 2.3
        payload[2] = 1; // panel-link version
        payload[3] = 2; // status-link version
        payload[4] = 7; // platform
        payload[5] = model_code;
        payload[6..6 + serial.len()].copy_from_slice(serial);
        payload[70..72].copy_from_slice(&800u16.to_le_bytes());
        payload[72..74].copy_from_slice(&480u16.to_le_bytes());
        payload[74..78].copy_from_slice(&131072u32.to_le_bytes());
        payload[78] = 100; // max brightness
        payload[79] = 80; // current brightness
        crate::statuslink::frame::encode(MessageType::GetPanelInfo, &payload)
    }

    #[test]
    fn test_parse_known_model() {
        let buf = sample_response(0, b"ABC123");
        let info = parse_info_response(&buf).unwrap();
        assert_eq!(info.serial_number, "ABC123");
        assert_eq!(info.model_code, 0);
        assert_eq!(info.model_name(), "StatusLink 5\"");
        assert_eq!((info.resolution_x, info.resolution_y), (800, 480));
        assert_eq!(info.storage_kb, 131072);
        assert_eq!(info.max_brightness, 100);
        assert_eq!(info.current_brightness, 80);
        assert_eq!(info.firmware_version, 0x0203);
    }

    #[test]
    fn test_unknown_model_degrades() {
        let buf = sample_response(0xee, b"X");
        let info = parse_info_response(&buf).unwrap();
        assert_eq!(info.model_code, 0xee);
        assert!(info.model.is_none());
        assert_eq!(info.model_name(), "model unknown");
        // Rest of the record is still populated.
        assert_eq!(info.resolution_x, 800);
    }

    #[test]
    fn test_serial_trimming() {
        // Trailing NULs and whitespace are stripped, inner content kept.
        let buf = sample_response(1, b"  SN-42 \0\0");
        let info = parse_info_response(&buf).unwrap();
        assert_eq!(info.serial_number, "SN-42");
    }

    #[test]
    fn test_short_buffer_rejected() {
        let err = parse_info_response(&[0u8; 99]).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedResponse(_)));
    }

    #[test]
    fn test_bad_tag_rejected() {
        let mut buf = sample_response(0, b"ABC");
        buf[0] = b'x';
        let err = parse_info_response(&buf).unwrap_err();
        assert!(matches!(err, ProtocolError::ProtocolMismatch(_)));
    }

    #[test]
    fn test_bad_type_rejected() {
        let mut buf = sample_response(0, b"ABC");
        buf[12] = MessageType::GetTime as u8;
        let err = parse_info_response(&buf).unwrap_err();
        assert!(matches!(err, ProtocolError::ProtocolMismatch(_)));
    }
}
