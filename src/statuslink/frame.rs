//! StatusLink frame construction and parsing
//!
//! Frame format (20-byte header + variable payload):
//! - TAG (11 bytes): ASCII `"STATUS-LINK"`
//! - VERSION (1 byte): always 1
//! - TYPE (1 byte): message type identifier
//! - RESERVED (1 byte): always 0
//! - SEQUENCE (2 bytes LE): currently always 0
//! - LENGTH (2 bytes LE): header + payload size
//! - CHECKSUM (2 bytes LE): one's-complement 16-bit sum over bytes [0, 18)
//!
//! The checksum covers exactly the first 18 header bytes, never the payload,
//! and is written only after every other byte is finalized.

use crate::error::{ProtocolError, Result};

/// Fixed ASCII protocol tag at the start of every frame.
pub const PROTOCOL_TAG: &[u8; 11] = b"STATUS-LINK";

/// Protocol version carried in byte 11.
pub const PROTOCOL_VERSION: u8 = 1;

/// Fixed header size in bytes.
pub const HEADER_LEN: usize = 20;

/// Number of leading header bytes covered by the checksum.
const CHECKSUM_SPAN: usize = 18;

/// Byte offset of the checksum field within the header.
const CHECKSUM_OFFSET: usize = 18;

/// StatusLink message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    GetPanelInfo = 1,
    PanelLinkReset = 2,
    SetBacklight = 3,
    PushStorage = 4,
    GetTime = 5,
    SetTime = 6,
}

impl MessageType {
    /// Map a wire byte back to a message type.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(MessageType::GetPanelInfo),
            2 => Some(MessageType::PanelLinkReset),
            3 => Some(MessageType::SetBacklight),
            4 => Some(MessageType::PushStorage),
            5 => Some(MessageType::GetTime),
            6 => Some(MessageType::SetTime),
            _ => None,
        }
    }
}

/// A decoded StatusLink frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub msg_type: MessageType,
    pub payload: Vec<u8>,
}

/// Build a complete frame for the given message type and payload.
///
/// The header is laid out field by field, the payload appended, and the
/// checksum computed last over bytes [0, 18).
pub fn encode(msg_type: MessageType, payload: &[u8]) -> Vec<u8> {
    let total_len = HEADER_LEN + payload.len();
    let mut frame = Vec::with_capacity(total_len);

    frame.extend_from_slice(PROTOCOL_TAG);
    frame.push(PROTOCOL_VERSION);
    frame.push(msg_type as u8);
    frame.push(0); // reserved
    frame.extend_from_slice(&0u16.to_le_bytes()); // sequence number
    frame.extend_from_slice(&(total_len as u16).to_le_bytes());
    frame.extend_from_slice(&0u16.to_le_bytes()); // checksum slot
    frame.extend_from_slice(payload);

    let checksum = ones_complement_sum(&frame[..CHECKSUM_SPAN]);
    frame[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&checksum.to_le_bytes());
    frame
}

/// Parse a received buffer as a frame of the expected message type.
///
/// Validates the protocol tag and the message type byte; the checksum is
/// not re-verified here (the device-side sender computes it, the observed
/// receive path does not check it). Callers wanting the extra robustness
/// can run [`verify_checksum`] first.
pub fn decode(buf: &[u8], expected: MessageType) -> Result<Frame> {
    if buf.len() < HEADER_LEN {
        return Err(ProtocolError::MalformedResponse(format!(
            "frame too short: {} bytes, need at least {HEADER_LEN}",
            buf.len()
        )));
    }
    if &buf[..PROTOCOL_TAG.len()] != PROTOCOL_TAG {
        return Err(ProtocolError::ProtocolMismatch(format!(
            "bad protocol tag: {:02x?}",
            &buf[..PROTOCOL_TAG.len()]
        )));
    }
    if buf[12] != expected as u8 {
        return Err(ProtocolError::ProtocolMismatch(format!(
            "unexpected message type: got {}, expected {}",
            buf[12], expected as u8
        )));
    }

    Ok(Frame {
        msg_type: expected,
        payload: buf[HEADER_LEN..].to_vec(),
    })
}

/// Check the stored checksum of a complete frame against a recomputation
/// over bytes [0, 18).
///
/// Not part of the wire-compatible decode path; exposed for callers that
/// want to reject corrupted frames early.
pub fn verify_checksum(buf: &[u8]) -> bool {
    if buf.len() < HEADER_LEN {
        return false;
    }
    let stored = u16::from_le_bytes([buf[CHECKSUM_OFFSET], buf[CHECKSUM_OFFSET + 1]]);
    ones_complement_sum(&buf[..CHECKSUM_SPAN]) == stored
}

/// Classic Internet checksum over a byte span.
///
/// Sums the data as 16-bit little-endian words (a trailing odd byte counts
/// as a half-word), folds the carry back into the low 16 bits twice, and
/// returns the one's complement of the result.
fn ones_complement_sum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut words = data.chunks_exact(2);
    for word in &mut words {
        sum += u16::from_le_bytes([word[0], word[1]]) as u32;
    }
    if let [odd] = words.remainder() {
        sum += *odd as u32;
    }
    sum = (sum & 0xffff) + (sum >> 16);
    sum = (sum & 0xffff) + (sum >> 16);
    !(sum as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let frame = encode(MessageType::GetPanelInfo, &[]);
        assert_eq!(frame.len(), HEADER_LEN);
        assert_eq!(&frame[..11], b"STATUS-LINK");
        assert_eq!(frame[11], 1); // version
        assert_eq!(frame[12], 1); // GetPanelInfo
        assert_eq!(frame[13], 0); // reserved
        assert_eq!(&frame[14..16], &[0, 0]); // sequence
        assert_eq!(u16::from_le_bytes([frame[16], frame[17]]), 20); // total length
    }

    #[test]
    fn test_length_includes_payload() {
        let frame = encode(MessageType::SetBacklight, &[0x80]);
        assert_eq!(frame.len(), 21);
        assert_eq!(u16::from_le_bytes([frame[16], frame[17]]), 21);
        assert_eq!(frame[20], 0x80);
    }

    #[test]
    fn test_checksum_self_consistency() {
        // Recomputing the one's-complement sum over bytes [0, 18) must match
        // the stored field bit-for-bit, for any payload.
        for payload in [&[][..], &[1, 2, 3][..], &[0xff; 80][..]] {
            let frame = encode(MessageType::GetPanelInfo, payload);
            let stored = u16::from_le_bytes([frame[18], frame[19]]);
            assert_eq!(ones_complement_sum(&frame[..18]), stored);
            assert!(verify_checksum(&frame));
        }
    }

    #[test]
    fn test_checksum_excludes_payload() {
        let a = encode(MessageType::GetTime, &[0x00]);
        let b = encode(MessageType::GetTime, &[0xff]);
        // Same header bytes, different payload: identical checksum.
        assert_eq!(&a[18..20], &b[18..20]);
    }

    #[test]
    fn test_decode_rejects_foreign_tag() {
        let mut frame = encode(MessageType::GetPanelInfo, &[]);
        frame[0] = b'X';
        let err = decode(&frame, MessageType::GetPanelInfo).unwrap_err();
        assert!(matches!(err, ProtocolError::ProtocolMismatch(_)));
    }

    #[test]
    fn test_decode_rejects_wrong_type() {
        let frame = encode(MessageType::GetTime, &[]);
        let err = decode(&frame, MessageType::GetPanelInfo).unwrap_err();
        assert!(matches!(err, ProtocolError::ProtocolMismatch(_)));
    }

    #[test]
    fn test_decode_short_buffer() {
        let err = decode(b"STATUS-LINK", MessageType::GetPanelInfo).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedResponse(_)));
    }

    #[test]
    fn test_decode_roundtrip() {
        let frame = encode(MessageType::PushStorage, &[9, 8, 7]);
        let parsed = decode(&frame, MessageType::PushStorage).unwrap();
        assert_eq!(parsed.msg_type, MessageType::PushStorage);
        assert_eq!(parsed.payload, vec![9, 8, 7]);
    }

    #[test]
    fn test_verify_checksum_detects_corruption() {
        let mut frame = encode(MessageType::GetPanelInfo, &[]);
        assert!(verify_checksum(&frame));
        frame[14] ^= 0x01; // flip a sequence bit
        assert!(!verify_checksum(&frame));
    }

    #[test]
    fn test_message_type_from_byte() {
        assert_eq!(MessageType::from_byte(1), Some(MessageType::GetPanelInfo));
        assert_eq!(MessageType::from_byte(6), Some(MessageType::SetTime));
        assert_eq!(MessageType::from_byte(0), None);
        assert_eq!(MessageType::from_byte(7), None);
    }
}
