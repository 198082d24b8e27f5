//! Revision C command frames
//!
//! Every command is a short fixed byte prefix, optionally followed by a
//! payload, padded to a multiple of 250 bytes. The padding byte is 0x00
//! for every command except DISPLAY_BITMAP, whose frame doubles as the
//! "start display bitmap" marker and is padded with 0x2c. Both values are
//! dictated by the device's serial receive buffer and must be reproduced
//! exactly.

/// Commands are padded to a multiple of this many bytes.
pub const COMMAND_BLOCK: usize = 250;

/// Generic command padding byte.
pub const PAD_GENERIC: u8 = 0x00;

/// Padding byte for the start-display-bitmap marker frame.
pub const PAD_START_BITMAP: u8 = 0x2c;

/// Revision C command set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Hello,
    Options,
    Restart,
    TurnOff,
    TurnOn,
    SetBrightness,
    StopVideo,
    StopMedia,
    QueryStatus,
    DisplayBitmap,
    UpdateBitmap,
}

impl Command {
    /// Fixed wire prefix for this command.
    pub fn prefix(self) -> &'static [u8] {
        match self {
            Command::Hello => &[
                0x01, 0xef, 0x69, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0xc5, 0xd3,
            ],
            Command::Options => &[
                0x7d, 0xef, 0x69, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x2d,
            ],
            Command::Restart => &[0x84, 0xef, 0x69, 0x00, 0x00, 0x00, 0x01],
            Command::TurnOff => &[0x83, 0xef, 0x69, 0x00, 0x00, 0x00, 0x01],
            Command::TurnOn => &[0x83, 0xef, 0x69, 0x00, 0x00, 0x00, 0x00],
            Command::SetBrightness => &[0x7b, 0xef, 0x69, 0x00, 0x00, 0x00, 0x01],
            Command::StopVideo => &[0x79, 0xef, 0x69, 0x00, 0x00, 0x00, 0x01],
            Command::StopMedia => &[0x96, 0xef, 0x69, 0x00, 0x00, 0x00, 0x01],
            Command::QueryStatus => &[0xcf, 0xef, 0x69, 0x00, 0x00, 0x00, 0x01],
            Command::DisplayBitmap => &[0xc8, 0xef, 0x69, 0x00, 0x17, 0x70],
            Command::UpdateBitmap => &[0xcc, 0xef, 0x69, 0x00],
        }
    }

    /// Padding byte used when this command is padded to a block multiple.
    pub fn pad_byte(self) -> u8 {
        match self {
            Command::DisplayBitmap => PAD_START_BITMAP,
            _ => PAD_GENERIC,
        }
    }
}

/// Build the padded on-wire form of a command: prefix, payload, then
/// padding up to the next 250-byte multiple. A frame landing exactly on a
/// block boundary gets no padding.
pub fn build(cmd: Command, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(COMMAND_BLOCK);
    frame.extend_from_slice(cmd.prefix());
    frame.extend_from_slice(payload);
    let rem = frame.len() % COMMAND_BLOCK;
    if rem != 0 {
        frame.resize(frame.len() + (COMMAND_BLOCK - rem), cmd.pad_byte());
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_to_block_multiple() {
        for cmd in [
            Command::Hello,
            Command::Restart,
            Command::StopVideo,
            Command::QueryStatus,
        ] {
            let frame = build(cmd, &[]);
            assert_eq!(frame.len() % COMMAND_BLOCK, 0, "{cmd:?}");
            assert_eq!(frame.len(), COMMAND_BLOCK);
            assert!(frame.starts_with(cmd.prefix()));
        }
    }

    #[test]
    fn test_generic_padding_is_zero() {
        let frame = build(Command::Hello, &[]);
        assert!(frame[Command::Hello.prefix().len()..]
            .iter()
            .all(|&b| b == PAD_GENERIC));
    }

    #[test]
    fn test_display_bitmap_pads_with_start_marker() {
        let frame = build(Command::DisplayBitmap, &[]);
        assert_eq!(frame.len(), COMMAND_BLOCK);
        assert!(frame[Command::DisplayBitmap.prefix().len()..]
            .iter()
            .all(|&b| b == PAD_START_BITMAP));
    }

    #[test]
    fn test_payload_before_padding() {
        let frame = build(Command::SetBrightness, &[0x7f]);
        let prefix_len = Command::SetBrightness.prefix().len();
        assert_eq!(frame[prefix_len], 0x7f);
        assert!(frame[prefix_len + 1..].iter().all(|&b| b == PAD_GENERIC));
    }

    #[test]
    fn test_exact_block_gets_no_padding() {
        let payload = vec![0xaa; COMMAND_BLOCK - Command::UpdateBitmap.prefix().len()];
        let frame = build(Command::UpdateBitmap, &payload);
        assert_eq!(frame.len(), COMMAND_BLOCK);
        assert_eq!(*frame.last().unwrap(), 0xaa);
    }

    #[test]
    fn test_large_payload_spans_blocks() {
        let payload = vec![0x11; COMMAND_BLOCK + 1];
        let frame = build(Command::UpdateBitmap, &payload);
        assert_eq!(frame.len(), 2 * COMMAND_BLOCK);
    }

    #[test]
    fn test_on_off_share_prefix_root() {
        // TURNON and TURNOFF differ only in the final selector byte.
        let on = Command::TurnOn.prefix();
        let off = Command::TurnOff.prefix();
        assert_eq!(&on[..6], &off[..6]);
        assert_ne!(on[6], off[6]);
    }
}
