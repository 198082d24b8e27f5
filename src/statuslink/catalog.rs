//! Model catalog for StatusLink panels
//!
//! Static mapping from the single-byte model code reported by the device to
//! the physical specs of that panel variant. Read-only for the process
//! lifetime; used only to enrich [`PanelInfo`](super::PanelInfo) for
//! display purposes.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{ProtocolError, Result};

/// Physical specs of one panel variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelModel {
    /// Marketing name of the panel.
    pub name: &'static str,
    /// Native resolution in pixels.
    pub width_px: u16,
    pub height_px: u16,
    /// Active-area dimensions in millimeters.
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Registry of known panel models, keyed by the model code byte.
pub static MODEL_CATALOG: Lazy<HashMap<u8, PanelModel>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(
        0,
        PanelModel {
            name: "StatusLink 5\"",
            width_px: 800,
            height_px: 480,
            width_mm: 108.0,
            height_mm: 64.8,
        },
    );
    m.insert(
        1,
        PanelModel {
            name: "StatusLink 5\" Portrait",
            width_px: 480,
            height_px: 800,
            width_mm: 64.8,
            height_mm: 108.0,
        },
    );
    m.insert(
        2,
        PanelModel {
            name: "StatusLink 3.5\"",
            width_px: 480,
            height_px: 320,
            width_mm: 73.4,
            height_mm: 48.9,
        },
    );
    m.insert(
        3,
        PanelModel {
            name: "StatusLink 4\" Square",
            width_px: 480,
            height_px: 480,
            width_mm: 71.9,
            height_mm: 71.9,
        },
    );
    m.insert(
        4,
        PanelModel {
            name: "StatusLink 7\"",
            width_px: 1024,
            height_px: 600,
            width_mm: 154.2,
            height_mm: 85.9,
        },
    );
    m.insert(
        5,
        PanelModel {
            name: "StatusLink 8.8\" Wide",
            width_px: 1920,
            height_px: 480,
            width_mm: 218.8,
            height_mm: 54.7,
        },
    );
    m.insert(
        6,
        PanelModel {
            name: "StatusLink 2.1\" Round",
            width_px: 480,
            height_px: 480,
            width_mm: 53.3,
            height_mm: 53.3,
        },
    );
    m
});

/// Look up a model code, returning `None` for codes outside the known range.
pub fn lookup(code: u8) -> Option<&'static PanelModel> {
    MODEL_CATALOG.get(&code)
}

/// Look up a model code, failing with [`ProtocolError::UnsupportedDevice`]
/// for unknown codes.
///
/// Info-query parsing degrades to an unknown model instead of using this;
/// it exists for callers that require catalog-backed hardware.
pub fn require(code: u8) -> Result<&'static PanelModel> {
    lookup(code).ok_or(ProtocolError::UnsupportedDevice(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        let model = lookup(0).unwrap();
        assert_eq!(model.name, "StatusLink 5\"");
        assert_eq!((model.width_px, model.height_px), (800, 480));
    }

    #[test]
    fn test_unknown_code() {
        assert!(lookup(0xfe).is_none());
        let err = require(0xfe).unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedDevice(0xfe)));
    }

    #[test]
    fn test_catalog_is_dense_from_zero() {
        // Device firmware reports codes starting at 0.
        for code in 0..MODEL_CATALOG.len() as u8 {
            assert!(lookup(code).is_some(), "missing model code {code}");
        }
    }
}
