//! StatusLink USB panel protocol
//!
//! Control-style protocol for the USB-connected status panel family:
//! fixed 20-byte frames with an Internet checksum, a GetPanelInfo query
//! with short-TTL caching, and a static model catalog.

pub mod catalog;
pub mod frame;
pub mod query;
pub mod response;
#[cfg(feature = "usb")]
pub mod usb;

pub use catalog::{lookup as lookup_model, PanelModel, MODEL_CATALOG};
pub use frame::{Frame, MessageType, HEADER_LEN, PROTOCOL_TAG, PROTOCOL_VERSION};
pub use query::{Clock, DeviceInfoQuery, SystemClock, UsbTransport, CACHE_TTL};
pub use response::{parse_info_response, PanelInfo, INFO_RESPONSE_LEN};
#[cfg(feature = "usb")]
pub use usb::UsbPanelHandle;
