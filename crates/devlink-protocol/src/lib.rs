//! Binary table codec for the device-to-local link
//!
//! Messages are flatbuffers tables: little-endian, addressed through
//! per-table vtables. Readers verify a buffer once and then decode fields
//! lazily from it; writers fill a [`Builder`] back to front.

pub mod builder;
pub mod error;
pub mod messages;
pub mod schema;

pub use builder::{Builder, MAX_BUFFER_SIZE};
pub use error::{CodecError, CodecResult};
pub use schema::{
    check_compatibility, CompatibilityIssue, CompatibilityLevel, CompatibilityReport, FieldDef,
    FieldKind, TableSchema,
};

pub use flatbuffers::{
    ForwardsUOffset, Table, UnionWIPOffset, Vector, VectorIter, VerifierOptions, WIPOffset,
};

pub use messages::{
    root_as_device_to_local_message, root_as_ready_message,
    size_prefixed_root_as_device_to_local_message, size_prefixed_root_as_ready_message,
    DevicePayload, DeviceToLocalMessage, DeviceToLocalMessageBuilder, ErrorMessage,
    OwnedDevicePayload, OwnedDeviceToLocalMessage, OwnedErrorMessage, OwnedReadyMessage,
    OwnedWifiNetwork, OwnedWifiNetworkEvent, OwnedWifiScanStatusMessage, PayloadType,
    ReadyMessage, ReadyMessageBuilder, WifiAuthMode, WifiNetwork, WifiNetworkBuilder,
    WifiNetworkEvent, WifiNetworkEventType, WifiScanStatus, WifiScanStatusMessage,
};
