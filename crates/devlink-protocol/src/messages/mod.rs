//! Typed tables of the device-to-local protocol
//!
//! Each table has a borrowed view (`ReadyMessage<'a>`), a builder and an
//! owned form (`OwnedReadyMessage`) for use outside the buffer.
//!
//! Views are only handed out by the verifying root functions, or by
//! following a field of a view that was. Their accessors can therefore read
//! through [`flatbuffers::Table::get`] without further bounds checks.

/// Implement [`flatbuffers::Follow`] and table access for a view holding
/// `table: flatbuffers::Table<'a>`
macro_rules! impl_table_view {
    ($view:ident) => {
        impl<'a> flatbuffers::Follow<'a> for $view<'a> {
            type Inner = $view<'a>;

            #[inline]
            unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
                Self {
                    table: flatbuffers::Table::new(buf, loc),
                }
            }
        }

        impl<'a> $view<'a> {
            /// # Safety
            ///
            /// `table` must be a verified table of this type
            #[inline]
            pub unsafe fn init_from_table(table: flatbuffers::Table<'a>) -> Self {
                Self { table }
            }

            #[inline]
            pub fn table(&self) -> flatbuffers::Table<'a> {
                self.table
            }
        }
    };
}

pub mod device_message;
pub mod error_message;
pub mod ready_message;
pub mod wifi_network;
pub mod wifi_network_event;
pub mod wifi_scan_status;

pub use device_message::{
    root_as_device_to_local_message, size_prefixed_root_as_device_to_local_message,
    DevicePayload, DeviceToLocalMessage, DeviceToLocalMessageBuilder, OwnedDevicePayload,
    OwnedDeviceToLocalMessage, PayloadType,
};
pub use error_message::{ErrorMessage, OwnedErrorMessage};
pub use ready_message::{
    root_as_ready_message, size_prefixed_root_as_ready_message, OwnedReadyMessage, ReadyMessage,
    ReadyMessageBuilder,
};
pub use wifi_network::{OwnedWifiNetwork, WifiAuthMode, WifiNetwork, WifiNetworkBuilder};
pub use wifi_network_event::{OwnedWifiNetworkEvent, WifiNetworkEvent, WifiNetworkEventType};
pub use wifi_scan_status::{OwnedWifiScanStatusMessage, WifiScanStatus, WifiScanStatusMessage};
