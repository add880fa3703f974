//! WifiNetworkEvent table: a change to one network in the device's view

use super::wifi_network::{OwnedWifiNetwork, WifiNetwork};
use crate::builder::Builder;
use crate::error::CodecResult;
use crate::schema::{FieldDef, FieldKind, TableSchema};
use flatbuffers::{ForwardsUOffset, InvalidFlatbuffer, Table, Verifiable, Verifier};
use flatbuffers::{VOffsetT, WIPOffset};
use std::fmt;

#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WifiNetworkEventType {
    #[default]
    Discovered = 0,
    Updated = 1,
    Lost = 2,
    Saved = 3,
    Removed = 4,
    Connected = 5,
    Disconnected = 6,
}

impl WifiNetworkEventType {
    /// Returns `None` for values written by a newer schema
    #[inline]
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Discovered),
            1 => Some(Self::Updated),
            2 => Some(Self::Lost),
            3 => Some(Self::Saved),
            4 => Some(Self::Removed),
            5 => Some(Self::Connected),
            6 => Some(Self::Disconnected),
            _ => None,
        }
    }

    /// Whether the network leaves the device's list
    #[inline]
    pub fn is_removal(self) -> bool {
        matches!(self, Self::Lost | Self::Removed)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct WifiNetworkEvent<'a> {
    table: Table<'a>,
}

impl_table_view!(WifiNetworkEvent);

impl<'a> WifiNetworkEvent<'a> {
    pub const VT_EVENT_TYPE: VOffsetT = 4;
    pub const VT_NETWORK: VOffsetT = 6;
    pub const FIELD_COUNT: usize = 2;

    pub const SCHEMA: TableSchema = TableSchema {
        name: "WifiNetworkEvent",
        fields: &[
            FieldDef::new("event_type", 0, FieldKind::U8),
            FieldDef::new("network", 1, FieldKind::Table("WifiNetwork")),
        ],
    };

    /// Raw event discriminant
    #[inline]
    pub fn event_type_raw(&self) -> u8 {
        unsafe { self.table.get::<u8>(Self::VT_EVENT_TYPE, Some(0)) }.unwrap_or(0)
    }

    /// Decoded event type, `None` if unrecognised
    pub fn event_type(&self) -> Option<WifiNetworkEventType> {
        WifiNetworkEventType::from_u8(self.event_type_raw())
    }

    #[inline]
    pub fn network(&self) -> Option<WifiNetwork<'a>> {
        unsafe {
            self.table
                .get::<ForwardsUOffset<WifiNetwork>>(Self::VT_NETWORK, None)
        }
    }

    pub fn unpack(&self) -> OwnedWifiNetworkEvent {
        OwnedWifiNetworkEvent {
            event_type: self.event_type_raw(),
            network: self.network().map(|n| n.unpack()),
        }
    }
}

impl fmt::Debug for WifiNetworkEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiNetworkEvent")
            .field("event_type", &self.event_type())
            .field("network", &self.network())
            .finish()
    }
}

impl Verifiable for WifiNetworkEvent<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<u8>("event_type", Self::VT_EVENT_TYPE, false)?
            .visit_field::<ForwardsUOffset<WifiNetwork>>("network", Self::VT_NETWORK, false)?
            .finish();
        Ok(())
    }
}

/// Owned WifiNetworkEvent
///
/// The event type is kept raw so that values from a newer schema survive
/// a decode/encode cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedWifiNetworkEvent {
    pub event_type: u8,
    pub network: Option<OwnedWifiNetwork>,
}

impl OwnedWifiNetworkEvent {
    pub fn new(event_type: WifiNetworkEventType, network: OwnedWifiNetwork) -> Self {
        Self {
            event_type: event_type as u8,
            network: Some(network),
        }
    }

    pub fn event_type(&self) -> Option<WifiNetworkEventType> {
        WifiNetworkEventType::from_u8(self.event_type)
    }

    pub fn pack<'b>(
        &self,
        builder: &mut Builder<'b>,
    ) -> CodecResult<WIPOffset<WifiNetworkEvent<'b>>> {
        let network = self
            .network
            .as_ref()
            .map(|n| n.pack(builder))
            .transpose()?;
        builder.start_table(WifiNetworkEvent::FIELD_COUNT)?;
        if let Some(network) = network {
            builder.add_field_offset(WifiNetworkEvent::VT_NETWORK, network)?;
        }
        builder.add_field_u8(WifiNetworkEvent::VT_EVENT_TYPE, self.event_type, 0)?;
        builder.end_table()
    }
}
