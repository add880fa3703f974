//! WifiNetwork table (nested record)

use crate::builder::Builder;
use crate::error::CodecResult;
use crate::schema::{FieldDef, FieldKind, TableSchema};
use flatbuffers::{ForwardsUOffset, InvalidFlatbuffer, Table, Verifiable, Verifier};
use flatbuffers::{VOffsetT, WIPOffset};
use std::fmt;

/// Authentication scheme advertised by an access point
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WifiAuthMode {
    #[default]
    Open = 0,
    Wep = 1,
    WpaPsk = 2,
    Wpa2Psk = 3,
    WpaWpa2Psk = 4,
    Wpa2Enterprise = 5,
    Wpa3Psk = 6,
    Wpa2Wpa3Psk = 7,
    WapiPsk = 8,
    Unknown = 9,
}

impl WifiAuthMode {
    /// Values written by a newer schema decode as `Unknown`
    #[inline]
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Open,
            1 => Self::Wep,
            2 => Self::WpaPsk,
            3 => Self::Wpa2Psk,
            4 => Self::WpaWpa2Psk,
            5 => Self::Wpa2Enterprise,
            6 => Self::Wpa3Psk,
            7 => Self::Wpa2Wpa3Psk,
            8 => Self::WapiPsk,
            _ => Self::Unknown,
        }
    }
}

/// View of a WifiNetwork table inside a verified buffer
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct WifiNetwork<'a> {
    table: Table<'a>,
}

impl_table_view!(WifiNetwork);

impl<'a> WifiNetwork<'a> {
    pub const VT_SSID: VOffsetT = 4;
    pub const VT_BSSID: VOffsetT = 6;
    pub const VT_CHANNEL: VOffsetT = 8;
    pub const VT_RSSI: VOffsetT = 10;
    pub const VT_AUTH_MODE: VOffsetT = 12;
    pub const VT_SAVED: VOffsetT = 14;
    pub const FIELD_COUNT: usize = 6;

    pub const SCHEMA: TableSchema = TableSchema {
        name: "WifiNetwork",
        fields: &[
            FieldDef::new("ssid", 0, FieldKind::String),
            FieldDef::new("bssid", 1, FieldKind::String),
            FieldDef::new("channel", 2, FieldKind::U8),
            FieldDef::new("rssi", 3, FieldKind::I8),
            FieldDef::new("auth_mode", 4, FieldKind::U8),
            FieldDef::new("saved", 5, FieldKind::Bool),
        ],
    };

    #[inline]
    pub fn ssid(&self) -> Option<&'a str> {
        unsafe { self.table.get::<ForwardsUOffset<&str>>(Self::VT_SSID, None) }
    }

    #[inline]
    pub fn bssid(&self) -> Option<&'a str> {
        unsafe { self.table.get::<ForwardsUOffset<&str>>(Self::VT_BSSID, None) }
    }

    #[inline]
    pub fn channel(&self) -> u8 {
        unsafe { self.table.get::<u8>(Self::VT_CHANNEL, Some(0)) }.unwrap_or(0)
    }

    /// Signal strength in dBm
    #[inline]
    pub fn rssi(&self) -> i8 {
        unsafe { self.table.get::<i8>(Self::VT_RSSI, Some(0)) }.unwrap_or(0)
    }

    #[inline]
    pub fn auth_mode(&self) -> WifiAuthMode {
        let raw = unsafe { self.table.get::<u8>(Self::VT_AUTH_MODE, Some(0)) };
        WifiAuthMode::from_u8(raw.unwrap_or(0))
    }

    #[inline]
    pub fn saved(&self) -> bool {
        unsafe { self.table.get::<bool>(Self::VT_SAVED, Some(false)) }.unwrap_or(false)
    }

    pub fn unpack(&self) -> OwnedWifiNetwork {
        OwnedWifiNetwork {
            ssid: self.ssid().map(str::to_string),
            bssid: self.bssid().map(str::to_string),
            channel: self.channel(),
            rssi: self.rssi(),
            auth_mode: self.auth_mode(),
            saved: self.saved(),
        }
    }
}

impl fmt::Debug for WifiNetwork<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiNetwork")
            .field("ssid", &self.ssid())
            .field("bssid", &self.bssid())
            .field("channel", &self.channel())
            .field("rssi", &self.rssi())
            .field("auth_mode", &self.auth_mode())
            .field("saved", &self.saved())
            .finish()
    }
}

impl Verifiable for WifiNetwork<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<&str>>("ssid", Self::VT_SSID, false)?
            .visit_field::<ForwardsUOffset<&str>>("bssid", Self::VT_BSSID, false)?
            .visit_field::<u8>("channel", Self::VT_CHANNEL, false)?
            .visit_field::<i8>("rssi", Self::VT_RSSI, false)?
            .visit_field::<u8>("auth_mode", Self::VT_AUTH_MODE, false)?
            .visit_field::<bool>("saved", Self::VT_SAVED, false)?
            .finish();
        Ok(())
    }
}

/// Field-by-field writer for a WifiNetwork table
pub struct WifiNetworkBuilder<'a: 'b, 'b> {
    builder: &'b mut Builder<'a>,
}

impl<'a: 'b, 'b> WifiNetworkBuilder<'a, 'b> {
    pub fn new(builder: &'b mut Builder<'a>) -> CodecResult<Self> {
        builder.start_table(WifiNetwork::FIELD_COUNT)?;
        Ok(Self { builder })
    }

    pub fn add_ssid(&mut self, ssid: WIPOffset<&'b str>) -> CodecResult<()> {
        self.builder.add_field_offset(WifiNetwork::VT_SSID, ssid)
    }

    pub fn add_bssid(&mut self, bssid: WIPOffset<&'b str>) -> CodecResult<()> {
        self.builder.add_field_offset(WifiNetwork::VT_BSSID, bssid)
    }

    pub fn add_channel(&mut self, channel: u8) -> CodecResult<()> {
        self.builder.add_field_u8(WifiNetwork::VT_CHANNEL, channel, 0)
    }

    pub fn add_rssi(&mut self, rssi: i8) -> CodecResult<()> {
        self.builder.add_field_i8(WifiNetwork::VT_RSSI, rssi, 0)
    }

    pub fn add_auth_mode(&mut self, auth_mode: WifiAuthMode) -> CodecResult<()> {
        self.builder
            .add_field_u8(WifiNetwork::VT_AUTH_MODE, auth_mode as u8, WifiAuthMode::Open as u8)
    }

    pub fn add_saved(&mut self, saved: bool) -> CodecResult<()> {
        self.builder.add_field_bool(WifiNetwork::VT_SAVED, saved, false)
    }

    pub fn finish(self) -> CodecResult<WIPOffset<WifiNetwork<'a>>> {
        self.builder.end_table()
    }
}

/// Owned copy of a WifiNetwork, detached from any buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedWifiNetwork {
    pub ssid: Option<String>,
    pub bssid: Option<String>,
    pub channel: u8,
    pub rssi: i8,
    pub auth_mode: WifiAuthMode,
    pub saved: bool,
}

impl OwnedWifiNetwork {
    pub fn pack<'b>(&self, builder: &mut Builder<'b>) -> CodecResult<WIPOffset<WifiNetwork<'b>>> {
        let ssid = self
            .ssid
            .as_deref()
            .map(|s| builder.create_string(s))
            .transpose()?;
        let bssid = self
            .bssid
            .as_deref()
            .map(|s| builder.create_string(s))
            .transpose()?;

        let mut network = WifiNetworkBuilder::new(builder)?;
        if let Some(bssid) = bssid {
            network.add_bssid(bssid)?;
        }
        if let Some(ssid) = ssid {
            network.add_ssid(ssid)?;
        }
        network.add_saved(self.saved)?;
        network.add_auth_mode(self.auth_mode)?;
        network.add_rssi(self.rssi)?;
        network.add_channel(self.channel)?;
        network.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OwnedWifiNetwork {
        OwnedWifiNetwork {
            ssid: Some("HomeNet".to_string()),
            bssid: Some("AA:BB:CC:DD:EE:FF".to_string()),
            channel: 11,
            rssi: -67,
            auth_mode: WifiAuthMode::Wpa2Psk,
            saved: true,
        }
    }

    fn root_network(buf: &[u8]) -> WifiNetwork<'_> {
        flatbuffers::root::<WifiNetwork>(buf).unwrap()
    }

    #[test]
    fn test_fields_roundtrip() {
        let mut b = Builder::new();
        let root = sample().pack(&mut b).unwrap();
        b.finish(root).unwrap();
        let buf = b.finished_data().unwrap();

        let network = root_network(buf);
        assert_eq!(network.ssid(), Some("HomeNet"));
        assert_eq!(network.bssid(), Some("AA:BB:CC:DD:EE:FF"));
        assert_eq!(network.channel(), 11);
        assert_eq!(network.rssi(), -67);
        assert_eq!(network.auth_mode(), WifiAuthMode::Wpa2Psk);
        assert!(network.saved());
        assert_eq!(network.unpack(), sample());
    }

    #[test]
    fn test_absent_fields_read_as_defaults() {
        let mut b = Builder::new();
        let root = OwnedWifiNetwork::default().pack(&mut b).unwrap();
        b.finish(root).unwrap();
        let buf = b.finished_data().unwrap();

        let network = root_network(buf);
        assert_eq!(network.ssid(), None);
        assert_eq!(network.bssid(), None);
        assert_eq!(network.channel(), 0);
        assert_eq!(network.auth_mode(), WifiAuthMode::Open);
        assert!(!network.saved());
    }

    #[test]
    fn test_unrecognised_auth_mode() {
        assert_eq!(WifiAuthMode::from_u8(3), WifiAuthMode::Wpa2Psk);
        assert_eq!(WifiAuthMode::from_u8(200), WifiAuthMode::Unknown);
    }
}
