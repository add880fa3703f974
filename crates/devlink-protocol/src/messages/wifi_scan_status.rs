//! WifiScanStatusMessage table: progress of a network scan

use crate::builder::Builder;
use crate::error::CodecResult;
use crate::schema::{FieldDef, FieldKind, TableSchema};
use flatbuffers::{InvalidFlatbuffer, Table, VOffsetT, Verifiable, Verifier, WIPOffset};
use std::fmt;

#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WifiScanStatus {
    #[default]
    Started = 0,
    InProgress = 1,
    Completed = 2,
    TimedOut = 3,
    Aborted = 4,
    Error = 5,
}

impl WifiScanStatus {
    /// Unrecognised values are reported as `Error`
    #[inline]
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Started,
            1 => Self::InProgress,
            2 => Self::Completed,
            3 => Self::TimedOut,
            4 => Self::Aborted,
            _ => Self::Error,
        }
    }

    /// A scan is running after `Started` and while `InProgress`
    #[inline]
    pub fn is_scanning(self) -> bool {
        matches!(self, Self::Started | Self::InProgress)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct WifiScanStatusMessage<'a> {
    table: Table<'a>,
}

impl_table_view!(WifiScanStatusMessage);

impl<'a> WifiScanStatusMessage<'a> {
    pub const VT_STATUS: VOffsetT = 4;
    pub const FIELD_COUNT: usize = 1;

    pub const SCHEMA: TableSchema = TableSchema {
        name: "WifiScanStatusMessage",
        fields: &[FieldDef::new("status", 0, FieldKind::U8)],
    };

    #[inline]
    pub fn status(&self) -> WifiScanStatus {
        let raw = unsafe { self.table.get::<u8>(Self::VT_STATUS, Some(0)) };
        WifiScanStatus::from_u8(raw.unwrap_or(0))
    }

    pub fn unpack(&self) -> OwnedWifiScanStatusMessage {
        OwnedWifiScanStatusMessage {
            status: self.status(),
        }
    }
}

impl fmt::Debug for WifiScanStatusMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiScanStatusMessage")
            .field("status", &self.status())
            .finish()
    }
}

impl Verifiable for WifiScanStatusMessage<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<u8>("status", Self::VT_STATUS, false)?
            .finish();
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnedWifiScanStatusMessage {
    pub status: WifiScanStatus,
}

impl OwnedWifiScanStatusMessage {
    pub fn pack<'b>(
        &self,
        builder: &mut Builder<'b>,
    ) -> CodecResult<WIPOffset<WifiScanStatusMessage<'b>>> {
        builder.start_table(WifiScanStatusMessage::FIELD_COUNT)?;
        builder.add_field_u8(
            WifiScanStatusMessage::VT_STATUS,
            self.status as u8,
            WifiScanStatus::Started as u8,
        )?;
        builder.end_table()
    }
}
