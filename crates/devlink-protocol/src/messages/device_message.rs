//! DeviceToLocalMessage: the envelope every device-to-client frame carries
//!
//! The envelope holds a tagged union. Slot 0 stores the payload type as a
//! u8, slot 1 an offset to the payload table. A tag this build does not
//! know decodes as [`DevicePayload::Unknown`] so that newer devices can add
//! payloads without breaking older clients.

use super::error_message::{ErrorMessage, OwnedErrorMessage};
use super::ready_message::{OwnedReadyMessage, ReadyMessage};
use super::wifi_network_event::{OwnedWifiNetworkEvent, WifiNetworkEvent};
use super::wifi_scan_status::{OwnedWifiScanStatusMessage, WifiScanStatusMessage};
use crate::builder::Builder;
use crate::error::{CodecError, CodecResult};
use crate::schema::{FieldDef, FieldKind, TableSchema};
use flatbuffers::{ForwardsUOffset, InvalidFlatbuffer, Table, Verifiable, Verifier};
use flatbuffers::{UnionWIPOffset, VOffsetT, VerifierOptions, WIPOffset, SIZE_UOFFSET};
use std::fmt;

/// Union tag of the envelope payload
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadType {
    None = 0,
    ReadyMessage = 1,
    ErrorMessage = 2,
    WifiScanStatusMessage = 3,
    WifiNetworkEvent = 4,
}

impl PayloadType {
    #[inline]
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::None),
            1 => Some(Self::ReadyMessage),
            2 => Some(Self::ErrorMessage),
            3 => Some(Self::WifiScanStatusMessage),
            4 => Some(Self::WifiNetworkEvent),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::ReadyMessage => "ReadyMessage",
            Self::ErrorMessage => "ErrorMessage",
            Self::WifiScanStatusMessage => "WifiScanStatusMessage",
            Self::WifiNetworkEvent => "WifiNetworkEvent",
        }
    }
}

/// Decoded envelope payload, borrowing the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePayload<'a> {
    None,
    Ready(ReadyMessage<'a>),
    Error(ErrorMessage<'a>),
    ScanStatus(WifiScanStatusMessage<'a>),
    NetworkEvent(WifiNetworkEvent<'a>),
    /// Tag not known to this build
    Unknown(u8),
}

impl DevicePayload<'_> {
    pub fn payload_type(&self) -> u8 {
        match self {
            Self::None => PayloadType::None as u8,
            Self::Ready(_) => PayloadType::ReadyMessage as u8,
            Self::Error(_) => PayloadType::ErrorMessage as u8,
            Self::ScanStatus(_) => PayloadType::WifiScanStatusMessage as u8,
            Self::NetworkEvent(_) => PayloadType::WifiNetworkEvent as u8,
            Self::Unknown(tag) => *tag,
        }
    }

    pub fn unpack(&self) -> OwnedDevicePayload {
        match self {
            Self::None => OwnedDevicePayload::None,
            Self::Ready(m) => OwnedDevicePayload::Ready(m.unpack()),
            Self::Error(m) => OwnedDevicePayload::Error(m.unpack()),
            Self::ScanStatus(m) => OwnedDevicePayload::ScanStatus(m.unpack()),
            Self::NetworkEvent(m) => OwnedDevicePayload::NetworkEvent(m.unpack()),
            Self::Unknown(tag) => OwnedDevicePayload::Unknown(*tag),
        }
    }
}

/// Payload table of a tag this build does not know; only its shape is checked
struct OpaqueTable;

impl Verifiable for OpaqueTable {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?.finish();
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DeviceToLocalMessage<'a> {
    table: Table<'a>,
}

impl_table_view!(DeviceToLocalMessage);

impl<'a> DeviceToLocalMessage<'a> {
    pub const VT_PAYLOAD_TYPE: VOffsetT = 4;
    pub const VT_PAYLOAD: VOffsetT = 6;
    pub const FIELD_COUNT: usize = 2;

    pub const SCHEMA: TableSchema = TableSchema {
        name: "DeviceToLocalMessage",
        fields: &[
            FieldDef::new("payload_type", 0, FieldKind::UnionType),
            FieldDef::new("payload", 1, FieldKind::Union),
        ],
    };

    /// Verify the buffer from `start` on and resolve its envelope
    pub fn read_from(buf: &'a [u8], start: usize) -> CodecResult<Self> {
        Self::read_from_with_opts(&VerifierOptions::default(), buf, start)
    }

    pub fn read_from_with_opts(
        opts: &VerifierOptions,
        buf: &'a [u8],
        start: usize,
    ) -> CodecResult<Self> {
        let tail = buf.get(start..).ok_or(CodecError::TruncatedBuffer {
            offset: start,
            needed: SIZE_UOFFSET,
        })?;
        Ok(flatbuffers::root_with_opts::<Self>(opts, tail)?)
    }

    pub fn read_size_prefixed(buf: &'a [u8]) -> CodecResult<Self> {
        Self::read_size_prefixed_with_opts(&VerifierOptions::default(), buf)
    }

    pub fn read_size_prefixed_with_opts(
        opts: &VerifierOptions,
        buf: &'a [u8],
    ) -> CodecResult<Self> {
        Ok(flatbuffers::size_prefixed_root_with_opts::<Self>(
            opts, buf,
        )?)
    }

    #[inline]
    pub fn payload_type(&self) -> u8 {
        unsafe { self.table.get::<u8>(Self::VT_PAYLOAD_TYPE, Some(0)) }.unwrap_or(0)
    }

    /// Resolve the payload table according to its tag
    pub fn payload(&self) -> DevicePayload<'a> {
        let tag = self.payload_type();
        let kind = match PayloadType::from_u8(tag) {
            Some(PayloadType::None) => return DevicePayload::None,
            Some(kind) => kind,
            None => return DevicePayload::Unknown(tag),
        };
        // Verification rejects a tag stored without its value
        let Some(table) =
            (unsafe { self.table.get::<ForwardsUOffset<Table<'a>>>(Self::VT_PAYLOAD, None) })
        else {
            return DevicePayload::None;
        };
        unsafe {
            match kind {
                PayloadType::None => DevicePayload::None,
                PayloadType::ReadyMessage => {
                    DevicePayload::Ready(ReadyMessage::init_from_table(table))
                }
                PayloadType::ErrorMessage => {
                    DevicePayload::Error(ErrorMessage::init_from_table(table))
                }
                PayloadType::WifiScanStatusMessage => {
                    DevicePayload::ScanStatus(WifiScanStatusMessage::init_from_table(table))
                }
                PayloadType::WifiNetworkEvent => {
                    DevicePayload::NetworkEvent(WifiNetworkEvent::init_from_table(table))
                }
            }
        }
    }

    pub fn unpack(&self) -> OwnedDeviceToLocalMessage {
        OwnedDeviceToLocalMessage {
            payload: self.payload().unpack(),
        }
    }
}

impl fmt::Debug for DeviceToLocalMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceToLocalMessage")
            .field("payload", &self.payload())
            .finish()
    }
}

impl Verifiable for DeviceToLocalMessage<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_union::<u8, _>(
                "payload_type",
                Self::VT_PAYLOAD_TYPE,
                "payload",
                Self::VT_PAYLOAD,
                false,
                |tag, v, pos| match PayloadType::from_u8(tag) {
                    Some(PayloadType::ReadyMessage) => v
                        .verify_union_variant::<ForwardsUOffset<ReadyMessage>>(
                            "PayloadType::ReadyMessage",
                            pos,
                        ),
                    Some(PayloadType::ErrorMessage) => v
                        .verify_union_variant::<ForwardsUOffset<ErrorMessage>>(
                            "PayloadType::ErrorMessage",
                            pos,
                        ),
                    Some(PayloadType::WifiScanStatusMessage) => v
                        .verify_union_variant::<ForwardsUOffset<WifiScanStatusMessage>>(
                            "PayloadType::WifiScanStatusMessage",
                            pos,
                        ),
                    Some(PayloadType::WifiNetworkEvent) => v
                        .verify_union_variant::<ForwardsUOffset<WifiNetworkEvent>>(
                            "PayloadType::WifiNetworkEvent",
                            pos,
                        ),
                    Some(PayloadType::None) | None => {
                        v.verify_union_variant::<ForwardsUOffset<OpaqueTable>>("unknown", pos)
                    }
                },
            )?
            .finish();
        Ok(())
    }
}

/// Verify `buf` and return its envelope
pub fn root_as_device_to_local_message(buf: &[u8]) -> CodecResult<DeviceToLocalMessage<'_>> {
    DeviceToLocalMessage::read_from(buf, 0)
}

/// Verify a size-prefixed `buf` and return its envelope
pub fn size_prefixed_root_as_device_to_local_message(
    buf: &[u8],
) -> CodecResult<DeviceToLocalMessage<'_>> {
    DeviceToLocalMessage::read_size_prefixed(buf)
}

/// Writer for the envelope table
pub struct DeviceToLocalMessageBuilder<'a: 'b, 'b> {
    builder: &'b mut Builder<'a>,
}

impl<'a: 'b, 'b> DeviceToLocalMessageBuilder<'a, 'b> {
    pub fn new(builder: &'b mut Builder<'a>) -> CodecResult<Self> {
        builder.start_table(DeviceToLocalMessage::FIELD_COUNT)?;
        Ok(Self { builder })
    }

    /// Store the payload offset together with its union tag
    pub fn add_payload(
        &mut self,
        tag: u8,
        payload: WIPOffset<UnionWIPOffset>,
    ) -> CodecResult<()> {
        if tag == PayloadType::None as u8 {
            return Err(CodecError::InvalidArgument(
                "payload offset given with the NONE tag".to_string(),
            ));
        }
        self.builder
            .add_field_offset(DeviceToLocalMessage::VT_PAYLOAD, payload)?;
        self.builder
            .add_field_u8(DeviceToLocalMessage::VT_PAYLOAD_TYPE, tag, 0)
    }

    pub fn finish(self) -> CodecResult<WIPOffset<DeviceToLocalMessage<'a>>> {
        self.builder.end_table()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OwnedDevicePayload {
    #[default]
    None,
    Ready(OwnedReadyMessage),
    Error(OwnedErrorMessage),
    ScanStatus(OwnedWifiScanStatusMessage),
    NetworkEvent(OwnedWifiNetworkEvent),
    /// Re-encoded as an empty table under the same tag
    Unknown(u8),
}

impl OwnedDevicePayload {
    pub fn payload_type(&self) -> u8 {
        match self {
            Self::None => PayloadType::None as u8,
            Self::Ready(_) => PayloadType::ReadyMessage as u8,
            Self::Error(_) => PayloadType::ErrorMessage as u8,
            Self::ScanStatus(_) => PayloadType::WifiScanStatusMessage as u8,
            Self::NetworkEvent(_) => PayloadType::WifiNetworkEvent as u8,
            Self::Unknown(tag) => *tag,
        }
    }

    fn pack(&self, builder: &mut Builder<'_>) -> CodecResult<Option<WIPOffset<UnionWIPOffset>>> {
        Ok(Some(match self {
            Self::None => return Ok(None),
            Self::Ready(m) => m.pack(builder)?.as_union_value(),
            Self::Error(m) => m.pack(builder)?.as_union_value(),
            Self::ScanStatus(m) => m.pack(builder)?.as_union_value(),
            Self::NetworkEvent(m) => m.pack(builder)?.as_union_value(),
            Self::Unknown(tag) => {
                if *tag == PayloadType::None as u8 {
                    return Ok(None);
                }
                builder.start_table(0)?;
                builder.end_table::<UnionWIPOffset>()?
            }
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedDeviceToLocalMessage {
    pub payload: OwnedDevicePayload,
}

impl OwnedDeviceToLocalMessage {
    pub fn new(payload: OwnedDevicePayload) -> Self {
        Self { payload }
    }

    pub fn pack<'b>(
        &self,
        builder: &mut Builder<'b>,
    ) -> CodecResult<WIPOffset<DeviceToLocalMessage<'b>>> {
        let payload = self.payload.pack(builder)?;
        let mut msg = DeviceToLocalMessageBuilder::new(builder)?;
        if let Some(payload) = payload {
            msg.add_payload(self.payload.payload_type(), payload)?;
        }
        msg.finish()
    }

    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        let mut builder = Builder::new();
        let root = self.pack(&mut builder)?;
        builder.finish(root)?;
        Ok(builder.finished_data()?.to_vec())
    }

    pub fn encode_size_prefixed(&self) -> CodecResult<Vec<u8>> {
        let mut builder = Builder::new();
        let root = self.pack(&mut builder)?;
        builder.finish_size_prefixed(root)?;
        Ok(builder.finished_data()?.to_vec())
    }
}

impl From<OwnedReadyMessage> for OwnedDeviceToLocalMessage {
    fn from(msg: OwnedReadyMessage) -> Self {
        Self::new(OwnedDevicePayload::Ready(msg))
    }
}

impl From<OwnedErrorMessage> for OwnedDeviceToLocalMessage {
    fn from(msg: OwnedErrorMessage) -> Self {
        Self::new(OwnedDevicePayload::Error(msg))
    }
}

impl From<OwnedWifiScanStatusMessage> for OwnedDeviceToLocalMessage {
    fn from(msg: OwnedWifiScanStatusMessage) -> Self {
        Self::new(OwnedDevicePayload::ScanStatus(msg))
    }
}

impl From<OwnedWifiNetworkEvent> for OwnedDeviceToLocalMessage {
    fn from(msg: OwnedWifiNetworkEvent) -> Self {
        Self::new(OwnedDevicePayload::NetworkEvent(msg))
    }
}
