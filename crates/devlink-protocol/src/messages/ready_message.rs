//! ReadyMessage table: the device status snapshot sent when a local client connects
//!
//! | slot | voffset | field             | wire kind        | default |
//! |------|---------|-------------------|------------------|---------|
//! | 0    | 4       | poggies           | bool (1 byte)    | false   |
//! | 1    | 6       | rftx_pin          | u8               | 0       |
//! | 2    | 8       | account_linked    | bool (1 byte)    | false   |
//! | 3    | 10      | networks_saved    | [string]         | empty   |
//! | 4    | 12      | network_connected | WifiNetwork      | none    |

use super::wifi_network::{OwnedWifiNetwork, WifiNetwork};
use crate::builder::Builder;
use crate::error::{CodecError, CodecResult};
use crate::schema::{FieldDef, FieldKind, TableSchema};
use flatbuffers::{ForwardsUOffset, InvalidFlatbuffer, Table, Vector, Verifiable, Verifier};
use flatbuffers::{VOffsetT, VerifierOptions, WIPOffset, SIZE_UOFFSET};
use std::fmt;

/// Read-only view of a ReadyMessage bound to its buffer
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ReadyMessage<'a> {
    table: Table<'a>,
}

impl_table_view!(ReadyMessage);

impl<'a> ReadyMessage<'a> {
    pub const VT_POGGIES: VOffsetT = 4;
    pub const VT_RFTX_PIN: VOffsetT = 6;
    pub const VT_ACCOUNT_LINKED: VOffsetT = 8;
    pub const VT_NETWORKS_SAVED: VOffsetT = 10;
    pub const VT_NETWORK_CONNECTED: VOffsetT = 12;
    pub const FIELD_COUNT: usize = 5;

    pub const SCHEMA: TableSchema = TableSchema {
        name: "ReadyMessage",
        fields: &[
            FieldDef::new("poggies", 0, FieldKind::Bool),
            FieldDef::new("rftx_pin", 1, FieldKind::U8),
            FieldDef::new("account_linked", 2, FieldKind::Bool),
            FieldDef::new("networks_saved", 3, FieldKind::StringVector),
            FieldDef::new("network_connected", 4, FieldKind::Table("WifiNetwork")),
        ],
    };

    /// Verify the buffer from `start` on and resolve its root table
    ///
    /// The root is an unsigned 32-bit offset relative to `start`, as the
    /// flatbuffers runtime reads it. A `start` past the end of `buf` is
    /// `TruncatedBuffer`.
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

    /// Same as [`Self::read_from`] after skipping a 4-byte size prefix
    ///
    /// The prefix value itself is not compared with the buffer length.
    pub fn read_size_prefixed(buf: &'a [u8]) -> CodecResult<Self> {
        Self::read_size_prefixed_with_opts(&VerifierOptions::default(), buf)
    }

    pub fn read_size_prefixed_with_opts(
        opts: &VerifierOptions,
        buf: &'a [u8],
    ) -> CodecResult<Self> {
        Ok(flatbuffers::size_prefixed_root_with_opts::<Self>(opts, buf)?)
    }

    /// Liveness marker, always true in well-formed messages
    #[inline]
    pub fn poggies(&self) -> bool {
        unsafe { self.table.get::<bool>(Self::VT_POGGIES, Some(false)) }.unwrap_or(false)
    }

    /// Radio transmit pin in use
    #[inline]
    pub fn rftx_pin(&self) -> u8 {
        unsafe { self.table.get::<u8>(Self::VT_RFTX_PIN, Some(0)) }.unwrap_or(0)
    }

    /// Whether a persisted account credential exists
    #[inline]
    pub fn account_linked(&self) -> bool {
        unsafe { self.table.get::<bool>(Self::VT_ACCOUNT_LINKED, Some(false)) }.unwrap_or(false)
    }

    /// Saved network identifiers in storage order, `None` if absent
    #[inline]
    pub fn networks_saved(&self) -> Option<Vector<'a, ForwardsUOffset<&'a str>>> {
        unsafe {
            self.table
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<&'a str>>>>(
                    Self::VT_NETWORKS_SAVED,
                    None,
                )
        }
    }

    pub fn networks_saved_len(&self) -> usize {
        self.networks_saved().map_or(0, |v| v.len())
    }

    /// Saved network at `index`, `None` past the end of the list
    pub fn network_saved(&self, index: usize) -> Option<&'a str> {
        self.networks_saved()
            .filter(|v| index < v.len())
            .map(|v| v.get(index))
    }

    /// Network the device is connected to, `None` if not connected
    #[inline]
    pub fn network_connected(&self) -> Option<WifiNetwork<'a>> {
        unsafe {
            self.table
                .get::<ForwardsUOffset<WifiNetwork>>(Self::VT_NETWORK_CONNECTED, None)
        }
    }

    pub fn unpack(&self) -> OwnedReadyMessage {
        OwnedReadyMessage {
            poggies: self.poggies(),
            rftx_pin: self.rftx_pin(),
            account_linked: self.account_linked(),
            networks_saved: self
                .networks_saved()
                .map(|v| v.iter().map(str::to_string).collect())
                .unwrap_or_default(),
            network_connected: self.network_connected().map(|n| n.unpack()),
        }
    }
}

impl fmt::Debug for ReadyMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadyMessage")
            .field("poggies", &self.poggies())
            .field("rftx_pin", &self.rftx_pin())
            .field("account_linked", &self.account_linked())
            .field("networks_saved", &self.networks_saved())
            .field("network_connected", &self.network_connected())
            .finish()
    }
}

impl Verifiable for ReadyMessage<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<bool>("poggies", Self::VT_POGGIES, false)?
            .visit_field::<u8>("rftx_pin", Self::VT_RFTX_PIN, false)?
            .visit_field::<bool>("account_linked", Self::VT_ACCOUNT_LINKED, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<&str>>>>(
                "networks_saved",
                Self::VT_NETWORKS_SAVED,
                false,
            )?
            .visit_field::<ForwardsUOffset<WifiNetwork>>(
                "network_connected",
                Self::VT_NETWORK_CONNECTED,
                false,
            )?
            .finish();
        Ok(())
    }
}

/// Verify `buf` and return its ReadyMessage root
pub fn root_as_ready_message(buf: &[u8]) -> CodecResult<ReadyMessage<'_>> {
    ReadyMessage::read_from(buf, 0)
}

/// Verify a size-prefixed `buf` and return its ReadyMessage root
pub fn size_prefixed_root_as_ready_message(buf: &[u8]) -> CodecResult<ReadyMessage<'_>> {
    ReadyMessage::read_size_prefixed(buf)
}

/// Field-by-field writer for a ReadyMessage table
///
/// Strings, the saved-network vector and the connected network must be
/// written before `new` is called; the builder accepts no other objects
/// while a table is open.
pub struct ReadyMessageBuilder<'a: 'b, 'b> {
    builder: &'b mut Builder<'a>,
}

impl<'a: 'b, 'b> ReadyMessageBuilder<'a, 'b> {
    pub fn new(builder: &'b mut Builder<'a>) -> CodecResult<Self> {
        builder.start_table(ReadyMessage::FIELD_COUNT)?;
        Ok(Self { builder })
    }

    pub fn add_poggies(&mut self, poggies: bool) -> CodecResult<()> {
        self.builder
            .add_field_bool(ReadyMessage::VT_POGGIES, poggies, false)
    }

    pub fn add_rftx_pin(&mut self, rftx_pin: u8) -> CodecResult<()> {
        self.builder
            .add_field_u8(ReadyMessage::VT_RFTX_PIN, rftx_pin, 0)
    }

    pub fn add_account_linked(&mut self, account_linked: bool) -> CodecResult<()> {
        self.builder
            .add_field_bool(ReadyMessage::VT_ACCOUNT_LINKED, account_linked, false)
    }

    pub fn add_networks_saved(
        &mut self,
        networks_saved: WIPOffset<Vector<'b, ForwardsUOffset<&'b str>>>,
    ) -> CodecResult<()> {
        self.builder
            .add_field_offset(ReadyMessage::VT_NETWORKS_SAVED, networks_saved)
    }

    pub fn add_network_connected(
        &mut self,
        network_connected: WIPOffset<WifiNetwork<'b>>,
    ) -> CodecResult<()> {
        self.builder
            .add_field_offset(ReadyMessage::VT_NETWORK_CONNECTED, network_connected)
    }

    pub fn finish(self) -> CodecResult<WIPOffset<ReadyMessage<'a>>> {
        self.builder.end_table()
    }
}

/// Owned copy of a ReadyMessage, detached from any buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedReadyMessage {
    pub poggies: bool,
    pub rftx_pin: u8,
    pub account_linked: bool,
    pub networks_saved: Vec<String>,
    pub network_connected: Option<OwnedWifiNetwork>,
}

impl OwnedReadyMessage {
    /// Write this message as a table; an empty `networks_saved` is omitted
    pub fn pack<'b>(&self, builder: &mut Builder<'b>) -> CodecResult<WIPOffset<ReadyMessage<'b>>> {
        let networks_saved = if self.networks_saved.is_empty() {
            None
        } else {
            Some(builder.create_vector_of_strings(&self.networks_saved)?)
        };
        let network_connected = self
            .network_connected
            .as_ref()
            .map(|n| n.pack(builder))
            .transpose()?;

        let mut msg = ReadyMessageBuilder::new(builder)?;
        if let Some(network_connected) = network_connected {
            msg.add_network_connected(network_connected)?;
        }
        if let Some(networks_saved) = networks_saved {
            msg.add_networks_saved(networks_saved)?;
        }
        msg.add_account_linked(self.account_linked)?;
        msg.add_rftx_pin(self.rftx_pin)?;
        msg.add_poggies(self.poggies)?;
        msg.finish()
    }

    /// Encode as a standalone buffer
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        let mut builder = Builder::new();
        let root = self.pack(&mut builder)?;
        builder.finish(root)?;
        Ok(builder.finished_data()?.to_vec())
    }

    /// Encode as a buffer framed with a 4-byte size prefix
    pub fn encode_size_prefixed(&self) -> CodecResult<Vec<u8>> {
        let mut builder = Builder::new();
        let root = self.pack(&mut builder)?;
        builder.finish_size_prefixed(root)?;
        Ok(builder.finished_data()?.to_vec())
    }
}
