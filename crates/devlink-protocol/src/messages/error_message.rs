//! ErrorMessage table: a human-readable failure reported by the device

use crate::builder::Builder;
use crate::error::CodecResult;
use crate::schema::{FieldDef, FieldKind, TableSchema};
use flatbuffers::{ForwardsUOffset, InvalidFlatbuffer, Table, Verifiable, Verifier};
use flatbuffers::{VOffsetT, WIPOffset};
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ErrorMessage<'a> {
    table: Table<'a>,
}

impl_table_view!(ErrorMessage);

impl<'a> ErrorMessage<'a> {
    pub const VT_MESSAGE: VOffsetT = 4;
    pub const FIELD_COUNT: usize = 1;

    pub const SCHEMA: TableSchema = TableSchema {
        name: "ErrorMessage",
        fields: &[FieldDef::new("message", 0, FieldKind::String)],
    };

    #[inline]
    pub fn message(&self) -> Option<&'a str> {
        unsafe { self.table.get::<ForwardsUOffset<&str>>(Self::VT_MESSAGE, None) }
    }

    pub fn unpack(&self) -> OwnedErrorMessage {
        OwnedErrorMessage {
            message: self.message().map(str::to_string),
        }
    }
}

impl fmt::Debug for ErrorMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorMessage")
            .field("message", &self.message())
            .finish()
    }
}

impl Verifiable for ErrorMessage<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<&str>>("message", Self::VT_MESSAGE, false)?
            .finish();
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedErrorMessage {
    pub message: Option<String>,
}

impl OwnedErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn pack<'b>(&self, builder: &mut Builder<'b>) -> CodecResult<WIPOffset<ErrorMessage<'b>>> {
        let message = self
            .message
            .as_deref()
            .map(|s| builder.create_string(s))
            .transpose()?;
        builder.start_table(ErrorMessage::FIELD_COUNT)?;
        if let Some(message) = message {
            builder.add_field_offset(ErrorMessage::VT_MESSAGE, message)?;
        }
        builder.end_table()
    }
}
