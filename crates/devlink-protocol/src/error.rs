use flatbuffers::InvalidFlatbuffer;
use thiserror::Error;

/// Codec errors
///
/// Absent fields are never an error: they resolve to the field default.
/// Everything here signals either a buffer that cannot be read safely or a
/// builder that was driven out of order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Truncated buffer: {needed} bytes at offset {offset} lie past the end")]
    TruncatedBuffer { offset: usize, needed: usize },

    #[error("Invalid UTF-8 in string at offset {offset}")]
    InvalidEncoding { offset: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Misaligned {ty} at offset {offset}")]
    Misaligned { offset: usize, ty: &'static str },

    #[error("Nesting depth limit exceeded")]
    DepthLimitExceeded,

    #[error("Table limit exceeded")]
    TableLimitExceeded,

    #[error("Apparent message size limit exceeded")]
    SizeLimitExceeded,
}

pub type CodecResult<T> = Result<T, CodecError>;

impl From<InvalidFlatbuffer> for CodecError {
    fn from(err: InvalidFlatbuffer) -> Self {
        match err {
            InvalidFlatbuffer::RangeOutOfBounds { range, .. } => CodecError::TruncatedBuffer {
                offset: range.start,
                needed: range.len(),
            },
            InvalidFlatbuffer::Utf8Error { range, .. } => {
                CodecError::InvalidEncoding { offset: range.start }
            }
            InvalidFlatbuffer::Unaligned {
                position,
                unaligned_type,
                ..
            } => CodecError::Misaligned {
                offset: position,
                ty: unaligned_type,
            },
            InvalidFlatbuffer::MissingNullTerminator { range, .. } => CodecError::MalformedMessage(
                format!("string at {}..{} has no NUL terminator", range.start, range.end),
            ),
            InvalidFlatbuffer::SignedOffsetOutOfBounds {
                soffset, position, ..
            } => CodecError::MalformedMessage(format!(
                "vtable offset {} at {} points outside the buffer",
                soffset, position
            )),
            InvalidFlatbuffer::InconsistentUnion {
                field, field_type, ..
            } => CodecError::MalformedMessage(format!(
                "union fields `{}` and `{}` must be set together",
                field, field_type
            )),
            InvalidFlatbuffer::MissingRequiredField { required, .. } => {
                CodecError::MalformedMessage(format!("missing required field `{}`", required))
            }
            InvalidFlatbuffer::TooManyTables => CodecError::TableLimitExceeded,
            InvalidFlatbuffer::DepthLimitReached => CodecError::DepthLimitExceeded,
            InvalidFlatbuffer::ApparentSizeTooLarge => CodecError::SizeLimitExceeded,
        }
    }
}
