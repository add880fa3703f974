//! Size-prefixed frame format:
//! ```text
//! ┌──────────┬──────────────────────────┐
//! │ Length   │ Buffer                   │
//! │ 4 bytes  │ N bytes                  │
//! │ (u32 LE) │ (root offset + tables)   │
//! └──────────┴──────────────────────────┘
//! ```
//!
//! The length excludes itself. A frame is exactly what
//! `Builder::finish_size_prefixed` produces, so it can be handed to the
//! size-prefixed readers unchanged.

use crate::error::{FramingError, Result};
use devlink_config::DevlinkConfig;
use devlink_protocol::{Builder, CodecError, OwnedDeviceToLocalMessage};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Length word in front of every frame
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct FrameHeader {
    len: U32,
}

impl FrameHeader {
    pub const SIZE: usize = std::mem::size_of::<FrameHeader>();

    pub fn new(len: u32) -> Self {
        Self { len: U32::new(len) }
    }

    /// Length of the buffer that follows the header
    pub fn len(&self) -> usize {
        self.len.get() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write `payload` preceded by its length
pub async fn write_frame<W>(stream: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWriteExt + Unpin,
{
    let len = payload.len();
    if len > u32::MAX as usize {
        return Err(FramingError::FrameTooLarge {
            size: len,
            max: u32::MAX as usize,
        });
    }

    stream
        .write_all(FrameHeader::new(len as u32).as_bytes())
        .await?;
    stream.write_all(payload).await?;
    stream.flush().await?;

    Ok(())
}

/// Write the buffer of a builder finished with `finish_size_prefixed`
pub async fn write_message<W>(stream: &mut W, builder: &Builder<'_>) -> Result<()>
where
    W: AsyncWriteExt + Unpin,
{
    let data = builder.finished_data()?;
    let declared = FrameHeader::read_from_prefix(data)
        .map(|(header, _)| header.len())
        .ok();
    if !builder.is_size_prefixed() || declared != Some(data.len() - FrameHeader::SIZE) {
        return Err(CodecError::InvalidArgument(
            "builder was not finished with a size prefix".to_string(),
        )
        .into());
    }

    stream.write_all(data).await?;
    stream.flush().await?;

    Ok(())
}

/// Encode `msg` and write it as one frame
pub async fn write_device_message<W>(stream: &mut W, msg: &OwnedDeviceToLocalMessage) -> Result<()>
where
    W: AsyncWriteExt + Unpin,
{
    let mut builder = Builder::new();
    let root = msg.pack(&mut builder)?;
    builder.finish_size_prefixed(root)?;
    write_message(stream, &builder).await
}

/// Encodes device messages into one reused builder
///
/// The builder allocation is kept between messages, so steady-state
/// sending does not allocate once the largest message has been seen.
#[derive(Debug, Default)]
pub struct FrameWriter {
    builder: Builder<'static>,
}

impl FrameWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            builder: Builder::with_capacity(capacity),
        }
    }

    pub fn from_config(config: &DevlinkConfig) -> Self {
        Self::with_capacity(config.codec.builder_capacity)
    }

    /// Encode `msg` as a size-prefixed frame and write it
    pub async fn send<W>(&mut self, stream: &mut W, msg: &OwnedDeviceToLocalMessage) -> Result<()>
    where
        W: AsyncWriteExt + Unpin,
    {
        self.builder.reset();
        let root = msg.pack(&mut self.builder)?;
        self.builder.finish_size_prefixed(root)?;
        write_message(stream, &self.builder).await
    }
}

/// Read one frame, or `None` if the stream ends cleanly before it starts
///
/// Returns the whole frame including its 4-byte length. A declared length
/// above `max_frame_size` is rejected before anything is allocated for it.
pub async fn try_read_frame<R>(stream: &mut R, max_frame_size: usize) -> Result<Option<Vec<u8>>>
where
    R: AsyncReadExt + Unpin,
{
    let mut header = [0u8; FrameHeader::SIZE];
    let mut filled = 0;
    while filled < FrameHeader::SIZE {
        let n = stream.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "stream ended inside a frame header",
            )
            .into());
        }
        filled += n;
    }

    let len = FrameHeader::read_from_bytes(&header)
        .map_err(|_| CodecError::InvalidArgument("short frame header".to_string()))?
        .len();
    if len > max_frame_size {
        return Err(FramingError::FrameTooLarge {
            size: len,
            max: max_frame_size,
        });
    }

    let mut frame = vec![0u8; FrameHeader::SIZE + len];
    frame[..FrameHeader::SIZE].copy_from_slice(&header);
    stream.read_exact(&mut frame[FrameHeader::SIZE..]).await?;

    Ok(Some(frame))
}

/// Read one frame; end of stream is an `UnexpectedEof` error
pub async fn read_frame<R>(stream: &mut R, max_frame_size: usize) -> Result<Vec<u8>>
where
    R: AsyncReadExt + Unpin,
{
    try_read_frame(stream, max_frame_size).await?.ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "stream closed").into()
    })
}
