use crate::error::Result;
use crate::framing::try_read_frame;
use crate::state::{Applied, WifiStateStore};
use devlink_config::DevlinkConfig;
use devlink_protocol::{DeviceToLocalMessage, VerifierOptions};
use tokio::io::AsyncReadExt;

/// Per-session limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub max_frame_size: usize,
    pub verifier: VerifierOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&DevlinkConfig::default())
    }
}

impl From<&DevlinkConfig> for SessionOptions {
    fn from(config: &DevlinkConfig) -> Self {
        Self {
            max_frame_size: config.transport.max_frame_size,
            verifier: VerifierOptions {
                max_depth: config.codec.max_depth,
                max_tables: config.codec.max_tables,
                max_apparent_size: config.codec.max_apparent_size,
                ..Default::default()
            },
        }
    }
}

/// Read device frames until the stream closes, applying each to `store`
///
/// Every frame is verified as a size-prefixed `DeviceToLocalMessage`
/// before use. Frames that fail verification are logged and skipped;
/// read errors (including an oversized frame, after which the
/// stream cannot be resynchronised) end the session with an error.
///
/// Returns the number of messages that updated the store.
pub async fn run_session<S>(
    mut stream: S,
    store: &mut WifiStateStore,
    options: SessionOptions,
) -> Result<usize>
where
    S: AsyncReadExt + Unpin,
{
    let mut applied = 0;

    loop {
        let frame = match try_read_frame(&mut stream, options.max_frame_size).await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::debug!("Connection closed after {} messages", applied);
                return Ok(applied);
            }
            Err(e) => {
                tracing::warn!("Failed to read frame: {}", e);
                return Err(e);
            }
        };

        let msg = match DeviceToLocalMessage::read_size_prefixed_with_opts(&options.verifier, &frame)
        {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("Dropping malformed frame of {} bytes: {}", frame.len(), e);
                continue;
            }
        };

        match store.apply(&msg) {
            Applied::Updated => {
                applied += 1;
                tracing::trace!(payload_type = msg.payload_type(), "Applied device message");
            }
            Applied::Ignored => {
                tracing::debug!(
                    "Ignoring device message with payload type {}",
                    msg.payload_type()
                );
            }
        }
    }
}
