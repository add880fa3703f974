//! Stream transport for device-to-local messages
//!
//! Frames are size-prefixed buffers read from any tokio byte stream. A
//! session verifies each frame and applies it to a [`WifiStateStore`].

pub mod error;
pub mod framing;
pub mod session;
pub mod state;

pub use error::{FramingError, Result};
pub use framing::{
    read_frame, try_read_frame, write_device_message, write_frame, write_message, FrameHeader,
    FrameWriter,
};
pub use session::{run_session, SessionOptions};
pub use state::{Applied, WifiStateStore};
