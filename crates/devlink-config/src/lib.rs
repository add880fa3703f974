pub mod settings;

pub use settings::{
    CodecConfig, ConfigError, DevlinkConfig, Result, TransportConfig, MAX_BUILDER_CAPACITY,
    MAX_FRAME_SIZE_LIMIT,
};
