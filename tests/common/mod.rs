// Common test utilities and helper functions

#![allow(dead_code)]

use std::sync::Arc;
use a2dp::DeviceAddress;

pub use a2dp::mock::{scan_result, Command, RecordingStack, ScriptedProducer};

pub const SINK_NAME: &str = "ESP_SPEAKER";
pub const SPEAKER_COD: u32 = 0x24_0414;

pub fn sink_address() -> DeviceAddress {
    DeviceAddress::new([0x30, 0xae, 0xa4, 0x7a, 0x1c, 0x02])
}

/// A stack playing the part of [`SINK_NAME`], always in range and accepting
/// everything
pub fn cooperative_sink() -> Arc<RecordingStack> {
    RecordingStack::cooperative(sink_address(), SPEAKER_COD, SINK_NAME)
}

/// Initialize logging once for the test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
