// Class of Device layout
pub const COD_FORMAT_TYPE_MASK: u32 = 0x0000_0003;
pub const COD_FORMAT_TYPE_1: u32 = 0x0000_0000;
pub const COD_MINOR_MASK: u32 = 0x0000_00FC;
pub const COD_MINOR_SHIFT: u32 = 2;
pub const COD_MAJOR_MASK: u32 = 0x0000_1F00;
pub const COD_MAJOR_SHIFT: u32 = 8;
pub const COD_SERVICE_MASK: u32 = 0x00FF_E000;
pub const COD_SERVICE_SHIFT: u32 = 13;
pub const COD_MAX: u32 = 0x00FF_FFFF;

// Service class bits, after shifting out of the CoD
pub const COD_SRVC_LIMITED_DISCOVERABLE: u16 = 0x001;
pub const COD_SRVC_POSITIONING: u16 = 0x008;
pub const COD_SRVC_NETWORKING: u16 = 0x010;
pub const COD_SRVC_RENDERING: u16 = 0x020;
pub const COD_SRVC_CAPTURING: u16 = 0x040;
pub const COD_SRVC_OBJECT_TRANSFER: u16 = 0x080;
pub const COD_SRVC_AUDIO: u16 = 0x100;
pub const COD_SRVC_TELEPHONY: u16 = 0x200;
pub const COD_SRVC_INFORMATION: u16 = 0x400;

// Major device classes
pub const COD_MAJOR_AUDIO_VIDEO: u8 = 0x04;
pub const COD_MAJOR_PHONE: u8 = 0x02;

// Extended inquiry response data types
pub const EIR_TYPE_SHORT_LOCAL_NAME: u8 = 0x08;
pub const EIR_TYPE_CMPL_LOCAL_NAME: u8 = 0x09;
pub const EIR_MAX_LEN: usize = 240;

/// Longest remote name kept, in bytes
pub const MAX_NAME_LEN: usize = 248;

pub const BD_ADDR_LEN: usize = 6;

// Inquiry length is in units of 1.28 s
pub const INQUIRY_LEN_MIN: u8 = 0x01;
pub const INQUIRY_LEN_MAX: u8 = 0x30;
pub const DEFAULT_INQUIRY_LEN: u8 = 10;

// Default values
pub const DEFAULT_DEVICE_NAME: &str = "Squeezelite";
pub const DEFAULT_HEARTBEAT_MS: u64 = 500;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 1000;
pub const MAX_HEARTBEAT_MS: u64 = 24 * 60 * 60 * 1000;
pub const MAX_CONNECT_TIMEOUT_MS: u64 = 10 * 60 * 1000;
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;
pub const DEFAULT_PIN_CODE: &str = "1234";
pub const SECURE_PIN_LEN: usize = 16;
