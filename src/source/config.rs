use std::time::Duration;
use crate::protocol::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_DEVICE_NAME, DEFAULT_HEARTBEAT_MS, DEFAULT_INQUIRY_LEN,
    DEFAULT_PIN_CODE, DEFAULT_QUEUE_CAPACITY, INQUIRY_LEN_MAX, INQUIRY_LEN_MIN,
    MAX_CONNECT_TIMEOUT_MS, MAX_HEARTBEAT_MS, MAX_NAME_LEN, SECURE_PIN_LEN,
};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Name of the sink to connect to, matched exactly
    pub sink_name: String,

    /// Name this adapter advertises
    pub device_name: String,

    /// Heartbeat period
    pub heartbeat_period: Duration,

    /// How long a connect attempt may take
    pub connect_timeout: Duration,

    /// Inquiry duration in units of 1.28 s
    pub inquiry_len: u8,

    /// Event queue capacity
    pub queue_capacity: usize,

    /// Legacy pairing PIN
    pub pin_code: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            sink_name: String::new(),
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            heartbeat_period: Duration::from_millis(DEFAULT_HEARTBEAT_MS),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            inquiry_len: DEFAULT_INQUIRY_LEN,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            pin_code: DEFAULT_PIN_CODE.to_string(),
        }
    }
}

impl SourceConfig {
    /// Defaults with the given sink name
    pub fn new(sink_name: impl Into<String>) -> Self {
        SourceConfig {
            sink_name: sink_name.into(),
            ..SourceConfig::default()
        }
    }

    /// Create config builder
    pub fn builder() -> SourceConfigBuilder {
        SourceConfigBuilder::new()
    }

    /// Connect timeout in clock milliseconds, saturating at `u64::MAX`
    pub fn connect_timeout_ms(&self) -> u64 {
        u64::try_from(self.connect_timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.sink_name.is_empty() {
            return Err(Error::config("Sink name must not be empty"));
        }

        if self.sink_name.len() > MAX_NAME_LEN {
            return Err(Error::config(format!(
                "Sink name must not exceed {} bytes",
                MAX_NAME_LEN
            )));
        }

        if self.device_name.is_empty() || self.device_name.len() > MAX_NAME_LEN {
            return Err(Error::config("Device name must be 1 to 248 bytes"));
        }

        if self.heartbeat_period.is_zero() {
            return Err(Error::config("Heartbeat period must be positive"));
        }

        if self.heartbeat_period > Duration::from_millis(MAX_HEARTBEAT_MS) {
            return Err(Error::config(format!(
                "Heartbeat period must not exceed {} ms",
                MAX_HEARTBEAT_MS
            )));
        }

        if self.connect_timeout.is_zero() {
            return Err(Error::config("Connect timeout must be positive"));
        }

        if self.connect_timeout > Duration::from_millis(MAX_CONNECT_TIMEOUT_MS) {
            return Err(Error::config(format!(
                "Connect timeout must not exceed {} ms",
                MAX_CONNECT_TIMEOUT_MS
            )));
        }

        if !(INQUIRY_LEN_MIN..=INQUIRY_LEN_MAX).contains(&self.inquiry_len) {
            return Err(Error::config(format!(
                "Inquiry length must be between {} and {}",
                INQUIRY_LEN_MIN, INQUIRY_LEN_MAX
            )));
        }

        if self.queue_capacity == 0 {
            return Err(Error::config("Queue capacity must be positive"));
        }

        if self.pin_code.is_empty()
            || self.pin_code.len() > SECURE_PIN_LEN
            || !self.pin_code.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(Error::config("PIN code must be 1 to 16 digits"));
        }

        Ok(())
    }
}

/// Builder for SourceConfig
pub struct SourceConfigBuilder {
    config: SourceConfig,
}

impl SourceConfigBuilder {
    /// Create new builder
    pub fn new() -> Self {
        SourceConfigBuilder {
            config: SourceConfig::default(),
        }
    }

    pub fn sink_name(mut self, name: impl Into<String>) -> Self {
        self.config.sink_name = name.into();
        self
    }

    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.config.device_name = name.into();
        self
    }

    pub fn heartbeat_period(mut self, period: Duration) -> Self {
        self.config.heartbeat_period = period;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn inquiry_len(mut self, len: u8) -> Self {
        self.config.inquiry_len = len;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn pin_code(mut self, pin: impl Into<String>) -> Self {
        self.config.pin_code = pin.into();
        self
    }

    /// Build configuration
    pub fn build(self) -> Result<SourceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for SourceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SourceConfig::builder().sink_name("ESP_SPEAKER").build().unwrap();

        assert_eq!(config.device_name, "Squeezelite");
        assert_eq!(config.heartbeat_period, Duration::from_millis(500));
        assert_eq!(config.connect_timeout_ms(), 1000);
        assert_eq!(config.inquiry_len, 10);
        assert_eq!(config.pin_code, "1234");
    }

    #[test]
    fn test_sink_name_required() {
        assert!(matches!(
            SourceConfig::builder().build(),
            Err(Error::Configuration(_))
        ));
        assert!(SourceConfig::new("x".repeat(249)).validate().is_err());
        assert!(SourceConfig::new("x".repeat(248)).validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            SourceConfig::builder().sink_name("s").heartbeat_period(Duration::ZERO),
            SourceConfig::builder().sink_name("s").connect_timeout(Duration::ZERO),
            SourceConfig::builder().sink_name("s").inquiry_len(0),
            SourceConfig::builder().sink_name("s").inquiry_len(0x31),
            SourceConfig::builder().sink_name("s").queue_capacity(0),
            SourceConfig::builder().sink_name("s").pin_code("12a4"),
            SourceConfig::builder().sink_name("s").pin_code("12345678901234567"),
        ];

        for builder in bad {
            assert!(builder.build().is_err());
        }
    }

    #[test]
    fn test_timing_upper_bounds() {
        let too_long = [
            SourceConfig::builder().sink_name("s").heartbeat_period(Duration::MAX),
            SourceConfig::builder()
                .sink_name("s")
                .heartbeat_period(Duration::from_millis(MAX_HEARTBEAT_MS + 1)),
            SourceConfig::builder().sink_name("s").connect_timeout(Duration::MAX),
            SourceConfig::builder()
                .sink_name("s")
                .connect_timeout(Duration::from_millis(MAX_CONNECT_TIMEOUT_MS + 1)),
            // Would wrap to 5000 ms if truncated
            SourceConfig::builder()
                .sink_name("s")
                .connect_timeout(Duration::from_millis(u64::MAX) + Duration::from_millis(5001)),
        ];

        for builder in too_long {
            assert!(matches!(builder.build(), Err(Error::Configuration(_))));
        }

        let longest = SourceConfig::builder()
            .sink_name("s")
            .heartbeat_period(Duration::from_millis(MAX_HEARTBEAT_MS))
            .connect_timeout(Duration::from_millis(MAX_CONNECT_TIMEOUT_MS))
            .build()
            .unwrap();
        assert_eq!(longest.connect_timeout_ms(), MAX_CONNECT_TIMEOUT_MS);
    }

    #[test]
    fn test_connect_timeout_ms_saturates() {
        let config = SourceConfig {
            connect_timeout: Duration::MAX,
            ..SourceConfig::new("s")
        };
        assert_eq!(config.connect_timeout_ms(), u64::MAX);

        let config = SourceConfig {
            connect_timeout: Duration::from_millis(u64::MAX) + Duration::from_millis(5001),
            ..SourceConfig::new("s")
        };
        assert_eq!(config.connect_timeout_ms(), u64::MAX);
    }
}
