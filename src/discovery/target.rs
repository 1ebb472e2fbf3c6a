use crate::protocol::DeviceAddress;

/// The configured sink and, once found, where it lives
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSink {
    /// Name we are looking for
    name: String,

    /// Resolved during discovery
    address: Option<DeviceAddress>,

    /// Name the device reported over the air
    peer_name: Option<String>,
}

impl TargetSink {
    pub fn new(name: impl Into<String>) -> Self {
        TargetSink {
            name: name.into(),
            address: None,
            peer_name: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Option<DeviceAddress> {
        self.address
    }

    pub fn peer_name(&self) -> Option<&str> {
        self.peer_name.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.address.is_some()
    }

    pub fn resolve(&mut self, address: DeviceAddress, peer_name: String) {
        self.address = Some(address);
        self.peer_name = Some(peer_name);
    }

    /// Forget the resolved identity, keeping the configured name
    pub fn clear(&mut self) {
        self.address = None;
        self.peer_name = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_and_clear() {
        let mut target = TargetSink::new("ESP_SPEAKER");
        assert!(!target.is_resolved());

        let addr = DeviceAddress::new([1, 2, 3, 4, 5, 6]);
        target.resolve(addr, "ESP_SPEAKER".to_string());
        assert_eq!(target.address(), Some(addr));
        assert_eq!(target.peer_name(), Some("ESP_SPEAKER"));

        target.clear();
        assert!(!target.is_resolved());
        assert_eq!(target.peer_name(), None);
        assert_eq!(target.name(), "ESP_SPEAKER");
    }
}
