use log::{debug, info};
use crate::protocol::{ClassOfDevice, DeviceAddress, DiscoveryResult};

/// Verdict on a single inquiry result
#[derive(Debug, Clone, PartialEq)]
pub enum FilterDecision {
    /// This is the configured sink
    Match {
        address: DeviceAddress,
        name: String,
    },

    /// Class of device is not a defined format
    InvalidClass(ClassOfDevice),

    /// Device cannot render audio
    NotRendering(ClassOfDevice),

    /// Rendering device with some other name, or none at all
    NameMismatch(Option<String>),
}

impl FilterDecision {
    pub fn is_match(&self) -> bool {
        matches!(self, FilterDecision::Match { .. })
    }
}

/// Picks the configured sink out of inquiry results.
///
/// Names are compared byte for byte: no case folding and no trimming.
#[derive(Debug, Clone)]
pub struct DiscoveryFilter {
    target_name: String,
}

impl DiscoveryFilter {
    pub fn new(target_name: impl Into<String>) -> Self {
        DiscoveryFilter {
            target_name: target_name.into(),
        }
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn evaluate(&self, result: &DiscoveryResult) -> FilterDecision {
        let cod = result.class_of_device();

        debug!(
            "Scanned device {}: class {}, rssi {:?}, eir {}, name {:?}",
            result.address,
            cod,
            result.rssi(),
            result.eir().map(|e| e.len()).unwrap_or(0),
            result.property_name()
        );

        if !cod.is_valid() {
            debug!("Invalid class of device {}, skipping {}", cod, result.address);
            return FilterDecision::InvalidClass(cod);
        }

        if !cod.is_rendering() {
            debug!("{} is not a rendering device, skipping", result.address);
            return FilterDecision::NotRendering(cod);
        }

        let name = result.resolved_name();
        match name {
            Some(name) if name == self.target_name => {
                info!("Found target device {} ({})", name, result.address);
                FilterDecision::Match {
                    address: result.address,
                    name,
                }
            }
            other => {
                debug!(
                    "{} ({:?}) is not the device we are looking for ({})",
                    result.address, other, self.target_name
                );
                FilterDecision::NameMismatch(other)
            }
        }
    }
}
