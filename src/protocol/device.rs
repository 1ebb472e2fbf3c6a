use std::fmt;
use std::str::FromStr;
use crate::protocol::constants::*;
use crate::protocol::eir;
use crate::{ByteReader, Error, Result};

/// Bluetooth device address (BD_ADDR), most significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceAddress(pub [u8; BD_ADDR_LEN]);

impl DeviceAddress {
    pub fn new(bytes: [u8; BD_ADDR_LEN]) -> Self {
        DeviceAddress(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; BD_ADDR_LEN] {
        &self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl FromStr for DeviceAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut bytes = [0u8; BD_ADDR_LEN];
        let mut parts = s.split(':');

        for byte in bytes.iter_mut() {
            let part = parts.next()
                .ok_or_else(|| Error::property(format!("Address too short: {}", s)))?;
            if part.len() != 2 {
                return Err(Error::property(format!("Invalid address octet '{}' in {}", part, s)));
            }
            *byte = u8::from_str_radix(part, 16)
                .map_err(|_| Error::property(format!("Invalid address octet '{}' in {}", part, s)))?;
        }

        if parts.next().is_some() {
            return Err(Error::property(format!("Address too long: {}", s)));
        }

        Ok(DeviceAddress(bytes))
    }
}

/// Class of Device bitfield as reported during inquiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassOfDevice(pub u32);

impl ClassOfDevice {
    /// Only format type 1 within 24 bits is defined
    pub fn is_valid(&self) -> bool {
        self.0 <= COD_MAX && (self.0 & COD_FORMAT_TYPE_MASK) == COD_FORMAT_TYPE_1
    }

    pub fn service_classes(&self) -> u16 {
        ((self.0 & COD_SERVICE_MASK) >> COD_SERVICE_SHIFT) as u16
    }

    pub fn major(&self) -> u8 {
        ((self.0 & COD_MAJOR_MASK) >> COD_MAJOR_SHIFT) as u8
    }

    pub fn minor(&self) -> u8 {
        ((self.0 & COD_MINOR_MASK) >> COD_MINOR_SHIFT) as u8
    }

    pub fn has_service(&self, service: u16) -> bool {
        self.service_classes() & service != 0
    }

    /// Audio sink capability
    pub fn is_rendering(&self) -> bool {
        self.has_service(COD_SRVC_RENDERING)
    }
}

impl fmt::Display for ClassOfDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06x}", self.0)
    }
}

/// Property tag used by the stack in discovery results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Name,
    ClassOfDevice,
    Rssi,
    Eir,
}

impl PropertyType {
    /// Create from the stack's property type ID
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(PropertyType::Name),
            2 => Some(PropertyType::ClassOfDevice),
            3 => Some(PropertyType::Rssi),
            4 => Some(PropertyType::Eir),
            _ => None,
        }
    }
}

/// A typed property attached to a discovery result
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceProperty {
    Name(String),
    ClassOfDevice(ClassOfDevice),
    Rssi(i8),
    Eir(Vec<u8>),
}

impl DeviceProperty {
    /// Decode a property from the raw bytes handed over by the stack callback
    pub fn from_raw(kind: PropertyType, value: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(value);

        let property = match kind {
            PropertyType::Name => {
                let name = reader.read_c_string(MAX_NAME_LEN);
                DeviceProperty::Name(String::from_utf8_lossy(name).into_owned())
            }
            PropertyType::ClassOfDevice => {
                let cod = reader.read_u32_le()
                    .map_err(|e| Error::property(format!("class of device: {}", e)))?;
                DeviceProperty::ClassOfDevice(ClassOfDevice(cod))
            }
            PropertyType::Rssi => {
                let rssi = reader.read_i8()
                    .map_err(|e| Error::property(format!("rssi: {}", e)))?;
                DeviceProperty::Rssi(rssi)
            }
            PropertyType::Eir => {
                let data = reader.rest();
                if data.len() > EIR_MAX_LEN {
                    return Err(Error::property(format!("EIR block of {} bytes", data.len())));
                }
                DeviceProperty::Eir(data.to_vec())
            }
        };

        Ok(property)
    }
}

/// One inquiry result: the address plus whatever properties came with it
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryResult {
    pub address: DeviceAddress,
    pub properties: Vec<DeviceProperty>,
}

impl DiscoveryResult {
    pub fn new(address: DeviceAddress, properties: Vec<DeviceProperty>) -> Self {
        DiscoveryResult { address, properties }
    }

    /// Class of device, the last one reported wins. Missing means zero.
    pub fn class_of_device(&self) -> ClassOfDevice {
        self.properties.iter().rev()
            .find_map(|p| match p {
                DeviceProperty::ClassOfDevice(cod) => Some(*cod),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn rssi(&self) -> Option<i8> {
        self.properties.iter().rev().find_map(|p| match p {
            DeviceProperty::Rssi(rssi) => Some(*rssi),
            _ => None,
        })
    }

    pub fn eir(&self) -> Option<&[u8]> {
        self.properties.iter().rev().find_map(|p| match p {
            DeviceProperty::Eir(data) => Some(data.as_slice()),
            _ => None,
        })
    }

    /// Name carried in the name property
    pub fn property_name(&self) -> Option<&str> {
        self.properties.iter().rev().find_map(|p| match p {
            DeviceProperty::Name(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Best available display name: EIR first, then the name property
    pub fn resolved_name(&self) -> Option<String> {
        self.eir()
            .and_then(eir::name_from_eir)
            .or_else(|| self.property_name().map(str::to_string))
    }
}
