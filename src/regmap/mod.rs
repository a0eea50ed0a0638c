//! Register maps: per device type register layout, typed values and reading history
//!
//! A [`RegisterMapDatabase`] is built once at startup through a [`RegisterMapLoader`] and
//! is read-only afterwards. Register stores borrow their descriptors from it, so the
//! database outlives every history kept for the devices it describes.
#[cfg(feature = "with_serde")]
mod config;
pub mod descriptor;
pub mod range;
pub mod store;
pub mod value;

pub use descriptor::{FlagDesc, RegisterDescriptor, RegisterValueType};
pub use range::AddressRange;
pub use store::{Register, RegisterStore, RegisterStoreValue};
pub use value::{FlagValue, RegisterValue, Value};

use crate::ErrorKind;
use std::collections::BTreeMap;
use tracing::info;

#[cfg(feature = "with_serde")]
use serde::{Deserialize, Serialize};

/// Payload of a periodic write handler
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "with_serde", derive(Deserialize, Serialize))]
pub struct WriteActionInfo {
    /// Shell command whose output is the value to write
    #[cfg_attr(feature = "with_serde", serde(default))]
    pub shell: Option<String>,
    /// How `shell` output or `value` turns into register words
    pub interpret: RegisterValueType,
    #[cfg_attr(feature = "with_serde", serde(default))]
    pub value: Option<String>,
}

/// Action run against a device every `period` seconds
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "with_serde", derive(Deserialize, Serialize))]
pub struct SpecialHandlerInfo {
    pub reg: u16,
    pub len: u16,
    pub period: i32,
    pub action: String,
    pub info: WriteActionInfo,
}

/// Everything known about one device type
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterMap {
    pub applicable_addresses: AddressRange,
    pub name: String,
    /// Register read to detect and identify a device
    pub probe_register: u16,
    pub default_baudrate: u32,
    pub preferred_baudrate: u32,
    pub special_handlers: Vec<SpecialHandlerInfo>,
    pub register_descriptors: BTreeMap<u16, RegisterDescriptor>,
}

impl RegisterMap {
    pub fn new(applicable_addresses: AddressRange, name: &str, probe_register: u16) -> Self {
        Self {
            applicable_addresses,
            name: name.to_owned(),
            probe_register,
            default_baudrate: 19200,
            preferred_baudrate: 19200,
            special_handlers: Vec::new(),
            register_descriptors: BTreeMap::new(),
        }
    }

    /// Add a descriptor, keyed by its starting address
    pub fn insert(&mut self, desc: RegisterDescriptor) -> Result<(), ErrorKind> {
        desc.check().map_err(ErrorKind::Config)?;
        if self.register_descriptors.contains_key(&desc.begin) {
            return Err(ErrorKind::Config(format!(
                "{}: duplicate register {:#06x}",
                self.name, desc.begin
            )));
        }
        self.register_descriptors.insert(desc.begin, desc);
        Ok(())
    }

    pub fn at(&self, reg: u16) -> Result<&RegisterDescriptor, ErrorKind> {
        self.register_descriptors
            .get(&reg)
            .ok_or(ErrorKind::RegisterNotFound(reg))
    }

    /// Descriptors in address order
    pub fn descriptors(&self) -> impl Iterator<Item = &RegisterDescriptor> {
        self.register_descriptors.values()
    }

    /// Empty history for every register of the map
    pub fn stores(&self) -> Vec<RegisterStore<'_>> {
        self.descriptors().map(RegisterStore::new).collect()
    }

    fn check(&self) -> Result<(), ErrorKind> {
        for desc in self.descriptors() {
            desc.check()
                .map_err(|e| ErrorKind::Config(format!("{}: {}", self.name, e)))?;
        }
        Ok(())
    }
}

/// Register maps being loaded, see [`RegisterMapLoader::finish`]
#[derive(Debug, Default)]
pub struct RegisterMapLoader {
    regmaps: Vec<RegisterMap>,
}

impl RegisterMapLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a register map
    ///
    /// Fails if the map's address range overlaps one already loaded.
    pub fn add(&mut self, map: RegisterMap) -> Result<(), ErrorKind> {
        map.check()?;
        if let Some(other) = self
            .regmaps
            .iter()
            .find(|m| m.applicable_addresses.overlaps(&map.applicable_addresses))
        {
            return Err(ErrorKind::Config(format!(
                "{} {} overlaps {} {}",
                map.name, map.applicable_addresses, other.name, other.applicable_addresses
            )));
        }
        info!(
            name = %map.name,
            addresses = %map.applicable_addresses,
            registers = map.register_descriptors.len(),
            "register map loaded"
        );
        self.regmaps.push(map);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.regmaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regmaps.is_empty()
    }

    /// Freeze the loaded maps
    pub fn finish(mut self) -> RegisterMapDatabase {
        self.regmaps.sort_by_key(|m| m.applicable_addresses);
        RegisterMapDatabase {
            regmaps: self.regmaps,
        }
    }
}

/// Read-only collection of register maps, looked up by device address
#[derive(Debug, Default)]
pub struct RegisterMapDatabase {
    regmaps: Vec<RegisterMap>,
}

impl RegisterMapDatabase {
    /// Register map of the device at `addr`
    pub fn at(&self, addr: u8) -> Result<&RegisterMap, ErrorKind> {
        self.regmaps
            .iter()
            .find(|m| m.applicable_addresses.contains(addr))
            .ok_or(ErrorKind::AddressNotFound(addr))
    }

    /// Maps ordered by address range
    pub fn iter(&self) -> impl Iterator<Item = &RegisterMap> {
        self.regmaps.iter()
    }

    pub fn len(&self) -> usize {
        self.regmaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regmaps.is_empty()
    }
}

impl core::fmt::Display for RegisterMapDatabase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for m in &self.regmaps {
            writeln!(
                f,
                "{} {} probe={:#06x} baud={}/{} registers={} handlers={}",
                m.name,
                m.applicable_addresses,
                m.probe_register,
                m.default_baudrate,
                m.preferred_baudrate,
                m.register_descriptors.len(),
                m.special_handlers.len()
            )?;
        }
        Ok(())
    }
}
