//! JSON register map documents
use super::{
    AddressRange, RegisterDescriptor, RegisterMap, RegisterMapLoader, SpecialHandlerInfo,
};
use crate::ErrorKind;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

#[derive(Deserialize)]
struct RegisterMapConfig {
    name: String,
    address_range: AddressRange,
    probe_register: u16,
    default_baudrate: u32,
    #[serde(default)]
    preferred_baudrate: Option<u32>,
    #[serde(default)]
    special_handlers: Vec<SpecialHandlerInfo>,
    registers: Vec<RegisterDescriptor>,
}

impl TryFrom<RegisterMapConfig> for RegisterMap {
    type Error = ErrorKind;

    fn try_from(config: RegisterMapConfig) -> Result<Self, Self::Error> {
        let mut map = RegisterMap {
            applicable_addresses: config.address_range,
            name: config.name,
            probe_register: config.probe_register,
            default_baudrate: config.default_baudrate,
            preferred_baudrate: config
                .preferred_baudrate
                .unwrap_or(config.default_baudrate),
            special_handlers: config.special_handlers,
            register_descriptors: BTreeMap::new(),
        };
        for desc in config.registers {
            map.insert(desc)?;
        }
        Ok(map)
    }
}

fn config_error(source: &str, e: impl core::fmt::Display) -> ErrorKind {
    ErrorKind::Config(format!("{}: {}", source, e))
}

impl RegisterMapLoader {
    /// Load one register map document
    pub fn load(&mut self, document: &serde_json::Value) -> Result<(), ErrorKind> {
        let config = RegisterMapConfig::deserialize(document)
            .map_err(|e| config_error("register map", e))?;
        self.add(RegisterMap::try_from(config)?)
    }

    pub fn load_str(&mut self, document: &str) -> Result<(), ErrorKind> {
        let config: RegisterMapConfig =
            serde_json::from_str(document).map_err(|e| config_error("register map", e))?;
        self.add(RegisterMap::try_from(config)?)
    }

    /// Load every `*.json` document of a directory, in file name order
    pub fn load_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<(), ErrorKind> {
        let dir = dir.as_ref();
        let source = dir.display().to_string();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|e| config_error(&source, e))? {
            let path = entry.map_err(|e| config_error(&source, e))?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            } else {
                warn!(path = %path.display(), "skipping non-JSON file");
            }
        }
        paths.sort();
        for path in paths {
            let source = path.display().to_string();
            let document = std::fs::read_to_string(&path).map_err(|e| config_error(&source, e))?;
            let config: RegisterMapConfig =
                serde_json::from_str(&document).map_err(|e| config_error(&source, e))?;
            self.add(RegisterMap::try_from(config)?)?;
        }
        Ok(())
    }
}
