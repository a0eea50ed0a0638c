#[cfg(feature = "with_serde")]
use serde::{Deserialize, Serialize};

/// How the contents of a register are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "with_serde",
    derive(Deserialize, Serialize),
    serde(rename_all = "UPPERCASE")
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterValueType {
    #[default]
    Hex,
    String,
    Integer,
    Float,
    Flags,
}

impl RegisterValueType {
    /// Widest register (in words) the format can be composed from, if limited
    pub fn max_words(self) -> Option<u16> {
        match self {
            RegisterValueType::Hex | RegisterValueType::String => None,
            RegisterValueType::Integer | RegisterValueType::Float | RegisterValueType::Flags => {
                Some(2)
            }
        }
    }
}

/// Bit position and label of one flag
pub type FlagDesc = (u8, String);

#[cfg(feature = "with_serde")]
fn default_keep() -> u16 {
    1
}

/// Configuration of one register as found in a register map
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "with_serde", derive(Deserialize, Serialize))]
pub struct RegisterDescriptor {
    /// Starting address
    pub begin: u16,
    /// Width in 16-bit words
    pub length: u16,
    pub name: String,
    /// Depth of the historical record
    #[cfg_attr(feature = "with_serde", serde(default = "default_keep"))]
    pub keep: u16,
    /// Keep a reading only when it differs from the previous one
    #[cfg_attr(feature = "with_serde", serde(default))]
    pub changes_only: bool,
    #[cfg_attr(feature = "with_serde", serde(default))]
    pub format: RegisterValueType,
    /// Fractional bits of a FLOAT register
    #[cfg_attr(feature = "with_serde", serde(default))]
    pub precision: u16,
    #[cfg_attr(feature = "with_serde", serde(default))]
    pub flags: Vec<FlagDesc>,
}

impl Default for RegisterDescriptor {
    fn default() -> Self {
        Self {
            begin: 0,
            length: 0,
            name: String::new(),
            keep: 1,
            changes_only: false,
            format: RegisterValueType::Hex,
            precision: 0,
            flags: Vec::new(),
        }
    }
}

impl RegisterDescriptor {
    pub fn new(begin: u16, length: u16, name: &str) -> Self {
        Self {
            begin,
            length,
            name: name.to_owned(),
            ..Self::default()
        }
    }

    pub fn with_keep(mut self, keep: u16) -> Self {
        self.keep = keep;
        self
    }

    pub fn with_changes_only(mut self, changes_only: bool) -> Self {
        self.changes_only = changes_only;
        self
    }

    pub fn with_format(mut self, format: RegisterValueType) -> Self {
        self.format = format;
        self
    }

    pub fn with_precision(mut self, precision: u16) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_flag(mut self, bit: u8, name: &str) -> Self {
        self.flags.push((bit, name.to_owned()));
        self
    }

    /// Reason the descriptor can not be used, if any
    pub fn check(&self) -> Result<(), String> {
        if self.length == 0 {
            return Err(format!("register {:#06x} has zero length", self.begin));
        }
        if self.keep == 0 {
            return Err(format!("register {:#06x} keeps no history", self.begin));
        }
        if let Some(max) = self.format.max_words() {
            if self.length > max {
                return Err(format!(
                    "register {:#06x} is {} words wide, {:?} allows {}",
                    self.begin, self.length, self.format, max
                ));
            }
        }
        if self.format == RegisterValueType::Float && self.precision >= 32 {
            return Err(format!(
                "register {:#06x} precision {} out of range",
                self.begin, self.precision
            ));
        }
        Ok(())
    }
}
