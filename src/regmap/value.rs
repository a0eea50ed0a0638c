//! Typed interpretation of raw register words
use super::descriptor::{FlagDesc, RegisterDescriptor, RegisterValueType};
#[cfg(feature = "with_serde")]
use serde::Serialize;

/// State of one flag bit and its label
pub type FlagValue = (bool, String);

/// Interpreted register contents, the variant always matches the descriptor format
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "with_serde",
    derive(Serialize),
    serde(tag = "type", content = "value", rename_all = "lowercase")
)]
pub enum Value {
    Hex(Vec<u8>),
    String(String),
    Integer(i32),
    Float(f32),
    Flags(Vec<FlagValue>),
}

impl Value {
    pub fn kind(&self) -> RegisterValueType {
        match self {
            Value::Hex(_) => RegisterValueType::Hex,
            Value::String(_) => RegisterValueType::String,
            Value::Integer(_) => RegisterValueType::Integer,
            Value::Float(_) => RegisterValueType::Float,
            Value::Flags(_) => RegisterValueType::Flags,
        }
    }
}

/// A register reading interpreted through its descriptor
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Serialize))]
pub struct RegisterValue {
    /// When the source register was read
    #[cfg_attr(feature = "with_serde", serde(rename = "time"))]
    pub timestamp: u32,
    #[cfg_attr(feature = "with_serde", serde(flatten))]
    pub value: Value,
}

impl RegisterValue {
    /// Interpret `reg` as the descriptor's format dictates
    ///
    /// # Panics
    ///
    /// Panics if `reg` is not exactly `desc.length` words, or is wider than the format
    /// can be composed from.
    pub fn new(reg: &[u16], desc: &RegisterDescriptor, timestamp: u32) -> Self {
        assert_eq!(
            reg.len(),
            usize::from(desc.length),
            "register {:#06x} ({}) expects {} words",
            desc.begin,
            desc.name,
            desc.length
        );
        let value = match desc.format {
            RegisterValueType::Hex => Value::Hex(make_hex(reg)),
            RegisterValueType::String => Value::String(make_string(reg)),
            RegisterValueType::Integer => Value::Integer(make_integer(reg)),
            RegisterValueType::Float => Value::Float(make_float(reg, desc.precision)),
            RegisterValueType::Flags => Value::Flags(make_flags(reg, &desc.flags)),
        };
        Self { timestamp, value }
    }

    /// Uninterpreted snapshot of raw words
    pub fn from_hex(reg: &[u16]) -> Self {
        Self {
            timestamp: 0,
            value: Value::Hex(make_hex(reg)),
        }
    }

    #[inline]
    pub fn kind(&self) -> RegisterValueType {
        self.value.kind()
    }
}

fn make_hex(reg: &[u16]) -> Vec<u8> {
    reg.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn make_string(reg: &[u16]) -> String {
    let mut bytes = make_hex(reg);
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Words composed big endian, the first word most significant
fn compose(reg: &[u16]) -> u32 {
    assert!(
        !reg.is_empty() && reg.len() <= 2,
        "{} words do not fit a 32-bit value",
        reg.len()
    );
    reg.iter().fold(0, |acc, w| (acc << 16) | u32::from(*w))
}

#[allow(clippy::cast_possible_wrap)]
fn make_integer(reg: &[u16]) -> i32 {
    compose(reg) as i32
}

/// Fixed point with `precision` fractional bits
#[allow(clippy::cast_possible_truncation)]
fn make_float(reg: &[u16], precision: u16) -> f32 {
    assert!(precision < 32, "float precision {} out of range", precision);
    (f64::from(compose(reg)) / f64::from(1u32 << precision)) as f32
}

fn make_flags(reg: &[u16], flags: &[FlagDesc]) -> Vec<FlagValue> {
    let bits = compose(reg);
    flags
        .iter()
        .map(|(pos, name)| {
            let set = bits
                .checked_shr(u32::from(*pos))
                .map_or(false, |b| b & 1 == 1);
            (set, name.clone())
        })
        .collect()
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Hex(bytes) => {
                write!(f, "0x")?;
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{:.3}", v),
            Value::Flags(flags) => {
                for (set, name) in flags {
                    write!(f, "\n*[{}] {}", u8::from(*set), name)?;
                }
                Ok(())
            }
        }
    }
}

impl core::fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.value, f)
    }
}
