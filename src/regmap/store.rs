//! Register readings and their fixed-depth history
use super::descriptor::RegisterDescriptor;
use super::value::RegisterValue;
#[cfg(feature = "with_serde")]
use serde::Serialize;

/// One raw reading of a register
///
/// A zero timestamp marks a register that was never read. Such a reading is not equal to
/// anything, itself included, so retention logic always treats it as changed.
#[derive(Debug, Clone)]
pub struct Register<'a> {
    desc: &'a RegisterDescriptor,
    pub timestamp: u32,
    value: Vec<u16>,
}

impl<'a> Register<'a> {
    pub fn new(desc: &'a RegisterDescriptor) -> Self {
        Self {
            desc,
            timestamp: 0,
            value: vec![0; usize::from(desc.length)],
        }
    }

    /// Reading taken at `timestamp`
    ///
    /// # Panics
    ///
    /// Panics if `words` is not as wide as the register
    pub fn with_value(desc: &'a RegisterDescriptor, timestamp: u32, words: &[u16]) -> Self {
        let mut reg = Self::new(desc);
        reg.set(timestamp, words);
        reg
    }

    #[inline]
    pub fn descriptor(&self) -> &'a RegisterDescriptor {
        self.desc
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.timestamp != 0
    }

    #[inline]
    pub fn words(&self) -> &[u16] {
        &self.value
    }

    /// Overwrite the reading
    ///
    /// # Panics
    ///
    /// Panics if `words` is not as wide as the register
    pub fn set(&mut self, timestamp: u32, words: &[u16]) {
        assert_eq!(
            words.len(),
            self.value.len(),
            "register {:#06x} ({}) is {} words wide",
            self.desc.begin,
            self.desc.name,
            self.value.len()
        );
        self.value.copy_from_slice(words);
        self.timestamp = timestamp;
    }

    /// Interpreted value of the reading
    pub fn value(&self) -> RegisterValue {
        RegisterValue::new(&self.value, self.desc, self.timestamp)
    }
}

impl PartialEq for Register<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp != 0 && other.timestamp != 0 && self.value == other.value
    }
}

impl core::fmt::Display for Register<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if !self.is_valid() {
            return write!(f, "<invalid>");
        }
        for w in &self.value {
            write!(f, "{:04x}", w)?;
        }
        Ok(())
    }
}

/// History of one register, a circular buffer `keep` readings deep
///
/// `front` is the slot written next, `back` the one written last. The buffer never fills
/// up, writing simply overwrites the oldest reading.
#[derive(Debug, Clone)]
pub struct RegisterStore<'a> {
    desc: &'a RegisterDescriptor,
    pub reg_addr: u16,
    history: Vec<Register<'a>>,
    idx: usize,
}

impl<'a> RegisterStore<'a> {
    /// # Panics
    ///
    /// Panics if the descriptor keeps no history
    pub fn new(desc: &'a RegisterDescriptor) -> Self {
        assert!(desc.keep > 0, "register {:#06x} keeps no history", desc.begin);
        Self {
            desc,
            reg_addr: desc.begin,
            history: vec![Register::new(desc); usize::from(desc.keep)],
            idx: 0,
        }
    }

    #[inline]
    pub fn descriptor(&self) -> &'a RegisterDescriptor {
        self.desc
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.history.len()
    }

    /// Last written reading
    pub fn back(&self) -> &Register<'a> {
        if self.idx == 0 {
            &self.history[self.history.len() - 1]
        } else {
            &self.history[self.idx - 1]
        }
    }

    /// Slot written next
    #[inline]
    pub fn front(&self) -> &Register<'a> {
        &self.history[self.idx]
    }

    #[inline]
    pub fn front_mut(&mut self) -> &mut Register<'a> {
        &mut self.history[self.idx]
    }

    pub fn advance(&mut self) {
        self.idx = (self.idx + 1) % self.history.len();
    }

    /// Does `reading` pass the `changes_only` policy against the last reading
    pub fn should_retain(&self, reading: &Register<'a>) -> bool {
        !self.desc.changes_only || reading != self.back()
    }

    /// Store a reading into `front` and advance, unless the retention policy skips it
    ///
    /// Returns whether the reading was kept.
    pub fn record(&mut self, timestamp: u32, words: &[u16]) -> bool {
        let reading = Register::with_value(self.desc, timestamp, words);
        if !self.should_retain(&reading) {
            return false;
        }
        *self.front_mut() = reading;
        self.advance();
        true
    }

    /// All slots, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Register<'a>> {
        self.history[self.idx..]
            .iter()
            .chain(self.history[..self.idx].iter())
    }

    /// Self-contained copy of the valid readings, oldest first
    pub fn snapshot(&self) -> RegisterStoreValue {
        RegisterStoreValue::from(self)
    }
}

impl core::fmt::Display for RegisterStore<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "  {:#06x}  {:<32} :", self.reg_addr, self.desc.name)?;
        for reg in self.iter().filter(|r| r.is_valid()) {
            write!(f, " {}", reg.value())?;
        }
        Ok(())
    }
}

/// Interpreted history of a register, detached from the live store
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Serialize))]
pub struct RegisterStoreValue {
    #[cfg_attr(feature = "with_serde", serde(rename = "regAddress"))]
    pub reg_addr: u16,
    pub name: String,
    #[cfg_attr(feature = "with_serde", serde(rename = "readings"))]
    pub history: Vec<RegisterValue>,
}

impl From<&RegisterStore<'_>> for RegisterStoreValue {
    fn from(store: &RegisterStore<'_>) -> Self {
        Self {
            reg_addr: store.reg_addr,
            name: store.desc.name.clone(),
            history: store
                .iter()
                .filter(|r| r.is_valid())
                .map(Register::value)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Register, RegisterStore};
    use crate::regmap::descriptor::{RegisterDescriptor, RegisterValueType};

    #[test]
    fn test_register_equality() {
        let desc = RegisterDescriptor::new(0x10, 2, "status");
        let never_read = Register::new(&desc);
        assert!(never_read != never_read.clone());
        let a = Register::with_value(&desc, 10, &[1, 2]);
        let b = Register::with_value(&desc, 20, &[1, 2]);
        let c = Register::with_value(&desc, 30, &[1, 3]);
        assert!(a == b);
        assert!(a != c);
        assert!(a != never_read);
        assert!(never_read != a);
        let mut zeroes = Register::new(&desc);
        zeroes.set(40, &[0, 0]);
        assert!(zeroes != never_read);
    }

    #[test]
    fn test_ring_wraps() {
        let desc = RegisterDescriptor::new(0x20, 1, "temp")
            .with_keep(3)
            .with_format(RegisterValueType::Integer);
        let mut store = RegisterStore::new(&desc);
        assert_eq!(store.capacity(), 3);
        assert!(!store.back().is_valid());
        for (i, w) in [100u16, 101, 102, 103].iter().enumerate() {
            assert!(store.record(i as u32 + 1, &[*w]));
        }
        assert_eq!(store.back().words(), &[103]);
        assert_eq!(store.front().words(), &[101]);
        let retained: Vec<u16> = store.iter().map(|r| r.words()[0]).collect();
        assert_eq!(retained, vec![101, 102, 103]);
    }

    #[test]
    fn test_ring_capacity_one() {
        let desc = RegisterDescriptor::new(0x30, 1, "single");
        let mut store = RegisterStore::new(&desc);
        store.front_mut().set(1, &[7]);
        store.advance();
        assert_eq!(store.back().words(), &[7]);
        assert_eq!(store.front().words(), &[7]);
        store.front_mut().set(2, &[8]);
        store.advance();
        assert_eq!(store.back().timestamp, 2);
        assert_eq!(store.iter().count(), 1);
    }

    #[test]
    fn test_changes_only() {
        let desc = RegisterDescriptor::new(0x40, 1, "state")
            .with_keep(4)
            .with_changes_only(true);
        let mut store = RegisterStore::new(&desc);
        // first reading always kept, even all zero
        assert!(store.record(1, &[0]));
        assert!(!store.record(2, &[0]));
        assert!(store.record(3, &[5]));
        assert!(!store.record(4, &[5]));
        assert!(store.record(5, &[0]));
        let snap = store.snapshot();
        let stamps: Vec<u32> = snap.history.iter().map(|v| v.timestamp).collect();
        assert_eq!(stamps, vec![1, 3, 5]);

        let every = RegisterDescriptor::new(0x41, 1, "counter").with_keep(2);
        let mut store = RegisterStore::new(&every);
        assert!(store.record(1, &[9]));
        assert!(store.record(2, &[9]));
        assert_eq!(store.snapshot().history.len(), 2);
    }

    #[test]
    #[should_panic]
    fn test_wrong_width_panics() {
        let desc = RegisterDescriptor::new(0x50, 2, "wide");
        let mut store = RegisterStore::new(&desc);
        store.record(1, &[1]);
    }
}
