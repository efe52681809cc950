/// Per-device output mask: one flag per lamp, all enabled by default.
/// Length is fixed at construction (the device count reported by the
/// server) and never changes afterwards. The mask only filters outgoing
/// commands; it never affects local color computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelMask {
    flags: Vec<bool>,
}

impl ChannelMask {
    pub fn new(len: usize) -> Self {
        Self {
            flags: vec![true; len],
        }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn is_enabled(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// Flips one flag. Out-of-range indices are ignored; the length never
    /// changes.
    pub fn toggle(&mut self, index: usize) {
        if let Some(flag) = self.flags.get_mut(index) {
            *flag = !*flag;
        }
    }

    pub fn is_fully_enabled(&self) -> bool {
        self.flags.iter().all(|flag| *flag)
    }

    /// Fixed-width `'1'`/`'0'` string, index 0 first.
    pub fn to_address_string(&self) -> String {
        self.flags
            .iter()
            .map(|flag| if *flag { '1' } else { '0' })
            .collect()
    }

    /// The wire parameter: `None` when fully enabled (the server defaults
    /// to all devices), the serialized form otherwise.
    pub fn as_param(&self) -> Option<String> {
        if self.is_fully_enabled() {
            None
        } else {
            Some(self.to_address_string())
        }
    }
}
