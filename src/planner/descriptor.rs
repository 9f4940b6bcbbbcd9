use serde::Serialize;
use std::{fmt::Display, sync::atomic::{AtomicU64, Ordering}};

static NEXT_DESCRIPTOR: AtomicU64 = AtomicU64::new(1);

/// Graph-wide identity of one column value. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Descriptor(u64);

impl Descriptor {
    pub fn id(self) -> u64 {
        self.0
    }
}

impl Display for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mints fresh descriptors. All factories draw from one process-wide
/// counter, so descriptors stay unique across analysis sessions.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DescriptorFactory {
    issued: usize,
}

impl DescriptorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> Descriptor {
        self.issued += 1;
        Descriptor(NEXT_DESCRIPTOR.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of descriptors this factory has handed out.
    pub fn issued(&self) -> usize {
        self.issued
    }
}

impl Iterator for DescriptorFactory {
    type Item = Descriptor;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.fresh())
    }
}
