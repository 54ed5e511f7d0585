//! Virtual control lines

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::trace;

use cellar_modem::ControlLine;

/// A GPIO-like line that records its level and rising edges
pub struct VirtualControlLine {
    name: &'static str,
    level: AtomicBool,
    pulses: AtomicUsize,
}

impl VirtualControlLine {
    /// Create an inactive line
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            level: AtomicBool::new(false),
            pulses: AtomicUsize::new(0),
        }
    }

    /// Current line level
    pub fn is_active(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }

    /// Number of inactive-to-active edges seen
    pub fn pulses(&self) -> usize {
        self.pulses.load(Ordering::SeqCst)
    }
}

impl ControlLine for VirtualControlLine {
    fn set_active(&self, active: bool) {
        let previous = self.level.swap(active, Ordering::SeqCst);
        if active && !previous {
            self.pulses.fetch_add(1, Ordering::SeqCst);
        }
        trace!("{} line {}", self.name, if active { "active" } else { "inactive" });
    }
}
