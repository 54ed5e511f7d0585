//! Power sequencing
//!
//! The modem's power and reset control lines are both optional; boards wire
//! none, one, or both. The state machine consults the presence predicates to
//! pick its fallback paths, drives a line active, and uses the state timer to
//! bound the pulse, deactivating on timeout.

use std::fmt;
use std::sync::Arc;

/// One physical control line
pub trait ControlLine: Send + Sync {
    /// Drive the line to its active or inactive level
    fn set_active(&self, active: bool);
}

impl<T: ControlLine + ?Sized> ControlLine for Arc<T> {
    fn set_active(&self, active: bool) {
        (**self).set_active(active);
    }
}

/// Drives the optional power and reset lines
pub struct PowerSequencer {
    power: Option<Box<dyn ControlLine>>,
    reset: Option<Box<dyn ControlLine>>,
}

impl PowerSequencer {
    /// Create a sequencer over whatever lines the board wires up
    pub fn new(power: Option<Box<dyn ControlLine>>, reset: Option<Box<dyn ControlLine>>) -> Self {
        Self { power, reset }
    }

    /// Whether a power line is wired
    pub fn has_power(&self) -> bool {
        self.power.is_some()
    }

    /// Whether a reset line is wired
    pub fn has_reset(&self) -> bool {
        self.reset.is_some()
    }

    /// Drive the power line; no-op when absent
    pub fn set_power(&self, active: bool) {
        if let Some(line) = &self.power {
            line.set_active(active);
        }
    }

    /// Drive the reset line; no-op when absent
    pub fn set_reset(&self, active: bool) {
        if let Some(line) = &self.reset {
            line.set_active(active);
        }
    }
}

impl fmt::Debug for PowerSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PowerSequencer")
            .field("power", &self.power.is_some())
            .field("reset", &self.reset.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct RecordingLine(Arc<AtomicBool>);

    impl ControlLine for RecordingLine {
        fn set_active(&self, active: bool) {
            self.0.store(active, Ordering::SeqCst);
        }
    }

    #[test]
    fn presence_reflects_wiring() {
        let seq = PowerSequencer::new(None, None);
        assert!(!seq.has_power());
        assert!(!seq.has_reset());

        let level = Arc::new(AtomicBool::new(false));
        let seq = PowerSequencer::new(Some(Box::new(RecordingLine(level.clone()))), None);
        assert!(seq.has_power());
        assert!(!seq.has_reset());
    }

    #[test]
    fn drives_wired_line_and_ignores_absent_one() {
        let level = Arc::new(AtomicBool::new(false));
        let seq = PowerSequencer::new(Some(Box::new(RecordingLine(level.clone()))), None);

        seq.set_power(true);
        assert!(level.load(Ordering::SeqCst));

        seq.set_power(false);
        assert!(!level.load(Ordering::SeqCst));

        // Absent reset line: must not panic
        seq.set_reset(true);
    }
}
