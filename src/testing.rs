use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

/// Delay provider that returns immediately and records every requested
/// delay in call order. Clones share one log.
#[derive(Clone, Default)]
pub struct RecordingDelay {
    calls_ns: Rc<RefCell<Vec<u64>>>,
}

impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.calls_ns.borrow().iter().sum::<u64>() / 1_000_000
    }

    /// Each delay in milliseconds, oldest first.
    pub fn calls_ms(&self) -> Vec<u64> {
        self.calls_ns.borrow().iter().map(|ns| ns / 1_000_000).collect()
    }

    pub fn reset(&self) {
        self.calls_ns.borrow_mut().clear();
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls_ns.borrow_mut().push(u64::from(ns));
    }
}
