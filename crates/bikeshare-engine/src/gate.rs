use std::sync::atomic::{AtomicBool, Ordering};

/// At-most-one-in-flight guard for a refresh job.
///
/// A trigger that arrives while a pass is running is dropped, not queued.
#[derive(Debug, Default)]
pub struct JobGate {
    running: AtomicBool,
}

impl JobGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate, or `None` if a pass already holds it.
    #[must_use]
    pub fn try_begin(&self) -> Option<JobGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| JobGuard { gate: self })
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Releases its [`JobGate`] when dropped, including on early return.
#[derive(Debug)]
pub struct JobGuard<'a> {
    gate: &'a JobGate,
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        self.gate.running.store(false, Ordering::Release);
    }
}
