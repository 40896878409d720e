//! Pumping the toolkit's main context from test harnesses and setup code.

use appind_toolkit::Toolkit;
use glib::MainContext;

/// Runs queued main-context work until nothing is pending.
///
/// Applications hand control to a `MainLoop` permanently once set up; the
/// bridge is for code that needs queued signals delivered at a known point,
/// such as right after a batch of property writes.
#[derive(Debug, Clone)]
pub struct EventLoopBridge {
    context: MainContext,
}

impl EventLoopBridge {
    pub fn new(toolkit: &Toolkit) -> Self {
        Self {
            context: toolkit.main_context().clone(),
        }
    }

    /// Runs iterations while work is pending and returns how many ran.
    ///
    /// Returns 0 without blocking when nothing is pending. Work queued by
    /// handlers during the drain is run as well, so a source that re-queues
    /// itself forever keeps this from returning.
    pub fn drain(&self) -> usize {
        let mut iterations = 0;
        while self.context.pending() {
            self.context.iteration(true);
            iterations += 1;
        }
        if iterations > 0 {
            tracing::trace!(iterations, "main context drained");
        }
        iterations
    }

    /// Runs a single iteration. Returns whether anything was dispatched.
    pub fn iterate(&self, may_block: bool) -> bool {
        self.context.iteration(may_block)
    }

    pub fn has_pending(&self) -> bool {
        self.context.pending()
    }
}
