//! Cross-thread entry point into a toolkit's main context.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glib::{ControlFlow, MainContext, Priority};

use crate::error::ToolkitError;

/// `Send` handle that queues work onto a toolkit's main context.
///
/// Work queued after the toolkit is torn down is rejected. Work that was
/// already queued when teardown happened is skipped when it comes up.
#[derive(Debug, Clone)]
pub struct RemoteSender {
    context: MainContext,
    alive: Arc<AtomicBool>,
}

impl RemoteSender {
    pub(crate) fn new(context: MainContext, alive: Arc<AtomicBool>) -> Self {
        Self { context, alive }
    }

    /// Queues `f` at default priority on the toolkit thread.
    pub fn invoke<F>(&self, f: F) -> Result<(), ToolkitError>
    where
        F: FnOnce() + Send + 'static,
    {
        if !self.alive.load(Ordering::Acquire) {
            tracing::warn!("remote work for a torn down toolkit was dropped");
            return Err(ToolkitError::ContextClosed);
        }
        let alive = Arc::clone(&self.alive);
        let mut f = Some(f);
        let source = glib::idle_source_new(None, Priority::DEFAULT, move || {
            if let Some(f) = f.take() {
                if alive.load(Ordering::Acquire) {
                    f();
                }
            }
            ControlFlow::Break
        });
        source.attach(Some(&self.context));
        Ok(())
    }
}
