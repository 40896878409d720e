//! Toolkit-scoped state of the indicator library.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use appind_toolkit::{HandlerId, ObjectId, Toolkit};
use glib::prelude::*;
use glib::{SignalHandlerId, WeakRef};

use crate::native::NativeIndicator;
use crate::signals::CallbackRegistry;

/// Live native indicators and their signal handlers for one toolkit.
///
/// Lives in a toolkit extension slot, so it is dropped together with the
/// toolkit on teardown.
///
/// No borrow of the library is held while a native handler is disconnected.
/// Dropping a handler closure may drop observers or other indicators, and
/// those call back into the library.
#[derive(Default)]
pub struct IndicatorLibrary {
    registry: RefCell<CallbackRegistry>,
    live: RefCell<HashMap<ObjectId, WeakRef<NativeIndicator>>>,
}

impl IndicatorLibrary {
    /// Library state of `toolkit`.
    pub fn get(toolkit: &Toolkit) -> Rc<Self> {
        toolkit.extension::<Self>()
    }

    /// Object ids of every indicator that has not been released yet.
    pub fn live_ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self
            .live
            .borrow()
            .iter()
            .filter(|(_, native)| native.upgrade().is_some())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of handlers connected to `object`.
    pub fn handler_count(&self, object: ObjectId) -> usize {
        self.registry.borrow().handler_count(object)
    }

    pub(crate) fn register(&self, object: ObjectId, native: &NativeIndicator) {
        self.live.borrow_mut().insert(object, native.downgrade());
    }

    /// Forgets `object` and its handlers.
    ///
    /// Called while the native object is disposed; GObject destroys the
    /// handlers themselves right after.
    pub(crate) fn release(&self, object: ObjectId) {
        self.live.borrow_mut().remove(&object);
        let dropped = self.registry.borrow_mut().remove_all(object).len();
        tracing::trace!(object = %object, handlers = dropped, "indicator handlers released");
    }

    pub(crate) fn lookup(&self, object: ObjectId) -> Option<NativeIndicator> {
        let native = self.live.borrow().get(&object)?.upgrade();
        native
    }

    pub(crate) fn track(&self, object: ObjectId, handler: SignalHandlerId) -> HandlerId {
        self.registry.borrow_mut().insert(object, handler)
    }

    /// Removes `id` from the registry. The caller disconnects the returned
    /// native handler once this borrow has ended.
    pub(crate) fn untrack(&self, object: ObjectId, id: HandlerId) -> Option<SignalHandlerId> {
        self.registry.borrow_mut().remove(object, id)
    }
}

impl std::fmt::Debug for IndicatorLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorLibrary")
            .field("live", &self.live_ids())
            .finish_non_exhaustive()
    }
}
