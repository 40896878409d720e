//! Independent views of a native indicator.
//!
//! An observer keeps its own snapshot and only refreshes it when a property
//! notification is delivered by the main context. Two observers of the same
//! object therefore agree with each other (and with the owning handle) once
//! the loop has been drained, and not necessarily before.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use appind_toolkit::{HandlerId, ObjectId, Toolkit};
use glib::prelude::*;

use crate::error::IndicatorError;
use crate::library::IndicatorLibrary;
use crate::native::{IndicatorSnapshot, NativeIndicator};
use crate::types::Status;

struct Shared {
    snapshot: RefCell<IndicatorSnapshot>,
    seen: Cell<usize>,
}

pub struct IndicatorObserver {
    object: ObjectId,
    native: glib::WeakRef<NativeIndicator>,
    library: Weak<IndicatorLibrary>,
    shared: Rc<Shared>,
    handler: HandlerId,
}

impl IndicatorObserver {
    /// Attaches to the live indicator with native identity `object`.
    pub fn attach(toolkit: &Toolkit, object: ObjectId) -> Result<Self, IndicatorError> {
        toolkit.ensure_initialized()?;
        let library = IndicatorLibrary::get(toolkit);
        let native = library
            .lookup(object)
            .ok_or(IndicatorError::UnknownObject(object))?;
        Ok(Self::for_native(&native, &library))
    }

    pub(crate) fn for_native(native: &NativeIndicator, library: &Rc<IndicatorLibrary>) -> Self {
        let shared = Rc::new(Shared {
            snapshot: RefCell::new(native.snapshot()),
            seen: Cell::new(0),
        });

        let weak_shared = Rc::downgrade(&shared);
        let signal_handler = native.connect_notify_local(None, move |native, pspec| {
            let Some(shared) = weak_shared.upgrade() else {
                return;
            };
            shared.seen.set(shared.seen.get() + 1);
            *shared.snapshot.borrow_mut() = native.snapshot();
            tracing::trace!(object = %native.object_id(), property = pspec.name(), "observer refreshed");
        });
        let object = native.object_id();

        Self {
            object,
            native: native.downgrade(),
            library: Rc::downgrade(library),
            shared,
            handler: library.track(object, signal_handler),
        }
    }

    pub fn object_id(&self) -> ObjectId {
        self.object
    }

    /// Last state delivered to this observer.
    pub fn snapshot(&self) -> IndicatorSnapshot {
        self.shared.snapshot.borrow().clone()
    }

    pub fn icon_name(&self) -> String {
        self.shared.snapshot.borrow().icon_name.clone()
    }

    pub fn status(&self) -> Status {
        self.shared.snapshot.borrow().status
    }

    pub fn attention_icon_name(&self) -> Option<String> {
        self.shared.snapshot.borrow().attention_icon_name.clone()
    }

    /// Whether the observed indicator has not been released.
    pub fn is_alive(&self) -> bool {
        self.native.upgrade().is_some()
    }

    /// Reads the native state now, without waiting for notifications.
    pub fn refresh(&self) -> Result<(), IndicatorError> {
        let native = self
            .native
            .upgrade()
            .ok_or(IndicatorError::Disposed(self.object))?;
        *self.shared.snapshot.borrow_mut() = native.snapshot();
        Ok(())
    }

    /// Number of property notifications delivered so far.
    pub fn notifications_seen(&self) -> usize {
        self.shared.seen.get()
    }
}

impl Drop for IndicatorObserver {
    fn drop(&mut self) {
        let Some(library) = self.library.upgrade() else {
            return;
        };
        // Released together with the indicator when it was disposed first.
        let Some(handler) = library.untrack(self.object, self.handler) else {
            return;
        };
        if let Some(native) = self.native.upgrade() {
            native.disconnect(handler);
        }
    }
}

impl std::fmt::Debug for IndicatorObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorObserver")
            .field("object", &self.object)
            .field("alive", &self.is_alive())
            .field("seen", &self.shared.seen.get())
            .finish()
    }
}
