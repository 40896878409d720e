//! Signal names of the native indicator and bookkeeping of connected handlers.
//!
//! Handlers are real GObject signal handlers on the native object. The
//! [`CallbackRegistry`] only maps the binding's [`HandlerId`]s to the
//! underlying `glib::SignalHandlerId`s, so that a handler can be disconnected
//! by id and every handler of an object can be forgotten at once on release.

use std::collections::HashMap;

use appind_toolkit::{HandlerId, ObjectId};
use glib::SignalHandlerId;

pub(crate) const NEW_ICON: &str = "new-icon";
pub(crate) const NEW_ATTENTION_ICON: &str = "new-attention-icon";
pub(crate) const NEW_STATUS: &str = "new-status";
pub(crate) const NEW_ICON_THEME_PATH: &str = "new-icon-theme-path";
pub(crate) const SCROLL_EVENT: &str = "scroll-event";
pub(crate) const SECONDARY_ACTIVATE: &str = "secondary-activate";

#[derive(Debug, Default)]
pub(crate) struct CallbackRegistry {
    next_id: u64,
    handlers: HashMap<ObjectId, Vec<(HandlerId, SignalHandlerId)>>,
}

impl CallbackRegistry {
    pub(crate) fn insert(&mut self, object: ObjectId, handler: SignalHandlerId) -> HandlerId {
        self.next_id += 1;
        let id = HandlerId::from_raw(self.next_id);
        self.handlers.entry(object).or_default().push((id, handler));
        id
    }

    /// Forgets one handler and hands back its native id for disconnection.
    pub(crate) fn remove(&mut self, object: ObjectId, id: HandlerId) -> Option<SignalHandlerId> {
        let handlers = self.handlers.get_mut(&object)?;
        let index = handlers.iter().position(|(hid, _)| *hid == id)?;
        let (_, handler) = handlers.remove(index);
        if handlers.is_empty() {
            self.handlers.remove(&object);
        }
        Some(handler)
    }

    /// Forgets every handler of `object`.
    pub(crate) fn remove_all(&mut self, object: ObjectId) -> Vec<SignalHandlerId> {
        self.handlers
            .remove(&object)
            .map(|handlers| handlers.into_iter().map(|(_, handler)| handler).collect())
            .unwrap_or_default()
    }

    pub(crate) fn handler_count(&self, object: ObjectId) -> usize {
        self.handlers.get(&object).map_or(0, Vec::len)
    }
}
