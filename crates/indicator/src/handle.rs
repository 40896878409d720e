//! Strongly typed handle owning one native indicator.

use std::rc::Rc;

use appind_toolkit::{HandlerId, ObjectId, Toolkit};
use glib::prelude::*;

use crate::error::IndicatorError;
use crate::library::IndicatorLibrary;
use crate::native::{IndicatorSnapshot, NativeIndicator, NativeParams};
use crate::observer::IndicatorObserver;
use crate::signals::{
    NEW_ATTENTION_ICON, NEW_ICON, NEW_ICON_THEME_PATH, NEW_STATUS, SCROLL_EVENT, SECONDARY_ACTIVATE,
};
use crate::types::{Category, Flavor, Property, ScrollDirection, Status};

/// Owner of a native status indicator.
///
/// Writes go straight to the native object and are visible to this handle
/// immediately. Other observers of the same object, and every connected
/// handler, see them once the main context has been drained.
///
/// The handle is tied to the toolkit thread and cannot be sent elsewhere.
/// Releasing it consumes it, so a released handle cannot be used again:
///
/// ```compile_fail
/// use appind_indicator::{Category, IndicatorHandle};
/// use appind_toolkit::Toolkit;
///
/// let toolkit = Toolkit::init();
/// let handle = IndicatorHandle::new(&toolkit, "app", "icon", Category::Other).unwrap();
/// handle.dispose();
/// handle.dispose();
/// ```
pub struct IndicatorHandle {
    native: NativeIndicator,
    library: Rc<IndicatorLibrary>,
    id: String,
    toolkit: Toolkit,
}

impl IndicatorHandle {
    /// Creates a native indicator with the given identity.
    ///
    /// Fails with [`IndicatorError::Toolkit`] when `toolkit` has been torn
    /// down and with [`IndicatorError::EmptyId`] for an empty `id`.
    pub fn new(
        toolkit: &Toolkit,
        id: impl Into<String>,
        icon_name: impl Into<String>,
        category: Category,
    ) -> Result<Self, IndicatorError> {
        Self::builder(id, category).icon_name(icon_name).build(toolkit)
    }

    /// Like [`IndicatorHandle::new`], using the toolkit of the calling thread.
    pub fn with_current_toolkit(
        id: impl Into<String>,
        icon_name: impl Into<String>,
        category: Category,
    ) -> Result<Self, IndicatorError> {
        let toolkit = Toolkit::current()?;
        Self::new(&toolkit, id, icon_name, category)
    }

    /// Starts a builder for an indicator with more construction properties.
    pub fn builder(id: impl Into<String>, category: Category) -> IndicatorBuilder {
        IndicatorBuilder {
            params: NativeParams {
                id: id.into(),
                category,
                flavor: Flavor::default(),
                icon_name: String::new(),
                attention_icon_name: None,
                icon_theme_path: None,
            },
        }
    }

    fn from_params(toolkit: &Toolkit, params: NativeParams) -> Result<Self, IndicatorError> {
        toolkit.ensure_initialized()?;
        let library = IndicatorLibrary::get(toolkit);
        let native = NativeIndicator::create(toolkit, &library, params)?;
        let id = native.id();
        Ok(Self {
            native,
            library,
            id,
            toolkit: toolkit.clone(),
        })
    }

    /// Application id, fixed at construction.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Category given at construction.
    pub fn category(&self) -> Category {
        self.native.category()
    }

    /// Identity of the native object, as used by [`IndicatorObserver::attach`].
    pub fn object_id(&self) -> ObjectId {
        self.native.object_id()
    }

    /// Library flavor the indicator was created with.
    pub fn flavor(&self) -> Flavor {
        self.native.flavor()
    }

    /// Toolkit the indicator was created on.
    pub fn toolkit(&self) -> &Toolkit {
        &self.toolkit
    }

    /// Regular icon name.
    pub fn icon_name(&self) -> String {
        self.native.icon_name()
    }

    /// Sets the regular icon. Emits `new-icon` when the name changes.
    pub fn set_icon_name(&self, icon_name: &str) {
        self.native.set_icon_name(icon_name);
    }

    /// Current status. New indicators start out passive.
    pub fn status(&self) -> Status {
        self.native.status()
    }

    /// Sets the status. Emits `new-status` when it changes.
    pub fn set_status(&self, status: Status) {
        self.native.set_status(status);
    }

    /// Icon shown in the attention state, `None` when unset.
    pub fn attention_icon_name(&self) -> Option<String> {
        self.native.attention_icon_name()
    }

    /// Sets the attention icon. An empty name clears it.
    pub fn set_attention_icon_name(&self, icon_name: &str) {
        self.native.set_attention_icon_name(icon_name);
    }

    /// Extra icon directory, `None` when unset.
    pub fn icon_theme_path(&self) -> Option<String> {
        self.native.icon_theme_path()
    }

    /// Sets the extra icon directory. `None` or an empty path clears it.
    pub fn set_icon_theme_path(&self, path: Option<&str>) {
        self.native.set_icon_theme_path(path);
    }

    /// Text shown next to the icon, `None` when unset.
    pub fn label(&self) -> Option<String> {
        self.native.label()
    }

    /// Space reservation hint for the label, `None` when unset.
    pub fn label_guide(&self) -> Option<String> {
        self.native.label_guide()
    }

    /// Sets the text shown next to the icon.
    ///
    /// `guide` is the longest string the label is expected to take, used by
    /// the tray host to reserve space. Empty strings clear either value.
    pub fn set_label(&self, label: Option<&str>, guide: Option<&str>) {
        self.native.set_label(label, guide);
    }

    /// Position hint among the tray's indicators.
    pub fn ordering_index(&self) -> u32 {
        self.native.ordering_index()
    }

    /// Sets the position hint. Emits only `notify`.
    pub fn set_ordering_index(&self, index: u32) {
        self.native.set_ordering_index(index);
    }

    /// Human readable title, `None` when unset.
    pub fn title(&self) -> Option<String> {
        self.native.title()
    }

    /// Sets the title. `None` or an empty title clears it.
    pub fn set_title(&self, title: Option<&str>) {
        self.native.set_title(title);
    }

    /// Attaches a caller-owned menu. The indicator does not keep it alive.
    pub fn set_menu(&self, menu: &gio::Menu) {
        self.native.set_menu(Some(menu));
    }

    /// The attached menu, while its owner keeps it alive.
    pub fn menu(&self) -> Option<gio::Menu> {
        self.native.menu()
    }

    /// Detaches the menu.
    pub fn clear_menu(&self) {
        self.native.set_menu(None);
    }

    /// Action activated on a secondary (middle) click. Not kept alive either.
    pub fn set_secondary_activate_target(&self, action: Option<&gio::SimpleAction>) {
        self.native.set_secondary_activate_target(action);
    }

    /// The secondary activation action, while its owner keeps it alive.
    pub fn secondary_activate_target(&self) -> Option<gio::SimpleAction> {
        self.native.secondary_activate_target()
    }

    /// Delivers a secondary activation as the tray host would.
    pub fn secondary_activate(&self) {
        self.native.secondary_activate();
    }

    /// Delivers a scroll gesture as the tray host would.
    pub fn scroll(&self, delta: i32, direction: ScrollDirection) {
        self.native.scroll(delta, direction);
    }

    /// Icon the tray currently shows, `None` while passive.
    pub fn visible_icon_name(&self) -> Option<String> {
        self.snapshot().visible_icon_name().map(str::to_string)
    }

    /// Current value of every property.
    pub fn snapshot(&self) -> IndicatorSnapshot {
        self.native.snapshot()
    }

    /// Independent observer of this indicator.
    pub fn observe(&self) -> IndicatorObserver {
        IndicatorObserver::for_native(&self.native, &self.library)
    }

    /// Runs `f` on `new-icon`.
    pub fn connect_new_icon<F: Fn() + 'static>(&self, f: F) -> HandlerId {
        let handler = self.native.connect_closure(
            NEW_ICON,
            false,
            glib::closure_local!(move |_: NativeIndicator| f()),
        );
        self.track(handler)
    }

    /// Runs `f` on `new-attention-icon`.
    pub fn connect_new_attention_icon<F: Fn() + 'static>(&self, f: F) -> HandlerId {
        let handler = self.native.connect_closure(
            NEW_ATTENTION_ICON,
            false,
            glib::closure_local!(move |_: NativeIndicator| f()),
        );
        self.track(handler)
    }

    /// Runs `f` with the new status on `new-status`.
    pub fn connect_new_status<F: Fn(Status) + 'static>(&self, f: F) -> HandlerId {
        let handler = self.native.connect_closure(
            NEW_STATUS,
            false,
            glib::closure_local!(move |_: NativeIndicator, nick: String| {
                if let Ok(status) = nick.parse::<Status>() {
                    f(status);
                }
            }),
        );
        self.track(handler)
    }

    /// Handler receives `(label, guide)`, empty strings when cleared.
    ///
    /// Connects to the label signal of this indicator's flavor.
    pub fn connect_new_label<F: Fn(&str, &str) + 'static>(&self, f: F) -> HandlerId {
        let handler = self.native.connect_closure(
            self.native.flavor().label_signal_name(),
            false,
            glib::closure_local!(move |_: NativeIndicator, label: String, guide: String| {
                f(&label, &guide);
            }),
        );
        self.track(handler)
    }

    /// Handler receives the new path, empty when cleared.
    pub fn connect_new_icon_theme_path<F: Fn(&str) + 'static>(&self, f: F) -> HandlerId {
        let handler = self.native.connect_closure(
            NEW_ICON_THEME_PATH,
            false,
            glib::closure_local!(move |_: NativeIndicator, path: String| f(&path)),
        );
        self.track(handler)
    }

    /// Runs `f` with the delta and direction of each scroll gesture.
    pub fn connect_scroll_event<F: Fn(i32, ScrollDirection) + 'static>(&self, f: F) -> HandlerId {
        let handler = self.native.connect_closure(
            SCROLL_EVENT,
            false,
            glib::closure_local!(move |_: NativeIndicator, delta: i32, raw: u32| {
                if let Some(direction) = ScrollDirection::from_raw(raw) {
                    f(delta, direction);
                }
            }),
        );
        self.track(handler)
    }

    /// Runs `f` on every secondary activation, target or not.
    pub fn connect_secondary_activate<F: Fn() + 'static>(&self, f: F) -> HandlerId {
        let handler = self.native.connect_closure(
            SECONDARY_ACTIVATE,
            false,
            glib::closure_local!(move |_: NativeIndicator| f()),
        );
        self.track(handler)
    }

    /// Handler receives the property whose value changed.
    pub fn connect_notify<F: Fn(Property) + 'static>(&self, f: F) -> HandlerId {
        let handler = self.native.connect_notify_local(None, move |_, pspec| {
            if let Some(property) = Property::from_name(pspec.name()) {
                f(property);
            }
        });
        self.track(handler)
    }

    /// Returns `false` if `handler` is not connected to this indicator.
    ///
    /// The handler closure is dropped before this returns.
    pub fn disconnect(&self, handler: HandlerId) -> bool {
        let Some(native_handler) = self.library.untrack(self.object_id(), handler) else {
            return false;
        };
        self.native.disconnect(native_handler);
        true
    }

    fn track(&self, handler: glib::SignalHandlerId) -> HandlerId {
        self.library.track(self.object_id(), handler)
    }

    /// Releases the native indicator and every handler connected to it.
    pub fn dispose(self) {
        tracing::debug!(object = %self.object_id(), id = %self.id, "disposing indicator");
    }
}

impl std::fmt::Debug for IndicatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorHandle")
            .field("object", &self.object_id())
            .field("id", &self.id)
            .field("flavor", &self.flavor())
            .finish()
    }
}

/// Builder for indicators that need more than an icon at construction.
#[derive(Debug, Clone)]
#[must_use]
pub struct IndicatorBuilder {
    params: NativeParams,
}

impl IndicatorBuilder {
    pub fn icon_name(mut self, icon_name: impl Into<String>) -> Self {
        self.params.icon_name = icon_name.into();
        self
    }

    pub fn attention_icon_name(mut self, icon_name: impl Into<String>) -> Self {
        self.params.attention_icon_name = Some(icon_name.into());
        self
    }

    /// Extra directory searched for icons before the theme.
    pub fn icon_theme_path(mut self, path: impl Into<String>) -> Self {
        self.params.icon_theme_path = Some(path.into());
        self
    }

    pub fn flavor(mut self, flavor: Flavor) -> Self {
        self.params.flavor = flavor;
        self
    }

    pub fn build(self, toolkit: &Toolkit) -> Result<IndicatorHandle, IndicatorError> {
        IndicatorHandle::from_params(toolkit, self.params)
    }
}
