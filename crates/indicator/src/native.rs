//! The native status-indicator object.
//!
//! A GObject subclass with read-only properties and the indicator signals.
//! Writes take effect on the object immediately. Every effective write also
//! queues the typed signal and a `notify` for the changed property on the
//! toolkit's main context; handlers only see them once the loop iterates.

use std::rc::Rc;

use appind_toolkit::{ObjectId, Toolkit};
use gio::prelude::*;
use glib::subclass::prelude::*;

use crate::error::IndicatorError;
use crate::library::IndicatorLibrary;
use crate::signals::{
    NEW_ATTENTION_ICON, NEW_ICON, NEW_ICON_THEME_PATH, NEW_STATUS, SCROLL_EVENT, SECONDARY_ACTIVATE,
};
use crate::types::{Category, Flavor, Property, ScrollDirection, Status};

/// Construction parameters of a native indicator.
#[derive(Debug, Clone)]
pub(crate) struct NativeParams {
    pub id: String,
    pub category: Category,
    pub flavor: Flavor,
    pub icon_name: String,
    pub attention_icon_name: Option<String>,
    pub icon_theme_path: Option<String>,
}

#[derive(Debug, Clone)]
struct State {
    id: String,
    category: Category,
    status: Status,
    icon_name: String,
    attention_icon_name: Option<String>,
    icon_theme_path: Option<String>,
    label: Option<String>,
    label_guide: Option<String>,
    ordering_index: u32,
    title: Option<String>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            id: String::new(),
            category: Category::ApplicationStatus,
            status: Status::Passive,
            icon_name: String::new(),
            attention_icon_name: None,
            icon_theme_path: None,
            label: None,
            label_guide: None,
            ordering_index: 0,
            title: None,
        }
    }
}

/// Point-in-time copy of every indicator property.
///
/// Object-valued properties are recorded by presence or name, so a snapshot
/// never keeps the menu or the secondary target alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorSnapshot {
    pub object: ObjectId,
    pub flavor: Flavor,
    pub id: String,
    pub category: Category,
    pub status: Status,
    pub icon_name: String,
    pub attention_icon_name: Option<String>,
    pub icon_theme_path: Option<String>,
    pub label: Option<String>,
    pub label_guide: Option<String>,
    pub ordering_index: u32,
    pub title: Option<String>,
    pub has_menu: bool,
    /// Name of the secondary activation action, while it is alive.
    pub secondary_activate_target: Option<String>,
}

impl IndicatorSnapshot {
    /// Icon the tray shows for the current status.
    ///
    /// Passive indicators are hidden. In the attention state the attention
    /// icon wins when one is set; otherwise the regular icon is used.
    pub fn visible_icon_name(&self) -> Option<&str> {
        match self.status {
            Status::Passive => None,
            Status::Active => Some(self.icon_name.as_str()),
            Status::Attention => Some(
                self.attention_icon_name
                    .as_deref()
                    .unwrap_or(self.icon_name.as_str()),
            ),
        }
    }
}

mod imp {
    use std::cell::{Cell, OnceCell, RefCell};
    use std::rc::Rc;
    use std::sync::OnceLock;

    use appind_toolkit::{ObjectId, Toolkit};
    use glib::prelude::*;
    use glib::subclass::Signal;
    use glib::subclass::prelude::*;

    use super::State;
    use crate::library::IndicatorLibrary;
    use crate::signals::{
        NEW_ATTENTION_ICON, NEW_ICON, NEW_ICON_THEME_PATH, NEW_STATUS, SCROLL_EVENT,
        SECONDARY_ACTIVATE,
    };
    use crate::types::Flavor;

    #[derive(Default)]
    pub struct NativeIndicator {
        pub(super) object: Cell<ObjectId>,
        pub(super) flavor: Cell<Flavor>,
        pub(super) toolkit: OnceCell<Toolkit>,
        pub(super) library: OnceCell<Rc<IndicatorLibrary>>,
        pub(super) state: RefCell<State>,
        pub(super) menu: glib::WeakRef<gio::Menu>,
        /// `Some` with a dead reference once the target has been dropped.
        pub(super) secondary_target: RefCell<Option<glib::WeakRef<gio::SimpleAction>>>,
        pub(super) label_idle: RefCell<Option<glib::Source>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for NativeIndicator {
        const NAME: &'static str = "AppindNativeIndicator";
        type Type = super::NativeIndicator;
        type ParentType = glib::Object;
    }

    impl ObjectImpl for NativeIndicator {
        fn properties() -> &'static [glib::ParamSpec] {
            static PROPERTIES: OnceLock<Vec<glib::ParamSpec>> = OnceLock::new();
            PROPERTIES.get_or_init(|| {
                vec![
                    glib::ParamSpecString::builder("id").read_only().build(),
                    glib::ParamSpecString::builder("category").read_only().build(),
                    glib::ParamSpecString::builder("status").read_only().build(),
                    glib::ParamSpecString::builder("icon-name").read_only().build(),
                    glib::ParamSpecString::builder("attention-icon-name")
                        .read_only()
                        .build(),
                    glib::ParamSpecString::builder("icon-theme-path")
                        .read_only()
                        .build(),
                    glib::ParamSpecString::builder("label").read_only().build(),
                    glib::ParamSpecString::builder("label-guide").read_only().build(),
                    glib::ParamSpecUInt::builder("ordering-index").read_only().build(),
                    glib::ParamSpecString::builder("title").read_only().build(),
                    glib::ParamSpecObject::builder::<gio::Menu>("menu")
                        .read_only()
                        .build(),
                    glib::ParamSpecObject::builder::<gio::SimpleAction>("secondary-activate-target")
                        .read_only()
                        .build(),
                ]
            })
        }

        fn property(&self, _id: usize, pspec: &glib::ParamSpec) -> glib::Value {
            let state = self.state.borrow();
            match pspec.name() {
                "id" => state.id.to_value(),
                "category" => state.category.nick().to_value(),
                "status" => state.status.nick().to_value(),
                "icon-name" => state.icon_name.to_value(),
                "attention-icon-name" => state.attention_icon_name.to_value(),
                "icon-theme-path" => state.icon_theme_path.to_value(),
                "label" => state.label.to_value(),
                "label-guide" => state.label_guide.to_value(),
                "ordering-index" => state.ordering_index.to_value(),
                "title" => state.title.to_value(),
                "menu" => self.menu.upgrade().to_value(),
                "secondary-activate-target" => self
                    .secondary_target
                    .borrow()
                    .as_ref()
                    .and_then(|target| target.upgrade())
                    .to_value(),
                name => unimplemented!("indicator property {name}"),
            }
        }

        fn signals() -> &'static [Signal] {
            static SIGNALS: OnceLock<Vec<Signal>> = OnceLock::new();
            SIGNALS.get_or_init(|| {
                let label = [String::static_type(), String::static_type()];
                vec![
                    Signal::builder(NEW_ICON).build(),
                    Signal::builder(NEW_ATTENTION_ICON).build(),
                    Signal::builder(NEW_STATUS)
                        .param_types([String::static_type()])
                        .build(),
                    Signal::builder(Flavor::AppIndicator.label_signal_name())
                        .param_types(label)
                        .build(),
                    Signal::builder(Flavor::Ayatana.label_signal_name())
                        .param_types(label)
                        .build(),
                    Signal::builder(NEW_ICON_THEME_PATH)
                        .param_types([String::static_type()])
                        .build(),
                    Signal::builder(SCROLL_EVENT)
                        .param_types([i32::static_type(), u32::static_type()])
                        .build(),
                    Signal::builder(SECONDARY_ACTIVATE).build(),
                ]
            })
        }

        fn dispose(&self) {
            if let Some(source) = self.label_idle.take() {
                source.destroy();
            }
            let object = self.object.get();
            if let Some(library) = self.library.get() {
                library.release(object);
            }
            tracing::debug!(object = %object, "native indicator released");
        }
    }
}

glib::wrapper! {
    pub struct NativeIndicator(ObjectSubclass<imp::NativeIndicator>);
}

impl NativeIndicator {
    pub(crate) fn create(
        toolkit: &Toolkit,
        library: &Rc<IndicatorLibrary>,
        params: NativeParams,
    ) -> Result<Self, IndicatorError> {
        toolkit.ensure_initialized()?;
        if params.id.is_empty() {
            return Err(IndicatorError::EmptyId);
        }

        let native: Self = glib::Object::builder().build();
        let imp = native.imp();
        let object = toolkit.allocate_object_id();
        imp.object.set(object);
        imp.flavor.set(params.flavor);
        imp.toolkit.get_or_init(|| toolkit.clone());
        imp.library.get_or_init(|| Rc::clone(library));
        *imp.state.borrow_mut() = State {
            id: params.id,
            category: params.category,
            icon_name: params.icon_name,
            attention_icon_name: non_empty(params.attention_icon_name.as_deref()),
            icon_theme_path: non_empty(params.icon_theme_path.as_deref()),
            ..State::default()
        };
        library.register(object, &native);

        tracing::debug!(
            object = %object,
            id = %imp.state.borrow().id,
            category = %params.category,
            flavor = params.flavor.type_name(),
            "native indicator created"
        );
        Ok(native)
    }

    pub(crate) fn object_id(&self) -> ObjectId {
        self.imp().object.get()
    }

    pub(crate) fn flavor(&self) -> Flavor {
        self.imp().flavor.get()
    }

    pub(crate) fn id(&self) -> String {
        self.imp().state.borrow().id.clone()
    }

    pub(crate) fn category(&self) -> Category {
        self.imp().state.borrow().category
    }

    pub(crate) fn status(&self) -> Status {
        self.imp().state.borrow().status
    }

    pub(crate) fn icon_name(&self) -> String {
        self.imp().state.borrow().icon_name.clone()
    }

    pub(crate) fn attention_icon_name(&self) -> Option<String> {
        self.imp().state.borrow().attention_icon_name.clone()
    }

    pub(crate) fn icon_theme_path(&self) -> Option<String> {
        self.imp().state.borrow().icon_theme_path.clone()
    }

    pub(crate) fn label(&self) -> Option<String> {
        self.imp().state.borrow().label.clone()
    }

    pub(crate) fn label_guide(&self) -> Option<String> {
        self.imp().state.borrow().label_guide.clone()
    }

    pub(crate) fn ordering_index(&self) -> u32 {
        self.imp().state.borrow().ordering_index
    }

    pub(crate) fn title(&self) -> Option<String> {
        self.imp().state.borrow().title.clone()
    }

    pub(crate) fn menu(&self) -> Option<gio::Menu> {
        self.imp().menu.upgrade()
    }

    pub(crate) fn secondary_activate_target(&self) -> Option<gio::SimpleAction> {
        self.imp()
            .secondary_target
            .borrow()
            .as_ref()
            .and_then(|target| target.upgrade())
    }

    pub(crate) fn snapshot(&self) -> IndicatorSnapshot {
        let state = self.imp().state.borrow();
        IndicatorSnapshot {
            object: self.object_id(),
            flavor: self.flavor(),
            id: state.id.clone(),
            category: state.category,
            status: state.status,
            icon_name: state.icon_name.clone(),
            attention_icon_name: state.attention_icon_name.clone(),
            icon_theme_path: state.icon_theme_path.clone(),
            label: state.label.clone(),
            label_guide: state.label_guide.clone(),
            ordering_index: state.ordering_index,
            title: state.title.clone(),
            has_menu: self.menu().is_some(),
            secondary_activate_target: self
                .secondary_activate_target()
                .map(|action| action.name().to_string()),
        }
    }

    pub(crate) fn set_status(&self, status: Status) {
        if self.replace(status, |s| &mut s.status) {
            tracing::debug!(object = %self.object_id(), status = %status, "status changed");
            self.queue(move |native| {
                native.emit_by_name::<()>(NEW_STATUS, &[&status.nick()]);
                native.notify_property(Property::Status);
            });
        }
    }

    pub(crate) fn set_icon_name(&self, icon_name: &str) {
        if self.replace(icon_name.to_string(), |s| &mut s.icon_name) {
            tracing::debug!(object = %self.object_id(), icon_name, "icon changed");
            self.queue(|native| {
                native.emit_by_name::<()>(NEW_ICON, &[]);
                native.notify_property(Property::IconName);
            });
        }
    }

    pub(crate) fn set_attention_icon_name(&self, icon_name: &str) {
        let value = non_empty(Some(icon_name));
        if self.replace(value, |s| &mut s.attention_icon_name) {
            tracing::debug!(object = %self.object_id(), icon_name, "attention icon changed");
            self.queue(|native| {
                native.emit_by_name::<()>(NEW_ATTENTION_ICON, &[]);
                native.notify_property(Property::AttentionIconName);
            });
        }
    }

    pub(crate) fn set_icon_theme_path(&self, path: Option<&str>) {
        let value = non_empty(path);
        if self.replace(value.clone(), |s| &mut s.icon_theme_path) {
            tracing::debug!(object = %self.object_id(), path = ?value, "icon theme path changed");
            let path = value.unwrap_or_default();
            self.queue(move |native| {
                native.emit_by_name::<()>(NEW_ICON_THEME_PATH, &[&path]);
                native.notify_property(Property::IconThemePath);
            });
        }
    }

    pub(crate) fn set_label(&self, label: Option<&str>, guide: Option<&str>) {
        let label_changed = self.replace(non_empty(label), |s| &mut s.label);
        let guide_changed = self.replace(non_empty(guide), |s| &mut s.label_guide);

        if label_changed {
            self.queue(|native| native.notify_property(Property::Label));
        }
        if guide_changed {
            self.queue(|native| native.notify_property(Property::LabelGuide));
        }
        if label_changed || guide_changed {
            self.schedule_label_signal();
        }
    }

    pub(crate) fn set_ordering_index(&self, index: u32) {
        if self.replace(index, |s| &mut s.ordering_index) {
            self.queue(|native| native.notify_property(Property::OrderingIndex));
        }
    }

    pub(crate) fn set_title(&self, title: Option<&str>) {
        if self.replace(non_empty(title), |s| &mut s.title) {
            self.queue(|native| native.notify_property(Property::Title));
        }
    }

    pub(crate) fn set_menu(&self, menu: Option<&gio::Menu>) {
        let imp = self.imp();
        if imp.menu.upgrade().as_ref() == menu {
            return;
        }
        imp.menu.set(menu);
        if let Some(menu) = menu {
            tracing::debug!(object = %self.object_id(), items = menu.n_items(), "menu attached");
        }
        self.queue(|native| native.notify_property(Property::Menu));
    }

    pub(crate) fn set_secondary_activate_target(&self, action: Option<&gio::SimpleAction>) {
        let imp = self.imp();
        let unchanged = match (self.secondary_activate_target(), action) {
            (Some(current), Some(new)) => current == *new,
            (None, None) => imp.secondary_target.borrow().is_none(),
            _ => false,
        };
        if unchanged {
            return;
        }
        *imp.secondary_target.borrow_mut() = action.map(|action| action.downgrade());
        self.queue(|native| native.notify_property(Property::SecondaryActivateTarget));
    }

    /// Secondary (middle-click) activation coming from the tray host.
    ///
    /// The target action runs first, then `secondary-activate` is emitted.
    /// A disabled action ignores the activation.
    pub(crate) fn secondary_activate(&self) {
        let target = self.imp().secondary_target.borrow().clone();
        let action = match target.map(|weak| weak.upgrade()) {
            Some(Some(action)) => {
                tracing::debug!(object = %self.object_id(), action = %action.name(), "secondary activation");
                Some(action)
            }
            Some(None) => {
                tracing::warn!(object = %self.object_id(), "secondary activate target no longer exists");
                None
            }
            None => None,
        };
        self.queue(move |native| {
            if let Some(action) = action {
                action.activate(None);
            }
            native.emit_by_name::<()>(SECONDARY_ACTIVATE, &[]);
        });
    }

    pub(crate) fn scroll(&self, delta: i32, direction: ScrollDirection) {
        let raw = direction.as_raw();
        self.queue(move |native| {
            native.emit_by_name::<()>(SCROLL_EVENT, &[&delta, &raw]);
        });
    }

    fn notify_property(&self, property: Property) {
        self.notify(property.name());
    }

    fn replace<T: PartialEq>(&self, value: T, field: impl FnOnce(&mut State) -> &mut T) -> bool {
        let mut state = self.imp().state.borrow_mut();
        let slot = field(&mut *state);
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }

    /// Queues `emit` on the main context. It is skipped if the object is
    /// disposed before the context gets to it.
    fn queue<F>(&self, emit: F)
    where
        F: FnOnce(&NativeIndicator) + 'static,
    {
        let Some(toolkit) = self.imp().toolkit.get() else {
            return;
        };
        let weak = self.downgrade();
        let queued = toolkit.invoke(move || {
            if let Some(native) = weak.upgrade() {
                emit(&native);
            }
        });
        if let Err(err) = queued {
            tracing::debug!(object = %self.object_id(), %err, "indicator signal not queued");
        }
    }

    /// Coalesces label changes into one signal per idle iteration.
    fn schedule_label_signal(&self) {
        let imp = self.imp();
        if imp.label_idle.borrow().is_some() {
            return;
        }
        let Some(toolkit) = imp.toolkit.get() else {
            return;
        };
        let weak = self.downgrade();
        let scheduled = toolkit.idle_add_once(move || {
            let Some(native) = weak.upgrade() else {
                return;
            };
            native.imp().label_idle.take();
            let signal = native.flavor().label_signal_name();
            let label = native.label().unwrap_or_default();
            let guide = native.label_guide().unwrap_or_default();
            tracing::trace!(object = %native.object_id(), signal, "label change");
            native.emit_by_name::<()>(signal, &[&label, &guide]);
        });
        match scheduled {
            Ok(source) => *imp.label_idle.borrow_mut() = Some(source),
            Err(err) => {
                tracing::debug!(object = %self.object_id(), %err, "label signal not scheduled");
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn native(toolkit: &Toolkit) -> NativeIndicator {
        let params = NativeParams {
            id: "native".into(),
            category: Category::Hardware,
            flavor: Flavor::Ayatana,
            icon_name: "chip".into(),
            attention_icon_name: Some(String::new()),
            icon_theme_path: None,
        };
        NativeIndicator::create(toolkit, &IndicatorLibrary::get(toolkit), params).unwrap()
    }

    fn drain(toolkit: &Toolkit) {
        while toolkit.main_context().pending() {
            toolkit.main_context().iteration(true);
        }
    }

    #[test]
    fn properties_are_readable_through_gobject() {
        let tk = Toolkit::init();
        let native = native(&tk);
        native.set_status(Status::Attention);
        native.set_ordering_index(3);

        assert_eq!(native.property::<String>("id"), "native");
        assert_eq!(native.property::<String>("category"), "Hardware");
        assert_eq!(native.property::<String>("status"), "NeedsAttention");
        assert_eq!(native.property::<String>("icon-name"), "chip");
        assert_eq!(native.property::<Option<String>>("attention-icon-name"), None);
        assert_eq!(native.property::<u32>("ordering-index"), 3);
        assert_eq!(native.property::<Option<gio::Menu>>("menu"), None);
    }

    #[test]
    fn menu_property_reports_attached_menu() {
        let tk = Toolkit::init();
        let native = native(&tk);
        let menu = gio::Menu::new();
        native.set_menu(Some(&menu));

        assert_eq!(native.property::<Option<gio::Menu>>("menu"), Some(menu));
    }

    #[test]
    fn flavor_selects_label_signal() {
        let tk = Toolkit::init();
        let native = native(&tk);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        native.connect_local("x-ayatana-new-label", false, move |values| {
            let label = values[1].get::<String>().ok()?;
            s.borrow_mut().push(label);
            None
        });
        let s = Rc::clone(&seen);
        native.connect_local("new-label", false, move |_| {
            s.borrow_mut().push("classic".into());
            None
        });

        native.set_label(Some("5"), None);
        drain(&tk);
        assert_eq!(*seen.borrow(), vec!["5".to_string()]);
    }

    #[test]
    fn queued_signals_of_disposed_object_are_skipped() {
        let tk = Toolkit::init();
        let native = native(&tk);
        let hits = Rc::new(RefCell::new(0));
        let h = Rc::clone(&hits);
        native.connect_local(NEW_ICON, false, move |_| {
            *h.borrow_mut() += 1;
            None
        });
        native.set_icon_name("queued");
        drop(native);

        assert!(tk.main_context().pending());
        drain(&tk);
        assert_eq!(*hits.borrow(), 0);
        assert!(IndicatorLibrary::get(&tk).live_ids().is_empty());
    }
}
