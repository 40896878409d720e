fn main() {
    println!("Run `cargo test -p appind-scenarios` to execute the indicator scenarios.");
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use appind_indicator::{
        Category, EventLoopBridge, Flavor, IndicatorError, IndicatorHandle, IndicatorLibrary,
        IndicatorObserver, Property, ScrollDirection, Status,
    };
    use appind_toolkit::gio;
    use appind_toolkit::gio::prelude::*;
    use appind_toolkit::{Toolkit, ToolkitError};

    /// Fresh toolkit plus the indicator every scenario starts from, already
    /// flushed through the loop.
    fn fixture(flavor: Flavor) -> (Toolkit, EventLoopBridge, IndicatorHandle) {
        let toolkit = Toolkit::init();
        let indicator = IndicatorHandle::builder("my-id", Category::ApplicationStatus)
            .icon_name("my-name")
            .flavor(flavor)
            .build(&toolkit)
            .unwrap();
        let bridge = EventLoopBridge::new(&toolkit);
        bridge.drain();
        (toolkit, bridge, indicator)
    }

    // --- Construction ---

    #[test]
    fn initial_properties() {
        let (_tk, _bridge, indicator) = fixture(Flavor::AppIndicator);

        assert_eq!(indicator.icon_name(), "my-name");
        assert_eq!(indicator.id(), "my-id");
        // Passive and ApplicationStatus share the native value 0.
        assert_eq!(indicator.status(), Status::Passive);
        assert_eq!(indicator.status().as_raw(), Category::ApplicationStatus.as_raw());
    }

    #[test]
    fn set_properties_read_back() {
        let (_tk, bridge, indicator) = fixture(Flavor::AppIndicator);

        indicator.set_status(Status::Attention);
        indicator.set_attention_icon_name("my-attention-name");
        bridge.drain();

        assert_eq!(indicator.status(), Status::Attention);
        assert_eq!(indicator.attention_icon_name().as_deref(), Some("my-attention-name"));
    }

    #[test]
    fn construction_without_toolkit_fails() {
        let result = std::thread::spawn(|| {
            IndicatorHandle::with_current_toolkit("my-id", "my-name", Category::ApplicationStatus)
                .map(|_| ())
        })
        .join()
        .unwrap();
        assert_eq!(result, Err(IndicatorError::Toolkit(ToolkitError::NotInitialized)));
    }

    #[test]
    fn construction_after_teardown_fails() {
        let toolkit = Toolkit::init();
        let stale = toolkit.clone();
        toolkit.teardown();

        assert!(!stale.is_initialized());
        let err = IndicatorHandle::new(&stale, "my-id", "my-name", Category::Other).unwrap_err();
        assert_eq!(err, IndicatorError::Toolkit(ToolkitError::NotInitialized));
        assert!(Toolkit::current().is_err());
    }

    #[test]
    fn id_is_fixed_at_construction() {
        let (_tk, _bridge, indicator) = fixture(Flavor::AppIndicator);
        indicator.set_icon_name("renamed");
        assert_eq!(indicator.id(), "my-id");
        assert_eq!(indicator.snapshot().id, "my-id");
    }

    // --- Loop bridge ---

    #[test]
    fn drain_is_idempotent() {
        let (_tk, bridge, indicator) = fixture(Flavor::AppIndicator);
        assert_eq!(bridge.drain(), 0);

        indicator.set_status(Status::Active);
        assert!(bridge.drain() > 0);
        assert_eq!(bridge.drain(), 0);
        assert!(!bridge.has_pending());
    }

    #[test]
    fn observers_agree_after_drain() {
        let (tk, bridge, indicator) = fixture(Flavor::AppIndicator);
        let a = IndicatorObserver::attach(&tk, indicator.object_id()).unwrap();
        let b = indicator.observe();

        indicator.set_icon_name("busy");
        indicator.set_attention_icon_name("alert");
        indicator.set_status(Status::Attention);
        assert_eq!(a.status(), Status::Passive);

        bridge.drain();
        for observer in [&a, &b] {
            assert_eq!(observer.icon_name(), "busy");
            assert_eq!(observer.attention_icon_name().as_deref(), Some("alert"));
            assert_eq!(observer.status(), Status::Attention);
        }
        assert_eq!(a.snapshot(), indicator.snapshot());
        assert_eq!(a.snapshot().visible_icon_name(), Some("alert"));
    }

    #[test]
    fn signals_arrive_in_write_order() {
        let (_tk, bridge, indicator) = fixture(Flavor::AppIndicator);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        indicator.connect_notify(move |property| s.borrow_mut().push(property));

        indicator.set_icon_name("a");
        indicator.set_status(Status::Active);
        indicator.set_attention_icon_name("b");
        bridge.drain();

        assert_eq!(
            *seen.borrow(),
            vec![Property::IconName, Property::Status, Property::AttentionIconName]
        );
    }

    // --- Menu ---

    #[test]
    fn menu_round_trip_keeps_identity() {
        let (tk, bridge, indicator) = fixture(Flavor::AppIndicator);
        let observer = IndicatorObserver::attach(&tk, indicator.object_id()).unwrap();
        let menu = gio::Menu::new();
        menu.append(Some("Foo"), Some("indicator.foo"));
        menu.append(Some("Bar"), Some("indicator.bar"));

        indicator.set_menu(&menu);
        bridge.drain();

        let attached = indicator.menu().unwrap();
        assert_eq!(attached, menu);
        assert!(observer.snapshot().has_menu);
        let labels: Vec<String> = (0..attached.n_items())
            .filter_map(|i| attached.item_attribute_value(i, "label", None))
            .filter_map(|value| value.get::<String>())
            .collect();
        assert_eq!(labels, vec!["Foo", "Bar"]);
    }

    #[test]
    fn secondary_click_activates_menu_item() {
        let (_tk, bridge, indicator) = fixture(Flavor::AppIndicator);
        let menu = gio::Menu::new();
        let toggle = gio::SimpleAction::new("toggle", None);
        menu.append(Some("Toggle"), Some("indicator.toggle"));
        indicator.set_menu(&menu);

        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        toggle.connect_activate(move |_, _| h.set(h.get() + 1));
        indicator.set_secondary_activate_target(Some(&toggle));

        indicator.secondary_activate();
        bridge.drain();
        assert_eq!(hits.get(), 1);

        toggle.set_enabled(false);
        indicator.secondary_activate();
        bridge.drain();
        assert_eq!(hits.get(), 1);
    }

    // --- Disposal ---

    #[test]
    fn dispose_releases_native_object() {
        let (tk, bridge, indicator) = fixture(Flavor::AppIndicator);
        let observer = indicator.observe();
        let object = indicator.object_id();
        let library = IndicatorLibrary::get(&tk);
        assert_eq!(library.live_ids(), vec![object]);

        indicator.set_status(Status::Active);
        indicator.dispose();
        bridge.drain();

        assert!(library.live_ids().is_empty());
        assert!(!observer.is_alive());
        assert_eq!(observer.refresh(), Err(IndicatorError::Disposed(object)));
        assert_eq!(
            IndicatorObserver::attach(&tk, object).unwrap_err(),
            IndicatorError::UnknownObject(object)
        );
    }

    #[test]
    fn teardown_discards_pending_signals() {
        let (tk, _bridge, indicator) = fixture(Flavor::AppIndicator);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        indicator.connect_new_icon(move || h.set(h.get() + 1));
        indicator.set_icon_name("never-delivered");

        let context = tk.main_context().clone();
        tk.teardown();
        assert!(!context.pending());
        assert_eq!(hits.get(), 0);
        assert_eq!(indicator.icon_name(), "never-delivered");
    }

    #[test]
    fn disposing_indicator_whose_handler_owns_an_observer() {
        let (tk, bridge, indicator) = fixture(Flavor::AppIndicator);
        let object = indicator.object_id();
        let observer = indicator.observe();
        indicator.connect_new_status(move |_| {
            let _ = observer.status();
        });
        indicator.set_status(Status::Active);

        indicator.dispose();
        bridge.drain();

        let library = IndicatorLibrary::get(&tk);
        assert_eq!(library.handler_count(object), 0);
        assert!(library.live_ids().is_empty());
    }

    #[test]
    fn disconnecting_handler_that_owns_another_indicator() {
        let (tk, bridge, indicator) = fixture(Flavor::AppIndicator);
        let companion = IndicatorHandle::new(&tk, "companion", "icon", Category::Other).unwrap();
        let companion_observer = companion.observe();
        let id = indicator.connect_new_icon(move || companion.set_icon_name("bumped"));

        indicator.set_icon_name("first");
        bridge.drain();
        assert_eq!(companion_observer.icon_name(), "bumped");

        assert!(indicator.disconnect(id));
        assert!(!companion_observer.is_alive());
        assert_eq!(IndicatorLibrary::get(&tk).live_ids(), vec![indicator.object_id()]);

        indicator.set_icon_name("second");
        assert_eq!(bridge.drain(), 1);
    }

    // --- Flavor parity ---

    /// Runs one scripted session and records what a client would observe.
    fn scripted_session(flavor: Flavor) -> Vec<String> {
        let (_tk, bridge, indicator) = fixture(flavor);
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = Rc::clone(&log);
        indicator.connect_new_status(move |status| l.borrow_mut().push(format!("status {status}")));
        let l = Rc::clone(&log);
        indicator.connect_new_icon(move || l.borrow_mut().push("icon".into()));
        let l = Rc::clone(&log);
        indicator.connect_new_attention_icon(move || l.borrow_mut().push("attention-icon".into()));
        let l = Rc::clone(&log);
        indicator.connect_new_label(move |label, guide| {
            l.borrow_mut().push(format!("label {label} {guide}"));
        });
        let l = Rc::clone(&log);
        indicator.connect_new_icon_theme_path(move |path| {
            l.borrow_mut().push(format!("theme-path {path}"));
        });
        let l = Rc::clone(&log);
        indicator.connect_scroll_event(move |delta, direction| {
            l.borrow_mut().push(format!("scroll {delta} {direction:?}"));
        });
        let l = Rc::clone(&log);
        indicator.connect_secondary_activate(move || l.borrow_mut().push("secondary".into()));

        let menu = gio::Menu::new();
        indicator.set_menu(&menu);
        indicator.set_status(Status::Active);
        indicator.set_icon_name("next");
        indicator.set_attention_icon_name("alert");
        indicator.set_status(Status::Attention);
        indicator.set_label(Some("7"), Some("99"));
        indicator.set_icon_theme_path(Some("/usr/share/demo/icons"));
        indicator.scroll(1, ScrollDirection::Up);
        indicator.secondary_activate();
        bridge.drain();

        let snapshot = indicator.snapshot();
        log.borrow_mut().push(format!(
            "final {} {} {:?} {:?}",
            snapshot.status,
            snapshot.icon_name,
            snapshot.attention_icon_name,
            snapshot.visible_icon_name()
        ));
        let entries = log.borrow().clone();
        entries
    }

    #[test]
    fn flavors_behave_identically() {
        let classic = scripted_session(Flavor::AppIndicator);
        let ayatana = scripted_session(Flavor::Ayatana);

        assert_eq!(classic, ayatana);
        assert_eq!(classic.first().map(String::as_str), Some("status Active"));
        assert_eq!(
            classic.last().map(String::as_str),
            Some("final NeedsAttention next Some(\"alert\") Some(\"alert\")")
        );
        assert!(classic.contains(&"label 7 99".to_string()));
    }

    #[test]
    fn flavors_differ_in_native_names() {
        let (_tk, _bridge, classic) = fixture(Flavor::AppIndicator);
        let ayatana = IndicatorHandle::builder("other-id", Category::ApplicationStatus)
            .flavor(Flavor::Ayatana)
            .build(classic.toolkit())
            .unwrap();

        assert_eq!(classic.flavor().type_name(), "AppIndicator");
        assert_eq!(ayatana.flavor().type_name(), "AyatanaAppIndicator");
        assert_ne!(classic.object_id(), ayatana.object_id());
    }
}
