//! Builds the indicator and its menu from the configuration and hands
//! control to the main loop.

use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use appind_indicator::{EventLoopBridge, IndicatorHandle, Status};
use appind_toolkit::Toolkit;
use gio::prelude::*;

use crate::config::{DemoConfig, IndicatorSection, MenuAction, MenuEntry};

/// Prefix under which a tray host exposes the menu's action group.
const ACTION_PREFIX: &str = "indicator";

/// The indicator menu plus the actions its entries refer to.
struct DemoMenu {
    menu: gio::Menu,
    actions: gio::SimpleActionGroup,
    entries: Vec<(String, gio::SimpleAction)>,
}

impl DemoMenu {
    fn action(&self, label: &str) -> Option<&gio::SimpleAction> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == label)
            .map(|(_, action)| action)
    }
}

/// Runs the demo until the Quit entry is activated or `run_seconds` elapse.
pub fn run(config: &DemoConfig) -> anyhow::Result<()> {
    let toolkit = Toolkit::init();
    let main_loop = toolkit.main_loop();

    let indicator = Rc::new(build_indicator(&toolkit, &config.indicator)?);
    let demo = build_menu(&config.menu, &main_loop, Rc::downgrade(&indicator));
    indicator.set_menu(&demo.menu);

    if let Some(target) = &config.indicator.secondary_target {
        match demo.action(target) {
            Some(action) => indicator.set_secondary_activate_target(Some(action)),
            None => tracing::warn!(target = %target, "secondary target not found in menu"),
        }
    }

    connect_logging(&indicator);

    let iterations = EventLoopBridge::new(&toolkit).drain();
    tracing::info!(
        id = indicator.id(),
        object = %indicator.object_id(),
        flavor = indicator.flavor().type_name(),
        visible_icon = ?indicator.visible_icon_name(),
        actions = demo.actions.list_actions().len(),
        iterations,
        "indicator ready"
    );

    if config.label_ticker {
        start_label_ticker(&toolkit, Rc::downgrade(&indicator))?;
    }
    if config.run_seconds > 0 {
        let quit = main_loop.clone();
        toolkit.timeout_add(Duration::from_secs(config.run_seconds), move || {
            tracing::info!("run time elapsed");
            quit.quit();
            glib::ControlFlow::Break
        })?;
    }

    main_loop.run();

    match Rc::try_unwrap(indicator) {
        Ok(indicator) => indicator.dispose(),
        Err(_) => tracing::warn!("indicator still shared at shutdown"),
    }
    drop(demo);
    toolkit.teardown();
    Ok(())
}

fn build_indicator(toolkit: &Toolkit, section: &IndicatorSection) -> anyhow::Result<IndicatorHandle> {
    let mut builder = IndicatorHandle::builder(section.id.clone(), section.category)
        .icon_name(section.icon_name.clone())
        .flavor(section.flavor);
    if !section.attention_icon_name.is_empty() {
        builder = builder.attention_icon_name(section.attention_icon_name.clone());
    }
    if let Some(path) = &section.icon_theme_path {
        builder = builder.icon_theme_path(path.clone());
    }

    let indicator = builder.build(toolkit)?;
    indicator.set_title(section.title.as_deref());
    indicator.set_label(section.label.as_deref(), section.label_guide.as_deref());
    indicator.set_status(section.status);
    Ok(indicator)
}

/// Separators start a new menu section.
fn build_menu(
    entries: &[MenuEntry],
    main_loop: &glib::MainLoop,
    indicator: Weak<IndicatorHandle>,
) -> DemoMenu {
    let menu = gio::Menu::new();
    let actions = gio::SimpleActionGroup::new();
    let mut labelled = Vec::new();
    let mut section = gio::Menu::new();

    for (index, entry) in entries.iter().enumerate() {
        if entry.separator {
            menu.append_section(None, &section);
            section = gio::Menu::new();
            continue;
        }

        let name = format!("item-{index}");
        let action = gio::SimpleAction::new(&name, None);
        action.set_enabled(entry.sensitive);

        match entry.action {
            MenuAction::Log => {
                let label = entry.label.clone();
                action.connect_activate(move |_, _| {
                    tracing::info!(label = %label, "menu item activated");
                });
            }
            MenuAction::ToggleAttention => {
                let indicator = indicator.clone();
                action.connect_activate(move |_, _| {
                    if let Some(indicator) = indicator.upgrade() {
                        toggle_attention(&indicator);
                    }
                });
            }
            MenuAction::Quit => {
                let main_loop = main_loop.clone();
                action.connect_activate(move |_, _| {
                    tracing::info!("quit requested from menu");
                    main_loop.quit();
                });
            }
        }

        actions.add_action(&action);
        section.append(Some(&entry.label), Some(&format!("{ACTION_PREFIX}.{name}")));
        labelled.push((entry.label.clone(), action));
    }
    if section.n_items() > 0 {
        menu.append_section(None, &section);
    }

    DemoMenu {
        menu,
        actions,
        entries: labelled,
    }
}

fn toggle_attention(indicator: &IndicatorHandle) {
    let next = match indicator.status() {
        Status::Attention => Status::Active,
        _ => Status::Attention,
    };
    indicator.set_status(next);
}

fn connect_logging(indicator: &IndicatorHandle) {
    let object = indicator.object_id();
    indicator.connect_new_status(move |status| {
        tracing::info!(%object, %status, "status changed");
    });
    indicator.connect_new_icon(move || {
        tracing::debug!(%object, "icon changed");
    });
    indicator.connect_new_attention_icon(move || {
        tracing::debug!(%object, "attention icon changed");
    });
    indicator.connect_new_label(move |label, guide| {
        tracing::debug!(%object, label, guide, "label changed");
    });
    indicator.connect_scroll_event(move |delta, direction| {
        tracing::debug!(%object, delta, ?direction, "scrolled");
    });
    indicator.connect_secondary_activate(move || {
        tracing::debug!(%object, "secondary activation");
    });
}

fn start_label_ticker(toolkit: &Toolkit, indicator: Weak<IndicatorHandle>) -> anyhow::Result<()> {
    let ticks = Cell::new(0u64);
    toolkit.timeout_add(Duration::from_secs(1), move || {
        let Some(indicator) = indicator.upgrade() else {
            return glib::ControlFlow::Break;
        };
        ticks.set(ticks.get() + 1);
        indicator.set_label(Some(&ticks.get().to_string()), Some("9999"));
        glib::ControlFlow::Continue
    })?;
    Ok(())
}
