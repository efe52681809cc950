use std::cell::RefCell;

use gloo::console;
use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, HtmlInputElement};

use fnwheel_core::{Rgb, DRAG_GRACE_MS};

use crate::sync_runtime::{self, OptionValue};

struct ViewState {
    listeners: Vec<EventListener>,
    mask_listeners: Vec<EventListener>,
    grace: Option<Timeout>,
    dragging: bool,
}

impl ViewState {
    fn new() -> Self {
        Self {
            listeners: Vec::new(),
            mask_listeners: Vec::new(),
            grace: None,
            dragging: false,
        }
    }
}

thread_local! {
    static VIEW: RefCell<ViewState> = RefCell::new(ViewState::new());
}

fn document() -> Option<Document> {
    web_sys::window().and_then(|window| window.document())
}

/// Wires the wheel input, options panel, and script buttons. Missing
/// elements are logged and skipped; the sync loop works without them.
pub(crate) fn init() {
    let Some(document) = document() else {
        return;
    };
    let mut listeners = Vec::new();

    if let Some(wheel) = document.get_element_by_id("wheel") {
        listeners.push(EventListener::new(&wheel, "input", |event| {
            if let Some(color) = event_color(event) {
                on_wheel_input(color);
            }
        }));
        listeners.push(EventListener::new(&wheel, "change", |event| {
            if let Some(color) = event_color(event) {
                on_wheel_change(color);
            }
        }));
    } else {
        console::warn!("missing #wheel element");
    }

    if let Some(options) = document.get_element_by_id("options") {
        if let Ok(inputs) = options.query_selector_all("input") {
            for i in 0..inputs.length() {
                let Some(node) = inputs.item(i) else {
                    continue;
                };
                let Ok(input) = node.dyn_into::<HtmlInputElement>() else {
                    continue;
                };
                // Seed the session from the markup defaults, then track
                // edits.
                apply_option_input(&input);
                let tracked = input.clone();
                listeners.push(EventListener::new(&input, "change", move |_| {
                    apply_option_input(&tracked);
                }));
            }
        }
    }

    if let Some(start) = document.get_element_by_id("start") {
        listeners.push(EventListener::new(&start, "click", |_| {
            sync_runtime::start_script(selected_script());
        }));
    }
    if let Some(stop) = document.get_element_by_id("stop") {
        listeners.push(EventListener::new(&stop, "click", |_| {
            sync_runtime::stop_script();
        }));
    }

    VIEW.with(|slot| {
        slot.borrow_mut().listeners = listeners;
    });
}

fn event_color(event: &Event) -> Option<Rgb> {
    let input = event.target()?.dyn_into::<HtmlInputElement>().ok()?;
    match Rgb::from_hex(&input.value()) {
        Ok(color) => Some(color),
        Err(err) => {
            console::warn!("bad wheel color", err.to_string());
            None
        }
    }
}

fn selected_script() -> u32 {
    document()
        .and_then(|document| document.get_element_by_id("script"))
        .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
        .and_then(|input| input.value().trim().parse().ok())
        .unwrap_or(1)
}

/// A stream of `input` events is a picking gesture. The first one arms
/// the grace timer; once it fires the gesture counts as a drag and every
/// further position goes straight through.
fn on_wheel_input(color: Rgb) {
    let dragging = VIEW.with(|slot| slot.borrow().dragging);
    if dragging {
        sync_runtime::drag_moved(color);
        return;
    }
    VIEW.with(|slot| {
        let mut view = slot.borrow_mut();
        if view.grace.is_none() {
            view.grace = Some(Timeout::new(DRAG_GRACE_MS, || {
                VIEW.with(|slot| {
                    let mut view = slot.borrow_mut();
                    view.dragging = true;
                    view.grace = None;
                });
                sync_runtime::drag_started();
            }));
        }
    });
}

/// `change` ends the gesture: a drag resumes polling, a quick click
/// commits a fade command.
fn on_wheel_change(color: Rgb) {
    let was_drag = VIEW.with(|slot| {
        let mut view = slot.borrow_mut();
        view.grace.take();
        std::mem::take(&mut view.dragging)
    });
    sync_runtime::drag_ended(was_drag, color);
}

fn apply_option_input(input: &HtmlInputElement) {
    let key = input.id();
    let value = match input.type_().as_str() {
        "checkbox" => OptionValue::Flag(input.checked()),
        _ => match input.value().trim().parse::<u32>() {
            Ok(n) => OptionValue::Number(n),
            Err(_) => return,
        },
    };
    sync_runtime::set_option(&key, value);
}

/// Shows a color. Writes only; layout and styling stay in the page.
pub(crate) fn publish(color: Rgb) {
    let Some(document) = document() else {
        return;
    };
    let hex = color.hex();
    if let Some(body) = document.body() {
        let _ = body.style().set_property("background-color", &hex);
    }
    if let Some(wheel) = document.get_element_by_id("wheel") {
        if let Some(input) = wheel.dyn_ref::<HtmlInputElement>() {
            input.set_value(&hex);
        }
    }
}

/// Builds one clickable bulb per device. Called once, when the first
/// status reports the device count.
pub(crate) fn build_mask(count: usize) {
    let Some(document) = document() else {
        return;
    };
    let Some(container) = document.get_element_by_id("mask") else {
        return;
    };
    container.set_inner_html("");
    let mut listeners = Vec::new();
    for index in 0..count {
        let Ok(bulb) = document.create_element("span") else {
            continue;
        };
        bulb.set_class_name("bulb on");
        let _ = container.append_child(&bulb);
        let toggled = bulb.clone();
        listeners.push(EventListener::new(&bulb, "click", move |_| {
            let enabled = sync_runtime::toggle_mask(index);
            toggled.set_class_name(if enabled { "bulb on" } else { "bulb off" });
        }));
    }
    VIEW.with(|slot| {
        slot.borrow_mut().mask_listeners = listeners;
    });
}

/// Occupancy row: one icon per connected viewer, self included.
pub(crate) fn draw_users(users: u32) {
    let Some(document) = document() else {
        return;
    };
    let Some(container) = document.get_element_by_id("users") else {
        return;
    };
    container.set_inner_html("");
    for _ in 0..=users {
        if let Ok(icon) = document.create_element("span") {
            icon.set_class_name("user");
            let _ = container.append_child(&icon);
        }
    }
}
