//! DOM event listeners that forward into the runtime
//!
//! Listeners live as long as the page, so their closures are leaked with
//! `forget`. They hold a weak handle and go quiet after teardown.

use std::cell::RefCell;
use std::rc::Weak;

use gloo_timers::callback::Timeout;
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, KeyboardEvent, MouseEvent, Window};

use glint_core::{ElementId, Error, InputEvent, Key, Result};

use crate::runtime::{dispatch, navigation_load_ms, Runtime};

type Handle = Weak<RefCell<Runtime>>;

fn listen<F>(target: &EventTarget, name: &str, handler: F) -> Result<()>
where
    F: FnMut(Event) + 'static,
{
    let callback = Closure::<dyn FnMut(Event)>::new(handler);
    target
        .add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
        .map_err(|e| Error::Dom(format!("{:?}", e)))?;
    callback.forget();
    Ok(())
}

/// The element an event was aimed at, registered with the page
fn target_id(handle: &Handle, event: &Event) -> Option<ElementId> {
    let element = event.target()?.dyn_into::<Element>().ok()?;
    let shared = handle.upgrade()?;
    let runtime = shared.try_borrow().ok()?;
    Some(runtime.page().register(&element))
}

/// Window and document listeners
pub fn attach_global(handle: &Handle, window: &Window, document: &Document) -> Result<()> {
    let h = handle.clone();
    listen(window, "scroll", move |event| {
        dispatch(&h, InputEvent::Scroll, Some(&event))
    })?;

    let h = handle.clone();
    listen(window, "resize", move |event| {
        dispatch(&h, InputEvent::Resize, Some(&event))
    })?;

    let h = handle.clone();
    let win = window.clone();
    listen(window, "load", move |_event| {
        let (h, win) = (h.clone(), win.clone());
        // Navigation timing is final once the load handlers have returned
        Timeout::new(0, move || {
            let load_ms = navigation_load_ms(&win);
            dispatch(&h, InputEvent::Load { load_ms }, None)
        })
        .forget();
    })?;

    let h = handle.clone();
    listen(document, "click", move |event| {
        if let Some(target) = target_id(&h, &event) {
            dispatch(&h, InputEvent::Click { target }, Some(&event));
        }
    })?;

    let h = handle.clone();
    listen(document, "keydown", move |event| {
        let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        match keyboard.key().parse::<Key>() {
            Ok(key) => dispatch(&h, InputEvent::KeyDown { key }, Some(&event)),
            Err(e) => debug!(error = %e, "Ignoring key"),
        }
    })?;

    let h = handle.clone();
    let doc = document.clone();
    listen(document, "visibilitychange", move |event| {
        let hidden = doc.hidden();
        dispatch(&h, InputEvent::VisibilityChange { hidden }, Some(&event))
    })?;

    let h = handle.clone();
    listen(document, "focusin", move |event| {
        if let Some(target) = target_id(&h, &event) {
            dispatch(&h, InputEvent::Focus { target }, Some(&event));
        }
    })?;

    let h = handle.clone();
    listen(document, "focusout", move |event| {
        if let Some(target) = target_id(&h, &event) {
            dispatch(&h, InputEvent::Blur { target }, Some(&event));
        }
    })?;

    Ok(())
}

/// Pointer listeners on one hover target; touch listeners only where the
/// device has touch
pub fn attach_pointer(handle: &Handle, element: &Element, id: ElementId, touch: bool) -> Result<()> {
    let h = handle.clone();
    listen(element, "mouseenter", move |event| {
        dispatch(&h, InputEvent::MouseEnter { target: id }, Some(&event))
    })?;

    let h = handle.clone();
    listen(element, "mousemove", move |event| {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let (x, y) = (mouse.client_x() as f64, mouse.client_y() as f64);
        dispatch(&h, InputEvent::MouseMove { target: id, x, y }, Some(&event))
    })?;

    let h = handle.clone();
    listen(element, "mouseleave", move |event| {
        dispatch(&h, InputEvent::MouseLeave { target: id }, Some(&event))
    })?;

    if touch {
        let h = handle.clone();
        listen(element, "touchstart", move |event| {
            dispatch(&h, InputEvent::TouchStart { target: id }, Some(&event))
        })?;

        let h = handle.clone();
        listen(element, "touchend", move |event| {
            dispatch(&h, InputEvent::TouchEnd { target: id }, Some(&event))
        })?;
    }

    Ok(())
}
