//! Drives a [`Choreographer`] from browser events and frames

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlImageElement, Performance, PerformanceNavigationTiming, Window};

use glint_core::{Choreographer, ElementId, EngineStats, GlintConfig, InputEvent, Millis, Page, Result};

use crate::dom_page::DomPage;
use crate::listeners;

pub type Shared = Rc<RefCell<Runtime>>;

/// Duration of the load event, if it has finished
pub fn load_duration(load_event_start: Millis, load_event_end: Millis) -> Option<Millis> {
    (load_event_end > 0.0 && load_event_end >= load_event_start).then(|| load_event_end - load_event_start)
}

/// Load duration from the navigation timing entry
pub fn navigation_load_ms(window: &Window) -> Option<Millis> {
    let entry = window.performance()?.get_entries_by_type("navigation").get(0);
    let timing = entry.dyn_into::<PerformanceNavigationTiming>().ok()?;
    load_duration(timing.load_event_start(), timing.load_event_end())
}

pub struct Runtime {
    engine: Choreographer,
    page: DomPage,
    performance: Option<Performance>,
    frame_scheduled: bool,
    /// Timer for the next queued job while no frame is pending
    wake: Option<Timeout>,
    /// Elements that already carry pointer listeners
    wired: HashSet<ElementId>,
    torn_down: bool,
}

impl Runtime {
    /// Mount on the document behind `window` and start listening
    pub fn start(window: Window, config: GlintConfig) -> Result<Shared> {
        let performance = window.performance();
        let page = DomPage::new(window)?;
        let engine = Choreographer::new(config)?;

        let shared = Rc::new(RefCell::new(Self {
            engine,
            page,
            performance,
            frame_scheduled: false,
            wake: None,
            wired: HashSet::new(),
            torn_down: false,
        }));
        let weak = Rc::downgrade(&shared);

        {
            let mut runtime = shared.borrow_mut();
            let now = runtime.now();
            let Runtime { engine, page, .. } = &mut *runtime;
            engine.mount(page, now);
            listeners::attach_global(&weak, page.window(), page.document())?;
            runtime.settle(&weak);
        }

        let complete = shared.borrow().page.document().ready_state() == "complete";
        if complete {
            // The load event already fired
            let load_ms = navigation_load_ms(shared.borrow().page.window());
            dispatch(&weak, InputEvent::Load { load_ms }, None);
        }

        info!("Glint mounted");
        Ok(shared)
    }

    fn now(&self) -> f64 {
        self.performance.as_ref().map(|p| p.now()).unwrap_or(0.0)
    }

    pub fn page(&self) -> &DomPage {
        &self.page
    }

    pub fn stats(&self) -> EngineStats {
        self.engine.stats()
    }

    pub fn teardown(&mut self) -> usize {
        self.torn_down = true;
        self.wake = None;
        self.engine.teardown()
    }

    /// Start pending preloads, wire new hover targets and schedule the next
    /// wake-up
    fn settle(&mut self, weak: &Weak<RefCell<Runtime>>) {
        if self.torn_down {
            return;
        }

        for el in self.page.take_preloads() {
            if let Err(e) = self.start_preload(weak, el) {
                warn!(element = %el, error = %e, "Preload failed to start");
            }
        }

        for el in self.engine.hover_targets() {
            if self.wired.contains(&el) {
                continue;
            }
            let Some(element) = self.page.element(el) else {
                continue;
            };
            match listeners::attach_pointer(weak, &element, el, self.page.supports_touch()) {
                Ok(()) => {
                    self.wired.insert(el);
                }
                Err(e) => warn!(element = %el, error = %e, "Pointer listeners failed"),
            }
        }

        self.schedule(weak);
    }

    fn start_preload(&self, weak: &Weak<RefCell<Runtime>>, el: ElementId) -> Result<()> {
        let src = self
            .page
            .attribute(el, "src")
            .ok_or_else(|| glint_core::Error::Dom(format!("{} has no src", el)))?;
        let image = HtmlImageElement::new().map_err(|e| glint_core::Error::Dom(format!("{:?}", e)))?;

        let weak = weak.clone();
        let onload = Closure::once_into_js(move || {
            dispatch(&weak, InputEvent::ImageLoaded { target: el }, None);
        });
        image.set_onload(Some(onload.unchecked_ref()));
        image.set_src(&src);
        debug!(element = %el, src = %src, "Preloading image");
        Ok(())
    }

    fn schedule(&mut self, weak: &Weak<RefCell<Runtime>>) {
        if self.engine.needs_frame() {
            self.wake = None;
            if self.frame_scheduled {
                return;
            }
            let callback = {
                let weak = weak.clone();
                Closure::once_into_js(move |_timestamp: f64| frame(&weak))
            };
            match self.page.window().request_animation_frame(callback.unchecked_ref()) {
                Ok(_) => self.frame_scheduled = true,
                Err(e) => warn!(error = ?e, "requestAnimationFrame failed"),
            }
            return;
        }

        self.wake = self.engine.next_deadline().map(|due| {
            let delay = (due - self.now()).max(0.0).ceil() as u32;
            let weak = weak.clone();
            Timeout::new(delay, move || frame(&weak))
        });
    }
}

/// Run one engine tick
fn frame(weak: &Weak<RefCell<Runtime>>) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let Ok(mut runtime) = shared.try_borrow_mut() else {
        return;
    };
    runtime.frame_scheduled = false;
    if runtime.torn_down {
        return;
    }

    let now = runtime.now();
    let Runtime { engine, page, .. } = &mut *runtime;
    engine.tick(page, now);
    runtime.settle(weak);
}

/// Feed `event` to the engine and apply its outcome to `native`
pub fn dispatch(weak: &Weak<RefCell<Runtime>>, event: InputEvent, native: Option<&Event>) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let Ok(mut runtime) = shared.try_borrow_mut() else {
        // Fired synchronously from inside the engine
        debug!(event = event.name(), "Dropped re-entrant event");
        return;
    };
    if runtime.torn_down {
        return;
    }

    let now = runtime.now();
    let Runtime { engine, page, .. } = &mut *runtime;
    let outcome = engine.dispatch(page, now, &event);

    if let Some(native) = native {
        if outcome.prevent_default {
            native.prevent_default();
        }
        if outcome.stop_propagation {
            native.stop_propagation();
        }
    }
    runtime.settle(weak);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_duration() {
        assert_eq!(load_duration(1200.0, 4700.0), Some(3500.0));
        // Still inside the load handlers
        assert_eq!(load_duration(1200.0, 0.0), None);
        assert_eq!(load_duration(0.0, 0.0), None);
    }
}
