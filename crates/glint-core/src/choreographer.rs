//! The engine entry point
//!
//! A [`Choreographer`] owns every feature, the scroll driver and the task
//! queue. Hosts call three things:
//!
//! - `mount(page, now)` once the document is ready
//! - `dispatch(page, now, event)` for each input event
//! - `tick(page, now)` once per display frame, or when `next_deadline()`
//!   comes due
//!
//! Each feature handler runs on its own; a failing handler is logged and
//! counted, and the remaining handlers still run.

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::GlintConfig;
use crate::effects::a11y::Accessibility;
use crate::effects::ambient::Ambient;
use crate::effects::counter::CounterAnimator;
use crate::effects::easter::EasterEggs;
use crate::effects::gallery::Gallery;
use crate::effects::intro::Intro;
use crate::effects::lazy::LazyImages;
use crate::effects::links::SmoothLinks;
use crate::effects::menu::MobileMenu;
use crate::effects::parallax::Parallax;
use crate::effects::reveal::Revealer;
use crate::effects::scroll_state::ScrollStateController;
use crate::effects::tilt::Tilt;
use crate::effects::{compile, Job};
use crate::event::{InputEvent, Outcome};
use crate::motion::{Millis, ScrollDriver};
use crate::page::{ElementId, Page, Selector};
use crate::schedule::TaskQueue;
use crate::Result;

/// Seed for confetti placement when the host does not supply one
const DEFAULT_SEED: u64 = 0x5EED_617A;

/// Upper bound on jobs run by one `flush`, against intervals that never end
const FLUSH_LIMIT: usize = 100_000;

/// Running totals, mostly for the preview and simulator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub events: u64,
    pub scroll_events: u64,
    /// Coalesced scroll-state passes
    pub passes: u64,
    pub frames: u64,
    pub jobs_run: u64,
    pub handler_faults: u64,
}

/// What a `tick` did
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub jobs_run: usize,
    /// Scroll offset applied by the driver this frame
    pub driver_y: Option<f64>,
    pub pass_ran: bool,
}

/// Log and count a failed handler, keep going with a default value
fn guard<T: Default>(stats: &mut EngineStats, feature: &'static str, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            stats.handler_faults += 1;
            warn!(feature, error = %e, "Handler failed");
            T::default()
        }
    }
}

pub struct Choreographer {
    config: GlintConfig,
    tasks: TaskQueue<Job>,
    driver: ScrollDriver,
    scroll_state: ScrollStateController,
    parallax: Parallax,
    revealer: Revealer,
    counters: CounterAnimator,
    links: SmoothLinks,
    menu: MobileMenu,
    tilt: Tilt,
    gallery: Gallery,
    intro: Intro,
    lazy: LazyImages,
    easter: EasterEggs,
    a11y: Accessibility,
    ambient: Ambient,
    hero_counters: Selector,
    mounted: bool,
    stats: EngineStats,
}

impl Choreographer {
    pub fn new(config: GlintConfig) -> Result<Self> {
        Self::with_seed(config, DEFAULT_SEED)
    }

    /// Build with an explicit seed for the random confetti layout
    pub fn with_seed(config: GlintConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tasks: TaskQueue::new(),
            driver: ScrollDriver::new(),
            scroll_state: ScrollStateController::new(&config.navbar)?,
            parallax: Parallax::new(&config.parallax)?,
            revealer: Revealer::new(&config.reveal)?,
            counters: CounterAnimator::new(&config.counter),
            links: SmoothLinks::new(&config.scroll)?,
            menu: MobileMenu::new(&config.menu)?,
            tilt: Tilt::new(&config.tilt)?,
            gallery: Gallery::new(&config.gallery)?,
            intro: Intro::new(&config.intro)?,
            lazy: LazyImages::new(&config.lazy_images)?,
            easter: EasterEggs::new(&config.easter_eggs, seed)?,
            a11y: Accessibility::new(&config.accessibility)?,
            ambient: Ambient::new(&config.parallax.shapes.selector)?,
            hero_counters: compile("counter.hero_selector", &config.counter.hero_selector)?,
            mounted: false,
            stats: EngineStats::default(),
            config,
        })
    }

    /// Wire every feature to `page`
    ///
    /// Sections and images already in view are handled immediately, the
    /// way an intersection observer reports its initial state.
    pub fn mount(&mut self, page: &mut dyn Page, now: Millis) {
        if self.mounted {
            debug!("Already mounted, ignoring");
            return;
        }
        self.mounted = true;

        self.scroll_state.mount(page, now);
        self.menu.mount(page);
        self.revealer.mount(page);
        self.parallax.mount(page);
        self.tilt.mount(page);

        let stats = &mut self.stats;
        guard(stats, "gallery", self.gallery.mount(page, &mut self.tasks, now));
        guard(stats, "intro", self.intro.mount(page, &mut self.tasks, now));
        guard(stats, "lazy_images", self.lazy.mount(page));
        guard(stats, "easter_eggs", self.easter.mount(page));
        guard(stats, "accessibility", self.a11y.mount(page));

        let counters = page.query_all(&self.hero_counters, None);
        for (index, el) in counters.iter().copied().enumerate() {
            let delay = self.config.counter.hero_delay_ms + index as f64 * self.config.counter.hero_stagger_ms;
            self.tasks.schedule(now, delay, Job::StartCounter { element: el });
        }

        guard(stats, "reveal", self.revealer.evaluate(page, &mut self.tasks, now));
        guard(stats, "lazy_images", self.lazy.evaluate(page));

        info!(
            sections = self.revealer.sections().len(),
            tilt_cards = self.tilt.cards().len(),
            gallery_cards = self.gallery.cards().len(),
            counters = counters.len(),
            menu = self.menu.is_active(),
            pending = self.tasks.len(),
            "Mounted"
        );
    }

    /// Route one input event to the features that care about it
    pub fn dispatch(&mut self, page: &mut dyn Page, now: Millis, event: &InputEvent) -> Outcome {
        self.stats.events += 1;
        let mut outcome = Outcome::default();
        if !self.mounted {
            return outcome;
        }

        let stats = &mut self.stats;
        match event {
            InputEvent::Scroll => {
                stats.scroll_events += 1;
                if self.tasks.request_frame() {
                    trace!("Scroll pass requested");
                }
            }
            InputEvent::Click { target } => {
                outcome.merge(guard(stats, "menu", self.menu.click(page, &mut self.tasks, now, *target)));
                if let Some(jump) = self.links.resolve(page, *target) {
                    outcome.prevent_default = true;
                    let current = page.scroll_y();
                    if self.config.scroll.smooth_enabled {
                        let replaced = self.driver.animate_to(
                            current,
                            jump.y,
                            self.config.scroll.duration_ms,
                            self.config.scroll.easing,
                        );
                        debug!(from = current, to = jump.y, replaced, "Smooth scroll");
                    } else {
                        guard(stats, "links", page.scroll_to(jump.y));
                        self.tasks.request_frame();
                    }
                }
                outcome.merge(guard(stats, "easter_eggs", self.easter.click(page, &mut self.tasks, now, *target)));
            }
            InputEvent::MouseEnter { target } => {
                guard(stats, "tilt", self.tilt.enter(page, *target));
                guard(stats, "gallery", self.gallery.enter(page, *target));
            }
            InputEvent::MouseMove { target, x, y } => {
                guard(stats, "tilt", self.tilt.move_to(page, *target, *x, *y));
            }
            InputEvent::MouseLeave { target } => {
                guard(stats, "tilt", self.tilt.leave(page, *target));
                guard(stats, "gallery", self.gallery.leave(page, *target));
            }
            InputEvent::TouchStart { target } => {
                guard(stats, "tilt", self.tilt.touch_start(page, *target));
            }
            InputEvent::TouchEnd { target } => {
                guard(stats, "tilt", self.tilt.touch_end(page, *target));
            }
            InputEvent::KeyDown { key } => {
                guard(stats, "menu", self.menu.key(page, &mut self.tasks, key));
                guard(stats, "easter_eggs", self.easter.key(page, &mut self.tasks, now, key));
            }
            InputEvent::Resize => {
                self.tilt.schedule_reinit(&mut self.tasks, now);
            }
            InputEvent::VisibilityChange { hidden } => {
                guard(stats, "ambient", self.ambient.visibility(page, *hidden));
            }
            InputEvent::Load { load_ms } => {
                self.intro.load(&mut self.tasks, now, *load_ms);
            }
            InputEvent::Focus { target } => {
                guard(stats, "accessibility", self.a11y.focus(page, *target));
            }
            InputEvent::Blur { target } => {
                guard(stats, "accessibility", self.a11y.blur(page, *target));
            }
            InputEvent::ImageLoaded { target } => {
                guard(stats, "lazy_images", self.lazy.loaded(page, *target));
            }
        }

        outcome
    }

    /// Advance to `now`: due tasks first, then the driver's frame, then the
    /// coalesced scroll pass
    pub fn tick(&mut self, page: &mut dyn Page, now: Millis) -> TickReport {
        let mut report = TickReport::default();
        self.stats.frames += 1;

        while let Some(task) = self.tasks.pop_due(now) {
            self.run_job(page, now, task.job);
            report.jobs_run += 1;
        }

        if let Some(y) = self.driver.frame(now) {
            guard(&mut self.stats, "driver", page.scroll_to(y));
            // A programmatic scroll is still a scroll
            self.tasks.request_frame();
            report.driver_y = Some(y);
        }

        if self.tasks.take_frame_request() {
            self.scroll_pass(page, now);
            report.pass_ran = true;
        }

        report
    }

    fn scroll_pass(&mut self, page: &mut dyn Page, now: Millis) {
        self.stats.passes += 1;
        let stats = &mut self.stats;
        guard(stats, "scroll_state", self.scroll_state.pass(page, now));
        guard(stats, "parallax", self.parallax.pass(page));
        guard(stats, "reveal", self.revealer.evaluate(page, &mut self.tasks, now));
        guard(stats, "lazy_images", self.lazy.evaluate(page));
    }

    fn run_job(&mut self, page: &mut dyn Page, now: Millis, job: Job) {
        self.stats.jobs_run += 1;
        trace!(job = job.kind(), "Running job");
        let feature = job.kind();

        let result = match job {
            Job::Styles { element, styles } => styles
                .iter()
                .try_for_each(|(property, value)| page.set_style(element, property, value)),
            Job::Class { element, class, on } => page.set_class(element, &class, on),
            Job::StartCounter { element } => self.counters.start(page, &mut self.tasks, now, element).map(|_| ()),
            Job::CounterStep { element } => self.counters.step(page, &mut self.tasks, element),
            Job::Remove { element } => {
                self.easter.forget(element);
                page.remove_element(element)
            }
            Job::BodyLoaded => self.intro.body_loaded(page),
            Job::ResetLogoClicks => {
                self.easter.reset_clicks();
                Ok(())
            }
            Job::ClearFilter => self.easter.clear_filter(page),
            Job::ReinitTilt => {
                self.tilt.reinit(page);
                Ok(())
            }
        };

        guard(&mut self.stats, feature, result);
    }

    /// Run every pending task now, finish any scroll run and the pending
    /// pass; returns the number of jobs run
    pub fn flush(&mut self, page: &mut dyn Page, now: Millis) -> usize {
        let mut ran = 0;
        while let Some(task) = self.tasks.pop_next() {
            if ran >= FLUSH_LIMIT {
                warn!(limit = FLUSH_LIMIT, "Flush limit reached, discarding the rest");
                self.tasks.clear();
                break;
            }
            self.run_job(page, now, task.job);
            ran += 1;
        }

        if let Some(target) = self.driver.target() {
            self.driver.cancel();
            guard(&mut self.stats, "driver", page.scroll_to(target));
            self.tasks.request_frame();
        }
        if self.tasks.take_frame_request() {
            self.scroll_pass(page, now);
        }
        ran
    }

    /// Drop all pending work; returns the number of tasks discarded
    pub fn teardown(&mut self) -> usize {
        self.driver.cancel();
        self.counters.reset();
        let dropped = self.tasks.clear();
        debug!(dropped, "Teardown");
        dropped
    }

    /// Start a smooth scroll to `y` from the page's current offset
    pub fn scroll_to(&mut self, page: &dyn Page, y: f64) -> bool {
        self.driver.animate_to(
            page.scroll_y(),
            y,
            self.config.scroll.duration_ms,
            self.config.scroll.easing,
        )
    }

    /// Whether the host should schedule a display frame
    pub fn needs_frame(&self) -> bool {
        self.driver.is_animating() || self.tasks.frame_requested()
    }

    /// Earliest pending task due time
    pub fn next_deadline(&self) -> Option<Millis> {
        self.tasks.next_deadline()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn config(&self) -> &GlintConfig {
        &self.config
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn tasks(&self) -> &TaskQueue<Job> {
        &self.tasks
    }

    pub fn driver(&self) -> &ScrollDriver {
        &self.driver
    }

    pub fn scroll_state(&self) -> &ScrollStateController {
        &self.scroll_state
    }

    pub fn parallax(&self) -> &Parallax {
        &self.parallax
    }

    pub fn revealer(&self) -> &Revealer {
        &self.revealer
    }

    pub fn counters(&self) -> &CounterAnimator {
        &self.counters
    }

    pub fn links(&self) -> &SmoothLinks {
        &self.links
    }

    pub fn menu(&self) -> &MobileMenu {
        &self.menu
    }

    pub fn tilt(&self) -> &Tilt {
        &self.tilt
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn intro(&self) -> &Intro {
        &self.intro
    }

    pub fn lazy_images(&self) -> &LazyImages {
        &self.lazy
    }

    pub fn easter_eggs(&self) -> &EasterEggs {
        &self.easter
    }

    pub fn accessibility(&self) -> &Accessibility {
        &self.a11y
    }

    pub fn ambient(&self) -> &Ambient {
        &self.ambient
    }

    /// Elements hosts should attach pointer listeners to
    pub fn hover_targets(&self) -> Vec<ElementId> {
        let mut targets: Vec<ElementId> = self.tilt.cards().to_vec();
        for card in self.gallery.cards() {
            if !targets.contains(card) {
                targets.push(*card);
            }
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::VirtualPage;

    fn mounted() -> (Choreographer, VirtualPage) {
        let mut page = VirtualPage::sample().unwrap();
        let mut engine = Choreographer::new(GlintConfig::default()).unwrap();
        engine.mount(&mut page, 0.0);
        (engine, page)
    }

    fn find(page: &VirtualPage, selector: &str) -> ElementId {
        page.query(&Selector::parse(selector).unwrap(), None).unwrap()
    }

    #[test]
    fn test_mount_once() {
        let (mut engine, mut page) = mounted();
        let pending = engine.tasks().len();
        engine.mount(&mut page, 10.0);
        assert_eq!(engine.tasks().len(), pending);
        assert!(engine.is_mounted());
    }

    #[test]
    fn test_events_before_mount_ignored() {
        let mut page = VirtualPage::sample().unwrap();
        let mut engine = Choreographer::new(GlintConfig::default()).unwrap();
        engine.dispatch(&mut page, 0.0, &InputEvent::Scroll);
        assert!(!engine.needs_frame());
        assert!(page.mutations().is_empty());
    }

    #[test]
    fn test_scroll_events_coalesce() {
        let (mut engine, mut page) = mounted();
        page.set_scroll(300.0);
        engine.dispatch(&mut page, 5.0, &InputEvent::Scroll);
        engine.dispatch(&mut page, 6.0, &InputEvent::Scroll);
        engine.dispatch(&mut page, 7.0, &InputEvent::Scroll);
        assert!(engine.needs_frame());

        let report = engine.tick(&mut page, 16.0);
        assert!(report.pass_ran);
        assert_eq!(engine.stats().passes, 1);
        assert_eq!(engine.stats().scroll_events, 3);

        let report = engine.tick(&mut page, 32.0);
        assert!(!report.pass_ran);
    }

    #[test]
    fn test_link_click_drives_scroll() {
        let (mut engine, mut page) = mounted();
        let link = find(&page, ".cta-secondary");
        let outcome = engine.dispatch(&mut page, 0.0, &InputEvent::Click { target: link });
        assert!(outcome.prevent_default);
        assert!(engine.driver().is_animating());

        let mut now = 0.0;
        while engine.driver().is_animating() {
            now += 16.0;
            engine.tick(&mut page, now);
        }
        assert_eq!(page.scroll_y(), 2800.0);
        let contact = page.by_id("contact").unwrap();
        assert!(page.has_class(contact, "visible"));
    }

    #[test]
    fn test_instant_jump_when_smooth_disabled() {
        let mut config = GlintConfig::default();
        config.scroll.smooth_enabled = false;
        let mut page = VirtualPage::sample().unwrap();
        let mut engine = Choreographer::new(config).unwrap();
        engine.mount(&mut page, 0.0);

        let link = find(&page, ".cta-primary");
        engine.dispatch(&mut page, 0.0, &InputEvent::Click { target: link });
        assert!(!engine.driver().is_animating());
        assert_eq!(page.scroll_y(), 900.0);
    }

    #[test]
    fn test_handler_fault_does_not_block_siblings() {
        let (mut engine, mut page) = mounted();
        let card = engine.gallery().cards()[0];

        // Remove the card behind the engine's back; tilt fails on its write
        // and the gallery handler still runs (and fails on its own)
        page.remove_element(card).unwrap();
        engine.dispatch(&mut page, 0.0, &InputEvent::MouseEnter { target: card });
        assert_eq!(engine.stats().handler_faults, 2);

        let style_card = find(&page, ".style-card");
        engine.dispatch(&mut page, 0.0, &InputEvent::MouseEnter { target: style_card });
        assert_eq!(page.style(style_card, "transform-style").as_deref(), Some("preserve-3d"));
    }

    #[test]
    fn test_failed_job_is_counted() {
        let (mut engine, mut page) = mounted();
        let card = engine.gallery().cards()[0];
        page.remove_element(card).unwrap();

        // The gallery entrance for the removed card fails, the others run
        engine.tick(&mut page, 1000.0);
        assert_eq!(engine.stats().handler_faults, 1);
        let other = engine.gallery().cards()[1];
        engine.tick(&mut page, 1200.0);
        assert_eq!(page.style(other, "opacity").as_deref(), Some("1"));
    }

    #[test]
    fn test_flush_runs_everything() {
        let (mut engine, mut page) = mounted();
        let ran = engine.flush(&mut page, 0.0);
        assert!(ran > 0);
        assert!(engine.tasks().is_empty());

        let first = find(&page, ".hero-stats .stat-number");
        assert_eq!(page.text(first).as_deref(), Some("1,234 users"));
        assert!(page.has_class(page.body(), "loading"));
    }

    #[test]
    fn test_teardown_discards_pending() {
        let (mut engine, mut page) = mounted();
        assert!(engine.tasks().len() > 0);
        let dropped = engine.teardown();
        assert!(dropped > 0);
        assert!(engine.tasks().is_empty());
        assert!(!engine.needs_frame());
        assert_eq!(engine.tick(&mut page, 10_000.0).jobs_run, 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GlintConfig::default();
        config.tilt.selector = "div > p".to_string();
        assert!(Choreographer::new(config).is_err());
    }
}
