//! Intro loading stagger and the page load marker

use tracing::{info, warn};

use crate::config::IntroConfig;
use crate::motion::Millis;
use crate::page::{Page, Selector};
use crate::schedule::TaskQueue;
use crate::Result;

use super::{compile, Job};

const LOADING: &str = "loading";
const LOADED: &str = "loaded";

#[derive(Debug, Clone)]
pub struct Intro {
    config: IntroConfig,
    selectors: Vec<Selector>,
    load_seen: bool,
    body_loaded: bool,
}

impl Intro {
    pub fn new(config: &IntroConfig) -> Result<Self> {
        let selectors = config
            .selectors
            .iter()
            .map(|s| compile("intro.selectors", s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            config: config.clone(),
            selectors,
            load_seen: false,
            body_loaded: false,
        })
    }

    /// Mark the body and hero elements as loading and schedule their
    /// staggered `loaded` class
    pub fn mount(&mut self, page: &mut dyn Page, tasks: &mut TaskQueue<Job>, now: Millis) -> Result<()> {
        let body = page.body();
        page.set_class(body, LOADING, true)?;

        for (index, selector) in self.selectors.iter().enumerate() {
            let Some(el) = page.query(selector, None) else {
                continue;
            };
            page.set_class(el, LOADING, true)?;
            let delay = self.config.delay_ms + index as f64 * self.config.stagger_ms;
            tasks.schedule(now, delay, Job::class(el, LOADED, true));
        }
        Ok(())
    }

    /// The window finished loading after `load_ms`
    pub fn load(&mut self, tasks: &mut TaskQueue<Job>, now: Millis, load_ms: Option<Millis>) {
        if std::mem::replace(&mut self.load_seen, true) {
            return;
        }
        if let Some(load_ms) = load_ms {
            if load_ms > self.config.slow_load_ms {
                warn!(load_ms, "Page load time exceeded {} ms", self.config.slow_load_ms);
            } else {
                info!(load_ms, "Page loaded");
            }
        }
        tasks.schedule(now, self.config.loaded_delay_ms, Job::BodyLoaded);
    }

    pub fn body_loaded(&mut self, page: &mut dyn Page) -> Result<()> {
        let body = page.body();
        page.set_class(body, LOADING, false)?;
        page.set_class(body, LOADED, true)?;
        self.body_loaded = true;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.body_loaded
    }
}
