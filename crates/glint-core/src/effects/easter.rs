//! Easter eggs: logo confetti and the key sequence filter

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::EasterEggConfig;
use crate::event::{Key, Outcome};
use crate::motion::Millis;
use crate::page::{style, ElementId, NewElement, Page, Placement, Selector};
use crate::schedule::{TaskId, TaskQueue};
use crate::Result;

use super::{compile, Job};

/// Up Up Down Down Left Right Left Right b a
pub const KEY_SEQUENCE: [Key; 10] = [
    Key::ArrowUp,
    Key::ArrowUp,
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowLeft,
    Key::ArrowRight,
    Key::ArrowLeft,
    Key::ArrowRight,
    Key::Char('b'),
    Key::Char('a'),
];

pub const CONFETTI_KEYFRAMES: &str = "@keyframes confettiFall {
    to {
        transform: translateY(100vh) rotate(720deg);
        opacity: 0;
    }
}";

const SEQUENCE_FILTER: &str = "hue-rotate(180deg)";

#[derive(Debug, Clone)]
pub struct EasterEggs {
    config: EasterEggConfig,
    logo_selector: Selector,
    logo: Option<ElementId>,
    clicks: u32,
    reset_task: Option<TaskId>,
    keys: VecDeque<Key>,
    filter_task: Option<TaskId>,
    rng: SmallRng,
    confetti: Vec<ElementId>,
    bursts: u64,
    stylesheet_added: bool,
}

impl EasterEggs {
    pub fn new(config: &EasterEggConfig, seed: u64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            logo_selector: compile("easter_eggs.logo_selector", &config.logo_selector)?,
            logo: None,
            clicks: 0,
            reset_task: None,
            keys: VecDeque::with_capacity(KEY_SEQUENCE.len()),
            filter_task: None,
            rng: SmallRng::seed_from_u64(seed),
            confetti: Vec::new(),
            bursts: 0,
            stylesheet_added: false,
        })
    }

    pub fn mount(&mut self, page: &mut dyn Page) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        self.logo = page.query(&self.logo_selector, None);
        if !self.stylesheet_added {
            page.append_stylesheet(CONFETTI_KEYFRAMES)?;
            self.stylesheet_added = true;
        }
        Ok(())
    }

    pub fn click(&mut self, page: &mut dyn Page, tasks: &mut TaskQueue<Job>, now: Millis, target: ElementId) -> Result<Outcome> {
        let Some(logo) = self.logo else {
            return Ok(Outcome::default());
        };
        if !self.config.enabled || !page.contains(logo, target) {
            return Ok(Outcome::default());
        }

        self.clicks += 1;
        debug!(clicks = self.clicks, "Logo clicked");
        if self.clicks == self.config.logo_clicks {
            self.burst(page, tasks, now)?;
            tasks.reschedule(&mut self.reset_task, now, self.config.click_reset_ms, Job::ResetLogoClicks);
        }

        Ok(Outcome {
            prevent_default: true,
            ..Default::default()
        })
    }

    fn burst(&mut self, page: &mut dyn Page, tasks: &mut TaskQueue<Job>, now: Millis) -> Result<()> {
        let body = page.body();
        let animation = format!(
            "confettiFall {}s ease-out forwards",
            style::fmt_num(self.config.confetti_lifetime_ms / 1000.0)
        );

        for _ in 0..self.config.confetti_count {
            let left: f64 = self.rng.gen_range(0.0..100.0);
            let color = &self.config.confetti_colors[self.rng.gen_range(0..self.config.confetti_colors.len())];
            let css = format!(
                "position: fixed; top: -10px; left: {}vw; width: 10px; height: 10px; \
                 background: {}; z-index: 10000; border-radius: 50%; pointer-events: none; \
                 animation: {}",
                style::fmt_num(left),
                color,
                animation
            );
            let el = page.insert_element(body, NewElement::new("div").attr("class", "confetti").css(css), Placement::Last)?;
            self.confetti.push(el);
            tasks.schedule(now, self.config.confetti_lifetime_ms, Job::Remove { element: el });
        }

        self.bursts += 1;
        info!(count = self.config.confetti_count, "Confetti");
        Ok(())
    }

    pub fn reset_clicks(&mut self) {
        self.clicks = 0;
        self.reset_task = None;
    }

    /// A confetti element was removed
    pub fn forget(&mut self, el: ElementId) {
        self.confetti.retain(|c| *c != el);
    }

    pub fn key(&mut self, page: &mut dyn Page, tasks: &mut TaskQueue<Job>, now: Millis, key: &Key) -> Result<bool> {
        if !self.config.enabled {
            return Ok(false);
        }

        self.keys.push_back(key.normalized());
        if self.keys.len() > KEY_SEQUENCE.len() {
            self.keys.pop_front();
        }
        if !self.keys.iter().eq(KEY_SEQUENCE.iter()) {
            return Ok(false);
        }

        let body = page.body();
        page.set_style(body, style::FILTER, SEQUENCE_FILTER)?;
        tasks.reschedule(&mut self.filter_task, now, self.config.key_sequence_filter_ms, Job::ClearFilter);
        info!("Key sequence entered");
        Ok(true)
    }

    pub fn clear_filter(&mut self, page: &mut dyn Page) -> Result<()> {
        self.filter_task = None;
        let body = page.body();
        page.set_style(body, style::FILTER, "")
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    pub fn logo(&self) -> Option<ElementId> {
        self.logo
    }

    /// Confetti elements currently on the page
    pub fn confetti(&self) -> &[ElementId] {
        &self.confetti
    }

    pub fn bursts(&self) -> u64 {
        self.bursts
    }

    pub fn filter_active(&self) -> bool {
        self.filter_task.is_some()
    }
}
