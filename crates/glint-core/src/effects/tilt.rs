//! 3D tilt on `[data-tilt]` cards

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::config::TiltConfig;
use crate::motion::Millis;
use crate::page::{style, ElementId, Page, Selector};
use crate::schedule::{TaskId, TaskQueue};
use crate::Result;

use super::{compile, owning, Job};

const TOUCH_ANGLE_DEG: f64 = 5.0;
const TOUCH_SCALE: f64 = 1.02;
const TOUCH_LIFT_PX: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TiltState {
    #[default]
    Idle,
    Hovering,
}

#[derive(Debug, Clone)]
pub struct Tilt {
    config: TiltConfig,
    selector: Selector,
    cards: Vec<ElementId>,
    states: BTreeMap<ElementId, TiltState>,
    touch: bool,
    resize_task: Option<TaskId>,
    inits: u64,
}

/// `perspective(..) rotateX(..) rotateY(..) scale(..) translateZ(..)`
pub fn tilt_transform(perspective: f64, rotate_x: f64, rotate_y: f64, scale: f64, lift: f64) -> String {
    format!(
        "perspective({}) rotateX({}) rotateY({}) scale({}) translateZ({})",
        style::px(perspective),
        style::deg(rotate_x),
        style::deg(rotate_y),
        style::fmt_num(scale),
        style::px(lift)
    )
}

impl Tilt {
    pub fn new(config: &TiltConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            selector: compile("tilt.selector", &config.selector)?,
            cards: Vec::new(),
            states: BTreeMap::new(),
            touch: false,
            resize_task: None,
            inits: 0,
        })
    }

    /// Register every card; any hover state is reset
    pub fn mount(&mut self, page: &dyn Page) {
        self.cards = page.query_all(&self.selector, None);
        self.states = self.cards.iter().map(|el| (*el, TiltState::Idle)).collect();
        self.touch = page.supports_touch();
        self.inits += 1;
    }

    /// Debounce re-registration after a resize
    pub fn schedule_reinit(&mut self, tasks: &mut TaskQueue<Job>, now: Millis) {
        tasks.reschedule(&mut self.resize_task, now, self.config.resize_debounce_ms, Job::ReinitTilt);
    }

    pub fn reinit(&mut self, page: &dyn Page) {
        self.resize_task = None;
        self.mount(page);
        debug!(cards = self.cards.len(), "Tilt cards re-registered");
    }

    fn card(&self, page: &dyn Page, target: ElementId) -> Option<ElementId> {
        owning(page, &self.cards, target).map(|(_, el)| el)
    }

    pub fn neutral(&self) -> String {
        tilt_transform(self.config.perspective_px, 0.0, 0.0, 1.0, 0.0)
    }

    pub fn enter(&mut self, page: &mut dyn Page, target: ElementId) -> Result<bool> {
        let Some(card) = self.card(page, target) else {
            return Ok(false);
        };
        self.states.insert(card, TiltState::Hovering);
        page.set_style(card, style::TRANSFORM_STYLE, "preserve-3d")?;
        Ok(true)
    }

    /// Pointer moved to viewport point `(x, y)` over `target`
    pub fn move_to(&mut self, page: &mut dyn Page, target: ElementId, x: f64, y: f64) -> Result<bool> {
        let Some(card) = self.card(page, target) else {
            return Ok(false);
        };
        if self.state(card) != TiltState::Hovering {
            return Ok(false);
        }
        let Some(rect) = page.rect(card) else {
            return Ok(false);
        };
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return Ok(false);
        }

        let (center_x, center_y) = rect.center();
        let delta_x = (x - center_x) / (rect.width / 2.0);
        let delta_y = (y - center_y) / (rect.height / 2.0);
        let angle = self.config.max_angle_deg;

        let transform = tilt_transform(
            self.config.perspective_px,
            delta_y * -angle,
            delta_x * angle,
            self.config.scale,
            self.config.lift_px,
        );
        page.set_style(card, style::TRANSFORM, &transform)?;
        Ok(true)
    }

    pub fn leave(&mut self, page: &mut dyn Page, target: ElementId) -> Result<bool> {
        let Some(card) = self.card(page, target) else {
            return Ok(false);
        };
        self.states.insert(card, TiltState::Idle);
        page.set_style(card, style::TRANSFORM, &self.neutral())?;
        Ok(true)
    }

    pub fn touch_start(&mut self, page: &mut dyn Page, target: ElementId) -> Result<bool> {
        if !self.touch {
            return Ok(false);
        }
        let Some(card) = self.card(page, target) else {
            return Ok(false);
        };
        let transform = tilt_transform(
            self.config.perspective_px,
            TOUCH_ANGLE_DEG,
            TOUCH_ANGLE_DEG,
            TOUCH_SCALE,
            TOUCH_LIFT_PX,
        );
        page.set_style(card, style::TRANSFORM, &transform)?;
        Ok(true)
    }

    pub fn touch_end(&mut self, page: &mut dyn Page, target: ElementId) -> Result<bool> {
        if !self.touch {
            return Ok(false);
        }
        let Some(card) = self.card(page, target) else {
            return Ok(false);
        };
        page.set_style(card, style::TRANSFORM, &self.neutral())?;
        Ok(true)
    }

    pub fn state(&self, card: ElementId) -> TiltState {
        self.states.get(&card).copied().unwrap_or_default()
    }

    pub fn cards(&self) -> &[ElementId] {
        &self.cards
    }

    /// How many times the card registry was built
    pub fn inits(&self) -> u64 {
        self.inits
    }

    pub fn reinit_pending(&self) -> bool {
        self.resize_task.is_some()
    }
}
