//! Intersection-driven revealer
//!
//! Sections start `Unseen`. The first pass that finds enough of a section
//! inside the viewport marks it `Revealed`, adds the visible class and runs
//! the section's staggered sequence. `Revealed` is terminal.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::config::{RevealAction, RevealConfig};
use crate::motion::Millis;
use crate::page::{style, ElementId, Page, Rect, Selector};
use crate::schedule::TaskQueue;
use crate::Result;

use super::{compile, Job, SETTLE_CURVE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealState {
    Unseen,
    Revealed,
}

#[derive(Debug, Clone)]
struct Step {
    selector: Selector,
    delay_ms: Millis,
    stagger_ms: Millis,
    action: RevealAction,
}

#[derive(Debug, Clone)]
pub struct Revealer {
    threshold: f64,
    bottom_margin_px: f64,
    visible_class: String,
    section_selector: Selector,
    sequences: HashMap<String, Vec<Step>>,
    states: BTreeMap<ElementId, RevealState>,
}

/// Fraction of `rect`'s height inside the viewport band
/// `[0, viewport_height - bottom_margin]`
pub fn visible_ratio(rect: &Rect, viewport_height: f64, bottom_margin: f64) -> f64 {
    let band_bottom = (viewport_height - bottom_margin).max(0.0);
    if rect.height <= 0.0 {
        let inside = rect.top >= 0.0 && rect.top <= band_bottom;
        return if inside { 1.0 } else { 0.0 };
    }
    let visible = rect.bottom().min(band_bottom) - rect.top.max(0.0);
    (visible.max(0.0) / rect.height).min(1.0)
}

impl Revealer {
    pub fn new(config: &RevealConfig) -> Result<Self> {
        let mut sequences = HashMap::new();
        for sequence in &config.sequences {
            let steps = sequence
                .steps
                .iter()
                .map(|step| {
                    Ok(Step {
                        selector: compile("reveal", &step.selector)?,
                        delay_ms: step.delay_ms,
                        stagger_ms: step.stagger_ms,
                        action: step.action,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            sequences.insert(sequence.section.clone(), steps);
        }

        Ok(Self {
            threshold: config.threshold,
            bottom_margin_px: config.bottom_margin_px,
            visible_class: config.visible_class.clone(),
            section_selector: compile("reveal.section_selector", &config.section_selector)?,
            sequences,
            states: BTreeMap::new(),
        })
    }

    /// Start observing every section
    pub fn mount(&mut self, page: &dyn Page) {
        self.states = page
            .query_all(&self.section_selector, None)
            .into_iter()
            .map(|el| (el, RevealState::Unseen))
            .collect();
    }

    fn triggered(&self, page: &dyn Page, section: ElementId) -> bool {
        let Some(rect) = page.rect(section) else {
            return false;
        };
        let ratio = visible_ratio(&rect, page.viewport_height(), self.bottom_margin_px);
        ratio > 0.0 && ratio >= self.threshold
    }

    /// Reveal every unseen section that is now visible enough
    pub fn evaluate(&mut self, page: &mut dyn Page, tasks: &mut TaskQueue<Job>, now: Millis) -> Result<Vec<ElementId>> {
        let view: &dyn Page = &*page;
        let due: Vec<ElementId> = self
            .states
            .iter()
            .filter(|(_, state)| **state == RevealState::Unseen)
            .map(|(el, _)| *el)
            .filter(|el| self.triggered(view, *el))
            .collect();

        let mut revealed = Vec::new();
        for section in due {
            if self.reveal(page, tasks, now, section)? {
                revealed.push(section);
            }
        }
        Ok(revealed)
    }

    /// Reveal `section` if it has not been revealed yet
    ///
    /// The state flips before any write, so a failing write never leads to
    /// a second run.
    pub fn reveal(&mut self, page: &mut dyn Page, tasks: &mut TaskQueue<Job>, now: Millis, section: ElementId) -> Result<bool> {
        if self.states.insert(section, RevealState::Revealed) == Some(RevealState::Revealed) {
            return Ok(false);
        }

        page.set_class(section, &self.visible_class, true)?;

        let id = page.attribute(section, "id").unwrap_or_default();
        let Some(steps) = self.sequences.get(&id) else {
            debug!(section = %section, "Section revealed");
            return Ok(true);
        };

        let mut scheduled = 0;
        for step in steps {
            let elements = page.query_all(&step.selector, Some(section));
            for (index, el) in elements.into_iter().enumerate() {
                let delay = step.delay_ms + index as f64 * step.stagger_ms;
                let job = match step.action {
                    RevealAction::Rise => {
                        page.set_style(el, style::OPACITY, "0")?;
                        page.set_style(el, style::TRANSFORM, "translateY(50px)")?;
                        let transition = format!("all 0.8s {}", SETTLE_CURVE);
                        Job::styles(
                            el,
                            &[
                                (style::TRANSITION, transition.as_str()),
                                (style::OPACITY, "1"),
                                (style::TRANSFORM, "translateY(0)"),
                            ],
                        )
                    }
                    RevealAction::Slide => Job::styles(el, &[(style::OPACITY, "1"), (style::TRANSFORM, "translateX(0)")]),
                    RevealAction::Settle => Job::styles(el, &[(style::OPACITY, "1"), (style::TRANSFORM, "translateY(0)")]),
                    RevealAction::Count => Job::StartCounter { element: el },
                };
                tasks.schedule(now, delay, job);
                scheduled += 1;
            }
        }

        debug!(section = %id, scheduled, "Section revealed");
        Ok(true)
    }

    pub fn state(&self, section: ElementId) -> RevealState {
        self.states.get(&section).copied().unwrap_or(RevealState::Unseen)
    }

    /// Sections revealed so far, in document order of registration
    pub fn revealed(&self) -> Vec<ElementId> {
        self.states
            .iter()
            .filter(|(_, s)| **s == RevealState::Revealed)
            .map(|(el, _)| *el)
            .collect()
    }

    pub fn sections(&self) -> Vec<ElementId> {
        self.states.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::VirtualPage;

    const PAGE: &str = r#"
viewport_height = 800

[[element]]
tag = "section"
id = "style"
class = "section"
top = 1000
height = 900

[[element.element]]
class = "style-card"
top = 1100
height = 300

[[element.element]]
class = "style-card"
top = 1100
height = 300

[[element]]
tag = "section"
id = "contact"
class = "section"
top = 2000
height = 800

[[element.element]]
class = "contact-main"
top = 2100
height = 200

[[element.element]]
class = "contact-stat"
top = 2400
height = 100

[[element.element.element]]
class = "stat-number"
text = "12 stores"
top = 2400
height = 50
"#;

    fn setup() -> (Revealer, VirtualPage, TaskQueue<Job>) {
        let page = VirtualPage::from_toml_str(PAGE).unwrap();
        let mut revealer = Revealer::new(&RevealConfig::default()).unwrap();
        revealer.mount(&page);
        (revealer, page, TaskQueue::new())
    }

    #[test]
    fn test_visible_ratio() {
        let rect = Rect {
            top: 500.0,
            left: 0.0,
            width: 100.0,
            height: 1000.0,
        };
        // Band is [0, 700]
        assert!((visible_ratio(&rect, 800.0, 100.0) - 0.2).abs() < 1e-9);

        let below = Rect { top: 750.0, ..rect };
        assert_eq!(visible_ratio(&below, 800.0, 100.0), 0.0);

        let above = Rect { top: -2000.0, ..rect };
        assert_eq!(visible_ratio(&above, 800.0, 100.0), 0.0);
    }

    #[test]
    fn test_reveal_once_when_visible() {
        let (mut revealer, mut page, mut tasks) = setup();
        assert!(revealer.evaluate(&mut page, &mut tasks, 0.0).unwrap().is_empty());

        page.set_scroll(500.0);
        let revealed = revealer.evaluate(&mut page, &mut tasks, 100.0).unwrap();
        let style = page.by_id("style").unwrap();
        assert_eq!(revealed, vec![style]);
        assert!(page.has_class(style, "visible"));
        assert_eq!(tasks.len(), 2);

        // Staggered by 200ms per card
        let dues: Vec<Millis> = tasks.pending().map(|(_, due, _)| due).collect();
        assert_eq!(dues, vec![100.0, 300.0]);

        assert!(revealer.evaluate(&mut page, &mut tasks, 200.0).unwrap().is_empty());
        assert!(!revealer.reveal(&mut page, &mut tasks, 200.0, style).unwrap());
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn test_rise_primes_immediately() {
        let (mut revealer, mut page, mut tasks) = setup();
        let style = page.by_id("style").unwrap();
        revealer.reveal(&mut page, &mut tasks, 0.0, style).unwrap();

        let card = page.query(&Selector::parse(".style-card").unwrap(), None).unwrap();
        assert_eq!(page.style(card, "opacity").as_deref(), Some("0"));
        assert_eq!(page.style(card, "transform").as_deref(), Some("translateY(50px)"));
    }

    #[test]
    fn test_contact_sequence_starts_counter() {
        let (mut revealer, mut page, mut tasks) = setup();
        let contact = page.by_id("contact").unwrap();
        revealer.reveal(&mut page, &mut tasks, 0.0, contact).unwrap();

        let jobs: Vec<(Millis, &str)> = tasks.pending().map(|(_, due, job)| (due, job.kind())).collect();
        assert_eq!(jobs, vec![(200.0, "styles"), (500.0, "start_counter")]);
    }

    #[test]
    fn test_section_without_sequence() {
        let mut page = VirtualPage::from_toml_str(
            r#"
[[element]]
tag = "section"
id = "faq"
class = "section"
height = 400
"#,
        )
        .unwrap();
        let mut revealer = Revealer::new(&RevealConfig::default()).unwrap();
        revealer.mount(&page);
        let mut tasks = TaskQueue::new();

        let revealed = revealer.evaluate(&mut page, &mut tasks, 0.0).unwrap();
        assert_eq!(revealed.len(), 1);
        assert!(tasks.is_empty());
        assert_eq!(revealer.state(revealed[0]), RevealState::Revealed);
    }
}
