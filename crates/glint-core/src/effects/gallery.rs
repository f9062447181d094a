//! Image card entrance and hover lift

use crate::config::GalleryConfig;
use crate::motion::Millis;
use crate::page::{style, ElementId, Page, Selector};
use crate::schedule::TaskQueue;
use crate::Result;

use super::{compile, owning, Job, SETTLE_CURVE};

/// Even cards lean left, odd cards lean right
fn lean(index: usize) -> &'static str {
    if index % 2 == 0 {
        "-"
    } else {
        ""
    }
}

#[derive(Debug, Clone)]
pub struct Gallery {
    config: GalleryConfig,
    selector: Selector,
    cards: Vec<ElementId>,
}

impl Gallery {
    pub fn new(config: &GalleryConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            selector: compile("gallery.selector", &config.selector)?,
            cards: Vec::new(),
        })
    }

    /// Hide every card and schedule its staggered entrance
    pub fn mount(&mut self, page: &mut dyn Page, tasks: &mut TaskQueue<Job>, now: Millis) -> Result<()> {
        self.cards = page.query_all(&self.selector, None);
        let transition = format!("all 1s {}", SETTLE_CURVE);

        for (index, card) in self.cards.iter().copied().enumerate() {
            page.set_style(card, style::OPACITY, "0")?;
            let start = format!("translateY(50px) rotate({}5deg)", lean(index));
            page.set_style(card, style::TRANSFORM, &start)?;

            let end = format!("translateY(0) rotate({}2deg)", lean(index));
            let delay = self.config.entrance_delay_ms + index as f64 * self.config.entrance_stagger_ms;
            let job = Job::styles(
                card,
                &[
                    (style::TRANSITION, transition.as_str()),
                    (style::OPACITY, "1"),
                    (style::TRANSFORM, end.as_str()),
                ],
            );
            tasks.schedule(now, delay, job);
        }
        Ok(())
    }

    pub fn enter(&mut self, page: &mut dyn Page, target: ElementId) -> Result<bool> {
        let Some((_, card)) = owning(page, &self.cards, target) else {
            return Ok(false);
        };
        page.set_style(card, style::Z_INDEX, "10")?;
        page.set_style(card, style::TRANSFORM, "translateY(-10px) rotate(0deg) scale(1.05)")?;
        Ok(true)
    }

    pub fn leave(&mut self, page: &mut dyn Page, target: ElementId) -> Result<bool> {
        let Some((index, card)) = owning(page, &self.cards, target) else {
            return Ok(false);
        };
        page.set_style(card, style::Z_INDEX, &(index + 1).to_string())?;
        let transform = format!("translateY(0) rotate({}2deg) scale(1)", lean(index));
        page.set_style(card, style::TRANSFORM, &transform)?;
        Ok(true)
    }

    pub fn cards(&self) -> &[ElementId] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::VirtualPage;

    const PAGE: &str = r#"
[[element]]
class = "image-card"
height = 300

[[element]]
class = "image-card"
top = 300
height = 300
"#;

    #[test]
    fn test_entrance_alternates_lean() {
        let mut page = VirtualPage::from_toml_str(PAGE).unwrap();
        let mut gallery = Gallery::new(&GalleryConfig::default()).unwrap();
        let mut tasks = TaskQueue::new();
        gallery.mount(&mut page, &mut tasks, 0.0).unwrap();

        let cards = gallery.cards().to_vec();
        assert_eq!(page.style(cards[0], "transform").as_deref(), Some("translateY(50px) rotate(-5deg)"));
        assert_eq!(page.style(cards[1], "transform").as_deref(), Some("translateY(50px) rotate(5deg)"));
        assert_eq!(page.style(cards[0], "opacity").as_deref(), Some("0"));

        let first = tasks.pop_next().unwrap();
        assert_eq!(first.due, 1000.0);
        match first.job {
            Job::Styles { element, styles } => {
                assert_eq!(element, cards[0]);
                assert_eq!(styles[2].1, "translateY(0) rotate(-2deg)");
            }
            other => panic!("unexpected job {:?}", other),
        }
        assert_eq!(tasks.pop_next().unwrap().due, 1200.0);
    }

    #[test]
    fn test_hover_lift_and_restore() {
        let mut page = VirtualPage::from_toml_str(PAGE).unwrap();
        let mut gallery = Gallery::new(&GalleryConfig::default()).unwrap();
        let mut tasks = TaskQueue::new();
        gallery.mount(&mut page, &mut tasks, 0.0).unwrap();
        let card = gallery.cards()[1];

        gallery.enter(&mut page, card).unwrap();
        assert_eq!(page.style(card, "z-index").as_deref(), Some("10"));

        gallery.leave(&mut page, card).unwrap();
        assert_eq!(page.style(card, "z-index").as_deref(), Some("2"));
        assert_eq!(page.style(card, "transform").as_deref(), Some("translateY(0) rotate(2deg) scale(1)"));
    }
}
