//! Pause decorative shape animation while the page is hidden

use crate::page::{style, Page, Selector};
use crate::Result;

use super::compile;

#[derive(Debug, Clone)]
pub struct Ambient {
    selector: Selector,
    hidden: bool,
}

impl Ambient {
    pub fn new(shape_selector: &str) -> Result<Self> {
        Ok(Self {
            selector: compile("parallax.shapes.selector", shape_selector)?,
            hidden: false,
        })
    }

    /// Returns how many shapes were updated
    pub fn visibility(&mut self, page: &mut dyn Page, hidden: bool) -> Result<usize> {
        self.hidden = hidden;
        let state = if hidden { "paused" } else { "running" };
        let shapes = page.query_all(&self.selector, None);
        for &shape in &shapes {
            page.set_style(shape, style::ANIMATION_PLAY_STATE, state)?;
        }
        Ok(shapes.len())
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::VirtualPage;

    #[test]
    fn test_pause_and_resume() {
        let mut page = VirtualPage::from_toml_str(
            r#"
[[element]]
class = "shape"

[[element]]
class = "shape"
"#,
        )
        .unwrap();
        let mut ambient = Ambient::new(".shape").unwrap();

        assert_eq!(ambient.visibility(&mut page, true).unwrap(), 2);
        let first = page.elements()[0];
        assert_eq!(page.style(first, "animation-play-state").as_deref(), Some("paused"));
        assert!(ambient.is_hidden());

        ambient.visibility(&mut page, false).unwrap();
        assert_eq!(page.style(first, "animation-play-state").as_deref(), Some("running"));
    }
}
