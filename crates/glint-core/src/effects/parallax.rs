//! Multi-layer parallax

use crate::config::{ParallaxConfig, ParallaxLayer};
use crate::page::{style, ElementId, Page, Selector};
use crate::Result;

use super::compile;

#[derive(Debug, Clone)]
struct Layer {
    config: ParallaxLayer,
    selector: Selector,
    elements: Vec<ElementId>,
}

#[derive(Debug, Clone)]
pub struct Parallax {
    enabled: bool,
    layers: Vec<Layer>,
}

impl Parallax {
    pub fn new(config: &ParallaxConfig) -> Result<Self> {
        let layers = config
            .layers()
            .into_iter()
            .map(|layer| {
                Ok(Layer {
                    selector: compile("parallax", &layer.selector)?,
                    config: layer.clone(),
                    elements: Vec::new(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            enabled: config.enabled,
            layers,
        })
    }

    pub fn mount(&mut self, page: &dyn Page) {
        for layer in &mut self.layers {
            layer.elements = page.query_all(&layer.selector, None);
        }
    }

    /// Write every layer's transforms for the current offset; returns how
    /// many elements were written
    pub fn pass(&mut self, page: &mut dyn Page) -> Result<usize> {
        if !self.enabled {
            return Ok(0);
        }

        let scrolled = page.scroll_y();
        let viewport_height = page.viewport_height();
        let mut written = 0;

        for layer in &self.layers {
            for (index, &el) in layer.elements.iter().enumerate() {
                if layer.config.cull {
                    match page.rect(el) {
                        Some(rect) if rect.intersects_viewport(viewport_height) => {}
                        _ => continue,
                    }
                }

                let transform = layer_transform(&layer.config, index, scrolled, page.style(el, style::TRANSFORM));
                page.set_style(el, style::TRANSFORM, &transform)?;
                written += 1;
            }
        }

        Ok(written)
    }

    /// Elements per layer: shapes, images, floating cards
    pub fn counts(&self) -> Vec<usize> {
        self.layers.iter().map(|l| l.elements.len()).collect()
    }
}

/// Transform for the element at `index` of a layer
pub fn layer_transform(layer: &ParallaxLayer, index: usize, scrolled: f64, current: Option<String>) -> String {
    let mut transform = style::translate_y(scrolled * layer.speed(index));

    if layer.rotation_factor != 0.0 {
        let rotation = scrolled * layer.rotation_factor * (index + 1) as f64;
        transform.push_str(&format!(" rotate({})", style::deg(rotation)));
    } else if layer.preserve_rotation {
        let current = current.unwrap_or_default();
        let rotate = style::rotate_component(&current).unwrap_or("rotate(0deg)");
        transform.push(' ');
        transform.push_str(rotate);
    }

    transform
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::VirtualPage;

    const PAGE: &str = r#"
viewport_height = 800

[[element]]
class = "shape"
top = 100
height = 100

[[element]]
class = "shape"
top = 300
height = 100

[[element]]
class = "image-card"
style = { transform = "translateY(0) rotate(-2deg)" }
top = 200
height = 300

[[element]]
class = "floating-card"
top = 3000
height = 100

[[element]]
top = 4000
height = 100
"#;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    #[test]
    fn test_shapes_translate_and_rotate() {
        let mut page = VirtualPage::from_toml_str(PAGE).unwrap();
        let mut parallax = Parallax::new(&ParallaxConfig::default()).unwrap();
        parallax.mount(&page);

        page.set_scroll(100.0);
        parallax.pass(&mut page).unwrap();

        let shapes = page.query_all(&sel(".shape"), None);
        assert_eq!(page.style(shapes[0], "transform").as_deref(), Some("translateY(10px) rotate(1deg)"));
        assert_eq!(page.style(shapes[1], "transform").as_deref(), Some("translateY(15px) rotate(2deg)"));
    }

    #[test]
    fn test_image_card_keeps_rotation() {
        let mut page = VirtualPage::from_toml_str(PAGE).unwrap();
        let mut parallax = Parallax::new(&ParallaxConfig::default()).unwrap();
        parallax.mount(&page);

        page.set_scroll(100.0);
        parallax.pass(&mut page).unwrap();

        let card = page.query(&sel(".image-card"), None).unwrap();
        assert_eq!(page.style(card, "transform").as_deref(), Some("translateY(5px) rotate(-2deg)"));
    }

    #[test]
    fn test_offscreen_cards_culled() {
        let mut page = VirtualPage::from_toml_str(PAGE).unwrap();
        let mut parallax = Parallax::new(&ParallaxConfig::default()).unwrap();
        parallax.mount(&page);

        page.set_scroll(100.0);
        let written = parallax.pass(&mut page).unwrap();

        // Two shapes and the image card; the floating card is below the fold
        assert_eq!(written, 3);
        let floating = page.query(&sel(".floating-card"), None).unwrap();
        assert_eq!(page.style(floating, "transform"), None);

        page.set_scroll(2600.0);
        parallax.pass(&mut page).unwrap();
        assert_eq!(page.style(floating, "transform").as_deref(), Some("translateY(208px)"));
    }

    #[test]
    fn test_missing_rotation_defaults_to_zero() {
        let layer = ParallaxConfig::default().images;
        assert_eq!(layer_transform(&layer, 1, 100.0, None), "translateY(7px) rotate(0deg)");
    }

    #[test]
    fn test_disabled_writes_nothing() {
        let mut page = VirtualPage::from_toml_str(PAGE).unwrap();
        let config = ParallaxConfig {
            enabled: false,
            ..Default::default()
        };
        let mut parallax = Parallax::new(&config).unwrap();
        parallax.mount(&page);
        assert_eq!(parallax.pass(&mut page).unwrap(), 0);
        assert!(page.mutations().is_empty());
    }
}
