use std::path::Path;

use anyhow::Result;

use glint_core::page::{Page, Selector, VirtualPage};
use glint_core::{Choreographer, GlintConfig};

use super::load_page;

/// One feature and what it found on the page
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureReport {
    pub feature: &'static str,
    pub active: bool,
    pub detail: String,
}

impl FeatureReport {
    fn new(feature: &'static str, active: bool, detail: impl Into<String>) -> Self {
        Self {
            feature,
            active,
            detail: detail.into(),
        }
    }
}

fn count(page: &VirtualPage, selector: &str) -> usize {
    Selector::parse(selector)
        .map(|s| page.query_all(&s, None).len())
        .unwrap_or(0)
}

/// Mount an engine on `page` and report which features found their elements
pub fn inspect(config: GlintConfig, mut page: VirtualPage) -> Result<Vec<FeatureReport>> {
    let mut engine = Choreographer::new(config.clone())?;
    engine.mount(&mut page, 0.0);

    let mut reports = Vec::new();

    let navbar = engine.scroll_state().navbar();
    let hero = count(&page, &config.navbar.hero_selector);
    reports.push(FeatureReport::new(
        "navbar",
        navbar.is_some(),
        match (navbar, hero) {
            (Some(_), 0) => "no hero, scrolled class never set".to_string(),
            (Some(_), _) => format!("#{} with hero {}", config.navbar.navbar_id, config.navbar.hero_selector),
            (None, _) => format!("no #{}", config.navbar.navbar_id),
        },
    ));

    let layers = engine.parallax().counts();
    let layer_total: usize = layers.iter().sum();
    reports.push(FeatureReport::new(
        "parallax",
        layer_total > 0,
        format!("layers {:?}", layers),
    ));

    let sections = engine.revealer().sections().len();
    let sequenced = config
        .reveal
        .sequences
        .iter()
        .filter(|s| page.by_id(&s.section).is_some())
        .count();
    reports.push(FeatureReport::new(
        "reveal",
        sections > 0,
        format!("{} sections, {} with sequences", sections, sequenced),
    ));

    let hero_counters = count(&page, &config.counter.hero_selector);
    reports.push(FeatureReport::new(
        "counters",
        hero_counters > 0,
        format!("{} hero counters", hero_counters),
    ));

    let links = engine.links().links(&page).len();
    reports.push(FeatureReport::new("smooth_links", links > 0, format!("{} links", links)));

    reports.push(FeatureReport::new(
        "menu",
        engine.menu().is_active(),
        format!("#{} / #{}", config.menu.toggle_id, config.menu.menu_id),
    ));

    let tilt = engine.tilt().cards().len();
    reports.push(FeatureReport::new("tilt", tilt > 0, format!("{} cards", tilt)));

    let gallery = engine.gallery().cards().len();
    reports.push(FeatureReport::new("gallery", gallery > 0, format!("{} cards", gallery)));

    let intro = config
        .intro
        .selectors
        .iter()
        .filter(|s| count(&page, s) > 0)
        .count();
    reports.push(FeatureReport::new(
        "intro",
        intro > 0,
        format!("{}/{} elements", intro, config.intro.selectors.len()),
    ));

    let images = count(&page, &config.lazy_images.selector);
    reports.push(FeatureReport::new("lazy_images", images > 0, format!("{} images", images)));

    let logo = engine.easter_eggs().logo();
    reports.push(FeatureReport::new(
        "easter_eggs",
        config.easter_eggs.enabled,
        if logo.is_some() { "logo found" } else { "key sequence only" },
    ));

    reports.push(FeatureReport::new(
        "accessibility",
        engine.accessibility().skip_link().is_some(),
        format!("skip link to {}", config.accessibility.skip_target),
    ));

    let shapes = count(&page, &config.parallax.shapes.selector);
    reports.push(FeatureReport::new("ambient", shapes > 0, format!("{} shapes", shapes)));

    Ok(reports)
}

pub async fn run(config: GlintConfig, page: Option<&Path>) -> Result<()> {
    let page = load_page(page)?;
    let reports = inspect(config, page)?;

    let active = reports.iter().filter(|r| r.active).count();
    println!("Features ({}/{} active):\n", active, reports.len());
    for report in &reports {
        let marker = if report.active { "+" } else { "-" };
        println!("  {} {:<14} {}", marker, report.feature, report.detail);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(reports: &'a [FeatureReport], feature: &str) -> &'a FeatureReport {
        reports.iter().find(|r| r.feature == feature).unwrap()
    }

    #[test]
    fn test_sample_page_activates_everything() {
        let reports = inspect(GlintConfig::default(), VirtualPage::sample().unwrap()).unwrap();
        assert!(reports.iter().all(|r| r.active), "{:?}", reports);
        assert_eq!(find(&reports, "reveal").detail, "3 sections, 3 with sequences");
        assert_eq!(find(&reports, "counters").detail, "3 hero counters");
    }

    #[test]
    fn test_empty_page_is_mostly_inactive() {
        let page = VirtualPage::from_toml_str("").unwrap();
        let reports = inspect(GlintConfig::default(), page).unwrap();
        assert!(!find(&reports, "navbar").active);
        assert!(!find(&reports, "menu").active);
        assert!(!find(&reports, "tilt").active);
        // The skip link is inserted regardless
        assert!(find(&reports, "accessibility").active);
    }
}
