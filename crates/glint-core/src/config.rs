use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::motion::EasingType;
use crate::page::Selector;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlintConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub navbar: NavbarConfig,
    #[serde(default)]
    pub parallax: ParallaxConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub counter: CounterConfig,
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub tilt: TiltConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
    #[serde(default)]
    pub intro: IntroConfig,
    #[serde(default)]
    pub lazy_images: LazyImageConfig,
    #[serde(default)]
    pub easter_eggs: EasterEggConfig,
    #[serde(default)]
    pub accessibility: AccessibilityConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (preview logs)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Smooth in-page link scrolling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Animate link jumps (false = jump instantly)
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    /// Animation duration in milliseconds
    #[serde(default = "default_scroll_duration")]
    pub duration_ms: f64,
    /// Space left above the target section
    #[serde(default = "default_scroll_offset")]
    pub offset_px: f64,
    #[serde(default)]
    pub easing: EasingType,
    /// Elements whose `#fragment` links scroll smoothly
    #[serde(default = "default_scroll_links")]
    pub link_selector: String,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth_enabled: default_true(),
            duration_ms: default_scroll_duration(),
            offset_px: default_scroll_offset(),
            easing: EasingType::default(),
            link_selector: default_scroll_links(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavbarConfig {
    #[serde(default = "default_navbar_id")]
    pub navbar_id: String,
    #[serde(default = "default_hero_selector")]
    pub hero_selector: String,
    #[serde(default = "default_scrolled_class")]
    pub scrolled_class: String,
    /// Fraction of the hero height after which the navbar is "scrolled"
    #[serde(default = "default_scrolled_ratio")]
    pub scrolled_ratio: f64,
    /// Scrolling down past this offset hides the navbar
    #[serde(default = "default_hide_after")]
    pub hide_after_px: f64,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        Self {
            navbar_id: default_navbar_id(),
            hero_selector: default_hero_selector(),
            scrolled_class: default_scrolled_class(),
            scrolled_ratio: default_scrolled_ratio(),
            hide_after_px: default_hide_after(),
        }
    }
}

/// One parallax collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallaxLayer {
    pub selector: String,
    /// Speed of the first element
    pub base_speed: f64,
    /// Added per element index
    pub speed_step: f64,
    /// Degrees per scrolled pixel, scaled by `index + 1` (0 = no rotation)
    #[serde(default)]
    pub rotation_factor: f64,
    /// Skip elements outside the viewport
    #[serde(default)]
    pub cull: bool,
    /// Keep an existing `rotate(...)` from the element's transform
    #[serde(default)]
    pub preserve_rotation: bool,
}

impl ParallaxLayer {
    /// Speed coefficient for the element at `index`
    pub fn speed(&self, index: usize) -> f64 {
        self.base_speed + index as f64 * self.speed_step
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallaxConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_shapes_layer")]
    pub shapes: ParallaxLayer,
    #[serde(default = "default_images_layer")]
    pub images: ParallaxLayer,
    #[serde(default = "default_floating_layer")]
    pub floating: ParallaxLayer,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            shapes: default_shapes_layer(),
            images: default_images_layer(),
            floating: default_floating_layer(),
        }
    }
}

impl ParallaxConfig {
    pub fn layers(&self) -> [&ParallaxLayer; 3] {
        [&self.shapes, &self.images, &self.floating]
    }
}

/// What a reveal step does to each matched element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealAction {
    /// Hide and push down immediately, then transition up into place
    Rise,
    /// Fade in and slide horizontally into place
    Slide,
    /// Fade in and settle vertically into place
    Settle,
    /// Start a number counter
    Count,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealStep {
    /// Elements inside the section this step targets
    pub selector: String,
    /// Delay before the first element
    #[serde(default)]
    pub delay_ms: f64,
    /// Added per element index
    #[serde(default)]
    pub stagger_ms: f64,
    pub action: RevealAction,
}

/// Staggered sequence for the section with the given id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealSequence {
    pub section: String,
    #[serde(default)]
    pub steps: Vec<RevealStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    #[serde(default = "default_section_selector")]
    pub section_selector: String,
    /// Visible fraction that triggers a reveal
    #[serde(default = "default_reveal_threshold")]
    pub threshold: f64,
    /// Bottom strip of the viewport that does not count as visible
    #[serde(default = "default_reveal_margin")]
    pub bottom_margin_px: f64,
    #[serde(default = "default_visible_class")]
    pub visible_class: String,
    #[serde(default = "default_sequences")]
    pub sequences: Vec<RevealSequence>,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            section_selector: default_section_selector(),
            threshold: default_reveal_threshold(),
            bottom_margin_px: default_reveal_margin(),
            visible_class: default_visible_class(),
            sequences: default_sequences(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterConfig {
    #[serde(default = "default_counter_duration")]
    pub duration_ms: f64,
    #[serde(default = "default_counter_steps")]
    pub steps: u32,
    /// Counters started automatically after mount
    #[serde(default = "default_hero_counters")]
    pub hero_selector: String,
    #[serde(default = "default_hero_delay")]
    pub hero_delay_ms: f64,
    #[serde(default = "default_hero_stagger")]
    pub hero_stagger_ms: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_counter_duration(),
            steps: default_counter_steps(),
            hero_selector: default_hero_counters(),
            hero_delay_ms: default_hero_delay(),
            hero_stagger_ms: default_hero_stagger(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    #[serde(default = "default_toggle_id")]
    pub toggle_id: String,
    #[serde(default = "default_menu_id")]
    pub menu_id: String,
    /// Links inside the menu; clicking one closes it
    #[serde(default = "default_menu_links")]
    pub link_selector: String,
    #[serde(default = "default_active_class")]
    pub active_class: String,
    #[serde(default = "default_menu_item_delay")]
    pub item_delay_ms: f64,
    #[serde(default = "default_menu_item_stagger")]
    pub item_stagger_ms: f64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            toggle_id: default_toggle_id(),
            menu_id: default_menu_id(),
            link_selector: default_menu_links(),
            active_class: default_active_class(),
            item_delay_ms: default_menu_item_delay(),
            item_stagger_ms: default_menu_item_stagger(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiltConfig {
    #[serde(default = "default_tilt_selector")]
    pub selector: String,
    /// Rotation at the card edge, degrees
    #[serde(default = "default_tilt_angle")]
    pub max_angle_deg: f64,
    #[serde(default = "default_tilt_scale")]
    pub scale: f64,
    #[serde(default = "default_tilt_perspective")]
    pub perspective_px: f64,
    #[serde(default = "default_tilt_lift")]
    pub lift_px: f64,
    /// Quiet period after the last resize before cards are re-registered
    #[serde(default = "default_resize_debounce")]
    pub resize_debounce_ms: f64,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            selector: default_tilt_selector(),
            max_angle_deg: default_tilt_angle(),
            scale: default_tilt_scale(),
            perspective_px: default_tilt_perspective(),
            lift_px: default_tilt_lift(),
            resize_debounce_ms: default_resize_debounce(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    #[serde(default = "default_gallery_selector")]
    pub selector: String,
    #[serde(default = "default_gallery_delay")]
    pub entrance_delay_ms: f64,
    #[serde(default = "default_gallery_stagger")]
    pub entrance_stagger_ms: f64,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            selector: default_gallery_selector(),
            entrance_delay_ms: default_gallery_delay(),
            entrance_stagger_ms: default_gallery_stagger(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntroConfig {
    /// Hero elements that fade in one after another
    #[serde(default = "default_intro_selectors")]
    pub selectors: Vec<String>,
    #[serde(default = "default_intro_delay")]
    pub delay_ms: f64,
    #[serde(default = "default_intro_stagger")]
    pub stagger_ms: f64,
    /// Delay between the load event and the body "loaded" class
    #[serde(default = "default_loaded_delay")]
    pub loaded_delay_ms: f64,
    /// Load durations above this are logged as slow
    #[serde(default = "default_slow_load")]
    pub slow_load_ms: f64,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            selectors: default_intro_selectors(),
            delay_ms: default_intro_delay(),
            stagger_ms: default_intro_stagger(),
            loaded_delay_ms: default_loaded_delay(),
            slow_load_ms: default_slow_load(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LazyImageConfig {
    #[serde(default = "default_lazy_selector")]
    pub selector: String,
    /// Images preloaded with `<link rel="preload">` at mount
    #[serde(default = "default_critical_images")]
    pub critical: Vec<String>,
}

impl Default for LazyImageConfig {
    fn default() -> Self {
        Self {
            selector: default_lazy_selector(),
            critical: default_critical_images(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EasterEggConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_logo_selector")]
    pub logo_selector: String,
    /// Click count that fires the confetti
    #[serde(default = "default_logo_clicks")]
    pub logo_clicks: u32,
    #[serde(default = "default_click_reset")]
    pub click_reset_ms: f64,
    #[serde(default = "default_confetti_count")]
    pub confetti_count: u32,
    #[serde(default = "default_confetti_lifetime")]
    pub confetti_lifetime_ms: f64,
    #[serde(default = "default_confetti_colors")]
    pub confetti_colors: Vec<String>,
    /// How long the key-sequence filter stays on
    #[serde(default = "default_key_sequence_filter")]
    pub key_sequence_filter_ms: f64,
}

impl Default for EasterEggConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            logo_selector: default_logo_selector(),
            logo_clicks: default_logo_clicks(),
            click_reset_ms: default_click_reset(),
            confetti_count: default_confetti_count(),
            confetti_lifetime_ms: default_confetti_lifetime(),
            confetti_colors: default_confetti_colors(),
            key_sequence_filter_ms: default_key_sequence_filter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessibilityConfig {
    #[serde(default = "default_true")]
    pub skip_link: bool,
    #[serde(default = "default_skip_target")]
    pub skip_target: String,
    #[serde(default = "default_skip_text")]
    pub skip_text: String,
    /// `box-shadow` applied to focused elements
    #[serde(default = "default_focus_ring")]
    pub focus_ring: String,
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            skip_link: default_true(),
            skip_target: default_skip_target(),
            skip_text: default_skip_text(),
            focus_ring: default_focus_ring(),
        }
    }
}

/// Terminal preview settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Page pixels per terminal row
    #[serde(default = "default_px_per_row")]
    pub px_per_row: f64,
    /// Frame interval
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    /// Pixels scrolled per j/k press
    #[serde(default = "default_scroll_step")]
    pub scroll_step_px: f64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            px_per_row: default_px_per_row(),
            frame_ms: default_frame_ms(),
            scroll_step_px: default_scroll_step(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("glint")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_scroll_duration() -> f64 {
    1000.0
}

fn default_scroll_offset() -> f64 {
    100.0
}

fn default_scroll_links() -> String {
    ".nav-link, .cta-primary, .cta-secondary".to_string()
}

fn default_navbar_id() -> String {
    "navbar".to_string()
}

fn default_hero_selector() -> String {
    ".hero".to_string()
}

fn default_scrolled_class() -> String {
    "scrolled".to_string()
}

fn default_scrolled_ratio() -> f64 {
    0.3
}

fn default_hide_after() -> f64 {
    200.0
}

fn default_shapes_layer() -> ParallaxLayer {
    ParallaxLayer {
        selector: ".shape".to_string(),
        base_speed: 0.1,
        speed_step: 0.05,
        rotation_factor: 0.01,
        cull: false,
        preserve_rotation: false,
    }
}

fn default_images_layer() -> ParallaxLayer {
    ParallaxLayer {
        selector: ".image-card".to_string(),
        base_speed: 0.05,
        speed_step: 0.02,
        rotation_factor: 0.0,
        cull: true,
        preserve_rotation: true,
    }
}

fn default_floating_layer() -> ParallaxLayer {
    ParallaxLayer {
        selector: ".floating-card".to_string(),
        base_speed: 0.08,
        speed_step: 0.03,
        rotation_factor: 0.0,
        cull: true,
        preserve_rotation: false,
    }
}

fn default_section_selector() -> String {
    ".section".to_string()
}

fn default_reveal_threshold() -> f64 {
    0.1
}

fn default_reveal_margin() -> f64 {
    100.0
}

fn default_visible_class() -> String {
    "visible".to_string()
}

fn step(selector: &str, delay_ms: f64, stagger_ms: f64, action: RevealAction) -> RevealStep {
    RevealStep {
        selector: selector.to_string(),
        delay_ms,
        stagger_ms,
        action,
    }
}

fn default_sequences() -> Vec<RevealSequence> {
    vec![
        RevealSequence {
            section: "style".to_string(),
            steps: vec![step(".style-card", 0.0, 200.0, RevealAction::Rise)],
        },
        RevealSequence {
            section: "about".to_string(),
            steps: vec![
                step(".about-text .glass-card", 200.0, 0.0, RevealAction::Slide),
                step(".visual-card", 400.0, 0.0, RevealAction::Slide),
                step(".feature", 600.0, 100.0, RevealAction::Slide),
            ],
        },
        RevealSequence {
            section: "contact".to_string(),
            steps: vec![
                step(".contact-main", 200.0, 0.0, RevealAction::Settle),
                step(".contact-stat .stat-number", 500.0, 100.0, RevealAction::Count),
            ],
        },
    ]
}

fn default_counter_duration() -> f64 {
    2000.0
}

fn default_counter_steps() -> u32 {
    60
}

fn default_hero_counters() -> String {
    ".hero-stats .stat-number".to_string()
}

fn default_hero_delay() -> f64 {
    1500.0
}

fn default_hero_stagger() -> f64 {
    200.0
}

fn default_toggle_id() -> String {
    "mobile-toggle".to_string()
}

fn default_menu_id() -> String {
    "nav-menu".to_string()
}

fn default_menu_links() -> String {
    ".nav-link".to_string()
}

fn default_active_class() -> String {
    "active".to_string()
}

fn default_menu_item_delay() -> f64 {
    200.0
}

fn default_menu_item_stagger() -> f64 {
    100.0
}

fn default_tilt_selector() -> String {
    "[data-tilt]".to_string()
}

fn default_tilt_angle() -> f64 {
    15.0
}

fn default_tilt_scale() -> f64 {
    1.05
}

fn default_tilt_perspective() -> f64 {
    1000.0
}

fn default_tilt_lift() -> f64 {
    20.0
}

fn default_resize_debounce() -> f64 {
    250.0
}

fn default_gallery_selector() -> String {
    ".image-card".to_string()
}

fn default_gallery_delay() -> f64 {
    1000.0
}

fn default_gallery_stagger() -> f64 {
    200.0
}

fn default_intro_selectors() -> Vec<String> {
    [
        ".hero-badge",
        ".hero-title",
        ".hero-description",
        ".hero-stats",
        ".hero-actions",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_intro_delay() -> f64 {
    500.0
}

fn default_intro_stagger() -> f64 {
    200.0
}

fn default_loaded_delay() -> f64 {
    500.0
}

fn default_slow_load() -> f64 {
    3000.0
}

fn default_lazy_selector() -> String {
    r#"img[src*="unsplash"]"#.to_string()
}

fn default_critical_images() -> Vec<String> {
    vec![
        "https://images.unsplash.com/photo-1434389677669-e08b4cac3105?w=400&h=600&fit=crop&crop=face".to_string(),
        "https://images.unsplash.com/photo-1583391733956-6c78276477e2?w=300&h=400&fit=crop&crop=face".to_string(),
    ]
}

fn default_logo_selector() -> String {
    ".hero .logo, .nav-logo".to_string()
}

fn default_logo_clicks() -> u32 {
    5
}

fn default_click_reset() -> f64 {
    3000.0
}

fn default_confetti_count() -> u32 {
    50
}

fn default_confetti_lifetime() -> f64 {
    3000.0
}

fn default_confetti_colors() -> Vec<String> {
    ["#FF7A3D", "#F4B942", "#2D5A3D", "#FFFFFF"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_key_sequence_filter() -> f64 {
    5000.0
}

fn default_skip_target() -> String {
    "#about".to_string()
}

fn default_skip_text() -> String {
    "Skip to main content".to_string()
}

fn default_focus_ring() -> String {
    "0 0 0 3px rgba(255, 122, 61, 0.5)".to_string()
}

fn default_px_per_row() -> f64 {
    20.0
}

fn default_frame_ms() -> u64 {
    16
}

fn default_scroll_step() -> f64 {
    40.0
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl GlintConfig {
    /// Load configuration from the default path or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml_string()?)?;

        Ok(())
    }

    pub fn to_toml_string(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/glint/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("glint")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Every selector string in the configuration, labelled by field
    pub fn selectors(&self) -> Vec<(String, &str)> {
        let mut out: Vec<(String, &str)> = vec![
            ("scroll.link_selector".into(), self.scroll.link_selector.as_str()),
            ("navbar.hero_selector".into(), self.navbar.hero_selector.as_str()),
            ("parallax.shapes.selector".into(), self.parallax.shapes.selector.as_str()),
            ("parallax.images.selector".into(), self.parallax.images.selector.as_str()),
            ("parallax.floating.selector".into(), self.parallax.floating.selector.as_str()),
            ("reveal.section_selector".into(), self.reveal.section_selector.as_str()),
            ("counter.hero_selector".into(), self.counter.hero_selector.as_str()),
            ("menu.link_selector".into(), self.menu.link_selector.as_str()),
            ("tilt.selector".into(), self.tilt.selector.as_str()),
            ("gallery.selector".into(), self.gallery.selector.as_str()),
            ("lazy_images.selector".into(), self.lazy_images.selector.as_str()),
            ("easter_eggs.logo_selector".into(), self.easter_eggs.logo_selector.as_str()),
        ];
        for (i, selector) in self.intro.selectors.iter().enumerate() {
            out.push((format!("intro.selectors[{}]", i), selector.as_str()));
        }
        for sequence in &self.reveal.sequences {
            for (i, step) in sequence.steps.iter().enumerate() {
                out.push((
                    format!("reveal.sequences[{}].steps[{}]", sequence.section, i),
                    step.selector.as_str(),
                ));
            }
        }
        out
    }

    /// Check selectors and numeric ranges
    pub fn validate(&self) -> crate::Result<()> {
        for (field, selector) in self.selectors() {
            Selector::parse(selector)
                .map_err(|e| crate::Error::Config(format!("{}: {}", field, e)))?;
        }

        if self.counter.steps == 0 {
            return Err(crate::Error::Config("counter.steps must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.reveal.threshold) {
            return Err(crate::Error::Config(
                "reveal.threshold must be between 0 and 1".into(),
            ));
        }
        if self.scroll.duration_ms < 0.0 || self.counter.duration_ms < 0.0 {
            return Err(crate::Error::Config("durations must not be negative".into()));
        }
        if self.preview.px_per_row <= 0.0 {
            return Err(crate::Error::Config("preview.px_per_row must be positive".into()));
        }
        if self.easter_eggs.confetti_colors.is_empty() {
            return Err(crate::Error::Config(
                "easter_eggs.confetti_colors must not be empty".into(),
            ));
        }
        Ok(())
    }
}
