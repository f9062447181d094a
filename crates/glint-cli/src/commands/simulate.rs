use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use glint_core::page::Mutation;
use glint_core::{
    Choreographer, ElementId, EngineStats, GlintConfig, InputEvent, Key, Millis, Page, Selector, VirtualPage,
};

use super::load_page;

fn default_end_ms() -> Millis {
    5000.0
}

fn default_frame_ms() -> Millis {
    16.0
}

/// A scripted run: a page, a clock and timed input events
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Page description, relative to the scenario file; the built-in sample
    /// page when absent
    #[serde(default)]
    pub page: Option<PathBuf>,
    #[serde(default = "default_end_ms")]
    pub end_ms: Millis,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: Millis,
    /// Seed for the confetti layout
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioEvent {
    pub at_ms: Millis,
    #[serde(flatten)]
    pub action: ScenarioAction,
}

/// Input events with selectors in place of element ids
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioAction {
    /// Set the scroll offset, then report a scroll
    Scroll { to: f64 },
    Click { target: String },
    MouseEnter { target: String },
    MouseMove { target: String, x: f64, y: f64 },
    MouseLeave { target: String },
    TouchStart { target: String },
    TouchEnd { target: String },
    KeyDown { key: Key },
    Resize {
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
    },
    VisibilityChange { hidden: bool },
    Load {
        #[serde(default)]
        load_ms: Option<Millis>,
    },
    Focus { target: String },
    Blur { target: String },
    ImageLoaded { target: String },
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(content)?;
        if scenario.frame_ms <= 0.0 {
            bail!("frame_ms must be positive");
        }
        Ok(scenario)
    }
}

/// One observed page mutation
#[derive(Debug, Clone, Serialize)]
pub struct TraceEntry {
    pub at_ms: Millis,
    pub description: String,
    #[serde(flatten)]
    pub mutation: Mutation,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    pub stats: EngineStats,
    pub final_scroll_y: f64,
    pub entries: Vec<TraceEntry>,
}

fn resolve(page: &VirtualPage, selector: &str) -> Result<ElementId> {
    let parsed = Selector::parse(selector)?;
    page.query(&parsed, None)
        .ok_or_else(|| anyhow!("No element matches '{}'", selector))
}

/// Turn a scripted action into an engine event, applying any page-side
/// change (scroll offset, viewport size) first
fn to_event(page: &mut VirtualPage, action: &ScenarioAction) -> Result<InputEvent> {
    let event = match action {
        ScenarioAction::Scroll { to } => {
            page.set_scroll(*to);
            InputEvent::Scroll
        }
        ScenarioAction::Click { target } => InputEvent::Click {
            target: resolve(page, target)?,
        },
        ScenarioAction::MouseEnter { target } => InputEvent::MouseEnter {
            target: resolve(page, target)?,
        },
        ScenarioAction::MouseMove { target, x, y } => InputEvent::MouseMove {
            target: resolve(page, target)?,
            x: *x,
            y: *y,
        },
        ScenarioAction::MouseLeave { target } => InputEvent::MouseLeave {
            target: resolve(page, target)?,
        },
        ScenarioAction::TouchStart { target } => InputEvent::TouchStart {
            target: resolve(page, target)?,
        },
        ScenarioAction::TouchEnd { target } => InputEvent::TouchEnd {
            target: resolve(page, target)?,
        },
        ScenarioAction::KeyDown { key } => InputEvent::KeyDown { key: key.clone() },
        ScenarioAction::Resize { width, height } => {
            let width = width.unwrap_or_else(|| page.viewport_width());
            let height = height.unwrap_or_else(|| page.viewport_height());
            page.set_viewport(width, height);
            InputEvent::Resize
        }
        ScenarioAction::VisibilityChange { hidden } => InputEvent::VisibilityChange { hidden: *hidden },
        ScenarioAction::Load { load_ms } => InputEvent::Load { load_ms: *load_ms },
        ScenarioAction::Focus { target } => InputEvent::Focus {
            target: resolve(page, target)?,
        },
        ScenarioAction::Blur { target } => InputEvent::Blur {
            target: resolve(page, target)?,
        },
        ScenarioAction::ImageLoaded { target } => InputEvent::ImageLoaded {
            target: resolve(page, target)?,
        },
    };
    Ok(event)
}

fn collect(page: &mut VirtualPage, at_ms: Millis, entries: &mut Vec<TraceEntry>) {
    for mutation in page.take_mutations() {
        entries.push(TraceEntry {
            at_ms,
            description: page.describe(&mutation),
            mutation,
        });
    }
}

/// Drive the engine through `scenario` on a fixed frame clock
pub fn simulate(config: GlintConfig, mut page: VirtualPage, scenario: &Scenario) -> Result<Trace> {
    let mut engine = match scenario.seed {
        Some(seed) => Choreographer::with_seed(config, seed)?,
        None => Choreographer::new(config)?,
    };

    let mut events = scenario.events.clone();
    events.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));

    let mut entries = Vec::new();
    engine.mount(&mut page, 0.0);
    collect(&mut page, 0.0, &mut entries);

    let mut pending = events.iter().peekable();
    let mut now = 0.0;
    loop {
        while let Some(scripted) = pending.next_if(|e| e.at_ms <= now) {
            let event = to_event(&mut page, &scripted.action)
                .with_context(|| format!("Event at {} ms", scripted.at_ms))?;
            debug!(at_ms = scripted.at_ms, event = event.name(), "Dispatching");
            engine.dispatch(&mut page, scripted.at_ms, &event);
            collect(&mut page, scripted.at_ms, &mut entries);
        }

        engine.tick(&mut page, now);
        collect(&mut page, now, &mut entries);

        if now >= scenario.end_ms {
            break;
        }
        now = (now + scenario.frame_ms).min(scenario.end_ms);
    }

    Ok(Trace {
        stats: engine.stats(),
        final_scroll_y: page.scroll_y(),
        entries,
    })
}

pub async fn run(config: GlintConfig, path: &Path, json: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read scenario {}", path.display()))?;
    let scenario = Scenario::from_toml_str(&content)?;

    let page_path = scenario.page.as_ref().map(|p| match path.parent() {
        Some(dir) if p.is_relative() => dir.join(p),
        _ => p.clone(),
    });
    let page = load_page(page_path.as_deref())?;

    info!(events = scenario.events.len(), end_ms = scenario.end_ms, "Simulating");
    let trace = simulate(config, page, &scenario)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&trace)?);
        return Ok(());
    }

    for entry in &trace.entries {
        println!("{:>9.1}  {}", entry.at_ms, entry.description);
    }
    let stats = trace.stats;
    println!();
    println!(
        "{} mutations, {} events ({} scroll), {} passes, {} jobs, {} handler faults, final scroll {}",
        trace.entries.len(),
        stats.events,
        stats.scroll_events,
        stats.passes,
        stats.jobs_run,
        stats.handler_faults,
        trace.final_scroll_y
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
end_ms = 2500
frame_ms = 16

[[events]]
at_ms = 100
type = "click"
target = ".cta-secondary"

[[events]]
at_ms = 50
type = "load"
load_ms = 400

[[events]]
at_ms = 2000
type = "key_down"
key = "Escape"
"#;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::from_toml_str(SCENARIO).unwrap();
        assert_eq!(scenario.events.len(), 3);
        assert!(scenario.page.is_none());
        assert!(matches!(scenario.events[0].action, ScenarioAction::Click { .. }));
        assert!(matches!(
            scenario.events[2].action,
            ScenarioAction::KeyDown { key: Key::Escape }
        ));
    }

    #[test]
    fn test_bad_frame_rejected() {
        assert!(Scenario::from_toml_str("frame_ms = 0").is_err());
    }

    #[test]
    fn test_simulated_link_click_reaches_contact() {
        let scenario = Scenario::from_toml_str(SCENARIO).unwrap();
        let page = VirtualPage::sample().unwrap();
        let trace = simulate(GlintConfig::default(), page, &scenario).unwrap();

        assert_eq!(trace.final_scroll_y, 2800.0);
        assert_eq!(trace.stats.events, 3);
        assert_eq!(trace.stats.handler_faults, 0);
        assert!(trace
            .entries
            .iter()
            .any(|e| e.description == "section#contact.section.visible +visible"));
        // Entries are in clock order
        assert!(trace.entries.windows(2).all(|w| w[0].at_ms <= w[1].at_ms));
    }

    #[test]
    fn test_unknown_target_is_error() {
        let scenario = Scenario::from_toml_str(
            r##"
[[events]]
at_ms = 0
type = "click"
target = "#missing"
"##,
        )
        .unwrap();
        let page = VirtualPage::sample().unwrap();
        assert!(simulate(GlintConfig::default(), page, &scenario).is_err());
    }

    #[test]
    fn test_trace_serializes() {
        let scenario = Scenario::from_toml_str("end_ms = 100").unwrap();
        let trace = simulate(GlintConfig::default(), VirtualPage::sample().unwrap(), &scenario).unwrap();
        let json = serde_json::to_value(&trace).unwrap();
        assert!(json["entries"].as_array().map(|a| !a.is_empty()).unwrap_or(false));
        assert!(json["entries"][0]["op"].is_string());
    }
}
