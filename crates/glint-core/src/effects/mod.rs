//! Page features
//!
//! Each feature owns its own state and reacts to the calls the
//! [`Choreographer`](crate::Choreographer) routes to it. Deferred work is
//! scheduled as a [`Job`] on the shared task queue; features never hold
//! closures over the page.
//!
//! - `scroll_state` - navbar scrolled/hidden state, scroll samples
//! - `parallax` - per-layer translate/rotate on scroll
//! - `reveal` - one-shot staggered section reveals
//! - `counter` - number text counting up to its value
//! - `links` - smooth in-page link jumps
//! - `menu` - mobile menu open/close
//! - `tilt` - 3D card tilt on hover and touch
//! - `gallery` - image card entrance and hover lift
//! - `intro` - loading/loaded class stagger
//! - `lazy` - image fade-in once visible and loaded
//! - `easter` - logo confetti and key sequence filter
//! - `a11y` - skip link and focus ring
//! - `ambient` - pause decorative animation while hidden

pub mod a11y;
pub mod ambient;
pub mod counter;
pub mod easter;
pub mod gallery;
pub mod intro;
pub mod lazy;
pub mod links;
pub mod menu;
pub mod parallax;
pub mod reveal;
pub mod scroll_state;
pub mod tilt;

use serde::Serialize;

use crate::page::{ElementId, Page, Selector};
use crate::{Error, Result};

/// Timing function shared by the entrance transitions
pub const SETTLE_CURVE: &str = "cubic-bezier(0.23, 1, 0.320, 1)";

/// Deferred work on the task queue
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum Job {
    /// Write inline style properties in order
    Styles {
        element: ElementId,
        styles: Vec<(String, String)>,
    },
    Class {
        element: ElementId,
        class: String,
        on: bool,
    },
    StartCounter {
        element: ElementId,
    },
    CounterStep {
        element: ElementId,
    },
    Remove {
        element: ElementId,
    },
    /// Body `loading` -> `loaded`
    BodyLoaded,
    ResetLogoClicks,
    ClearFilter,
    ReinitTilt,
}

impl Job {
    pub fn styles(element: ElementId, styles: &[(&str, &str)]) -> Self {
        Job::Styles {
            element,
            styles: styles
                .iter()
                .map(|(p, v)| (p.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn class(element: ElementId, class: &str, on: bool) -> Self {
        Job::Class {
            element,
            class: class.to_string(),
            on,
        }
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Job::Styles { .. } => "styles",
            Job::Class { .. } => "class",
            Job::StartCounter { .. } => "start_counter",
            Job::CounterStep { .. } => "counter_step",
            Job::Remove { .. } => "remove",
            Job::BodyLoaded => "body_loaded",
            Job::ResetLogoClicks => "reset_logo_clicks",
            Job::ClearFilter => "clear_filter",
            Job::ReinitTilt => "reinit_tilt",
        }
    }

    pub fn element(&self) -> Option<ElementId> {
        match self {
            Job::Styles { element, .. }
            | Job::Class { element, .. }
            | Job::StartCounter { element }
            | Job::CounterStep { element }
            | Job::Remove { element } => Some(*element),
            _ => None,
        }
    }
}

/// Parse a configured selector, naming the feature on failure
pub(crate) fn compile(feature: &str, selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Config(format!("{}: {}", feature, e)))
}

/// Resolve an event target to the registered element that contains it
pub(crate) fn owning(page: &dyn Page, elements: &[ElementId], target: ElementId) -> Option<(usize, ElementId)> {
    elements
        .iter()
        .copied()
        .enumerate()
        .find(|(_, el)| page.contains(*el, target))
}
