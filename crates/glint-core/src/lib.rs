pub mod choreographer;
pub mod config;
pub mod effects;
pub mod error;
pub mod event;
pub mod motion;
pub mod page;
pub mod schedule;

pub use choreographer::{Choreographer, EngineStats, TickReport};
pub use config::GlintConfig;
pub use error::{Error, Result};
pub use event::{InputEvent, Key, Outcome};
pub use motion::{EasingType, Millis};
pub use page::{ElementId, Page, Selector, VirtualPage};
