//! Motion primitives for Glint
//!
//! # Layers
//!
//! ## L4 Atomic Layer
//! - `easing` - Pure easing functions (cubic in-out, cubic, quintic, exponential)
//! - `timing` - Frame clock arithmetic
//!
//! ## L3 Molecular Layer
//! - `driver` - Frame-driven animation runs combining the atoms
//!
//! # Usage
//!
//! ```ignore
//! use glint_core::motion::{EasingType, ScrollDriver};
//!
//! let mut driver = ScrollDriver::new();
//! driver.animate_to(page.scroll_y(), 1000.0, 1000.0, EasingType::CubicInOut);
//!
//! // Once per display frame
//! if let Some(y) = driver.frame(now) {
//!     page.scroll_to(y);
//! }
//! ```

pub mod driver;
pub mod easing;
pub mod timing;

pub use driver::{AnimationRun, ScrollDriver};
pub use easing::{ease_in_out_cubic, EasingType};
pub use timing::Millis;
