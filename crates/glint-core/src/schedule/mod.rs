//! Cooperative scheduling for the page engine
//!
//! Everything runs on one thread. Deferred work is a value in a
//! [`TaskQueue`]; the host pumps the queue once per frame via
//! `Choreographer::tick`.

mod queue;

pub use queue::{DueTask, TaskId, TaskQueue};
