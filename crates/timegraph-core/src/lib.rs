//! Timegraph Core - interactive timeline engine for the time tracker

pub mod bins;
pub mod config;
pub mod drag;
pub mod engine;
pub mod error;
pub mod overlap;
pub mod render;
pub mod store;
pub mod ticks;
pub mod types;
pub mod viewport;

pub use types::*;

pub use config::TimeGraphConfig;
pub use engine::TimelineEngine;
pub use error::{TimeGraphError, TimeGraphResult};
