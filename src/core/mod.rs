//! Core application primitives (engine, settings, scheduling, HTTP surface)

pub mod engine;
pub mod http;
pub mod runtime;
pub mod scheduler;
pub mod settings;

pub use engine::*;
pub use http::{create_router, start_server, AppState};
pub use runtime::*;
pub use settings::SettingsStore;
